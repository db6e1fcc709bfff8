//! Three-valued load state and its merge operators.
//!
//! States are ordered `Optional < Required < Rejected`. `Optional` means no
//! decision has been made yet; it is resolved against a fallback state
//! supplied by the caller (there is no process-wide default).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Undecided.
    #[default]
    Optional,
    /// Explicitly enabled.
    Required,
    /// Explicitly disabled.
    Rejected,
}

impl LoadState {
    pub const ALL: [LoadState; 3] = [LoadState::Optional, LoadState::Required, LoadState::Rejected];

    /// `true` maps to `Required`, `false` to `Rejected`.
    #[must_use]
    pub const fn of(enabled: bool) -> Self {
        if enabled {
            LoadState::Required
        } else {
            LoadState::Rejected
        }
    }

    /// Returns whichever state has the greater ordinal.
    #[must_use]
    pub fn merge(self, other: LoadState) -> Self {
        self.max(other)
    }

    /// Layers a local decision over a broader default.
    #[must_use]
    pub fn replace_if_undefined(self, fallback: LoadState) -> Self {
        if self == LoadState::Optional {
            fallback
        } else {
            self
        }
    }

    #[must_use]
    pub fn resolve_if_undefined(self, fallback: LoadState) -> Self {
        self.replace_if_undefined(fallback)
    }

    /// Merge where a `Rejected` right-hand side never wins.
    #[must_use]
    pub fn merge_down(self, other: LoadState) -> Self {
        if other == LoadState::Rejected || self > other {
            self
        } else {
            other
        }
    }

    /// Merge where a `Required` right-hand side never wins.
    #[must_use]
    pub fn merge_up(self, other: LoadState) -> Self {
        if other == LoadState::Required || self > other {
            self
        } else {
            other
        }
    }

    /// Boolean projection: `Optional` resolves through `fallback`, and only
    /// `Required` counts as enabled.
    #[must_use]
    pub fn is_enabled(self, fallback: LoadState) -> bool {
        self.resolve_if_undefined(fallback) == LoadState::Required
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Optional => "optional",
            LoadState::Required => "required",
            LoadState::Rejected => "rejected",
        }
    }
}

impl From<bool> for LoadState {
    fn from(enabled: bool) -> Self {
        LoadState::of(enabled)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadState {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "optional" => Ok(LoadState::Optional),
            "required" => Ok(LoadState::Required),
            "rejected" => Ok(LoadState::Rejected),
            _ => Err(ModelError::UnknownState(s.to_string())),
        }
    }
}
