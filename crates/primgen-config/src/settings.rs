//! Resolver-wide settings.

use primgen_model::LoadState;
use serde::{Deserialize, Serialize};

/// Upper bound on propagation rounds for a single instantiation.
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

/// Settings shared by every query of one resolver session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// State that undecided (`Optional`) values resolve to.
    #[serde(default = "default_fallback")]
    pub fallback: LoadState,
    /// Propagation gives up after this many rounds that still find new work.
    /// Propagation gives up after this many rounds.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
}

fn default_fallback() -> LoadState {
    LoadState::Required
}

fn default_max_rounds() -> usize {
    DEFAULT_MAX_ROUNDS
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            max_rounds: default_max_rounds(),
        }
    }
}

impl ResolverSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opt-in mode: everything not explicitly enabled is left out.
    pub fn opt_in() -> Self {
        Self::default().with_fallback(LoadState::Rejected)
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: LoadState) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}
