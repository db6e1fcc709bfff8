//! Settings handling for primgen: the flat [`FeatureConfig`] map, the
//! flattening of nested settings trees, settings-file loading, and
//! [`ResolverSettings`].

#![deny(unsafe_code)]

pub mod error;
pub mod flatten;
pub mod loader;
pub mod map;
pub mod settings;

pub use error::{ConfigError, Result};
pub use flatten::{ENABLED_SENTINEL, KEY_SEPARATOR, flatten, flatten_into};
pub use loader::{load_feature_config, load_feature_config_into, load_settings_tree};
pub use map::FeatureConfig;
pub use settings::{DEFAULT_MAX_ROUNDS, ResolverSettings};
