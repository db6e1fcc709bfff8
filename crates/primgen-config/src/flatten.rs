//! Flattening of nested boolean settings trees into [`FeatureConfig`] keys.
//!
//! Group names are joined with `-`. A boolean leaf named `Enabled` (any
//! case) sets the state of its enclosing group instead of a child key:
//!
//! ```text
//! { "Foo": { "Enabled": true, "Bar": false } }
//!   => Foo = required, Foo-Bar = rejected
//! ```

use primgen_model::LoadState;
use serde_json::{Map, Value};
use tracing::trace;

use crate::{ConfigError, FeatureConfig, Result};

/// Leaf name that binds to its parent group.
pub const ENABLED_SENTINEL: &str = "Enabled";

/// Separator between key segments.
pub const KEY_SEPARATOR: char = '-';

/// Flattens `tree` into a new [`FeatureConfig`].
pub fn flatten(tree: &Value) -> Result<FeatureConfig> {
    let mut config = FeatureConfig::new();
    flatten_into(tree, &mut config)?;
    Ok(config)
}

/// Flattens `tree` into `config`, overwriting keys that already exist.
/// Returns the number of leaves written.
pub fn flatten_into(tree: &Value, config: &mut FeatureConfig) -> Result<usize> {
    let Value::Object(root) = tree else {
        return Err(ConfigError::InvalidRoot {
            found: describe(tree).to_string(),
        });
    };
    let mut written = 0;
    walk("", root, config, &mut written)?;
    Ok(written)
}

fn walk(
    prefix: &str,
    group: &Map<String, Value>,
    config: &mut FeatureConfig,
    written: &mut usize,
) -> Result<()> {
    for (name, value) in group {
        match value {
            Value::Bool(enabled) => {
                let key = if name.eq_ignore_ascii_case(ENABLED_SENTINEL) {
                    prefix
                        .strip_suffix(KEY_SEPARATOR)
                        .unwrap_or(prefix)
                        .to_string()
                } else {
                    format!("{prefix}{name}")
                };
                trace!(key = %key, enabled, "flattened setting");
                config.insert(key, LoadState::of(*enabled));
                *written += 1;
            }
            Value::Object(child) => {
                let nested = format!("{prefix}{name}{KEY_SEPARATOR}");
                walk(&nested, child, config, written)?;
            }
            other => {
                return Err(ConfigError::InvalidLeaf {
                    key: format!("{prefix}{name}"),
                    found: describe(other).to_string(),
                });
            }
        }
    }
    Ok(())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enabled_leaf_sets_group_key() {
        let config = flatten(&json!({"Foo": {"Enabled": true, "Bar": false}})).unwrap();
        let entries: Vec<(&str, LoadState)> = config.iter().collect();
        assert_eq!(
            entries,
            vec![("Foo", LoadState::Required), ("Foo-Bar", LoadState::Rejected)]
        );
        assert!(!config.contains("Foo-Enabled"));
    }

    #[test]
    fn sentinel_is_case_insensitive() {
        let config = flatten(&json!({"int": {"Map": {"ENABLED": false}}})).unwrap();
        assert_eq!(config.get("int-Map"), LoadState::Rejected);
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn nested_groups_join_with_separator() {
        let config = flatten(&json!({
            "int": {"long": {"Map": {"Enabled": true, "copy": false}}},
        }))
        .unwrap();
        assert_eq!(config.get("int-long-Map"), LoadState::Required);
        assert_eq!(config.get("int-long-Map-copy"), LoadState::Rejected);
    }

    #[test]
    fn non_boolean_leaf_is_rejected() {
        let err = flatten(&json!({"int": {"Map": "yes"}})).unwrap_err();
        match err {
            ConfigError::InvalidLeaf { key, found } => {
                assert_eq!(key, "int-Map");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn root_must_be_a_table() {
        assert!(matches!(
            flatten(&json!([true])),
            Err(ConfigError::InvalidRoot { .. })
        ));
    }

    #[test]
    fn flatten_into_overwrites_and_counts() {
        let mut config = FeatureConfig::new();
        config.insert("Foo", LoadState::Rejected);
        let written = flatten_into(&json!({"Foo": {"Enabled": true}}), &mut config).unwrap();
        assert_eq!(written, 1);
        assert_eq!(config.get("Foo"), LoadState::Required);
    }
}
