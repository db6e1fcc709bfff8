//! Propagation properties over random explicit settings.

use primgen_config::{FeatureConfig, ResolverSettings};
use primgen_model::{Instantiation, LoadState, TypeRegistry};
use primgen_resolve::{GraphDescriptor, Resolver};
use proptest::prelude::*;

const GRAPH: &str = r#"
[[module]]
name = "Map"
dual = true
features = ["copy", "keys", "values"]

[[module]]
name = "List"
features = ["sort", "stream"]

[[module]]
name = "Stream"

[[requirement]]
from = "Map.keys"
to = "List"
shape = "key"

[[requirement]]
from = "Map.values"
to = "List.stream"
shape = "value"

[[requirement]]
from = "List.stream"
to = "Stream"
shape = "key"

[[requirement]]
from = "Map.copy"
to = "List.sort"
shape = "optional-typed"
type = "object"
"#;

const KEYS: [&str; 12] = [
    "int-long-Map",
    "int-long-Map-copy",
    "int-long-Map-keys",
    "int-long-Map-values",
    "int-List",
    "int-List-sort",
    "long-List-stream",
    "long-Stream",
    "int-Stream",
    "object-List",
    "object-List-sort",
    "long-List",
];

fn any_state() -> impl Strategy<Value = LoadState> {
    prop_oneof![
        Just(LoadState::Optional),
        Just(LoadState::Required),
        Just(LoadState::Rejected),
    ]
}

fn settings() -> impl Strategy<Value = FeatureConfig> {
    prop::collection::vec(prop::option::of(any_state()), KEYS.len()).prop_map(|states| {
        KEYS.iter()
            .zip(states)
            .filter_map(|(key, state)| state.map(|state| (key.to_string(), state)))
            .collect()
    })
}

fn resolver(config: FeatureConfig) -> (Resolver, Instantiation) {
    let registry = TypeRegistry::with_primitives();
    let graph = GraphDescriptor::from_toml_str(GRAPH)
        .unwrap()
        .build(&registry)
        .unwrap();
    let instantiation = Instantiation::new(
        registry.lookup("int").unwrap().clone(),
        registry.lookup("long").unwrap().clone(),
    );
    (
        Resolver::new(graph, config, ResolverSettings::default()),
        instantiation,
    )
}

proptest! {
    #[test]
    fn propagation_never_overwrites(config in settings()) {
        let (mut resolver, instantiation) = resolver(config.clone());
        resolver.resolve_requirements(&instantiation).unwrap();
        for (key, state) in config.iter() {
            prop_assert_eq!(resolver.config().get(key), state);
        }
    }

    #[test]
    fn propagation_is_idempotent(config in settings()) {
        let (mut resolver, instantiation) = resolver(config);
        let first = resolver.resolve_requirements(&instantiation).unwrap();
        let after_first = resolver.config().clone();
        prop_assert_eq!(resolver.resolve_requirements(&instantiation).unwrap(), 0);
        prop_assert_eq!(resolver.config(), &after_first);
        prop_assert!(first <= resolver.config().len());
    }

    #[test]
    fn propagation_only_adds_required(config in settings()) {
        let (mut resolver, instantiation) = resolver(config.clone());
        resolver.resolve_requirements(&instantiation).unwrap();
        for (key, state) in resolver.config().iter() {
            if !config.contains(key) {
                prop_assert_eq!(state, LoadState::Required);
            }
        }
    }

    #[test]
    fn validation_never_changes_settings(config in settings()) {
        let (mut resolver, instantiation) = resolver(config);
        resolver.resolve_requirements(&instantiation).unwrap();
        let before = resolver.config().clone();
        resolver.validate(&instantiation, |_| {}).unwrap();
        prop_assert_eq!(resolver.config(), &before);
    }
}
