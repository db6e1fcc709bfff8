//! Settings template export.
//!
//! The exported tree groups settings as `K -> [V ->] Module -> {Enabled,
//! feature...}`; flattening it yields the local key of every node for
//! every exported instantiation, each holding the current decision.

use primgen_config::{ENABLED_SENTINEL, KEY_SEPARATOR};
use primgen_model::Instantiation;
use serde_json::{Map, Value};
use tracing::debug;

use crate::graph::{DependencyGraph, NodeId, NodeKind};
use crate::{ResolveError, Resolver, Result};

/// Runs `instantiations` through `resolver` and returns the nested settings
/// tree describing every decision.
///
/// A node whose key is shared by several instantiations (single-type nodes
/// across value types) keeps the decision of the last one processed.
///
/// # Errors
///
/// Resolution errors are passed through. [`ResolveError::TemplateConflict`]
/// is returned when a setting would land where a group is needed or the
/// other way round, or when a feature is named like the group sentinel.
pub fn export_template(resolver: &mut Resolver, instantiations: &[Instantiation]) -> Result<Value> {
    let mut root = Map::new();
    let mut leaves = 0usize;
    for instantiation in instantiations {
        let decisions = resolver.process(instantiation, |_| {})?;
        for id in resolver.graph.ids() {
            let pair = resolver.driven_pair(id, instantiation);
            let segments = segments(&resolver.graph, id, &pair)?;
            let enabled = decisions
                .is_enabled(&resolver.graph.path(id))
                .unwrap_or(false);
            insert_leaf(&mut root, &segments, enabled)?;
            leaves += 1;
        }
    }
    debug!(
        instantiations = instantiations.len(),
        leaves, "exported settings template"
    );
    Ok(Value::Object(root))
}

fn segments(graph: &DependencyGraph, id: NodeId, pair: &Instantiation) -> Result<Vec<String>> {
    let node = graph.node(id);
    let mut segments = vec![pair.key.path().to_string()];
    if node.arity().is_dual() {
        segments.push(pair.value.path().to_string());
    }
    match node.kind() {
        NodeKind::Module { .. } => {
            segments.push(node.name().to_string());
            segments.push(ENABLED_SENTINEL.to_string());
        }
        NodeKind::Feature { owner } => {
            if node.name().eq_ignore_ascii_case(ENABLED_SENTINEL) {
                return Err(ResolveError::TemplateConflict {
                    key: graph.local_key(id, &pair.key, &pair.value),
                });
            }
            segments.push(graph.node(*owner).name().to_string());
            segments.push(node.name().to_string());
        }
    }
    Ok(segments)
}

fn insert_leaf(root: &mut Map<String, Value>, segments: &[String], enabled: bool) -> Result<()> {
    let conflict = || ResolveError::TemplateConflict {
        key: segments.join(KEY_SEPARATOR.to_string().as_str()),
    };
    let Some((leaf, groups)) = segments.split_last() else {
        return Ok(());
    };
    let mut table = root;
    for group in groups {
        let entry = table
            .entry(group.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        table = match entry {
            Value::Object(inner) => inner,
            _ => return Err(conflict()),
        };
    }
    if matches!(table.get(leaf), Some(Value::Object(_))) {
        return Err(conflict());
    }
    table.insert(leaf.clone(), Value::Bool(enabled));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Arity;
    use primgen_config::{FeatureConfig, ResolverSettings, flatten};
    use primgen_model::{LoadState, TypeRegistry};

    #[test]
    fn single_module_template() {
        let registry = TypeRegistry::with_primitives();
        let int = registry.lookup("int").unwrap().clone();
        let mut graph = DependencyGraph::new();
        let list = graph.add_module("List", Arity::Single).unwrap();
        graph.create_dependency(list, "sort").unwrap();
        let mut resolver = Resolver::new(graph, FeatureConfig::new(), ResolverSettings::default());

        let tree = export_template(&mut resolver, &Instantiation::all(&[int])).unwrap();
        insta::assert_snapshot!(serde_json::to_string_pretty(&tree).unwrap(), @r#"
        {
          "int": {
            "List": {
              "Enabled": true,
              "sort": true
            }
          }
        }
        "#);
    }

    #[test]
    fn features_named_like_the_sentinel_conflict() {
        let registry = TypeRegistry::with_primitives();
        let int = registry.lookup("int").unwrap().clone();
        let mut graph = DependencyGraph::new();
        let list = graph.add_module("List", Arity::Single).unwrap();
        graph.create_dependency(list, "enabled").unwrap();
        let mut resolver = Resolver::new(graph, FeatureConfig::new(), ResolverSettings::default());

        match export_template(&mut resolver, &[Instantiation::single(int)]) {
            Err(ResolveError::TemplateConflict { key }) => assert_eq!(key, "int-List-enabled"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn leaf_and_group_collisions_conflict() {
        let mut root = Map::new();
        let path = |parts: &[&str]| parts.iter().map(|part| part.to_string()).collect::<Vec<_>>();
        insert_leaf(&mut root, &path(&["int", "List"]), true).unwrap();
        assert!(matches!(
            insert_leaf(&mut root, &path(&["int", "List", "sort"]), true),
            Err(ResolveError::TemplateConflict { .. })
        ));
        assert!(matches!(
            insert_leaf(&mut root, &path(&["int"]), false),
            Err(ResolveError::TemplateConflict { .. })
        ));
    }

    #[test]
    fn exported_tree_flattens_back_to_decisions() {
        let registry = TypeRegistry::with_primitives();
        let types = vec![
            registry.lookup("int").unwrap().clone(),
            registry.lookup("long").unwrap().clone(),
        ];
        let mut graph = DependencyGraph::new();
        let map = graph.add_module("Map", Arity::Dual).unwrap();
        graph.create_dependency(map, "copy").unwrap();
        let mut config = FeatureConfig::new();
        config.insert("Map", LoadState::Rejected);
        config.insert("int-long-Map", LoadState::Required);
        let mut resolver = Resolver::new(graph, config, ResolverSettings::default());
        let instantiations = Instantiation::all(&types);

        let tree = export_template(&mut resolver, &instantiations).unwrap();
        let exported = flatten(&tree).unwrap();

        assert_eq!(exported.len(), 2 * instantiations.len());
        for instantiation in &instantiations {
            let decisions = resolver.process(instantiation, |_| {}).unwrap();
            for id in resolver.graph().ids() {
                let key = resolver.local_key(id, &instantiation.key, &instantiation.value);
                let decision = decisions.is_enabled(&resolver.graph().path(id)).unwrap();
                assert_eq!(exported.get(&key), LoadState::of(decision), "{key}");
            }
        }
        assert_eq!(exported.get("int-long-Map-copy"), LoadState::Required);
        assert_eq!(exported.get("long-int-Map-copy"), LoadState::Rejected);
    }
}
