//! TOML description of a dependency graph.
//!
//! ```toml
//! [[module]]
//! name = "Map"
//! dual = true
//! features = ["copy", "stream"]
//!
//! [[module]]
//! name = "Stream"
//!
//! [[requirement]]
//! from = "Map.stream"
//! to = "Stream"
//! shape = "key"
//! ```

use std::fs;
use std::path::Path;

use primgen_model::{LoadState, TypeDescriptor, TypeRegistry};
use serde::Deserialize;
use tracing::debug;

use crate::graph::{Arity, DependencyGraph, NodeId};
use crate::link::RequirementShape;
use crate::{ResolveError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphDescriptor {
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleDescriptor>,
    #[serde(default, rename = "requirement")]
    pub requirements: Vec<RequirementDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDescriptor {
    pub name: String,
    #[serde(default)]
    pub dual: bool,
    /// Global flag for every instantiation of the module.
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementDescriptor {
    pub from: String,
    pub to: String,
    pub shape: ShapeKind,
    /// Fixed type path for `typed` and `optional-typed`.
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    /// Side compared against `type` for `optional-typed`.
    #[serde(default)]
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Key,
    Value,
    Entry,
    Typed,
    OptionalTyped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Key,
    Value,
}

impl GraphDescriptor {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ResolveError::DescriptorIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Builds the graph, resolving fixed types through `registry`.
    pub fn build(&self, registry: &TypeRegistry) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::new();
        for module in &self.modules {
            let id = graph.add_module(&module.name, Arity::from_dual(module.dual))?;
            if let Some(enabled) = module.enabled {
                graph.set_global(id, LoadState::of(enabled))?;
            }
            for feature in &module.features {
                graph.create_dependency(id, feature)?;
            }
        }
        for requirement in &self.requirements {
            let from = find(&graph, &requirement.from)?;
            let to = find(&graph, &requirement.to)?;
            let shape = requirement.shape(registry)?;
            graph.add_requirement(from, to, shape)?;
        }
        debug!(
            modules = self.modules.len(),
            nodes = graph.len(),
            requirements = self.requirements.len(),
            "built dependency graph"
        );
        Ok(graph)
    }
}

impl RequirementDescriptor {
    fn shape(&self, registry: &TypeRegistry) -> Result<RequirementShape> {
        Ok(match self.shape {
            ShapeKind::Key => RequirementShape::Key,
            ShapeKind::Value => RequirementShape::Value,
            ShapeKind::Entry => RequirementShape::Entry,
            ShapeKind::Typed => RequirementShape::Typed(self.fixed_type(registry, "typed")?),
            ShapeKind::OptionalTyped => RequirementShape::OptionalTyped {
                ty: self.fixed_type(registry, "optional-typed")?,
                use_key: self.side == Side::Key,
            },
        })
    }

    fn fixed_type(&self, registry: &TypeRegistry, shape: &str) -> Result<TypeDescriptor> {
        let path = self.ty.as_deref().ok_or_else(|| ResolveError::MissingType {
            from: self.from.clone(),
            to: self.to.clone(),
            shape: shape.to_string(),
        })?;
        registry
            .lookup(path)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownType {
                path: path.to_string(),
            })
    }
}

fn find(graph: &DependencyGraph, path: &str) -> Result<NodeId> {
    graph.find(path).ok_or_else(|| ResolveError::UnknownPath {
        path: path.to_string(),
    })
}
