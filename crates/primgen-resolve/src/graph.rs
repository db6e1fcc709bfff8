//! The dependency graph: modules, the features nested in them, and the
//! requirement links between arbitrary nodes.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Nodes are
//! never removed or re-parented once added.

use std::collections::BTreeSet;
use std::fmt;

use primgen_config::{FeatureConfig, KEY_SEPARATOR};
use primgen_model::{Instantiation, LoadState, TypeDescriptor};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::link::{RequirementLink, RequirementShape};
use crate::{ResolveError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether a family is instantiated per key type or per key/value pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    #[default]
    Single,
    Dual,
}

impl Arity {
    pub fn from_dual(dual: bool) -> Self {
        if dual { Arity::Dual } else { Arity::Single }
    }

    pub fn is_dual(self) -> bool {
        self == Arity::Dual
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A generated type family. `global` applies to every instantiation
    /// that has no local setting of its own.
    Module { global: LoadState },
    /// An optional function inside `owner`.
    Feature { owner: NodeId },
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    arity: Arity,
    kind: NodeKind,
    children: Vec<NodeId>,
    requirements: Vec<RequirementLink>,
    bound: Option<Instantiation>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_module(&self) -> bool {
        matches!(self.kind, NodeKind::Module { .. })
    }

    pub fn owner(&self) -> Option<NodeId> {
        match self.kind {
            NodeKind::Feature { owner } => Some(owner),
            NodeKind::Module { .. } => None,
        }
    }

    /// Nodes that require this node.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn requirements(&self) -> &[RequirementLink] {
        &self.requirements
    }

    /// Instantiation set by the last bind, if any.
    pub fn bound(&self) -> Option<&Instantiation> {
        self.bound.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, name: impl Into<String>, arity: Arity) -> Result<NodeId> {
        let name = name.into();
        if self.find(&name).is_some() {
            return Err(ResolveError::DuplicateNode { path: name });
        }
        Ok(self.push(Node {
            name,
            arity,
            kind: NodeKind::Module {
                global: LoadState::Optional,
            },
            children: Vec::new(),
            requirements: Vec::new(),
            bound: None,
        }))
    }

    /// Creates a feature inside `module`. The feature inherits the module's
    /// arity, requires the module (entry-shaped for dual modules, key-shaped
    /// otherwise), and is registered as one of its children.
    pub fn create_dependency(&mut self, module: NodeId, name: impl Into<String>) -> Result<NodeId> {
        let owner = self.get(module).ok_or(ResolveError::UnknownNode(module))?;
        if !owner.is_module() {
            return Err(ResolveError::NotAModule {
                name: owner.name.clone(),
            });
        }
        let name = name.into();
        let arity = owner.arity;
        let path = format!("{}.{}", owner.name, name);
        if self.find(&path).is_some() {
            return Err(ResolveError::DuplicateNode { path });
        }
        let shape = if arity.is_dual() {
            RequirementShape::Entry
        } else {
            RequirementShape::Key
        };
        let feature = self.push(Node {
            name,
            arity,
            kind: NodeKind::Feature { owner: module },
            children: Vec::new(),
            requirements: vec![RequirementLink::new(module, shape)],
            bound: None,
        });
        self.nodes[module.0].children.push(feature);
        Ok(feature)
    }

    /// Makes `from` require `to` and registers `from` as a child of `to`.
    pub fn add_requirement(
        &mut self,
        from: NodeId,
        to: NodeId,
        shape: RequirementShape,
    ) -> Result<()> {
        self.get(from).ok_or(ResolveError::UnknownNode(from))?;
        self.get(to).ok_or(ResolveError::UnknownNode(to))?;
        self.nodes[from.0]
            .requirements
            .push(RequirementLink::new(to, shape));
        self.nodes[to.0].children.push(from);
        Ok(())
    }

    pub fn set_global(&mut self, module: NodeId, state: LoadState) -> Result<()> {
        let node = self
            .nodes
            .get_mut(module.0)
            .ok_or(ResolveError::UnknownNode(module))?;
        match &mut node.kind {
            NodeKind::Module { global } => {
                *global = state;
                Ok(())
            }
            NodeKind::Feature { .. } => Err(ResolveError::NotAModule {
                name: node.name.clone(),
            }),
        }
    }

    /// Reads each module's global flag from the bare module-name key, when
    /// present. Returns how many modules were updated.
    pub fn apply_global_flags(&mut self, config: &FeatureConfig) -> usize {
        let mut applied = 0;
        for node in &mut self.nodes {
            let Some(state) = config.explicit(&node.name) else {
                continue;
            };
            if let NodeKind::Module { global } = &mut node.kind {
                debug!(module = %node.name, %state, "global flag");
                *global = state;
                applied += 1;
            }
        }
        applied
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn set_bound(&mut self, id: NodeId, instantiation: Instantiation) {
        self.node_mut(id).bound = Some(instantiation);
    }

    /// Finds a node by `Module` or `Module.feature` path.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.ids().find(|id| self.path(*id) == path)
    }

    /// `Module` for modules, `Module.feature` for features.
    pub fn path(&self, id: NodeId) -> String {
        let node = self.node(id);
        match node.kind {
            NodeKind::Module { .. } => node.name.clone(),
            NodeKind::Feature { owner } => format!("{}.{}", self.node(owner).name, node.name),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes without requirements.
    pub fn roots(&self) -> Vec<NodeId> {
        self.ids()
            .filter(|id| self.node(*id).requirements.is_empty())
            .collect()
    }

    /// Configuration key of `id` for the pair `(key, value)`.
    ///
    /// `K-V-name` for dual nodes, `K-name` for single ones; features put
    /// their module's name in front of their own.
    pub fn local_key(&self, id: NodeId, key: &TypeDescriptor, value: &TypeDescriptor) -> String {
        let node = self.node(id);
        let mut out = String::from(key.path());
        out.push(KEY_SEPARATOR);
        if node.arity.is_dual() {
            out.push_str(value.path());
            out.push(KEY_SEPARATOR);
        }
        if let NodeKind::Feature { owner } = node.kind {
            out.push_str(&self.node(owner).name);
            out.push(KEY_SEPARATOR);
        }
        out.push_str(&node.name);
        out
    }

    /// Children-first order over the forest: every node appears after all
    /// nodes that require it. Each node is visited once, so cycles through
    /// child lists (self-children included) are cut.
    pub fn propagation_order(&self) -> Vec<NodeId> {
        let mut visited = BTreeSet::new();
        let mut order = Vec::with_capacity(self.nodes.len());
        for root in self.roots() {
            self.visit_children_first(root, &mut visited, &mut order);
        }
        for id in self.ids() {
            self.visit_children_first(id, &mut visited, &mut order);
        }
        order
    }

    fn visit_children_first(
        &self,
        id: NodeId,
        visited: &mut BTreeSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) {
        if !visited.insert(id) {
            return;
        }
        for child in &self.node(id).children {
            self.visit_children_first(*child, visited, order);
        }
        order.push(id);
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
