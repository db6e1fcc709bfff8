//! Feature dependency resolution for primgen.
//!
//! A [`DependencyGraph`] of modules and features is evaluated by a
//! [`Resolver`] session against a [`primgen_config::FeatureConfig`]: for
//! every instantiation the session binds the nodes, propagates implied
//! requirements, validates explicit settings and answers whether each node
//! is enabled.

#![deny(unsafe_code)]

pub mod descriptor;
pub mod driver;
pub mod error;
pub mod graph;
pub mod link;
pub mod resolver;
pub mod template;

pub use descriptor::{GraphDescriptor, ModuleDescriptor, RequirementDescriptor, ShapeKind, Side};
pub use driver::{Decisions, ResolutionReport};
pub use error::{ResolveError, Result};
pub use graph::{Arity, DependencyGraph, Node, NodeId, NodeKind};
pub use link::{RequirementLink, RequirementShape};
pub use resolver::Resolver;
pub use template::export_template;
