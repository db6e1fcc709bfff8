#![deny(unsafe_code)]

use std::path::PathBuf;

use primgen_config::ConfigError;

use crate::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("unknown node id {0:?}")]
    UnknownNode(NodeId),

    #[error("node {name} is not a module")]
    NotAModule { name: String },

    #[error("duplicate node {path}")]
    DuplicateNode { path: String },

    #[error("dependency cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("propagation for {instantiation} did not settle within {rounds} rounds")]
    PropagationLimit { instantiation: String, rounds: usize },

    #[error("settings template conflict at {key}")]
    TemplateConflict { key: String },

    #[error("failed to read graph descriptor {path}: {source}")]
    DescriptorIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse graph descriptor: {0}")]
    DescriptorParse(#[from] toml::de::Error),

    #[error("graph descriptor references unknown node {path}")]
    UnknownPath { path: String },

    #[error("graph descriptor references unknown type {path}")]
    UnknownType { path: String },

    #[error("requirement {from} -> {to} needs a `type` for shape {shape}")]
    MissingType {
        from: String,
        to: String,
        shape: String,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
