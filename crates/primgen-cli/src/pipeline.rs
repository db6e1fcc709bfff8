//! Loading steps shared by the CLI commands: graph descriptor, settings,
//! type selection, and the resolver session built from them.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use primgen_config::{FeatureConfig, ResolverSettings, load_feature_config};
use primgen_model::{Instantiation, LoadState, TypeDescriptor, TypeRegistry};
use primgen_resolve::{GraphDescriptor, ResolutionReport, Resolver, export_template};
use serde_json::Value;
use tracing::{debug, info, info_span};

/// Inputs every command works from.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub graph: PathBuf,
    pub settings: Option<PathBuf>,
    /// Type paths to instantiate; every registered type when empty.
    pub types: Vec<String>,
    pub fallback: LoadState,
}

impl PipelineOptions {
    pub fn new(graph: impl Into<PathBuf>) -> Self {
        Self {
            graph: graph.into(),
            settings: None,
            types: Vec::new(),
            fallback: LoadState::Required,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: impl Into<PathBuf>) -> Self {
        self.settings = Some(settings.into());
        self
    }

    #[must_use]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: LoadState) -> Self {
        self.fallback = fallback;
        self
    }
}

/// A ready resolver plus the instantiations to drive it with.
#[derive(Debug)]
pub struct Session {
    pub resolver: Resolver,
    pub instantiations: Vec<Instantiation>,
}

pub fn load_session(options: &PipelineOptions) -> Result<Session> {
    let registry = TypeRegistry::with_primitives();
    let descriptor = GraphDescriptor::load(&options.graph)
        .with_context(|| format!("load graph descriptor {}", options.graph.display()))?;
    let graph = descriptor
        .build(&registry)
        .with_context(|| format!("build graph from {}", options.graph.display()))?;
    let config = match &options.settings {
        Some(path) => load_feature_config(path)
            .with_context(|| format!("load settings {}", path.display()))?,
        None => FeatureConfig::new(),
    };
    let types = select_types(&registry, &options.types)?;
    let instantiations = Instantiation::all(&types);
    debug!(
        nodes = graph.len(),
        settings = config.len(),
        types = types.len(),
        instantiations = instantiations.len(),
        "session loaded"
    );
    let settings = ResolverSettings::default().with_fallback(options.fallback);
    Ok(Session {
        resolver: Resolver::new(graph, config, settings),
        instantiations,
    })
}

/// Resolves `names` against `registry`, keeping registry order. An empty
/// selection means every registered type.
pub fn select_types(registry: &TypeRegistry, names: &[String]) -> Result<Vec<TypeDescriptor>> {
    if names.is_empty() {
        return Ok(registry.iter().cloned().collect());
    }
    let mut wanted = BTreeSet::new();
    for name in names {
        let name = name.trim();
        if registry.lookup(name).is_none() {
            bail!("unknown type {name:?}");
        }
        wanted.insert(name);
    }
    Ok(registry
        .iter()
        .filter(|ty| wanted.contains(ty.path()))
        .cloned()
        .collect())
}

/// Runs the full protocol for every instantiation.
pub fn resolve(options: &PipelineOptions) -> Result<ResolutionReport> {
    let span = info_span!("resolve", graph = %options.graph.display());
    let _guard = span.enter();
    let mut session = load_session(options)?;
    session
        .resolver
        .run(&session.instantiations)
        .context("resolve instantiations")
}

/// Propagates and validates every instantiation without querying
/// decisions. Returns the distinct validation messages.
pub fn check(options: &PipelineOptions) -> Result<Vec<String>> {
    let span = info_span!("check", graph = %options.graph.display());
    let _guard = span.enter();
    let mut session = load_session(options)?;
    let mut seen = BTreeSet::new();
    let mut diagnostics = Vec::new();
    for instantiation in &session.instantiations {
        session
            .resolver
            .resolve_requirements(instantiation)
            .with_context(|| format!("propagate {instantiation}"))?;
        session
            .resolver
            .validate(instantiation, |message| {
                if seen.insert(message.clone()) {
                    diagnostics.push(message);
                }
            })
            .with_context(|| format!("validate {instantiation}"))?;
    }
    info!(diagnostics = diagnostics.len(), "check complete");
    Ok(diagnostics)
}

/// Builds the settings template for every instantiation.
pub fn template(options: &PipelineOptions) -> Result<Value> {
    let mut session = load_session(options)?;
    export_template(&mut session.resolver, &session.instantiations).context("export template")
}
