//! Resolver session: effective-state evaluation, propagation of implied
//! requirements, and validation of explicit settings.
//!
//! Every state is recomputed from the current [`FeatureConfig`] on each
//! query. The session owns the graph and the map, so binding, propagation,
//! validation and queries for one instantiation can never interleave with
//! another.

use std::collections::{BTreeMap, BTreeSet};

use primgen_config::{FeatureConfig, ResolverSettings};
use primgen_model::{Instantiation, LoadState, TypeDescriptor, TypeId};
use tracing::{debug, trace, warn};

use crate::graph::{Arity, DependencyGraph, NodeId, NodeKind};
use crate::link::RequirementLink;
use crate::{ResolveError, Result};

type Frame = (NodeId, TypeDescriptor, TypeDescriptor);
type FrameId = (NodeId, TypeId, TypeId);

fn frame_id((id, key, value): &Frame) -> FrameId {
    (*id, key.id(), value.id())
}

/// Mutable evaluation state shared by nested queries.
#[derive(Debug, Default)]
struct EvalTrace {
    /// Frames currently being evaluated, outermost first.
    stack: Vec<Frame>,
    /// While set, rejected requirement keys are recorded in `failing`.
    collecting: bool,
    failing: BTreeSet<String>,
}

struct Evaluator<'a> {
    graph: &'a DependencyGraph,
    config: &'a FeatureConfig,
    fallback: LoadState,
    trace: &'a mut EvalTrace,
}

impl Evaluator<'_> {
    fn local_state(&self, id: NodeId, key: &TypeDescriptor, value: &TypeDescriptor) -> LoadState {
        self.config.get(&self.graph.local_key(id, key, value))
    }

    fn is_loaded(
        &mut self,
        id: NodeId,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
    ) -> Result<LoadState> {
        if let Some(start) = self
            .trace
            .stack
            .iter()
            .position(|(node, k, v)| *node == id && k == key && v == value)
        {
            let mut chain: Vec<String> = self.trace.stack[start..]
                .iter()
                .map(|(node, k, v)| self.graph.local_key(*node, k, v))
                .collect();
            chain.push(self.graph.local_key(id, key, value));
            return Err(ResolveError::Cycle { chain });
        }
        self.trace.stack.push((id, key.clone(), value.clone()));
        let state = self.evaluate(id, key, value);
        self.trace.stack.pop();
        state
    }

    fn evaluate(
        &mut self,
        id: NodeId,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
    ) -> Result<LoadState> {
        let local = self.local_state(id, key, value);
        let graph = self.graph;
        let local = match graph.node(id).kind() {
            NodeKind::Module { global } => local.replace_if_undefined(*global),
            NodeKind::Feature { .. } => local,
        };
        let requirements = self.requirement_state(id, key, value)?;
        Ok(local.resolve_if_undefined(self.fallback).merge(requirements))
    }

    fn requirement_state(
        &mut self,
        id: NodeId,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
    ) -> Result<LoadState> {
        let graph = self.graph;
        let links = graph.node(id).requirements();
        // A node without requirements is satisfied by definition.
        let mut state = if links.is_empty() {
            LoadState::Required
        } else {
            LoadState::Optional
        };
        for link in links {
            state = state.merge(self.test(link, key, value)?);
        }
        Ok(state.resolve_if_undefined(self.fallback))
    }

    fn test(
        &mut self,
        link: &RequirementLink,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
    ) -> Result<LoadState> {
        let Some((target_key, target_value)) = link.shape.derive(key, value) else {
            return Ok(LoadState::Required);
        };
        let state = self.is_loaded(link.target, target_key, target_value)?;
        if self.trace.collecting && state == LoadState::Rejected {
            let failing = self.graph.local_key(link.target, target_key, target_value);
            self.trace.failing.insert(failing);
        }
        Ok(state)
    }

    fn test_all(&mut self, id: NodeId, key: &TypeDescriptor, value: &TypeDescriptor) -> Result<()> {
        let graph = self.graph;
        for link in graph.node(id).requirements() {
            self.test(link, key, value)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Resolver {
    pub(crate) graph: DependencyGraph,
    pub(crate) config: FeatureConfig,
    pub(crate) settings: ResolverSettings,
    trace: EvalTrace,
}

impl Resolver {
    /// Creates a session over `graph` and `config`. Bare module-name keys in
    /// `config` become the modules' global flags.
    pub fn new(mut graph: DependencyGraph, config: FeatureConfig, settings: ResolverSettings) -> Self {
        let applied = graph.apply_global_flags(&config);
        debug!(
            nodes = graph.len(),
            settings = config.len(),
            global_flags = applied,
            fallback = %settings.fallback,
            "resolver ready"
        );
        Self {
            graph,
            config,
            settings,
            trace: EvalTrace::default(),
        }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn into_parts(self) -> (DependencyGraph, FeatureConfig) {
        (self.graph, self.config)
    }

    fn evaluator(&mut self) -> Evaluator<'_> {
        Evaluator {
            graph: &self.graph,
            config: &self.config,
            fallback: self.settings.fallback,
            trace: &mut self.trace,
        }
    }

    pub fn local_key(&self, id: NodeId, key: &TypeDescriptor, value: &TypeDescriptor) -> String {
        self.graph.local_key(id, key, value)
    }

    /// Setting stored for `id` at `(key, value)`, `Optional` when absent.
    pub fn local_state(&self, id: NodeId, key: &TypeDescriptor, value: &TypeDescriptor) -> LoadState {
        self.config.get(&self.graph.local_key(id, key, value))
    }

    /// Merged state of every requirement of `id`, resolved against the
    /// fallback.
    pub fn requirement_state(
        &mut self,
        id: NodeId,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
    ) -> Result<LoadState> {
        self.evaluator().requirement_state(id, key, value)
    }

    /// Effective state of `id` at `(key, value)`.
    ///
    /// Modules layer their local setting over the global flag; features use
    /// their local setting alone. Either way the result is merged with the
    /// requirement state, so a rejected requirement always wins.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Cycle`] when the evaluation re-enters a node
    /// at a type pair it is already evaluating.
    pub fn is_loaded(
        &mut self,
        id: NodeId,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
    ) -> Result<LoadState> {
        self.evaluator().is_loaded(id, key, value)
    }

    pub fn bind(&mut self, id: NodeId, key: &TypeDescriptor, value: &TypeDescriptor) {
        self.graph
            .set_bound(id, Instantiation::new(key.clone(), value.clone()));
    }

    /// Whether `id` is enabled for its bound instantiation. Unbound nodes
    /// are never enabled.
    pub fn is_enabled(&mut self, id: NodeId) -> Result<bool> {
        let Some(bound) = self.graph.node(id).bound().cloned() else {
            return Ok(false);
        };
        let state = self.is_loaded(id, &bound.key, &bound.value)?;
        Ok(state.is_enabled(self.settings.fallback))
    }

    /// Type pair a node is driven at: single-type nodes only vary by key.
    pub(crate) fn driven_pair(&self, id: NodeId, instantiation: &Instantiation) -> Instantiation {
        match self.graph.node(id).arity() {
            Arity::Dual => instantiation.clone(),
            Arity::Single => Instantiation::single(instantiation.key.clone()),
        }
    }

    /// Materializes every requirement implied by an explicitly required node
    /// as an explicit `Required` entry. Existing entries are never
    /// overwritten, so an explicit rejection survives.
    ///
    /// Each round reads the map as it stood at the start of the round and
    /// collects new keys into a delta; the delta is merged afterwards.
    /// Required targets, whether newly added or already required, are
    /// expanded in the following round at the type pair their key was
    /// derived for. Every frame is expanded at most once per call. Returns
    /// the number of keys added.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::PropagationLimit`] when more than
    /// `max_rounds` rounds produce new work.
    pub fn resolve_requirements(&mut self, instantiation: &Instantiation) -> Result<usize> {
        let mut pending: Vec<Frame> = self
            .graph
            .propagation_order()
            .into_iter()
            .map(|id| {
                let pair = self.driven_pair(id, instantiation);
                (id, pair.key, pair.value)
            })
            .collect();
        let mut expanded = BTreeSet::new();
        let mut added = 0;
        let mut rounds = 0;
        loop {
            let (delta, next) = self.implied_requirements(&pending, &mut expanded);
            if delta.is_empty() && next.is_empty() {
                break;
            }
            if rounds == self.settings.max_rounds {
                return Err(ResolveError::PropagationLimit {
                    instantiation: instantiation.to_string(),
                    rounds,
                });
            }
            rounds += 1;
            added += self.config.absorb(delta);
            pending = next;
        }
        debug!(%instantiation, added, rounds, "propagated requirements");
        Ok(added)
    }

    fn implied_requirements(
        &self,
        pending: &[Frame],
        expanded: &mut BTreeSet<FrameId>,
    ) -> (BTreeMap<String, LoadState>, Vec<Frame>) {
        let mut delta = BTreeMap::new();
        let mut next = Vec::new();
        // Claim the whole round first so frames it already covers are not queued again.
        let ready: Vec<&Frame> = pending
            .iter()
            .filter(|(id, key, value)| self.local_state(*id, key, value) == LoadState::Required)
            .filter(|frame| expanded.insert(frame_id(frame)))
            .collect();
        for (id, key, value) in ready {
            for link in self.graph.node(*id).requirements() {
                let Some((target_key, target_value)) = link.shape.derive(key, value) else {
                    continue;
                };
                let implied = self.graph.local_key(link.target, target_key, target_value);
                if !self.config.contains(&implied) && !delta.contains_key(&implied) {
                    trace!(
                        from = %self.graph.local_key(*id, key, value),
                        key = %implied,
                        "implied requirement"
                    );
                    delta.insert(implied, LoadState::Required);
                } else if self.config.get(&implied) != LoadState::Required {
                    continue;
                }
                let target = (link.target, target_key.clone(), target_value.clone());
                if !expanded.contains(&frame_id(&target)) {
                    next.push(target);
                }
            }
        }
        (delta, next)
    }

    /// Checks one explicitly required node against its requirements and
    /// reports the keys that block it. Returns whether a message was
    /// reported.
    pub fn validate_dependency<F: FnMut(String)>(
        &mut self,
        id: NodeId,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
        report: &mut F,
    ) -> Result<bool> {
        if self.local_state(id, key, value) != LoadState::Required {
            return Ok(false);
        }
        let mut evaluator = self.evaluator();
        evaluator.trace.collecting = true;
        let outcome = evaluator.test_all(id, key, value);
        evaluator.trace.collecting = false;
        let failing = std::mem::take(&mut evaluator.trace.failing);
        outcome?;
        if failing.is_empty() {
            return Ok(false);
        }
        let blocked = failing
            .iter()
            .map(|blocked_key| format!("[{blocked_key}]"))
            .collect::<Vec<_>>()
            .join(", ");
        let local_key = self.graph.local_key(id, key, value);
        let message = format!("[{local_key}] Requires {blocked} but it has been specifically disabled!");
        warn!(node = %local_key, blocked = failing.len(), "conflicting settings");
        report(message);
        Ok(true)
    }

    /// Validates every node for `instantiation` and returns how many
    /// messages were reported.
    pub fn validate<F: FnMut(String)>(
        &mut self,
        instantiation: &Instantiation,
        mut report: F,
    ) -> Result<usize> {
        let mut reported = 0;
        for id in self.graph.ids() {
            let pair = self.driven_pair(id, instantiation);
            if self.validate_dependency(id, &pair.key, &pair.value, &mut report)? {
                reported += 1;
            }
        }
        Ok(reported)
    }
}
