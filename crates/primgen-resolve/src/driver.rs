//! Per-instantiation driver: bind, propagate, validate, query.

use std::collections::{BTreeMap, BTreeSet};

use primgen_model::Instantiation;
use serde::Serialize;
use tracing::{info, info_span};

use crate::{Resolver, Result};

/// Yes/no decision for every node of one instantiation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Decisions {
    /// `K-V` rendering of the instantiation.
    pub instantiation: String,
    /// Node path (`Module` / `Module.feature`) to decision.
    pub enabled: BTreeMap<String, bool>,
}

impl Decisions {
    pub fn is_enabled(&self, path: &str) -> Option<bool> {
        self.enabled.get(path).copied()
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled.values().filter(|enabled| **enabled).count()
    }

    pub fn total(&self) -> usize {
        self.enabled.len()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionReport {
    pub decisions: Vec<Decisions>,
    /// Distinct validation messages, in the order first reported.
    pub diagnostics: Vec<String>,
}

impl ResolutionReport {
    pub fn has_conflicts(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn decisions_for(&self, instantiation: &str) -> Option<&Decisions> {
        self.decisions
            .iter()
            .find(|decisions| decisions.instantiation == instantiation)
    }
}

impl Resolver {
    /// Binds every node to `instantiation`; single-type nodes are bound to
    /// `(key, key)`.
    pub fn bind_all(&mut self, instantiation: &Instantiation) {
        for id in self.graph.ids() {
            let pair = self.driven_pair(id, instantiation);
            self.bind(id, &pair.key, &pair.value);
        }
    }

    /// Runs the full protocol for one instantiation and returns the decision
    /// for every node. Validation messages go to `report`.
    pub fn process<F: FnMut(String)>(
        &mut self,
        instantiation: &Instantiation,
        report: F,
    ) -> Result<Decisions> {
        let span = info_span!("instantiation", %instantiation);
        let _guard = span.enter();
        self.bind_all(instantiation);
        self.resolve_requirements(instantiation)?;
        self.validate(instantiation, report)?;
        let mut enabled = BTreeMap::new();
        for id in self.graph.ids() {
            let decision = self.is_enabled(id)?;
            enabled.insert(self.graph.path(id), decision);
        }
        Ok(Decisions {
            instantiation: instantiation.to_string(),
            enabled,
        })
    }

    /// Processes each instantiation in order.
    pub fn run(&mut self, instantiations: &[Instantiation]) -> Result<ResolutionReport> {
        let mut report = ResolutionReport::default();
        let mut seen = BTreeSet::new();
        for instantiation in instantiations {
            let mut messages = Vec::new();
            let decisions = self.process(instantiation, |message| messages.push(message))?;
            for message in messages {
                if seen.insert(message.clone()) {
                    report.diagnostics.push(message);
                }
            }
            report.decisions.push(decisions);
        }
        info!(
            instantiations = report.decisions.len(),
            diagnostics = report.diagnostics.len(),
            settings = self.config.len(),
            "resolution complete"
        );
        Ok(report)
    }
}
