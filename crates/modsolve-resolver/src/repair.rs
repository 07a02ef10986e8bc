//! Automated repair planning: dangling-declaration removal and cycle
//! breaking.
//!
//! The policy is deterministic so plans are reproducible: every dangling
//! declaration is dropped, and every cycle is broken at its least critical
//! member (fewest direct dependents, ties to the smallest name) by marking
//! it uninstalled. Applying re-validates after each batch and reports
//! unresolved faults instead of claiming success.

use std::collections::BTreeSet;
use std::fmt;

use modsolve_core::cycle::Cycle;
use modsolve_core::errors::SolveError;
use modsolve_core::module::ModuleState;
use serde::Serialize;

use crate::cycles::{self, ResolutionBudget};
use crate::diagnose::MissingDependency;
use crate::graph::DependencyGraph;

/// A single proposed or applied repair edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepairEdit {
    /// Drop a declared dependency that names no known module.
    RemoveMissingDependency { module: String, dependency: String },
    /// Mark the least critical member of a cycle as uninstalled, removing
    /// it from valid-edge participation without deleting its history.
    BreakCycle { module: String, cycle: Cycle },
}

impl fmt::Display for RepairEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoveMissingDependency { module, dependency } => {
                write!(f, "remove declared dependency {module} -> {dependency}")
            }
            Self::BreakCycle { module, cycle } => {
                write!(f, "mark {module} uninstalled to break {cycle}")
            }
        }
    }
}

/// Result of applying a repair plan, re-validated after the fact.
#[derive(Debug, Clone, Serialize)]
pub struct RepairOutcome {
    pub applied: Vec<RepairEdit>,
    pub unresolved_cycles: Vec<Cycle>,
    pub unresolved_missing: Vec<MissingDependency>,
}

impl RepairOutcome {
    pub fn is_fully_repaired(&self) -> bool {
        self.unresolved_cycles.is_empty() && self.unresolved_missing.is_empty()
    }
}

/// Propose the deterministic edit list for the graph's current faults.
///
/// A cycle sharing a member with an earlier break proposal needs no edit of
/// its own. A graph without faults yields an empty list, which is what
/// makes repair idempotent.
pub fn plan(
    graph: &DependencyGraph,
    budget: ResolutionBudget,
) -> Result<Vec<RepairEdit>, SolveError> {
    let mut edits = Vec::new();

    for (module, dependency) in graph.dangling_references() {
        edits.push(RepairEdit::RemoveMissingDependency {
            module: module.clone(),
            dependency: dependency.clone(),
        });
    }

    let found = cycles::find_cycles(graph, budget)?;
    let mut marked: BTreeSet<String> = BTreeSet::new();
    for cycle in found {
        if marked.iter().any(|m| cycle.contains(m)) {
            continue;
        }
        let module = least_critical_member(graph, &cycle);
        marked.insert(module.clone());
        edits.push(RepairEdit::BreakCycle { module, cycle });
    }

    Ok(edits)
}

/// Apply the current plan, re-validating after each batch.
///
/// Dangling declarations are removed first as one batch; cycle breaks are
/// then applied one at a time, skipping any cycle a previous break already
/// resolved. The outcome carries whatever faults survive.
pub fn apply(
    graph: &mut DependencyGraph,
    budget: ResolutionBudget,
) -> Result<RepairOutcome, SolveError> {
    let edits = plan(graph, budget)?;
    let mut applied = Vec::new();

    for edit in &edits {
        if let RepairEdit::RemoveMissingDependency { module, dependency } = edit {
            graph.remove_dependency(module, dependency)?;
            applied.push(edit.clone());
        }
    }
    if !applied.is_empty() && !graph.dangling_references().is_empty() {
        tracing::warn!(
            "{} dangling references survived declaration removal",
            graph.dangling_references().len()
        );
    }

    for edit in &edits {
        if let RepairEdit::BreakCycle { module, cycle } = edit {
            let current = cycles::find_cycles(graph, budget)?;
            if !current.contains(cycle) {
                // An earlier break removed a shared member.
                continue;
            }
            graph.set_state(module, ModuleState::Uninstalled)?;
            applied.push(edit.clone());
        }
    }

    let unresolved_cycles = cycles::find_cycles(graph, budget)?;
    let unresolved_missing = graph
        .dangling_references()
        .iter()
        .map(|(module, dependency)| MissingDependency {
            module: module.clone(),
            dependency: dependency.clone(),
        })
        .collect();

    Ok(RepairOutcome {
        applied,
        unresolved_cycles,
        unresolved_missing,
    })
}

/// The cycle member with the fewest direct dependents, ties broken by the
/// lexicographically smallest name.
fn least_critical_member(graph: &DependencyGraph, cycle: &Cycle) -> String {
    cycle
        .members()
        .iter()
        .map(|m| (graph.direct_dependents(m).len(), m.clone()))
        .min()
        .map(|(_, m)| m)
        .unwrap_or_default()
}
