//! Structural diagnostics over a dependency graph.
//!
//! The analyzer is read-only: it reports malformance (cycles, dangling
//! references, fan-in/fan-out hotspots) instead of raising on it. The only
//! error it can return is budget exhaustion during cycle enumeration.

use std::fmt;

use modsolve_core::cycle::Cycle;
use modsolve_core::errors::SolveError;
use modsolve_core::module::ModuleState;
use serde::Serialize;

use crate::cycles::{self, ResolutionBudget};
use crate::graph::DependencyGraph;

/// How many dependents to list per hard-to-uninstall entry.
const MAX_LISTED_DEPENDENTS: usize = 10;

/// Reporting thresholds for the fan-out and fan-in flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Valid dependency count above which a module is flagged.
    pub fan_out: usize,
    /// Dependent count above which an installed module is flagged.
    pub fan_in: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fan_out: 10,
            fan_in: 5,
        }
    }
}

/// A declared dependency that resolves to no known module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDependency {
    pub module: String,
    pub dependency: String,
}

/// A module whose valid dependency count exceeds the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighFanOut {
    pub name: String,
    pub dependency_count: usize,
    pub state: ModuleState,
}

/// An installed module with enough dependents to make uninstalling risky.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HardToUninstall {
    pub name: String,
    pub dependent_count: usize,
    /// First ten dependents, sorted; the count above is the full total.
    pub dependents: Vec<String>,
}

/// Aggregated structural findings for one graph snapshot.
///
/// Built fresh per analysis call and never mutated afterwards. Cycles and
/// missing dependencies are faults; the fan lists are informational.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticsReport {
    pub cycles: Vec<Cycle>,
    pub missing_dependencies: Vec<MissingDependency>,
    pub high_fan_out: Vec<HighFanOut>,
    pub hard_to_uninstall: Vec<HardToUninstall>,
}

impl DiagnosticsReport {
    /// No cycles and no missing dependencies.
    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty() && self.missing_dependencies.is_empty()
    }

    /// Number of critical faults (cycles plus missing dependencies).
    pub fn critical_count(&self) -> usize {
        self.cycles.len() + self.missing_dependencies.len()
    }
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cycles.is_empty() {
            writeln!(f, "No circular dependencies found.")?;
        } else {
            writeln!(f, "Circular dependencies ({}):", self.cycles.len())?;
            for cycle in &self.cycles {
                writeln!(f, "  {cycle}")?;
            }
        }
        if self.missing_dependencies.is_empty() {
            writeln!(f, "No missing dependencies found.")?;
        } else {
            writeln!(f, "Missing dependencies ({}):", self.missing_dependencies.len())?;
            for missing in &self.missing_dependencies {
                writeln!(f, "  {} -> {} (missing)", missing.module, missing.dependency)?;
            }
        }
        if !self.high_fan_out.is_empty() {
            writeln!(f, "High dependency count ({}):", self.high_fan_out.len())?;
            for entry in &self.high_fan_out {
                writeln!(
                    f,
                    "  {}: {} dependencies ({})",
                    entry.name, entry.dependency_count, entry.state
                )?;
            }
        }
        if !self.hard_to_uninstall.is_empty() {
            writeln!(f, "Hard to safely uninstall ({}):", self.hard_to_uninstall.len())?;
            for entry in &self.hard_to_uninstall {
                writeln!(
                    f,
                    "  {}: {} dependents",
                    entry.name, entry.dependent_count
                )?;
            }
        }
        Ok(())
    }
}

/// Analyze the graph and build a fresh report.
pub fn analyze(
    graph: &DependencyGraph,
    thresholds: Thresholds,
    budget: ResolutionBudget,
) -> Result<DiagnosticsReport, SolveError> {
    let cycles = cycles::find_cycles(graph, budget)?;

    let missing_dependencies = graph
        .dangling_references()
        .iter()
        .map(|(module, dependency)| MissingDependency {
            module: module.clone(),
            dependency: dependency.clone(),
        })
        .collect();

    let mut high_fan_out = Vec::new();
    let mut hard_to_uninstall = Vec::new();
    for name in graph.module_names() {
        let Some(node) = graph.module(&name) else {
            continue;
        };
        let dependency_count = graph.direct_dependencies(&name).len();
        if dependency_count > thresholds.fan_out {
            high_fan_out.push(HighFanOut {
                name: name.clone(),
                dependency_count,
                state: node.state,
            });
        }
        if node.state == ModuleState::Installed {
            let dependents = graph.direct_dependents(&name);
            if dependents.len() > thresholds.fan_in {
                hard_to_uninstall.push(HardToUninstall {
                    name: name.clone(),
                    dependent_count: dependents.len(),
                    dependents: dependents.into_iter().take(MAX_LISTED_DEPENDENTS).collect(),
                });
            }
        }
    }

    Ok(DiagnosticsReport {
        cycles,
        missing_dependencies,
        high_fan_out,
        hard_to_uninstall,
    })
}
