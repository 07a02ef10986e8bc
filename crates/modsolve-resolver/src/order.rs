//! Installation-order computation.
//!
//! Resolves a request to a target set, expands it to the transitive
//! dependency closure, rejects incomplete or cyclic subgraphs, and emits a
//! total order via Kahn's algorithm with a lexicographic tie-break.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use modsolve_core::errors::SolveError;
use modsolve_core::module::ModuleState;
use serde::Serialize;

use crate::cycles::{self, ResolutionBudget};
use crate::graph::DependencyGraph;

/// One entry of a computed installation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledModule {
    pub name: String,
    pub state: ModuleState,
}

impl std::fmt::Display for ScheduledModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.state)
    }
}

/// Compute the installation order for `targets`.
///
/// An empty request means every module pending install or upgrade. The
/// order covers the targets plus their transitive dependency closure, each
/// module strictly after all of its valid dependencies; modules with no
/// remaining unresolved dependency are emitted smallest name first, so the
/// output is total and reproducible.
///
/// All-or-nothing: an unknown target, or a dangling reference declared by
/// any module of the working subgraph, rejects the whole request with
/// [`SolveError::UnknownModule`]; a cycle in the subgraph rejects it with
/// [`SolveError::CyclicDependency`] carrying the offending cycles.
pub fn installation_order(
    graph: &DependencyGraph,
    targets: &[String],
    budget: ResolutionBudget,
) -> Result<Vec<ScheduledModule>, SolveError> {
    let requested: Vec<String> = if targets.is_empty() {
        graph.pending_modules()
    } else {
        for target in targets {
            if !graph.contains(target) {
                return Err(SolveError::UnknownModule {
                    name: target.clone(),
                });
            }
        }
        targets.to_vec()
    };

    let mut subgraph: BTreeSet<String> = BTreeSet::new();
    for target in &requested {
        subgraph.insert(target.clone());
        subgraph.extend(graph.transitive_dependencies(target));
    }

    // A plan that silently skipped a declared dependency would hand the
    // installer an incomplete order.
    for name in &subgraph {
        if let Some(missing) = graph.dangling_for(name).into_iter().next() {
            return Err(SolveError::UnknownModule { name: missing });
        }
    }

    let found = cycles::find_cycles_among(graph, &subgraph, budget)?;
    if !found.is_empty() {
        return Err(SolveError::CyclicDependency { cycles: found });
    }

    // Kahn over the subgraph; names are sorted, so index order is
    // lexicographic order.
    let (names, dependents) = graph.sorted_adjacency(Some(&subgraph));
    let mut indegree = vec![0usize; names.len()];
    for targets_of in &dependents {
        for &t in targets_of {
            indegree[t] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<usize>> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(names.len());
    while let Some(Reverse(i)) = ready.pop() {
        let state = graph.module(&names[i]).map(|m| m.state).unwrap_or_default();
        order.push(ScheduledModule {
            name: names[i].clone(),
            state,
        });
        for &t in &dependents[i] {
            indegree[t] -= 1;
            if indegree[t] == 0 {
                ready.push(Reverse(t));
            }
        }
    }

    debug_assert_eq!(order.len(), names.len());
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modsolve_core::module::ModuleRecord;

    fn graph_from(records: &[(&str, ModuleState, &[&str])]) -> DependencyGraph {
        let records: Vec<ModuleRecord> = records
            .iter()
            .map(|(name, state, deps)| ModuleRecord::new(*name, *state, deps.iter().copied()))
            .collect();
        DependencyGraph::from_inventory(&records, false).unwrap()
    }

    fn names(order: &[ScheduledModule]) -> Vec<&str> {
        order.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn chain_orders_dependencies_first() {
        let g = graph_from(&[
            ("a", ModuleState::ToInstall, &[]),
            ("b", ModuleState::ToInstall, &["a"]),
            ("c", ModuleState::ToInstall, &["b"]),
        ]);
        let order = installation_order(&g, &[], ResolutionBudget::default()).unwrap();
        assert_eq!(names(&order), ["a", "b", "c"]);
    }

    #[test]
    fn cycle_rejects_the_request() {
        let g = graph_from(&[
            ("a", ModuleState::ToInstall, &["b"]),
            ("b", ModuleState::ToInstall, &["a"]),
        ]);
        let err = installation_order(&g, &[], ResolutionBudget::default()).unwrap_err();
        match err {
            SolveError::CyclicDependency { cycles } => {
                assert_eq!(cycles.len(), 1);
                assert_eq!(cycles[0].members(), ["a", "b"]);
            }
            other => panic!("expected CyclicDependency, got {other:?}"),
        }
    }

    #[test]
    fn unknown_target_is_rejected_wholesale() {
        let g = graph_from(&[("a", ModuleState::ToInstall, &[])]);
        let err =
            installation_order(&g, &["a".into(), "ghost".into()], ResolutionBudget::default())
                .unwrap_err();
        assert!(matches!(err, SolveError::UnknownModule { name } if name == "ghost"));
    }

    #[test]
    fn dangling_reference_names_the_missing_module() {
        let g = graph_from(&[("x", ModuleState::ToInstall, &["y"])]);
        let err = installation_order(&g, &["x".into()], ResolutionBudget::default()).unwrap_err();
        assert!(matches!(err, SolveError::UnknownModule { name } if name == "y"));
    }

    #[test]
    fn independent_modules_tie_break_lexicographically() {
        let g = graph_from(&[
            ("n", ModuleState::ToInstall, &[]),
            ("m", ModuleState::ToInstall, &[]),
        ]);
        let order = installation_order(&g, &[], ResolutionBudget::default()).unwrap();
        assert_eq!(names(&order), ["m", "n"]);
    }

    #[test]
    fn closure_pulls_in_installed_dependencies() {
        let g = graph_from(&[
            ("base", ModuleState::Installed, &[]),
            ("sale", ModuleState::ToInstall, &["base"]),
        ]);
        let order = installation_order(&g, &[], ResolutionBudget::default()).unwrap();
        assert_eq!(names(&order), ["base", "sale"]);
        assert_eq!(order[0].state, ModuleState::Installed);
        assert_eq!(order[1].state, ModuleState::ToInstall);
    }

    #[test]
    fn empty_request_covers_pending_modules_only() {
        let g = graph_from(&[
            ("a", ModuleState::Installed, &[]),
            ("b", ModuleState::ToInstall, &[]),
            ("c", ModuleState::ToUpgrade, &[]),
            ("d", ModuleState::Uninstalled, &[]),
        ]);
        let order = installation_order(&g, &[], ResolutionBudget::default()).unwrap();
        assert_eq!(names(&order), ["b", "c"]);
    }

    #[test]
    fn explicit_targets_limit_the_subgraph() {
        let g = graph_from(&[
            ("a", ModuleState::ToInstall, &[]),
            ("b", ModuleState::ToInstall, &["a"]),
            ("z", ModuleState::ToInstall, &[]),
        ]);
        let order = installation_order(&g, &["b".into()], ResolutionBudget::default()).unwrap();
        assert_eq!(names(&order), ["a", "b"]);
    }

    #[test]
    fn every_module_appears_after_its_dependencies() {
        let g = graph_from(&[
            ("a", ModuleState::ToInstall, &[]),
            ("b", ModuleState::ToInstall, &["a"]),
            ("c", ModuleState::ToInstall, &["a", "b"]),
            ("d", ModuleState::ToInstall, &["b", "c"]),
            ("e", ModuleState::ToInstall, &["a", "d"]),
        ]);
        let order = installation_order(&g, &[], ResolutionBudget::default()).unwrap();
        let position: std::collections::HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.as_str(), i))
            .collect();
        for module in ["b", "c", "d", "e"] {
            for dep in g.direct_dependencies(module) {
                assert!(position[dep.as_str()] < position[module]);
            }
        }
    }
}
