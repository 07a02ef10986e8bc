//! Dependency graph construction, queries, and audited mutation.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use modsolve_core::errors::SolveError;
use modsolve_core::module::{ModuleRecord, ModuleState};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// A module held by the graph: identity, lifecycle state, and the
/// dependency list exactly as authored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    pub name: String,
    pub state: ModuleState,
    pub declared_deps: Vec<String>,
}

/// In-memory module dependency graph backed by petgraph.
///
/// Edges run dependency -> dependent and are materialized only for *valid*
/// relations: both endpoints known, neither in `uninstalled` state. Declared
/// dependencies naming unknown modules are tracked as dangling references
/// instead of edges. Edges are derived from declarations, never stored
/// redundantly: every mutation rebuilds them.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<ModuleNode, ()>,
    /// Lookup from module name to node index.
    index: HashMap<String, NodeIndex>,
    /// Sorted `(module, missing dependency)` pairs.
    dangling: Vec<(String, String)>,
    /// Whether a repeated module name is an error rather than an overwrite.
    strict: bool,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::with_policy(false)
    }

    /// Create an empty graph; `strict` makes duplicate module names fatal.
    pub fn with_policy(strict: bool) -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            dangling: Vec::new(),
            strict,
        }
    }

    /// Build a graph from a materialized inventory and derive its edges.
    pub fn from_inventory(records: &[ModuleRecord], strict: bool) -> Result<Self, SolveError> {
        let mut graph = Self::with_policy(strict);
        for record in records {
            graph.add_module(&record.name, record.state, record.dependencies.clone())?;
        }
        graph.build_edges();
        Ok(graph)
    }

    /// Insert or replace a module entry.
    ///
    /// In strict mode a repeated name is [`SolveError::DuplicateModule`] and
    /// the graph is left untouched; otherwise the new entry overwrites the
    /// old one. Edges are derived data: callers batching inserts must finish
    /// with [`Self::build_edges`] ([`Self::from_inventory`] does).
    pub fn add_module(
        &mut self,
        name: &str,
        state: ModuleState,
        declared_deps: Vec<String>,
    ) -> Result<(), SolveError> {
        let node = ModuleNode {
            name: name.to_string(),
            state,
            declared_deps,
        };
        if let Some(&idx) = self.index.get(name) {
            if self.strict {
                return Err(SolveError::DuplicateModule {
                    name: name.to_string(),
                });
            }
            self.graph[idx] = node;
        } else {
            let idx = self.graph.add_node(node);
            self.index.insert(name.to_string(), idx);
        }
        Ok(())
    }

    /// Recompute the valid-edge set and dangling references from the
    /// current declarations.
    pub fn build_edges(&mut self) {
        self.graph.clear_edges();
        self.dangling.clear();

        let mut entries: Vec<(NodeIndex, String, ModuleState, Vec<String>)> = self
            .graph
            .node_indices()
            .map(|idx| {
                let node = &self.graph[idx];
                (idx, node.name.clone(), node.state, node.declared_deps.clone())
            })
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        for (idx, name, state, deps) in entries {
            for dep in deps {
                match self.index.get(&dep) {
                    Some(&dep_idx) => {
                        if state == ModuleState::Uninstalled
                            || self.graph[dep_idx].state == ModuleState::Uninstalled
                        {
                            continue;
                        }
                        self.add_edge_once(dep_idx, idx);
                    }
                    None => self.dangling.push((name.clone(), dep)),
                }
            }
        }

        self.dangling.sort();
        self.dangling.dedup();
    }

    fn add_edge_once(&mut self, from: NodeIndex, to: NodeIndex) {
        if !self.graph.edges(from).any(|e| e.target() == to) {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get the module entry for a name.
    pub fn module(&self, name: &str) -> Option<&ModuleNode> {
        self.index.get(name).map(|&idx| &self.graph[idx])
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All module names, sorted.
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.index.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of all modules pending install or upgrade, sorted.
    pub fn pending_modules(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .graph
            .node_indices()
            .map(|idx| &self.graph[idx])
            .filter(|n| n.state.is_pending())
            .map(|n| n.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Module counts per lifecycle state.
    pub fn state_counts(&self) -> BTreeMap<ModuleState, usize> {
        let mut counts = BTreeMap::new();
        for idx in self.graph.node_indices() {
            *counts.entry(self.graph[idx].state).or_insert(0) += 1;
        }
        counts
    }

    /// Valid direct dependencies of `name`, in declared order.
    ///
    /// Unknown names have no relations; no error.
    pub fn direct_dependencies(&self, name: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let valid: HashSet<&str> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| self.graph[e.source()].name.as_str())
            .collect();
        let mut seen = HashSet::new();
        let mut deps = Vec::new();
        for dep in &self.graph[idx].declared_deps {
            if valid.contains(dep.as_str()) && seen.insert(dep.as_str()) {
                deps.push(dep.clone());
            }
        }
        deps
    }

    /// Modules that directly depend on `name`, sorted.
    pub fn direct_dependents(&self, name: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut dependents: Vec<String> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| self.graph[e.target()].name.clone())
            .collect();
        dependents.sort();
        dependents.dedup();
        dependents
    }

    /// Sorted `(module, missing dependency)` pairs for every declared
    /// dependency that resolves to no known module.
    pub fn dangling_references(&self) -> &[(String, String)] {
        &self.dangling
    }

    /// Missing dependency names declared by `name`, sorted.
    pub fn dangling_for(&self, name: &str) -> Vec<String> {
        self.dangling
            .iter()
            .filter(|(module, _)| module == name)
            .map(|(_, dep)| dep.clone())
            .collect()
    }

    /// All modules reachable from `name` by following dependency edges,
    /// excluding `name` itself.
    ///
    /// Iterative worklist with a single shared visited set: a cycle through
    /// the start module terminates instead of overflowing the stack.
    pub fn transitive_dependencies(&self, name: &str) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        let Some(&start) = self.index.get(name) else {
            return result;
        };
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        visited.insert(start);
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            for edge in self.graph.edges_directed(idx, Direction::Incoming) {
                let dep = edge.source();
                if visited.insert(dep) {
                    result.insert(self.graph[dep].name.clone());
                    stack.push(dep);
                }
            }
        }
        result
    }

    /// Remove every occurrence of `dep` from `module`'s declared list.
    ///
    /// This is the audited edit behind repair: it drops the declaration
    /// (and thereby any derived edge) whether or not `dep` names a known
    /// module. Fails without touching the graph if `module` is unknown.
    pub fn remove_dependency(&mut self, module: &str, dep: &str) -> Result<(), SolveError> {
        let Some(&idx) = self.index.get(module) else {
            return Err(SolveError::UnknownModule {
                name: module.to_string(),
            });
        };
        self.graph[idx].declared_deps.retain(|d| d != dep);
        self.build_edges();
        Ok(())
    }

    /// Change a module's lifecycle state.
    ///
    /// Switching to or from `uninstalled` changes edge participation, so
    /// the valid-edge set is rebuilt.
    pub fn set_state(&mut self, name: &str, state: ModuleState) -> Result<(), SolveError> {
        let Some(&idx) = self.index.get(name) else {
            return Err(SolveError::UnknownModule {
                name: name.to_string(),
            });
        };
        self.graph[idx].state = state;
        self.build_edges();
        Ok(())
    }

    /// Export the current modules as inventory records, sorted by name.
    ///
    /// Declarations are emitted as authored, including dangling names.
    pub fn to_inventory(&self) -> Vec<ModuleRecord> {
        let mut records: Vec<ModuleRecord> = self
            .graph
            .node_indices()
            .map(|idx| {
                let node = &self.graph[idx];
                ModuleRecord {
                    name: node.name.clone(),
                    state: node.state,
                    dependencies: node.declared_deps.clone(),
                }
            })
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Adjacency lists (dependency -> dependents) over the materialized
    /// edges, with nodes in sorted name order and sorted neighbor lists.
    ///
    /// `subset` restricts both nodes and edges to the given names.
    pub(crate) fn sorted_adjacency(
        &self,
        subset: Option<&BTreeSet<String>>,
    ) -> (Vec<String>, Vec<Vec<usize>>) {
        let names: Vec<String> = match subset {
            Some(set) => set.iter().filter(|n| self.contains(n)).cloned().collect(),
            None => self.module_names(),
        };
        let position: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect();

        let mut adjacency = vec![Vec::new(); names.len()];
        for (i, name) in names.iter().enumerate() {
            let idx = self.index[name];
            let mut targets: Vec<usize> = self
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .filter_map(|e| position.get(self.graph[e.target()].name.as_str()).copied())
                .collect();
            targets.sort_unstable();
            targets.dedup();
            adjacency[i] = targets;
        }
        (names, adjacency)
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from(records: &[(&str, ModuleState, &[&str])]) -> DependencyGraph {
        let records: Vec<ModuleRecord> = records
            .iter()
            .map(|(name, state, deps)| ModuleRecord::new(*name, *state, deps.iter().copied()))
            .collect();
        DependencyGraph::from_inventory(&records, false).unwrap()
    }

    #[test]
    fn add_and_query() {
        let g = graph_from(&[
            ("base", ModuleState::Installed, &[]),
            ("sale", ModuleState::ToInstall, &["base"]),
        ]);
        assert_eq!(g.len(), 2);
        assert!(g.contains("sale"));
        assert_eq!(g.module("sale").unwrap().state, ModuleState::ToInstall);
        assert_eq!(g.direct_dependencies("sale"), ["base"]);
        assert_eq!(g.direct_dependents("base"), ["sale"]);
    }

    #[test]
    fn strict_mode_rejects_duplicates() {
        let records = vec![
            ModuleRecord::new("base", ModuleState::Installed, Vec::<String>::new()),
            ModuleRecord::new("base", ModuleState::ToInstall, Vec::<String>::new()),
        ];
        let err = DependencyGraph::from_inventory(&records, true).unwrap_err();
        assert!(matches!(err, SolveError::DuplicateModule { name } if name == "base"));
    }

    #[test]
    fn lenient_mode_overwrites_duplicates() {
        let records = vec![
            ModuleRecord::new("base", ModuleState::Installed, Vec::<String>::new()),
            ModuleRecord::new("base", ModuleState::ToInstall, Vec::<String>::new()),
        ];
        let g = DependencyGraph::from_inventory(&records, false).unwrap();
        assert_eq!(g.len(), 1);
        assert_eq!(g.module("base").unwrap().state, ModuleState::ToInstall);
    }

    #[test]
    fn dangling_references_are_not_edges() {
        let g = graph_from(&[("x", ModuleState::ToInstall, &["y"])]);
        assert_eq!(
            g.dangling_references(),
            [("x".to_string(), "y".to_string())]
        );
        assert!(g.direct_dependencies("x").is_empty());
        assert_eq!(g.dangling_for("x"), ["y"]);
    }

    #[test]
    fn unknown_names_have_no_relations() {
        let g = graph_from(&[("base", ModuleState::Installed, &[])]);
        assert!(g.direct_dependencies("ghost").is_empty());
        assert!(g.direct_dependents("ghost").is_empty());
        assert!(g.transitive_dependencies("ghost").is_empty());
    }

    #[test]
    fn transitive_dependencies_follow_the_chain() {
        let g = graph_from(&[
            ("a", ModuleState::Installed, &[]),
            ("b", ModuleState::ToInstall, &["a"]),
            ("c", ModuleState::ToInstall, &["b"]),
        ]);
        let deps = g.transitive_dependencies("c");
        assert_eq!(deps.into_iter().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn transitive_dependencies_terminate_on_cycles() {
        let g = graph_from(&[
            ("a", ModuleState::ToInstall, &["b"]),
            ("b", ModuleState::ToInstall, &["a"]),
        ]);
        // The start module is excluded even though the cycle reaches it.
        assert_eq!(
            g.transitive_dependencies("a").into_iter().collect::<Vec<_>>(),
            ["b"]
        );
    }

    #[test]
    fn uninstalled_modules_do_not_participate_in_edges() {
        let g = graph_from(&[
            ("base", ModuleState::Uninstalled, &[]),
            ("sale", ModuleState::ToInstall, &["base"]),
        ]);
        assert!(g.direct_dependencies("sale").is_empty());
        assert!(g.direct_dependents("base").is_empty());
        // The declaration is retained, not treated as dangling.
        assert!(g.dangling_references().is_empty());
        assert_eq!(g.module("sale").unwrap().declared_deps, ["base"]);
    }

    #[test]
    fn remove_dependency_drops_declaration_and_dangling_entry() {
        let mut g = graph_from(&[("x", ModuleState::ToInstall, &["y"])]);
        g.remove_dependency("x", "y").unwrap();
        assert!(g.dangling_references().is_empty());
        assert!(g.module("x").unwrap().declared_deps.is_empty());
    }

    #[test]
    fn mutations_on_unknown_modules_fail_without_changes() {
        let mut g = graph_from(&[("base", ModuleState::Installed, &[])]);
        assert!(matches!(
            g.remove_dependency("ghost", "base"),
            Err(SolveError::UnknownModule { name }) if name == "ghost"
        ));
        assert!(matches!(
            g.set_state("ghost", ModuleState::Uninstalled),
            Err(SolveError::UnknownModule { name }) if name == "ghost"
        ));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn set_state_rebuilds_edge_participation() {
        let mut g = graph_from(&[
            ("a", ModuleState::ToInstall, &["b"]),
            ("b", ModuleState::ToInstall, &["a"]),
        ]);
        assert_eq!(g.direct_dependencies("a"), ["b"]);
        g.set_state("b", ModuleState::Uninstalled).unwrap();
        assert!(g.direct_dependencies("a").is_empty());
        assert!(g.direct_dependents("a").is_empty());
    }

    #[test]
    fn duplicate_declarations_materialize_one_edge() {
        let g = graph_from(&[
            ("base", ModuleState::Installed, &[]),
            ("sale", ModuleState::ToInstall, &["base", "base"]),
        ]);
        assert_eq!(g.direct_dependencies("sale"), ["base"]);
        assert_eq!(g.direct_dependents("base"), ["sale"]);
    }

    #[test]
    fn to_inventory_roundtrips_sorted() {
        let g = graph_from(&[
            ("sale", ModuleState::ToInstall, &["base", "ghost"]),
            ("base", ModuleState::Installed, &[]),
        ]);
        let records = g.to_inventory();
        assert_eq!(records[0].name, "base");
        assert_eq!(records[1].name, "sale");
        assert_eq!(records[1].dependencies, ["base", "ghost"]);
    }
}
