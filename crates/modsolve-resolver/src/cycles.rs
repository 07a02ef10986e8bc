//! All-simple-cycles enumeration over the dependency graph.
//!
//! Johnson's algorithm: strongly connected components are computed once up
//! front (petgraph's Tarjan), and the blocked search runs only inside
//! non-trivial components, rooted at each component's smallest member. An
//! acyclic graph therefore costs a single linear pass. Every simple cycle
//! is emitted exactly once, rooted at its smallest member, and the output
//! never depends on insertion order. All traversal is explicit-stack
//! iteration, so arbitrarily deep structures end in a result or a typed
//! budget error.

use std::collections::BTreeSet;

use modsolve_core::cycle::Cycle;
use modsolve_core::errors::SolveError;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::DependencyGraph;

/// Step budget for cycle enumeration and other bounded traversals.
///
/// Simple-cycle enumeration is exponential on dense graphs; the budget
/// turns a pathological input into a typed error instead of an unbounded
/// run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionBudget {
    pub max_steps: u64,
}

impl ResolutionBudget {
    pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

    pub fn new(max_steps: u64) -> Self {
        Self { max_steps }
    }
}

impl Default for ResolutionBudget {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_STEPS)
    }
}

struct StepCounter {
    steps: u64,
    limit: u64,
}

impl StepCounter {
    fn new(budget: ResolutionBudget) -> Self {
        Self {
            steps: 0,
            limit: budget.max_steps,
        }
    }

    fn tick(&mut self) -> Result<(), SolveError> {
        self.steps += 1;
        if self.steps > self.limit {
            return Err(SolveError::ResourceExhausted { limit: self.limit });
        }
        Ok(())
    }
}

/// Enumerate every simple cycle in the graph, sorted canonically.
///
/// A self-dependency is reported as a 1-element cycle; an acyclic graph
/// yields an empty list, not an error.
pub fn find_cycles(
    graph: &DependencyGraph,
    budget: ResolutionBudget,
) -> Result<Vec<Cycle>, SolveError> {
    enumerate(graph, None, budget)
}

/// Enumerate every simple cycle confined to the given subset of modules.
pub fn find_cycles_among(
    graph: &DependencyGraph,
    subset: &BTreeSet<String>,
    budget: ResolutionBudget,
) -> Result<Vec<Cycle>, SolveError> {
    enumerate(graph, Some(subset), budget)
}

fn enumerate(
    graph: &DependencyGraph,
    subset: Option<&BTreeSet<String>>,
    budget: ResolutionBudget,
) -> Result<Vec<Cycle>, SolveError> {
    let (names, adjacency) = graph.sorted_adjacency(subset);
    let mut counter = StepCounter::new(budget);
    let mut cycles = Vec::new();

    for v in 0..adjacency.len() {
        if adjacency[v].binary_search(&v).is_ok() {
            cycles.push(Cycle::new(vec![names[v].clone()]));
        }
    }

    // Worklist of non-trivial components. Each round roots the blocked
    // search at the component's smallest member, then re-decomposes the
    // remainder: every multi-node cycle is found exactly once, rooted at
    // its smallest member.
    let all: Vec<usize> = (0..adjacency.len()).collect();
    let mut pending = nontrivial_components(&all, &adjacency, &mut counter)?;
    while let Some(comp) = pending.pop() {
        let Some(&root) = comp.first() else {
            continue;
        };
        search_from(root, &comp, &adjacency, &names, &mut cycles, &mut counter)?;
        let rest: Vec<usize> = comp.into_iter().filter(|&v| v != root).collect();
        pending.extend(nontrivial_components(&rest, &adjacency, &mut counter)?);
    }

    cycles.sort();
    Ok(cycles)
}

/// Strongly connected components of the subgraph induced on `nodes`,
/// restricted to components that can carry a multi-node cycle. Members come
/// back sorted.
fn nontrivial_components(
    nodes: &[usize],
    adjacency: &[Vec<usize>],
    counter: &mut StepCounter,
) -> Result<Vec<Vec<usize>>, SolveError> {
    let mut local: Vec<Option<NodeIndex>> = vec![None; adjacency.len()];
    let mut induced: DiGraph<usize, ()> = DiGraph::new();
    for &v in nodes {
        counter.tick()?;
        local[v] = Some(induced.add_node(v));
    }
    for &v in nodes {
        let Some(from) = local[v] else {
            continue;
        };
        for &w in &adjacency[v] {
            if w == v {
                continue;
            }
            if let Some(to) = local[w] {
                counter.tick()?;
                induced.add_edge(from, to, ());
            }
        }
    }

    let mut comps = Vec::new();
    for scc in tarjan_scc(&induced) {
        if scc.len() < 2 {
            continue;
        }
        let mut members: Vec<usize> = scc.iter().map(|&idx| induced[idx]).collect();
        members.sort_unstable();
        comps.push(members);
    }
    Ok(comps)
}

struct Frame {
    v: usize,
    next: usize,
    found: bool,
}

/// Johnson's blocked DFS rooted at `root`, confined to the members of
/// `comp`, on an explicit frame stack.
fn search_from(
    root: usize,
    comp: &[usize],
    adjacency: &[Vec<usize>],
    names: &[String],
    cycles: &mut Vec<Cycle>,
    counter: &mut StepCounter,
) -> Result<(), SolveError> {
    let n = adjacency.len();
    let mut in_scope = vec![false; n];
    for &v in comp {
        in_scope[v] = true;
    }
    let mut blocked = vec![false; n];
    let mut block_list: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut path = vec![root];
    blocked[root] = true;
    let mut stack = vec![Frame {
        v: root,
        next: 0,
        found: false,
    }];

    while !stack.is_empty() {
        counter.tick()?;
        let top = stack.len() - 1;
        let v = stack[top].v;
        if stack[top].next < adjacency[v].len() {
            let w = adjacency[v][stack[top].next];
            stack[top].next += 1;
            if w == v || !in_scope[w] {
                continue;
            }
            if w == root {
                let members = path.iter().map(|&p| names[p].clone()).collect();
                cycles.push(Cycle::new(members));
                stack[top].found = true;
            } else if !blocked[w] {
                blocked[w] = true;
                path.push(w);
                stack.push(Frame {
                    v: w,
                    next: 0,
                    found: false,
                });
            }
        } else if let Some(frame) = stack.pop() {
            if frame.found {
                unblock(frame.v, &mut blocked, &mut block_list);
            } else {
                for &w in &adjacency[frame.v] {
                    if w == frame.v || !in_scope[w] {
                        continue;
                    }
                    if !block_list[w].contains(&frame.v) {
                        block_list[w].push(frame.v);
                    }
                }
            }
            path.pop();
            if let Some(parent) = stack.last_mut() {
                parent.found |= frame.found;
            }
        }
    }
    Ok(())
}

fn unblock(v: usize, blocked: &mut [bool], block_list: &mut [Vec<usize>]) {
    let mut pending = vec![v];
    while let Some(u) = pending.pop() {
        if blocked[u] {
            blocked[u] = false;
            pending.append(&mut block_list[u]);
        }
    }
}
