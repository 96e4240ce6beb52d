//! Dependency graphs over interned task slots.
//!
//! Two views are kept apart on purpose:
//! - [`DependencyGraph`]: typed edges (kind + lag) merged from the explicit
//!   dependency list and each task's predecessor ids. CPM runs on this.
//! - [`PredecessorGraph`]: only the predecessor-id lists, untyped. The cycle
//!   detector and topological sorter run on this.

use chrono::Duration;
use rustc_hash::FxHashSet;

use crate::interner::{TaskIdInterner, TaskSlot};
use crate::models::{Dependency, DependencyType, Task};
use crate::topology;

/// One side of a typed edge, as seen from the other endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// The task at the other end of the edge.
    pub slot: TaskSlot,
    pub kind: DependencyType,
    pub lag: Duration,
}

/// Typed predecessor/successor adjacency for every task.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    pub interner: TaskIdInterner,
    predecessors: Vec<Vec<Edge>>,
    successors: Vec<Vec<Edge>>,
    dropped: usize,
}

impl DependencyGraph {
    /// Merge explicit dependencies with predecessor-id lists.
    ///
    /// Explicit entries are inserted first; a predecessor id only adds a
    /// zero-lag finish-to-start edge when no edge exists yet for that
    /// `(from, to)` pair. Edges naming an unknown task are dropped.
    pub fn build(tasks: &[Task], dependencies: &[Dependency]) -> Self {
        let interner = TaskIdInterner::from_tasks(tasks);
        let n = interner.len();
        let mut graph = Self {
            predecessors: vec![Vec::new(); n],
            successors: vec![Vec::new(); n],
            dropped: 0,
            interner,
        };
        let mut seen: FxHashSet<(TaskSlot, TaskSlot)> = FxHashSet::default();

        for dep in dependencies {
            let endpoints = (
                graph.interner.get(&dep.from_task_id),
                graph.interner.get(&dep.to_task_id),
            );
            match endpoints {
                (Some(from), Some(to)) => {
                    if seen.insert((from, to)) {
                        graph.insert(from, to, dep.kind, dep.lag);
                    }
                }
                _ => graph.dropped += 1,
            }
        }

        for slot in graph.interner.slots() {
            let task = &tasks[graph.interner.source_index(slot)];
            for pred_id in &task.dependencies {
                let Some(from) = graph.interner.get(pred_id) else {
                    graph.dropped += 1;
                    continue;
                };
                if seen.insert((from, slot)) {
                    graph.insert(from, slot, DependencyType::FinishToStart, Duration::zero());
                }
            }
        }

        graph
    }

    fn insert(&mut self, from: TaskSlot, to: TaskSlot, kind: DependencyType, lag: Duration) {
        self.successors[from as usize].push(Edge { slot: to, kind, lag });
        self.predecessors[to as usize].push(Edge {
            slot: from,
            kind,
            lag,
        });
    }

    #[inline]
    pub fn predecessors(&self, slot: TaskSlot) -> &[Edge] {
        &self.predecessors[slot as usize]
    }

    #[inline]
    pub fn successors(&self, slot: TaskSlot) -> &[Edge] {
        &self.successors[slot as usize]
    }

    pub fn len(&self) -> usize {
        self.interner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }

    /// Number of edges discarded because an endpoint was not a known task.
    pub fn dropped_edges(&self) -> usize {
        self.dropped
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    fn predecessor_slots(&self) -> Vec<Vec<TaskSlot>> {
        self.predecessors
            .iter()
            .map(|edges| edges.iter().map(|e| e.slot).collect())
            .collect()
    }

    /// Topological order over typed edges, `None` if they contain a cycle.
    pub fn topological_order(&self) -> Option<Vec<String>> {
        topology::kahn_order(&self.predecessor_slots()).map(|order| self.resolve_all(&order))
    }

    /// Cycles over typed edges, each listed in dependency order.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        topology::dfs_cycles(&self.predecessor_slots())
            .iter()
            .map(|cycle| self.resolve_all(cycle))
            .collect()
    }

    fn resolve_all(&self, slots: &[TaskSlot]) -> Vec<String> {
        slots
            .iter()
            .map(|&s| self.interner.resolve(s).to_string())
            .collect()
    }
}

/// Untyped adjacency built only from each task's predecessor-id list.
#[derive(Debug, Clone)]
pub struct PredecessorGraph {
    pub interner: TaskIdInterner,
    predecessors: Vec<Vec<TaskSlot>>,
}

impl PredecessorGraph {
    pub fn build(tasks: &[Task]) -> Self {
        let interner = TaskIdInterner::from_tasks(tasks);
        let predecessors = interner
            .slots()
            .map(|slot| {
                let task = &tasks[interner.source_index(slot)];
                let mut seen = FxHashSet::default();
                task.dependencies
                    .iter()
                    .filter_map(|id| interner.get(id))
                    .filter(|pred| seen.insert(*pred))
                    .collect()
            })
            .collect();
        Self {
            interner,
            predecessors,
        }
    }

    pub fn predecessors(&self) -> &[Vec<TaskSlot>] {
        &self.predecessors
    }

    pub fn resolve_all(&self, slots: &[TaskSlot]) -> Vec<String> {
        slots
            .iter()
            .map(|&s| self.interner.resolve(s).to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn make_task(id: &str, deps: &[&str]) -> Task {
        Task::new(id, id, day(1), day(2)).with_dependencies(deps.iter().copied())
    }

    #[test]
    fn test_explicit_edge_wins_over_predecessor_id() {
        let tasks = vec![make_task("a", &[]), make_task("b", &["a"])];
        let deps = vec![Dependency::new(
            "a",
            "b",
            DependencyType::StartToStart,
            Duration::days(2),
        )];
        let graph = DependencyGraph::build(&tasks, &deps);

        let b = graph.interner.get("b").unwrap();
        assert_eq!(graph.predecessors(b).len(), 1);
        assert_eq!(graph.predecessors(b)[0].kind, DependencyType::StartToStart);
        assert_eq!(graph.predecessors(b)[0].lag, Duration::days(2));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_predecessor_id_becomes_zero_lag_fs() {
        let tasks = vec![make_task("a", &[]), make_task("b", &["a", "a"])];
        let graph = DependencyGraph::build(&tasks, &[]);

        let a = graph.interner.get("a").unwrap();
        assert_eq!(
            graph.successors(a),
            &[Edge {
                slot: 1,
                kind: DependencyType::FinishToStart,
                lag: Duration::zero()
            }]
        );
    }

    #[test]
    fn test_unknown_endpoints_dropped() {
        let tasks = vec![make_task("a", &["ghost"])];
        let deps = vec![Dependency::finish_to_start("a", "nowhere")];
        let graph = DependencyGraph::build(&tasks, &deps);

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.dropped_edges(), 2);
    }

    #[test]
    fn test_typed_cycle_found_only_in_dependency_graph() {
        let tasks = vec![make_task("a", &[]), make_task("b", &["a"])];
        let deps = vec![Dependency::finish_to_start("b", "a")];
        let graph = DependencyGraph::build(&tasks, &deps);

        assert!(graph.topological_order().is_none());
        assert_eq!(graph.find_cycles().len(), 1);

        let simple = PredecessorGraph::build(&tasks);
        assert!(topology::kahn_order(simple.predecessors()).is_some());
    }
}
