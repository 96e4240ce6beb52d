//! Cycle detection and topological ordering.
//!
//! Both algorithms take a "depends-on" adjacency: `predecessors[v]` lists the
//! slots `v` depends on. Public entry points run over each task's own
//! predecessor-id list.

use std::collections::VecDeque;

use crate::graph::PredecessorGraph;
use crate::interner::TaskSlot;
use crate::models::Task;

/// Depth-first cycle search.
///
/// Every unvisited slot seeds one DFS. Reaching a slot that is still on the
/// recursion stack emits the path from that slot through the current one.
/// Cycles reached from different roots are not deduplicated.
pub(crate) fn dfs_cycles(predecessors: &[Vec<TaskSlot>]) -> Vec<Vec<TaskSlot>> {
    let n = predecessors.len();
    let mut visited = vec![false; n];
    let mut on_stack = vec![false; n];
    // Position of each on-stack slot within `path`.
    let mut path_pos = vec![usize::MAX; n];
    let mut path: Vec<TaskSlot> = Vec::new();
    let mut cycles = Vec::new();

    for root in 0..n {
        if visited[root] {
            continue;
        }

        // (slot, index of the next predecessor to explore)
        let mut stack: Vec<(TaskSlot, usize)> = vec![(root as TaskSlot, 0)];
        visited[root] = true;
        on_stack[root] = true;
        path_pos[root] = 0;
        path.push(root as TaskSlot);

        while let Some(frame) = stack.last_mut() {
            let (slot, next) = *frame;
            let preds = &predecessors[slot as usize];

            if next == preds.len() {
                stack.pop();
                path.pop();
                on_stack[slot as usize] = false;
                path_pos[slot as usize] = usize::MAX;
                continue;
            }
            frame.1 += 1;

            let pred = preds[next] as usize;
            if on_stack[pred] {
                cycles.push(path[path_pos[pred]..].to_vec());
            } else if !visited[pred] {
                visited[pred] = true;
                on_stack[pred] = true;
                path_pos[pred] = path.len();
                path.push(pred as TaskSlot);
                stack.push((pred as TaskSlot, 0));
            }
        }
    }

    cycles
}

/// Kahn's algorithm. Predecessors come before successors; ties keep slot order.
///
/// Returns `None` when not every slot can be ordered (the graph has a cycle).
pub(crate) fn kahn_order(predecessors: &[Vec<TaskSlot>]) -> Option<Vec<TaskSlot>> {
    let n = predecessors.len();
    let mut in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();
    let mut successors: Vec<Vec<TaskSlot>> = vec![Vec::new(); n];
    for (slot, preds) in predecessors.iter().enumerate() {
        for &pred in preds {
            successors[pred as usize].push(slot as TaskSlot);
        }
    }

    let mut queue: VecDeque<TaskSlot> = (0..n)
        .filter(|&slot| in_degree[slot] == 0)
        .map(|slot| slot as TaskSlot)
        .collect();
    let mut order = Vec::with_capacity(n);

    while let Some(slot) = queue.pop_front() {
        order.push(slot);
        for &succ in &successors[slot as usize] {
            let degree = &mut in_degree[succ as usize];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(succ);
            }
        }
    }

    (order.len() == n).then_some(order)
}

/// Find circular dependencies among tasks' predecessor-id lists.
///
/// Each cycle lists task ids in dependency order without repeating the first
/// id, ready to print as `a → b → c`.
pub fn detect_cycles(tasks: &[Task]) -> Vec<Vec<String>> {
    let graph = PredecessorGraph::build(tasks);
    dfs_cycles(graph.predecessors())
        .iter()
        .map(|cycle| graph.resolve_all(cycle))
        .collect()
}

/// Order tasks so each appears after all of its predecessor ids.
///
/// Returns `None` if the predecessor lists contain a cycle; no partial order
/// is produced.
pub fn topological_sort(tasks: &[Task]) -> Option<Vec<String>> {
    let graph = PredecessorGraph::build(tasks);
    kahn_order(graph.predecessors()).map(|order| graph.resolve_all(&order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use rustc_hash::FxHashMap;

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
    fn test_three_task_cycle() {
        let tasks = vec![
            make_task("A", &["B"]),
            make_task("B", &["C"]),
            make_task("C", &["A"]),
        ];
        let cycles = detect_cycles(&tasks);

        assert!(!cycles.is_empty());
        let cycle = &cycles[0];
        assert_eq!(cycle, &vec!["A", "B", "C"]);
        assert!(topological_sort(&tasks).is_none());
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let tasks = vec![make_task("a", &["a"])];
        assert_eq!(detect_cycles(&tasks), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn test_two_disjoint_cycles() {
        let tasks = vec![
            make_task("a", &["b"]),
            make_task("b", &["a"]),
            make_task("c", &["d"]),
            make_task("d", &["c"]),
            make_task("e", &[]),
        ];
        let cycles = detect_cycles(&tasks);
        assert_eq!(cycles.len(), 2);
        assert!(cycles.iter().any(|c| c.contains(&"a".to_string())));
        assert!(cycles.iter().any(|c| c.contains(&"c".to_string())));
    }

    #[test]
    fn test_acyclic_has_no_cycles() {
        let tasks = vec![
            make_task("a", &[]),
            make_task("b", &["a"]),
            make_task("c", &["a"]),
            make_task("d", &["b", "c"]),
        ];
        assert!(detect_cycles(&tasks).is_empty());
    }

    #[test]
    fn test_topological_sort_respects_predecessors() {
        let tasks = vec![
            make_task("d", &["b", "c"]),
            make_task("c", &["a"]),
            make_task("b", &["a"]),
            make_task("a", &[]),
            make_task("e", &["missing"]),
        ];
        let order = topological_sort(&tasks).unwrap();
        assert_eq!(order.len(), tasks.len());

        let pos: FxHashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        for task in &tasks {
            for pred in &task.dependencies {
                if let Some(&p) = pos.get(pred.as_str()) {
                    assert!(p < pos[task.id.as_str()], "{} before {}", pred, task.id);
                }
            }
        }
    }

    #[test]
    fn test_topological_sort_generated_dags() {
        // Each task depends on a deterministic subset of earlier tasks, listed in reverse.
        for n in 1..30usize {
            let ids: Vec<String> = (0..n).map(|i| format!("t{}", i)).collect();
            let tasks: Vec<Task> = (0..n)
                .rev()
                .map(|i| {
                    let deps: Vec<&str> = (0..i)
                        .filter(|j| (i * 7 + j * 3) % 4 == 0)
                        .map(|j| ids[j].as_str())
                        .collect();
                    make_task(&ids[i], &deps)
                })
                .collect();

            let order = topological_sort(&tasks).unwrap();
            let pos: FxHashMap<&str, usize> = order
                .iter()
                .enumerate()
                .map(|(i, id)| (id.as_str(), i))
                .collect();
            for task in &tasks {
                for pred in &task.dependencies {
                    assert!(pos[pred.as_str()] < pos[task.id.as_str()]);
                }
            }
            assert!(detect_cycles(&tasks).is_empty());
        }
    }
}
