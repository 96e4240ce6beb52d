//! Float computation and critical path extraction.

use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;

use crate::graph::DependencyGraph;
use crate::interner::TaskSlot;
use crate::models::DependencyType;

use super::calculation::{shift, BackwardPass, ForwardPass};
use super::types::{ScheduleResult, TaskSchedule};

/// Slack on one outgoing edge before the successor's early dates would move.
fn edge_slack(
    kind: DependencyType,
    lag: Duration,
    pred: (NaiveDateTime, NaiveDateTime),
    succ: (NaiveDateTime, NaiveDateTime),
) -> Duration {
    let (pred_start, pred_finish) = pred;
    let (succ_start, succ_finish) = succ;
    match kind {
        DependencyType::FinishToStart => succ_start - shift(pred_finish, lag),
        DependencyType::StartToStart => succ_start - shift(pred_start, lag),
        DependencyType::FinishToFinish => succ_finish - shift(pred_finish, lag),
        DependencyType::StartToFinish => succ_finish - shift(pred_start, lag),
    }
}

/// Whole days in `span`, rounded toward negative infinity.
fn floor_days(span: Duration) -> i64 {
    let days = span.num_days();
    if span < Duration::days(days) {
        days - 1
    } else {
        days
    }
}

/// Free float of one slot. A task without successors may slip to the project end.
///
/// Capped at total float and clamped at zero for display.
fn free_float(
    graph: &DependencyGraph,
    forward: &ForwardPass,
    slot: TaskSlot,
    project_end: NaiveDateTime,
    total_float: Duration,
) -> Duration {
    let idx = slot as usize;
    let pred = (forward.early_start[idx], forward.early_finish[idx]);
    let slack = graph
        .successors(slot)
        .iter()
        .map(|edge| {
            let succ = edge.slot as usize;
            edge_slack(
                edge.kind,
                edge.lag,
                pred,
                (forward.early_start[succ], forward.early_finish[succ]),
            )
        })
        .min()
        .unwrap_or(project_end - forward.early_finish[idx]);
    slack.min(total_float).max(Duration::zero())
}

/// Assemble the schedule result from both passes.
pub(crate) fn extract(
    graph: &DependencyGraph,
    forward: &ForwardPass,
    backward: &BackwardPass,
    project_start: Option<NaiveDateTime>,
    project_end: Option<NaiveDateTime>,
) -> ScheduleResult {
    let mut schedules = HashMap::with_capacity(graph.len());
    let mut critical: Vec<TaskSlot> = Vec::new();

    for slot in graph.interner.slots() {
        let idx = slot as usize;
        let total = backward.late_start[idx] - forward.early_start[idx];
        let total_float = floor_days(total);
        let free = match project_end {
            Some(end) => free_float(graph, forward, slot, end, total).num_days(),
            None => 0,
        };
        let is_critical = total == Duration::zero();
        if is_critical {
            critical.push(slot);
        }

        schedules.insert(
            graph.interner.resolve(slot).to_string(),
            TaskSchedule {
                early_start: forward.early_start[idx],
                early_finish: forward.early_finish[idx],
                late_start: backward.late_start[idx],
                late_finish: backward.late_finish[idx],
                total_float_duration: total,
                total_float,
                free_float: free,
                is_critical,
                forward: forward.status[idx],
                backward: backward.status[idx],
            },
        );
    }

    // Slots are numbered in input order, so they break early-start ties.
    critical.sort_by_key(|&slot| (forward.early_start[slot as usize], slot));

    let project_duration_days = match (project_start, project_end) {
        (Some(start), Some(end)) => (end - start).num_days(),
        _ => 0,
    };

    ScheduleResult {
        schedules,
        critical_path: critical
            .iter()
            .map(|&slot| graph.interner.resolve(slot).to_string())
            .collect(),
        project_start,
        project_end,
        project_duration_days,
        task_order: graph
            .interner
            .slots()
            .map(|slot| graph.interner.resolve(slot).to_string())
            .collect(),
    }
}
