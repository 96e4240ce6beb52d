//! Forward and backward CPM passes over the typed dependency graph.
//!
//! Both passes release a task only once every neighbour on the incoming side
//! has been finalized, so each task is processed at most once and a cyclic
//! graph terminates. Tasks the queue never releases take the fallback dates.

use chrono::{Duration, NaiveDateTime};
use std::collections::VecDeque;

use crate::graph::DependencyGraph;
use crate::interner::TaskSlot;
use crate::models::{ConstraintType, DependencyType, Task};
use crate::{log_checks, log_debug};

use super::types::Propagation;

/// Per-slot task data the passes read.
pub(crate) struct SlotData {
    pub starts: Vec<NaiveDateTime>,
    pub durations: Vec<Duration>,
    pub constraints: Vec<Option<(ConstraintType, NaiveDateTime)>>,
}

impl SlotData {
    pub fn new(graph: &DependencyGraph, tasks: &[Task]) -> Self {
        let n = graph.len();
        let mut data = Self {
            starts: Vec::with_capacity(n),
            durations: Vec::with_capacity(n),
            constraints: Vec::with_capacity(n),
        };
        for slot in graph.interner.slots() {
            let task = &tasks[graph.interner.source_index(slot)];
            data.starts.push(task.start);
            data.durations.push(task.duration());
            data.constraints
                .push(task.constraint_type.zip(task.constraint_date));
        }
        data
    }
}

/// Early dates per slot.
pub(crate) struct ForwardPass {
    pub early_start: Vec<NaiveDateTime>,
    pub early_finish: Vec<NaiveDateTime>,
    pub status: Vec<Propagation>,
}

/// Late dates per slot.
pub(crate) struct BackwardPass {
    pub late_start: Vec<NaiveDateTime>,
    pub late_finish: Vec<NaiveDateTime>,
    pub status: Vec<Propagation>,
}

/// `at + by`, saturating at the representable date range instead of panicking.
pub(crate) fn shift(at: NaiveDateTime, by: Duration) -> NaiveDateTime {
    at.checked_add_signed(by).unwrap_or(if by < Duration::zero() {
        NaiveDateTime::MIN
    } else {
        NaiveDateTime::MAX
    })
}

/// Earliest start a successor may take given one finalized predecessor.
pub(crate) fn successor_start_candidate(
    kind: DependencyType,
    lag: Duration,
    pred_start: NaiveDateTime,
    pred_finish: NaiveDateTime,
    succ_duration: Duration,
) -> NaiveDateTime {
    match kind {
        DependencyType::FinishToStart => shift(pred_finish, lag),
        DependencyType::StartToStart => shift(pred_start, lag),
        DependencyType::FinishToFinish => shift(shift(pred_finish, lag), -succ_duration),
        DependencyType::StartToFinish => shift(shift(pred_start, lag), -succ_duration),
    }
}

/// Latest finish a predecessor may take given one finalized successor.
///
/// Exact inverse of [`successor_start_candidate`] for each kind.
pub(crate) fn predecessor_finish_candidate(
    kind: DependencyType,
    lag: Duration,
    succ_start: NaiveDateTime,
    succ_finish: NaiveDateTime,
    pred_duration: Duration,
) -> NaiveDateTime {
    match kind {
        DependencyType::FinishToStart => shift(succ_start, -lag),
        DependencyType::StartToStart => shift(shift(succ_start, -lag), pred_duration),
        DependencyType::FinishToFinish => shift(succ_finish, -lag),
        DependencyType::StartToFinish => shift(shift(succ_finish, -lag), pred_duration),
    }
}

fn constrain_early_start(
    early_start: NaiveDateTime,
    duration: Duration,
    constraint: Option<(ConstraintType, NaiveDateTime)>,
) -> NaiveDateTime {
    let Some((kind, date)) = constraint else {
        return early_start;
    };
    match kind {
        ConstraintType::StartNoEarlierThan => early_start.max(date),
        ConstraintType::FinishNoEarlierThan => early_start.max(shift(date, -duration)),
        ConstraintType::MustStartOn => date,
        ConstraintType::MustFinishOn => shift(date, -duration),
        ConstraintType::Asap
        | ConstraintType::Alap
        | ConstraintType::StartNoLaterThan
        | ConstraintType::FinishNoLaterThan => early_start,
    }
}

fn constrain_late_finish(
    late_finish: NaiveDateTime,
    duration: Duration,
    constraint: Option<(ConstraintType, NaiveDateTime)>,
) -> NaiveDateTime {
    let Some((kind, date)) = constraint else {
        return late_finish;
    };
    match kind {
        ConstraintType::StartNoLaterThan => late_finish.min(shift(date, duration)),
        ConstraintType::FinishNoLaterThan => late_finish.min(date),
        ConstraintType::MustStartOn => shift(date, duration),
        ConstraintType::MustFinishOn => date,
        ConstraintType::Asap
        | ConstraintType::Alap
        | ConstraintType::StartNoEarlierThan
        | ConstraintType::FinishNoEarlierThan => late_finish,
    }
}

/// Compute early start/finish for every slot.
///
/// Early start begins at the task's declared start and only ever moves later
/// as predecessor candidates arrive.
pub(crate) fn forward_pass(graph: &DependencyGraph, data: &SlotData, verbosity: u8) -> ForwardPass {
    let n = graph.len();
    let mut early_start = data.starts.clone();
    let mut early_finish: Vec<NaiveDateTime> = (0..n)
        .map(|i| shift(data.starts[i], data.durations[i]))
        .collect();
    let mut status = vec![Propagation::Fallback; n];
    let mut done = vec![false; n];
    let mut remaining: Vec<usize> = graph
        .interner
        .slots()
        .map(|s| graph.predecessors(s).len())
        .collect();

    let mut queue: VecDeque<TaskSlot> = graph
        .interner
        .slots()
        .filter(|&s| remaining[s as usize] == 0)
        .collect();

    while let Some(slot) = queue.pop_front() {
        let idx = slot as usize;
        if done[idx] {
            continue;
        }
        done[idx] = true;
        status[idx] = Propagation::Propagated;

        early_start[idx] =
            constrain_early_start(early_start[idx], data.durations[idx], data.constraints[idx]);
        early_finish[idx] = shift(early_start[idx], data.durations[idx]);

        for edge in graph.successors(slot) {
            let succ = edge.slot as usize;
            if done[succ] {
                continue;
            }
            let candidate = successor_start_candidate(
                edge.kind,
                edge.lag,
                early_start[idx],
                early_finish[idx],
                data.durations[succ],
            );
            if candidate > early_start[succ] {
                log_debug!(
                    verbosity,
                    "  forward {} -> {} ({}): early start {} -> {}",
                    graph.interner.resolve(slot),
                    graph.interner.resolve(edge.slot),
                    edge.kind,
                    early_start[succ],
                    candidate
                );
                early_start[succ] = candidate;
            }
            remaining[succ] -= 1;
            if remaining[succ] == 0 {
                queue.push_back(edge.slot);
            }
        }
    }

    for idx in 0..n {
        if !done[idx] {
            log_checks!(
                verbosity,
                "  forward fallback for {}: never released, using declared dates",
                graph.interner.resolve(idx as TaskSlot)
            );
            early_start[idx] = data.starts[idx];
            early_finish[idx] = shift(data.starts[idx], data.durations[idx]);
        }
    }

    ForwardPass {
        early_start,
        early_finish,
        status,
    }
}

/// Compute late start/finish for every slot, seeded at `project_end`.
///
/// Late finish begins at the project end and only ever moves earlier as
/// successor candidates arrive.
pub(crate) fn backward_pass(
    graph: &DependencyGraph,
    data: &SlotData,
    project_end: NaiveDateTime,
    verbosity: u8,
) -> BackwardPass {
    let n = graph.len();
    let mut late_finish = vec![project_end; n];
    let mut late_start: Vec<NaiveDateTime> =
        data.durations.iter().map(|&d| shift(project_end, -d)).collect();
    let mut status = vec![Propagation::Fallback; n];
    let mut done = vec![false; n];
    let mut remaining: Vec<usize> = graph
        .interner
        .slots()
        .map(|s| graph.successors(s).len())
        .collect();

    let mut queue: VecDeque<TaskSlot> = graph
        .interner
        .slots()
        .filter(|&s| remaining[s as usize] == 0)
        .collect();

    while let Some(slot) = queue.pop_front() {
        let idx = slot as usize;
        if done[idx] {
            continue;
        }
        done[idx] = true;
        status[idx] = Propagation::Propagated;

        late_finish[idx] =
            constrain_late_finish(late_finish[idx], data.durations[idx], data.constraints[idx]);
        late_start[idx] = shift(late_finish[idx], -data.durations[idx]);

        for edge in graph.predecessors(slot) {
            let pred = edge.slot as usize;
            if done[pred] {
                continue;
            }
            let candidate = predecessor_finish_candidate(
                edge.kind,
                edge.lag,
                late_start[idx],
                late_finish[idx],
                data.durations[pred],
            );
            if candidate < late_finish[pred] {
                log_debug!(
                    verbosity,
                    "  backward {} <- {} ({}): late finish {} -> {}",
                    graph.interner.resolve(edge.slot),
                    graph.interner.resolve(slot),
                    edge.kind,
                    late_finish[pred],
                    candidate
                );
                late_finish[pred] = candidate;
            }
            remaining[pred] -= 1;
            if remaining[pred] == 0 {
                queue.push_back(edge.slot);
            }
        }
    }

    for idx in 0..n {
        if !done[idx] {
            log_checks!(
                verbosity,
                "  backward fallback for {}: never released, using project end",
                graph.interner.resolve(idx as TaskSlot)
            );
            late_finish[idx] = project_end;
            late_start[idx] = shift(project_end, -data.durations[idx]);
        }
    }

    BackwardPass {
        late_start,
        late_finish,
        status,
    }
}
