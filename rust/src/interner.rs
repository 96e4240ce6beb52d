//! Dense integer ids for task id strings.
//!
//! The graph and both CPM passes work on `u32` slots so per-task state lives in
//! plain vectors. Slot order is input order of first occurrence, which doubles as
//! the tie-break order for critical path output.

use rustc_hash::FxHashMap;

use crate::models::Task;

/// Interned task slot.
pub type TaskSlot = u32;

/// Maps task id strings to slots and back.
#[derive(Debug, Clone, Default)]
pub struct TaskIdInterner {
    to_slot: FxHashMap<String, TaskSlot>,
    from_slot: Vec<String>,
    /// Index into the caller's task slice for each slot.
    source_index: Vec<usize>,
}

impl TaskIdInterner {
    /// Intern every task id in order. Later duplicates of an id resolve to the
    /// slot of the first occurrence and are otherwise ignored.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut interner = Self {
            to_slot: FxHashMap::with_capacity_and_hasher(tasks.len(), Default::default()),
            from_slot: Vec::with_capacity(tasks.len()),
            source_index: Vec::with_capacity(tasks.len()),
        };
        for (index, task) in tasks.iter().enumerate() {
            if interner.to_slot.contains_key(&task.id) {
                continue;
            }
            let slot = interner.from_slot.len() as TaskSlot;
            interner.to_slot.insert(task.id.clone(), slot);
            interner.from_slot.push(task.id.clone());
            interner.source_index.push(index);
        }
        interner
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<TaskSlot> {
        self.to_slot.get(id).copied()
    }

    #[inline]
    pub fn resolve(&self, slot: TaskSlot) -> &str {
        &self.from_slot[slot as usize]
    }

    /// Position of the slot's task in the caller's task slice.
    #[inline]
    pub fn source_index(&self, slot: TaskSlot) -> usize {
        self.source_index[slot as usize]
    }

    pub fn slots(&self) -> impl Iterator<Item = TaskSlot> {
        0..self.from_slot.len() as TaskSlot
    }

    pub fn len(&self) -> usize {
        self.from_slot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from_slot.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: &str) -> Task {
        let t = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Task::new(id, id, t, t)
    }

    #[test]
    fn test_first_occurrence_wins() {
        let tasks = vec![task("a"), task("b"), task("a"), task("c")];
        let interner = TaskIdInterner::from_tasks(&tasks);

        assert_eq!(interner.len(), 3);
        assert_eq!(interner.get("a"), Some(0));
        assert_eq!(interner.get("c"), Some(2));
        assert_eq!(interner.source_index(2), 3);
        assert_eq!(interner.resolve(1), "b");
        assert_eq!(interner.get("nonexistent"), None);
    }
}
