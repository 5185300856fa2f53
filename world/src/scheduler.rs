//! Deferred task queue driven by the simulation clock.
//!
//! Tasks fire in due-time order, ties broken by submission order. A task only
//! names the entity it belongs to; whoever runs it must confirm the entity
//! still exists before touching it.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use hive_frontier_core::{CreatureId, SimTime, SpawnPointId};

/// Work deferred to a later clock value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Task {
    /// One staggered creation of a wave.
    CreateCreature {
        spawn_point: SpawnPointId,
        population_cap: u32,
    },
    /// Copies the spawn point's current focus into a fresh creature.
    AssignFocus {
        spawn_point: SpawnPointId,
        creature: CreatureId,
    },
    /// Re-binds a restored spawn point to the zone under it.
    ResolveZone {
        spawn_point: SpawnPointId,
        attempt: u32,
    },
    /// Deletes the spawn point if nothing in its roster is alive.
    CheckPopulation { spawn_point: SpawnPointId },
}

impl Task {
    pub(crate) const fn spawn_point(&self) -> SpawnPointId {
        match self {
            Self::CreateCreature { spawn_point, .. }
            | Self::AssignFocus { spawn_point, .. }
            | Self::ResolveZone { spawn_point, .. }
            | Self::CheckPopulation { spawn_point } => *spawn_point,
        }
    }
}

#[derive(Debug)]
struct Entry {
    due: SimTime,
    sequence: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.sequence == other.sequence
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// Priority queue of pending tasks.
#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    queue: BinaryHeap<Reverse<Entry>>,
    next_sequence: u64,
}

impl Scheduler {
    pub(crate) fn schedule(&mut self, due: SimTime, task: Task) {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.queue.push(Reverse(Entry {
            due,
            sequence,
            task,
        }));
    }

    /// Removes every task due at or before `now`, in firing order.
    ///
    /// Tasks scheduled while the returned batch runs wait for a later call,
    /// even when their due time has also passed.
    pub(crate) fn take_due(&mut self, now: SimTime) -> Vec<Task> {
        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.queue.peek() {
            if entry.due > now {
                break;
            }
            if let Some(Reverse(entry)) = self.queue.pop() {
                due.push(entry.task);
            }
        }
        due
    }

    /// Pending tasks in firing order.
    pub(crate) fn pending(&self) -> Vec<(SimTime, Task)> {
        let mut entries: Vec<&Entry> = self.queue.iter().map(|Reverse(entry)| entry).collect();
        entries.sort();
        entries
            .into_iter()
            .map(|entry| (entry.due, entry.task))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(id: u32) -> Task {
        Task::CheckPopulation {
            spawn_point: SpawnPointId::new(id),
        }
    }

    #[test]
    fn fires_in_due_order_then_submission_order() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(SimTime::from_millis(666), check(2));
        scheduler.schedule(SimTime::from_millis(333), check(1));
        scheduler.schedule(SimTime::from_millis(666), check(3));
        scheduler.schedule(SimTime::from_millis(333), check(4));

        let fired: Vec<u32> = scheduler
            .take_due(SimTime::from_millis(1_000))
            .iter()
            .map(|task| task.spawn_point().get())
            .collect();
        assert_eq!(fired, vec![1, 4, 2, 3]);
    }

    #[test]
    fn holds_tasks_until_due() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(SimTime::from_millis(500), check(1));

        assert_eq!(scheduler.take_due(SimTime::from_millis(499)), Vec::new());
        assert_eq!(scheduler.take_due(SimTime::from_millis(500)), vec![check(1)]);
        assert_eq!(scheduler.take_due(SimTime::from_millis(10_000)), Vec::new());
    }

    #[test]
    fn tasks_scheduled_after_a_take_wait_for_the_next_one() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(SimTime::from_millis(100), check(1));

        let first = scheduler.take_due(SimTime::from_millis(5_000));
        assert_eq!(first, vec![check(1)]);
        scheduler.schedule(SimTime::from_millis(200), check(2));

        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(scheduler.take_due(SimTime::from_millis(5_000)), vec![check(2)]);
    }

    #[test]
    fn pending_lists_tasks_in_firing_order() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule(SimTime::from_millis(30), check(3));
        scheduler.schedule(SimTime::from_millis(10), check(1));
        scheduler.schedule(SimTime::from_millis(20), check(2));

        let due: Vec<u64> = scheduler
            .pending()
            .into_iter()
            .map(|(due, _)| due.as_millis())
            .collect();
        assert_eq!(due, vec![10, 20, 30]);
    }
}
