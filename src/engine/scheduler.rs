//! Delayed tasks keyed to the audio clock.
//!
//! The tone manager uses this for deferred teardown: when a note is released,
//! a cleanup task is queued for the moment its release tail has finished. The
//! owner polls with the current frame count and receives every task that has
//! come due, in due order. Tasks can be cancelled by id before they fire.
//!
//! Due times are whole frames, not seconds. Both sides of the comparison come
//! from the same integer counter, so a task due at frame N fires on the poll
//! after frame N is rendered and never one poll late.

use std::fmt;

/// Identifier returned by [`Scheduler::schedule`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    id: TaskId,
    due: u64,
    task: T,
}

/// A queue of tasks sorted by due frame on the audio clock.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    tasks: Vec<Scheduled<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
        }
    }

    /// Queue `task` to fire once frame `due` has been rendered. Tasks with
    /// equal due frames fire in the order they were scheduled.
    pub fn schedule(&mut self, due: u64, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        // Find insertion point to maintain sorted order
        let pos = self.tasks.partition_point(|t| t.due <= due);
        self.tasks.insert(pos, Scheduled { id, due, task });
        id
    }

    /// Remove a pending task. Returns it if it had not fired yet.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos).task)
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Due frame of a pending task.
    pub fn due_frame(&self, id: TaskId) -> Option<u64> {
        self.tasks.iter().find(|t| t.id == id).map(|t| t.due)
    }

    /// Due frame of the earliest pending task.
    pub fn next_due(&self) -> Option<u64> {
        self.tasks.first().map(|t| t.due)
    }

    /// Pop every task due at or before frame `now`, earliest first.
    pub fn pop_due(&mut self, now: u64) -> Vec<(TaskId, T)> {
        let count = self.tasks.partition_point(|t| t.due <= now);
        self.tasks
            .drain(..count)
            .map(|scheduled| (scheduled.id, scheduled.task))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
