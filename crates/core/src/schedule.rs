//! Tick-driven timer for deferred work such as delayed resets and camera pans.

use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// Holds tasks until enough simulated time has elapsed. Nothing runs on its
/// own; callers drive the clock through [`Scheduler::advance`].
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, TaskId), T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self { now: Duration::ZERO, next_id: 0, pending: BTreeMap::new() }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.insert((self.now + delay, id), task);
        id
    }

    /// Drops a pending task. Returns it if it had not fired yet.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let key = self.pending.keys().find(|(_, pending)| *pending == id).copied()?;
        self.pending.remove(&key)
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Moves the clock forward and returns every task now due, earliest first.
    /// Tasks due at the same instant come out in scheduling order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<T> {
        self.now += elapsed;
        let mut due = Vec::new();
        while let Some(entry) = self.pending.first_entry() {
            if entry.key().0 > self.now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }
}
