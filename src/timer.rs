//! Virtual one-shot timers polled from the frame loop, plus a shared
//! cancellation flag for the loop itself.
//!
//! Strikes, echo bolts and thunder cues are all "do X at time T" requests
//! owned by the scene; teardown is a single `clear()`.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    due: f64,
    task: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn schedule(&mut self, due: f64, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, due, task });
        id
    }

    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn due_of(&self, id: TimerId) -> Option<f64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.due)
    }

    pub fn next_due(&self) -> Option<f64> {
        self.entries.iter().map(|e| e.due).reduce(f64::min)
    }

    /// Remove and return every task due at or before `now`, earliest first
    /// (ties keep scheduling order).
    pub fn drain_due(&mut self, now: f64) -> Vec<T> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due <= now {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|e| e.task).collect()
    }
}

/// Cloneable stop flag shared between the frame loop and its owner.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_only_due_tasks_in_order() {
        let mut q = TimerQueue::new();
        q.schedule(300.0, "c");
        q.schedule(100.0, "a");
        q.schedule(100.0, "b");
        q.schedule(900.0, "late");
        assert_eq!(q.next_due(), Some(100.0));
        assert_eq!(q.drain_due(300.0), vec!["a", "b", "c"]);
        assert_eq!(q.len(), 1);
        assert!(q.drain_due(899.0).is_empty());
        assert_eq!(q.drain_due(900.0), vec!["late"]);
        assert!(q.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut q = TimerQueue::new();
        let id = q.schedule(10.0, 1);
        q.schedule(20.0, 2);
        assert!(q.is_pending(id));
        assert_eq!(q.due_of(id), Some(10.0));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert_eq!(q.drain_due(100.0), vec![2]);
    }

    #[test]
    fn token_is_shared_between_clones() {
        let token = CancelToken::new();
        let loop_side = token.clone();
        assert!(!loop_side.is_cancelled());
        token.cancel();
        assert!(loop_side.is_cancelled());
    }
}
