//! Keyed, cancellable deferred tasks and the clock that drives them.
//!
//! The engine never sleeps or spawns threads. A task is just a deadline
//! stored under a key; the host calls `tick` and whatever is due gets
//! handed back for the owner to act on after re-checking that it still
//! applies. Scheduling a key again replaces its previous deadline.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock: fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler<K: Ord + Copy> {
    deadlines: BTreeMap<K, Instant>,
}

impl<K: Ord + Copy> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            deadlines: BTreeMap::new(),
        }
    }

    /// Schedule `key` to fire `delay` after `now`, replacing any pending
    /// deadline for the same key.
    pub fn schedule(&mut self, key: K, now: Instant, delay: Duration) {
        self.deadlines.insert(key, now + delay);
    }

    /// Returns whether a pending task was removed.
    pub fn cancel(&mut self, key: K) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    pub fn cancel_where<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&K) -> bool,
    {
        self.deadlines.retain(|key, _| !predicate(key));
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.deadlines.contains_key(&key)
    }

    pub fn deadline(&self, key: K) -> Option<Instant> {
        self.deadlines.get(&key).copied()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Remove and return every task due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<(Instant, K)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (*deadline, *key))
            .collect();
        due.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        for (_, key) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_tasks_come_back_in_deadline_order() {
        let clock = ManualClock::new();
        let mut s = Scheduler::new();
        s.schedule('b', clock.now(), Duration::from_millis(501));
        s.schedule('a', clock.now(), Duration::from_millis(500));
        clock.advance_ms(499);
        assert!(s.take_due(clock.now()).is_empty());
        clock.advance_ms(2);
        assert_eq!(s.take_due(clock.now()), vec!['a', 'b']);
        assert!(s.is_empty());
    }

    #[test]
    fn rescheduling_replaces_the_deadline() {
        let clock = ManualClock::new();
        let mut s = Scheduler::new();
        s.schedule(1u8, clock.now(), Duration::from_millis(100));
        clock.advance_ms(90);
        s.schedule(1u8, clock.now(), Duration::from_millis(100));
        clock.advance_ms(20);
        assert!(s.take_due(clock.now()).is_empty());
        clock.advance_ms(80);
        assert_eq!(s.take_due(clock.now()), vec![1u8]);
    }

    #[test]
    fn cancelled_task_never_fires() {
        let clock = ManualClock::new();
        let mut s = Scheduler::new();
        s.schedule(3u8, clock.now(), Duration::from_millis(10));
        assert!(s.cancel(3));
        assert!(!s.cancel(3));
        clock.advance_ms(50);
        assert!(s.take_due(clock.now()).is_empty());
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        let start = b.now();
        a.advance_ms(5);
        assert_eq!(b.now() - start, Duration::from_millis(5));
    }
}
