//! Virtual clock and one-shot timer queue.
//!
//! Every tick of every typewriter is a one-shot timer scheduled by the tick
//! before it, so cadence can change between ticks without a shared interval.
//! Timers fire in `(due, sequence)` order which makes runs reproducible and
//! lets tests step time by hand.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::ids::{TargetId, TimerId};

/// A timer popped from the queue because its due time was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Due {
    pub id: TimerId,
    pub owner: TargetId,
    pub at: u64,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    at: u64,
    id: TimerId,
    owner: TargetId,
}

// Timer ids are handed out in scheduling order, so they double as the
// insertion sequence for tie-breaking.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.id == other.id
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
        self.at.cmp(&other.at).then(self.id.cmp(&other.id))
    }
}

/// Min-heap of pending timers plus the current virtual time in milliseconds.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: u64,
    next_id: u64,
    heap: BinaryHeap<Reverse<Entry>>,
    cancelled: HashSet<TimerId>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule a one-shot timer `delay_ms` from now on behalf of `owner`.
    pub fn schedule_in(&mut self, delay_ms: u64, owner: TargetId) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse(Entry {
            at: self.now.saturating_add(delay_ms),
            id,
            owner,
        }));
        id
    }

    /// Cancel a pending timer. Cancelling an already-fired id is harmless.
    pub fn cancel(&mut self, id: TimerId) {
        if self.heap.iter().any(|Reverse(e)| e.id == id) {
            self.cancelled.insert(id);
        }
    }

    /// Due time of the earliest live timer.
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.skip_cancelled();
        self.heap.peek().map(|Reverse(e)| e.at)
    }

    /// Pop the earliest live timer due at or before `until`, moving the clock
    /// to its due time.
    pub fn pop_due(&mut self, until: u64) -> Option<Due> {
        self.skip_cancelled();
        let due = match self.heap.peek() {
            Some(Reverse(e)) if e.at <= until => *e,
            _ => return None,
        };
        self.heap.pop();
        self.now = self.now.max(due.at);
        Some(Due {
            id: due.id,
            owner: due.owner,
            at: due.at,
        })
    }

    /// Move the clock forward to `until`. Time never runs backwards.
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    /// Number of live pending timers.
    pub fn len(&self) -> usize {
        self.heap
            .iter()
            .filter(|Reverse(e)| !self.cancelled.contains(&e.id))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn skip_cancelled(&mut self) {
        while let Some(Reverse(e)) = self.heap.peek() {
            if !self.cancelled.remove(&e.id) {
                break;
            }
            self.heap.pop();
        }
    }
}
