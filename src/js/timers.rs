// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Timer queue for setTimeout/setInterval management
//!
//! Runs on a virtual millisecond clock owned by the page. The page host
//! advances it by elapsed wall time; tests advance it directly, so the
//! delivery poll loop can be exercised without sleeping.

use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

/// Smallest delay an interval may repeat at
const MIN_INTERVAL_MS: u64 = 1;

/// Timer entry in the queue
#[derive(Debug, Clone)]
pub struct TimerEntry {
    /// Timer ID as handed back to the script
    pub id: u32,
    /// Virtual time at which the timer fires
    pub fire_at_ms: u64,
    /// Whether this is an interval (repeating)
    pub is_interval: bool,
    /// Interval duration (for repeating timers)
    pub interval_ms: u64,
    /// Insertion order, breaks ties between equal `fire_at_ms`
    seq: u64,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at_ms == other.fire_at_ms && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse order for min-heap (earliest fires first)
        other
            .fire_at_ms
            .cmp(&self.fire_at_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Timer queue for managing setTimeout/setInterval
#[derive(Debug, Default)]
pub struct TimerQueue {
    /// Pending timers (min-heap by fire_at_ms)
    timers: BinaryHeap<TimerEntry>,
    /// Cancelled timer IDs still sitting in the heap
    cancelled: HashSet<u32>,
    /// Current virtual time
    now_ms: u64,
    /// Next insertion sequence number
    next_seq: u64,
}

impl TimerQueue {
    /// Create a new timer queue at virtual time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule a setTimeout
    pub fn set_timeout(&mut self, id: u32, delay_ms: u64) {
        self.push(id, delay_ms, false);
    }

    /// Schedule a setInterval
    pub fn set_interval(&mut self, id: u32, interval_ms: u64) {
        self.push(id, interval_ms.max(MIN_INTERVAL_MS), true);
    }

    fn push(&mut self, id: u32, delay_ms: u64, is_interval: bool) {
        // an id may be reused after clearTimeout; the new timer is live
        self.cancelled.remove(&id);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(TimerEntry {
            id,
            fire_at_ms: self.now_ms + delay_ms,
            is_interval,
            interval_ms: delay_ms,
            seq,
        });
    }

    /// Cancel a timer (setTimeout or setInterval)
    pub fn clear_timer(&mut self, id: u32) {
        if self.timers.iter().any(|t| t.id == id) {
            self.cancelled.insert(id);
        }
    }

    /// Check if there are pending timers
    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// Get number of pending timers
    pub fn pending_count(&self) -> usize {
        self.timers
            .iter()
            .filter(|t| !self.cancelled.contains(&t.id))
            .count()
    }

    /// Pop the next timer due at or before `until_ms`
    ///
    /// The clock moves forward to the timer's fire time. Intervals are
    /// rescheduled before being returned, so a callback that clears its own
    /// interval cancels the next run.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerEntry> {
        loop {
            let next = self.timers.peek()?;
            if next.fire_at_ms > until_ms {
                return None;
            }
            let entry = self.timers.pop()?;

            if self.cancelled.remove(&entry.id) {
                continue;
            }

            self.now_ms = self.now_ms.max(entry.fire_at_ms);

            if entry.is_interval {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.timers.push(TimerEntry {
                    fire_at_ms: self.now_ms + entry.interval_ms,
                    seq,
                    ..entry.clone()
                });
            }

            return Some(entry);
        }
    }

    /// Whether a live timer is due at or before `until_ms`
    pub fn has_due(&self, until_ms: u64) -> bool {
        self.timers
            .iter()
            .any(|t| t.fire_at_ms <= until_ms && !self.cancelled.contains(&t.id))
    }

    /// Move the clock forward without firing anything
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Wait duration until next timer fires (for scheduling)
    pub fn time_until_next(&self) -> Option<Duration> {
        self.timers
            .iter()
            .filter(|t| !self.cancelled.contains(&t.id))
            .map(|t| Duration::from_millis(t.fire_at_ms.saturating_sub(self.now_ms)))
            .min()
    }
}

/// Result of running the page's timers for a stretch of time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsIdleResult {
    /// Number of timers executed
    pub timers_executed: usize,
    /// Whether the execution cap stopped the run early
    pub hit_limit: bool,
    /// Virtual time after the run
    pub now_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_timeout() {
        let mut queue = TimerQueue::new();
        queue.set_timeout(1, 100);
        assert!(queue.has_pending());
        assert!(queue.pop_due(99).is_none());

        let entry = queue.pop_due(100).unwrap();
        assert_eq!(entry.id, 1);
        assert_eq!(queue.now_ms(), 100);
        assert!(!queue.has_pending());
    }

    #[test]
    fn test_clear_timeout() {
        let mut queue = TimerQueue::new();
        queue.set_timeout(1, 100);
        queue.clear_timer(1);

        assert!(!queue.has_pending());
        assert!(queue.pop_due(1_000).is_none());
    }

    #[test]
    fn test_interval_repeats_until_cleared() {
        let mut queue = TimerQueue::new();
        queue.set_interval(7, 500);

        let fired: Vec<u64> = std::iter::from_fn(|| queue.pop_due(2_000))
            .map(|e| e.fire_at_ms)
            .collect();
        assert_eq!(fired, vec![500, 1_000, 1_500, 2_000]);

        queue.clear_timer(7);
        assert!(queue.pop_due(10_000).is_none());
    }

    #[test]
    fn test_equal_deadlines_fire_in_insertion_order() {
        let mut queue = TimerQueue::new();
        queue.set_timeout(2, 10);
        queue.set_timeout(1, 10);

        assert_eq!(queue.pop_due(10).unwrap().id, 2);
        assert_eq!(queue.pop_due(10).unwrap().id, 1);
    }

    #[test]
    fn test_time_until_next() {
        let mut queue = TimerQueue::new();
        assert!(queue.time_until_next().is_none());
        queue.set_timeout(1, 300);
        queue.advance_to(100);
        assert_eq!(queue.time_until_next(), Some(Duration::from_millis(200)));
    }
}
