//! Per-stage queue of delayed effects.
//!
//! Entries are keyed by absolute stage time and released in due order as the
//! stage clock advances. Entries due at the same instant come out in the
//! order they were scheduled. The whole queue is discarded when a stage ends.

use bossrush_common::{IdAllocator, ScheduleId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry<T> {
    due_ms: f64,
    id: ScheduleId,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed so the max-heap yields the earliest entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Time-ordered queue of pending effects.
pub struct EventSchedule<T> {
    queue: BinaryHeap<Entry<T>>,
    ids: IdAllocator,
    elapsed_ms: f64,
}

impl<T> Default for EventSchedule<T> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            ids: IdAllocator::default(),
            elapsed_ms: 0.0,
        }
    }
}

impl<T> std::fmt::Debug for EventSchedule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSchedule")
            .field("pending", &self.queue.len())
            .field("elapsed_ms", &self.elapsed_ms)
            .finish()
    }
}

impl<T> EventSchedule<T> {
    /// Creates an empty schedule with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `item` at an absolute stage time. Past times fire on the next advance.
    pub fn schedule_at(&mut self, due_ms: f64, item: T) -> ScheduleId {
        let id = ScheduleId::from_raw(self.ids.next());
        self.queue.push(Entry { due_ms, id, item });
        id
    }

    /// Schedules `item` `delay_ms` after the current stage time.
    pub fn schedule_in(&mut self, delay_ms: f32, item: T) -> ScheduleId {
        self.schedule_at(self.elapsed_ms + f64::from(delay_ms.max(0.0)), item)
    }

    /// Advances the clock and returns every entry now due, earliest first.
    pub fn advance(&mut self, delta_ms: f32) -> Vec<T> {
        self.elapsed_ms += f64::from(delta_ms.max(0.0));

        let mut due = Vec::new();
        while self.queue.peek().is_some_and(|e| e.due_ms <= self.elapsed_ms) {
            if let Some(entry) = self.queue.pop() {
                due.push(entry.item);
            }
        }
        due
    }

    /// Drops every pending entry, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Current stage time.
    #[must_use]
    pub const fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_fire_in_due_order() {
        let mut schedule = EventSchedule::new();
        schedule.schedule_in(300.0, "c");
        schedule.schedule_in(100.0, "a");
        schedule.schedule_in(200.0, "b");

        assert!(schedule.advance(99.0).is_empty());
        assert_eq!(schedule.advance(1.0), vec!["a"]);
        assert_eq!(schedule.advance(500.0), vec!["b", "c"]);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut schedule = EventSchedule::new();
        for i in 0..5 {
            schedule.schedule_in(50.0, i);
        }
        assert_eq!(schedule.advance(50.0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_schedule_in_is_relative_to_clock() {
        let mut schedule = EventSchedule::new();
        schedule.advance(1000.0);
        schedule.schedule_in(500.0, ());
        assert!(schedule.advance(499.0).is_empty());
        assert_eq!(schedule.advance(1.0).len(), 1);
        assert_eq!(schedule.elapsed_ms(), 1500.0);
    }

    #[test]
    fn test_clear_discards_pending() {
        let mut schedule = EventSchedule::new();
        schedule.schedule_in(10.0, 1);
        schedule.schedule_in(20.0, 2);
        assert_eq!(schedule.clear(), 2);
        assert!(schedule.advance(100.0).is_empty());
    }

    #[test]
    fn test_past_entries_fire_next_advance() {
        let mut schedule = EventSchedule::new();
        schedule.advance(100.0);
        schedule.schedule_at(10.0, "late");
        assert_eq!(schedule.advance(0.0), vec!["late"]);
    }
}
