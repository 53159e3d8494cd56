use super::event::{Event, EventKind};
use super::types::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct ScheduledEvent {
    time: SimTime,
    sequence_num: u64,
    kind: EventKind,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence_num == other.sequence_num
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Pending events ordered by event time, ties broken by scheduling order.
///
/// The sequence counter makes equal-timestamp ordering deterministic, which
/// together with fixed random streams makes a replication's event trace
/// reproducible.
pub struct EventCalendar {
    event_queue: BinaryHeap<ScheduledEvent>,
    sequence_counter: u64,
}

impl EventCalendar {
    /// Create an empty calendar
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Insert an event at an absolute clock time
    pub fn schedule(&mut self, time: SimTime, kind: EventKind) {
        let scheduled_event = ScheduledEvent {
            time,
            sequence_num: self.sequence_counter,
            kind,
        };

        self.event_queue.push(scheduled_event);
        self.sequence_counter += 1;
    }

    /// Remove and return the earliest-time event, FIFO among ties
    pub fn pop_next(&mut self) -> Option<Event> {
        self.event_queue.pop().map(|scheduled| Event {
            time: scheduled.time,
            kind: scheduled.kind,
        })
    }

    /// Earliest pending event time without removing it
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|scheduled| scheduled.time)
    }

    /// Number of pending events
    pub fn pending_count(&self) -> usize {
        self.event_queue.len()
    }

    /// Check if any events remain
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }
}

impl Default for EventCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival(source: usize) -> EventKind {
        EventKind::Arrival { source }
    }

    #[test]
    fn test_pop_order_is_by_time() {
        let mut calendar = EventCalendar::new();
        calendar.schedule(3.0, arrival(0));
        calendar.schedule(1.0, arrival(1));
        calendar.schedule(2.0, arrival(2));

        let times: Vec<f64> = std::iter::from_fn(|| calendar.pop_next())
            .map(|e| e.time)
            .collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let mut calendar = EventCalendar::new();
        calendar.schedule(5.0, arrival(0));
        calendar.schedule(5.0, arrival(1));
        calendar.schedule(5.0, arrival(2));

        for expected in 0..3 {
            let event = calendar.pop_next().unwrap();
            assert_eq!(event.kind, arrival(expected));
        }
    }

    #[test]
    fn test_empty_pop_returns_none() {
        let mut calendar = EventCalendar::new();
        assert_eq!(calendar.pending_count(), 0);
        assert!(!calendar.has_events());
        assert!(calendar.pop_next().is_none());
    }

    #[test]
    fn test_peek_does_not_remove() {
        let mut calendar = EventCalendar::new();
        calendar.schedule(7.5, arrival(0));
        assert_eq!(calendar.peek_next_time(), Some(7.5));
        assert_eq!(calendar.pending_count(), 1);
    }
}
