//! Priority queue for pending fire events, spec §9: ordered by severity
//! weight (descending), then time (ascending), with a monotonic sequence
//! number breaking ties so equal-priority events drain FIFO instead of
//! starving.

use drone_domain::FireEvent;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Mutex;

struct PrioritizedEvent {
    event: FireEvent,
    seq: u64,
}

impl PartialEq for PrioritizedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PrioritizedEvent {}

impl PartialOrd for PrioritizedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritizedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.event
            .severity
            .weight()
            .cmp(&other.event.severity.weight())
            .then_with(|| other.event.time.cmp(&self.event.time))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct PriorityQueue {
    heap: Mutex<BinaryHeap<PrioritizedEvent>>,
    next_seq: AtomicU64,
}

impl PriorityQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn push(&self, event: FireEvent) {
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::Relaxed);
        self.heap
            .lock()
            .expect("priority queue poisoned")
            .push(PrioritizedEvent { event, seq });
    }

    #[must_use]
    pub fn pop(&self) -> Option<FireEvent> {
        self.heap
            .lock()
            .expect("priority queue poisoned")
            .pop()
            .map(|p| p.event)
    }

    /// Drops every pending event for `zone_id`, used when a zone's fire is
    /// cleared out from under queued follow-up events (invariant I5).
    pub fn purge_zone(&self, zone_id: u32) {
        let mut guard = self.heap.lock().expect("priority queue poisoned");
        let remaining: Vec<PrioritizedEvent> = std::mem::take(&mut *guard)
            .into_iter()
            .filter(|p| p.event.zone_id != zone_id)
            .collect();
        *guard = remaining.into_iter().collect();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.lock().expect("priority queue poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_domain::Severity;

    #[test]
    fn higher_severity_dequeues_first() {
        let q = PriorityQueue::new();
        q.push(FireEvent::new("09:00:00", 1, Severity::Low));
        q.push(FireEvent::new("09:00:00", 2, Severity::High));
        assert_eq!(q.pop().unwrap().zone_id, 2);
        assert_eq!(q.pop().unwrap().zone_id, 1);
    }

    #[test]
    fn equal_severity_breaks_ties_by_earlier_time() {
        let q = PriorityQueue::new();
        q.push(FireEvent::new("09:00:05", 1, Severity::High));
        q.push(FireEvent::new("09:00:00", 2, Severity::High));
        assert_eq!(q.pop().unwrap().zone_id, 2);
        assert_eq!(q.pop().unwrap().zone_id, 1);
    }

    #[test]
    fn equal_severity_and_time_breaks_ties_fifo() {
        let q = PriorityQueue::new();
        q.push(FireEvent::new("09:00:00", 1, Severity::High));
        q.push(FireEvent::new("09:00:00", 2, Severity::High));
        assert_eq!(q.pop().unwrap().zone_id, 1);
        assert_eq!(q.pop().unwrap().zone_id, 2);
    }

    #[test]
    fn purge_zone_removes_only_matching_events() {
        let q = PriorityQueue::new();
        q.push(FireEvent::new("09:00:00", 1, Severity::High));
        q.push(FireEvent::new("09:00:00", 2, Severity::High));
        q.purge_zone(1);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop().unwrap().zone_id, 2);
    }
}
