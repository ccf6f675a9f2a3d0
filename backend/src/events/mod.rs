//! Scheduled events
//!
//! The simulator schedules future world changes (deliveries, fee charges)
//! as events on a min-heap keyed by absolute timestamp
//! `day * 1440 + minute`. Ties are broken by insertion order so that two
//! runs with the same seed drain events in exactly the same sequence.
//!
//! This queue is distinct from the audit [`log::EventLog`], which records
//! what already happened.

pub mod log;

use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::core::time::timestamp;

/// What a scheduled event does when it fires.
///
/// DayStart and DayEnd are reserved for schedulers that prefer explicit
/// boundary events; the reference flow handles day boundaries in the
/// end-of-day engine and never queues them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// An order arrives: credit its items to storage
    Delivery {
        order_id: String,
        supplier_id: String,
    },
    /// Deduct a fee from the cash balance
    DailyFee { amount_cents: i64 },
    /// Reserved day-boundary marker
    DayStart,
    /// Reserved day-boundary marker
    DayEnd,
}

/// An event with its scheduled firing time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Absolute timestamp `day * 1440 + minute`
    pub ts: u64,
    /// Insertion sequence number; the deterministic tiebreaker
    pub seq: u64,
    pub day: usize,
    pub minute: u32,
    pub kind: EventKind,
}

// Heap ordering is by (ts, seq) only. seq is unique per queue, so two
// distinct events never compare equal.
impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        (self.ts, self.seq) == (other.ts, other.seq)
    }
}

impl Eq for ScheduledEvent {}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.ts, self.seq).cmp(&(other.ts, other.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of scheduled events ordered by (timestamp, insertion order).
///
/// # Example
/// ```
/// use vending_simulator_core_rs::{EventKind, EventQueue};
///
/// let mut queue = EventQueue::new();
/// queue.push(1, 300, EventKind::DailyFee { amount_cents: 200 });
/// queue.push(0, 600, EventKind::DayEnd);
///
/// let first = queue.pop().unwrap();
/// assert_eq!(first.day, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Reverse<ScheduledEvent>>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event at (day, minute).
    pub fn push(&mut self, day: usize, minute: u32, kind: EventKind) {
        let event = ScheduledEvent {
            ts: timestamp(day, minute),
            seq: self.next_seq,
            day,
            minute,
            kind,
        };
        self.next_seq += 1;
        self.heap.push(Reverse(event));
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<ScheduledEvent> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    /// Look at the earliest event without removing it.
    pub fn peek(&self) -> Option<&ScheduledEvent> {
        self.heap.peek().map(|Reverse(event)| event)
    }

    /// Remove and return all events with `ts <= until_ts`, in firing order.
    pub fn drain_until(&mut self, until_ts: u64) -> Vec<ScheduledEvent> {
        let mut out = Vec::new();
        while let Some(Reverse(head)) = self.heap.peek() {
            if head.ts > until_ts {
                break;
            }
            let Some(Reverse(event)) = self.heap.pop() else {
                break;
            };
            out.push(event);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_order_by_timestamp() {
        let mut queue = EventQueue::new();
        queue.push(2, 0, EventKind::DayStart);
        queue.push(0, 100, EventKind::DayEnd);
        queue.push(1, 0, EventKind::DailyFee { amount_cents: 200 });

        assert_eq!(queue.pop().unwrap().day, 0);
        assert_eq!(queue.pop().unwrap().day, 1);
        assert_eq!(queue.pop().unwrap().day, 2);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_ties_broken_by_insertion_order() {
        let mut queue = EventQueue::new();
        for i in 0..5 {
            queue.push(
                1,
                720,
                EventKind::Delivery {
                    order_id: format!("order_{}", i + 1),
                    supplier_id: "supplier_1".to_string(),
                },
            );
        }

        let drained = queue.drain_until(timestamp(1, 720));
        let ids: Vec<_> = drained
            .iter()
            .map(|e| match &e.kind {
                EventKind::Delivery { order_id, .. } => order_id.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ids, vec!["order_1", "order_2", "order_3", "order_4", "order_5"]);
    }

    #[test]
    fn test_drain_until_leaves_future_events() {
        let mut queue = EventQueue::new();
        queue.push(0, 100, EventKind::DayStart);
        queue.push(0, 200, EventKind::DayEnd);
        queue.push(3, 0, EventKind::DailyFee { amount_cents: 200 });

        let drained = queue.drain_until(timestamp(0, 1439));
        assert_eq!(drained.len(), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek().unwrap().day, 3);
    }

    #[test]
    fn test_drain_inclusive_bound() {
        let mut queue = EventQueue::new();
        queue.push(0, 30, EventKind::DayStart);
        let drained = queue.drain_until(timestamp(0, 30));
        assert_eq!(drained.len(), 1);
    }
}
