// Snapshot broadcaster: a delay queue of serialized snapshots keyed by fire time.
//
// Scheduling never blocks the tick loop. Recipients are resolved when a delivery fires, not
// when it is scheduled, so a connection that leaves inside the delay window is skipped.
// Deliveries already queued are never retracted.

use axum::extract::ws::Utf8Bytes;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;
use tokio::time::Instant;

/// A snapshot frame ready to fan out.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub tick: u64,
    pub payload: Utf8Bytes,
}

#[derive(Debug)]
struct Scheduled {
    due_at: Instant,
    // Breaks ties between equal fire times in scheduling order.
    seq: u64,
    delivery: Delivery,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_at, self.seq).cmp(&(other.due_at, other.seq))
    }
}

#[derive(Debug)]
pub struct DelayedBroadcaster {
    delay: Duration,
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl DelayedBroadcaster {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Number of deliveries still in flight.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queues `payload` to fire `delay` after `now`. Returns the fire time.
    pub fn schedule(&mut self, tick: u64, payload: Utf8Bytes, now: Instant) -> Instant {
        let due_at = now + self.delay;
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.queue.push(Reverse(Scheduled {
            due_at,
            seq,
            delivery: Delivery { tick, payload },
        }));
        due_at
    }

    /// Fire time of the earliest pending delivery.
    pub fn next_due(&self) -> Option<Instant> {
        self.queue.peek().map(|Reverse(s)| s.due_at)
    }

    /// Pops the earliest delivery if it is due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<Delivery> {
        match self.queue.peek() {
            Some(Reverse(s)) if s.due_at <= now => self.queue.pop().map(|Reverse(s)| s.delivery),
            _ => None,
        }
    }
}
