// src/recording/event_queue.rs
//! Lock-free MPMC flight event queue
//!
//! Agent workers push from their own threads; the runner drains from the
//! collision timer. Pushing never blocks a control tick: when the queue is
//! full the event is dropped and counted.

use crate::recording::event::FlightEvent;
use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bounded lock-free event queue
pub struct EventQueue {
    /// Underlying bounded queue
    queue: ArrayQueue<FlightEvent>,

    /// Push counter
    push_count: AtomicU64,

    /// Pop counter
    pop_count: AtomicU64,

    /// Drop counter (queue full)
    drop_count: AtomicU64,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` events (must be non-zero)
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity),
            push_count: AtomicU64::new(0),
            pop_count: AtomicU64::new(0),
            drop_count: AtomicU64::new(0),
        }
    }

    /// Push an event, handing it back if the queue is full
    pub fn push(&self, event: FlightEvent) -> Result<(), FlightEvent> {
        match self.queue.push(event) {
            Ok(()) => {
                self.push_count.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(event) => {
                self.drop_count.fetch_add(1, Ordering::Relaxed);
                Err(event)
            }
        }
    }

    pub fn try_pop(&self) -> Option<FlightEvent> {
        let event = self.queue.pop()?;
        self.pop_count.fetch_add(1, Ordering::Relaxed);
        Some(event)
    }

    /// Pop everything currently queued
    pub fn drain(&self) -> Vec<FlightEvent> {
        let mut events = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.try_pop() {
            events.push(event);
        }
        events
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            push_count: self.push_count.load(Ordering::Relaxed),
            pop_count: self.pop_count.load(Ordering::Relaxed),
            drop_count: self.drop_count.load(Ordering::Relaxed),
            current_size: self.queue.len(),
            capacity: self.queue.capacity(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

/// Queue statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    /// Events accepted
    pub push_count: u64,

    /// Events taken out
    pub pop_count: u64,

    /// Events dropped because the queue was full
    pub drop_count: u64,

    /// Events currently queued
    pub current_size: usize,

    /// Maximum number of queued events
    pub capacity: usize,
}
