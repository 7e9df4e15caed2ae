// src/recording/mod.rs
//! Flight event recording
//!
//! - **Event**: phase transitions and collision swaps, serializable for logs
//! - **Event Queue**: bounded lock-free MPMC queue shared by all agents
//!
//! # Architecture
//!
//! ```text
//! uav-N worker ──┐
//! uav-M worker ──┼─▶ EventQueue (ArrayQueue) ──▶ runner drain ──▶ tracing
//! collision pass ┘      (drop when full)
//! ```

pub mod event;
pub mod event_queue;

pub use event::{FlightEvent, FlightEventKind};
pub use event_queue::{EventQueue, QueueStats};
