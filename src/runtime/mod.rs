// src/runtime/mod.rs
//! Agent execution runtime
//!
//! This module provides the concurrent side of the simulation:
//!
//! - **Agent Runtime**: one worker thread per UAV, brief-lock snapshots
//! - **Collision**: swarm-wide velocity-swap pass over agent snapshots
//! - **Swarm**: a formation of agents started, stopped and checked together
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Swarm (15)                        │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐               │
//! │  │  uav-0   │  │  uav-1   │  │  uav-2   │  ...          │
//! │  │  thread  │  │  thread  │  │  thread  │               │
//! │  └────┬─────┘  └────┬─────┘  └────┬─────┘               │
//! │       │ lock/copy   │             │      (10 ms ticks)  │
//! │  ┌────▼─────┐  ┌────▼─────┐  ┌────▼─────┐               │
//! │  │kinematics│  │kinematics│  │kinematics│               │
//! │  └────▲─────┘  └────▲─────┘  └────▲─────┘               │
//! │       └─────────────┴─────────────┘                      │
//! │            snapshot / set_velocity                       │
//! │                      │                                   │
//! │         Collision pass (external timer, ~30 ms)          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! No lock is held across agents: every critical section touches one agent's
//! kinematics only.

pub mod agent_runtime;
pub mod collision;
pub mod swarm;

// Re-export commonly used types
pub use agent_runtime::{Agent, AgentOptions, FlightController, Snapshot, StepOutcome};
pub use collision::{find_collisions, resolve_collisions, DEFAULT_MIN_DISTANCE};
pub use swarm::{Swarm, SwarmStats};
