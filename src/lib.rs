// src/lib.rs
//! UAV Swarm Simulation Engine Library
//!
//! This library simulates a swarm of UAVs that each take off from the ground,
//! climb to a shared target sphere and wander on its surface while the swarm
//! resolves close encounters between peers.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **math**: 3D vector primitives and magnitude clamping
//! - **control**: PID primitive and the phase-based control law
//! - **runtime**: per-agent worker threads, collision pass, swarm handling
//! - **recording**: lock-free flight event queue
//! - **observability**: tracing and metrics setup
//! - **utils**: configuration and errors

// Public module exports
pub mod control;
pub mod math;
pub mod observability;
pub mod recording;
pub mod runtime;
pub mod utils;

// Re-export commonly used types
pub use control::{ControlConfig, Phase};
pub use math::Vec3;
pub use runtime::{resolve_collisions, Agent, Snapshot, Swarm};
pub use utils::config::SimulationConfig;
pub use utils::errors::{Result, SimError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
