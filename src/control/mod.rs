// src/control/mod.rs
//! Flight control
//!
//! - **PID**: single-axis feedback primitive with anti-windup
//! - **Phase**: the GroundWait → ClimbToCenter → OnSphere state machine
//! - **Law**: turns kinematics + control state into a bounded force
//!
//! Everything here is single-threaded and owned by exactly one agent.

pub mod law;
pub mod phase;
pub mod pid;

pub use law::{compute_control_force, ControlConfig, ControlPids};
pub use phase::{ControlState, Phase};
pub use pid::{PidController, PidGains};
