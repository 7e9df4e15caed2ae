// src/utils/mod.rs
//! Configuration and error plumbing shared across the engine

pub mod config;
pub mod errors;

pub use self::config::SimulationConfig;
pub use self::errors::{Result, SimError};
