// src/utils/errors.rs
//! Error types for the simulation engine

use thiserror::Error;

/// Engine-wide result alias
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration value the controller cannot fly
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Layered configuration could not be loaded or deserialized
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// The OS refused to spawn an agent worker thread
    #[error("failed to spawn agent worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// An agent worker panicked or never started; its control state is gone
    #[error("control state of agent {0} was lost")]
    WorkerLost(u32),

    /// Tracing or metrics could not be installed
    #[error("observability setup failed: {0}")]
    Observability(String),
}
