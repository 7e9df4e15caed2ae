// src/utils/config.rs
//! Layered simulation configuration
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults ([`SimulationConfig::default`])
//! 2. Optional config file (`$SWARM_CONFIG`, falling back to `swarm.toml`)
//! 3. Environment variables, e.g. `SWARM__CONTROL__SPHERE_RADIUS=12.5`

use crate::control::{ControlConfig, PidGains};
use crate::math::Vec3;
use crate::utils::errors::{Result, SimError};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Env var naming the config file
pub const CONFIG_PATH_ENV: &str = "SWARM_CONFIG";

/// Config file used when `SWARM_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "swarm.toml";

const ENV_PREFIX: &str = "SWARM";
const ENV_SEPARATOR: &str = "__";

/// Top-level configuration for a simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Control law parameters shared by every agent
    pub control: ControlConfig,

    /// PID gains shared by every agent
    pub pid: PidConfig,

    /// Formation and collision scheduling
    pub swarm: SwarmConfig,

    /// Logging and metrics
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    /// Radial axis gains
    pub radial: PidGains,

    /// Speed axis gains
    pub speed: PidGains,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            radial: PidGains::radial(),
            speed: PidGains::speed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// X coordinates of the launch grid columns
    pub columns: Vec<f64>,

    /// Y coordinates of the launch grid rows
    pub rows: Vec<f64>,

    /// Pairs closer than this swap velocities (m)
    pub collision_min_distance: f64,

    /// Period of the collision pass (ms)
    pub collision_period_ms: u64,

    /// Period of the swarm status log line (s)
    pub status_interval_secs: u64,

    /// Stop after this many seconds; run until Ctrl-C when unset
    pub run_secs: Option<u64>,

    /// Capacity of the shared flight event queue
    pub event_queue_capacity: usize,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            // 3 rows x 5 columns across the field
            columns: vec![-46.0, -24.0, -2.0, 20.0, 44.0],
            rows: vec![-22.5, 0.0, 22.5],
            collision_min_distance: 0.01,
            collision_period_ms: 30,
            status_interval_secs: 5,
            run_secs: None,
            event_queue_capacity: 4096,
        }
    }
}

impl SwarmConfig {
    /// Ground launch positions, row by row
    pub fn formation(&self) -> Vec<Vec3> {
        self.rows
            .iter()
            .flat_map(|&y| self.columns.iter().map(move |&x| Vec3::new(x, y, 0.0)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Output format of the fmt layer
    pub log_format: LogFormat,

    /// Filter directive used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Prometheus listener address; metrics exporter disabled when unset
    pub metrics_addr: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_filter: "info".to_string(),
            metrics_addr: None,
        }
    }
}

impl SimulationConfig {
    /// Load from defaults, `$SWARM_CONFIG` (or `swarm.toml`) and `SWARM__*` env vars
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Some(Path::new(&path)), Self::env_source())
    }

    /// Load with an explicit file and environment source
    pub fn load_from(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let config: Self = builder.add_source(env).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// The `SWARM__SECTION__KEY` environment source
    pub fn env_source() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.control.validate()?;
        self.pid.radial.validate()?;
        self.pid.speed.validate()?;

        if self.swarm.columns.is_empty() || self.swarm.rows.is_empty() {
            return Err(SimError::InvalidConfig(
                "formation needs at least one row and one column".to_string(),
            ));
        }
        if self
            .swarm
            .columns
            .iter()
            .chain(self.swarm.rows.iter())
            .any(|v| !v.is_finite())
        {
            return Err(SimError::InvalidConfig(
                "formation coordinates must be finite".to_string(),
            ));
        }
        let min_distance = self.swarm.collision_min_distance;
        if !(min_distance.is_finite() && min_distance > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "collision min distance must be positive, got {}",
                self.swarm.collision_min_distance
            )));
        }
        if self.swarm.collision_period_ms == 0 {
            return Err(SimError::InvalidConfig(
                "collision period cannot be 0".to_string(),
            ));
        }
        if self.swarm.event_queue_capacity == 0 {
            return Err(SimError::InvalidConfig(
                "event queue capacity cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SimulationConfig::env_source().source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.swarm.formation().len(), 15);
        assert_eq!(config.swarm.formation()[0], Vec3::new(-46.0, -22.5, 0.0));
        assert_eq!(config.pid.radial, PidGains::radial());
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_without_sources_matches_defaults() {
        let config = SimulationConfig::load_from(None, env_with(&[])).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_missing_file_is_optional() {
        let config = SimulationConfig::load_from(
            Some(Path::new("/nonexistent/swarm.toml")),
            env_with(&[]),
        )
        .unwrap();
        assert_eq!(config.control, ControlConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[control]
sphere_radius = 15.0
ground_wait = 2.5

[pid.speed]
kp = 1.5

[swarm]
columns = [0.0, 10.0]
rows = [0.0]
run_secs = 30

[observability]
log_format = "json"
"#
        )
        .unwrap();

        let config = SimulationConfig::load_from(Some(file.path()), env_with(&[])).unwrap();
        assert_eq!(config.control.sphere_radius, 15.0);
        assert_eq!(config.control.ground_wait, 2.5);
        assert_eq!(config.control.max_force, 20.0);
        assert_eq!(config.pid.speed.kp, 1.5);
        assert_eq!(config.pid.speed.kd, 10.0);
        assert_eq!(config.swarm.formation().len(), 2);
        assert_eq!(config.swarm.run_secs, Some(30));
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_env_overrides() {
        let config = SimulationConfig::load_from(
            None,
            env_with(&[
                ("SWARM__CONTROL__MAX_FORCE", "35.5"),
                ("SWARM__SWARM__COLLISION_PERIOD_MS", "50"),
            ]),
        )
        .unwrap();
        assert_eq!(config.control.max_force, 35.5);
        assert_eq!(config.swarm.collision_period_ms, 50);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = SimulationConfig::load_from(
            None,
            env_with(&[("SWARM__CONTROL__SPHERE_RADIUS", "-3.0")]),
        );
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));

        let mut config = SimulationConfig::default();
        config.swarm.rows.clear();
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.swarm.collision_period_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.swarm.collision_min_distance = 0.0;
        assert!(config.validate().is_err());
    }
}
