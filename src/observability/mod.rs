// src/observability/mod.rs
//! Tracing and metrics setup
//!
//! Metrics emitted by the engine:
//!
//! | name                            | type    | labels  |
//! |---------------------------------|---------|---------|
//! | `uav_phase_transitions_total`   | counter | `to`    |
//! | `uav_collisions_resolved_total` | counter |         |
//! | `uav_ticks_dropped_total`       | counter |         |
//! | `uav_swarm_agents`              | gauge   | `phase` |

use crate::utils::config::{LogFormat, ObservabilityConfig};
use crate::utils::errors::{Result, SimError};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .map_err(|e| SimError::Observability(format!("invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.log_format {
        LogFormat::Pretty => registry.with(fmt::layer().with_thread_names(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_thread_names(true))
            .try_init(),
    };

    result.map_err(|e| SimError::Observability(format!("failed to install subscriber: {}", e)))
}

/// Install the Prometheus exporter when `metrics_addr` is configured.
///
/// Without an address the `metrics` macros stay no-ops.
pub fn init_metrics(config: &ObservabilityConfig) -> Result<()> {
    let Some(addr) = config.metrics_addr.as_deref() else {
        return Ok(());
    };

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| SimError::Observability(format!("invalid metrics address {}: {}", addr, e)))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| {
            SimError::Observability(format!("failed to install metrics exporter: {}", e))
        })?;

    info!("Prometheus metrics listening on {}", addr);
    Ok(())
}
