// src/main.rs
//! UAV Swarm Simulation Engine
//!
//! Headless runner: builds the launch formation, starts one worker per UAV
//! and drives the collision pass from a fixed-period timer until Ctrl-C (or
//! the configured run time) elapses.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uav_swarm_engine::observability::{init_metrics, init_tracing};
use uav_swarm_engine::recording::FlightEventKind;
use uav_swarm_engine::runtime::Swarm;
use uav_swarm_engine::utils::config::SimulationConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first: it decides the log format
    let config = SimulationConfig::load().context("loading configuration")?;

    init_tracing(&config.observability)?;
    init_metrics(&config.observability)?;

    info!("Starting UAV swarm engine v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded: {:?}", config);

    let swarm = Arc::new(Swarm::from_config(&config)?);
    swarm.start_all()?;

    let collision_period = Duration::from_millis(config.swarm.collision_period_ms);
    let mut collision_tick = tokio::time::interval(collision_period);
    collision_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let status_period = Duration::from_secs(config.swarm.status_interval_secs.max(1));
    let mut status_tick = tokio::time::interval(status_period);

    let run_limit = async {
        match config.swarm.run_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(run_limit);

    loop {
        tokio::select! {
            _ = collision_tick.tick() => {
                swarm.resolve_collisions();
                drain_events(&swarm);
            }

            _ = status_tick.tick() => {
                let stats = swarm.stats();
                info!(
                    total = stats.total,
                    ground_wait = stats.ground_wait,
                    climbing = stats.climbing,
                    on_sphere = stats.on_sphere,
                    "Swarm status"
                );
            }

            _ = &mut run_limit => {
                info!("Run time elapsed, shutting down...");
                break;
            }

            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Received shutdown signal, cleaning up...");
                break;
            }
        }
    }

    // joining workers blocks; keep it off the async threads
    let stopping = Arc::clone(&swarm);
    tokio::task::spawn_blocking(move || stopping.stop_all()).await?;
    drain_events(&swarm);

    if let Some(recorder) = swarm.recorder() {
        let stats = recorder.stats();
        if stats.drop_count > 0 {
            warn!("{} flight events were dropped (queue full)", stats.drop_count);
        }
    }

    info!("Swarm stopped gracefully");
    Ok(())
}

/// Log every queued flight event
fn drain_events(swarm: &Swarm) {
    let Some(recorder) = swarm.recorder() else {
        return;
    };

    for event in recorder.drain() {
        match event.kind {
            FlightEventKind::PhaseChanged { .. } => {
                info!(event = %event.to_json(), "Flight event");
            }
            FlightEventKind::CollisionSwap { with } => {
                info!(agent = event.agent_id, with, sim_time = event.sim_time, "Collision swap");
            }
        }
    }
}
