// src/runtime/swarm.rs
//! Swarm of agents driven together
//!
//! Owns the agent handles built from a launch formation and hands them to the
//! collision pass on every external tick. There is no global registry: callers
//! hold the [`Swarm`] (or their own collection) and pass it in explicitly.
//!
//! ```text
//! Swarm
//! ├─ agents:   [uav-0, uav-1, ... uav-14]  (one worker thread each)
//! ├─ recorder: shared flight event queue
//! └─ min_distance: collision contact distance
//! ```

use crate::control::Phase;
use crate::recording::EventQueue;
use crate::runtime::agent_runtime::{Agent, AgentOptions};
use crate::runtime::collision;
use crate::utils::config::SimulationConfig;
use crate::utils::errors::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// All agents of one simulation run
pub struct Swarm {
    /// Agents, in formation order
    agents: Vec<Arc<Agent>>,

    /// Flight event queue shared by every agent
    recorder: Option<Arc<EventQueue>>,

    /// Distance below which the collision pass swaps velocities
    min_distance: f64,
}

impl Swarm {
    /// Wrap an existing collection of agents
    pub fn new(agents: Vec<Arc<Agent>>, min_distance: f64) -> Self {
        Self {
            agents,
            recorder: None,
            min_distance,
        }
    }

    /// One stopped agent per formation point, sharing a flight event queue
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;

        let recorder = Arc::new(EventQueue::new(config.swarm.event_queue_capacity));
        let formation = config.swarm.formation();

        let agents = formation
            .into_iter()
            .enumerate()
            .map(|(i, start)| {
                Agent::with_options(
                    start,
                    config.control,
                    AgentOptions {
                        id: Some(i as u32),
                        radial_gains: Some(config.pid.radial),
                        speed_gains: Some(config.pid.speed),
                        recorder: Some(Arc::clone(&recorder)),
                    },
                )
                .map(Arc::new)
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Swarm created with {} agents", agents.len());

        Ok(Self {
            agents,
            recorder: Some(recorder),
            min_distance: config.swarm.collision_min_distance,
        })
    }

    /// Start every agent, stopping the ones already started on failure
    pub fn start_all(&self) -> Result<()> {
        for agent in &self.agents {
            if let Err(e) = agent.start() {
                warn!(agent = agent.id(), "Failed to start agent: {}", e);
                self.stop_all();
                return Err(e);
            }
        }
        info!("Started {} agents", self.agents.len());
        Ok(())
    }

    /// Stop every agent and wait for all workers to exit
    pub fn stop_all(&self) {
        for agent in &self.agents {
            agent.stop();
        }
        info!("Stopped {} agents", self.agents.len());
    }

    /// Run one collision pass over the whole swarm
    pub fn resolve_collisions(&self) {
        collision::resolve_collisions(&self.agents, self.min_distance);
    }

    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.agents
    }

    pub fn recorder(&self) -> Option<&Arc<EventQueue>> {
        self.recorder.as_ref()
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Per-phase head count, also published as the `uav_swarm_agents` gauge
    pub fn stats(&self) -> SwarmStats {
        let mut stats = SwarmStats {
            total: self.agents.len(),
            ..Default::default()
        };

        for agent in &self.agents {
            match agent.phase() {
                Phase::GroundWait => stats.ground_wait += 1,
                Phase::ClimbToCenter => stats.climbing += 1,
                Phase::OnSphere => stats.on_sphere += 1,
            }
            if agent.is_running() {
                stats.running += 1;
            }
        }

        for (phase, count) in [
            (Phase::GroundWait, stats.ground_wait),
            (Phase::ClimbToCenter, stats.climbing),
            (Phase::OnSphere, stats.on_sphere),
        ] {
            metrics::gauge!("uav_swarm_agents", "phase" => phase.as_str()).set(count as f64);
        }

        stats
    }
}

impl Drop for Swarm {
    fn drop(&mut self) {
        // agents may be shared elsewhere, so stop them explicitly
        for agent in &self.agents {
            agent.stop();
        }
    }
}

/// Swarm statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwarmStats {
    /// Agents in the swarm
    pub total: usize,

    /// Agents still waiting on the ground
    pub ground_wait: usize,

    /// Agents climbing to the center
    pub climbing: usize,

    /// Agents flying on the sphere
    pub on_sphere: usize,

    /// Agents with a live worker thread
    pub running: usize,
}
