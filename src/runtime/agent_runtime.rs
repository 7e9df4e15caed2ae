// src/runtime/agent_runtime.rs
//! Agent runtime for a single UAV
//!
//! Each agent owns one worker thread that repeatedly:
//!
//! 1. copies position/velocity out of the kinematics lock
//! 2. runs the control law and integrates physics on the local copy
//! 3. publishes the result back under the lock
//! 4. sleeps for the rest of the 10 ms tick
//!
//! The control state never crosses threads while the worker runs: it is moved
//! into the worker on [`Agent::start`] and handed back through the join handle
//! on [`Agent::stop`], so a stopped agent resumes exactly where it left off.

use crate::control::{
    compute_control_force, ControlConfig, ControlPids, ControlState, Phase, PidGains,
};
use crate::math::Vec3;
use crate::recording::{EventQueue, FlightEvent};
use crate::utils::errors::{Result, SimError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Wall-clock length of one tick
pub const TICK: Duration = Duration::from_millis(10);

/// Simulated seconds per tick
pub const DT: f64 = 0.01;

/// Gravitational acceleration along -z (m/s^2)
pub const GRAVITY: f64 = 10.0;

/// Mass of one agent (kg)
pub const MASS: f64 = 1.0;

/// Hard speed cap while climbing to the center (m/s)
pub const CLIMB_SPEED_LIMIT: f64 = 2.0;

/// Simulated seconds between trace-level status lines
const STATUS_PERIOD: f64 = 1.0;

static NEXT_AGENT_ID: AtomicU32 = AtomicU32::new(0);

/// Point-in-time copy of one agent's published state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// World position (m)
    pub position: Vec3,

    /// Velocity (m/s)
    pub velocity: Vec3,

    /// Acceleration applied during the last tick (m/s^2)
    pub acceleration: Vec3,

    /// Phase the agent was in when this state was published
    pub phase: Phase,

    /// Simulated seconds the agent has flown
    pub sim_time: f64,
}

/// Optional knobs for [`Agent::with_options`]
#[derive(Clone, Default)]
pub struct AgentOptions {
    /// Explicit id; a process-unique one is assigned when unset
    pub id: Option<u32>,

    /// Radial PID gains (defaults to [`PidGains::radial`])
    pub radial_gains: Option<PidGains>,

    /// Speed PID gains (defaults to [`PidGains::speed`])
    pub speed_gains: Option<PidGains>,

    /// Queue receiving this agent's flight events
    pub recorder: Option<Arc<EventQueue>>,
}

/// Result of one physics tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Position after integration and ground contact
    pub position: Vec3,

    /// Velocity after ground contact and the climb cap
    pub velocity: Vec3,

    /// Gravity plus control force over mass
    pub acceleration: Vec3,

    /// Phase before the tick
    pub previous_phase: Phase,

    /// Phase after the tick
    pub phase: Phase,
}

impl StepOutcome {
    /// Every (from, to) transition taken during the tick, in order
    pub fn transitions(&self) -> impl Iterator<Item = (Phase, Phase)> {
        let end = self.phase;
        std::iter::successors(Some(self.previous_phase), |p| p.next())
            .take_while(move |p| *p < end)
            .filter_map(|from| from.next().map(|to| (from, to)))
    }

    fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.acceleration.is_finite()
    }
}

/// Control and physics state for one agent, owned by whoever runs the ticks
#[derive(Debug, Clone)]
pub struct FlightController {
    /// Control configuration flown by this agent
    config: ControlConfig,

    /// Phase machine state
    state: ControlState,

    /// Radial and speed PID axes
    pids: ControlPids,

    /// Simulated seconds flown
    sim_time: f64,
}

impl FlightController {
    pub fn new(config: ControlConfig, pids: ControlPids) -> Self {
        Self {
            config,
            state: ControlState::new(),
            pids,
            sim_time: 0.0,
        }
    }

    /// Advance one tick from the given kinematics.
    ///
    /// Runs the control law, applies gravity, integrates with explicit Euler,
    /// enforces the ground and the climb speed cap.
    pub fn step(&mut self, position: Vec3, velocity: Vec3) -> StepOutcome {
        let previous_phase = self.state.phase();

        let force = compute_control_force(
            position,
            velocity,
            &mut self.state,
            &mut self.pids,
            &self.config,
            DT,
        );
        let acceleration = force / MASS + Vec3::new(0.0, 0.0, -GRAVITY);

        let mut velocity = velocity + acceleration * DT;
        let mut position = position + velocity * DT;

        // inelastic floor
        if position.z < 0.0 {
            position.z = 0.0;
            if velocity.z < 0.0 {
                velocity.z = 0.0;
            }
        }

        if self.state.phase() == Phase::ClimbToCenter {
            let speed = velocity.magnitude();
            if speed > CLIMB_SPEED_LIMIT {
                velocity = velocity * (CLIMB_SPEED_LIMIT / speed);
            }
        }

        self.sim_time += DT;

        StepOutcome {
            position,
            velocity,
            acceleration,
            previous_phase,
            phase: self.state.phase(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn pids(&self) -> &ControlPids {
        &self.pids
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}

/// State shared between the agent handle and its worker
struct Shared {
    /// Agent id used in logs and events
    id: u32,

    /// Last published state, guarded for brief copies only
    kinematics: Mutex<Snapshot>,

    /// Cleared to ask the worker to exit
    running: AtomicBool,

    /// Flight event sink
    recorder: Option<Arc<EventQueue>>,
}

impl Shared {
    fn record(&self, event: FlightEvent) {
        if let Some(recorder) = &self.recorder {
            if recorder.push(event).is_err() {
                warn!(agent = self.id, "Flight event queue full, event dropped");
            }
        }
    }
}

enum Worker {
    Idle(FlightController),
    Running(JoinHandle<FlightController>),
    Lost,
}

/// One simulated UAV with its own worker thread
pub struct Agent {
    /// State visible to both the handle and the worker
    shared: Arc<Shared>,

    /// Worker lifecycle, holding the control state while idle
    worker: Mutex<Worker>,

    /// Control configuration
    config: ControlConfig,
}

impl Agent {
    /// Create a stopped agent at `start` with default gains
    pub fn new(start: Vec3, config: ControlConfig) -> Result<Self> {
        Self::with_options(start, config, AgentOptions::default())
    }

    /// Create a stopped agent with custom id, gains or recorder
    pub fn with_options(
        start: Vec3,
        config: ControlConfig,
        options: AgentOptions,
    ) -> Result<Self> {
        config.validate()?;
        if !start.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "start position must be finite, got {:?}",
                start
            )));
        }

        let radial = options.radial_gains.unwrap_or_else(PidGains::radial);
        let speed = options.speed_gains.unwrap_or_else(PidGains::speed);
        let pids = ControlPids::new(radial, speed)?;

        let id = options
            .id
            .unwrap_or_else(|| NEXT_AGENT_ID.fetch_add(1, Ordering::Relaxed));
        let controller = FlightController::new(config, pids);

        debug!(agent = id, ?start, "Agent created");

        Ok(Self {
            shared: Arc::new(Shared {
                id,
                kinematics: Mutex::new(Snapshot {
                    position: start,
                    velocity: Vec3::ZERO,
                    acceleration: Vec3::ZERO,
                    phase: controller.phase(),
                    sim_time: 0.0,
                }),
                running: AtomicBool::new(false),
                recorder: options.recorder,
            }),
            worker: Mutex::new(Worker::Idle(controller)),
            config,
        })
    }

    /// Start the worker thread. No-op when already running.
    pub fn start(&self) -> Result<()> {
        let mut worker = self.worker.lock();

        let controller = match std::mem::replace(&mut *worker, Worker::Lost) {
            Worker::Idle(controller) => controller,
            running @ Worker::Running(_) => {
                *worker = running;
                return Ok(());
            }
            Worker::Lost => return Err(SimError::WorkerLost(self.shared.id)),
        };

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);

        match thread::Builder::new()
            .name(format!("uav-{}", self.shared.id))
            .spawn(move || run(shared, controller))
        {
            Ok(handle) => {
                debug!(agent = self.shared.id, "Agent worker started");
                *worker = Worker::Running(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                error!(agent = self.shared.id, "Failed to spawn agent worker: {}", e);
                Err(e.into())
            }
        }
    }

    /// Stop the worker and wait for it to exit. No-op when already stopped.
    ///
    /// Once this returns the agent's state no longer changes.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);

        let mut worker = self.worker.lock();
        let handle = match std::mem::replace(&mut *worker, Worker::Lost) {
            Worker::Running(handle) => handle,
            other => {
                *worker = other;
                return;
            }
        };

        match handle.join() {
            Ok(controller) => {
                debug!(
                    agent = self.shared.id,
                    phase = %controller.phase(),
                    "Agent worker stopped"
                );
                *worker = Worker::Idle(controller);
            }
            Err(_) => {
                error!(agent = self.shared.id, "Agent worker panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(&*self.worker.lock(), Worker::Running(_))
    }

    pub fn id(&self) -> u32 {
        self.shared.id
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.shared.kinematics.lock().position
    }

    pub fn velocity(&self) -> Vec3 {
        self.shared.kinematics.lock().velocity
    }

    pub fn acceleration(&self) -> Vec3 {
        self.shared.kinematics.lock().acceleration
    }

    /// Phase as of the last published tick
    pub fn phase(&self) -> Phase {
        self.shared.kinematics.lock().phase
    }

    /// All published fields, read under a single lock
    pub fn snapshot(&self) -> Snapshot {
        *self.shared.kinematics.lock()
    }

    /// Override the velocity; the worker picks it up on its next read
    pub fn set_velocity(&self, velocity: Vec3) {
        self.shared.kinematics.lock().velocity = velocity;
    }

    pub(crate) fn record(&self, event: FlightEvent) {
        self.shared.record(event);
    }
}

impl AsRef<Agent> for Agent {
    fn as_ref(&self) -> &Agent {
        self
    }
}

impl Drop for Agent {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker loop; returns the controller so the agent can be restarted
fn run(shared: Arc<Shared>, mut controller: FlightController) -> FlightController {
    let mut since_status = 0.0;

    while shared.running.load(Ordering::Acquire) {
        let started = Instant::now();

        let (position, velocity) = {
            let k = shared.kinematics.lock();
            (k.position, k.velocity)
        };

        let outcome = controller.step(position, velocity);

        for (from, to) in outcome.transitions() {
            info!(
                agent = shared.id,
                from = %from,
                to = %to,
                sim_time = controller.sim_time(),
                "Phase transition"
            );
            metrics::counter!("uav_phase_transitions_total", "to" => to.as_str()).increment(1);
            shared.record(FlightEvent::phase_changed(
                shared.id,
                from,
                to,
                outcome.position,
                controller.sim_time(),
            ));
        }

        if outcome.is_finite() {
            let mut k = shared.kinematics.lock();
            k.position = outcome.position;
            k.velocity = outcome.velocity;
            k.acceleration = outcome.acceleration;
            k.phase = outcome.phase;
            k.sim_time = controller.sim_time();
        } else {
            warn!(agent = shared.id, ?outcome, "Non-finite tick dropped");
            metrics::counter!("uav_ticks_dropped_total").increment(1);
        }

        since_status += DT;
        if since_status >= STATUS_PERIOD {
            since_status = 0.0;
            trace!(
                agent = shared.id,
                phase = %outcome.phase,
                speed = outcome.velocity.magnitude(),
                altitude = outcome.position.z,
                "Agent status"
            );
        }

        if let Some(rest) = TICK.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    controller
}
