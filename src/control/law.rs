// src/control/law.rs
//! Phase-based control law
//!
//! Converts an agent's position and velocity into a bounded thrust vector:
//!
//! ```text
//! GroundWait ──(wait elapsed)──▶ ClimbToCenter ──(|p - c| < 2)──▶ OnSphere
//!   motors off                    radial PID toward c         radial PID holds |p - c| = R
//!                                 + braking above 2 m/s       + speed PID along tangent
//! ```
//!
//! Each phase has its own transition function. Transitions are checked once
//! per tick, right after the phase clock is advanced, and a function that
//! leaves its phase hands the same tick to its successor.

use crate::control::phase::{ControlState, Phase};
use crate::control::pid::{PidController, PidGains};
use crate::math::{clamp_magnitude, distance, Vec3};
use crate::utils::errors::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Distance to the center at which the climb counts as arrived
pub const ARRIVAL_TOLERANCE: f64 = 2.0;

/// Speed above which the climb applies braking
pub const CLIMB_BRAKE_SPEED: f64 = 2.0;

/// Braking force per m/s of excess climb speed
pub const CLIMB_BRAKE_GAIN: f64 = 0.5;

/// Cross products shorter than this fall back to [`Vec3::X`] as tangent
const TANGENT_DEGENERACY: f64 = 1e-3;

/// Immutable per-agent control configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Center of the target sphere
    pub center: Vec3,

    /// Radius of the target sphere (m)
    pub sphere_radius: f64,

    /// Time spent on the ground before takeoff (s)
    pub ground_wait: f64,

    /// Maximum total motor force (N)
    pub max_force: f64,

    /// Lower edge of the cruise speed band on the sphere (m/s)
    pub min_speed: f64,

    /// Upper edge of the cruise speed band on the sphere (m/s)
    pub max_speed: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 0.0, 50.0),
            sphere_radius: 10.0,
            ground_wait: 5.0,
            max_force: 20.0,
            min_speed: 2.0,
            max_speed: 10.0,
        }
    }
}

impl ControlConfig {
    /// Reject configurations the control law cannot fly
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            self.sphere_radius,
            self.ground_wait,
            self.max_force,
            self.min_speed,
            self.max_speed,
        ];
        if !self.center.is_finite() || scalars.iter().any(|v| !v.is_finite()) {
            return Err(SimError::InvalidConfig(
                "control values must be finite".to_string(),
            ));
        }
        if self.sphere_radius <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "sphere radius must be positive, got {}",
                self.sphere_radius
            )));
        }
        if self.ground_wait < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "ground wait cannot be negative, got {}",
                self.ground_wait
            )));
        }
        if self.max_force <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "max force must be positive, got {}",
                self.max_force
            )));
        }
        if self.min_speed <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "min speed must be positive, got {}",
                self.min_speed
            )));
        }
        if self.max_speed < self.min_speed {
            return Err(SimError::InvalidConfig(format!(
                "max speed {} is below min speed {}",
                self.max_speed, self.min_speed
            )));
        }
        Ok(())
    }

    /// Midpoint of the cruise speed band
    pub fn target_speed(&self) -> f64 {
        0.5 * (self.min_speed + self.max_speed)
    }
}

/// The two PID axes flown by one agent
#[derive(Debug, Clone)]
pub struct ControlPids {
    /// Keeps |p - c| at its target (0 while climbing, R on the sphere)
    pub radial: PidController,

    /// Keeps speed at the middle of the cruise band
    pub speed: PidController,
}

impl ControlPids {
    pub fn new(radial: PidGains, speed: PidGains) -> Result<Self> {
        Ok(Self {
            radial: PidController::new(radial)?,
            speed: PidController::new(speed)?,
        })
    }

    pub fn reset(&mut self) {
        self.radial.reset();
        self.speed.reset();
    }
}

impl Default for ControlPids {
    fn default() -> Self {
        Self {
            radial: PidController::radial(),
            speed: PidController::speed(),
        }
    }
}

/// Compute this tick's motor force, advancing `state` and `pids` in place.
///
/// The returned vector never exceeds `cfg.max_force` in magnitude.
pub fn compute_control_force(
    position: Vec3,
    velocity: Vec3,
    state: &mut ControlState,
    pids: &mut ControlPids,
    cfg: &ControlConfig,
    dt: f64,
) -> Vec3 {
    state.time_in_phase += dt;

    let mut tick = Tick {
        position,
        velocity,
        state,
        pids,
        cfg,
        dt,
    };

    match tick.state.phase() {
        Phase::GroundWait => ground_wait(&mut tick),
        Phase::ClimbToCenter => climb_to_center(&mut tick),
        Phase::OnSphere => on_sphere(&mut tick),
    }
}

/// Inputs and mutable state for one control update
struct Tick<'a> {
    position: Vec3,
    velocity: Vec3,
    state: &'a mut ControlState,
    pids: &'a mut ControlPids,
    cfg: &'a ControlConfig,
    dt: f64,
}

impl Tick<'_> {
    /// Vector to the center, its length and direction
    fn geometry(&self) -> (f64, Vec3) {
        let to_center = self.cfg.center - self.position;
        (to_center.magnitude(), to_center.normalized())
    }
}

/// Motors off until the wait elapses, then hand over to the climb
fn ground_wait(tick: &mut Tick<'_>) -> Vec3 {
    if tick.state.time_in_phase < tick.cfg.ground_wait {
        return Vec3::ZERO;
    }
    tick.state.advance();
    climb_to_center(tick)
}

/// Radial PID toward the center, braking above the climb speed
fn climb_to_center(tick: &mut Tick<'_>) -> Vec3 {
    if distance(tick.position, tick.cfg.center) < ARRIVAL_TOLERANCE {
        tick.state.advance();
        tick.pids.reset();
        return on_sphere(tick);
    }

    let (r, radial_dir) = tick.geometry();

    // target r = 0
    let thrust = tick.pids.radial.calculate(r, tick.dt);
    let mut force = radial_dir * thrust;

    let speed = tick.velocity.magnitude();
    if speed > CLIMB_BRAKE_SPEED {
        force -= tick.velocity.normalized() * (CLIMB_BRAKE_GAIN * (speed - CLIMB_BRAKE_SPEED));
    }

    clamp_magnitude(force, tick.cfg.max_force)
}

/// Hold |p - c| = R while cruising along a tangent
fn on_sphere(tick: &mut Tick<'_>) -> Vec3 {
    let (r, radial_dir) = tick.geometry();

    // radial_dir points at the center, so a positive error (outside the
    // sphere) pulls inward and a negative one pushes outward
    let radial_out = tick.pids.radial.calculate(r - tick.cfg.sphere_radius, tick.dt);
    let radial_force = radial_dir * radial_out;

    let mut tangent = radial_dir.cross(Vec3::Z);
    if tangent.magnitude() < TANGENT_DEGENERACY {
        tangent = Vec3::X;
    }
    let tangent = tangent.normalized();
    tick.state.tangential_dir = tangent;

    let speed_error = tick.cfg.target_speed() - tick.velocity.magnitude();
    let speed_out = tick.pids.speed.calculate(speed_error, tick.dt);
    let tangential_force = tangent * speed_out;

    clamp_magnitude(radial_force + tangential_force, tick.cfg.max_force)
}
