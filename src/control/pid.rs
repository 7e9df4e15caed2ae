// src/control/pid.rs
//! Single-axis PID controller with anti-windup
//!
//! The integral accumulator is clamped after every update so that a
//! sustained error (e.g. a long climb) cannot wind it up without bound.
//! The combined output is clamped as well.

use crate::utils::errors::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Gains and limits for one PID axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain
    pub kp: f64,

    /// Integral gain
    pub ki: f64,

    /// Derivative gain
    pub kd: f64,

    /// Bound on the absolute value of the integral accumulator
    pub integral_limit: f64,

    /// Bound on the absolute value of the output
    pub output_limit: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            integral_limit: 100.0,
            output_limit: 100.0,
        }
    }
}

impl PidGains {
    /// Radial axis: pulls the agent to the center, then holds it on the sphere
    pub fn radial() -> Self {
        Self {
            kp: 5.0,
            ki: 1.0,
            kd: 0.5,
            integral_limit: 100.0,
            output_limit: 20.0,
        }
    }

    /// Speed axis: keeps tangential speed inside the cruise band
    pub fn speed() -> Self {
        Self {
            kp: 0.8,
            ki: 0.0,
            kd: 10.0,
            integral_limit: 100.0,
            output_limit: 10.0,
        }
    }

    /// Validate gains and limits
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.kp,
            self.ki,
            self.kd,
            self.integral_limit,
            self.output_limit,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SimError::InvalidConfig(
                "PID gains and limits must be finite".to_string(),
            ));
        }
        if self.integral_limit < 0.0 || self.output_limit < 0.0 {
            return Err(SimError::InvalidConfig(
                "PID limits cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// PID controller state for one axis of one agent
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,

    /// Accumulated error, kept within `integral_limit`
    integral: f64,

    /// Error seen on the last non-empty tick
    prev_error: f64,

    integral_limit: f64,
    output_limit: f64,
}

impl PidController {
    /// Create a controller, rejecting gains that [`PidGains::validate`] refuses
    pub fn new(gains: PidGains) -> Result<Self> {
        gains.validate()?;
        Ok(Self::from_gains(gains))
    }

    /// Controller with [`PidGains::radial`]
    pub fn radial() -> Self {
        Self::from_gains(PidGains::radial())
    }

    /// Controller with [`PidGains::speed`]
    pub fn speed() -> Self {
        Self::from_gains(PidGains::speed())
    }

    fn from_gains(gains: PidGains) -> Self {
        Self {
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            integral: 0.0,
            prev_error: 0.0,
            integral_limit: gains.integral_limit,
            output_limit: gains.output_limit,
        }
    }

    /// Replace the gains, keeping accumulated state
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Advance one tick and return the clamped output.
    ///
    /// A non-positive `dt` is a no-op tick: it returns 0 and leaves the
    /// accumulator and previous error untouched.
    pub fn calculate(&mut self, error: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return 0.0;
        }

        let p_term = self.kp * error;

        self.integral += error * dt;
        self.integral = self
            .integral
            .clamp(-self.integral_limit, self.integral_limit);
        let i_term = self.ki * self.integral;

        let derivative = (error - self.prev_error) / dt;
        let d_term = self.kd * derivative;

        self.prev_error = error;

        (p_term + i_term + d_term).clamp(-self.output_limit, self.output_limit)
    }

    /// Clear integral and derivative history
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn prev_error(&self) -> f64 {
        self.prev_error
    }

    pub fn gains(&self) -> PidGains {
        PidGains {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            integral_limit: self.integral_limit,
            output_limit: self.output_limit,
        }
    }
}

impl Default for PidController {
    fn default() -> Self {
        Self::from_gains(PidGains::default())
    }
}
