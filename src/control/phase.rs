// src/control/phase.rs
//! Flight phases and per-agent control state

use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Behavioral mode of one agent.
///
/// Variants are declared in flight order; an agent only ever moves to
/// [`Phase::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    GroundWait,
    ClimbToCenter,
    OnSphere,
}

impl Phase {
    /// The single phase this one may advance to
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::GroundWait => Some(Phase::ClimbToCenter),
            Phase::ClimbToCenter => Some(Phase::OnSphere),
            Phase::OnSphere => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::GroundWait => "ground_wait",
            Phase::ClimbToCenter => "climb_to_center",
            Phase::OnSphere => "on_sphere",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Control state owned by a single agent
#[derive(Debug, Clone)]
pub struct ControlState {
    /// Current phase, only moved forward by `advance`
    phase: Phase,

    /// Seconds spent in the current phase
    pub time_in_phase: f64,

    /// Set once the agent has reached the sphere center
    pub visited_center: bool,

    /// Last tangential wander direction used on the sphere
    pub tangential_dir: Vec3,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            phase: Phase::GroundWait,
            time_in_phase: 0.0,
            visited_center: false,
            tangential_dir: Vec3::X,
        }
    }
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start directly in `phase` (used to probe later phases in isolation)
    pub fn in_phase(phase: Phase) -> Self {
        Self {
            phase,
            visited_center: phase == Phase::OnSphere,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to the successor phase and restart the phase clock.
    ///
    /// Returns the phase that was left. There is no way to go backwards.
    pub(crate) fn advance(&mut self) -> Option<Phase> {
        let next = self.phase.next()?;
        let from = self.phase;
        self.phase = next;
        self.time_in_phase = 0.0;
        if next == Phase::OnSphere {
            self.visited_center = true;
        }
        Some(from)
    }
}
