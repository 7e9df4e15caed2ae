// src/recording/event.rs
//! Flight events emitted by agents and the collision pass

use crate::control::Phase;
use crate::math::Vec3;
use serde::{Deserialize, Serialize};

/// Something noteworthy that happened to one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightEvent {
    /// Agent the event belongs to
    pub agent_id: u32,

    /// What happened
    pub kind: FlightEventKind,

    /// Agent position when it happened
    pub position: Vec3,

    /// Simulated seconds since the agent was created
    pub sim_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FlightEventKind {
    /// The agent's state machine moved forward
    PhaseChanged { from: Phase, to: Phase },

    /// The collision pass swapped this agent's velocity with another's
    CollisionSwap { with: u32 },
}

impl FlightEvent {
    pub fn phase_changed(
        agent_id: u32,
        from: Phase,
        to: Phase,
        position: Vec3,
        sim_time: f64,
    ) -> Self {
        Self {
            agent_id,
            kind: FlightEventKind::PhaseChanged { from, to },
            position,
            sim_time,
        }
    }

    pub fn collision_swap(agent_id: u32, with: u32, position: Vec3, sim_time: f64) -> Self {
        Self {
            agent_id,
            kind: FlightEventKind::CollisionSwap { with },
            position,
            sim_time,
        }
    }

    /// JSON form used by structured logs
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let event = FlightEvent::phase_changed(
            7,
            Phase::GroundWait,
            Phase::ClimbToCenter,
            Vec3::new(1.0, 2.0, 0.0),
            5.01,
        );
        let json = event.to_json();
        assert_eq!(json["agent_id"], 7);
        assert_eq!(json["kind"]["type"], "phase_changed");
        assert_eq!(json["kind"]["from"], "ground_wait");
        assert_eq!(json["kind"]["to"], "climb_to_center");
        assert_eq!(json["position"]["y"], 2.0);
    }
}
