// src/runtime/collision.rs
//! Swarm-wide collision pass
//!
//! Snapshots every agent (one lock at a time, never two at once), finds pairs
//! closer than `min_distance` and swaps their velocities: an elastic,
//! equal-mass exchange that leaves positions untouched.
//!
//! Agents keep flying while the pass runs, so snapshots of different agents
//! may be up to one tick apart. That is close enough at tick granularity.
//!
//! When three or more agents are mutually in contact the swaps are applied
//! pairwise in index order (i ascending, then j ascending), each using the
//! pre-pass velocities. This is an approximation, not N-body resolution.

use crate::math::distance;
use crate::recording::FlightEvent;
use crate::runtime::agent_runtime::{Agent, Snapshot};
use tracing::debug;

/// Default contact distance (1 cm)
pub const DEFAULT_MIN_DISTANCE: f64 = 0.01;

/// Index pairs `(i, j)`, `i < j`, whose positions are closer than `min_distance`
pub fn find_collisions(snapshots: &[Snapshot], min_distance: f64) -> Vec<(usize, usize)> {
    let n = snapshots.len();
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if distance(snapshots[i].position, snapshots[j].position) < min_distance {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Detect and resolve collisions across `agents`
pub fn resolve_collisions<A: AsRef<Agent>>(agents: &[A], min_distance: f64) {
    if agents.len() < 2 {
        return;
    }

    let snapshots: Vec<Snapshot> = agents.iter().map(|a| a.as_ref().snapshot()).collect();

    for (i, j) in find_collisions(&snapshots, min_distance) {
        let (a, b) = (agents[i].as_ref(), agents[j].as_ref());
        let (sa, sb) = (&snapshots[i], &snapshots[j]);

        a.set_velocity(sb.velocity);
        b.set_velocity(sa.velocity);

        debug!(
            a = a.id(),
            b = b.id(),
            distance = distance(sa.position, sb.position),
            "Collision resolved by velocity swap"
        );
        metrics::counter!("uav_collisions_resolved_total").increment(1);

        a.record(FlightEvent::collision_swap(a.id(), b.id(), sa.position, sa.sim_time));
        b.record(FlightEvent::collision_swap(b.id(), a.id(), sb.position, sb.sim_time));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlConfig;
    use crate::math::Vec3;
    use crate::recording::{EventQueue, FlightEventKind};
    use crate::runtime::agent_runtime::AgentOptions;
    use std::sync::Arc;

    fn agent_at(position: Vec3, velocity: Vec3) -> Agent {
        let agent = Agent::new(position, ControlConfig::default()).unwrap();
        agent.set_velocity(velocity);
        agent
    }

    #[test]
    fn test_close_pair_swaps_velocities() {
        let va = Vec3::new(1.0, 0.0, 0.0);
        let vb = Vec3::new(-2.0, 0.5, 3.0);
        let agents = vec![
            agent_at(Vec3::new(0.0, 0.0, 0.0), va),
            agent_at(Vec3::new(0.005, 0.0, 0.0), vb),
        ];

        resolve_collisions(&agents, 0.01);

        assert_eq!(agents[0].velocity(), vb);
        assert_eq!(agents[1].velocity(), va);
    }

    #[test]
    fn test_distant_agent_untouched() {
        let va = Vec3::new(1.0, 0.0, 0.0);
        let vb = Vec3::new(0.0, 1.0, 0.0);
        let vc = Vec3::new(0.0, 0.0, 1.0);
        let agents = vec![
            agent_at(Vec3::new(10.0, 10.0, 10.0), va),
            agent_at(Vec3::new(10.0, 10.0, 10.5), vb),
            agent_at(Vec3::new(-40.0, 0.0, 0.0), vc),
        ];

        resolve_collisions(&agents, 1.0);

        assert_eq!(agents[0].velocity(), vb);
        assert_eq!(agents[1].velocity(), va);
        assert_eq!(agents[2].velocity(), vc);
    }

    #[test]
    fn test_positions_never_change() {
        let pa = Vec3::new(1.0, 2.0, 3.0);
        let pb = Vec3::new(1.0, 2.0, 3.001);
        let agents = vec![
            agent_at(pa, Vec3::new(1.0, 0.0, 0.0)),
            agent_at(pb, Vec3::new(0.0, 1.0, 0.0)),
        ];

        resolve_collisions(&agents, 0.01);

        assert_eq!(agents[0].position(), pa);
        assert_eq!(agents[1].position(), pb);
    }

    #[test]
    fn test_boundary_distance_is_not_a_collision() {
        let va = Vec3::new(1.0, 0.0, 0.0);
        let agents = vec![
            agent_at(Vec3::new(0.0, 0.0, 0.0), va),
            agent_at(Vec3::new(0.5, 0.0, 0.0), Vec3::ZERO),
        ];

        resolve_collisions(&agents, 0.5);

        assert_eq!(agents[0].velocity(), va);
    }

    #[test]
    fn test_fewer_than_two_agents() {
        let single = vec![agent_at(Vec3::ZERO, Vec3::X)];
        resolve_collisions(&single, 1.0);
        assert_eq!(single[0].velocity(), Vec3::X);

        let empty: Vec<Agent> = Vec::new();
        resolve_collisions(&empty, 1.0);
    }

    #[test]
    fn test_three_body_sequential_order() {
        let v = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        ];
        let agents: Vec<Arc<Agent>> = (0..3)
            .map(|i| Arc::new(agent_at(Vec3::new(0.001 * i as f64, 0.0, 0.0), v[i])))
            .collect();

        resolve_collisions(&agents, 0.01);

        // pairs (0,1), (0,2), (1,2) applied in order from pre-pass snapshots
        assert_eq!(agents[0].velocity(), v[2]);
        assert_eq!(agents[1].velocity(), v[2]);
        assert_eq!(agents[2].velocity(), v[1]);
    }

    #[test]
    fn test_find_collisions() {
        let snap = |x: f64| Snapshot {
            position: Vec3::new(x, 0.0, 0.0),
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            phase: crate::control::Phase::OnSphere,
            sim_time: 0.0,
        };
        let snapshots = [snap(0.0), snap(5.0), snap(0.3), snap(5.2)];
        assert_eq!(find_collisions(&snapshots, 0.5), vec![(0, 2), (1, 3)]);
        assert!(find_collisions(&snapshots, 0.1).is_empty());
    }

    #[test]
    fn test_swaps_are_recorded() {
        let recorder = Arc::new(EventQueue::new(8));
        let make = |id: u32, x: f64| {
            Agent::with_options(
                Vec3::new(x, 0.0, 0.0),
                ControlConfig::default(),
                AgentOptions {
                    id: Some(id),
                    recorder: Some(Arc::clone(&recorder)),
                    ..Default::default()
                },
            )
            .unwrap()
        };
        let agents = vec![make(1, 0.0), make(2, 0.001)];

        resolve_collisions(&agents, 0.01);

        let events = recorder.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].agent_id, 1);
        assert_eq!(events[0].kind, FlightEventKind::CollisionSwap { with: 2 });
        assert_eq!(events[1].kind, FlightEventKind::CollisionSwap { with: 1 });
    }
}
