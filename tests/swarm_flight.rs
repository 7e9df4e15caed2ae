// tests/swarm_flight.rs
//! Multithreaded flight tests: real worker threads, real pacing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use uav_swarm_engine::control::{ControlConfig, Phase};
use uav_swarm_engine::math::Vec3;
use uav_swarm_engine::recording::FlightEventKind;
use uav_swarm_engine::runtime::agent_runtime::CLIMB_SPEED_LIMIT;
use uav_swarm_engine::runtime::{resolve_collisions, Agent, Swarm};
use uav_swarm_engine::utils::config::SimulationConfig;

fn quick_takeoff() -> ControlConfig {
    ControlConfig {
        ground_wait: 0.0,
        ..Default::default()
    }
}

#[test]
fn test_waiting_agents_stay_on_the_ground() {
    let starts = [Vec3::new(-46.0, -22.5, 0.0), Vec3::new(20.0, 0.0, 0.0)];
    let agents: Vec<Agent> = starts
        .iter()
        .map(|&p| Agent::new(p, ControlConfig::default()).unwrap())
        .collect();

    for agent in &agents {
        agent.start().unwrap();
    }
    thread::sleep(Duration::from_millis(100));

    for (agent, start) in agents.iter().zip(starts) {
        let snap = agent.snapshot();
        assert_eq!(snap.phase, Phase::GroundWait);
        assert_eq!(snap.position, start);
        assert_eq!(snap.velocity, Vec3::ZERO);
        agent.stop();
    }
}

#[test]
fn test_climbing_agent_respects_speed_cap() {
    let agent = Agent::new(Vec3::ZERO, quick_takeoff()).unwrap();
    agent.start().unwrap();

    for _ in 0..20 {
        thread::sleep(Duration::from_millis(10));
        let snap = agent.snapshot();
        if snap.phase == Phase::ClimbToCenter {
            assert!(snap.velocity.magnitude() <= CLIMB_SPEED_LIMIT + 1e-9);
        }
    }

    agent.stop();
    assert_eq!(agent.phase(), Phase::ClimbToCenter);
    assert!(agent.position().z > 0.0);
}

#[test]
fn test_collision_pass_runs_alongside_workers() {
    let agents: Vec<Arc<Agent>> = (0..6)
        .map(|i| {
            let start = Vec3::new(0.001 * i as f64, 0.0, 0.0);
            Arc::new(Agent::new(start, quick_takeoff()).unwrap())
        })
        .collect();
    for agent in &agents {
        agent.start().unwrap();
    }

    let done = Arc::new(AtomicBool::new(false));
    let scheduler = {
        let agents = agents.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut passes = 0;
            while !done.load(Ordering::Acquire) {
                resolve_collisions(&agents, 0.01);
                passes += 1;
                thread::sleep(Duration::from_millis(3));
            }
            passes
        })
    };

    thread::sleep(Duration::from_millis(150));
    done.store(true, Ordering::Release);
    let passes = scheduler.join().unwrap();
    assert!(passes > 0);

    for agent in &agents {
        agent.stop();
        assert!(agent.snapshot().position.is_finite());
    }
}

#[test]
fn test_running_agent_follows_velocity_override() {
    let config = ControlConfig {
        ground_wait: 60.0,
        ..Default::default()
    };
    let agent = Agent::new(Vec3::ZERO, config).unwrap();
    agent.start().unwrap();
    thread::sleep(Duration::from_millis(30));

    // last writer wins: an override racing a publish can be overwritten once,
    // so keep writing until a tick integrates it
    let mut moved = false;
    for _ in 0..10 {
        agent.set_velocity(Vec3::new(1.0, 0.0, 0.0));
        thread::sleep(Duration::from_millis(30));
        if agent.position().x > 0.0 {
            moved = true;
            break;
        }
    }
    agent.stop();

    assert!(moved, "override never reached the worker");
    let snap = agent.snapshot();
    assert_eq!(snap.phase, Phase::GroundWait);
    assert!(snap.position.x > 0.0);
    assert_eq!(snap.position.z, 0.0);
    assert!((snap.velocity.x - 1.0).abs() < 1e-12);
}

#[test]
fn test_no_mutation_after_stop() {
    let agent = Agent::new(Vec3::ZERO, quick_takeoff()).unwrap();
    agent.start().unwrap();
    thread::sleep(Duration::from_millis(60));

    agent.stop();
    let frozen = agent.snapshot();
    thread::sleep(Duration::from_millis(40));
    assert_eq!(agent.snapshot(), frozen);

    agent.stop();
    assert_eq!(agent.snapshot(), frozen);
}

#[test]
fn test_swarm_takes_off_and_records_events() {
    let mut config = SimulationConfig::default();
    config.control.ground_wait = 0.05;
    config.swarm.columns = vec![-10.0, 0.0, 10.0];
    config.swarm.rows = vec![0.0];

    let swarm = Swarm::from_config(&config).unwrap();
    swarm.start_all().unwrap();
    thread::sleep(Duration::from_millis(300));
    swarm.resolve_collisions();
    swarm.stop_all();

    let stats = swarm.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.climbing, 3);
    assert_eq!(stats.running, 0);

    let recorder = swarm.recorder().unwrap();
    let takeoffs = recorder
        .drain()
        .into_iter()
        .filter(|e| {
            e.kind
                == FlightEventKind::PhaseChanged {
                    from: Phase::GroundWait,
                    to: Phase::ClimbToCenter,
                }
        })
        .count();
    assert_eq!(takeoffs, 3);
}
