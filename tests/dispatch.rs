mod common;

use common::RigBuilder;

/// One roll per tick, no stage advancement, no structure noise.
fn roll_heavy() -> RigBuilder {
    RigBuilder::new()
        .with_agent_at(0, 0)
        .with_config(|cfg| {
            cfg.events.roll_interval_ticks = 1;
            cfg.events.tuning_boost = 1.0;
            cfg.stages.default_duration = 10_000_000;
            cfg.stages.durations = Vec::new();
            cfg.structures.attempt_chance = 0.0;
        })
}

#[test]
fn test_trigger_rate_matches_configured_probability() {
    let mut rig = roll_heavy()
        .with_config(|cfg| {
            cfg.events.base_frequency = 0.0675;
        })
        .build();
    rig.run(10_000);
    let metrics = rig.engine.metrics();
    assert_eq!(metrics.rolls(), 10_000);
    let rate = metrics.dispatches() as f64 / metrics.rolls() as f64;
    assert!(
        (rate - 0.0675).abs() < 0.015,
        "empirical trigger rate {rate} too far from 0.0675"
    );
}

#[test]
fn test_stage_boost_raises_trigger_rate() {
    let mut low = roll_heavy()
        .with_config(|cfg| cfg.events.base_frequency = 0.05)
        .build();
    low.run(10_000);

    let mut high = roll_heavy()
        .with_config(|cfg| cfg.events.base_frequency = 0.05)
        .build();
    high.engine.force_stage(high.agent(0).id, 5);
    high.run(10_000);

    let low_rate = low.engine.metrics().dispatches() as f64 / 10_000.0;
    let high_rate = high.engine.metrics().dispatches() as f64 / 10_000.0;
    // Stage 5 doubles the boost over stage 0.
    assert!(
        high_rate > low_rate * 1.5,
        "stage 5 rate {high_rate} not clearly above stage 0 rate {low_rate}"
    );
}

#[test]
fn test_every_dispatch_is_observable_or_a_spawn() {
    let mut rig = roll_heavy()
        .with_config(|cfg| {
            cfg.events.base_frequency = 0.5;
            // Keep the actor cap out of the way so spawns stay observable.
            cfg.sim.max_actors = 500;
        })
        .build();
    rig.run(2_000);
    let metrics = rig.engine.metrics();
    assert!(metrics.dispatches() > 500);
    // Flat world: spawn searches always land, so nothing is silently lost.
    let observed = rig.fx.total() + rig.factory.spawned.len();
    assert!(
        observed as u64 >= metrics.dispatches(),
        "dispatches {} exceed observable outputs {observed}",
        metrics.dispatches()
    );
}

#[test]
fn test_force_event_dispatches_immediately() {
    let mut rig = roll_heavy()
        .with_config(|cfg| cfg.events.base_frequency = 0.0)
        .build();
    rig.run(10);
    assert_eq!(rig.engine.metrics().dispatches(), 0);

    let agent = rig.agent(0);
    let mut ports = nocturne_core::Ports {
        world: &rig.world,
        factory: &mut rig.factory,
        fx: &mut rig.fx,
        placer: &mut rig.placer,
    };
    rig.engine.force_event(agent, &mut ports);
    assert_eq!(rig.engine.metrics().dispatches(), 1);
}
