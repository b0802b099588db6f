mod common;

use common::RigBuilder;
use nocturne_data::MAX_STAGE;

/// Short stage durations and no periodic events, so only advancement and
/// its welcome draw touch the outputs.
fn quiet_progression() -> RigBuilder {
    RigBuilder::new()
        .with_agent_at(0, 0)
        .with_config(|cfg| {
            cfg.stages.durations = vec![10, 10, 10, 10, 10];
            cfg.stages.default_duration = 10;
            cfg.events.base_frequency = 0.0;
            cfg.structures.attempt_chance = 0.0;
        })
}

#[test]
fn test_stage_advances_after_duration() {
    let mut rig = quiet_progression().build();
    rig.run(10);
    assert_eq!(rig.stage_of(0), 0, "must not advance at the duration bound");
    rig.run(2);
    assert_eq!(rig.stage_of(0), 1);
}

#[test]
fn test_stage_is_terminal_at_max() {
    let mut rig = quiet_progression().build();
    rig.run(200);
    assert_eq!(rig.stage_of(0), MAX_STAGE);
    rig.run(1_000);
    assert_eq!(rig.stage_of(0), MAX_STAGE, "terminal stage must hold");
}

#[test]
fn test_each_advancement_performs_one_welcome_draw() {
    let mut rig = quiet_progression().build();
    rig.run(200);
    assert_eq!(rig.engine.metrics().welcome_draws(), u64::from(MAX_STAGE));
    // With base frequency zero, periodic rolls never trigger; every dispatch
    // came from a welcome draw.
    assert_eq!(rig.engine.metrics().dispatches(), u64::from(MAX_STAGE));
}

#[test]
fn test_welcome_draw_is_observable() {
    let mut rig = quiet_progression().build();
    rig.run(200);
    // Every welcome draw executes a variant; each variant is either a
    // presentation effect or an actor spawn.
    let observed = rig.fx.total() + rig.factory.spawned.len();
    assert!(
        observed >= MAX_STAGE as usize,
        "expected at least {MAX_STAGE} observable outputs, got {observed}"
    );
}

#[test]
fn test_reset_returns_agent_to_stage_zero() {
    let mut rig = quiet_progression().build();
    rig.run(25);
    assert!(rig.stage_of(0) >= 2);
    rig.engine.reset_agent(rig.agent(0).id);
    assert_eq!(rig.stage_of(0), 0);
    let progress = rig.engine.progress(rig.agent(0).id).unwrap();
    assert_eq!(progress.frequency_modifier, 1.0);
}

#[test]
fn test_forced_stage_takes_effect_next_roll() {
    let mut rig = RigBuilder::new()
        .with_agent_at(0, 0)
        .with_config(|cfg| {
            cfg.events.base_frequency = 0.0;
        })
        .build();
    rig.run(5);
    rig.engine.force_stage(rig.agent(0).id, 4);
    assert_eq!(rig.stage_of(0), 4);
}

#[test]
fn test_zero_modifier_disables_events_entirely() {
    let mut rig = RigBuilder::new()
        .with_agent_at(0, 0)
        .with_config(|cfg| {
            // Would trigger on almost every roll if enabled.
            cfg.events.base_frequency = 1.0;
            cfg.events.roll_interval_ticks = 1;
            cfg.structures.attempt_chance = 0.0;
            cfg.stages.default_duration = 1_000_000;
            cfg.stages.durations = Vec::new();
        })
        .build();
    rig.engine.set_frequency_modifier(rig.agent(0).id, 0.0);
    rig.run(5_000);
    assert_eq!(rig.engine.metrics().rolls(), 0, "disabled agent must not roll");
    assert_eq!(rig.engine.metrics().dispatches(), 0);
    assert_eq!(rig.fx.total(), 0);
}
