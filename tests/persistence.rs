mod common;

use common::RigBuilder;
use nocturne_core::persistence::{FileProgressStore, MemoryProgressStore};
use nocturne_data::MAX_STAGE;

fn temp_save(name: &str) -> String {
    let dir = std::env::temp_dir().join(format!("nocturne_it_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("progress.json").to_string_lossy().to_string()
}

#[test]
fn test_progress_survives_engine_restart() {
    let path = temp_save("restart");
    let agent_id;
    {
        let mut rig = RigBuilder::new()
            .with_agent_at(0, 0)
            .with_config(|cfg| {
                cfg.stages.durations = vec![10, 10, 10, 10, 10];
                cfg.stages.default_duration = 10;
                cfg.events.base_frequency = 0.0;
                cfg.structures.attempt_chance = 0.0;
            })
            .build();
        agent_id = rig.agent(0).id;
        rig.run(25);
        assert!(rig.stage_of(0) >= 2);
        let mut store = FileProgressStore::open(&path).unwrap();
        rig.engine.save_all(&mut store).unwrap();
    }

    let store = FileProgressStore::open(&path).unwrap();
    let mut rig = RigBuilder::new().with_agent_at(0, 0).build();
    assert_eq!(rig.agent(0).id, agent_id, "rig ids are stable across builds");
    rig.engine.on_agent_join(agent_id, &store);
    assert!(
        rig.engine.progress(agent_id).unwrap().stage >= 2,
        "restored stage must match the saved one"
    );
}

#[test]
fn test_leave_persists_and_drops_live_state() {
    let mut rig = RigBuilder::new().with_agent_at(0, 0).build();
    let agent = rig.agent(0).id;
    rig.engine.force_stage(agent, 4);
    let mut store = MemoryProgressStore::default();
    rig.engine.on_agent_leave(agent, &mut store).unwrap();
    assert!(rig.engine.progress(agent).is_none());
    assert_eq!(store.records.get(&agent).unwrap().stage, 4);
}

#[test]
fn test_rejoin_after_leave_restores_modifier() {
    let mut rig = RigBuilder::new().with_agent_at(0, 0).build();
    let agent = rig.agent(0).id;
    rig.engine.set_frequency_modifier(agent, 2.5);
    let mut store = MemoryProgressStore::default();
    rig.engine.on_agent_leave(agent, &mut store).unwrap();
    rig.engine.on_agent_join(agent, &store);
    assert_eq!(
        rig.engine.progress(agent).unwrap().frequency_modifier,
        2.5
    );
}

#[test]
fn test_corrupt_record_degrades_to_clamped_defaults() {
    let mut store = MemoryProgressStore::default();
    let mut rig = RigBuilder::new().with_agent_at(0, 0).build();
    let agent = rig.agent(0).id;
    store.records.insert(
        agent,
        nocturne_data::ProgressRecord {
            version: nocturne_data::PROGRESS_SCHEMA_VERSION,
            stage: 200,
            last_advance_tick: 0,
            frequency_modifier: -9.0,
        },
    );
    rig.engine.on_agent_join(agent, &store);
    let progress = rig.engine.progress(agent).unwrap();
    assert_eq!(progress.stage, MAX_STAGE);
    assert_eq!(progress.frequency_modifier, 0.0);
}
