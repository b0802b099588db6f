//! Per-agent stage control and the per-stage event tables.
//!
//! Stages are a closed, ordered set of six severity levels. Each stage owns
//! a data table of weighted event descriptors; the tables are plain data
//! rather than polymorphic stage objects since the event set per stage is
//! known at compile time.

use crate::config::StageConfig;
use nocturne_data::{AgentProgress, EventKind, MAX_STAGE};

/// Number of progression stages.
pub const STAGE_COUNT: usize = 6;

/// Weighted event table for one stage. Weights are relative integers.
pub type StageTable = &'static [(u32, EventKind)];

const STAGE_0: StageTable = &[
    (55, EventKind::DistantGrowl),
    (25, EventKind::FootstepsBehind),
    (15, EventKind::ScreenStatic),
    (5, EventKind::SpawnFleer),
];

const STAGE_1: StageTable = &[
    (35, EventKind::DistantGrowl),
    (25, EventKind::FootstepsBehind),
    (15, EventKind::WhisperedName),
    (10, EventKind::ScreenStatic),
    (10, EventKind::SpawnFleer),
    (5, EventKind::SpawnWatcher),
];

const STAGE_2: StageTable = &[
    (25, EventKind::FootstepsBehind),
    (20, EventKind::WhisperedName),
    (15, EventKind::ScreenStatic),
    (10, EventKind::FogClamp),
    (15, EventKind::SpawnWatcher),
    (10, EventKind::SpawnStalker),
    (5, EventKind::Heartbeat),
];

const STAGE_3: StageTable = &[
    (15, EventKind::WhisperedName),
    (15, EventKind::Heartbeat),
    (15, EventKind::FogClamp),
    (20, EventKind::SpawnStalker),
    (15, EventKind::SpawnShade),
    (10, EventKind::SpawnExcavator),
    (10, EventKind::SpawnWatcher),
];

const STAGE_4: StageTable = &[
    (10, EventKind::Heartbeat),
    (10, EventKind::FogClamp),
    (20, EventKind::SpawnStalker),
    (20, EventKind::SpawnShade),
    (15, EventKind::SpawnExcavator),
    (20, EventKind::SpawnChaser),
    (5, EventKind::PortalFragment),
];

const STAGE_5: StageTable = &[
    (5, EventKind::FogClamp),
    (10, EventKind::Heartbeat),
    (15, EventKind::SpawnShade),
    (20, EventKind::SpawnExcavator),
    (40, EventKind::SpawnChaser),
    (10, EventKind::PortalFragment),
];

/// Event table for a stage, or `None` for an out-of-range index.
#[must_use]
pub fn stage_table(stage: u8) -> Option<StageTable> {
    match stage {
        0 => Some(STAGE_0),
        1 => Some(STAGE_1),
        2 => Some(STAGE_2),
        3 => Some(STAGE_3),
        4 => Some(STAGE_4),
        5 => Some(STAGE_5),
        _ => None,
    }
}

/// Owns advancement timing decisions over [`AgentProgress`] records.
///
/// All side effects are limited to the record itself; the immediate
/// "welcome" event draw an advancement triggers is performed by the caller
/// through the dispatcher.
pub struct StageController;

impl StageController {
    /// True iff the agent is below the terminal stage and has spent longer
    /// in the current stage than its configured duration.
    #[must_use]
    pub fn is_ready_to_advance(cfg: &StageConfig, progress: &AgentProgress, now_tick: u64) -> bool {
        if progress.stage >= MAX_STAGE {
            return false;
        }
        let elapsed = now_tick.saturating_sub(progress.last_advance_tick);
        elapsed > cfg.duration_for(progress.stage)
    }

    /// Advances one stage (clamped at the terminal stage) and resets the
    /// timer. Returns the new stage when an advancement happened.
    pub fn advance(progress: &mut AgentProgress, now_tick: u64) -> Option<u8> {
        if progress.stage >= MAX_STAGE {
            return None;
        }
        progress.stage += 1;
        progress.last_advance_tick = now_tick;
        Some(progress.stage)
    }

    /// Resets progression to defaults: stage 0, modifier 1.0, timer now.
    pub fn reset(progress: &mut AgentProgress, now_tick: u64) {
        progress.stage = 0;
        progress.frequency_modifier = 1.0;
        progress.last_advance_tick = now_tick;
    }

    /// Forces a stage, clamped to the valid range, and resets the timer.
    pub fn set_stage(progress: &mut AgentProgress, stage: u8, now_tick: u64) {
        progress.stage = stage.min(MAX_STAGE);
        progress.last_advance_tick = now_tick;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> StageConfig {
        StageConfig {
            durations: vec![100, 100, 100, 100, 100],
            default_duration: 100,
        }
    }

    #[test]
    fn test_all_stage_tables_present_and_weighted() {
        for stage in 0..STAGE_COUNT as u8 {
            let table = stage_table(stage).unwrap();
            assert!(!table.is_empty());
            let total: u32 = table.iter().map(|(w, _)| *w).sum();
            assert!(total > 0, "stage {stage} has zero total weight");
        }
        assert!(stage_table(6).is_none());
    }

    #[test]
    fn test_ready_only_after_duration() {
        let progress = AgentProgress::new(0);
        assert!(!StageController::is_ready_to_advance(&cfg(), &progress, 100));
        assert!(StageController::is_ready_to_advance(&cfg(), &progress, 101));
    }

    #[test]
    fn test_advance_clamps_at_terminal_stage() {
        let mut progress = AgentProgress::new(0);
        for expected in 1..=MAX_STAGE {
            assert_eq!(StageController::advance(&mut progress, 10), Some(expected));
        }
        assert_eq!(StageController::advance(&mut progress, 10), None);
        assert_eq!(progress.stage, MAX_STAGE);
    }

    #[test]
    fn test_terminal_stage_never_ready() {
        let mut progress = AgentProgress::new(0);
        progress.stage = MAX_STAGE;
        assert!(!StageController::is_ready_to_advance(&cfg(), &progress, u64::MAX));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut progress = AgentProgress {
            stage: 4,
            last_advance_tick: 50,
            frequency_modifier: 0.0,
        };
        StageController::reset(&mut progress, 200);
        assert_eq!(progress.stage, 0);
        assert_eq!(progress.frequency_modifier, 1.0);
        assert_eq!(progress.last_advance_tick, 200);
    }

    #[test]
    fn test_set_stage_clamps() {
        let mut progress = AgentProgress::new(0);
        StageController::set_stage(&mut progress, 99, 10);
        assert_eq!(progress.stage, MAX_STAGE);
        assert_eq!(progress.last_advance_tick, 10);
    }

    #[test]
    fn test_missing_duration_config_uses_safe_default() {
        let cfg = StageConfig {
            durations: Vec::new(),
            default_duration: 50,
        };
        let progress = AgentProgress::new(0);
        assert!(StageController::is_ready_to_advance(&cfg, &progress, 51));
    }
}
