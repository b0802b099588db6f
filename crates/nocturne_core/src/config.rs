//! Configuration management for engine parameters.
//!
//! Strongly-typed structures mapping to `config.toml`. Defaults are
//! hardcoded in the `Default` impls; a missing file falls back to defaults
//! so the engine never blocks on configuration at process start.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [sim]
//! seed = 42
//!
//! [events]
//! base_frequency = 0.05
//! tuning_boost = 1.35
//!
//! [structures]
//! cell_cap = 3
//! ```

use serde::{Deserialize, Serialize};

/// Simulation-wide parameters.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimConfig {
    /// World seed; `None` draws one from entropy at engine construction.
    pub seed: Option<u64>,
    /// Cap on live actors across all agents.
    pub max_actors: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_actors: 24,
        }
    }
}

/// Stage advancement timing.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StageConfig {
    /// Ticks an agent must spend in each stage before advancing. Indexed by
    /// stage; missing entries fall back to `default_duration`.
    pub durations: Vec<u64>,
    /// Safe default used when per-stage durations are not configured.
    pub default_duration: u64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            durations: vec![24_000, 24_000, 36_000, 36_000, 48_000],
            default_duration: 24_000,
        }
    }
}

impl StageConfig {
    /// Duration for a given stage, falling back to the global default.
    #[must_use]
    pub fn duration_for(&self, stage: u8) -> u64 {
        self.durations
            .get(stage as usize)
            .copied()
            .unwrap_or(self.default_duration)
    }
}

/// Event roll/dispatch tuning.
///
/// The trigger probability stacks several multipliers; their structure is
/// preserved from the original tuning, but every constant is configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EventConfig {
    /// Ticks between periodic rolls (20 ≈ one second of simulated time).
    pub roll_interval_ticks: u64,
    /// Per-roll base trigger probability before boosts.
    pub base_frequency: f32,
    /// Non-decreasing step function of stage; higher stages roll more often.
    pub stage_boost: [f32; 6],
    /// Flat tuning multiplier applied on top of everything else.
    pub tuning_boost: f32,
    /// Whether a triggering roll fans out to nearby agents under one seed.
    pub sync_enabled: bool,
    /// Radius within which agents perceive a synchronized event.
    pub sync_radius: f64,
    /// Window, in ticks, over which `event_count_window` is computed.
    pub recent_window_ticks: u64,
    /// Maximum retained entries in the recent-event ring.
    pub recent_capacity: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            roll_interval_ticks: 20,
            base_frequency: 0.05,
            stage_boost: [1.0, 1.1, 1.25, 1.45, 1.7, 2.0],
            tuning_boost: 1.35,
            sync_enabled: true,
            sync_radius: 96.0,
            recent_window_ticks: 6_000,
            recent_capacity: 64,
        }
    }
}

/// Actor behavior knobs that are not kind-specific.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ActorConfig {
    /// Bounded candidate count for teleport/reposition searches.
    pub teleport_candidates: u32,
    /// Bounded candidate count for event spawn placement.
    pub spawn_candidates: u32,
    /// Ticks an `Expiring` actor lingers before removal.
    pub expire_ticks: u32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            teleport_candidates: 12,
            spawn_candidates: 16,
            expire_ticks: 20,
        }
    }
}

/// Structure placement sampling and density limits.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StructureConfig {
    /// Per-agent per-tick probability of attempting a placement.
    pub attempt_chance: f32,
    /// Annulus radii around the agent for candidate sampling.
    pub min_radius: f64,
    pub max_radius: f64,
    /// Bounded number of candidate locations tried per attempt.
    pub surface_probes: u32,
    /// Vertical half-range searched for a valid surface.
    pub surface_scan: i32,
    /// Edge length of a density cell in blocks.
    pub cell_size: i32,
    /// Maximum placements per cell between sweeps.
    pub cell_cap: u32,
    /// Interval of the unconditional whole-map cleanup sweep.
    pub sweep_interval_ticks: u64,
    /// Weighted rarity tiers, most common first.
    pub tier_weights: [u32; 4],
    /// Inclusive id ranges per tier, parallel to `tier_weights`.
    pub tier_ranges: [[u16; 2]; 4],
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            attempt_chance: 1.0 / 4096.0,
            min_radius: 48.0,
            max_radius: 128.0,
            surface_probes: 8,
            surface_scan: 8,
            cell_size: 64,
            cell_cap: 3,
            sweep_interval_ticks: 72_000,
            tier_weights: [70, 20, 9, 1],
            tier_ranges: [[0, 11], [12, 19], [20, 25], [26, 27]],
        }
    }
}

/// Root configuration object.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub sim: SimConfig,
    pub stages: StageConfig,
    pub events: EventConfig,
    pub actors: ActorConfig,
    pub structures: StructureConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if !std::path::Path::new(path).exists() {
            tracing::info!(path = path, "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration parameters.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.events.roll_interval_ticks > 0,
            "Roll interval must be positive"
        );
        anyhow::ensure!(
            self.events.base_frequency >= 0.0 && self.events.base_frequency <= 1.0,
            "Base frequency must be in [0, 1]"
        );
        anyhow::ensure!(
            self.events.tuning_boost >= 0.0,
            "Tuning boost must be non-negative"
        );
        let mut prev = 0.0f32;
        for (i, &b) in self.events.stage_boost.iter().enumerate() {
            anyhow::ensure!(
                b >= prev,
                "Stage boost must be non-decreasing (violated at stage {i})"
            );
            prev = b;
        }
        anyhow::ensure!(self.events.sync_radius >= 0.0, "Sync radius must be non-negative");
        anyhow::ensure!(
            self.stages.default_duration > 0,
            "Default stage duration must be positive"
        );
        anyhow::ensure!(
            self.structures.attempt_chance >= 0.0 && self.structures.attempt_chance <= 1.0,
            "Structure attempt chance must be in [0, 1]"
        );
        anyhow::ensure!(
            self.structures.min_radius <= self.structures.max_radius,
            "Structure min radius exceeds max radius"
        );
        anyhow::ensure!(self.structures.cell_size > 0, "Cell size must be positive");
        anyhow::ensure!(self.structures.cell_cap > 0, "Cell cap must be positive");
        anyhow::ensure!(
            self.structures.sweep_interval_ticks > 0,
            "Sweep interval must be positive"
        );
        for (i, r) in self.structures.tier_ranges.iter().enumerate() {
            anyhow::ensure!(
                r[0] <= r[1],
                "Structure tier {i} has an inverted id range"
            );
        }
        anyhow::ensure!(self.sim.max_actors > 0, "Max actors must be positive");
        anyhow::ensure!(
            self.actors.teleport_candidates > 0 && self.actors.spawn_candidates > 0,
            "Candidate search bounds must be positive"
        );
        Ok(())
    }
}
