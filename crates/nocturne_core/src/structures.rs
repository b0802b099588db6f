//! Chunk-capped procedural structure placement.
//!
//! Runs on its own sampling schedule, decoupled from stage and event state:
//! each tick, each agent gets a rare independent roll; success samples a
//! candidate location in an annulus, searches vertically for a valid
//! surface, rate-limits by spatial cell, and selects a rarity tier and a
//! concrete structure id.

use crate::config::StructureConfig;
use crate::ports::{AgentView, StructurePlacer, WorldQuery};
use crate::rng::weighted_index;
use nocturne_data::{BlockPos, CellKey, ChunkSpawnRecord, StructureId, StructureTier};
use rand::Rng;
use std::collections::HashMap;

/// A committed placement, for journaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub id: StructureId,
    pub tier: StructureTier,
    pub pos: BlockPos,
    pub cell: CellKey,
}

/// Per-cell placement ledger.
///
/// Memory is bounded by the periodic sweep, which clears every record
/// unconditionally; this is a deliberate simplification, not a per-cell TTL.
#[derive(Debug, Default)]
pub struct ChunkLedger {
    records: HashMap<CellKey, ChunkSpawnRecord>,
}

impl ChunkLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, cell: CellKey) -> Option<ChunkSpawnRecord> {
        self.records.get(&cell).copied()
    }

    #[must_use]
    pub fn at_cap(&self, cell: CellKey, cap: u32) -> bool {
        self.records.get(&cell).is_some_and(|r| r.count >= cap)
    }

    /// Charges one placement against a cell.
    pub fn commit(&mut self, cell: CellKey, tick: u64) {
        let record = self.records.entry(cell).or_default();
        record.count += 1;
        record.last_spawn_tick = tick;
    }

    /// Unconditional whole-map eviction.
    pub fn sweep(&mut self) {
        self.records.clear();
    }
}

/// Per-agent per-tick placement roll. Returns the placement when one landed.
pub fn roll_for_agent<W, S, R>(
    cfg: &StructureConfig,
    agent: AgentView,
    world: &W,
    placer: &mut S,
    ledger: &mut ChunkLedger,
    rng: &mut R,
    tick: u64,
) -> Option<Placement>
where
    W: WorldQuery,
    S: StructurePlacer,
    R: Rng,
{
    if rng.gen::<f32>() >= cfg.attempt_chance {
        return None;
    }
    attempt_placement(
        cfg,
        agent,
        world,
        placer,
        ledger,
        rng,
        tick,
        None,
        cfg.min_radius,
        cfg.max_radius,
    )
}

/// Cap-checked placement used by the rare portal-fragment event; samples a
/// tight annulus around the agent and always draws from the rarest tier.
pub fn place_fragment<W, S, R>(
    cfg: &StructureConfig,
    agent: AgentView,
    world: &W,
    placer: &mut S,
    ledger: &mut ChunkLedger,
    rng: &mut R,
    tick: u64,
) -> Option<Placement>
where
    W: WorldQuery,
    S: StructurePlacer,
    R: Rng,
{
    attempt_placement(
        cfg,
        agent,
        world,
        placer,
        ledger,
        rng,
        tick,
        Some(StructureTier::Mythic),
        8.0,
        24.0,
    )
}

/// Location sample, cap check, then rarity draw, in that order: a failed
/// probe or a capped cell consumes no tier entropy.
#[allow(clippy::too_many_arguments)]
fn attempt_placement<W, S, R>(
    cfg: &StructureConfig,
    agent: AgentView,
    world: &W,
    placer: &mut S,
    ledger: &mut ChunkLedger,
    rng: &mut R,
    tick: u64,
    forced_tier: Option<StructureTier>,
    min_radius: f64,
    max_radius: f64,
) -> Option<Placement>
where
    W: WorldQuery,
    S: StructurePlacer,
    R: Rng,
{
    let pos = find_surface(cfg, world, agent.pos, rng, min_radius, max_radius)?;
    let cell = CellKey::of(pos, cfg.cell_size);
    if ledger.at_cap(cell, cfg.cell_cap) {
        tracing::debug!(cx = cell.cx, cz = cell.cz, "Cell at density cap, placement aborted");
        return None;
    }
    let tier = match forced_tier {
        Some(t) => t,
        None => select_tier(cfg, rng)?,
    };
    let id = draw_id(cfg, tier, rng);
    if !placer.place(id, pos) {
        tracing::debug!(id = id.0, "Placer refused structure, not charged");
        return None;
    }
    ledger.commit(cell, tick);
    Some(Placement { id, tier, pos, cell })
}

/// Weighted rarity draw over the four tiers.
pub fn select_tier<R: Rng>(cfg: &StructureConfig, rng: &mut R) -> Option<StructureTier> {
    weighted_index(rng, &cfg.tier_weights).map(|i| StructureTier::ALL[i])
}

/// Concrete id drawn uniformly within the tier's inclusive range.
fn draw_id<R: Rng>(cfg: &StructureConfig, tier: StructureTier, rng: &mut R) -> StructureId {
    let [lo, hi] = cfg.tier_ranges[tier.index()];
    if lo >= hi {
        StructureId(lo)
    } else {
        StructureId(rng.gen_range(lo..=hi))
    }
}

/// Samples the annulus around `origin` and scans vertically for a surface
/// (air at and above solid ground), preferring elevations near the agent's
/// own when the agent is outdoors. Bounded by `surface_probes`.
fn find_surface<W: WorldQuery, R: Rng>(
    cfg: &StructureConfig,
    world: &W,
    origin: BlockPos,
    rng: &mut R,
    min_radius: f64,
    max_radius: f64,
) -> Option<BlockPos> {
    let outdoors = world.can_see_sky(origin);
    for _ in 0..cfg.surface_probes {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let radius = rng.gen_range(min_radius..=max_radius);
        let x = origin.x + (angle.cos() * radius).round() as i32;
        let z = origin.z + (angle.sin() * radius).round() as i32;

        let mut offsets: Vec<i32> = Vec::new();
        if outdoors {
            // Nearest-to-agent elevation first.
            for d in 0..=cfg.surface_scan {
                offsets.push(d);
                if d != 0 {
                    offsets.push(-d);
                }
            }
        } else {
            offsets.extend(-cfg.surface_scan..=cfg.surface_scan);
        }
        for dy in offsets {
            let candidate = BlockPos::new(x, origin.y + dy, z);
            if world.is_solid(candidate.offset(0, -1, 0))
                && world.is_air(candidate)
                && world.is_air(candidate.offset(0, 1, 0))
            {
                return Some(candidate);
            }
        }
    }
    None
}
