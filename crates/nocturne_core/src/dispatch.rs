//! Event dispatch: trigger probability, weighted variant selection, and
//! variant execution against the presentation/world ports.
//!
//! The per-roll trigger probability stacks `base_frequency`,
//! `stage_boost(stage)`, the agent's `frequency_modifier`, and a flat tuning
//! boost. The stacking structure is load-bearing; the constants are not, and
//! live entirely in [`EventConfig`].

use crate::actor::{find_standable_near, ActorRoster};
use crate::config::{AppConfig, EventConfig};
use crate::ports::{ActorFactory, AgentView, PresentationChannel, StructurePlacer, WorldQuery};
use crate::rng::weighted_index;
use crate::stage::stage_table;
use crate::structures::{self, ChunkLedger, Placement};
use nocturne_data::{EventKind, ScreenEffectKind, SoundKind};
use rand::Rng;

const WHISPERS: &[&str] = &[
    "...behind you...",
    "...it knows your name...",
    "...don't look up...",
    "...keep walking...",
    "...it remembers...",
];

/// Per-roll trigger probability for an agent.
#[must_use]
pub fn trigger_probability(cfg: &EventConfig, stage: u8, modifier: f32) -> f32 {
    let boost = cfg
        .stage_boost
        .get(stage as usize)
        .copied()
        .unwrap_or_else(|| cfg.stage_boost[cfg.stage_boost.len() - 1]);
    (cfg.base_frequency * boost * modifier * cfg.tuning_boost).clamp(0.0, 1.0)
}

/// Weighted random selection over a stage's event table.
///
/// An out-of-range stage index (corrupted persisted state) degrades to a
/// logged no-op rather than a crash.
pub fn select_variant<R: Rng>(stage: u8, rng: &mut R) -> Option<EventKind> {
    let Some(table) = stage_table(stage) else {
        tracing::warn!(stage = stage, "Out-of-range stage during dispatch, skipping");
        return None;
    };
    let weights: Vec<u32> = table.iter().map(|(w, _)| *w).collect();
    weighted_index(rng, &weights).map(|i| table[i].1)
}

/// Agents within the synchronization radius of the trigger, trigger included.
#[must_use]
pub fn eligible_receivers(agents: &[AgentView], trigger: AgentView, radius: f64) -> Vec<AgentView> {
    agents
        .iter()
        .filter(|a| a.id == trigger.id || a.pos.dist(&trigger.pos) <= radius)
        .copied()
        .collect()
}

/// Mutable engine state one event execution may touch.
pub struct ExecuteCtx<'a, W, F, P, S, R>
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    S: StructurePlacer,
    R: Rng,
{
    pub world: &'a W,
    pub factory: &'a mut F,
    pub fx: &'a mut P,
    pub placer: &'a mut S,
    pub roster: &'a mut ActorRoster,
    pub ledger: &'a mut ChunkLedger,
    pub cfg: &'a AppConfig,
    pub rng: &'a mut R,
    pub tick: u64,
}

/// Executes one event variant for one agent.
///
/// Every variant performs one externally observable action (or a fixed
/// combination, like a sound plus an effect). Spawn
/// variants that find no valid location are a silent no-op for this tick.
/// Errors are returned for the dispatch boundary to log; they never escape
/// the tick.
pub fn execute<W, F, P, S, R>(
    event: EventKind,
    agent: AgentView,
    ctx: &mut ExecuteCtx<'_, W, F, P, S, R>,
) -> anyhow::Result<Option<Placement>>
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    S: StructurePlacer,
    R: Rng,
{
    match event {
        EventKind::DistantGrowl => {
            let pos = random_offset(ctx.rng, agent.pos, 15.0, 30.0);
            let pitch = ctx.rng.gen_range(0.6..0.9);
            ctx.fx.sound(agent.id, SoundKind::CaveGrowl, 1.0, pitch, Some(pos));
        }
        EventKind::FootstepsBehind => {
            let pos = random_offset(ctx.rng, agent.pos, 2.0, 4.0);
            ctx.fx.sound(agent.id, SoundKind::Footsteps, 0.9, 1.0, Some(pos));
        }
        EventKind::WhisperedName => {
            let text = WHISPERS[ctx.rng.gen_range(0..WHISPERS.len())];
            ctx.fx.message(agent.id, text);
        }
        EventKind::ScreenStatic => {
            let intensity = ctx.rng.gen_range(0.4..0.9);
            let duration = ctx.rng.gen_range(40..100);
            ctx.fx
                .screen_effect(agent.id, ScreenEffectKind::Distortion, intensity, duration);
            ctx.fx
                .sound(agent.id, SoundKind::StaticHiss, intensity, 1.0, None);
        }
        EventKind::FogClamp => {
            let chunks = ctx.rng.gen_range(2..=4);
            let duration = ctx.rng.gen_range(200..400);
            ctx.fx.render_distance_hint(agent.id, chunks, duration);
        }
        EventKind::Heartbeat => {
            ctx.fx.sound(agent.id, SoundKind::Heartbeat, 1.0, 1.0, None);
            ctx.fx
                .screen_effect(agent.id, ScreenEffectKind::Vignette, 0.5, 60);
        }
        EventKind::PortalFragment => {
            return Ok(structures::place_fragment(
                &ctx.cfg.structures,
                agent,
                ctx.world,
                ctx.placer,
                ctx.ledger,
                ctx.rng,
                ctx.tick,
            ));
        }
        spawn => {
            // All remaining variants are actor spawns.
            let Some(kind) = spawn.spawn_kind() else {
                return Err(crate::error::EngineError::InvalidState(format!(
                    "variant '{}' has no executable action",
                    spawn.label()
                ))
                .into());
            };
            let Some(pos) = find_standable_near(
                ctx.world,
                ctx.rng,
                agent.pos,
                16.0,
                40.0,
                ctx.cfg.actors.spawn_candidates,
            ) else {
                tracing::debug!(
                    kind = kind.label(),
                    "No valid spawn location this tick, skipping"
                );
                return Ok(None);
            };
            ctx.roster
                .spawn(kind, pos, ctx.factory, ctx.cfg.sim.max_actors);
        }
    }
    Ok(None)
}

fn random_offset<R: Rng>(
    rng: &mut R,
    origin: nocturne_data::BlockPos,
    min: f64,
    max: f64,
) -> nocturne_data::BlockPos {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    let radius = rng.gen_range(min..=max);
    origin.offset(
        (angle.cos() * radius).round() as i32,
        0,
        (angle.sin() * radius).round() as i32,
    )
}
