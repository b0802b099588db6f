//! Actor behavioral state machines.
//!
//! Each [`ActorInstance`] is a small finite-state machine ticked once per
//! simulation step while alive: `Idle -> Seeking -> Engaged`, terminating in
//! `Expiring`, a transformation into another kind, or an external kill.
//! Movement commits only to positions that pass the standable predicate, and
//! every randomized search is bounded; exhaustion is a silent no-op for that
//! tick.

pub mod kinds;

pub use kinds::{profile, EngagedBehavior, KindProfile};

use crate::config::ActorConfig;
use crate::ports::{agent_pos, ActorFactory, AgentView, PresentationChannel, WorldQuery};
use crate::rng::{in_band, weighted_index};
use nocturne_data::{
    ActorId, ActorInstance, ActorKind, ActorState, BlockPos, Phase, ScreenEffectKind, SoundKind,
};
use rand::Rng;

/// Why an actor left the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    Expired,
    Vanished,
    Killed,
    Transformed,
}

impl RemovalCause {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            RemovalCause::Expired => "expired",
            RemovalCause::Vanished => "vanished",
            RemovalCause::Killed => "killed",
            RemovalCause::Transformed => "transformed",
        }
    }
}

/// Observable roster change produced by one tick, for journaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorChange {
    Removed { kind: ActorKind, cause: RemovalCause },
    Transformed { from: ActorKind, to: ActorKind },
}

/// Everything one actor tick needs from the outside.
pub struct ActorTickCtx<'a, W, F, P, R>
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    pub world: &'a W,
    pub factory: &'a mut F,
    pub fx: &'a mut P,
    pub agents: &'a [AgentView],
    pub cfg: &'a ActorConfig,
    pub rng: &'a mut R,
}

enum Verdict {
    Alive,
    Remove(RemovalCause),
    Transform(ActorKind),
}

/// Owns all live actor instances.
#[derive(Default)]
pub struct ActorRoster {
    actors: Vec<ActorInstance>,
}

impl ActorRoster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &ActorInstance> {
        self.actors.iter()
    }

    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&ActorInstance> {
        self.actors.iter().find(|a| a.id == id)
    }

    /// Spawns an actor through the factory, respecting the global cap.
    ///
    /// Factory refusal is recoverable: it is logged and treated as a no-op.
    pub fn spawn<F: ActorFactory>(
        &mut self,
        kind: ActorKind,
        pos: BlockPos,
        factory: &mut F,
        max_actors: usize,
    ) -> Option<ActorId> {
        if self.actors.len() >= max_actors {
            tracing::debug!(kind = kind.label(), "Actor cap reached, spawn skipped");
            return None;
        }
        match factory.spawn(kind, pos) {
            Ok(id) => {
                let prof = profile(kind);
                self.actors
                    .push(ActorInstance::new(id, kind, pos, prof.lifetime, prof.health));
                Some(id)
            }
            Err(e) => {
                tracing::warn!(kind = kind.label(), error = %e, "Actor factory refused creation");
                None
            }
        }
    }

    /// Externally triggered kill; removes the instance immediately.
    pub fn kill<F: ActorFactory>(&mut self, id: ActorId, factory: &mut F) -> Option<ActorChange> {
        let idx = self.actors.iter().position(|a| a.id == id)?;
        let actor = self.actors.remove(idx);
        factory.discard(actor.id);
        Some(ActorChange::Removed {
            kind: actor.kind,
            cause: RemovalCause::Killed,
        })
    }

    /// Applies external damage (combat is resolved by the host world).
    pub fn apply_damage(&mut self, id: ActorId, amount: f32) {
        if let Some(actor) = self.actors.iter_mut().find(|a| a.id == id) {
            actor.health = (actor.health - amount).max(0.0);
        }
    }

    /// Ticks every live actor once and applies removals and transformations.
    pub fn tick_all<W, F, P, R>(
        &mut self,
        ctx: &mut ActorTickCtx<'_, W, F, P, R>,
        max_actors: usize,
    ) -> Vec<ActorChange>
    where
        W: WorldQuery,
        F: ActorFactory,
        P: PresentationChannel,
        R: Rng,
    {
        let mut changes = Vec::new();
        let mut idx = 0;
        while idx < self.actors.len() {
            let verdict = tick_actor(&mut self.actors[idx], ctx);
            match verdict {
                Verdict::Alive => idx += 1,
                Verdict::Remove(cause) => {
                    let actor = self.actors.remove(idx);
                    ctx.factory.discard(actor.id);
                    changes.push(ActorChange::Removed {
                        kind: actor.kind,
                        cause,
                    });
                }
                Verdict::Transform(to) => {
                    let actor = self.actors.remove(idx);
                    ctx.factory.discard(actor.id);
                    changes.push(ActorChange::Transformed {
                        from: actor.kind,
                        to,
                    });
                    // Replacement appears at the same position; factory
                    // refusal leaves the old actor removed regardless.
                    self.spawn(to, actor.pos, ctx.factory, max_actors);
                }
            }
        }
        changes
    }
}

fn tick_actor<W, F, P, R>(
    actor: &mut ActorInstance,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) -> Verdict
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    actor.cooldowns.tick_down();
    actor.lifetime_budget -= 1;

    if actor.health <= 0.0 {
        return Verdict::Remove(RemovalCause::Killed);
    }
    if actor.lifetime_budget <= 0 {
        return Verdict::Remove(RemovalCause::Expired);
    }

    let prof = profile(actor.kind);
    match actor.state {
        ActorState::Idle => {
            actor.state = if actor.target.is_some() {
                ActorState::Engaged
            } else {
                ActorState::Seeking
            };
            Verdict::Alive
        }
        ActorState::Seeking => {
            if let Some(agent) = ctx.world.nearest_agent(actor.pos, prof.detection_radius) {
                actor.target = Some(agent);
                actor.no_target_ticks = 0;
                actor.state = ActorState::Engaged;
            }
            Verdict::Alive
        }
        ActorState::Engaged => tick_engaged(actor, prof, ctx),
        ActorState::Transforming(to) => Verdict::Transform(to),
        ActorState::Expiring => {
            actor.expire_ticks = actor.expire_ticks.saturating_sub(1);
            if actor.expire_ticks == 0 {
                Verdict::Remove(RemovalCause::Expired)
            } else {
                Verdict::Alive
            }
        }
    }
}

fn tick_engaged<W, F, P, R>(
    actor: &mut ActorInstance,
    prof: &KindProfile,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) -> Verdict
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    let target_pos = actor.target.and_then(|t| agent_pos(ctx.agents, t));
    let Some(tp) = target_pos else {
        actor.no_target_ticks += 1;
        if actor.no_target_ticks > prof.grace_window {
            actor.state = ActorState::Expiring;
            actor.expire_ticks = ctx.cfg.expire_ticks.max(1);
        }
        return Verdict::Alive;
    };
    actor.no_target_ticks = 0;
    let dist = actor.pos.dist(&tp);

    // Proximity reaction: weighted discard outcome.
    if prof.vanish_on_proximity && prof.proximity_threshold > 0.0 && dist <= prof.proximity_threshold
    {
        return proximity_outcome(actor, prof, ctx);
    }

    // Proximity-gated transformation roll.
    if let (Some(to), true) = (prof.transform_into, prof.transform_chance > 0) {
        if dist <= prof.proximity_threshold && ctx.rng.gen_range(0..prof.transform_chance) == 0 {
            actor.state = ActorState::Transforming(to);
            return Verdict::Alive;
        }
    }

    if prof.combat {
        escalate_phases(actor, ctx);
        if let Some(to) = prof.escalation_transform {
            if actor.health_fraction() <= 0.3 {
                actor.state = ActorState::Transforming(to);
                return Verdict::Alive;
            }
        }
    }

    match prof.behavior {
        EngagedBehavior::Pursue => pursue(actor, prof, tp, dist, ctx),
        EngagedBehavior::Shadow => shadow(actor, prof, tp, dist, ctx),
        EngagedBehavior::Orbit => orbit(actor, prof, tp, dist, ctx),
        EngagedBehavior::Dig => dig(actor, prof, tp, ctx),
        EngagedBehavior::Flee => flee(actor, prof, tp, dist, ctx),
        EngagedBehavior::StalkThenFlee => stalk(actor, prof, tp, dist, ctx),
    }
}

/// Weighted proximity outcome: majority silent discard, minority brief
/// damage-then-discard, rare transformation at the same spot.
fn proximity_outcome<W, F, P, R>(
    actor: &mut ActorInstance,
    prof: &KindProfile,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) -> Verdict
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    let outcome = weighted_index(ctx.rng, &[70, 25, 5]).unwrap_or(0);
    match (outcome, prof.transform_into) {
        (2, Some(to)) => {
            actor.state = ActorState::Transforming(to);
            Verdict::Alive
        }
        (1, _) => {
            if let Some(target) = actor.target {
                ctx.fx
                    .screen_effect(target, ScreenEffectKind::Flicker, 0.6, 20);
                ctx.fx
                    .sound(target, SoundKind::CaveGrowl, 1.0, 1.2, Some(actor.pos));
            }
            Verdict::Remove(RemovalCause::Vanished)
        }
        _ => Verdict::Remove(RemovalCause::Vanished),
    }
}

/// One-time phase escalations at health fractions ≤60% and ≤30%.
fn escalate_phases<W, F, P, R>(actor: &mut ActorInstance, ctx: &mut ActorTickCtx<'_, W, F, P, R>)
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    let hf = actor.health_fraction();
    if hf <= 0.3 && !actor.escalated_hunting {
        actor.escalated_hunting = true;
        actor.escalated_aggressive = true;
        actor.phase = Phase::Hunting;
        if let Some(target) = actor.target {
            ctx.fx
                .sound(target, SoundKind::DistantScream, 1.0, 0.7, Some(actor.pos));
            ctx.fx
                .screen_effect(target, ScreenEffectKind::Vignette, 0.9, 60);
        }
    } else if hf <= 0.6 && !actor.escalated_aggressive {
        actor.escalated_aggressive = true;
        actor.phase = Phase::Aggressive;
        if let Some(target) = actor.target {
            ctx.fx
                .sound(target, SoundKind::CaveGrowl, 1.0, 0.9, Some(actor.pos));
        }
    }
}

fn pursue<W, F, P, R>(
    actor: &mut ActorInstance,
    prof: &KindProfile,
    tp: BlockPos,
    dist: f64,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) -> Verdict
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    let phase = actor.phase.index();
    if dist <= prof.attack_range {
        if actor.cooldowns.attack == 0 {
            if let Some(target) = actor.target {
                ctx.fx
                    .sound(target, SoundKind::CaveGrowl, 1.0, 1.4, Some(actor.pos));
            }
            actor.cooldowns.attack = in_band(ctx.rng, prof.attack_bands[phase]);
        }
        return Verdict::Alive;
    }
    // Far behind: teleport to catch up, otherwise step.
    if dist > 24.0 && actor.cooldowns.teleport == 0 {
        if let Some(dest) =
            find_standable_near(ctx.world, ctx.rng, tp, 4.0, 12.0, ctx.cfg.teleport_candidates)
        {
            actor.pos = dest;
            actor.cooldowns.teleport = in_band(ctx.rng, prof.teleport_bands[phase]);
            return Verdict::Alive;
        }
    }
    step_toward(actor, tp, prof.move_speed, ctx);
    Verdict::Alive
}

fn shadow<W, F, P, R>(
    actor: &mut ActorInstance,
    prof: &KindProfile,
    tp: BlockPos,
    dist: f64,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) -> Verdict
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    if dist > 12.0 {
        if actor.cooldowns.teleport == 0 {
            if let Some(dest) =
                find_standable_near(ctx.world, ctx.rng, tp, 8.0, 12.0, ctx.cfg.teleport_candidates)
            {
                actor.pos = dest;
                actor.cooldowns.teleport =
                    in_band(ctx.rng, prof.teleport_bands[actor.phase.index()]);
                return Verdict::Alive;
            }
        }
        step_toward(actor, tp, prof.move_speed, ctx);
    }
    Verdict::Alive
}

fn orbit<W, F, P, R>(
    actor: &mut ActorInstance,
    prof: &KindProfile,
    tp: BlockPos,
    dist: f64,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) -> Verdict
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    // Hold a ring around the target; drift correction before tangent motion.
    if dist < 16.0 {
        step_away(actor, tp, prof.move_speed, ctx);
    } else if dist > 28.0 {
        step_toward(actor, tp, prof.move_speed, ctx);
    } else if ctx.rng.gen::<f64>() < prof.move_speed {
        let dx = actor.pos.x - tp.x;
        let dz = actor.pos.z - tp.z;
        // Clockwise tangent.
        let candidate = actor.pos.offset(dz.signum(), 0, -dx.signum());
        commit_step(actor, candidate, ctx.world);
    }
    Verdict::Alive
}

fn dig<W, F, P, R>(
    actor: &mut ActorInstance,
    prof: &KindProfile,
    tp: BlockPos,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) -> Verdict
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    if actor.cooldowns.block_break == 0 {
        if let Some(band) = prof.block_break_band {
            // A dig advances one block regardless of solidity; the mining
            // noise is the observable effect.
            let step = BlockPos::new(
                (tp.x - actor.pos.x).signum(),
                (tp.y - actor.pos.y).signum(),
                (tp.z - actor.pos.z).signum(),
            );
            actor.pos = actor.pos.offset(step.x, step.y, step.z);
            if let Some(target) = actor.target {
                ctx.fx
                    .sound(target, SoundKind::StoneMined, 0.8, 1.0, Some(actor.pos));
            }
            actor.cooldowns.block_break = in_band(ctx.rng, band);
        }
    }
    Verdict::Alive
}

fn flee<W, F, P, R>(
    actor: &mut ActorInstance,
    prof: &KindProfile,
    tp: BlockPos,
    dist: f64,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) -> Verdict
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    if dist > prof.detection_radius * 1.5 {
        return Verdict::Remove(RemovalCause::Vanished);
    }
    step_away(actor, tp, prof.move_speed, ctx);
    Verdict::Alive
}

fn stalk<W, F, P, R>(
    actor: &mut ActorInstance,
    prof: &KindProfile,
    tp: BlockPos,
    dist: f64,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) -> Verdict
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    if dist < 16.0 {
        step_away(actor, tp, prof.move_speed, ctx);
        return Verdict::Alive;
    }
    // Reposition to a new vantage point on the teleport cadence.
    if actor.cooldowns.teleport == 0 {
        if let Some(dest) =
            find_standable_near(ctx.world, ctx.rng, tp, 20.0, 40.0, ctx.cfg.teleport_candidates)
        {
            actor.pos = dest;
            actor.cooldowns.teleport = in_band(ctx.rng, prof.teleport_bands[actor.phase.index()]);
        }
    }
    Verdict::Alive
}

/// Solid support below, clear space at and above the candidate point.
pub fn standable<W: WorldQuery>(world: &W, pos: BlockPos) -> bool {
    world.is_solid(pos.offset(0, -1, 0)) && world.is_air(pos) && world.is_air(pos.offset(0, 1, 0))
}

/// Bounded randomized search for a standable point in an annulus around
/// `center`. Returns `None` when every candidate fails; the caller treats
/// that as a silent no-op for this tick.
pub fn find_standable_near<W: WorldQuery, R: Rng>(
    world: &W,
    rng: &mut R,
    center: BlockPos,
    min_radius: f64,
    max_radius: f64,
    tries: u32,
) -> Option<BlockPos> {
    for _ in 0..tries {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let radius = rng.gen_range(min_radius..=max_radius);
        let x = center.x + (angle.cos() * radius).round() as i32;
        let z = center.z + (angle.sin() * radius).round() as i32;
        for dy in [0, 1, -1, 2, -2, 3, -3, 4, -4] {
            let candidate = BlockPos::new(x, center.y + dy, z);
            if standable(world, candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

fn step_toward<W, F, P, R>(
    actor: &mut ActorInstance,
    tp: BlockPos,
    speed: f64,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    let steps = whole_steps(speed, ctx.rng);
    for _ in 0..steps {
        let dx = tp.x - actor.pos.x;
        let dz = tp.z - actor.pos.z;
        let candidate = if dx.abs() >= dz.abs() {
            actor.pos.offset(dx.signum(), 0, 0)
        } else {
            actor.pos.offset(0, 0, dz.signum())
        };
        if !commit_step(actor, candidate, ctx.world) {
            break;
        }
    }
}

fn step_away<W, F, P, R>(
    actor: &mut ActorInstance,
    tp: BlockPos,
    speed: f64,
    ctx: &mut ActorTickCtx<'_, W, F, P, R>,
) where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    R: Rng,
{
    let steps = whole_steps(speed, ctx.rng);
    for _ in 0..steps {
        let dx = actor.pos.x - tp.x;
        let dz = actor.pos.z - tp.z;
        let candidate = if dx.abs() >= dz.abs() {
            actor.pos.offset(if dx >= 0 { 1 } else { -1 }, 0, 0)
        } else {
            actor.pos.offset(0, 0, if dz >= 0 { 1 } else { -1 })
        };
        if !commit_step(actor, candidate, ctx.world) {
            break;
        }
    }
}

/// Fractional speeds move probabilistically on the integer grid.
fn whole_steps<R: Rng>(speed: f64, rng: &mut R) -> i32 {
    let mut steps = speed.floor() as i32;
    if rng.gen::<f64>() < speed.fract() {
        steps += 1;
    }
    steps
}

/// Commits a step if the candidate (or one block up/down) is standable.
fn commit_step<W: WorldQuery>(actor: &mut ActorInstance, candidate: BlockPos, world: &W) -> bool {
    for dy in [0, 1, -1] {
        let p = candidate.offset(0, dy, 0);
        if standable(world, p) {
            actor.pos = p;
            return true;
        }
    }
    false
}
