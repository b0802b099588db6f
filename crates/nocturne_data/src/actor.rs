use crate::geom::BlockPos;
use crate::ids::{ActorId, AgentId};
use serde::{Deserialize, Serialize};

/// The closed set of creature kinds the engine can spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Baseline stalker: watches from a distance, repositions, flees when approached.
    Stalker,
    /// Invisible follower that shadows its target.
    Shade,
    /// Aggressive pursuer with attack/teleport cadence and phase escalation.
    Chaser,
    /// Ranged watcher that orbits at distance and vanishes when approached.
    Watcher,
    /// Digger heard through walls; breaks blocks on a cooldown.
    Excavator,
    /// Silhouette glimpsed far away that flees and despawns.
    Fleer,
}

impl ActorKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ActorKind::Stalker => "stalker",
            ActorKind::Shade => "shade",
            ActorKind::Chaser => "chaser",
            ActorKind::Watcher => "watcher",
            ActorKind::Excavator => "excavator",
            ActorKind::Fleer => "fleer",
        }
    }
}

/// Behavioral escalation phase for combat-capable kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Calm,
    Aggressive,
    Hunting,
}

impl Phase {
    /// Index into per-phase cooldown bands.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Phase::Calm => 0,
            Phase::Aggressive => 1,
            Phase::Hunting => 2,
        }
    }
}

/// Generic behavioral state; each kind uses a relevant subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActorState {
    Idle,
    Seeking,
    Engaged,
    /// Terminal this-tick: replaced by a new instance of the given kind.
    Transforming(ActorKind),
    /// Short countdown to removal after target loss or budget exhaustion.
    Expiring,
}

/// Named cooldown counters gating actor actions.
///
/// Counters decrement unconditionally once per tick while above zero; the
/// gated action may only fire at zero and resets its counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldowns {
    pub attack: u32,
    pub teleport: u32,
    pub block_break: u32,
}

impl Cooldowns {
    pub fn tick_down(&mut self) {
        self.attack = self.attack.saturating_sub(1);
        self.teleport = self.teleport.saturating_sub(1);
        self.block_break = self.block_break.saturating_sub(1);
    }
}

/// A spawned creature governed by the actor state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorInstance {
    pub id: ActorId,
    pub kind: ActorKind,
    pub pos: BlockPos,
    pub state: ActorState,
    pub phase: Phase,
    pub cooldowns: Cooldowns,
    /// Weak reference to the current target; absence drives the grace window.
    pub target: Option<AgentId>,
    /// Ticks since the last valid target was observed.
    pub no_target_ticks: u32,
    /// Hard lifetime budget; an instance observed at or below zero is removed.
    pub lifetime_budget: i64,
    /// Countdown used while `Expiring`.
    pub expire_ticks: u32,
    pub health: f32,
    pub max_health: f32,
    /// One-shot escalation latches; each phase transition must not re-fire.
    pub escalated_aggressive: bool,
    pub escalated_hunting: bool,
}

impl ActorInstance {
    #[must_use]
    pub fn new(id: ActorId, kind: ActorKind, pos: BlockPos, lifetime: i64, health: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            state: ActorState::Idle,
            phase: Phase::Calm,
            cooldowns: Cooldowns::default(),
            target: None,
            no_target_ticks: 0,
            lifetime_budget: lifetime,
            expire_ticks: 0,
            health,
            max_health: health,
            escalated_aggressive: false,
            escalated_hunting: false,
        }
    }

    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldowns_saturate_at_zero() {
        let mut cd = Cooldowns {
            attack: 1,
            ..Cooldowns::default()
        };
        cd.tick_down();
        cd.tick_down();
        assert_eq!(cd.attack, 0);
    }

    #[test]
    fn test_health_fraction_guards_zero_max() {
        let mut a = ActorInstance::new(ActorId::new(), ActorKind::Chaser, BlockPos::default(), 100, 20.0);
        assert_eq!(a.health_fraction(), 1.0);
        a.max_health = 0.0;
        assert_eq!(a.health_fraction(), 0.0);
    }
}
