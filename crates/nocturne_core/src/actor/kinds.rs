//! Static behavior profiles per actor kind.
//!
//! Cooldown bands are inclusive `(min, max)` tick ranges indexed by phase;
//! firing an action resets its counter to a draw within the band, so cadence
//! shortens as phases escalate.

use nocturne_data::ActorKind;

/// What an actor does while it holds a valid target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagedBehavior {
    /// Close distance and attack; teleports to catch up.
    Pursue,
    /// Follow at a fixed trailing distance, silently.
    Shadow,
    /// Circle the target at range.
    Orbit,
    /// Tunnel toward the target, breaking blocks on a cooldown.
    Dig,
    /// Keep distance and despawn once far enough away.
    Flee,
    /// Hold position and watch; reposition occasionally; flee when approached.
    StalkThenFlee,
}

pub struct KindProfile {
    pub behavior: EngagedBehavior,
    /// Radius within which `Seeking` acquires a target.
    pub detection_radius: f64,
    /// Ticks a lost target is tolerated before `Expiring`.
    pub grace_window: u32,
    /// Hard lifetime budget in ticks.
    pub lifetime: i64,
    pub health: f32,
    /// Whether health-fraction phase escalation applies.
    pub combat: bool,
    pub attack_range: f64,
    /// Attack cooldown bands per phase (calm/aggressive/hunting).
    pub attack_bands: [(u32, u32); 3],
    /// Teleport cooldown bands per phase.
    pub teleport_bands: [(u32, u32); 3],
    /// Block-break cooldown band, for digging kinds.
    pub block_break_band: Option<(u32, u32)>,
    /// Distance at which the proximity reaction triggers; 0 disables it.
    pub proximity_threshold: f64,
    /// Whether crossing the proximity threshold discards the actor with a
    /// weighted outcome (silent / damage-then-vanish / rare transform).
    pub vanish_on_proximity: bool,
    /// 1-in-N transform roll per qualifying tick inside the proximity
    /// threshold; 0 disables the roll.
    pub transform_chance: u32,
    /// Replacement kind for proximity or rare-vanish transforms.
    pub transform_into: Option<ActorKind>,
    /// Replacement kind when health drops to the escalation threshold.
    pub escalation_transform: Option<ActorKind>,
    /// Blocks covered per tick while stepping.
    pub move_speed: f64,
}

const STALKER: KindProfile = KindProfile {
    behavior: EngagedBehavior::StalkThenFlee,
    detection_radius: 64.0,
    grace_window: 200,
    lifetime: 6_000,
    health: 30.0,
    combat: true,
    attack_range: 0.0,
    attack_bands: [(0, 0), (0, 0), (0, 0)],
    teleport_bands: [(120, 200), (80, 140), (40, 80)],
    block_break_band: None,
    proximity_threshold: 8.0,
    vanish_on_proximity: true,
    transform_chance: 0,
    transform_into: Some(ActorKind::Chaser),
    escalation_transform: Some(ActorKind::Chaser),
    move_speed: 0.6,
};

const SHADE: KindProfile = KindProfile {
    behavior: EngagedBehavior::Shadow,
    detection_radius: 48.0,
    grace_window: 300,
    lifetime: 5_000,
    health: 20.0,
    combat: false,
    attack_range: 0.0,
    attack_bands: [(0, 0), (0, 0), (0, 0)],
    teleport_bands: [(100, 160), (100, 160), (100, 160)],
    block_break_band: None,
    proximity_threshold: 6.0,
    vanish_on_proximity: false,
    transform_chance: 400,
    transform_into: Some(ActorKind::Chaser),
    escalation_transform: None,
    move_speed: 0.5,
};

const CHASER: KindProfile = KindProfile {
    behavior: EngagedBehavior::Pursue,
    detection_radius: 96.0,
    grace_window: 300,
    lifetime: 4_000,
    health: 60.0,
    combat: true,
    attack_range: 3.0,
    attack_bands: [(60, 90), (40, 60), (20, 35)],
    teleport_bands: [(160, 240), (100, 160), (50, 90)],
    block_break_band: None,
    proximity_threshold: 0.0,
    vanish_on_proximity: false,
    transform_chance: 0,
    transform_into: None,
    escalation_transform: None,
    move_speed: 1.1,
};

const WATCHER: KindProfile = KindProfile {
    behavior: EngagedBehavior::Orbit,
    detection_radius: 80.0,
    grace_window: 240,
    lifetime: 3_000,
    health: 15.0,
    combat: false,
    attack_range: 0.0,
    attack_bands: [(0, 0), (0, 0), (0, 0)],
    teleport_bands: [(140, 220), (140, 220), (140, 220)],
    block_break_band: None,
    proximity_threshold: 12.0,
    vanish_on_proximity: true,
    transform_chance: 0,
    transform_into: Some(ActorKind::Stalker),
    escalation_transform: None,
    move_speed: 0.4,
};

const EXCAVATOR: KindProfile = KindProfile {
    behavior: EngagedBehavior::Dig,
    detection_radius: 48.0,
    grace_window: 400,
    lifetime: 5_000,
    health: 25.0,
    combat: false,
    attack_range: 0.0,
    attack_bands: [(0, 0), (0, 0), (0, 0)],
    teleport_bands: [(0, 0), (0, 0), (0, 0)],
    block_break_band: Some((40, 80)),
    proximity_threshold: 4.0,
    vanish_on_proximity: true,
    transform_chance: 0,
    transform_into: None,
    escalation_transform: None,
    move_speed: 0.3,
};

const FLEER: KindProfile = KindProfile {
    behavior: EngagedBehavior::Flee,
    detection_radius: 128.0,
    grace_window: 100,
    lifetime: 600,
    health: 10.0,
    combat: false,
    attack_range: 0.0,
    attack_bands: [(0, 0), (0, 0), (0, 0)],
    teleport_bands: [(0, 0), (0, 0), (0, 0)],
    block_break_band: None,
    proximity_threshold: 24.0,
    vanish_on_proximity: true,
    transform_chance: 0,
    transform_into: None,
    escalation_transform: None,
    move_speed: 1.4,
};

/// Behavior profile for a kind.
#[must_use]
pub fn profile(kind: ActorKind) -> &'static KindProfile {
    match kind {
        ActorKind::Stalker => &STALKER,
        ActorKind::Shade => &SHADE,
        ActorKind::Chaser => &CHASER,
        ActorKind::Watcher => &WATCHER,
        ActorKind::Excavator => &EXCAVATOR,
        ActorKind::Fleer => &FLEER,
    }
}
