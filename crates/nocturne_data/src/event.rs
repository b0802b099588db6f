use crate::actor::ActorKind;
use serde::{Deserialize, Serialize};

/// Sound cue identifiers handed to the presentation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKind {
    CaveGrowl,
    Footsteps,
    StoneMined,
    Heartbeat,
    DistantScream,
    StaticHiss,
}

/// Screen post-processing cue identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenEffectKind {
    Distortion,
    Vignette,
    Flicker,
}

/// The closed set of event variants stages draw from.
///
/// Each variant, when executed, performs exactly one externally observable
/// action: a sound, a visual effect, a message, a spawn, or a fixed
/// combination of those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A growl from somewhere out of sight.
    DistantGrowl,
    /// Footstep sounds placed just behind the agent.
    FootstepsBehind,
    /// A whispered message addressed to the agent.
    WhisperedName,
    /// Brief screen distortion.
    ScreenStatic,
    /// Temporarily clamps the agent's render distance.
    FogClamp,
    /// Heartbeat sound plus a vignette pulse.
    Heartbeat,
    SpawnStalker,
    SpawnShade,
    SpawnChaser,
    SpawnWatcher,
    SpawnExcavator,
    SpawnFleer,
    /// Rare: requests placement of a portal-fragment set piece nearby.
    PortalFragment,
}

impl EventKind {
    /// The actor kind this variant spawns, if it is a spawn variant.
    #[must_use]
    pub fn spawn_kind(&self) -> Option<ActorKind> {
        match self {
            EventKind::SpawnStalker => Some(ActorKind::Stalker),
            EventKind::SpawnShade => Some(ActorKind::Shade),
            EventKind::SpawnChaser => Some(ActorKind::Chaser),
            EventKind::SpawnWatcher => Some(ActorKind::Watcher),
            EventKind::SpawnExcavator => Some(ActorKind::Excavator),
            EventKind::SpawnFleer => Some(ActorKind::Fleer),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::DistantGrowl => "distant_growl",
            EventKind::FootstepsBehind => "footsteps_behind",
            EventKind::WhisperedName => "whispered_name",
            EventKind::ScreenStatic => "screen_static",
            EventKind::FogClamp => "fog_clamp",
            EventKind::Heartbeat => "heartbeat",
            EventKind::SpawnStalker => "spawn_stalker",
            EventKind::SpawnShade => "spawn_shade",
            EventKind::SpawnChaser => "spawn_chaser",
            EventKind::SpawnWatcher => "spawn_watcher",
            EventKind::SpawnExcavator => "spawn_excavator",
            EventKind::SpawnFleer => "spawn_fleer",
            EventKind::PortalFragment => "portal_fragment",
        }
    }
}
