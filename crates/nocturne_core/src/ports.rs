//! Injectable collaborator traits.
//!
//! The engine core never touches the world, spawns entities, or renders
//! anything directly; everything external goes through these narrow traits,
//! bundled into a [`Ports`] context that is passed per call.

use nocturne_data::{
    ActorId, ActorKind, AgentId, BlockPos, ProgressRecord, ScreenEffectKind, SoundKind,
    StructureId,
};
use std::collections::HashMap;

/// Read-only snapshot of an agent handed to the engine each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentView {
    pub id: AgentId,
    pub pos: BlockPos,
}

/// Narrow read access to world geometry and agent lookup.
pub trait WorldQuery {
    fn is_solid(&self, pos: BlockPos) -> bool;
    fn is_air(&self, pos: BlockPos) -> bool;
    fn can_see_sky(&self, pos: BlockPos) -> bool;
    /// Nearest agent within `radius` of `origin`, if any.
    fn nearest_agent(&self, origin: BlockPos, radius: f64) -> Option<AgentId>;
}

/// Creates and discards the underlying world entities backing actors.
pub trait ActorFactory {
    /// May refuse creation; refusal is recoverable and logged by the caller.
    fn spawn(&mut self, kind: ActorKind, pos: BlockPos) -> anyhow::Result<ActorId>;
    fn discard(&mut self, id: ActorId);
}

/// Fire-and-forget presentation requests.
pub trait PresentationChannel {
    fn screen_effect(
        &mut self,
        agent: AgentId,
        kind: ScreenEffectKind,
        intensity: f32,
        duration_ticks: u32,
    );
    fn sound(
        &mut self,
        agent: AgentId,
        kind: SoundKind,
        volume: f32,
        pitch: f32,
        pos: Option<BlockPos>,
    );
    fn message(&mut self, agent: AgentId, text: &str);
    fn render_distance_hint(&mut self, agent: AgentId, chunks: u8, duration_ticks: u32);
}

/// Executes a concrete structure layout at a position.
///
/// Layouts are opaque leaf actions; returning `false` means the placement
/// was refused and the density record must not be charged.
pub trait StructurePlacer {
    fn place(&mut self, id: StructureId, pos: BlockPos) -> bool;
}

/// Durable storage for progression records across process restarts.
pub trait PersistenceStore {
    fn load(&self, agent: AgentId) -> anyhow::Result<Option<ProgressRecord>>;
    fn save_all(&mut self, records: &HashMap<AgentId, ProgressRecord>) -> anyhow::Result<()>;
}

/// Wall-clock timestamp source for journal records. Gameplay logic measures
/// time exclusively in ticks.
pub trait Clock {
    fn timestamp(&self) -> String;
}

/// Real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&self) -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

/// Per-call bundle of the collaborators one tick needs.
pub struct Ports<'a, W, F, P, S>
where
    W: WorldQuery,
    F: ActorFactory,
    P: PresentationChannel,
    S: StructurePlacer,
{
    pub world: &'a W,
    pub factory: &'a mut F,
    pub fx: &'a mut P,
    pub placer: &'a mut S,
}

/// Position of an agent in this tick's roster, if present.
#[must_use]
pub fn agent_pos(agents: &[AgentView], id: AgentId) -> Option<BlockPos> {
    agents.iter().find(|a| a.id == id).map(|a| a.pos)
}
