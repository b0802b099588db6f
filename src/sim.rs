//! Synthetic host implementations of the engine ports.
//!
//! A deterministic procedural terrain plus recording stubs for the actor
//! factory, the presentation channel, and the structure placer. The binary
//! drives the engine against these; the integration tests assert on what
//! they recorded.

use nocturne_core::ports::{
    ActorFactory, AgentView, PresentationChannel, StructurePlacer, WorldQuery,
};
use nocturne_data::{
    ActorId, ActorKind, AgentId, BlockPos, ScreenEffectKind, SoundKind, StructureId,
};

/// Deterministic terrain whose ground height varies with a cheap integer
/// hash, so surface searches exercise the vertical scan paths.
pub struct SyntheticWorld {
    pub base_ground: i32,
    pub roughness: i32,
    pub agents: Vec<AgentView>,
}

impl SyntheticWorld {
    #[must_use]
    pub fn flat(ground: i32) -> Self {
        Self {
            base_ground: ground,
            roughness: 0,
            agents: Vec::new(),
        }
    }

    #[must_use]
    pub fn rough(ground: i32, roughness: i32) -> Self {
        Self {
            base_ground: ground,
            roughness,
            agents: Vec::new(),
        }
    }

    /// First air block above solid ground in this column.
    #[must_use]
    pub fn ground_at(&self, x: i32, z: i32) -> i32 {
        if self.roughness <= 0 {
            return self.base_ground;
        }
        let h = (x.wrapping_mul(73_856_093) ^ z.wrapping_mul(19_349_663)) as u32;
        let span = self.roughness as u32 * 2 + 1;
        self.base_ground + (h % span) as i32 - self.roughness
    }
}

impl WorldQuery for SyntheticWorld {
    fn is_solid(&self, pos: BlockPos) -> bool {
        pos.y < self.ground_at(pos.x, pos.z)
    }

    fn is_air(&self, pos: BlockPos) -> bool {
        pos.y >= self.ground_at(pos.x, pos.z)
    }

    fn can_see_sky(&self, _pos: BlockPos) -> bool {
        true
    }

    fn nearest_agent(&self, origin: BlockPos, radius: f64) -> Option<AgentId> {
        self.agents
            .iter()
            .filter(|a| a.pos.dist(&origin) <= radius)
            .min_by(|a, b| {
                a.pos
                    .dist(&origin)
                    .total_cmp(&b.pos.dist(&origin))
            })
            .map(|a| a.id)
    }
}

/// Records spawn and discard requests; can be told to refuse creation.
#[derive(Default)]
pub struct RecordingFactory {
    pub spawned: Vec<(ActorKind, BlockPos)>,
    pub discarded: Vec<ActorId>,
    pub refuse: bool,
}

impl ActorFactory for RecordingFactory {
    fn spawn(&mut self, kind: ActorKind, pos: BlockPos) -> anyhow::Result<ActorId> {
        anyhow::ensure!(!self.refuse, "host refused actor creation");
        self.spawned.push((kind, pos));
        Ok(ActorId::new())
    }

    fn discard(&mut self, id: ActorId) {
        self.discarded.push(id);
    }
}

/// Records every presentation request per agent.
#[derive(Default)]
pub struct RecordingFx {
    pub sounds: Vec<(AgentId, SoundKind)>,
    pub effects: Vec<(AgentId, ScreenEffectKind)>,
    pub messages: Vec<(AgentId, String)>,
    pub hints: Vec<(AgentId, u8)>,
}

impl RecordingFx {
    /// Total observable outputs, across all channels.
    #[must_use]
    pub fn total(&self) -> usize {
        self.sounds.len() + self.effects.len() + self.messages.len() + self.hints.len()
    }
}

impl PresentationChannel for RecordingFx {
    fn screen_effect(
        &mut self,
        agent: AgentId,
        kind: ScreenEffectKind,
        _intensity: f32,
        _duration_ticks: u32,
    ) {
        self.effects.push((agent, kind));
    }

    fn sound(
        &mut self,
        agent: AgentId,
        kind: SoundKind,
        _volume: f32,
        _pitch: f32,
        _pos: Option<BlockPos>,
    ) {
        self.sounds.push((agent, kind));
    }

    fn message(&mut self, agent: AgentId, text: &str) {
        self.messages.push((agent, text.to_string()));
    }

    fn render_distance_hint(&mut self, agent: AgentId, chunks: u8, _duration_ticks: u32) {
        self.hints.push((agent, chunks));
    }
}

/// Records placements; can be told to refuse.
#[derive(Default)]
pub struct RecordingPlacer {
    pub placed: Vec<(StructureId, BlockPos)>,
    pub refuse: bool,
}

impl StructurePlacer for RecordingPlacer {
    fn place(&mut self, id: StructureId, pos: BlockPos) -> bool {
        if self.refuse {
            return false;
        }
        self.placed.push((id, pos));
        true
    }
}
