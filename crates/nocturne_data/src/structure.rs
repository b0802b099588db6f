use serde::{Deserialize, Serialize};

/// Opaque identifier of a concrete procedural set piece.
///
/// Each id encapsulates its own multi-block layout on the placement side;
/// the engine only selects ids and rate-limits where they appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructureId(pub u16);

/// Rarity bucket a structure id is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureTier {
    Common,
    Uncommon,
    Rare,
    Mythic,
}

impl StructureTier {
    pub const ALL: [StructureTier; 4] = [
        StructureTier::Common,
        StructureTier::Uncommon,
        StructureTier::Rare,
        StructureTier::Mythic,
    ];

    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            StructureTier::Common => 0,
            StructureTier::Uncommon => 1,
            StructureTier::Rare => 2,
            StructureTier::Mythic => 3,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            StructureTier::Common => "common",
            StructureTier::Uncommon => "uncommon",
            StructureTier::Rare => "rare",
            StructureTier::Mythic => "mythic",
        }
    }
}

/// Per-cell placement ledger entry.
///
/// `count` never exceeds the configured per-cell cap until the record is
/// evicted by the periodic sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSpawnRecord {
    pub count: u32,
    pub last_spawn_tick: u64,
}
