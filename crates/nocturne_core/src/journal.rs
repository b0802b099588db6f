//! JSONL journal of externally observable engine events.

use nocturne_data::{ActorKind, AgentId, BlockPos, EventKind, StructureId, StructureTier};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};

/// One journal line. Timestamps are RFC3339 wall-clock; all gameplay logic
/// runs on ticks.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event")]
pub enum EngineEvent {
    StageAdvance {
        agent: AgentId,
        stage: u8,
        tick: u64,
        timestamp: String,
    },
    StageReset {
        agent: AgentId,
        tick: u64,
        timestamp: String,
    },
    EventDispatched {
        agent: AgentId,
        variant: EventKind,
        synced: bool,
        tick: u64,
        timestamp: String,
    },
    ActorSpawned {
        kind: ActorKind,
        pos: BlockPos,
        tick: u64,
        timestamp: String,
    },
    ActorRemoved {
        kind: ActorKind,
        cause: String,
        tick: u64,
        timestamp: String,
    },
    ActorTransformed {
        from: ActorKind,
        to: ActorKind,
        tick: u64,
        timestamp: String,
    },
    StructurePlaced {
        id: StructureId,
        tier: StructureTier,
        pos: BlockPos,
        tick: u64,
        timestamp: String,
    },
}

/// Append-only JSONL writer. `new_dummy` gives a no-op logger for tests and
/// embedded hosts that journal elsewhere.
pub struct JournalLogger {
    file: Option<BufWriter<File>>,
}

impl JournalLogger {
    pub fn new_at(dir: &str) -> anyhow::Result<Self> {
        if !std::path::Path::new(dir).exists() {
            std::fs::create_dir_all(dir)?;
        }
        let path = format!("{dir}/engine.jsonl");
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Some(BufWriter::new(file)),
        })
    }

    #[must_use]
    pub fn new_dummy() -> Self {
        Self { file: None }
    }

    pub fn log(&mut self, event: &EngineEvent) -> anyhow::Result<()> {
        if let Some(ref mut file) = self.file {
            let json = serde_json::to_string(event)?;
            writeln!(file, "{json}")?;
            file.flush()?;
        }
        Ok(())
    }
}
