//! Versioned progress persistence.
//!
//! Records are stored as a gzip-compressed JSON map with a plain-JSON
//! fallback on load. The on-disk schema ([`ProgressRecord`]) is versioned and
//! decoupled from the live representation; an unknown version degrades to
//! defaults with a warning rather than failing the load.

use crate::ports::PersistenceStore;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use nocturne_data::{AgentId, ProgressRecord, PROGRESS_SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
struct ProgressFile {
    records: HashMap<AgentId, ProgressRecord>,
}

/// File-backed [`PersistenceStore`]. The whole map is read at open and kept
/// in memory; `save_all` rewrites the file.
pub struct FileProgressStore {
    path: String,
    cache: HashMap<AgentId, ProgressRecord>,
}

impl FileProgressStore {
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let cache = Self::read_file(path)?;
        Ok(Self {
            path: path.to_string(),
            cache,
        })
    }

    fn read_file(path: &str) -> anyhow::Result<HashMap<AgentId, ProgressRecord>> {
        let path_gz = if path.ends_with(".gz") {
            path.to_string()
        } else {
            format!("{path}.gz")
        };
        let target = if std::path::Path::new(&path_gz).exists() {
            path_gz
        } else if std::path::Path::new(path).exists() {
            path.to_string()
        } else {
            return Ok(HashMap::new());
        };

        let file = File::open(&target)?;
        let mut decoder = GzDecoder::new(file);
        let mut decoded = Vec::new();
        let parsed: ProgressFile = if decoder.read_to_end(&mut decoded).is_ok() {
            serde_json::from_slice(&decoded)?
        } else {
            let raw = std::fs::read_to_string(&target)?;
            serde_json::from_str(&raw)?
        };

        let mut records = HashMap::new();
        for (agent, record) in parsed.records {
            if record.version > PROGRESS_SCHEMA_VERSION {
                tracing::warn!(
                    agent = %agent.0,
                    version = record.version,
                    "Unknown progress schema version, falling back to defaults"
                );
                continue;
            }
            records.insert(agent, record);
        }
        Ok(records)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl PersistenceStore for FileProgressStore {
    fn load(&self, agent: AgentId) -> anyhow::Result<Option<ProgressRecord>> {
        Ok(self.cache.get(&agent).cloned())
    }

    fn save_all(&mut self, records: &HashMap<AgentId, ProgressRecord>) -> anyhow::Result<()> {
        self.cache = records.clone();
        let path_gz = if self.path.ends_with(".gz") {
            self.path.clone()
        } else {
            format!("{}.gz", self.path)
        };
        let file = File::create(path_gz)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        let json = serde_json::to_string(&ProgressFile {
            records: records.clone(),
        })?;
        encoder.write_all(json.as_bytes())?;
        encoder.finish()?;
        Ok(())
    }
}

/// In-memory store for tests and embedded hosts.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    pub records: HashMap<AgentId, ProgressRecord>,
}

impl PersistenceStore for MemoryProgressStore {
    fn load(&self, agent: AgentId) -> anyhow::Result<Option<ProgressRecord>> {
        Ok(self.records.get(&agent).cloned())
    }

    fn save_all(&mut self, records: &HashMap<AgentId, ProgressRecord>) -> anyhow::Result<()> {
        self.records = records.clone();
        Ok(())
    }
}
