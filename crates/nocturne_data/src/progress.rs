use serde::{Deserialize, Serialize};

/// Highest reachable progression stage; terminal, no further auto-advance.
pub const MAX_STAGE: u8 = 5;

/// Current version of the persisted progress schema.
pub const PROGRESS_SCHEMA_VERSION: u32 = 1;

/// Per-agent progression state, created lazily on first access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProgress {
    /// Severity rank in `[0, MAX_STAGE]`; monotonic except explicit reset.
    pub stage: u8,
    /// Tick at which the stage last advanced (or was reset/forced).
    pub last_advance_tick: u64,
    /// Multiplies event-roll probability; 0 disables events entirely.
    pub frequency_modifier: f32,
}

impl AgentProgress {
    #[must_use]
    pub fn new(now_tick: u64) -> Self {
        Self {
            stage: 0,
            last_advance_tick: now_tick,
            frequency_modifier: 1.0,
        }
    }
}

impl Default for AgentProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Versioned on-disk form of [`AgentProgress`].
///
/// Deliberately decoupled from the live struct: the live representation can
/// change shape without breaking stored data, and unknown versions degrade
/// to defaults on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub version: u32,
    pub stage: u8,
    pub last_advance_tick: u64,
    pub frequency_modifier: f32,
}

impl From<&AgentProgress> for ProgressRecord {
    fn from(p: &AgentProgress) -> Self {
        Self {
            version: PROGRESS_SCHEMA_VERSION,
            stage: p.stage,
            last_advance_tick: p.last_advance_tick,
            frequency_modifier: p.frequency_modifier,
        }
    }
}

impl ProgressRecord {
    /// Restores live state from a record, clamping out-of-range fields.
    #[must_use]
    pub fn into_progress(self) -> AgentProgress {
        AgentProgress {
            stage: self.stage.min(MAX_STAGE),
            last_advance_tick: self.last_advance_tick,
            frequency_modifier: self.frequency_modifier.max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip() {
        let p = AgentProgress {
            stage: 3,
            last_advance_tick: 1200,
            frequency_modifier: 1.5,
        };
        let rec = ProgressRecord::from(&p);
        assert_eq!(rec.version, PROGRESS_SCHEMA_VERSION);
        assert_eq!(rec.into_progress(), p);
    }

    #[test]
    fn test_record_clamps_corrupt_fields() {
        let rec = ProgressRecord {
            version: PROGRESS_SCHEMA_VERSION,
            stage: 99,
            last_advance_tick: 0,
            frequency_modifier: -2.0,
        };
        let p = rec.into_progress();
        assert_eq!(p.stage, MAX_STAGE);
        assert_eq!(p.frequency_modifier, 0.0);
    }
}
