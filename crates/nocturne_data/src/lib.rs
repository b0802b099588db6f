//! Core data structures for the Nocturne progression engine.
//!
//! This crate holds plain data: identifiers, positions, progression records,
//! actor components, and event/structure descriptors. All engine logic lives
//! in `nocturne_core`; everything here is serializable and free of behavior
//! beyond small constructors and accessors.

pub mod actor;
pub mod event;
pub mod geom;
pub mod ids;
pub mod progress;
pub mod structure;

pub use actor::{ActorInstance, ActorKind, ActorState, Cooldowns, Phase};
pub use event::{EventKind, ScreenEffectKind, SoundKind};
pub use geom::{BlockPos, CellKey};
pub use ids::{ActorId, AgentId};
pub use progress::{AgentProgress, ProgressRecord, MAX_STAGE, PROGRESS_SCHEMA_VERSION};
pub use structure::{ChunkSpawnRecord, StructureId, StructureTier};
