//! # Nocturne Core
//!
//! Tick-driven progression and procedural-event engine for a persistent
//! multi-agent sandbox. The engine decides, per agent and per world region,
//! when and what unsettling event occurs, manages the life cycle of the
//! creature actors those events spawn, and rate-limits where procedural set
//! pieces appear.
//!
//! ## Architecture
//!
//! Four components composed in [`engine::Engine::on_tick`]:
//! - **Stage control**: per-agent progression stage with advancement timing
//! - **Event dispatch**: per-stage weighted random selection with frequency
//!   modifiers and multiplayer fan-out under a shared seed
//! - **Actor state machines**: phase transitions, transformation chains,
//!   cooldown-gated actions, and despawn policies
//! - **Structure spawning**: annulus sampling with per-cell density caps
//!
//! The simulation is single-threaded and deterministic under a fixed seed.
//! All world access goes through the injectable traits in [`ports`].

/// Actor behavioral state machines and kind profiles
pub mod actor;
/// Strongly-typed configuration loaded from `config.toml`
pub mod config;
/// Event dispatch: probability rolls, weighted selection, fan-out
pub mod dispatch;
/// The owned engine context object and per-tick pipeline
pub mod engine;
/// Error taxonomy for recoverable engine failures
pub mod error;
/// JSONL journal of externally observable engine events
pub mod journal;
/// Counter metrics and structured-logging setup
pub mod metrics;
/// Versioned progress persistence (gzip JSON)
pub mod persistence;
/// Injectable collaborator traits (world, factory, presentation, placement)
pub mod ports;
/// Deterministic randomness helpers and scoped seeded execution
pub mod rng;
/// Per-agent stage control and the per-stage event tables
pub mod stage;
/// Chunk-capped structure placement sampling
pub mod structures;

pub use engine::{DebugSnapshot, Engine};
pub use error::EngineError;
pub use metrics::{init_logging, Metrics};
pub use ports::{
    ActorFactory, AgentView, Clock, PersistenceStore, Ports, PresentationChannel, StructurePlacer,
    SystemClock, WorldQuery,
};
pub use rng::with_seeded_rng;
