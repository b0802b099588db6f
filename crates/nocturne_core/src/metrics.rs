//! Counter metrics and structured-logging setup.

use std::sync::atomic::{AtomicU64, Ordering};

/// Engine-level counters, logged periodically at info level.
#[derive(Debug, Default)]
pub struct Metrics {
    tick_count: AtomicU64,
    rolls: AtomicU64,
    dispatches: AtomicU64,
    welcome_draws: AtomicU64,
    actors_spawned: AtomicU64,
    actors_removed: AtomicU64,
    structures_placed: AtomicU64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed tick and emits a summary line every 1000 ticks.
    pub fn record_tick(&self, agents: usize, actors: usize) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        if tick % 1000 == 0 {
            tracing::info!(
                tick = tick,
                agents = agents,
                actors = actors,
                dispatches = self.dispatches(),
                structures = self.structures_placed(),
                "Engine tick"
            );
        }
    }

    pub fn record_roll(&self) {
        self.rolls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch(&self) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_welcome_draw(&self) {
        self.welcome_draws.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_actor_spawned(&self) {
        self.actors_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_actor_removed(&self) {
        self.actors_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_structure_placed(&self) {
        self.structures_placed.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn rolls(&self) -> u64 {
        self.rolls.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn dispatches(&self) -> u64 {
        self.dispatches.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn welcome_draws(&self) -> u64 {
        self.welcome_draws.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn actors_spawned(&self) -> u64 {
        self.actors_spawned.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn actors_removed(&self) -> u64 {
        self.actors_removed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn structures_placed(&self) -> u64 {
        self.structures_placed.load(Ordering::Relaxed)
    }
}

/// Initialize tracing subscriber for logging.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}
