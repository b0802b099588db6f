//! The owned engine context object and per-tick pipeline.
//!
//! One [`Engine`] is one independent simulation: it owns the progression
//! map, the actor roster, the placement ledger, and the random stream, and
//! is constructed explicitly rather than living behind a global. Hosts drive
//! it by calling [`Engine::on_tick`] once per simulation step with the
//! current agent roster and a [`Ports`] bundle.
//!
//! Per-tick order, stable across runs: per agent, stage advancement then the
//! periodic event roll; then actor state-machine ticks; then per-agent
//! structure rolls; then the ledger sweep.

use crate::actor::{ActorChange, ActorRoster, ActorTickCtx};
use crate::config::AppConfig;
use crate::dispatch::{self, ExecuteCtx};
use crate::error::EngineError;
use crate::journal::{EngineEvent, JournalLogger};
use crate::metrics::Metrics;
use crate::ports::{
    ActorFactory, AgentView, Clock, PersistenceStore, Ports, PresentationChannel, StructurePlacer,
    SystemClock, WorldQuery,
};
use crate::rng::{derive_seed, with_seeded_rng};
use crate::stage::StageController;
use crate::structures::{self, ChunkLedger, Placement};
use nocturne_data::{ActorId, AgentId, AgentProgress, EventKind, ProgressRecord};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, VecDeque};

/// Introspection view exposed to debug commands.
#[derive(Debug, Clone)]
pub struct DebugSnapshot {
    pub stage: u8,
    /// `(tick, variant)` pairs, oldest first.
    pub recent_events: Vec<(u64, EventKind)>,
    /// Events dispatched to this agent within the configured window.
    pub event_count_window: usize,
}

#[derive(Debug, Clone, Copy)]
struct RecentEvent {
    tick: u64,
    agent: AgentId,
    variant: EventKind,
}

/// Tick-driven progression and procedural-event engine.
pub struct Engine {
    cfg: AppConfig,
    world_seed: u64,
    tick: u64,
    rng: ChaCha8Rng,
    progress: HashMap<AgentId, AgentProgress>,
    roster: ActorRoster,
    ledger: ChunkLedger,
    metrics: Metrics,
    journal: JournalLogger,
    clock: Box<dyn Clock + Send>,
    recent: VecDeque<RecentEvent>,
}

impl Engine {
    pub fn new(cfg: AppConfig) -> anyhow::Result<Self> {
        cfg.validate()?;
        let world_seed = cfg.sim.seed.unwrap_or_else(|| rand::thread_rng().gen());
        Ok(Self {
            cfg,
            world_seed,
            tick: 0,
            rng: ChaCha8Rng::seed_from_u64(world_seed),
            progress: HashMap::new(),
            roster: ActorRoster::new(),
            ledger: ChunkLedger::new(),
            metrics: Metrics::new(),
            journal: JournalLogger::new_dummy(),
            clock: Box::new(SystemClock),
            recent: VecDeque::new(),
        })
    }

    #[must_use]
    pub fn with_journal(mut self, journal: JournalLogger) -> Self {
        self.journal = journal;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn world_seed(&self) -> u64 {
        self.world_seed
    }

    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn roster(&self) -> &ActorRoster {
        &self.roster
    }

    #[must_use]
    pub fn ledger(&self) -> &ChunkLedger {
        &self.ledger
    }

    #[must_use]
    pub fn progress(&self, agent: AgentId) -> Option<&AgentProgress> {
        self.progress.get(&agent)
    }

    /// Sets an agent's frequency modifier, clamped non-negative. Zero
    /// disables that agent's events entirely.
    pub fn set_frequency_modifier(&mut self, agent: AgentId, value: f32) {
        let tick = self.tick;
        self.progress
            .entry(agent)
            .or_insert_with(|| AgentProgress::new(tick))
            .frequency_modifier = value.max(0.0);
    }

    /// Restores persisted progression for a joining agent, or starts fresh.
    pub fn on_agent_join(&mut self, agent: AgentId, store: &impl PersistenceStore) {
        let tick = self.tick;
        let restored = match store.load(agent) {
            Ok(Some(record)) => Some(record.into_progress()),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(agent = %agent.0, error = %e, "Progress load failed, starting fresh");
                None
            }
        };
        self.progress
            .insert(agent, restored.unwrap_or_else(|| AgentProgress::new(tick)));
    }

    /// Persists all progression and drops the leaving agent from the live map.
    pub fn on_agent_leave(
        &mut self,
        agent: AgentId,
        store: &mut impl PersistenceStore,
    ) -> anyhow::Result<()> {
        self.save_all(store)?;
        self.progress.remove(&agent);
        Ok(())
    }

    /// Writes every live progression record to the store.
    pub fn save_all(&self, store: &mut impl PersistenceStore) -> anyhow::Result<()> {
        let records: HashMap<AgentId, ProgressRecord> = self
            .progress
            .iter()
            .map(|(id, p)| (*id, ProgressRecord::from(p)))
            .collect();
        store.save_all(&records)
    }

    /// Drives one simulation step for the given agent roster.
    pub fn on_tick<W, F, P, S>(&mut self, agents: &[AgentView], ports: &mut Ports<'_, W, F, P, S>)
    where
        W: WorldQuery,
        F: ActorFactory,
        P: PresentationChannel,
        S: StructurePlacer,
    {
        self.tick += 1;
        let tick = self.tick;

        for agent in agents {
            // Stage advancement.
            let advanced = {
                let progress = self
                    .progress
                    .entry(agent.id)
                    .or_insert_with(|| AgentProgress::new(tick));
                if StageController::is_ready_to_advance(&self.cfg.stages, progress, tick) {
                    StageController::advance(progress, tick)
                } else {
                    None
                }
            };
            if let Some(new_stage) = advanced {
                self.journal(EngineEvent::StageAdvance {
                    agent: agent.id,
                    stage: new_stage,
                    tick,
                    timestamp: self.clock.timestamp(),
                });
                // Welcome draw from the new stage's table. Runs outside the
                // periodic roll bookkeeping so it never double-counts
                // against the next roll.
                self.metrics.record_welcome_draw();
                let seed = self.rng.gen::<u64>();
                with_seeded_rng(seed, |rng| {
                    if let Some(variant) = dispatch::select_variant(new_stage, rng) {
                        self.execute_event(variant, *agent, false, ports, rng);
                    }
                });
            }

            // Periodic event roll.
            if tick % self.cfg.events.roll_interval_ticks == 0 {
                self.roll_for_agent(*agent, agents, ports);
            }
        }

        // Actor state machines tick once all per-agent rolls are done.
        let len_before = self.roster.len();
        let changes = {
            let mut ctx = ActorTickCtx {
                world: ports.world,
                factory: &mut *ports.factory,
                fx: &mut *ports.fx,
                agents,
                cfg: &self.cfg.actors,
                rng: &mut self.rng,
            };
            self.roster.tick_all(&mut ctx, self.cfg.sim.max_actors)
        };
        // Every change removes one instance; transformations may respawn one
        // (cap permitting), so spawns are counted from the length delta.
        let removed = changes.len();
        let spawned = (self.roster.len() + removed).saturating_sub(len_before);
        for _ in 0..removed {
            self.metrics.record_actor_removed();
        }
        for _ in 0..spawned {
            self.metrics.record_actor_spawned();
        }
        for change in changes {
            self.journal_actor_change(change, tick);
        }

        // Independent structure sampling, decoupled from stage/event state.
        for agent in agents {
            let placement = structures::roll_for_agent(
                &self.cfg.structures,
                *agent,
                ports.world,
                ports.placer,
                &mut self.ledger,
                &mut self.rng,
                tick,
            );
            if let Some(p) = placement {
                self.journal_placement(p, tick);
            }
        }

        if tick % self.cfg.structures.sweep_interval_ticks == 0 {
            self.ledger.sweep();
        }

        self.metrics.record_tick(agents.len(), self.roster.len());
    }

    /// Performs the periodic probability roll for one agent and dispatches
    /// on success. A zero frequency modifier returns before any random draw
    /// so no entropy is consumed.
    fn roll_for_agent<W, F, P, S>(
        &mut self,
        agent: AgentView,
        agents: &[AgentView],
        ports: &mut Ports<'_, W, F, P, S>,
    ) where
        W: WorldQuery,
        F: ActorFactory,
        P: PresentationChannel,
        S: StructurePlacer,
    {
        let (stage, modifier) = match self.progress.get(&agent.id) {
            Some(p) => (p.stage, p.frequency_modifier),
            None => return,
        };
        if modifier <= 0.0 {
            return;
        }
        self.metrics.record_roll();
        let p = dispatch::trigger_probability(&self.cfg.events, stage, modifier);
        if self.rng.gen::<f32>() >= p {
            return;
        }

        if self.cfg.events.sync_enabled && agents.len() > 1 {
            // One shared seed drives both selection and every receiver's
            // execution, so all nearby agents perceive the same event. The
            // receivers' own stages are never touched; the trigger's stage
            // is used for the whole dispatch and their state is restored by
            // construction on every exit path.
            let seed = derive_seed(self.tick, self.world_seed, agent.id.0);
            let Some(variant) = with_seeded_rng(seed, |rng| dispatch::select_variant(stage, rng))
            else {
                return;
            };
            let receivers =
                dispatch::eligible_receivers(agents, agent, self.cfg.events.sync_radius);
            for receiver in receivers {
                with_seeded_rng(seed, |rng| {
                    self.execute_event(variant, receiver, true, ports, rng);
                });
            }
        } else {
            let seed = self.rng.gen::<u64>();
            with_seeded_rng(seed, |rng| {
                if let Some(variant) = dispatch::select_variant(stage, rng) {
                    self.execute_event(variant, agent, false, ports, rng);
                }
            });
        }
    }

    /// Executes one variant for one receiver at the dispatch boundary: any
    /// execution error is logged with context and the tick continues.
    fn execute_event<W, F, P, S, R>(
        &mut self,
        variant: EventKind,
        receiver: AgentView,
        synced: bool,
        ports: &mut Ports<'_, W, F, P, S>,
        rng: &mut R,
    ) where
        W: WorldQuery,
        F: ActorFactory,
        P: PresentationChannel,
        S: StructurePlacer,
        R: Rng,
    {
        let actors_before = self.roster.len();
        let result = dispatch::execute(
            variant,
            receiver,
            &mut ExecuteCtx {
                world: ports.world,
                factory: &mut *ports.factory,
                fx: &mut *ports.fx,
                placer: &mut *ports.placer,
                roster: &mut self.roster,
                ledger: &mut self.ledger,
                cfg: &self.cfg,
                rng,
                tick: self.tick,
            },
        );
        match result {
            Ok(placement) => {
                self.metrics.record_dispatch();
                self.push_recent(receiver.id, variant);
                self.journal(EngineEvent::EventDispatched {
                    agent: receiver.id,
                    variant,
                    synced,
                    tick: self.tick,
                    timestamp: self.clock.timestamp(),
                });
                if self.roster.len() > actors_before {
                    self.metrics.record_actor_spawned();
                    if let Some(spawned) = self.roster.iter().last() {
                        self.journal(EngineEvent::ActorSpawned {
                            kind: spawned.kind,
                            pos: spawned.pos,
                            tick: self.tick,
                            timestamp: self.clock.timestamp(),
                        });
                    }
                }
                if let Some(p) = placement {
                    self.journal_placement(p, self.tick);
                }
            }
            Err(source) => {
                let err = EngineError::DispatchFailure {
                    variant: variant.label(),
                    source,
                };
                tracing::error!(
                    agent = %receiver.id.0,
                    error = %err,
                    "Event execution failed, tick continues"
                );
            }
        }
    }

    /// Forces a stage (clamped to the valid range) and resets the timer.
    pub fn force_stage(&mut self, agent: AgentId, stage: u8) {
        let tick = self.tick;
        let progress = self
            .progress
            .entry(agent)
            .or_insert_with(|| AgentProgress::new(tick));
        StageController::set_stage(progress, stage, tick);
    }

    /// Resets progression to stage zero and default modifier.
    pub fn reset_agent(&mut self, agent: AgentId) {
        let tick = self.tick;
        let progress = self
            .progress
            .entry(agent)
            .or_insert_with(|| AgentProgress::new(tick));
        StageController::reset(progress, tick);
        self.journal(EngineEvent::StageReset {
            agent,
            tick,
            timestamp: self.clock.timestamp(),
        });
    }

    /// Dispatches one immediate event for the agent, bypassing the
    /// probability roll.
    pub fn force_event<W, F, P, S>(&mut self, agent: AgentView, ports: &mut Ports<'_, W, F, P, S>)
    where
        W: WorldQuery,
        F: ActorFactory,
        P: PresentationChannel,
        S: StructurePlacer,
    {
        let stage = self.progress.get(&agent.id).map_or(0, |p| p.stage);
        let seed = self.rng.gen::<u64>();
        with_seeded_rng(seed, |rng| {
            if let Some(variant) = dispatch::select_variant(stage, rng) {
                self.execute_event(variant, agent, false, ports, rng);
            }
        });
    }

    /// Removes an actor on external request.
    pub fn kill_actor<F: ActorFactory>(&mut self, id: ActorId, factory: &mut F) {
        if let Some(change) = self.roster.kill(id, factory) {
            self.metrics.record_actor_removed();
            self.journal_actor_change(change, self.tick);
        }
    }

    /// Applies external damage to an actor (combat resolution is the
    /// host's concern; health drives phase escalation here).
    pub fn damage_actor(&mut self, id: ActorId, amount: f32) {
        self.roster.apply_damage(id, amount);
    }

    #[must_use]
    pub fn debug_snapshot(&self, agent: AgentId) -> DebugSnapshot {
        let stage = self.progress.get(&agent).map_or(0, |p| p.stage);
        let recent_events: Vec<(u64, EventKind)> = self
            .recent
            .iter()
            .filter(|e| e.agent == agent)
            .map(|e| (e.tick, e.variant))
            .collect();
        let window_start = self.tick.saturating_sub(self.cfg.events.recent_window_ticks);
        let event_count_window = recent_events
            .iter()
            .filter(|(tick, _)| *tick >= window_start)
            .count();
        DebugSnapshot {
            stage,
            recent_events,
            event_count_window,
        }
    }

    fn push_recent(&mut self, agent: AgentId, variant: EventKind) {
        self.recent.push_back(RecentEvent {
            tick: self.tick,
            agent,
            variant,
        });
        while self.recent.len() > self.cfg.events.recent_capacity {
            self.recent.pop_front();
        }
    }

    fn journal_actor_change(&mut self, change: ActorChange, tick: u64) {
        match change {
            ActorChange::Removed { kind, cause } => {
                self.journal(EngineEvent::ActorRemoved {
                    kind,
                    cause: cause.label().to_string(),
                    tick,
                    timestamp: self.clock.timestamp(),
                });
            }
            ActorChange::Transformed { from, to } => {
                self.journal(EngineEvent::ActorTransformed {
                    from,
                    to,
                    tick,
                    timestamp: self.clock.timestamp(),
                });
            }
        }
    }

    fn journal_placement(&mut self, p: Placement, tick: u64) {
        self.metrics.record_structure_placed();
        self.journal(EngineEvent::StructurePlaced {
            id: p.id,
            tier: p.tier,
            pos: p.pos,
            tick,
            timestamp: self.clock.timestamp(),
        });
    }

    fn journal(&mut self, event: EngineEvent) {
        if let Err(e) = self.journal.log(&event) {
            tracing::warn!(error = %e, "Journal write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryProgressStore;
    use nocturne_data::MAX_STAGE;

    fn engine() -> Engine {
        let mut cfg = AppConfig::default();
        cfg.sim.seed = Some(7);
        Engine::new(cfg).unwrap()
    }

    #[test]
    fn test_force_stage_clamps() {
        let mut engine = engine();
        let agent = AgentId::from_u128(1);
        engine.force_stage(agent, 99);
        assert_eq!(engine.progress(agent).unwrap().stage, MAX_STAGE);
    }

    #[test]
    fn test_frequency_modifier_clamped_non_negative() {
        let mut engine = engine();
        let agent = AgentId::from_u128(1);
        engine.set_frequency_modifier(agent, -3.0);
        assert_eq!(engine.progress(agent).unwrap().frequency_modifier, 0.0);
    }

    #[test]
    fn test_join_restores_persisted_stage() {
        let agent = AgentId::from_u128(4);
        let mut store = MemoryProgressStore::default();
        {
            let mut engine = engine();
            engine.force_stage(agent, 3);
            engine.on_agent_leave(agent, &mut store).unwrap();
            assert!(engine.progress(agent).is_none());
        }
        let mut engine = engine();
        engine.on_agent_join(agent, &store);
        assert_eq!(engine.progress(agent).unwrap().stage, 3);
    }

    #[test]
    fn test_join_without_record_starts_fresh() {
        let mut engine = engine();
        let agent = AgentId::from_u128(5);
        engine.on_agent_join(agent, &MemoryProgressStore::default());
        let progress = engine.progress(agent).unwrap();
        assert_eq!(progress.stage, 0);
        assert_eq!(progress.frequency_modifier, 1.0);
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn timestamp(&self) -> String {
            "1970-01-01T00:00:00Z".to_string()
        }
    }

    #[test]
    fn test_journal_records_use_injected_clock() {
        let dir = std::env::temp_dir().join(format!("nocturne_engine_{}", std::process::id()));
        let dir = dir.to_string_lossy().to_string();
        let _ = std::fs::remove_file(format!("{dir}/engine.jsonl"));
        let mut engine = engine()
            .with_journal(JournalLogger::new_at(&dir).unwrap())
            .with_clock(Box::new(FixedClock));
        engine.reset_agent(AgentId::from_u128(2));
        let raw = std::fs::read_to_string(format!("{dir}/engine.jsonl")).unwrap();
        assert!(raw.contains("StageReset"));
        assert!(raw.contains("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn test_snapshot_for_unknown_agent_is_empty() {
        let engine = engine();
        let snap = engine.debug_snapshot(AgentId::from_u128(9));
        assert_eq!(snap.stage, 0);
        assert!(snap.recent_events.is_empty());
        assert_eq!(snap.event_count_window, 0);
    }
}
