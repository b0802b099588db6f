use nocturne_core::config::AppConfig;
use nocturne_core::journal::JournalLogger;
use nocturne_core::{AgentView, Engine, Ports};
use nocturne_data::{AgentId, BlockPos};
use nocturne_lib::sim::{RecordingFactory, RecordingFx, RecordingPlacer, SyntheticWorld};

/// Engine plus the synthetic host it runs against.
#[allow(dead_code)]
pub struct Rig {
    pub engine: Engine,
    pub world: SyntheticWorld,
    pub factory: RecordingFactory,
    pub fx: RecordingFx,
    pub placer: RecordingPlacer,
    pub agents: Vec<AgentView>,
}

#[allow(dead_code)]
pub struct RigBuilder {
    cfg: AppConfig,
    agents: Vec<AgentView>,
    ground: i32,
    journal_dir: Option<String>,
}

#[allow(dead_code)]
impl RigBuilder {
    pub fn new() -> Self {
        let mut cfg = AppConfig::default();
        cfg.sim.seed = Some(7);
        Self {
            cfg,
            agents: Vec::new(),
            ground: 64,
            journal_dir: None,
        }
    }

    /// Journals engine events to `<dir>/engine.jsonl` for inspection.
    pub fn with_journal_dir(mut self, dir: &str) -> Self {
        self.journal_dir = Some(dir.to_string());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.cfg.sim.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.cfg);
        self
    }

    /// Adds an agent standing on flat ground. Ids are stable small integers
    /// so two rigs built the same way are comparable.
    pub fn with_agent_at(mut self, x: i32, z: i32) -> Self {
        let id = AgentId::from_u128(self.agents.len() as u128 + 1);
        self.agents.push(AgentView {
            id,
            pos: BlockPos::new(x, self.ground, z),
        });
        self
    }

    pub fn build(self) -> Rig {
        let mut engine = Engine::new(self.cfg).expect("config must validate");
        if let Some(dir) = &self.journal_dir {
            let journal = JournalLogger::new_at(dir).expect("journal dir must be writable");
            engine = engine.with_journal(journal);
        }
        let mut world = SyntheticWorld::flat(self.ground);
        world.agents = self.agents.clone();
        Rig {
            engine,
            world,
            factory: RecordingFactory::default(),
            fx: RecordingFx::default(),
            placer: RecordingPlacer::default(),
            agents: self.agents,
        }
    }
}

#[allow(dead_code)]
impl Rig {
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.world.agents = self.agents.clone();
            let mut ports = Ports {
                world: &self.world,
                factory: &mut self.factory,
                fx: &mut self.fx,
                placer: &mut self.placer,
            };
            self.engine.on_tick(&self.agents, &mut ports);
        }
    }

    pub fn agent(&self, idx: usize) -> AgentView {
        self.agents[idx]
    }

    pub fn stage_of(&self, idx: usize) -> u8 {
        self.engine
            .progress(self.agents[idx].id)
            .map_or(0, |p| p.stage)
    }
}
