use anyhow::Result;
use clap::Parser;
use nocturne_core::config::AppConfig;
use nocturne_core::journal::JournalLogger;
use nocturne_core::persistence::FileProgressStore;
use nocturne_core::{init_logging, AgentView, Engine, Ports};
use nocturne_data::{AgentId, BlockPos};
use nocturne_lib::sim::{RecordingFactory, RecordingFx, RecordingPlacer, SyntheticWorld};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for the nocturne event engine", long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Ticks to simulate
    #[arg(short, long, default_value_t = 120_000)]
    ticks: u64,

    /// Number of simulated agents
    #[arg(short = 'n', long, default_value_t = 2)]
    agents: usize,

    /// Override the world seed from the config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory for the JSONL journal; omitted disables journaling
    #[arg(long)]
    journal_dir: Option<String>,

    /// Progress save file, loaded at start and written at exit
    #[arg(long, default_value = "nocturne_progress.json")]
    save: String,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut cfg = AppConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        cfg.sim.seed = Some(seed);
    }

    let mut engine = Engine::new(cfg)?;
    if let Some(dir) = &args.journal_dir {
        engine = engine.with_journal(JournalLogger::new_at(dir)?);
    }

    let mut store = FileProgressStore::open(&args.save)?;
    let mut world = SyntheticWorld::rough(64, 3);
    let mut agents: Vec<AgentView> = (0..args.agents)
        .map(|i| {
            let x = i as i32 * 32;
            AgentView {
                id: AgentId::new(),
                pos: BlockPos::new(x, world.ground_at(x, 0), 0),
            }
        })
        .collect();
    for agent in &agents {
        engine.on_agent_join(agent.id, &store);
    }

    // The agent walk is host behavior, so it runs on its own stream and
    // never perturbs the engine's.
    let mut walk = ChaCha8Rng::seed_from_u64(engine.world_seed() ^ 0x9E37_79B9);

    let mut factory = RecordingFactory::default();
    let mut fx = RecordingFx::default();
    let mut placer = RecordingPlacer::default();

    for _ in 0..args.ticks {
        for agent in agents.iter_mut() {
            if walk.gen_bool(0.3) {
                agent.pos.x += walk.gen_range(-1..=1);
                agent.pos.z += walk.gen_range(-1..=1);
                agent.pos.y = world.ground_at(agent.pos.x, agent.pos.z);
            }
        }
        world.agents = agents.clone();
        let mut ports = Ports {
            world: &world,
            factory: &mut factory,
            fx: &mut fx,
            placer: &mut placer,
        };
        engine.on_tick(&agents, &mut ports);
    }

    engine.save_all(&mut store)?;

    let metrics = engine.metrics();
    println!(
        "Simulated {} ticks for {} agents (seed {})",
        engine.current_tick(),
        agents.len(),
        engine.world_seed()
    );
    println!("  event rolls:       {}", metrics.rolls());
    println!("  events dispatched: {}", metrics.dispatches());
    println!("  welcome draws:     {}", metrics.welcome_draws());
    println!("  actors spawned:    {}", metrics.actors_spawned());
    println!("  actors removed:    {}", metrics.actors_removed());
    println!("  structures placed: {}", metrics.structures_placed());
    for agent in &agents {
        let snap = engine.debug_snapshot(agent.id);
        println!(
            "  agent {}: stage {}, {} events in window",
            agent.id.short(),
            snap.stage,
            snap.event_count_window
        );
    }
    Ok(())
}
