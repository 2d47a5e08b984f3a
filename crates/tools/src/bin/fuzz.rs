use std::collections::{BTreeSet, VecDeque};
use std::io;

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use dungeon_core::{
    EntityKind, GeneratedLevel, GeneratorConfig, LevelGenerator, Pos, SlotPlacer, TileState,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Generate many levels and check their invariants", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 500)]
    levels: u32,
    /// Also open the final path on every level
    #[arg(long)]
    boss_defeated: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    println!("Fuzzing {} levels from stream seed {}...", args.levels, args.seed);

    let mut generator = LevelGenerator::new(GeneratorConfig::default(), SlotPlacer::new())
        .context("Default generator config is invalid")?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    for index in 0..args.levels {
        let seed = rng.next_u64();
        let level = generator.generate(Some(seed));
        check_level(&level).with_context(|| format!("level {index} (seed {seed})"))?;

        let replay = generator.generate(Some(seed));
        if replay.canonical_bytes() != level.canonical_bytes() {
            bail!("level {index} (seed {seed}) did not reproduce");
        }

        if args.boss_defeated {
            let opened = generator.on_boss_defeated().context("final path rejected")?;
            check_level(&opened).with_context(|| format!("final path {index} (seed {seed})"))?;
            ensure!(opened.portal.is_some(), "final path {index} (seed {seed}) has no portal");
        }
    }

    info!(levels = args.levels, "fuzzing finished");
    println!("Fuzzing completed successfully.");
    Ok(())
}

fn check_level(level: &GeneratedLevel) -> Result<()> {
    let half = level.half();
    for placement in &level.placements {
        ensure!(
            placement.pos.x.abs() <= half + 1 && placement.pos.y.abs() <= half + 1,
            "{:?} placed out of bounds at {:?}",
            placement.kind,
            placement.pos
        );
    }
    ensure!(level.count_tiles(TileState::Empty) == 0, "walling left empty cells");
    ensure!(level.tile_at(Pos::ORIGIN) == TileState::Floor, "start tile is not floor");

    let floor = level.count_tiles(TileState::Floor);
    let reached = reachable_from_origin(level);
    if reached != floor {
        warn!(reached, floor, seed = level.seed, "disconnected floor");
        bail!("only {reached} of {floor} floor tiles reachable from the start");
    }

    for placement in level.entities() {
        if placement.kind.is_enemy() || matches!(placement.kind, EntityKind::Pickup(_)) {
            ensure!(
                level.tile_at(placement.pos) == TileState::Floor,
                "{:?} stands on {:?}",
                placement.kind,
                level.tile_at(placement.pos)
            );
        }
    }
    Ok(())
}

fn reachable_from_origin(level: &GeneratedLevel) -> usize {
    let mut open = VecDeque::from([Pos::ORIGIN]);
    let mut seen = BTreeSet::from([Pos::ORIGIN]);
    while let Some(pos) = open.pop_front() {
        for next in pos.neighbors() {
            if level.tile_at(next) == TileState::Floor && seen.insert(next) {
                open.push_back(next);
            }
        }
    }
    seen.len()
}
