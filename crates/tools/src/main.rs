use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dungeon_core::{
    DoorKind, EnemyKind, EntityKind, GeneratedLevel, GeneratorConfig, LevelGenerator, PickupKind,
    Placement, Pos, SlotPlacer, TileState,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Generate a dungeon level and print it", long_about = None)]
struct Args {
    /// Seed to generate from. A fresh seed is drawn and logged when omitted
    #[arg(short, long)]
    seed: Option<u64>,
    /// TOML generator configuration. The built-in zone table is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print the level as JSON instead of an ASCII map
    #[arg(long)]
    json: bool,
    /// Open the final path as if the boss had just been defeated
    #[arg(long)]
    boss_defeated: bool,
}

#[derive(Serialize)]
struct JsonLevel<'a> {
    seed: u64,
    size: i32,
    rows: Vec<String>,
    player_start: Pos,
    pan_target: Option<Pos>,
    portal: Option<Pos>,
    entities: Vec<JsonEntity<'a>>,
}

#[derive(Serialize)]
struct JsonEntity<'a> {
    #[serde(flatten)]
    placement: &'a Placement,
    world: (f32, f32),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load generator config: {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    let mut generator =
        LevelGenerator::new(config, SlotPlacer::new()).context("Generator config is invalid")?;
    let mut level = generator.generate(args.seed);
    if args.boss_defeated {
        level = generator.on_boss_defeated().context("Failed to open the final path")?;
        info!(portal = ?level.portal, "final path opened");
    }

    if args.json {
        let rows = render_rows(&level);
        let entities = level
            .entities()
            .map(|placement| JsonEntity { placement, world: placement.world_position(level.tile_scale) })
            .collect();
        let output = JsonLevel {
            seed: level.seed,
            size: level.size,
            rows,
            player_start: level.player_start,
            pan_target: level.pan_target,
            portal: level.portal,
            entities,
        };
        println!("{}", serde_json::to_string_pretty(&output).context("Failed to encode level")?);
    } else {
        println!("seed {}", level.seed);
        for row in render_rows(&level) {
            println!("{row}");
        }
    }

    Ok(())
}

/// North row first, one character per cell.
fn render_rows(level: &GeneratedLevel) -> Vec<String> {
    let half = level.half();
    let mut rows = Vec::with_capacity(level.size as usize);
    for y in (-half..=half).rev() {
        let row: String = (-half..=half)
            .map(|x| {
                let pos = Pos::new(x, y);
                let marker = level
                    .entities()
                    .filter(|placement| placement.pos == pos)
                    .map(|placement| glyph(placement.kind))
                    .max_by_key(|&(priority, _)| priority);
                match marker {
                    Some((_, glyph)) => glyph,
                    None => match level.tile_at(pos) {
                        TileState::Floor => '.',
                        TileState::Wall => '#',
                        TileState::Empty => ' ',
                    },
                }
            })
            .collect();
        rows.push(row);
    }
    rows
}

/// Display character for an entity, with a priority for crowded cells.
fn glyph(kind: EntityKind) -> (u8, char) {
    match kind {
        EntityKind::Player => (9, '@'),
        EntityKind::Enemy(EnemyKind::Boss) => (8, 'B'),
        EntityKind::Portal => (8, 'O'),
        EntityKind::Door(DoorKind::Gold) => (7, 'G'),
        EntityKind::Door(DoorKind::Silver) => (7, 'S'),
        EntityKind::Pickup(PickupKind::GoldKey) => (6, 'g'),
        EntityKind::Pickup(PickupKind::SilverKey) => (6, 's'),
        EntityKind::Enemy(EnemyKind::Ultra) => (5, 'U'),
        EntityKind::Enemy(EnemyKind::Tank) => (5, 'T'),
        EntityKind::Enemy(EnemyKind::Spread) => (5, 'X'),
        EntityKind::Enemy(EnemyKind::Fast) => (5, 'F'),
        EntityKind::Enemy(EnemyKind::Basic) => (5, 'e'),
        EntityKind::Pickup(PickupKind::Heart) => (4, 'h'),
        EntityKind::Pickup(_) => (4, '+'),
        EntityKind::CinematicAnchor | EntityKind::Camera | EntityKind::CameraTarget => (0, '.'),
        EntityKind::Floor => (0, '.'),
        EntityKind::Wall => (0, '#'),
    }
}
