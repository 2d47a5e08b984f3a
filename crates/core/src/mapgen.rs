//! Procedural level generation split into coherent submodules.

pub mod model;
pub mod zones;

mod branches;
mod context;
mod corridor;
mod decor;
mod generator;
mod grid;
mod random;
mod rooms;
mod seed;
mod spawns;

pub use branches::BranchQueue;
pub use corridor::{CorridorStyle, SNAKE_STRIDE};
pub use generator::{ClockEvent, LevelGenerator, Phase, PhaseError};
pub use grid::TileGrid;
pub use model::GeneratedLevel;
pub use random::RandomSource;
pub use rooms::{ROOM_ATTEMPTS, Room, RoomSize};
pub use seed::{SeedChoice, generate_runtime_seed};
pub use spawns::{MAX_SPAWN_FAILURES, RoomThreat};
pub use zones::{EnemyTier, Mode, Zone, ZoneTable};

use crate::config::{ConfigError, GeneratorConfig};
use crate::placer::SlotPlacer;

/// Generates one level into a throwaway in-memory placer.
pub fn generate_level(config: &GeneratorConfig, seed: u64) -> Result<GeneratedLevel, ConfigError> {
    let mut generator = LevelGenerator::new(config.clone(), SlotPlacer::new())?;
    Ok(generator.generate(Some(seed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_level_matches_level_generator_output() {
        let config = GeneratorConfig::default();
        let from_helper = generate_level(&config, 123).expect("default config is valid");
        let from_generator = LevelGenerator::new(config, SlotPlacer::new())
            .expect("default config is valid")
            .generate(Some(123));
        assert_eq!(from_helper, from_generator);
    }
}
