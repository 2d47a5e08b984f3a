pub mod config;
pub mod mapgen;
pub mod placer;
pub mod schedule;
pub mod types;

pub use config::{ConfigError, GeneratorConfig, Span};
pub use mapgen::{
    ClockEvent, GeneratedLevel, LevelGenerator, Phase, PhaseError, generate_level,
};
pub use placer::{EntityHandle, Placer, SlotPlacer};
pub use schedule::{Scheduler, TaskId};
pub use types::*;
