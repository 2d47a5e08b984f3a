//! Generator configuration: grid constants, size ranges, threat costs and the
//! zone table. Everything is validated once, before any level is generated.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapgen::RoomSize;
use crate::mapgen::zones::{
    CorridorMix, EnemyTier, LengthMix, Mode, PickupMix, RoomSizeMix, ThreatRanges, TierMix, Zone,
    ZoneTable,
};

pub const MIN_GRID_SIZE: i32 = 21;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("zone '{zone}': {field} is {value}%, above 100%")]
    PercentOutOfRange { zone: String, field: &'static str, value: u8 },
    #[error("zone '{zone}': {field} weights sum to {sum}%, above 100%")]
    DistributionOverflow { zone: String, field: &'static str, sum: u32 },
    #[error("{field}: range [{min}, {max}] is inverted or below {floor}")]
    InvalidSpan { field: String, min: i32, max: i32, floor: i32 },
    #[error("{field}: range [{min}, {max}] does not fit a {grid_size}x{grid_size} grid")]
    SpanTooLarge { field: String, min: i32, max: i32, grid_size: i32 },
    #[error("grid size {0} must be odd")]
    EvenGridSize(i32),
    #[error("grid size {0} is below the minimum of {min}", min = MIN_GRID_SIZE)]
    GridTooSmall(i32),
    #[error("tile scale {0} must be positive")]
    TileScale(f32),
    #[error("boss room size {size} must be odd and between 3 and {max}")]
    BossRoom { size: i32, max: i32 },
    #[error("threat cost for {0:?} enemies must be at least 1")]
    ZeroThreatCost(EnemyTier),
    #[error("final path: {0}")]
    FinalPath(&'static str),
    #[error("zone table is empty")]
    NoZones,
    #[error("zone '{zone}': radius {radius} must be greater than the previous radius {previous}")]
    UnorderedRadius { zone: String, radius: f64, previous: f64 },
}

/// Inclusive `[min, max]` range, written as a two-element array in TOML.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span(pub i32, pub i32);

impl Span {
    pub fn min(self) -> i32 {
        self.0
    }

    pub fn max(self) -> i32 {
        self.1
    }

    pub fn validate(self, field: impl Into<String>, floor: i32) -> Result<(), ConfigError> {
        if self.0 > self.1 || self.0 < floor {
            return Err(ConfigError::InvalidSpan {
                field: field.into(),
                min: self.0,
                max: self.1,
                floor,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorridorLengths {
    pub short: Span,
    pub medium: Span,
    pub long: Span,
}

impl CorridorLengths {
    /// Span for a `weighted_outcome` over short/medium/long; no outcome falls back to short.
    pub fn for_outcome(&self, outcome: usize) -> Span {
        match outcome {
            1 => self.medium,
            2 => self.long,
            _ => self.short,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDimensions {
    pub small: Span,
    pub medium: Span,
    pub large: Span,
}

impl RoomDimensions {
    pub fn for_size(&self, size: RoomSize) -> Span {
        match size {
            RoomSize::Small => self.small,
            RoomSize::Medium => self.medium,
            RoomSize::Large => self.large,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatCosts {
    pub trivial: i32,
    pub easy: i32,
    pub medium: i32,
    pub hard: i32,
}

impl ThreatCosts {
    pub fn cost(&self, tier: EnemyTier) -> i32 {
        match tier {
            EnemyTier::Trivial => self.trivial,
            EnemyTier::Easy => self.easy,
            EnemyTier::Medium => self.medium,
            EnemyTier::Hard => self.hard,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalPathConfig {
    /// Width of the escape corridor, in tiles. Odd widths centre on the diagonal.
    pub width: i32,
    pub ambush_chance: u8,
    /// Steps from the origin before ambush rolls start.
    pub ambush_min_distance: i32,
    pub pan_delay_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Width and height of the tile map. Must be odd.
    pub grid_size: i32,
    /// World units per tile, forwarded to placers through `Placement::world_position`.
    pub tile_scale: f32,
    /// Fixed seed reused by every reset. `None` draws a fresh seed each time.
    #[serde(default)]
    pub seed: Option<u64>,
    pub boss_room_size: i32,
    pub corridor_lengths: CorridorLengths,
    pub room_dimensions: RoomDimensions,
    pub threat_costs: ThreatCosts,
    pub final_path: FinalPathConfig,
    pub zones: ZoneTable,
}

impl GeneratorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    /// Default grid and tuning with a single zone covering the whole map.
    pub fn single_zone(mode: Mode) -> Self {
        Self { zones: ZoneTable::single(mode), ..Self::default() }
    }

    pub fn half(&self) -> i32 {
        self.grid_size / 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size % 2 == 0 {
            return Err(ConfigError::EvenGridSize(self.grid_size));
        }
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if self.tile_scale.is_nan() || self.tile_scale <= 0.0 {
            return Err(ConfigError::TileScale(self.tile_scale));
        }

        let max_boss = self.half() - 3;
        if self.boss_room_size < 3 || self.boss_room_size % 2 == 0 || self.boss_room_size > max_boss
        {
            return Err(ConfigError::BossRoom { size: self.boss_room_size, max: max_boss });
        }

        for (field, span) in [
            ("corridor_lengths.short", self.corridor_lengths.short),
            ("corridor_lengths.medium", self.corridor_lengths.medium),
            ("corridor_lengths.long", self.corridor_lengths.long),
        ] {
            span.validate(field, 1)?;
        }

        // Rooms round up to even, so the largest draw is `max + 1`.
        for (field, span) in [
            ("room_dimensions.small", self.room_dimensions.small),
            ("room_dimensions.medium", self.room_dimensions.medium),
            ("room_dimensions.large", self.room_dimensions.large),
        ] {
            span.validate(field, 3)?;
            if span.max() + 1 > self.grid_size - 2 {
                return Err(ConfigError::SpanTooLarge {
                    field: field.to_string(),
                    min: span.min(),
                    max: span.max(),
                    grid_size: self.grid_size,
                });
            }
        }

        for tier in EnemyTier::ALL {
            if self.threat_costs.cost(tier) < 1 {
                return Err(ConfigError::ZeroThreatCost(tier));
            }
        }

        if self.final_path.width < 1 || self.final_path.width > self.grid_size / 4 {
            return Err(ConfigError::FinalPath("width must be between 1 and a quarter of the grid"));
        }
        if self.final_path.ambush_chance > 100 {
            return Err(ConfigError::FinalPath("ambush_chance is above 100%"));
        }

        self.zones.validate()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            grid_size: 41,
            tile_scale: 5.0,
            seed: None,
            boss_room_size: 7,
            corridor_lengths: CorridorLengths {
                short: Span(2, 4),
                medium: Span(5, 8),
                long: Span(9, 14),
            },
            room_dimensions: RoomDimensions {
                small: Span(4, 5),
                medium: Span(6, 9),
                large: Span(10, 13),
            },
            threat_costs: ThreatCosts { trivial: 1, easy: 2, medium: 3, hard: 5 },
            final_path: FinalPathConfig {
                width: 3,
                ambush_chance: 15,
                ambush_min_distance: 6,
                pan_delay_ms: 500,
            },
            zones: ZoneTable::new(vec![
                Zone { radius: 8.0, mode: core_mode() },
                Zone { radius: 16.0, mode: middle_mode() },
                Zone { radius: 30.0, mode: outskirts_mode() },
            ]),
        }
    }
}

fn core_mode() -> Mode {
    Mode {
        name: "core".to_string(),
        color: [200, 48, 48],
        room_size: RoomSizeMix { small: 15, medium: 40, large: 45 },
        middle_pillar_chance: 40,
        cross_pillar_chance: 35,
        courtyard_wall_chance: 35,
        rounded_chance: 50,
        exit_chance: 50,
        locked_room_chance: 50,
        corridor_type: CorridorMix { normal: 50, snake: 25, outcove: 25 },
        corridor_length: LengthMix { short: 40, medium: 40, long: 20 },
        normal_branch_chance: 12,
        normal_room_chance: 15,
        snake_branch_chance: 10,
        snake_room_chance: 30,
        snake_enemy_chance: 4,
        outcove_branch_chance: 20,
        outcove_room_chance: 30,
        outcove_enemy_chance: 20,
        threat: ThreatRanges { small: Span(3, 5), medium: Span(5, 9), large: Span(8, 14) },
        enemy_tier: TierMix { trivial: 10, easy: 30, medium: 35, hard: 25 },
        dead_end_pickup_chance: 60,
        dead_end_pickup: PickupMix { heart: 25, health_boost: 25, speed_boost: 25, shot_boost: 25 },
    }
}

fn middle_mode() -> Mode {
    Mode {
        name: "middle".to_string(),
        color: [220, 160, 40],
        room_size: RoomSizeMix { small: 30, medium: 45, large: 25 },
        middle_pillar_chance: 30,
        cross_pillar_chance: 25,
        courtyard_wall_chance: 25,
        rounded_chance: 40,
        exit_chance: 40,
        locked_room_chance: 35,
        corridor_type: CorridorMix { normal: 60, snake: 20, outcove: 20 },
        corridor_length: LengthMix { short: 45, medium: 35, long: 20 },
        normal_branch_chance: 10,
        normal_room_chance: 10,
        snake_branch_chance: 10,
        snake_room_chance: 25,
        snake_enemy_chance: 3,
        outcove_branch_chance: 15,
        outcove_room_chance: 25,
        outcove_enemy_chance: 15,
        threat: ThreatRanges { small: Span(2, 4), medium: Span(3, 7), large: Span(6, 10) },
        enemy_tier: TierMix { trivial: 25, easy: 40, medium: 25, hard: 10 },
        dead_end_pickup_chance: 45,
        dead_end_pickup: PickupMix { heart: 40, health_boost: 20, speed_boost: 20, shot_boost: 20 },
    }
}

fn outskirts_mode() -> Mode {
    Mode {
        name: "outskirts".to_string(),
        color: [64, 160, 96],
        room_size: RoomSizeMix { small: 50, medium: 35, large: 15 },
        middle_pillar_chance: 20,
        cross_pillar_chance: 20,
        courtyard_wall_chance: 20,
        rounded_chance: 30,
        exit_chance: 35,
        locked_room_chance: 25,
        corridor_type: CorridorMix { normal: 70, snake: 15, outcove: 15 },
        corridor_length: LengthMix { short: 50, medium: 35, long: 15 },
        normal_branch_chance: 8,
        normal_room_chance: 8,
        snake_branch_chance: 10,
        snake_room_chance: 20,
        snake_enemy_chance: 2,
        outcove_branch_chance: 15,
        outcove_room_chance: 20,
        outcove_enemy_chance: 10,
        threat: ThreatRanges { small: Span(1, 3), medium: Span(2, 5), large: Span(4, 8) },
        enemy_tier: TierMix { trivial: 50, easy: 35, medium: 15, hard: 0 },
        dead_end_pickup_chance: 40,
        dead_end_pickup: PickupMix { heart: 40, health_boost: 20, speed_boost: 20, shot_boost: 20 },
    }
}
