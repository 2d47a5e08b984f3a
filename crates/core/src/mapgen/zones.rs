//! Generation zones: parameter bundles chosen by distance from the map centre.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, Span};
use crate::types::{EnemyKind, PickupKind, Pos};

use super::rooms::RoomSize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSizeMix {
    pub small: u8,
    pub medium: u8,
    pub large: u8,
}

impl RoomSizeMix {
    pub fn weights(&self) -> [u8; 3] {
        [self.small, self.medium, self.large]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorridorMix {
    pub normal: u8,
    pub snake: u8,
    pub outcove: u8,
}

impl CorridorMix {
    pub fn weights(&self) -> [u8; 3] {
        [self.normal, self.snake, self.outcove]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthMix {
    pub short: u8,
    pub medium: u8,
    pub long: u8,
}

impl LengthMix {
    pub fn weights(&self) -> [u8; 3] {
        [self.short, self.medium, self.long]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierMix {
    pub trivial: u8,
    pub easy: u8,
    pub medium: u8,
    pub hard: u8,
}

impl TierMix {
    pub fn weights(&self) -> [u8; 4] {
        [self.trivial, self.easy, self.medium, self.hard]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupMix {
    pub heart: u8,
    pub health_boost: u8,
    pub speed_boost: u8,
    pub shot_boost: u8,
}

impl PickupMix {
    pub const KINDS: [PickupKind; 4] =
        [PickupKind::Heart, PickupKind::HealthBoost, PickupKind::SpeedBoost, PickupKind::ShotBoost];

    pub fn weights(&self) -> [u8; 4] {
        [self.heart, self.health_boost, self.speed_boost, self.shot_boost]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatRanges {
    pub small: Span,
    pub medium: Span,
    pub large: Span,
}

impl ThreatRanges {
    pub fn for_size(&self, size: RoomSize) -> Span {
        match size {
            RoomSize::Small => self.small,
            RoomSize::Medium => self.medium,
            RoomSize::Large => self.large,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnemyTier {
    Trivial,
    Easy,
    Medium,
    Hard,
}

impl EnemyTier {
    pub const ALL: [EnemyTier; 4] =
        [EnemyTier::Trivial, EnemyTier::Easy, EnemyTier::Medium, EnemyTier::Hard];

    pub fn from_outcome(outcome: usize) -> Option<Self> {
        Self::ALL.get(outcome).copied()
    }

    pub fn variants(self) -> &'static [EnemyKind] {
        match self {
            EnemyTier::Trivial => &[EnemyKind::Basic],
            EnemyTier::Easy => &[EnemyKind::Fast],
            EnemyTier::Medium => &[EnemyKind::Spread, EnemyKind::Tank],
            EnemyTier::Hard => &[EnemyKind::Ultra],
        }
    }
}

/// One zone's tuning. Every `*_chance` is an independent percentage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub name: String,
    /// Debug tint for visualising which zone carved a tile.
    pub color: [u8; 3],
    pub room_size: RoomSizeMix,
    pub middle_pillar_chance: u8,
    pub cross_pillar_chance: u8,
    pub courtyard_wall_chance: u8,
    pub rounded_chance: u8,
    pub exit_chance: u8,
    pub locked_room_chance: u8,
    pub corridor_type: CorridorMix,
    pub corridor_length: LengthMix,
    pub normal_branch_chance: u8,
    pub normal_room_chance: u8,
    pub snake_branch_chance: u8,
    pub snake_room_chance: u8,
    pub snake_enemy_chance: u8,
    pub outcove_branch_chance: u8,
    pub outcove_room_chance: u8,
    pub outcove_enemy_chance: u8,
    pub threat: ThreatRanges,
    pub enemy_tier: TierMix,
    pub dead_end_pickup_chance: u8,
    pub dead_end_pickup: PickupMix,
}

impl Mode {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chances = [
            ("middle_pillar_chance", self.middle_pillar_chance),
            ("cross_pillar_chance", self.cross_pillar_chance),
            ("courtyard_wall_chance", self.courtyard_wall_chance),
            ("rounded_chance", self.rounded_chance),
            ("exit_chance", self.exit_chance),
            ("locked_room_chance", self.locked_room_chance),
            ("normal_branch_chance", self.normal_branch_chance),
            ("normal_room_chance", self.normal_room_chance),
            ("snake_branch_chance", self.snake_branch_chance),
            ("snake_room_chance", self.snake_room_chance),
            ("snake_enemy_chance", self.snake_enemy_chance),
            ("outcove_branch_chance", self.outcove_branch_chance),
            ("outcove_room_chance", self.outcove_room_chance),
            ("outcove_enemy_chance", self.outcove_enemy_chance),
            ("dead_end_pickup_chance", self.dead_end_pickup_chance),
        ];
        for (field, value) in chances {
            if value > 100 {
                return Err(ConfigError::PercentOutOfRange {
                    zone: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        let distributions = [
            ("room_size", total(&self.room_size.weights())),
            ("corridor_type", total(&self.corridor_type.weights())),
            ("corridor_length", total(&self.corridor_length.weights())),
            ("enemy_tier", total(&self.enemy_tier.weights())),
            ("dead_end_pickup", total(&self.dead_end_pickup.weights())),
        ];
        for (field, sum) in distributions {
            if sum > 100 {
                return Err(ConfigError::DistributionOverflow {
                    zone: self.name.clone(),
                    field,
                    sum,
                });
            }
        }

        for (field, span) in [
            ("threat.small", self.threat.small),
            ("threat.medium", self.threat.medium),
            ("threat.large", self.threat.large),
        ] {
            span.validate(format!("{}.{field}", self.name), 0)?;
        }
        Ok(())
    }
}

fn total(weights: &[u8]) -> u32 {
    weights.iter().map(|&weight| u32::from(weight)).sum()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Outer edge of the zone, in tiles from the origin.
    pub radius: f64,
    pub mode: Mode,
}

/// Zones ordered innermost first. The innermost zone holds the hardest tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneTable(Vec<Zone>);

impl ZoneTable {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self(zones)
    }

    pub fn single(mode: Mode) -> Self {
        Self(vec![Zone { radius: f64::MAX, mode }])
    }

    pub fn zones(&self) -> &[Zone] {
        &self.0
    }

    /// The innermost zone whose radius covers `pos`, or the outermost zone past every radius.
    pub fn select(&self, pos: Pos) -> &Mode {
        let distance = pos.distance_from_origin();
        let zone = self.0.iter().find(|zone| distance <= zone.radius).or_else(|| self.0.last());
        &zone.expect("validated zone tables are never empty").mode
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.0.is_empty() {
            return Err(ConfigError::NoZones);
        }
        let mut previous = 0.0_f64;
        for zone in &self.0 {
            if zone.radius.is_nan() || zone.radius <= previous {
                return Err(ConfigError::UnorderedRadius {
                    zone: zone.mode.name.clone(),
                    radius: zone.radius,
                    previous,
                });
            }
            previous = zone.radius;
            zone.mode.validate()?;
        }
        Ok(())
    }
}
