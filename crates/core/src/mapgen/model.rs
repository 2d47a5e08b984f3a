//! Public snapshot of a finished level.

use serde::Serialize;

use crate::types::{DoorKind, EnemyKind, EntityKind, PickupKind, Placement, Pos, TileState};

use super::rooms::Room;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneratedLevel {
    pub seed: u64,
    pub size: i32,
    pub tile_scale: f32,
    /// Row-major, south row first.
    pub tiles: Vec<TileState>,
    /// Every live placement in spawn order.
    pub placements: Vec<Placement>,
    /// Rooms carved off corridors, in commit order. The boss room is not among them.
    pub rooms: Vec<Room>,
    pub player_start: Pos,
    pub pan_target: Option<Pos>,
    pub portal: Option<Pos>,
}

impl GeneratedLevel {
    pub fn half(&self) -> i32 {
        self.size / 2
    }

    pub fn tile_at(&self, pos: Pos) -> TileState {
        let half = self.half();
        if pos.x.abs() > half || pos.y.abs() > half {
            return TileState::Wall;
        }
        self.tiles[((pos.y + half) * self.size + pos.x + half) as usize]
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let half = self.half();
        (-half..=half).flat_map(move |y| (-half..=half).map(move |x| Pos::new(x, y)))
    }

    pub fn count_tiles(&self, state: TileState) -> usize {
        self.tiles.iter().filter(|&&tile| tile == state).count()
    }

    /// Non-tile placements, which is what gameplay cares about.
    pub fn entities(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|placement| !placement.kind.is_tile())
    }

    pub fn count_of(&self, kind: EntityKind) -> usize {
        self.placements.iter().filter(|placement| placement.kind == kind).count()
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(|placement| placement.kind.is_enemy())
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.seed.to_le_bytes());
        bytes.extend(self.size.to_le_bytes());
        for tile in &self.tiles {
            bytes.push(match tile {
                TileState::Empty => 0,
                TileState::Floor => 1,
                TileState::Wall => 2,
            });
        }

        bytes.extend((self.placements.len() as u32).to_le_bytes());
        for placement in &self.placements {
            bytes.extend(entity_code(placement.kind).to_le_bytes());
            bytes.extend(placement.pos.x.to_le_bytes());
            bytes.extend(placement.pos.y.to_le_bytes());
        }

        for pos in [Some(self.player_start), self.pan_target, self.portal] {
            match pos {
                Some(pos) => {
                    bytes.push(1);
                    bytes.extend(pos.x.to_le_bytes());
                    bytes.extend(pos.y.to_le_bytes());
                }
                None => bytes.push(0),
            }
        }
        bytes
    }
}

fn entity_code(kind: EntityKind) -> u16 {
    match kind {
        EntityKind::Floor => 0,
        EntityKind::Wall => 1,
        EntityKind::Player => 2,
        EntityKind::Camera => 3,
        EntityKind::CameraTarget => 4,
        EntityKind::CinematicAnchor => 5,
        EntityKind::Portal => 6,
        EntityKind::Door(DoorKind::Silver) => 0x100,
        EntityKind::Door(DoorKind::Gold) => 0x101,
        EntityKind::Enemy(enemy) => {
            0x200
                + match enemy {
                    EnemyKind::Basic => 0,
                    EnemyKind::Fast => 1,
                    EnemyKind::Spread => 2,
                    EnemyKind::Tank => 3,
                    EnemyKind::Ultra => 4,
                    EnemyKind::Boss => 5,
                }
        }
        EntityKind::Pickup(pickup) => {
            0x300
                + match pickup {
                    PickupKind::Heart => 0,
                    PickupKind::HealthBoost => 1,
                    PickupKind::SpeedBoost => 2,
                    PickupKind::ShotBoost => 3,
                    PickupKind::SilverKey => 4,
                    PickupKind::GoldKey => 5,
                }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> GeneratedLevel {
        let mut tiles = vec![TileState::Wall; 9];
        tiles[4] = TileState::Floor;
        tiles[5] = TileState::Floor;
        GeneratedLevel {
            seed: 1,
            size: 3,
            tile_scale: 5.0,
            tiles,
            placements: vec![
                Placement { kind: EntityKind::Floor, pos: Pos::ORIGIN },
                Placement { kind: EntityKind::Player, pos: Pos::ORIGIN },
            ],
            rooms: Vec::new(),
            player_start: Pos::ORIGIN,
            pan_target: None,
            portal: None,
        }
    }

    #[test]
    fn tile_lookup_uses_centred_coordinates() {
        let level = tiny();
        assert_eq!(level.tile_at(Pos::ORIGIN), TileState::Floor);
        assert_eq!(level.tile_at(Pos::new(1, 0)), TileState::Floor);
        assert_eq!(level.tile_at(Pos::new(-1, 0)), TileState::Wall);
        assert_eq!(level.tile_at(Pos::new(2, 0)), TileState::Wall);
        assert_eq!(level.positions().count(), 9);
        assert_eq!(level.entities().count(), 1);
    }

    #[test]
    fn canonical_bytes_track_placement_order() {
        let level = tiny();
        let mut swapped = level.clone();
        swapped.placements.reverse();
        assert_ne!(level.canonical_bytes(), swapped.canonical_bytes());
        assert_eq!(level.canonical_bytes(), tiny().canonical_bytes());
    }
}
