//! The fixed phases of building one level, run in order by `LevelGenerator`.

use tracing::debug;

use crate::types::{Direction, DoorKind, EnemyKind, EntityKind, PickupKind, Pos};

use super::super::context::GenContext;
use super::super::corridor::carve;
use super::super::rooms::{Room, RoomSize, seal_room};

/// Corner pockets, NE first and counter-clockwise.
const POCKET_SIGNS: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

const POCKET_UPGRADES: [PickupKind; 3] =
    [PickupKind::HealthBoost, PickupKind::SpeedBoost, PickupKind::ShotBoost];

/// Pan priority when the level is first shown.
const PAN_PRIORITY: [EntityKind; 4] = [
    EntityKind::Pickup(PickupKind::SilverKey),
    EntityKind::Pickup(PickupKind::GoldKey),
    EntityKind::Enemy(EnemyKind::Boss),
    EntityKind::Portal,
];

pub(super) fn place_anchors(ctx: &mut GenContext<'_>) {
    ctx.set_floor(Pos::ORIGIN);
    ctx.spawn(EntityKind::Player, Pos::ORIGIN);
    ctx.spawn(EntityKind::Camera, Pos::ORIGIN);
    ctx.spawn(EntityKind::CameraTarget, Pos::ORIGIN);
    ctx.enqueue(Pos::ORIGIN);

    let half = ctx.grid.half();
    let silver = ctx.rng.die_roll(4) as usize - 1;
    let gold = (silver + ctx.rng.die_roll(3) as usize) % 4;
    for (index, (sx, sy)) in POCKET_SIGNS.into_iter().enumerate() {
        let center = Pos::new(sx * (half - 1), sy * (half - 1));
        for dy in -1..=1 {
            for dx in -1..=1 {
                ctx.set_floor(center + Pos::new(dx, dy));
            }
        }
        let pickup = if index == silver {
            PickupKind::SilverKey
        } else if index == gold {
            PickupKind::GoldKey
        } else {
            ctx.rng.pick(&POCKET_UPGRADES)
        };
        ctx.spawn(EntityKind::Pickup(pickup), center);
        ctx.enqueue(Pos::new(sx * (half - 2), sy * (half - 2)));
    }

    let boss_room = boss_room(ctx);
    debug!(
        left = boss_room.left,
        right = boss_room.right,
        down = boss_room.down,
        up = boss_room.up,
        "boss room placed"
    );
}

/// Square room of `boss_room_size` flush against a random map edge, centred on
/// that edge and sealed so the gold door is the only way in.
fn boss_room(ctx: &mut GenContext<'_>) -> Room {
    let size = ctx.config.boss_room_size;
    let half = ctx.grid.half();
    let edge = ctx.rng.pick(&Direction::ALL);
    let entrance = edge.offset() * (half - size + 1);
    let room = Room::anchored(entrance, edge, size, size, RoomSize::Large);

    for pos in room.cells() {
        ctx.set_floor(pos);
    }
    seal_room(ctx, &room);
    ctx.spawn(EntityKind::Enemy(EnemyKind::Boss), room.center());
    ctx.spawn(EntityKind::Door(DoorKind::Gold), entrance);
    ctx.enqueue(room.doorstep());
    room
}

/// Grows corridors from queued branches until the queue runs dry.
pub(super) fn carve_level(ctx: &mut GenContext<'_>) {
    let mut steps = 0_usize;
    let mut cursor = ctx.dequeue();
    while let Some(at) = cursor {
        steps += 1;
        cursor = match carve(ctx, at) {
            Some(next) => Some(next),
            None => ctx.dequeue(),
        };
    }
    debug!(steps, "carving finished");
}

/// Fills every untouched cell with wall and rings the map one cell past its edge.
pub(super) fn wall_level(ctx: &mut GenContext<'_>) {
    for pos in ctx.grid.positions() {
        ctx.set_wall(pos);
    }

    let ring = ctx.grid.half() + 1;
    for i in -ring..ring {
        ctx.spawn(EntityKind::Wall, Pos::new(i, ring));
        ctx.spawn(EntityKind::Wall, Pos::new(ring, -i));
        ctx.spawn(EntityKind::Wall, Pos::new(-i, -ring));
        ctx.spawn(EntityKind::Wall, Pos::new(-ring, i));
    }
}

/// Drops the cinematic anchor on the most important landmark.
pub(super) fn place_pan_anchor(ctx: &mut GenContext<'_>) -> Option<Pos> {
    let target = PAN_PRIORITY.iter().find_map(|&kind| ctx.placer.log().first_of(kind))?;
    ctx.spawn(EntityKind::CinematicAnchor, target);
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::mapgen::context::harness::Harness;
    use crate::types::TileState;

    #[test]
    fn pockets_hold_both_keys_and_open_toward_the_centre() {
        for seed in 0..24 {
            let mut harness = Harness::new(GeneratorConfig::default(), seed);
            place_anchors(&mut harness.ctx());
            let half = harness.grid.half();

            let keys = harness.placements_of(|kind| {
                matches!(kind, EntityKind::Pickup(PickupKind::SilverKey | PickupKind::GoldKey))
            });
            assert_eq!(keys.len(), 2, "seed {seed}");
            assert_ne!(keys[0].pos, keys[1].pos);
            for key in keys {
                assert_eq!(key.pos.x.abs(), half - 1);
                assert_eq!(key.pos.y.abs(), half - 1);
            }
            // start, four pockets and the boss room entrance
            assert_eq!(harness.branches.len(), 6);
        }
    }

    #[test]
    fn boss_room_sits_against_an_edge_behind_a_gold_door() {
        for seed in 0..24 {
            let mut harness = Harness::new(GeneratorConfig::default(), seed);
            place_anchors(&mut harness.ctx());
            let half = harness.grid.half();
            let size = harness.config.boss_room_size;

            let boss = harness.placements_of(|kind| kind == EntityKind::Enemy(EnemyKind::Boss));
            let door = harness.placements_of(|kind| kind == EntityKind::Door(DoorKind::Gold));
            assert_eq!(boss.len(), 1);
            assert_eq!(door.len(), 1);
            assert_eq!(boss[0].pos.x.abs().max(boss[0].pos.y.abs()), half - size / 2);
            assert_eq!(door[0].pos.manhattan(Pos::ORIGIN) as i32, half - size + 1);
            assert_eq!(harness.grid.get(door[0].pos), TileState::Floor);
        }
    }

    #[test]
    fn the_gold_door_is_the_only_way_into_the_boss_room() {
        for seed in 0..24 {
            let mut harness = Harness::new(GeneratorConfig::default(), seed);
            let room = boss_room(&mut harness.ctx());
            let doorstep = room.doorstep();
            assert_eq!(doorstep.manhattan(Pos::ORIGIN) as i32, harness.grid.half() - harness.config.boss_room_size);
            assert_eq!(harness.grid.get(doorstep), TileState::Floor);
            assert_eq!(harness.branches.dequeue(&harness.grid), Some(doorstep));
            for pos in room.ring().filter(|&pos| pos != doorstep && !harness.grid.is_out_of_bounds(pos)) {
                assert_eq!(harness.grid.get(pos), TileState::Wall, "seed {seed}: {pos:?}");
            }
        }
    }

    #[test]
    fn walling_leaves_no_empty_cells_and_rings_the_map() {
        let mut harness = Harness::new(GeneratorConfig::default(), 1);
        place_anchors(&mut harness.ctx());
        wall_level(&mut harness.ctx());
        assert_eq!(harness.grid.count(TileState::Empty), 0);

        let ring = harness.grid.half() + 1;
        let perimeter = harness.placements_of(|kind| kind == EntityKind::Wall);
        let outside: Vec<_> = perimeter
            .iter()
            .filter(|placement| placement.pos.x.abs() == ring || placement.pos.y.abs() == ring)
            .collect();
        assert_eq!(outside.len() as i32, 8 * ring);
        assert!(perimeter.iter().all(|placement| placement.pos.x.abs() <= ring && placement.pos.y.abs() <= ring));
    }

    #[test]
    fn pan_prefers_the_silver_key() {
        let mut harness = Harness::new(GeneratorConfig::default(), 5);
        place_anchors(&mut harness.ctx());
        let target = place_pan_anchor(&mut harness.ctx());
        let silver = harness.placements_of(|kind| kind == EntityKind::Pickup(PickupKind::SilverKey));
        assert_eq!(target, Some(silver[0].pos));
    }
}
