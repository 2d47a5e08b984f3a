//! The escape route opened once the boss falls.

use tracing::debug;

use crate::types::{EntityKind, Pos};

use super::super::context::GenContext;
use super::super::zones::EnemyTier;

const CORNER_SIGNS: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// Removes every enemy, tramples a diagonal corridor from the start to a random
/// corner and rolls ambushes along it. The portal goes on the outermost cell of
/// that diagonal nothing else stands on.
pub(super) fn open_final_path(ctx: &mut GenContext<'_>) -> Pos {
    let enemies = ctx.placer.log().handles_where(|placement| placement.kind.is_enemy());
    let cleared = enemies.len();
    for handle in enemies {
        ctx.remove(handle);
    }

    let half = ctx.grid.half();
    let (sx, sy) = ctx.rng.pick(&CORNER_SIGNS);
    let width = ctx.config.final_path.width;
    let (low, high) = (-(width / 2), (width - 1) / 2);

    let mut ambushes = 0;
    for i in 0..=half - 1 {
        let center = Pos::new(sx * i, sy * i);
        for dy in low..=high {
            for dx in low..=high {
                let cell = center + Pos::new(dx, dy);
                ctx.delete(cell);
                ctx.set_floor(cell);
            }
        }

        if i > ctx.config.final_path.ambush_min_distance
            && ctx.rng.percent_roll(ctx.config.final_path.ambush_chance)
        {
            let mode = ctx.mode_at(center);
            let outcome = ctx.rng.weighted_outcome(&mode.enemy_tier.weights());
            if let Some(tier) = EnemyTier::from_outcome(outcome) {
                ctx.spawn_enemy(tier, center);
                ambushes += 1;
            }
        }
    }

    let portal = (0..=half)
        .rev()
        .map(|i| Pos::new(sx * i, sy * i))
        .find(|&pos| ctx.grid.is_floor(pos) && is_unoccupied(ctx, pos))
        .unwrap_or(Pos::new(sx * (half - 1), sy * (half - 1)));
    ctx.spawn(EntityKind::Portal, portal);
    debug!(cleared, ambushes, x = portal.x, y = portal.y, "final path opened");
    portal
}

/// No pickup, enemy or landmark stands on `pos`.
fn is_unoccupied(ctx: &GenContext<'_>, pos: Pos) -> bool {
    ctx.placer.log().placements().all(|placement| placement.kind.is_tile() || placement.pos != pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::mapgen::context::harness::Harness;
    use crate::types::{EnemyKind, PickupKind, TileState};

    #[test]
    fn final_path_is_a_floor_diagonal_ending_at_the_portal() {
        for seed in 0..16 {
            let mut config = GeneratorConfig::default();
            config.final_path.ambush_chance = 0;
            let mut harness = Harness::new(config, seed);
            {
                let mut ctx = harness.ctx();
                ctx.set_floor(Pos::ORIGIN);
                ctx.spawn_enemy(EnemyTier::Hard, Pos::ORIGIN);
                ctx.spawn(EntityKind::Enemy(EnemyKind::Boss), Pos::new(3, 3));
            }
            let corner = open_final_path(&mut harness.ctx());
            let half = harness.grid.half();

            assert_eq!(corner.x.abs(), half);
            assert_eq!(corner.y.abs(), half);
            assert_eq!(harness.grid.get(corner), TileState::Floor);
            assert!(harness.placements_of(EntityKind::is_enemy).is_empty());
            assert_eq!(harness.placements_of(|kind| kind == EntityKind::Portal)[0].pos, corner);

            let (sx, sy) = (corner.x.signum(), corner.y.signum());
            for i in 0..half {
                for offset in [Pos::new(0, 0), Pos::new(1, 1), Pos::new(-1, 0), Pos::new(0, -1)] {
                    let cell = Pos::new(sx * i, sy * i) + offset;
                    assert_eq!(harness.grid.get(cell), TileState::Floor, "seed {seed}: {cell:?}");
                }
            }
        }
    }

    #[test]
    fn ambushes_only_appear_past_the_minimum_distance() {
        let mut config = GeneratorConfig::default();
        config.final_path.ambush_chance = 100;
        let min_distance = config.final_path.ambush_min_distance;
        let mut harness = Harness::new(config, 4);
        open_final_path(&mut harness.ctx());
        let ambushers = harness.placements_of(EntityKind::is_enemy);
        assert!(!ambushers.is_empty());
        for enemy in ambushers {
            assert!(enemy.pos.x.abs() > min_distance);
            assert_eq!(enemy.pos.x.abs(), enemy.pos.y.abs());
            assert_ne!(enemy.kind, EntityKind::Enemy(EnemyKind::Boss));
        }
    }

    #[test]
    fn the_portal_never_shares_a_cell_with_a_pocket_pickup() {
        for seed in 0..16 {
            let mut config = GeneratorConfig::default();
            config.final_path.ambush_chance = 0;
            let mut harness = Harness::new(config, seed);
            let half = harness.grid.half();
            {
                let mut ctx = harness.ctx();
                for (sx, sy) in CORNER_SIGNS {
                    ctx.spawn(EntityKind::Pickup(PickupKind::HealthBoost), Pos::new(sx * (half - 1), sy * (half - 1)));
                    ctx.spawn(EntityKind::Pickup(PickupKind::Heart), Pos::new(sx * half, sy * half));
                }
            }
            let portal = open_final_path(&mut harness.ctx());

            assert_eq!(portal.x.abs(), half - 2, "seed {seed}");
            assert_eq!(harness.grid.get(portal), TileState::Floor);
            let sharing = harness.placements_of(|kind| kind != EntityKind::Portal && !kind.is_tile());
            assert!(sharing.iter().all(|placement| placement.pos != portal), "seed {seed}");
        }
    }
}
