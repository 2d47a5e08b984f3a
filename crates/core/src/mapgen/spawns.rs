//! Threat-budgeted enemy population for committed rooms.

use tracing::trace;

use crate::types::{Pos, TileState};

use super::context::GenContext;
use super::rooms::Room;
use super::zones::{EnemyTier, Mode};

/// Consecutive unaffordable or empty tier draws before a room stops filling.
pub const MAX_SPAWN_FAILURES: u32 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoomThreat {
    pub budget: i32,
    pub spent: i32,
}

pub(super) fn populate(ctx: &mut GenContext<'_>, mode: &Mode, room: &Room) -> RoomThreat {
    let span = mode.threat.for_size(room.size);
    let budget = ctx.rng.range_int(span.min(), span.max());
    let floor: Vec<Pos> = room.cells().filter(|&pos| ctx.get(pos) == TileState::Floor).collect();
    let mut threat = RoomThreat { budget, spent: 0 };
    if floor.is_empty() {
        return threat;
    }

    let mut failures = 0;
    while failures < MAX_SPAWN_FAILURES {
        let outcome = ctx.rng.weighted_outcome(&mode.enemy_tier.weights());
        let affordable = EnemyTier::from_outcome(outcome).filter(|&tier| {
            ctx.config.threat_costs.cost(tier) <= threat.budget - threat.spent
        });
        let Some(tier) = affordable else {
            failures += 1;
            continue;
        };

        let pos = ctx.rng.pick(&floor);
        ctx.spawn_enemy(tier, pos);
        threat.spent += ctx.config.threat_costs.cost(tier);
        failures = 0;
        trace!(?tier, spent = threat.spent, budget = threat.budget, "enemy placed");
    }
    threat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Span;
    use crate::mapgen::context::harness::{Harness, quiet_mode};
    use crate::mapgen::rooms::RoomSize;
    use crate::mapgen::zones::{ThreatRanges, TierMix};
    use crate::types::{Direction, EnemyKind, EntityKind};

    fn carved_room(harness: &mut Harness, size: RoomSize) -> Room {
        let room = Room::anchored(Pos::new(0, -4), Direction::N, 8, 8, size);
        let mut ctx = harness.ctx();
        for pos in room.cells() {
            ctx.set_floor(pos);
        }
        room
    }

    #[test]
    fn spending_never_exceeds_the_drawn_budget() {
        let mode = quiet_mode();
        for seed in 0..64 {
            let mut harness = Harness::with_mode(mode.clone(), seed);
            let room = carved_room(&mut harness, RoomSize::Large);
            let threat = populate(&mut harness.ctx(), &mode, &room);
            let span = mode.threat.large;
            assert!((span.min()..=span.max()).contains(&threat.budget));
            assert!(threat.spent <= threat.budget, "seed {seed}: {threat:?}");

            let costs = &harness.config.threat_costs;
            let spent: i32 = harness
                .placements_of(EntityKind::is_enemy)
                .iter()
                .map(|placement| match placement.kind {
                    EntityKind::Enemy(EnemyKind::Basic) => costs.trivial,
                    EntityKind::Enemy(EnemyKind::Fast) => costs.easy,
                    EntityKind::Enemy(EnemyKind::Spread | EnemyKind::Tank) => costs.medium,
                    _ => costs.hard,
                })
                .sum();
            assert_eq!(spent, threat.spent);
        }
    }

    #[test]
    fn enemies_land_on_room_floor() {
        let mode = quiet_mode();
        let mut harness = Harness::with_mode(mode.clone(), 12);
        let room = carved_room(&mut harness, RoomSize::Medium);
        populate(&mut harness.ctx(), &mode, &room);
        for placement in harness.placements_of(EntityKind::is_enemy) {
            assert!(room.contains(placement.pos));
        }
    }

    #[test]
    fn unaffordable_tiers_stop_population() {
        let mut mode = quiet_mode();
        mode.threat = ThreatRanges { small: Span(1, 1), medium: Span(1, 1), large: Span(4, 4) };
        mode.enemy_tier = TierMix { trivial: 0, easy: 0, medium: 0, hard: 100 };
        let mut harness = Harness::with_mode(mode.clone(), 3);
        let room = carved_room(&mut harness, RoomSize::Large);
        let threat = populate(&mut harness.ctx(), &mode, &room);
        assert_eq!(threat, RoomThreat { budget: 4, spent: 0 });
        assert!(harness.placements_of(EntityKind::is_enemy).is_empty());

        mode.enemy_tier = TierMix { trivial: 100, easy: 0, medium: 0, hard: 0 };
        let mut harness = Harness::with_mode(mode.clone(), 3);
        let room = carved_room(&mut harness, RoomSize::Large);
        let threat = populate(&mut harness.ctx(), &mode, &room);
        assert_eq!(threat.spent, 4);
        assert_eq!(harness.placements_of(EntityKind::is_enemy).len(), 4);
    }
}
