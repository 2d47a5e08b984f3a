//! Post-carving sweep joining floor regions that cannot reach the start.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::types::{Pos, TileState};

use super::super::context::GenContext;
use super::super::grid::TileGrid;

/// Floor cells 4-connected to `start`.
pub(super) fn reachable_floor(grid: &TileGrid, start: Pos) -> HashSet<Pos> {
    let mut seen = HashSet::new();
    if !grid.is_floor(start) {
        return seen;
    }
    seen.insert(start);
    let mut open = VecDeque::from([start]);
    while let Some(pos) = open.pop_front() {
        for next in pos.neighbors() {
            if grid.is_floor(next) && seen.insert(next) {
                open.push_back(next);
            }
        }
    }
    seen
}

/// Carves an L-shaped corridor, horizontal leg first, from each stray floor
/// region toward the origin until it meets the connected region. Walls already
/// standing (sealed rooms) are stepped around. Returns how many regions were
/// joined.
pub(super) fn join_stray_floor(ctx: &mut GenContext<'_>) -> usize {
    let mut joined = 0;
    let mut stranded = HashSet::new();
    loop {
        let connected = reachable_floor(ctx.grid, Pos::ORIGIN);
        let stray = ctx.grid.positions().find(|&pos| {
            ctx.grid.is_floor(pos) && !connected.contains(&pos) && !stranded.contains(&pos)
        });
        let Some(stray) = stray else {
            return joined;
        };

        let region = reachable_floor(ctx.grid, stray);
        let Some(start) = region
            .iter()
            .copied()
            .min_by_key(|pos| (pos.manhattan(Pos::ORIGIN), pos.y, pos.x))
        else {
            return joined;
        };

        if walk_home(ctx, start, &connected) {
            joined += 1;
        } else {
            stranded.extend(region);
        }
    }
}

/// Floors a path from `start` into `connected`.
fn walk_home(ctx: &mut GenContext<'_>, start: Pos, connected: &HashSet<Pos>) -> bool {
    let mut cursor = start;
    while !connected.contains(&cursor) {
        match step_toward_origin(ctx.grid, cursor) {
            Some(next) => {
                cursor = next;
                ctx.set_floor(cursor);
            }
            None => {
                let Some(detour) = detour(ctx.grid, cursor, connected) else {
                    return false;
                };
                for pos in detour {
                    ctx.set_floor(pos);
                }
                return true;
            }
        }
    }
    true
}

/// The x step toward the origin, else the y step, skipping walls.
fn step_toward_origin(grid: &TileGrid, cursor: Pos) -> Option<Pos> {
    [Pos::new(-cursor.x.signum(), 0), Pos::new(0, -cursor.y.signum())]
        .into_iter()
        .filter(|&step| step != Pos::ORIGIN)
        .map(|step| cursor + step)
        .find(|&next| grid.get(next) != TileState::Wall)
}

/// Shortest route through non-wall cells from `start` to the connected region,
/// excluding `start` itself.
fn detour(grid: &TileGrid, start: Pos, connected: &HashSet<Pos>) -> Option<Vec<Pos>> {
    let mut came_from = HashMap::from([(start, start)]);
    let mut open = VecDeque::from([start]);
    while let Some(pos) = open.pop_front() {
        if connected.contains(&pos) {
            let mut route = vec![pos];
            let mut at = pos;
            while let Some(&previous) = came_from.get(&at).filter(|&&previous| previous != start) {
                route.push(previous);
                at = previous;
            }
            route.reverse();
            return Some(route);
        }
        for next in pos.neighbors() {
            if grid.get(next) != TileState::Wall && !came_from.contains_key(&next) {
                came_from.insert(next, pos);
                open.push_back(next);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::context::harness::{Harness, quiet_mode};

    #[test]
    fn stray_regions_are_walked_back_to_the_start() {
        let mut harness = Harness::with_mode(quiet_mode(), 0);
        {
            let mut ctx = harness.ctx();
            ctx.set_floor(Pos::ORIGIN);
            ctx.set_floor(Pos::new(1, 0));
            ctx.set_floor(Pos::new(5, 4));
            ctx.set_floor(Pos::new(5, 5));
            ctx.set_floor(Pos::new(-7, -2));
            assert_eq!(join_stray_floor(&mut ctx), 2);
        }

        let connected = reachable_floor(&harness.grid, Pos::ORIGIN);
        assert_eq!(connected.len(), harness.floor_count());
        // the corridor from (5, 4) runs along y = 4 before turning south
        assert!(harness.grid.is_floor(Pos::new(0, 4)));
        assert!(harness.grid.is_floor(Pos::new(-1, -2)));
    }

    #[test]
    fn connected_levels_are_left_alone() {
        let mut harness = Harness::with_mode(quiet_mode(), 0);
        {
            let mut ctx = harness.ctx();
            for x in -3..=3 {
                ctx.set_floor(Pos::new(x, 0));
            }
            assert_eq!(join_stray_floor(&mut ctx), 0);
        }
        assert_eq!(harness.floor_count(), 7);
    }

    #[test]
    fn walls_in_the_way_are_walked_around() {
        let mut harness = Harness::with_mode(quiet_mode(), 0);
        {
            let mut ctx = harness.ctx();
            ctx.set_floor(Pos::ORIGIN);
            ctx.set_floor(Pos::new(6, 0));
            for y in -2..=2 {
                ctx.set_wall(Pos::new(4, y));
            }
            assert_eq!(join_stray_floor(&mut ctx), 1);
        }

        let connected = reachable_floor(&harness.grid, Pos::ORIGIN);
        assert_eq!(connected.len(), harness.floor_count());
        for y in -2..=2 {
            assert_eq!(harness.grid.get(Pos::new(4, y)), TileState::Wall);
        }
    }

    #[test]
    fn walled_in_regions_are_given_up_on() {
        let mut harness = Harness::with_mode(quiet_mode(), 0);
        let pocket = Pos::new(6, 6);
        {
            let mut ctx = harness.ctx();
            ctx.set_floor(Pos::ORIGIN);
            ctx.set_floor(pocket);
            for next in pocket.neighbors() {
                ctx.set_wall(next);
            }
            assert_eq!(join_stray_floor(&mut ctx), 0);
        }
        assert_eq!(harness.floor_count(), 2);
    }
}
