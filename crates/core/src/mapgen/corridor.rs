//! One carving step from a cursor: a normal, snake or outcove corridor.

use tracing::trace;

use crate::types::{Direction, EntityKind, Pos};

use super::context::GenContext;
use super::rooms::make_room;
use super::zones::{EnemyTier, Mode, PickupMix};

/// Steps between lead-side switches on a snake corridor.
pub const SNAKE_STRIDE: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorridorStyle {
    Normal,
    Snake,
    Outcove,
}

impl CorridorStyle {
    /// Maps a `weighted_outcome` over normal/snake/outcove; no outcome is normal.
    pub fn from_outcome(outcome: usize) -> Self {
        match outcome {
            1 => CorridorStyle::Snake,
            2 => CorridorStyle::Outcove,
            _ => CorridorStyle::Normal,
        }
    }
}

/// Carves one corridor from `cursor` using the zone active there. Returns the
/// new cursor, or `None` when nothing more can grow from here.
pub(super) fn carve(ctx: &mut GenContext<'_>, cursor: Pos) -> Option<Pos> {
    let mode = ctx.mode_at(cursor);
    let style = CorridorStyle::from_outcome(ctx.rng.weighted_outcome(&mode.corridor_type.weights()));
    let span = ctx
        .config
        .corridor_lengths
        .for_outcome(ctx.rng.weighted_outcome(&mode.corridor_length.weights()));
    let length = ctx.rng.range_int(span.min(), span.max());
    trace!(zone = %mode.name, ?style, length, x = cursor.x, y = cursor.y, "carve");

    match style {
        CorridorStyle::Normal => normal(ctx, mode, cursor, length),
        CorridorStyle::Snake => snake(ctx, mode, cursor, length),
        CorridorStyle::Outcove => outcove(ctx, mode, cursor, length),
    }
}

/// The next cell and both of its side cells are still empty.
fn is_open(ctx: &GenContext<'_>, next: Pos, direction: Direction) -> bool {
    let (left, right) = direction.sides();
    ctx.is_empty_at(next) && ctx.is_empty_at(next + left) && ctx.is_empty_at(next + right)
}

/// Draws directions at random, discarding each one that fails `accept`.
fn pick_direction(
    ctx: &mut GenContext<'_>,
    accept: impl Fn(&GenContext<'_>, Direction) -> bool,
) -> Option<Direction> {
    let mut candidates = Direction::ALL.to_vec();
    while !candidates.is_empty() {
        let index = ctx.rng.die_roll(candidates.len() as u32) as usize - 1;
        let direction = candidates.remove(index);
        if accept(ctx, direction) {
            return Some(direction);
        }
    }
    None
}

fn normal(ctx: &mut GenContext<'_>, mode: &Mode, start: Pos, length: i32) -> Option<Pos> {
    let Some(direction) = pick_direction(ctx, |ctx, direction| is_open(ctx, start + direction, direction))
    else {
        dead_end(ctx, mode, start);
        return None;
    };

    let mut cursor = start;
    for _ in 0..length {
        let next = cursor + direction;
        if !is_open(ctx, next, direction) {
            break;
        }
        ctx.set_floor(next);
        cursor = next;
        if ctx.rng.percent_roll(mode.normal_branch_chance) {
            ctx.enqueue(cursor);
        }
        if ctx.rng.percent_roll(mode.normal_room_chance)
            && make_room(ctx, mode, cursor + direction, direction).is_some()
        {
            break;
        }
    }
    Some(cursor)
}

fn dead_end(ctx: &mut GenContext<'_>, mode: &Mode, cursor: Pos) {
    trace!(x = cursor.x, y = cursor.y, "dead end");
    if !ctx.rng.percent_roll(mode.dead_end_pickup_chance) {
        return;
    }
    let outcome = ctx.rng.weighted_outcome(&mode.dead_end_pickup.weights());
    if let Some(&pickup) = PickupMix::KINDS.get(outcome) {
        ctx.spawn(EntityKind::Pickup(pickup), cursor);
    }
}

fn snake(ctx: &mut GenContext<'_>, mode: &Mode, start: Pos, length: i32) -> Option<Pos> {
    let direction = ctx.rng.pick(&Direction::ALL);
    let (left, right) = direction.sides();
    let mut lead = if ctx.rng.percent_roll(50) { left } else { right };

    let mut cursor = start;
    let mut carved_any = false;
    for step in 0..length {
        if step > 0 && step % SNAKE_STRIDE == 0 {
            lead = lead.opposite();
        }
        let next = cursor + direction + lead;
        if ctx.grid.is_out_of_bounds(next) {
            break;
        }
        cursor = next;

        let mut carved_here = false;
        for cell in [cursor, cursor + left, cursor + right] {
            if ctx.set_floor(cell) {
                carved_here = true;
                if ctx.rng.percent_roll(mode.snake_enemy_chance) {
                    ctx.spawn_enemy(EnemyTier::Medium, cell);
                }
            }
        }
        if !carved_here {
            continue;
        }
        carved_any = true;
        for flank in [cursor + left, cursor + right] {
            if ctx.rng.percent_roll(mode.snake_branch_chance) {
                ctx.enqueue(flank);
            }
        }
    }

    if !carved_any {
        return None;
    }
    cap_with_room(ctx, mode, cursor, direction, mode.snake_room_chance);
    Some(cursor)
}

fn outcove(ctx: &mut GenContext<'_>, mode: &Mode, start: Pos, length: i32) -> Option<Pos> {
    let direction = pick_direction(ctx, |ctx, direction| ctx.is_empty_at(start + direction))?;
    let (left, right) = direction.sides();

    let mut cursor = start;
    for step in 1..=length {
        let next = cursor + direction;
        if !ctx.is_empty_at(next) {
            break;
        }
        ctx.set_floor(next);
        cursor = next;
        if step % 2 != 0 {
            continue;
        }

        let mut widened = Vec::with_capacity(2);
        for flank in [cursor + left, cursor + right] {
            if ctx.set_floor(flank) {
                widened.push(flank);
            }
        }
        if !widened.is_empty() && ctx.rng.percent_roll(mode.outcove_branch_chance) {
            let flank = ctx.rng.pick(&widened);
            ctx.enqueue(flank);
        }
        if ctx.rng.percent_roll(mode.outcove_enemy_chance) {
            ctx.spawn_enemy(EnemyTier::Medium, cursor);
        }
    }

    cap_with_room(ctx, mode, cursor, direction, mode.outcove_room_chance);
    Some(cursor)
}

fn cap_with_room(ctx: &mut GenContext<'_>, mode: &Mode, cursor: Pos, direction: Direction, chance: u8) {
    if ctx.rng.percent_roll(chance) {
        make_room(ctx, mode, cursor + direction, direction);
    }
}
