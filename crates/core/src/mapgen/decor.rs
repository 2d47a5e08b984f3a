//! Cut-outs that give committed rooms some shape. Decorations only delete.

use crate::types::Pos;

use super::context::GenContext;
use super::rooms::Room;
use super::zones::Mode;

const MIDDLE_PILLAR_MIN: i32 = 6;
const CROSS_PILLAR_MIN: i32 = 10;
const COURTYARD_MIN: i32 = 8;
const ROUNDING_MIN: i32 = 6;
const CROSS_STRIDE: usize = 5;

/// Rows top to bottom, `#` marks a removed cell.
const MIDDLE_PILLAR: [&str; 3] = [".##.", "####", ".##."];

pub(super) fn decorate(ctx: &mut GenContext<'_>, mode: &Mode, room: &Room) {
    if fits(room, MIDDLE_PILLAR_MIN) && ctx.rng.percent_roll(mode.middle_pillar_chance) {
        middle_pillar(ctx, room);
    }
    if fits(room, CROSS_PILLAR_MIN) && ctx.rng.percent_roll(mode.cross_pillar_chance) {
        cross_pillars(ctx, room);
    } else if fits(room, COURTYARD_MIN) && ctx.rng.percent_roll(mode.courtyard_wall_chance) {
        courtyard_walls(ctx, room);
    }
    if fits(room, ROUNDING_MIN) && ctx.rng.percent_roll(mode.rounded_chance) {
        round_corners(ctx, room);
    }
}

fn fits(room: &Room, min: i32) -> bool {
    room.width() >= min && room.height() >= min
}

fn middle_pillar(ctx: &mut GenContext<'_>, room: &Room) {
    let center = room.center();
    for (row, pattern) in MIDDLE_PILLAR.iter().enumerate() {
        let y = center.y + 1 - row as i32;
        for (col, mark) in pattern.chars().enumerate() {
            if mark == '#' {
                ctx.delete(Pos::new(center.x - 2 + col as i32, y));
            }
        }
    }
}

fn cross_pillars(ctx: &mut GenContext<'_>, room: &Room) {
    let inset = room.height() / 3 - 1;
    for y in [room.down + inset, room.up - inset] {
        for x in (room.left + 2..=room.right - 2).step_by(CROSS_STRIDE) {
            let hub = Pos::new(x, y);
            ctx.delete(hub);
            for arm in hub.neighbors() {
                ctx.delete(arm);
            }
        }
    }
}

fn courtyard_walls(ctx: &mut GenContext<'_>, room: &Room) {
    let arm_x = room.width() / 4;
    let arm_y = room.height() / 4;
    let corners = [
        (Pos::new(room.left + 1, room.down + 1), 1, 1),
        (Pos::new(room.right - 1, room.down + 1), -1, 1),
        (Pos::new(room.left + 1, room.up - 1), 1, -1),
        (Pos::new(room.right - 1, room.up - 1), -1, -1),
    ];
    for (corner, step_x, step_y) in corners {
        for i in 0..arm_x {
            ctx.delete(Pos::new(corner.x + step_x * i, corner.y));
        }
        for j in 1..arm_y {
            ctx.delete(Pos::new(corner.x, corner.y + step_y * j));
        }
    }
}

/// Staircase cut of depth `min(width, height) / 4` in every corner.
fn round_corners(ctx: &mut GenContext<'_>, room: &Room) {
    let depth = room.width().min(room.height()) / 4;
    let corners = [
        (Pos::new(room.left, room.down), 1, 1),
        (Pos::new(room.right, room.down), -1, 1),
        (Pos::new(room.left, room.up), 1, -1),
        (Pos::new(room.right, room.up), -1, -1),
    ];
    for (corner, step_x, step_y) in corners {
        for row in 0..depth {
            for col in 0..depth - row {
                ctx.delete(Pos::new(corner.x + step_x * col, corner.y + step_y * row));
            }
        }
    }
}
