//! Rectangular rooms: speculative placement, commit, exits and locking.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Direction, DoorKind, EntityKind, Pos, TileState};

use super::context::GenContext;
use super::decor::decorate;
use super::spawns::populate;
use super::zones::Mode;

pub const ROOM_ATTEMPTS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomSize {
    Small,
    Medium,
    Large,
}

impl RoomSize {
    /// Maps a `weighted_outcome` over small/medium/large; no outcome is small.
    pub fn from_outcome(outcome: usize) -> Self {
        match outcome {
            1 => RoomSize::Medium,
            2 => RoomSize::Large,
            _ => RoomSize::Small,
        }
    }
}

/// Inclusive bounds of a room plus where it was entered from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Room {
    pub left: i32,
    pub right: i32,
    pub down: i32,
    pub up: i32,
    pub size: RoomSize,
    pub entrance: Pos,
    pub approach: Direction,
}

impl Room {
    /// Rectangle of `width` x `height` cells whose wall facing back along
    /// `approach` contains `entrance`, centred on it laterally.
    pub fn anchored(entrance: Pos, approach: Direction, width: i32, height: i32, size: RoomSize) -> Self {
        let (left, down) = match approach {
            Direction::N => (entrance.x - width / 2, entrance.y),
            Direction::S => (entrance.x - width / 2, entrance.y - height + 1),
            Direction::E => (entrance.x, entrance.y - height / 2),
            Direction::W => (entrance.x - width + 1, entrance.y - height / 2),
        };
        Self {
            left,
            right: left + width - 1,
            down,
            up: down + height - 1,
            size,
            entrance,
            approach,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> i32 {
        self.up - self.down + 1
    }

    pub fn center(&self) -> Pos {
        Pos::new(self.left + self.width() / 2, self.down + self.height() / 2)
    }

    pub fn contains(&self, pos: Pos) -> bool {
        (self.left..=self.right).contains(&pos.x) && (self.down..=self.up).contains(&pos.y)
    }

    pub fn cells(&self) -> impl Iterator<Item = Pos> + use<> {
        let Room { left, right, down, up, .. } = *self;
        (down..=up).flat_map(move |y| (left..=right).map(move |x| Pos::new(x, y)))
    }

    /// The one-cell border just outside the room.
    pub fn ring(&self) -> impl Iterator<Item = Pos> + use<> {
        let outer = Room {
            left: self.left - 1,
            right: self.right + 1,
            down: self.down - 1,
            up: self.up + 1,
            ..*self
        };
        let inner = *self;
        outer.cells().filter(move |&pos| !inner.contains(pos))
    }

    /// The cell outside the entrance that the room is approached from.
    pub fn doorstep(&self) -> Pos {
        self.entrance - self.approach
    }

    /// Random non-corner cell on the wall facing `side`.
    fn exit_point(&self, ctx: &mut GenContext<'_>, side: Direction) -> Pos {
        match side {
            Direction::N => Pos::new(ctx.rng.range_int(self.left + 1, self.right - 1), self.up),
            Direction::S => Pos::new(ctx.rng.range_int(self.left + 1, self.right - 1), self.down),
            Direction::E => Pos::new(self.right, ctx.rng.range_int(self.down + 1, self.up - 1)),
            Direction::W => Pos::new(self.left, ctx.rng.range_int(self.down + 1, self.up - 1)),
        }
    }
}

fn round_up_to_even(value: i32) -> i32 {
    value + value % 2
}

/// Whether every cell of `room` is still empty. Off-map cells read as wall, so
/// rooms never hang over the edge.
pub(super) fn check_room(ctx: &GenContext<'_>, room: &Room) -> bool {
    room.cells().all(|pos| ctx.is_empty_at(pos))
}

/// Walls off every cell around `room` except its doorstep, which is floored, so
/// the entrance is the only way in. Cells already carved are left as they are.
pub(super) fn seal_room(ctx: &mut GenContext<'_>, room: &Room) {
    ctx.set_floor(room.doorstep());
    for pos in room.ring() {
        ctx.set_wall(pos);
    }
}

/// Nothing but the doorstep touches the room from outside yet.
fn can_seal(ctx: &GenContext<'_>, room: &Room) -> bool {
    let doorstep = room.doorstep();
    room.ring().all(|pos| pos == doorstep || ctx.get(pos) != TileState::Floor)
}

/// Tries up to [`ROOM_ATTEMPTS`] rectangles entered at `entrance` and commits
/// the first that fits.
pub(super) fn make_room(
    ctx: &mut GenContext<'_>,
    mode: &Mode,
    entrance: Pos,
    approach: Direction,
) -> Option<Room> {
    let size = RoomSize::from_outcome(ctx.rng.weighted_outcome(&mode.room_size.weights()));
    let span = ctx.config.room_dimensions.for_size(size);

    for _ in 0..ROOM_ATTEMPTS {
        let width = round_up_to_even(ctx.rng.range_int(span.min(), span.max()));
        let height = round_up_to_even(ctx.rng.range_int(span.min(), span.max()));
        let room = Room::anchored(entrance, approach, width, height, size);
        if check_room(ctx, &room) {
            commit_room(ctx, mode, &room);
            return Some(room);
        }
    }
    None
}

fn commit_room(ctx: &mut GenContext<'_>, mode: &Mode, room: &Room) {
    for pos in room.cells() {
        ctx.set_floor(pos);
    }
    decorate(ctx, mode, room);
    let locked = room.size == RoomSize::Large
        && ctx.rng.percent_roll(mode.locked_room_chance)
        && can_seal(ctx, room);
    let exits = if locked {
        seal_room(ctx, room);
        0
    } else {
        open_exits(ctx, mode, room)
    };
    let threat = populate(ctx, mode, room);
    if locked {
        ctx.spawn(EntityKind::Door(DoorKind::Silver), room.entrance);
    }
    ctx.rooms.push(*room);

    debug!(
        zone = %mode.name,
        size = ?room.size,
        width = room.width(),
        height = room.height(),
        exits,
        budget = threat.budget,
        spent = threat.spent,
        locked,
        "room committed"
    );
}

/// Rolls an exit for each wall. Returns how many exits were queued.
fn open_exits(ctx: &mut GenContext<'_>, mode: &Mode, room: &Room) -> usize {
    let mut queued = 0;
    for side in Direction::ALL {
        if !ctx.rng.percent_roll(mode.exit_chance) {
            continue;
        }
        let point = room.exit_point(ctx, side);
        if ctx.grid.is_out_of_bounds(point + side) {
            continue;
        }
        if open_exit(ctx, room, point, side) {
            queued += 1;
        }
    }
    queued
}

/// Re-floors the walk from `point` into the room until it meets a reachable
/// cell, then queues `point`.
fn open_exit(ctx: &mut GenContext<'_>, room: &Room, point: Pos, side: Direction) -> bool {
    let mut trail = Vec::new();
    let mut cell = point;
    loop {
        trail.push(cell);
        let inward = cell - side;
        if ctx.grid.is_tile_reachable(cell) || !room.contains(inward) {
            break;
        }
        cell = inward;
    }
    for pos in trail {
        ctx.set_floor(pos);
    }

    if ctx.grid.is_floor(point) && ctx.grid.is_tile_reachable(point) {
        ctx.enqueue(point)
    } else {
        false
    }
}
