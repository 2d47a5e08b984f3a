use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Grid-relative cell coordinate. The origin is the map centre and `+y` points north.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const ORIGIN: Pos = Pos { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn distance_from_origin(self) -> f64 {
        f64::from(self.x).hypot(f64::from(self.y))
    }

    pub fn neighbors(self) -> [Pos; 4] {
        Direction::ALL.map(|direction| self + direction)
    }
}

impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Add<Direction> for Pos {
    type Output = Pos;

    fn add(self, rhs: Direction) -> Pos {
        self + rhs.offset()
    }
}

impl AddAssign<Direction> for Pos {
    fn add_assign(&mut self, rhs: Direction) {
        *self = *self + rhs;
    }
}

impl Sub for Pos {
    type Output = Pos;

    fn sub(self, rhs: Pos) -> Pos {
        Pos { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Sub<Direction> for Pos {
    type Output = Pos;

    fn sub(self, rhs: Direction) -> Pos {
        self - rhs.offset()
    }
}

impl Neg for Pos {
    type Output = Pos;

    fn neg(self) -> Pos {
        Pos { x: -self.x, y: -self.y }
    }
}

impl Mul<i32> for Pos {
    type Output = Pos;

    fn mul(self, rhs: i32) -> Pos {
        Pos { x: self.x * rhs, y: self.y * rhs }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    E,
    S,
    W,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];

    pub const fn offset(self) -> Pos {
        match self {
            Direction::N => Pos::new(0, 1),
            Direction::E => Pos::new(1, 0),
            Direction::S => Pos::new(0, -1),
            Direction::W => Pos::new(-1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::N => Direction::S,
            Direction::E => Direction::W,
            Direction::S => Direction::N,
            Direction::W => Direction::E,
        }
    }

    /// The two directions orthogonal to `self`, counter-clockwise first.
    pub const fn sides(self) -> (Direction, Direction) {
        match self {
            Direction::N => (Direction::W, Direction::E),
            Direction::E => (Direction::N, Direction::S),
            Direction::S => (Direction::E, Direction::W),
            Direction::W => (Direction::S, Direction::N),
        }
    }

    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::N | Direction::S)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileState {
    #[default]
    Empty,
    Floor,
    Wall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Spread,
    Tank,
    Ultra,
    Boss,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Heart,
    HealthBoost,
    SpeedBoost,
    ShotBoost,
    SilverKey,
    GoldKey,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DoorKind {
    Silver,
    Gold,
}

/// Everything the generator can ask a placer to spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Floor,
    Wall,
    Player,
    Camera,
    CameraTarget,
    CinematicAnchor,
    Portal,
    Door(DoorKind),
    Enemy(EnemyKind),
    Pickup(PickupKind),
}

impl EntityKind {
    pub fn is_enemy(self) -> bool {
        matches!(self, EntityKind::Enemy(_))
    }

    pub fn is_tile(self) -> bool {
        matches!(self, EntityKind::Floor | EntityKind::Wall)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub kind: EntityKind,
    pub pos: Pos,
}

impl Placement {
    pub fn world_position(&self, tile_scale: f32) -> (f32, f32) {
        (self.pos.x as f32 * tile_scale, self.pos.y as f32 * tile_scale)
    }
}
