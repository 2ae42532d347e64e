// Triangular coordinates. Every unit cell is a triangle; the (x, y) pair is
// purely combinatorial and only meaningful together with the board's
// direction tables.

use thiserror::Error;

/// A cell address, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Coord {
        Coord { x, y }
    }

    pub fn offset(&self, (dx, dy): (i32, i32)) -> Coord {
        Coord::new(self.x + dx, self.y + dy)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Coord {
        Coord { x, y }
    }
}

impl From<Coord> for (i32, i32) {
    fn from(coord: Coord) -> (i32, i32) {
        (coord.x, coord.y)
    }
}

/// One of the six directions a robot can face.
///
/// 0 down-right, 1 up-right, 2 up, 3 up-left, 4 down-left, 5 down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Facing(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("facing out of range: {0}")]
pub struct InvalidFacing(pub u8);

impl Facing {
    pub const COUNT: u8 = 6;

    pub fn from_index(index: u8) -> Option<Facing> {
        (index < Self::COUNT).then_some(Facing(index))
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Turns by `amount` sixths of a full turn. Negative amounts turn the
    /// other way; the result always lands in `0..6`.
    pub fn rotate(&self, amount: i8) -> Facing {
        let turned = (i16::from(self.0) + i16::from(amount)).rem_euclid(i16::from(Self::COUNT));
        Facing(turned as u8)
    }
}

impl TryFrom<u8> for Facing {
    type Error = InvalidFacing;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Facing::from_index(index).ok_or(InvalidFacing(index))
    }
}

impl From<Facing> for u8 {
    fn from(facing: Facing) -> u8 {
        facing.0
    }
}

/// Position plus facing, as shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Pose {
    pub x: i32,
    pub y: i32,
    pub facing: Facing,
}

impl Pose {
    pub fn new(coord: Coord, facing: Facing) -> Pose {
        Pose { x: coord.x, y: coord.y, facing }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}
