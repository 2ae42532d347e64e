// The game board: 19 hexagons of 6 triangles each, 114 cells in total.
//
// Cells are addressed in triangular coordinates. The grid stores them in a
// 15x10 array shifted by (SHIFT_X, SHIFT_Y) so every valid coordinate maps to
// a non-negative index. Anything outside the 114 generated cells reads as
// `None`, which the movement code treats as "off the board".
//
// `step` holds the direction tables. They define adjacency for the whole game
// and must not be changed without changing every client.

use msgs::{color::Color, coord::{Coord, Facing}};
use rand::Rng;

const WIDTH: usize = 15;
const HEIGHT: usize = 10;
const SHIFT_X: i32 = 8;
const SHIFT_Y: i32 = 5;

pub type Grid = [[Option<Color>; HEIGHT]; WIDTH];

/// Centers of the 19 hexagons.
pub const HEXES: [(i32, i32); 19] = [
              ( 0, -4),
        (-3, -3), ( 3, -3),
    (-6, -2), ( 0, -2), ( 6, -2),
        (-3, -1), ( 3, -1),
    (-6,  0), ( 0,  0), ( 6,  0),
        (-3,  1), ( 3,  1),
    (-6,  2), ( 0,  2), ( 6,  2),
        (-3,  3), ( 3,  3),
              ( 0,  4),
];

/// Triangle offsets within a hexagon. Robot `i` starts on offset `i` of the
/// center hexagon, so the order matters.
pub const TRIANGLES: [(i32, i32); 6] = [(-1, 0), (0, 0), (0, -1), (-1, -1), (-2, -1), (-2, 0)];

const RIGHT_STEPS: [(i32, i32); 6] = [(0, 1), (1, 0), (1, 0), (0, -1), (-1, 0), (-1, 0)];
const LEFT_STEPS: [(i32, i32); 6] = [(1, 0), (0, -1), (-1, 0), (-1, 0), (0, 1), (1, 0)];

/// The cell one step ahead of `from` when facing `facing` with the given bias.
pub fn step(from: Coord, facing: Facing, is_right: bool) -> Coord {
    let steps = if is_right { &RIGHT_STEPS } else { &LEFT_STEPS };
    from.offset(steps[facing.index()])
}

/// All 114 valid cells, hexagon by hexagon.
pub fn cells() -> impl Iterator<Item = Coord> {
    HEXES.iter().flat_map(|&(hex_x, hex_y)| {
        TRIANGLES.iter().map(move |&(tri_x, tri_y)| Coord::new(hex_x + tri_x, hex_y + tri_y))
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
}

impl Board {
    /// Colors every cell independently and uniformly at random.
    pub fn generate(rng: &mut impl Rng) -> Board {
        let mut grid: Grid = [[None; HEIGHT]; WIDTH];
        for coord in cells() {
            if let Some((i, j)) = Self::slot(coord) {
                grid[i][j] = Some(Color::ALL[rng.gen_range(0..Color::ALL.len())]);
            }
        }
        Board { grid }
    }

    /// Builds a board from a raw grid, indexed `[x + 8][y + 5]`.
    pub fn from_grid(grid: Grid) -> Board {
        Board { grid }
    }

    pub fn get(&self, coord: Coord) -> Option<Color> {
        let (i, j) = Self::slot(coord)?;
        self.grid[i][j]
    }

    fn slot(coord: Coord) -> Option<(usize, usize)> {
        let i = usize::try_from(coord.x.checked_add(SHIFT_X)?).ok()?;
        let j = usize::try_from(coord.y.checked_add(SHIFT_Y)?).ok()?;
        (i < WIDTH && j < HEIGHT).then_some((i, j))
    }
}
