//! Board geometry: coordinates, cardinal directions and oriented positions.

use serde::{Deserialize, Serialize};

/// Number of tiles along each edge of the square board.
pub const BOARD_SIZE: i32 = 16;

/// Total number of tiles contained in the board.
pub const TILE_COUNT: usize = (BOARD_SIZE * BOARD_SIZE) as usize;

/// Cardinal directions used for facing, travel and tile orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Column and row offsets applied when stepping in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Single-letter symbol used by textual records.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::North => 'N',
            Self::East => 'E',
            Self::South => 'S',
            Self::West => 'W',
        }
    }

    /// Parses the single-letter symbol produced by [`Direction::symbol`].
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'N' => Some(Self::North),
            'E' => Some(Self::East),
            'S' => Some(Self::South),
            'W' => Some(Self::West),
            _ => None,
        }
    }
}

/// Location of a single tile expressed as column and row.
///
/// Coordinates may point outside the board; stepping off an edge is how
/// lasers and rays terminate, so bounds are checked where it matters rather
/// than at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    x: i32,
    y: i32,
}

impl Coord {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Reports whether the coordinate lies on the board.
    #[must_use]
    pub const fn in_bounds(&self) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < BOARD_SIZE && self.y < BOARD_SIZE
    }

    /// Row-major index of the coordinate, or `None` when off the board.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        if !self.in_bounds() {
            return None;
        }
        let row = usize::try_from(self.y).ok()?;
        let column = usize::try_from(self.x).ok()?;
        Some(row * BOARD_SIZE as usize + column)
    }

    /// Inverse of [`Coord::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        let width = BOARD_SIZE as usize;
        Self::new((index % width) as i32, (index / width) as i32)
    }

    /// Neighbouring coordinate one step in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub const fn manhattan_distance(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Cardinal direction leading from `self` to `other`.
    ///
    /// Only axis-aligned, distinct pairs have a direction; any distance along
    /// the shared axis is accepted.
    #[must_use]
    pub fn direction_to(self, other: Coord) -> Option<Direction> {
        if self == other {
            return None;
        }
        if self.x == other.x {
            Some(if self.y > other.y {
                Direction::North
            } else {
                Direction::South
            })
        } else if self.y == other.y {
            Some(if self.x > other.x {
                Direction::West
            } else {
                Direction::East
            })
        } else {
            None
        }
    }
}

/// Coordinate paired with a direction.
///
/// Used for the tank (facing), the laser head (travel direction) and
/// occupants in motion (push direction).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Tile the position refers to.
    pub coord: Coord,
    /// Facing or travel direction.
    pub direction: Direction,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(coord: Coord, direction: Direction) -> Self {
        Self { coord, direction }
    }

    /// Position one tile further along the current direction.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::new(self.coord.step(self.direction), self.direction)
    }

    /// Same tile, different direction.
    #[must_use]
    pub const fn facing(self, direction: Direction) -> Self {
        Self::new(self.coord, direction)
    }

    /// Reports whether two positions share a tile regardless of direction.
    #[must_use]
    pub fn same_coord(&self, other: &Position) -> bool {
        self.coord == other.coord
    }
}
