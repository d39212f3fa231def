//! Tile tags and the board matrix.

use serde::{Deserialize, Serialize};

use crate::grid::{Coord, Direction, TILE_COUNT};

/// Number of distinct tunnel colors.
pub const TUNNEL_COLOR_COUNT: u8 = 8;

/// Color shared by linked tunnel tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TunnelColor(u8);

impl TunnelColor {
    /// Creates a tunnel color from its index, rejecting values past the palette.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index < TUNNEL_COLOR_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Palette index of the color.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }
}

/// Base layer of a tile. Always present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surface {
    /// Plain walkable ground.
    Dirt,
    /// Goal tile; the tank reaching it wins.
    Flag,
    /// Deep water; sinks blocks and drowns a resting tank.
    Water,
    /// Water filled by a sunken movable block; behaves like dirt.
    BlockInWater,
    /// Slippery ice that keeps things sliding.
    Ice,
    /// Ice that turns into water once something leaves it.
    ThinIce,
    /// Conveyor that pushes the tank one tile in its direction.
    TankMover(Direction),
    /// Teleporter linked to every other tunnel of the same color.
    Tunnel(TunnelColor),
}

impl Surface {
    /// Reports whether the surface is one of the ice variants.
    #[must_use]
    pub const fn is_ice(&self) -> bool {
        matches!(self, Self::Ice | Self::ThinIce)
    }

    /// Reports whether the surface is a tank mover of any direction.
    #[must_use]
    pub const fn is_tank_mover(&self) -> bool {
        matches!(self, Self::TankMover(_))
    }
}

/// Orientation of a mirror, named after its two non-reflecting faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MirrorOrientation {
    /// Back faces north and west.
    NorthWest,
    /// Back faces north and east.
    NorthEast,
    /// Back faces south and east.
    SouthEast,
    /// Back faces south and west.
    SouthWest,
}

impl MirrorOrientation {
    /// The two back faces, expressed as the travel directions that hit them.
    #[must_use]
    pub const fn back_faces(self) -> [Direction; 2] {
        match self {
            Self::NorthWest => [Direction::North, Direction::West],
            Self::NorthEast => [Direction::North, Direction::East],
            Self::SouthEast => [Direction::South, Direction::East],
            Self::SouthWest => [Direction::South, Direction::West],
        }
    }

    /// Exit direction of a laser travelling `travel` into the mirror.
    ///
    /// Returns `None` when the laser strikes the back of the mirror.
    #[must_use]
    pub fn reflect(self, travel: Direction) -> Option<Direction> {
        let [first, second] = self.back_faces();
        if travel == first || travel == second {
            None
        } else if travel == first.reverse() {
            Some(second)
        } else {
            Some(first)
        }
    }

    /// Orientation after a quarter turn clockwise.
    #[must_use]
    pub const fn rotated(self) -> Self {
        match self {
            Self::NorthWest => Self::NorthEast,
            Self::NorthEast => Self::SouthEast,
            Self::SouthEast => Self::SouthWest,
            Self::SouthWest => Self::NorthWest,
        }
    }
}

/// Optional blocking layer of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    /// Immovable block that absorbs lasers.
    SolidBlock,
    /// Block pushed one tile by a laser hit.
    MovableBlock,
    /// Immovable block that absorbs lasers.
    CrystalBlock,
    /// Wall destroyed by a single laser hit.
    Bricks,
    /// Turret firing along its facing whenever it sees the tank.
    AntiTank(Direction),
    /// Disabled turret; absorbs lasers and never moves.
    DeadAntiTank(Direction),
    /// Fixed mirror that reflects lasers and is pushed when hit from behind.
    Mirror(MirrorOrientation),
    /// Mirror that rotates instead of moving when hit from behind.
    RotaryMirror(MirrorOrientation),
}

/// One board cell: a surface plus an optional occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Base layer.
    pub surface: Surface,
    /// Blocking layer, if any.
    pub occupant: Option<Occupant>,
}

impl Tile {
    /// Tile with the provided surface and nothing on top.
    #[must_use]
    pub const fn bare(surface: Surface) -> Self {
        Self {
            surface,
            occupant: None,
        }
    }

    /// Dirt tile carrying the provided occupant.
    #[must_use]
    pub const fn occupied(occupant: Occupant) -> Self {
        Self {
            surface: Surface::Dirt,
            occupant: Some(occupant),
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::bare(Surface::Dirt)
    }
}

/// Dense 16×16 tile matrix stored in row-major order.
///
/// Cloning deep-copies every tile, so snapshots never alias live state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    tiles: Vec<Tile>,
}

impl Board {
    /// Creates a board covered in dirt.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tiles: vec![Tile::default(); TILE_COUNT],
        }
    }

    /// Tile at the provided coordinate, if it lies on the board.
    #[must_use]
    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        coord.index().and_then(|index| self.tiles.get(index))
    }

    /// Mutable tile at the provided coordinate, if it lies on the board.
    pub fn tile_mut(&mut self, coord: Coord) -> Option<&mut Tile> {
        coord.index().and_then(|index| self.tiles.get_mut(index))
    }

    /// Surface at the coordinate, if it lies on the board.
    #[must_use]
    pub fn surface(&self, coord: Coord) -> Option<Surface> {
        self.tile(coord).map(|tile| tile.surface)
    }

    /// Occupant at the coordinate, if any.
    #[must_use]
    pub fn occupant(&self, coord: Coord) -> Option<Occupant> {
        self.tile(coord).and_then(|tile| tile.occupant)
    }

    /// Reports whether the coordinate is on the board and free of occupants.
    #[must_use]
    pub fn is_available(&self, coord: Coord) -> bool {
        self.tile(coord).map_or(false, |tile| tile.occupant.is_none())
    }

    /// Replaces the surface at the coordinate. Off-board writes are ignored.
    pub fn set_surface(&mut self, coord: Coord, surface: Surface) {
        if let Some(tile) = self.tile_mut(coord) {
            tile.surface = surface;
        }
    }

    /// Replaces the occupant at the coordinate. Off-board writes are ignored.
    pub fn set_occupant(&mut self, coord: Coord, occupant: Option<Occupant>) {
        if let Some(tile) = self.tile_mut(coord) {
            tile.occupant = occupant;
        }
    }

    /// Removes and returns the occupant at the coordinate.
    pub fn take_occupant(&mut self, coord: Coord) -> Option<Occupant> {
        self.tile_mut(coord).and_then(|tile| tile.occupant.take())
    }

    /// Iterates over every tile in row-major order together with its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| (Coord::from_index(index), tile))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
