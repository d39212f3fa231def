//! Level records and the integer tile-code table used to author them.

use serde::{Deserialize, Serialize};

use crate::grid::{Coord, Direction, Position, BOARD_SIZE};
use crate::tile::{Board, MirrorOrientation, Occupant, Surface, Tile, TunnelColor};

/// Edge length of a level grid expressed as an array length.
const EDGE: usize = BOARD_SIZE as usize;

/// Tile code marking the tank start.
pub const TANK_CODE: u8 = 1;

/// First tile code reserved for tunnels.
pub const TUNNEL_CODE_BASE: u8 = 64;

/// Last tile code reserved for tunnels.
pub const TUNNEL_CODE_LAST: u8 = 95;

/// Authoring record for a single level.
///
/// The grid is stored column-major, `board[x][y]`, matching the level
/// packs the game ships with.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    /// Column-major tile codes.
    pub board: [[u8; EDGE]; EDGE],
    /// Display name of the level.
    #[serde(rename = "levelName")]
    pub name: String,
    /// Hint text shown on request.
    #[serde(default)]
    pub hint: String,
    /// Author credit.
    #[serde(default)]
    pub author: String,
    /// Difficulty score assigned by the author.
    #[serde(rename = "scoreDifficulty", default)]
    pub difficulty: u16,
}

/// Descriptive fields attached to a level grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LevelMeta {
    /// Display name of the level.
    pub name: String,
    /// Hint text shown on request.
    pub hint: String,
    /// Author credit.
    pub author: String,
    /// Difficulty score assigned by the author.
    pub difficulty: u16,
}

/// Board and tank start decoded from a [`Level`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedLevel {
    /// Decoded tile matrix.
    pub board: Board,
    /// Tank start, always facing north.
    pub tank: Position,
}

impl Level {
    /// Creates an all-dirt level with the provided metadata and no tank marker.
    #[must_use]
    pub fn empty(meta: LevelMeta) -> Self {
        Self {
            board: [[0; EDGE]; EDGE],
            name: meta.name,
            hint: meta.hint,
            author: meta.author,
            difficulty: meta.difficulty,
        }
    }

    /// Tile code stored for the coordinate, or `None` when off the board.
    #[must_use]
    pub fn code(&self, coord: Coord) -> Option<u8> {
        let x = usize::try_from(coord.x()).ok()?;
        let y = usize::try_from(coord.y()).ok()?;
        self.board.get(x)?.get(y).copied()
    }

    /// Overwrites the tile code for an on-board coordinate.
    pub fn set_code(&mut self, coord: Coord, code: u8) {
        let (Ok(x), Ok(y)) = (usize::try_from(coord.x()), usize::try_from(coord.y())) else {
            return;
        };
        if let Some(cell) = self.board.get_mut(x).and_then(|column| column.get_mut(y)) {
            *cell = code;
        }
    }

    /// Decodes the grid into a board and tank start.
    ///
    /// Unknown codes become dirt and are logged. When several tank markers
    /// are present the last one in column-major order wins; a level without
    /// one starts the tank at the origin.
    #[must_use]
    pub fn parse(&self) -> ParsedLevel {
        let mut board = Board::new();
        let mut tank = Position::new(Coord::new(0, 0), Direction::North);

        for (x, column) in self.board.iter().enumerate() {
            for (y, &code) in column.iter().enumerate() {
                let coord = Coord::new(x as i32, y as i32);
                if code == TANK_CODE {
                    tank = Position::new(coord, Direction::North);
                    continue;
                }
                let tile = decode_tile(code).unwrap_or_else(|| {
                    log::warn!(
                        "level `{}`: unknown tile code {code} at ({x}, {y}), using dirt",
                        self.name
                    );
                    Tile::default()
                });
                if let Some(slot) = board.tile_mut(coord) {
                    *slot = tile;
                }
            }
        }

        // The tank never shares a tile with an occupant.
        board.set_occupant(tank.coord, None);
        ParsedLevel { board, tank }
    }

    /// Encodes a board and tank start back into a level record.
    #[must_use]
    pub fn from_board(board: &Board, tank: Coord, meta: LevelMeta) -> Self {
        let mut level = Self::empty(meta);
        for (coord, tile) in board.iter() {
            level.set_code(coord, encode_tile(tile));
        }
        level.set_code(tank, TANK_CODE);
        level
    }
}

/// Maps a level code to its tile. Returns `None` for codes outside the table.
#[must_use]
pub fn decode_tile(code: u8) -> Option<Tile> {
    use Direction::*;
    use MirrorOrientation::*;

    let tile = match code {
        0 | TANK_CODE => Tile::default(),
        2 => Tile::bare(Surface::Flag),
        3 => Tile::bare(Surface::Water),
        4 => Tile::occupied(Occupant::SolidBlock),
        5 => Tile::occupied(Occupant::MovableBlock),
        6 => Tile::occupied(Occupant::Bricks),
        7 => Tile::occupied(Occupant::AntiTank(North)),
        8 => Tile::occupied(Occupant::AntiTank(East)),
        9 => Tile::occupied(Occupant::AntiTank(South)),
        10 => Tile::occupied(Occupant::AntiTank(West)),
        11 => Tile::occupied(Occupant::Mirror(NorthWest)),
        12 => Tile::occupied(Occupant::Mirror(NorthEast)),
        13 => Tile::occupied(Occupant::Mirror(SouthEast)),
        14 => Tile::occupied(Occupant::Mirror(SouthWest)),
        15 => Tile::bare(Surface::TankMover(North)),
        16 => Tile::bare(Surface::TankMover(East)),
        17 => Tile::bare(Surface::TankMover(South)),
        18 => Tile::bare(Surface::TankMover(West)),
        19 => Tile::occupied(Occupant::CrystalBlock),
        20 => Tile::occupied(Occupant::RotaryMirror(NorthWest)),
        21 => Tile::occupied(Occupant::RotaryMirror(NorthEast)),
        22 => Tile::occupied(Occupant::RotaryMirror(SouthEast)),
        23 => Tile::occupied(Occupant::RotaryMirror(SouthWest)),
        24 => Tile::bare(Surface::Ice),
        25 => Tile::bare(Surface::ThinIce),
        TUNNEL_CODE_BASE..=TUNNEL_CODE_LAST => {
            let color = TunnelColor::new((code & 15) >> 1)?;
            Tile::bare(Surface::Tunnel(color))
        }
        _ => return None,
    };
    Some(tile)
}

/// Maps a tile back to its level code.
///
/// Occupants take precedence over the surface underneath. Disabled
/// anti-tanks export as live ones and block-filled water as dirt, since the
/// code table has no separate entry for either.
#[must_use]
pub fn encode_tile(tile: &Tile) -> u8 {
    if let Some(occupant) = tile.occupant {
        return encode_occupant(occupant);
    }
    match tile.surface {
        Surface::Dirt | Surface::BlockInWater => 0,
        Surface::Flag => 2,
        Surface::Water => 3,
        Surface::TankMover(direction) => 15 + direction_offset(direction),
        Surface::Ice => 24,
        Surface::ThinIce => 25,
        Surface::Tunnel(color) => TUNNEL_CODE_BASE + 2 * color.index(),
    }
}

fn encode_occupant(occupant: Occupant) -> u8 {
    match occupant {
        Occupant::SolidBlock => 4,
        Occupant::MovableBlock => 5,
        Occupant::Bricks => 6,
        Occupant::AntiTank(direction) | Occupant::DeadAntiTank(direction) => {
            7 + direction_offset(direction)
        }
        Occupant::Mirror(orientation) => 11 + orientation_offset(orientation),
        Occupant::CrystalBlock => 19,
        Occupant::RotaryMirror(orientation) => 20 + orientation_offset(orientation),
    }
}

const fn direction_offset(direction: Direction) -> u8 {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

const fn orientation_offset(orientation: MirrorOrientation) -> u8 {
    match orientation {
        MirrorOrientation::NorthWest => 0,
        MirrorOrientation::NorthEast => 1,
        MirrorOrientation::SouthEast => 2,
        MirrorOrientation::SouthWest => 3,
    }
}
