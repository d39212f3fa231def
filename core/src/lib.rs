#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Laser Tank engine.
//!
//! This crate defines the message surface that connects adapters, the
//! session, the authoritative world, and pure systems. The session submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point and broadcasts [`Event`] values
//! describing what happened. Adapters drive the session with
//! [`SessionCommand`] values.

mod grid;
mod level;
mod replay;
mod tile;

use serde::{Deserialize, Serialize};

pub use grid::{Coord, Direction, Position, BOARD_SIZE, TILE_COUNT};
pub use level::{
    decode_tile, encode_tile, Level, LevelMeta, ParsedLevel, TANK_CODE, TUNNEL_CODE_BASE,
    TUNNEL_CODE_LAST,
};
pub use replay::{BoardCommand, Replay, ReplayError, FIRE_BYTE};
pub use tile::{
    Board, MirrorOrientation, Occupant, Surface, Tile, TunnelColor, TUNNEL_COLOR_COUNT,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Laser Tank.";

/// Maximum number of cells a single shot may travel before it dissipates.
pub const LASER_MAX_STEPS: u32 = 4 * TILE_COUNT as u32;

/// Outcome of the active attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The attempt is still in progress.
    #[default]
    Playing,
    /// The tank reached a flag.
    Win,
    /// The tank was destroyed or drowned.
    Fail,
}

impl GameStatus {
    /// Reports whether the attempt has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Playing)
    }
}

/// Content written to a cell by the level editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// Replace the whole tile.
    Tile(Tile),
    /// Move the tank start onto a dirt tile at the cell.
    Tank,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the playfield with a freshly parsed level.
    LoadLevel {
        /// Decoded tile matrix.
        board: Board,
        /// Starting tank position.
        tank: Position,
    },
    /// Turns the tank toward the direction, or steps when already facing it.
    Move {
        /// Requested direction.
        direction: Direction,
    },
    /// Fires the tank's laser along its facing.
    Fire,
    /// Advances the frame resolution engine by one tick.
    RenderFrame,
    /// Writes editor content into a cell.
    PlaceTile {
        /// Cell being edited.
        coord: Coord,
        /// Content written to the cell.
        placement: Placement,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level replaced the playfield.
    LevelLoaded {
        /// Starting tank position.
        tank: Position,
    },
    /// The tank turned in place.
    TankTurned {
        /// New facing.
        direction: Direction,
    },
    /// The tank moved between two cells.
    TankMoved {
        /// Cell the tank left.
        from: Coord,
        /// Cell the tank entered.
        to: Coord,
    },
    /// A new shot entered the board.
    LaserFired {
        /// Cell and travel direction of the shot.
        origin: Position,
    },
    /// The laser head advanced into an empty cell.
    LaserMoved {
        /// New head position.
        position: Position,
    },
    /// A mirror redirected the laser.
    LaserReflected {
        /// Cell of the mirror and the outgoing direction.
        position: Position,
    },
    /// An occupant stopped the laser.
    LaserAbsorbed {
        /// Cell of the absorbing occupant.
        at: Coord,
    },
    /// The laser left the board.
    LaserExited {
        /// Last on-board cell the laser occupied.
        from: Coord,
    },
    /// The laser exceeded its travel budget.
    LaserDissipated {
        /// Cell the laser occupied when it faded.
        at: Coord,
    },
    /// An occupant moved between two cells.
    OccupantMoved {
        /// Occupant that moved.
        occupant: Occupant,
        /// Cell it left.
        from: Coord,
        /// Cell it entered.
        to: Coord,
    },
    /// An occupant was destroyed by the laser.
    OccupantDestroyed {
        /// Occupant that was destroyed.
        occupant: Occupant,
        /// Cell it occupied.
        at: Coord,
    },
    /// An occupant fell into water.
    OccupantSunk {
        /// Occupant that sank.
        occupant: Occupant,
        /// Water cell it sank into.
        at: Coord,
    },
    /// A rotary mirror turned a quarter.
    MirrorRotated {
        /// Cell of the mirror.
        at: Coord,
        /// Orientation after the turn.
        orientation: MirrorOrientation,
    },
    /// An anti-tank was disabled by a hit on its gun face.
    AntiTankDisabled {
        /// Cell of the turret.
        at: Coord,
    },
    /// Something passed through a tunnel.
    Teleported {
        /// Entry tunnel.
        from: Coord,
        /// Exit tunnel.
        to: Coord,
    },
    /// A surface changed in place.
    SurfaceChanged {
        /// Cell whose surface changed.
        at: Coord,
        /// Surface after the change.
        surface: Surface,
    },
    /// The attempt reached a new status.
    StatusChanged {
        /// Status after the change.
        status: GameStatus,
    },
    /// The editor wrote content into a cell.
    TilePlaced {
        /// Cell that was edited.
        coord: Coord,
        /// Content written to the cell.
        placement: Placement,
    },
}

/// High-level inputs accepted by the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    /// Turn or step in a direction.
    Move(Direction),
    /// Fire along the current facing.
    Fire,
    /// Turn toward a cell along its dominant axis, then fire.
    FireToward {
        /// Cell being aimed at.
        target: Coord,
    },
    /// Revert the last accepted board command.
    Undo,
    /// Reload the current level, keeping the undo history.
    Restart,
    /// Capture the single save-position checkpoint.
    SavePosition,
    /// Return to the save-position checkpoint.
    RestorePosition,
    /// Load the next level of the pack.
    NextLevel,
    /// Load the previous level of the pack.
    PrevLevel,
    /// Scrub one frame back in the last action.
    PrevFrame,
    /// Scrub one frame forward in the last action.
    NextFrame,
    /// Restart the level and load a replay for stepping.
    LoadReplay(Replay),
    /// Issue the next replay command.
    StepReplay,
    /// Revert the most recent replay command.
    StepReplayBack,
    /// Discard the loaded replay.
    CloseReplay,
    /// Toggle automatic replay stepping.
    ToggleAutoReplay,
    /// Write editor content into a cell.
    Edit {
        /// Cell being edited.
        coord: Coord,
        /// Content written to the cell.
        placement: Placement,
    },
    /// Plan a route to a cell and walk it one step per tick.
    Navigate {
        /// Destination cell.
        goal: Coord,
    },
}

#[cfg(test)]
mod tests {
    use super::{BoardCommand, Coord, Direction, GameStatus, Placement, Position, Tile};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(Coord::new(3, 9), Direction::West));
    }

    #[test]
    fn board_command_round_trips_through_bincode() {
        assert_round_trip(&BoardCommand::Fire(Direction::South));
    }

    #[test]
    fn placement_round_trips_through_bincode() {
        assert_round_trip(&Placement::Tile(Tile::default()));
        assert_round_trip(&Placement::Tank);
    }

    #[test]
    fn only_playing_is_non_terminal() {
        assert!(!GameStatus::Playing.is_terminal());
        assert!(GameStatus::Win.is_terminal());
        assert!(GameStatus::Fail.is_terminal());
    }

    #[test]
    fn laser_budget_covers_four_passes_over_the_board() {
        assert_eq!(super::LASER_MAX_STEPS, 1024);
    }
}
