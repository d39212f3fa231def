//! Replay records: the ordered list of board commands issued during play.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Direction;

/// Command byte recorded for a shot.
pub const FIRE_BYTE: u8 = 32;

/// Board-level input recorded into replays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardCommand {
    /// Turn toward, or step in, the provided direction.
    Move(Direction),
    /// Fire while facing the provided direction.
    Fire(Direction),
}

impl BoardCommand {
    /// Symbol used by the textual record form.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Move(direction) => direction.symbol(),
            Self::Fire(Direction::North) => '0',
            Self::Fire(Direction::South) => '1',
            Self::Fire(Direction::West) => '2',
            Self::Fire(Direction::East) => '3',
        }
    }

    /// Parses a symbol produced by [`BoardCommand::symbol`].
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '0' => Some(Self::Fire(Direction::North)),
            '1' => Some(Self::Fire(Direction::South)),
            '2' => Some(Self::Fire(Direction::West)),
            '3' => Some(Self::Fire(Direction::East)),
            other => match Direction::from_symbol(other) {
                Some(direction) => Some(Self::Move(direction)),
                None => None,
            },
        }
    }

    /// Byte used by recorded command streams.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Fire(_) => FIRE_BYTE,
            Self::Move(Direction::West) => 37,
            Self::Move(Direction::North) => 38,
            Self::Move(Direction::East) => 39,
            Self::Move(Direction::South) => 40,
        }
    }
}

/// Failures raised while decoding replay records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// A command stream contained a byte outside the command table.
    #[error("unknown replay command byte {byte} at offset {offset}")]
    UnknownCommand {
        /// Offending byte.
        byte: u8,
        /// Position of the byte within the stream.
        offset: usize,
    },
    /// A textual record contained an unrecognised symbol.
    #[error("unknown replay symbol `{0}`")]
    UnknownSymbol(char),
}

/// Ordered list of board commands that can be replayed against a level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Replay {
    commands: Vec<BoardCommand>,
}

impl Replay {
    /// Creates a new replay from the provided commands.
    #[must_use]
    pub fn new(commands: Vec<BoardCommand>) -> Self {
        Self { commands }
    }

    /// Commands in issue order.
    #[must_use]
    pub fn commands(&self) -> &[BoardCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Reports whether the replay holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Decodes a recorded command stream.
    ///
    /// Shots carry no direction in the stream, so each one takes the facing
    /// implied by the last movement, starting from north.
    pub fn from_codes(bytes: &[u8]) -> Result<Self, ReplayError> {
        let mut facing = Direction::North;
        let commands = bytes
            .iter()
            .enumerate()
            .map(|(offset, &byte)| {
                let command = match byte {
                    FIRE_BYTE => BoardCommand::Fire(facing),
                    37 => BoardCommand::Move(Direction::West),
                    38 => BoardCommand::Move(Direction::North),
                    39 => BoardCommand::Move(Direction::East),
                    40 => BoardCommand::Move(Direction::South),
                    _ => return Err(ReplayError::UnknownCommand { byte, offset }),
                };
                if let BoardCommand::Move(direction) = command {
                    facing = direction;
                }
                Ok(command)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { commands })
    }

    /// Encodes the replay as a command stream.
    #[must_use]
    pub fn to_codes(&self) -> Vec<u8> {
        self.commands.iter().map(|command| command.code()).collect()
    }
}

impl From<Vec<BoardCommand>> for Replay {
    fn from(commands: Vec<BoardCommand>) -> Self {
        Self::new(commands)
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            write!(f, "{}", command.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for Replay {
    type Err = ReplayError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.chars()
            .filter(|symbol| !symbol.is_whitespace())
            .map(|symbol| BoardCommand::from_symbol(symbol).ok_or(ReplayError::UnknownSymbol(symbol)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}
