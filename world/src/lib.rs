#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative playfield state for Laser Tank.
//!
//! The world owns the board, the tank, the laser in flight and the queues of
//! in-flight occupant transfers. It mutates only through [`apply`], reports
//! what happened through [`Event`] values, and exposes read-only accessors in
//! [`query`].

mod frame;
mod tiles;

use laser_tank_core::{
    Board, Command, Coord, Direction, Event, GameStatus, Placement, Position, Surface, Tile,
    WELCOME_BANNER,
};

use crate::frame::Frame;

/// Occupant transfer queued between two cells and not yet landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PendingMove {
    /// Cell the occupant is leaving, with the push direction.
    pub from: Position,
    /// Cell the occupant is heading for.
    pub to: Position,
}

impl PendingMove {
    /// Creates a transfer one cell along the direction of `from`.
    #[must_use]
    pub const fn push(from: Position) -> Self {
        Self {
            from,
            to: from.next(),
        }
    }
}

/// Complete simulation state that undo, save-position and frame scrubbing
/// capture and restore.
///
/// Cloning deep-copies the board, so a stored playfield never observes later
/// mutations of the live one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Playfield {
    pub(crate) board: Board,
    pub(crate) tank: Position,
    pub(crate) prev_tank: Position,
    pub(crate) laser: Option<Position>,
    pub(crate) laser_steps: u32,
    pub(crate) pending: Vec<PendingMove>,
    pub(crate) pending_tunnels: Vec<Position>,
    pub(crate) tank_step: Option<Direction>,
    pub(crate) status: GameStatus,
}

impl Playfield {
    /// Creates a quiescent playfield with the tank at rest.
    #[must_use]
    pub fn new(board: Board, tank: Position) -> Self {
        Self {
            board,
            tank,
            prev_tank: tank,
            laser: None,
            laser_steps: 0,
            pending: Vec::new(),
            pending_tunnels: Vec::new(),
            tank_step: None,
            status: GameStatus::Playing,
        }
    }

    /// Tile matrix.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current tank position and facing.
    #[must_use]
    pub const fn tank(&self) -> Position {
        self.tank
    }

    /// Tank position before its latest step.
    #[must_use]
    pub const fn prev_tank(&self) -> Position {
        self.prev_tank
    }

    /// Laser head, if a shot is in flight.
    #[must_use]
    pub const fn laser(&self) -> Option<Position> {
        self.laser
    }

    /// Occupant transfers awaiting resolution.
    #[must_use]
    pub fn pending(&self) -> &[PendingMove] {
        &self.pending
    }

    /// Tunnel mouths waiting for a free exit.
    #[must_use]
    pub fn pending_tunnels(&self) -> &[Position] {
        &self.pending_tunnels
    }

    /// Forced tank step scheduled for the next tick.
    #[must_use]
    pub const fn tank_step(&self) -> Option<Direction> {
        self.tank_step
    }

    /// Outcome of the attempt.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    fn is_quiescent(&self) -> bool {
        self.laser.is_none() && self.pending.is_empty() && self.tank_step.is_none()
    }
}

/// Represents the authoritative Laser Tank world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    field: Playfield,
    rendering: bool,
    tick_index: u64,
}

impl World {
    /// Creates a world holding an empty dirt board with the tank at the origin.
    #[must_use]
    pub fn new() -> Self {
        let tank = Position::new(Coord::new(0, 0), Direction::North);
        Self {
            banner: WELCOME_BANNER,
            field: Playfield::new(Board::new(), tank),
            rendering: false,
            tick_index: 0,
        }
    }

    fn turn_tank(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        self.field.tank.direction = direction;
        self.field.prev_tank = self.field.tank;
        out_events.push(Event::TankTurned { direction });
        self.rendering = true;
    }

    fn step_tank(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        let mut frame = Frame::new(&mut self.field, out_events);
        frame.step_tank(direction);
        frame.finish();
        self.rendering = !self.field.status.is_terminal();
    }

    fn fire(&mut self, out_events: &mut Vec<Event>) {
        let origin = self.field.tank;
        self.field.laser = Some(origin);
        self.field.laser_steps = 0;
        out_events.push(Event::LaserFired { origin });
        self.rendering = true;
    }

    fn render_frame(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        if self.field.status.is_terminal() {
            self.rendering = false;
            return;
        }

        let mut frame = Frame::new(&mut self.field, out_events);
        frame.tick();

        self.rendering = self.field.status == GameStatus::Playing && !self.field.is_quiescent();
    }

    fn place(&mut self, coord: Coord, placement: Placement, out_events: &mut Vec<Event>) {
        if !coord.in_bounds() {
            return;
        }
        match placement {
            Placement::Tank => {
                self.field.board.set_surface(coord, Surface::Dirt);
                self.field.board.set_occupant(coord, None);
                let tank = Position::new(coord, Direction::North);
                self.field.tank = tank;
                self.field.prev_tank = tank;
            }
            Placement::Tile(tile) => {
                if tile.occupant.is_some() && coord == self.field.tank.coord {
                    log::debug!("rejected occupant placement on the tank at {coord:?}");
                    return;
                }
                if let Some(slot) = self.field.board.tile_mut(coord) {
                    *slot = tile;
                }
            }
        }
        out_events.push(Event::TilePlaced { coord, placement });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Board commands that [`query::accepts`] rejects are ignored without any
/// state change or event.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if !query::accepts(world, &command) {
        log::debug!("ignored {command:?} while the world is busy");
        return;
    }

    match command {
        Command::LoadLevel { board, tank } => {
            world.field = Playfield::new(board, tank);
            world.rendering = false;
            out_events.push(Event::LevelLoaded { tank });
        }
        Command::Move { direction } => {
            if world.field.tank.direction == direction {
                world.step_tank(direction, out_events);
            } else {
                world.turn_tank(direction, out_events);
            }
        }
        Command::Fire => world.fire(out_events),
        Command::RenderFrame => world.render_frame(out_events),
        Command::PlaceTile { coord, placement } => world.place(coord, placement, out_events),
    }
}

/// Replaces the live playfield with a stored snapshot and stops rendering.
pub fn restore(world: &mut World, field: Playfield) {
    world.field = field;
    world.rendering = false;
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{PendingMove, Playfield, World};
    use laser_tank_core::{Board, Command, GameStatus, Position};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the tile matrix.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.field.board
    }

    /// Current tank position and facing.
    #[must_use]
    pub fn tank(world: &World) -> Position {
        world.field.tank
    }

    /// Tank position before its latest step.
    #[must_use]
    pub fn previous_tank(world: &World) -> Position {
        world.field.prev_tank
    }

    /// Laser head, if a shot is in flight.
    #[must_use]
    pub fn laser(world: &World) -> Option<Position> {
        world.field.laser
    }

    /// Outcome of the active attempt.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.field.status
    }

    /// Occupant transfers awaiting resolution.
    #[must_use]
    pub fn pending_moves(world: &World) -> &[PendingMove] {
        &world.field.pending
    }

    /// Tunnel mouths waiting for a free exit.
    #[must_use]
    pub fn pending_tunnels(world: &World) -> &[Position] {
        &world.field.pending_tunnels
    }

    /// Reports whether further ticks are needed before the board is quiescent.
    #[must_use]
    pub fn is_rendering(world: &World) -> bool {
        world.rendering
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a deep copy of the playfield.
    #[must_use]
    pub fn snapshot(world: &World) -> Playfield {
        world.field.clone()
    }

    /// Reports whether the world would act on the command right now.
    ///
    /// Tank commands need a playing, quiescent board; a step additionally
    /// needs a free destination, while a turn is always allowed.
    #[must_use]
    pub fn accepts(world: &World, command: &Command) -> bool {
        let field = &world.field;
        let idle = field.status == GameStatus::Playing && field.is_quiescent();
        match command {
            Command::Move { direction } => {
                idle && (field.tank.direction != *direction
                    || field.board.is_available(field.tank.coord.step(*direction)))
            }
            Command::Fire => idle,
            Command::PlaceTile { .. } => !world.rendering,
            Command::LoadLevel { .. } | Command::RenderFrame => true,
        }
    }
}

/// Builds a playfield from tiles laid out by hand.
///
/// Convenience for tests and tools that describe boards in code.
#[must_use]
pub fn playfield_with(tiles: &[(Coord, Tile)], tank: Position) -> Playfield {
    let mut board = Board::new();
    for &(coord, tile) in tiles {
        if let Some(slot) = board.tile_mut(coord) {
            *slot = tile;
        }
    }
    Playfield::new(board, tank)
}
