//! Frame resolution engine.
//!
//! One tick advances the laser, lands queued occupant transfers, executes
//! any forced tank step, lets the environment react to the tank and finally
//! applies deferred surface conversions. Tile-specific reactions are looked
//! up through the rules in [`crate::tiles`].

use laser_tank_core::{Coord, Direction, Event, GameStatus, Position, Surface, LASER_MAX_STEPS};

use crate::tiles::{OccupantRules, SurfaceRules};
use crate::{PendingMove, Playfield};

/// Rays scanned from the tank when checking what can see it.
const SIGHT_ORDER: [Direction; 4] = [
    Direction::East,
    Direction::South,
    Direction::West,
    Direction::North,
];

/// Mutable view of the playfield for the duration of one command or tick.
pub(crate) struct Frame<'a> {
    pub(crate) field: &'a mut Playfield,
    events: &'a mut Vec<Event>,
    cleanup: Vec<Coord>,
}

/// Result of trying to land a single queued transfer.
enum Landing {
    Landed,
    Blocked,
    Vanished,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(field: &'a mut Playfield, events: &'a mut Vec<Event>) -> Self {
        Self {
            field,
            events,
            cleanup: Vec::new(),
        }
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Moves the attempt to a terminal status. Terminal statuses never change.
    pub(crate) fn set_status(&mut self, status: GameStatus) {
        if self.field.status.is_terminal() || status == self.field.status {
            return;
        }
        log::info!("attempt ended with {status:?} at tank {:?}", self.field.tank.coord);
        self.field.status = status;
        self.emit(Event::StatusChanged { status });
    }

    /// Places a new shot unless one is already in flight.
    ///
    /// A shot starting on the tank's cell destroys it immediately.
    pub(crate) fn fire_laser(&mut self, origin: Position) {
        if self.field.laser.is_some() {
            return;
        }
        self.field.laser = Some(origin);
        self.field.laser_steps = 0;
        self.emit(Event::LaserFired { origin });
        if origin.coord == self.field.tank.coord {
            self.field.laser = None;
            self.set_status(GameStatus::Fail);
        }
    }

    /// Redirects the laser in place without consuming its travel budget.
    pub(crate) fn reflect_laser(&mut self, position: Position) {
        self.field.laser = Some(position);
        self.emit(Event::LaserReflected { position });
    }

    pub(crate) fn absorb_laser(&mut self, at: Coord) {
        self.field.laser = None;
        self.emit(Event::LaserAbsorbed { at });
    }

    pub(crate) fn queue_move(&mut self, pending: PendingMove) {
        self.field.pending.push(pending);
    }

    pub(crate) fn queue_cleanup(&mut self, coord: Coord) {
        if !self.cleanup.contains(&coord) {
            self.cleanup.push(coord);
        }
    }

    /// Reports whether an occupant may enter the cell.
    pub(crate) fn can_receive(&self, coord: Coord) -> bool {
        self.field.board.is_available(coord) && coord != self.field.tank.coord
    }

    /// Direction the tank travelled into its current cell, if it is moving.
    pub(crate) fn tank_momentum(&self) -> Option<Direction> {
        self.field.prev_tank.coord.direction_to(self.field.tank.coord)
    }

    pub(crate) fn stop_tank(&mut self) {
        self.field.prev_tank = self.field.tank;
        self.field.tank_step = None;
    }

    /// Runs one full tick.
    pub(crate) fn tick(&mut self) {
        self.advance_laser();
        self.resolve_pending();
        if self.field.status == GameStatus::Playing {
            self.run_tank_step();
        }
        if self.field.status == GameStatus::Playing {
            self.check_tank(false);
        }
        self.finish();
    }

    /// Applies deferred surface conversions queued during the frame.
    pub(crate) fn finish(&mut self) {
        for coord in std::mem::take(&mut self.cleanup) {
            if self.field.board.surface(coord) != Some(Surface::ThinIce) {
                continue;
            }
            self.field.board.set_surface(coord, Surface::Water);
            self.emit(Event::SurfaceChanged {
                at: coord,
                surface: Surface::Water,
            });
            // Anything that re-entered the cell this frame now sits on water.
            let direction = self.field.tank.direction;
            Surface::Water.handle_landing(self, None, Position::new(coord, direction));
        }
    }

    fn advance_laser(&mut self) {
        let Some(laser) = self.field.laser else {
            return;
        };
        if self.field.laser_steps >= LASER_MAX_STEPS {
            log::debug!("laser dissipated at {:?}", laser.coord);
            self.field.laser = None;
            self.emit(Event::LaserDissipated { at: laser.coord });
            return;
        }
        self.field.laser_steps += 1;

        let next = laser.next();
        if !next.coord.in_bounds() {
            self.field.laser = None;
            self.emit(Event::LaserExited { from: laser.coord });
            return;
        }
        if next.coord == self.field.tank.coord {
            self.field.laser = None;
            self.emit(Event::LaserMoved { position: next });
            self.set_status(GameStatus::Fail);
            return;
        }
        match self.field.board.occupant(next.coord) {
            Some(occupant) => occupant.handle_laser(self, next),
            None => {
                self.field.laser = Some(next);
                self.emit(Event::LaserMoved { position: next });
            }
        }
    }

    /// Lands transfers queued before this phase in row-major destination
    /// order. Blocked transfers are retried while others make progress and
    /// dropped once nothing moves. Transfers queued by landings wait for the
    /// next tick.
    fn resolve_pending(&mut self) {
        let mut queue = std::mem::take(&mut self.field.pending);
        queue.sort_by_key(|pending| (pending.to.coord.y(), pending.to.coord.x()));

        while !queue.is_empty() {
            let mut progressed = false;
            let mut blocked = Vec::new();
            for pending in queue {
                match self.land(pending) {
                    Landing::Landed => progressed = true,
                    Landing::Blocked => blocked.push(pending),
                    Landing::Vanished => {}
                }
            }
            if !progressed {
                for pending in &blocked {
                    log::debug!("dropped blocked transfer {pending:?}");
                }
                break;
            }
            queue = blocked;
        }
    }

    fn land(&mut self, pending: PendingMove) -> Landing {
        let PendingMove { from, to } = pending;
        let Some(occupant) = self.field.board.occupant(from.coord) else {
            return Landing::Vanished;
        };
        if !self.can_receive(to.coord) {
            return Landing::Blocked;
        }
        if !occupant.handle_move(self, from, Some(to.coord), false) {
            return Landing::Vanished;
        }
        self.transfer_landed(from.coord, to);
        Landing::Landed
    }

    /// Runs the landing rule of the destination, then the leaving rule of the
    /// source when nothing took its place.
    pub(crate) fn transfer_landed(&mut self, from: Coord, to: Position) {
        if let Some(surface) = self.field.board.surface(to.coord) {
            surface.handle_landing(self, Some(from), to);
        }
        if self.field.board.is_available(from) && self.field.tank.coord != from {
            if let Some(surface) = self.field.board.surface(from) {
                surface.handle_leaving(self, from);
            }
        }
    }

    fn run_tank_step(&mut self) {
        let Some(direction) = self.field.tank_step.take() else {
            return;
        };
        if self.field.board.is_available(self.field.tank.coord.step(direction)) {
            self.step_tank(direction);
        } else {
            self.stop_tank();
        }
    }

    /// Moves the tank one cell and runs the landing and leaving rules.
    pub(crate) fn step_tank(&mut self, direction: Direction) {
        let from = self.field.tank.coord;
        let to = from.step(direction);
        self.field.prev_tank = self.field.tank;
        self.field.tank.coord = to;
        self.emit(Event::TankMoved { from, to });
        self.transfer_landed(from, Position::new(to, direction));
    }

    /// Lets occupants that can see the tank react, then applies the rule of
    /// the surface under the tank.
    pub(crate) fn check_tank(&mut self, in_skipping: bool) {
        let tank = self.field.tank.coord;
        debug_assert!(
            self.field.board.is_available(tank),
            "tank shares a tile with an occupant at {tank:?}"
        );
        if !self.field.board.is_available(tank) {
            return;
        }

        for direction in SIGHT_ORDER {
            let mut cursor = tank.step(direction);
            while cursor.in_bounds() {
                if let Some(occupant) = self.field.board.occupant(cursor) {
                    occupant.saw_tank(self, cursor);
                    break;
                }
                cursor = cursor.step(direction);
            }
        }

        if self.field.status != GameStatus::Playing {
            return;
        }
        if let Some(surface) = self.field.board.surface(self.field.tank.coord) {
            surface.handle_tank(self, in_skipping);
        }
    }
}
