//! Tile behavior registry.
//!
//! Each surface and occupant tag maps to a fixed set of hooks. Dispatch is an
//! exhaustive `match` on the tag, so a new tile kind cannot compile without
//! deciding how every hook treats it.

use laser_tank_core::{Coord, Event, GameStatus, Occupant, Position, Surface};

use crate::frame::Frame;
use crate::PendingMove;

/// Hooks of the base layer of a tile.
pub(crate) trait SurfaceRules {
    /// Something arrived on the tile. `from` is absent for in-place changes.
    fn handle_landing(self, frame: &mut Frame<'_>, from: Option<Coord>, to: Position);

    /// Something left the tile and nothing took its place.
    fn handle_leaving(self, frame: &mut Frame<'_>, from: Coord);

    /// The tank is standing on the tile at the end of a step or tick.
    fn handle_tank(self, frame: &mut Frame<'_>, in_skipping: bool);

    /// The tank emerges on this tile from a tunnel.
    fn handle_tank_move(self, frame: &mut Frame<'_>, exit: Coord);

    /// Whether the moving tank passes over the tile without stopping.
    fn should_skip(self, frame: &Frame<'_>) -> bool;
}

/// Hooks of the blocking layer of a tile.
pub(crate) trait OccupantRules {
    /// The laser entered the occupant's cell travelling along `at.direction`.
    fn handle_laser(self, frame: &mut Frame<'_>, at: Position);

    /// The tank is visible from the occupant's cell with nothing in between.
    fn saw_tank(self, frame: &mut Frame<'_>, at: Coord);

    /// Pushes the occupant one cell along `from.direction`, or to `to` when
    /// given. With `before_resolve` the transfer is only queued. Returns
    /// whether the occupant can move at all.
    fn handle_move(
        self,
        frame: &mut Frame<'_>,
        from: Position,
        to: Option<Coord>,
        before_resolve: bool,
    ) -> bool;
}

impl SurfaceRules for Surface {
    fn handle_landing(self, frame: &mut Frame<'_>, from: Option<Coord>, to: Position) {
        match self {
            Surface::Dirt | Surface::BlockInWater | Surface::TankMover(_) => {}
            Surface::Flag => {
                if frame.field.tank.coord == to.coord {
                    frame.set_status(GameStatus::Win);
                }
            }
            Surface::Water => sink(frame, from, to),
            Surface::Ice | Surface::ThinIce => {
                if frame.field.board.occupant(to.coord).is_some()
                    && frame.can_receive(to.next().coord)
                {
                    frame.queue_move(PendingMove::push(to));
                }
            }
            Surface::Tunnel(_) => teleport(frame, to),
        }
    }

    fn handle_leaving(self, frame: &mut Frame<'_>, from: Coord) {
        match self {
            Surface::ThinIce => frame.queue_cleanup(from),
            Surface::Tunnel(color) => {
                let board = &frame.field.board;
                let waiting = frame
                    .field
                    .pending_tunnels
                    .iter()
                    .position(|mouth| board.surface(mouth.coord) == Some(Surface::Tunnel(color)));
                if let Some(index) = waiting {
                    let mouth = frame.field.pending_tunnels.remove(index);
                    if mouth.coord != from {
                        teleport(frame, mouth);
                    }
                }
            }
            Surface::Dirt
            | Surface::Flag
            | Surface::Water
            | Surface::BlockInWater
            | Surface::Ice
            | Surface::TankMover(_) => {}
        }
    }

    fn handle_tank(self, frame: &mut Frame<'_>, in_skipping: bool) {
        match self {
            Surface::Flag => frame.set_status(GameStatus::Win),
            Surface::Water => {
                if frame.field.tank_step.is_none() {
                    frame.set_status(GameStatus::Fail);
                }
            }
            Surface::Ice | Surface::ThinIce => {
                let tank = frame.field.tank.coord;
                match frame.tank_momentum() {
                    Some(direction) if frame.field.board.is_available(tank.step(direction)) => {
                        if !in_skipping && self.should_skip(frame) {
                            frame.step_tank(direction);
                            frame.check_tank(true);
                        } else {
                            frame.field.tank_step = Some(direction);
                        }
                    }
                    _ => frame.stop_tank(),
                }
            }
            Surface::TankMover(direction) => {
                let target = frame.field.tank.coord.step(direction);
                if !frame.field.board.is_available(target) {
                    return;
                }
                if !in_skipping && self.should_skip(frame) {
                    frame.step_tank(direction);
                    frame.check_tank(true);
                } else {
                    frame.field.tank_step = Some(direction);
                }
            }
            Surface::Dirt | Surface::BlockInWater | Surface::Tunnel(_) => {}
        }
    }

    fn handle_tank_move(self, frame: &mut Frame<'_>, exit: Coord) {
        frame.field.tank.coord = exit;
        frame.stop_tank();
    }

    fn should_skip(self, frame: &Frame<'_>) -> bool {
        let prev = frame.field.prev_tank.coord;
        let came_from = frame.field.board.surface(prev);
        match self {
            Surface::Ice | Surface::ThinIce => {
                !came_from.map_or(false, |surface| surface.is_ice() || surface.is_tank_mover())
            }
            Surface::TankMover(_) => {
                prev == frame.field.tank.coord
                    || !came_from.map_or(false, |surface| surface.is_tank_mover())
            }
            Surface::Dirt
            | Surface::Flag
            | Surface::Water
            | Surface::BlockInWater
            | Surface::Tunnel(_) => false,
        }
    }
}

impl OccupantRules for Occupant {
    fn handle_laser(self, frame: &mut Frame<'_>, at: Position) {
        match self {
            Occupant::SolidBlock | Occupant::CrystalBlock | Occupant::DeadAntiTank(_) => {
                frame.absorb_laser(at.coord);
            }
            Occupant::Bricks => {
                frame.absorb_laser(at.coord);
                let _ = frame.field.board.take_occupant(at.coord);
                frame.emit(Event::OccupantDestroyed {
                    occupant: self,
                    at: at.coord,
                });
            }
            Occupant::MovableBlock => {
                frame.absorb_laser(at.coord);
                let _ = self.handle_move(frame, at, None, true);
            }
            Occupant::AntiTank(facing) => {
                frame.absorb_laser(at.coord);
                if at.direction == facing.reverse() {
                    frame
                        .field
                        .board
                        .set_occupant(at.coord, Some(Occupant::DeadAntiTank(facing)));
                    frame.emit(Event::AntiTankDisabled { at: at.coord });
                } else {
                    let _ = self.handle_move(frame, at, None, true);
                }
            }
            Occupant::Mirror(orientation) => match orientation.reflect(at.direction) {
                Some(exit) => frame.reflect_laser(at.facing(exit)),
                None => {
                    frame.absorb_laser(at.coord);
                    let _ = self.handle_move(frame, at, None, true);
                }
            },
            Occupant::RotaryMirror(orientation) => match orientation.reflect(at.direction) {
                Some(exit) => frame.reflect_laser(at.facing(exit)),
                None => {
                    frame.absorb_laser(at.coord);
                    let rotated = orientation.rotated();
                    frame
                        .field
                        .board
                        .set_occupant(at.coord, Some(Occupant::RotaryMirror(rotated)));
                    frame.emit(Event::MirrorRotated {
                        at: at.coord,
                        orientation: rotated,
                    });
                }
            },
        }
    }

    fn saw_tank(self, frame: &mut Frame<'_>, at: Coord) {
        if let Occupant::AntiTank(facing) = self {
            if at.direction_to(frame.field.tank.coord) == Some(facing) {
                frame.fire_laser(Position::new(at.step(facing), facing));
            }
        }
    }

    fn handle_move(
        self,
        frame: &mut Frame<'_>,
        from: Position,
        to: Option<Coord>,
        before_resolve: bool,
    ) -> bool {
        match self {
            Occupant::MovableBlock | Occupant::AntiTank(_) | Occupant::Mirror(_) => {}
            Occupant::SolidBlock
            | Occupant::CrystalBlock
            | Occupant::Bricks
            | Occupant::DeadAntiTank(_)
            | Occupant::RotaryMirror(_) => return false,
        }

        let destination = to.unwrap_or_else(|| from.next().coord);
        if before_resolve {
            frame.queue_move(PendingMove {
                from,
                to: Position::new(destination, from.direction),
            });
            return true;
        }

        let Some(occupant) = frame.field.board.take_occupant(from.coord) else {
            return false;
        };
        debug_assert!(
            frame.field.board.is_available(destination),
            "occupant moved onto occupied tile {destination:?}"
        );
        frame.field.board.set_occupant(destination, Some(occupant));
        frame.emit(Event::OccupantMoved {
            occupant,
            from: from.coord,
            to: destination,
        });
        true
    }
}

/// Water swallows occupants, filling the hole with a movable block, and
/// drowns a tank unless it is sliding across from ice.
fn sink(frame: &mut Frame<'_>, from: Option<Coord>, to: Position) {
    let coord = to.coord;
    if let Some(occupant) = frame.field.board.take_occupant(coord) {
        if occupant == Occupant::MovableBlock {
            frame.field.board.set_surface(coord, Surface::BlockInWater);
        }
        frame.emit(Event::OccupantSunk { occupant, at: coord });
    }

    if frame.field.tank.coord != coord {
        return;
    }
    let from_ice = from
        .and_then(|coord| frame.field.board.surface(coord))
        .map_or(false, |surface| surface.is_ice());
    if from_ice && frame.field.board.is_available(coord.step(to.direction)) {
        frame.field.tank_step = Some(to.direction);
    } else if frame.field.tank_step.is_none() {
        frame.set_status(GameStatus::Fail);
    }
}

/// Sends whatever stands on the tunnel at `at` to the first free tunnel of
/// the same color in row-major order, or parks it until one frees up.
fn teleport(frame: &mut Frame<'_>, at: Position) {
    let Some(Surface::Tunnel(color)) = frame.field.board.surface(at.coord) else {
        return;
    };
    let occupant = frame.field.board.occupant(at.coord);
    let carries_tank = frame.field.tank.coord == at.coord;
    if occupant.is_none() && !carries_tank {
        return;
    }

    let exit = frame
        .field
        .board
        .iter()
        .find(|(coord, tile)| {
            *coord != at.coord
                && tile.surface == Surface::Tunnel(color)
                && tile.occupant.is_none()
                && *coord != frame.field.tank.coord
        })
        .map(|(coord, _)| coord);

    let Some(exit) = exit else {
        frame.field.pending_tunnels.push(at);
        return;
    };

    match occupant {
        Some(occupant) => {
            let _ = occupant.handle_move(frame, at, Some(exit), false);
        }
        None => {
            if let Some(surface) = frame.field.board.surface(exit) {
                surface.handle_tank_move(frame, exit);
            }
        }
    }
    frame.emit(Event::Teleported {
        from: at.coord,
        to: exit,
    });
}
