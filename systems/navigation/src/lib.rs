#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Click-to-navigate system that plans tank routes and walks them one board
//! command at a time.

mod astar;

use std::collections::VecDeque;

use laser_tank_core::{Board, BoardCommand, Coord, Direction, Position, Surface};

pub use astar::{astar, Edge};

/// Neighbor expansion order used by the route planner.
pub const NEIGHBOR_ORDER: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

/// Reports whether the planner may route the tank through the cell.
///
/// Only empty cells whose surface cannot move or harm the tank qualify. The
/// goal itself is accepted whatever its surface, as long as it is empty.
#[must_use]
pub fn is_walkable(board: &Board, coord: Coord, goal: Coord) -> bool {
    let Some(tile) = board.tile(coord) else {
        return false;
    };
    if tile.occupant.is_some() {
        return false;
    }
    coord == goal
        || matches!(
            tile.surface,
            Surface::Dirt | Surface::Flag | Surface::BlockInWater
        )
}

/// Plans a shortest walk between two cells, both endpoints included.
#[must_use]
pub fn plan_route(board: &Board, start: Coord, goal: Coord) -> Option<Vec<Coord>> {
    if !goal.in_bounds() {
        return None;
    }
    astar(
        start,
        goal,
        start.manhattan_distance(goal),
        |node: Coord, out: &mut Vec<Edge<Coord>>| {
            for direction in NEIGHBOR_ORDER {
                let next = node.step(direction);
                if is_walkable(board, next, goal) {
                    out.push(Edge::new(next, 1, next.manhattan_distance(goal)));
                }
            }
        },
    )
}

/// Pure system holding the route the tank is currently walking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Navigation {
    route: VecDeque<Coord>,
    goal: Option<Coord>,
}

impl Navigation {
    /// Creates an idle navigation system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans a route from the tank to `goal`. Returns whether one exists; an
    /// unreachable goal leaves the system idle.
    pub fn navigate(&mut self, board: &Board, tank: Position, goal: Coord) -> bool {
        match plan_route(board, tank.coord, goal) {
            Some(route) => {
                log::debug!(
                    "planned {} step route from {:?} to {goal:?}",
                    route.len().saturating_sub(1),
                    tank.coord
                );
                self.route = route.into();
                self.goal = Some(goal);
                true
            }
            None => {
                log::info!("no route from {:?} to {goal:?}", tank.coord);
                self.cancel();
                false
            }
        }
    }

    /// Drops the active route.
    pub fn cancel(&mut self) {
        self.route.clear();
        self.goal = None;
    }

    /// Reports whether a route is being walked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.goal.is_some()
    }

    /// Destination of the active route.
    #[must_use]
    pub const fn goal(&self) -> Option<Coord> {
        self.goal
    }

    /// Cells still ahead on the active route.
    pub fn route(&self) -> impl Iterator<Item = Coord> + '_ {
        self.route.iter().copied()
    }

    /// Emits the next board command of the route, if any.
    ///
    /// The tank first turns toward the next cell and steps once it faces it.
    /// A tank that drifted off the route gets a fresh plan. A step into a
    /// cell that became blocked cancels the route.
    pub fn handle(&mut self, board: &Board, tank: Position, out: &mut Vec<BoardCommand>) {
        let Some(goal) = self.goal else {
            return;
        };

        while self.route.front() == Some(&tank.coord) {
            let _ = self.route.pop_front();
        }
        let Some(next) = self.route.front().copied() else {
            self.cancel();
            return;
        };

        let next = if tank.coord.manhattan_distance(next) == 1 {
            next
        } else {
            log::debug!("tank left the route at {:?}, replanning", tank.coord);
            if !self.navigate(board, tank, goal) {
                return;
            }
            let _ = self.route.pop_front();
            match self.route.front().copied() {
                Some(next) => next,
                None => {
                    self.cancel();
                    return;
                }
            }
        };

        let Some(direction) = tank.coord.direction_to(next) else {
            self.cancel();
            return;
        };
        if direction != tank.direction {
            out.push(BoardCommand::Move(direction));
            return;
        }
        if !board.is_available(next) {
            log::info!("route to {goal:?} blocked at {next:?}");
            self.cancel();
            return;
        }
        let _ = self.route.pop_front();
        out.push(BoardCommand::Move(direction));
        if self.route.is_empty() {
            self.goal = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laser_tank_core::{Occupant, Tile};

    #[test]
    fn water_is_not_walkable_unless_it_is_the_goal() {
        let mut board = Board::new();
        let water = Coord::new(3, 3);
        board.set_surface(water, Surface::Water);

        assert!(!is_walkable(&board, water, Coord::new(0, 0)));
        assert!(is_walkable(&board, water, water));
    }

    #[test]
    fn occupied_goal_is_not_walkable() {
        let mut board = Board::new();
        let goal = Coord::new(2, 2);
        *board.tile_mut(goal).expect("in bounds") = Tile::occupied(Occupant::SolidBlock);

        assert!(!is_walkable(&board, goal, goal));
        assert!(!is_walkable(&board, Coord::new(-1, 0), goal));
    }

    #[test]
    fn turns_before_stepping() {
        let board = Board::new();
        let tank = Position::new(Coord::new(0, 0), Direction::North);
        let mut navigation = Navigation::new();
        assert!(navigation.navigate(&board, tank, Coord::new(0, 2)));

        let mut out = Vec::new();
        navigation.handle(&board, tank, &mut out);
        assert_eq!(out, vec![BoardCommand::Move(Direction::South)]);

        out.clear();
        let turned = Position::new(tank.coord, Direction::South);
        navigation.handle(&board, turned, &mut out);
        assert_eq!(out, vec![BoardCommand::Move(Direction::South)]);
        assert_eq!(
            navigation.route().collect::<Vec<_>>(),
            vec![Coord::new(0, 2)]
        );
    }

    #[test]
    fn final_step_finishes_the_route() {
        let board = Board::new();
        let tank = Position::new(Coord::new(4, 4), Direction::East);
        let mut navigation = Navigation::new();
        assert!(navigation.navigate(&board, tank, Coord::new(5, 4)));

        let mut out = Vec::new();
        navigation.handle(&board, tank, &mut out);

        assert_eq!(out, vec![BoardCommand::Move(Direction::East)]);
        assert!(!navigation.is_active());
    }

    #[test]
    fn blocked_step_cancels_the_route() {
        let mut board = Board::new();
        let tank = Position::new(Coord::new(4, 4), Direction::East);
        let mut navigation = Navigation::new();
        assert!(navigation.navigate(&board, tank, Coord::new(7, 4)));

        board.set_occupant(Coord::new(5, 4), Some(Occupant::MovableBlock));
        let mut out = Vec::new();
        navigation.handle(&board, tank, &mut out);

        assert!(out.is_empty());
        assert!(!navigation.is_active());
    }

    #[test]
    fn drifting_off_the_route_replans() {
        let board = Board::new();
        let tank = Position::new(Coord::new(0, 0), Direction::South);
        let mut navigation = Navigation::new();
        assert!(navigation.navigate(&board, tank, Coord::new(0, 4)));

        let drifted = Position::new(Coord::new(2, 4), Direction::South);
        let mut out = Vec::new();
        navigation.handle(&board, drifted, &mut out);

        assert_eq!(out, vec![BoardCommand::Move(Direction::West)]);
        assert_eq!(navigation.goal(), Some(Coord::new(0, 4)));
        assert_eq!(
            navigation.route().collect::<Vec<_>>(),
            vec![Coord::new(1, 4), Coord::new(0, 4)]
        );
    }
}
