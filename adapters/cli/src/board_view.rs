//! Plain-text rendering of the playfield.

use std::fmt::Write as _;

use laser_tank_core::{
    Board, Coord, Direction, MirrorOrientation, Occupant, Position, Surface, BOARD_SIZE,
};

/// Renders the board row by row, one glyph per tile.
///
/// The tank is drawn as `T`, the laser head as `+` and `marks` as `o` on
/// otherwise empty tiles.
pub(crate) fn render(
    board: &Board,
    tank: Position,
    laser: Option<Position>,
    marks: &[Coord],
) -> String {
    let mut text = String::with_capacity((BOARD_SIZE * (BOARD_SIZE + 1)) as usize);
    for y in 0..BOARD_SIZE {
        for x in 0..BOARD_SIZE {
            let coord = Coord::new(x, y);
            let glyph = if coord == tank.coord {
                'T'
            } else if laser.map_or(false, |laser| laser.coord == coord) {
                '+'
            } else {
                match board.tile(coord) {
                    Some(tile) => match tile.occupant {
                        Some(occupant) => occupant_glyph(occupant),
                        None if marks.contains(&coord) => 'o',
                        None => surface_glyph(tile.surface),
                    },
                    None => ' ',
                }
            };
            text.push(glyph);
        }
        text.push('\n');
    }
    let _ = writeln!(
        text,
        "tank at ({}, {}) facing {:?}",
        tank.coord.x(),
        tank.coord.y(),
        tank.direction
    );
    text
}

fn surface_glyph(surface: Surface) -> char {
    match surface {
        Surface::Dirt => '.',
        Surface::Flag => 'F',
        Surface::Water => '~',
        Surface::BlockInWater => '=',
        Surface::Ice => '_',
        Surface::ThinIce => ',',
        Surface::TankMover(direction) => arrow(direction),
        Surface::Tunnel(color) => char::from(b'0' + color.index()),
    }
}

fn occupant_glyph(occupant: Occupant) -> char {
    match occupant {
        Occupant::SolidBlock => '#',
        Occupant::MovableBlock => 'B',
        Occupant::CrystalBlock => '*',
        Occupant::Bricks => '%',
        Occupant::AntiTank(_) => 'A',
        Occupant::DeadAntiTank(_) => 'a',
        Occupant::Mirror(orientation) => mirror(orientation),
        Occupant::RotaryMirror(_) => 'R',
    }
}

fn mirror(orientation: MirrorOrientation) -> char {
    match orientation {
        MirrorOrientation::NorthWest | MirrorOrientation::SouthEast => '/',
        MirrorOrientation::NorthEast | MirrorOrientation::SouthWest => '\\',
    }
}

fn arrow(direction: Direction) -> char {
    match direction {
        Direction::North => '^',
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_tank_marks_and_tiles() {
        let mut board = Board::new();
        board.set_surface(Coord::new(1, 0), Surface::Water);
        board.set_occupant(Coord::new(2, 0), Some(Occupant::Bricks));
        let tank = Position::new(Coord::new(0, 0), Direction::North);

        let text = render(&board, tank, None, &[Coord::new(3, 0)]);
        let first_row = text.lines().next().expect("rows");

        assert_eq!(&first_row[..5], "T~%o.");
        assert_eq!(text.lines().count(), BOARD_SIZE as usize + 1);
    }
}
