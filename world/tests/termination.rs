use laser_tank_core::{Command, Coord, Direction, Level, LevelMeta, TANK_CODE};
use laser_tank_world::{self as world, query, World};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

const TICK_LIMIT: u32 = 20_000;

/// Occupant codes only, so no surface can keep the tank moving forever.
fn occupant_code() -> impl Strategy<Value = u8> {
    prop_oneof![4u8..=14, 19u8..=23]
}

fn load(tiles: &[(i32, i32, u8)], tank: Coord) -> World {
    let mut level = Level::empty(LevelMeta::default());
    for &(x, y, code) in tiles {
        level.set_code(Coord::new(x, y), code);
    }
    level.set_code(tank, TANK_CODE);
    let parsed = level.parse();

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            board: parsed.board,
            tank: parsed.tank,
        },
        &mut events,
    );
    world
}

fn settle(world: &mut World) -> Result<u32, TestCaseError> {
    let mut events = Vec::new();
    let mut ticks = 0;
    while query::is_rendering(world) {
        prop_assert!(ticks < TICK_LIMIT, "world still rendering after {ticks} ticks");
        world::apply(world, Command::RenderFrame, &mut events);
        let tank = query::tank(world).coord;
        prop_assert!(
            query::board(world).is_available(tank),
            "tank shares {tank:?} with an occupant"
        );
        ticks += 1;
    }
    Ok(ticks)
}

proptest! {
    #[test]
    fn every_shot_settles(
        tiles in prop::collection::vec((0..16i32, 0..16i32, occupant_code()), 0..48),
        tank in (0..16i32, 0..16i32),
        facing in 0..4usize,
    ) {
        let mut world = load(&tiles, Coord::new(tank.0, tank.1));
        let mut events = Vec::new();

        world::apply(
            &mut world,
            Command::Move { direction: Direction::ALL[facing] },
            &mut events,
        );
        let _ = settle(&mut world)?;

        world::apply(&mut world, Command::Fire, &mut events);
        let _ = settle(&mut world)?;

        prop_assert!(query::laser(&world).is_none() || query::status(&world).is_terminal());
        prop_assert!(query::pending_moves(&world).is_empty() || query::status(&world).is_terminal());
    }
}
