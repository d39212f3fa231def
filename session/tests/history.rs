use laser_tank_core::{
    BoardCommand, Coord, Direction, Event, GameStatus, Level, LevelMeta, Occupant, Placement,
    Replay, SessionCommand, Surface, Tile, TANK_CODE,
};
use laser_tank_session::{Config, Session};
use laser_tank_world::query;

fn range(tank: Coord) -> Level {
    let mut level = Level::empty(LevelMeta {
        name: "range".into(),
        author: "tests".into(),
        ..LevelMeta::default()
    });
    level.set_code(tank, TANK_CODE);
    level.set_code(Coord::new(2, 9), 6);
    level.set_code(Coord::new(9, 2), 4);
    level.set_code(Coord::new(12, 12), 3);
    level
}

fn session() -> (Session, Vec<Event>) {
    let levels = vec![range(Coord::new(2, 12)), range(Coord::new(7, 7))];
    let mut session = Session::new(Config::default(), levels);
    let mut events = Vec::new();
    assert!(session.load_level(0, &mut events));
    (session, events)
}

fn run(session: &mut Session, command: SessionCommand, events: &mut Vec<Event>) {
    session.handle(command, events);
    let _ = session.run_until_idle(events);
}

fn tank_coord(session: &Session) -> Coord {
    query::tank(session.world()).coord
}

#[test]
fn undo_reverts_exactly_one_command() {
    let (mut session, mut events) = session();

    for command in [
        SessionCommand::Move(Direction::East),
        SessionCommand::Fire,
        SessionCommand::Move(Direction::North),
        SessionCommand::Fire,
        SessionCommand::Move(Direction::North),
    ] {
        let before = query::snapshot(session.world());
        run(&mut session, command.clone(), &mut events);
        assert_ne!(query::snapshot(session.world()), before);

        run(&mut session, SessionCommand::Undo, &mut events);
        assert_eq!(query::snapshot(session.world()), before);

        run(&mut session, command, &mut events);
    }
}

#[test]
fn undo_pops_history_and_record_together() {
    let (mut session, mut events) = session();
    run(&mut session, SessionCommand::Fire, &mut events);
    run(&mut session, SessionCommand::Move(Direction::North), &mut events);
    assert_eq!(session.history_len(), 2);
    assert_eq!(session.record().len(), 2);

    run(&mut session, SessionCommand::Undo, &mut events);

    assert_eq!(session.history_len(), 1);
    assert_eq!(
        session.record().commands(),
        &[BoardCommand::Fire(Direction::North)]
    );
    assert_eq!(session.frame_count(), 0);
    assert_eq!(
        query::board(session.world()).occupant(Coord::new(2, 9)),
        None
    );
}

#[test]
fn rejected_commands_leave_no_history() {
    let (mut session, mut events) = session();
    run(&mut session, SessionCommand::Move(Direction::North), &mut events);
    run(&mut session, SessionCommand::Move(Direction::North), &mut events);
    assert_eq!(tank_coord(&session), Coord::new(2, 10));

    run(&mut session, SessionCommand::Move(Direction::North), &mut events);

    assert_eq!(tank_coord(&session), Coord::new(2, 10));
    assert_eq!(session.history_len(), 2);
}

#[test]
fn restart_keeps_history_but_switching_levels_clears_it() {
    let (mut session, mut events) = session();
    run(&mut session, SessionCommand::Move(Direction::North), &mut events);
    run(&mut session, SessionCommand::SavePosition, &mut events);

    run(&mut session, SessionCommand::Restart, &mut events);
    assert_eq!(tank_coord(&session), Coord::new(2, 12));
    assert_eq!(session.history_len(), 1);
    assert!(session.record().is_empty());
    assert!(session.position_saved());

    run(&mut session, SessionCommand::NextLevel, &mut events);
    assert_eq!(session.level_index(), Some(1));
    assert_eq!(tank_coord(&session), Coord::new(7, 7));
    assert_eq!(session.history_len(), 0);
    assert!(!session.position_saved());

    run(&mut session, SessionCommand::NextLevel, &mut events);
    assert_eq!(session.level_index(), Some(1));

    run(&mut session, SessionCommand::PrevLevel, &mut events);
    assert_eq!(session.level_index(), Some(0));
}

#[test]
fn restore_position_rewinds_board_and_record() {
    let (mut session, mut events) = session();
    run(&mut session, SessionCommand::Move(Direction::North), &mut events);
    run(&mut session, SessionCommand::SavePosition, &mut events);
    let saved = query::snapshot(session.world());

    run(&mut session, SessionCommand::Fire, &mut events);
    run(&mut session, SessionCommand::Move(Direction::North), &mut events);
    assert_eq!(session.record().len(), 3);

    run(&mut session, SessionCommand::RestorePosition, &mut events);

    assert_eq!(query::snapshot(session.world()), saved);
    assert_eq!(
        session.record().commands(),
        &[BoardCommand::Move(Direction::North)]
    );
    assert_eq!(
        query::board(session.world()).occupant(Coord::new(2, 9)),
        Some(Occupant::Bricks)
    );
}

#[test]
fn scrubbing_shows_earlier_frames_and_returns_to_live() {
    let (mut session, mut events) = session();
    run(&mut session, SessionCommand::Fire, &mut events);
    let live = query::snapshot(session.world());
    let frames = session.frame_count();
    assert!(frames > 2);

    for _ in 0..frames + 3 {
        run(&mut session, SessionCommand::PrevFrame, &mut events);
    }
    assert_eq!(session.frame_index(), frames - 1);
    assert_eq!(
        query::board(session.world()).occupant(Coord::new(2, 9)),
        Some(Occupant::Bricks)
    );

    run(&mut session, SessionCommand::SavePosition, &mut events);
    assert!(!session.position_saved());

    run(&mut session, SessionCommand::NextFrame, &mut events);
    assert_eq!(session.frame_index(), frames - 2);

    let history = session.history_len();
    run(&mut session, SessionCommand::Move(Direction::North), &mut events);
    assert_eq!(session.frame_index(), 0);
    assert_eq!(query::snapshot(session.world()), live);
    assert_eq!(session.history_len(), history);
}

#[test]
fn fire_toward_turns_along_the_dominant_axis_first() {
    let (mut session, mut events) = session();

    run(
        &mut session,
        SessionCommand::FireToward {
            target: Coord::new(9, 11),
        },
        &mut events,
    );

    assert_eq!(
        session.record().commands(),
        &[
            BoardCommand::Move(Direction::East),
            BoardCommand::Fire(Direction::East),
        ]
    );
    assert!(events.iter().any(|event| matches!(
        event,
        Event::LaserExited { from } if *from == Coord::new(15, 12)
    )));
}

#[test]
fn replay_blocks_live_input_and_steps_back() {
    let (mut session, mut events) = session();
    let replay: Replay = "0NNE".parse().expect("valid record");

    run(&mut session, SessionCommand::LoadReplay(replay), &mut events);
    assert_eq!(session.replay_index(), Some(0));

    run(&mut session, SessionCommand::Move(Direction::West), &mut events);
    assert_eq!(session.history_len(), 0);

    run(&mut session, SessionCommand::StepReplay, &mut events);
    run(&mut session, SessionCommand::StepReplay, &mut events);
    run(&mut session, SessionCommand::StepReplay, &mut events);
    assert_eq!(tank_coord(&session), Coord::new(2, 10));
    assert_eq!(session.replay_index(), Some(3));

    run(&mut session, SessionCommand::StepReplayBack, &mut events);
    assert_eq!(session.replay_index(), Some(2));
    assert_eq!(tank_coord(&session), Coord::new(2, 11));
    assert_eq!(session.history_len(), 2);

    run(&mut session, SessionCommand::StepReplay, &mut events);
    run(&mut session, SessionCommand::StepReplay, &mut events);
    assert!(!session.replay_loaded());
    assert_eq!(query::tank(session.world()).direction, Direction::East);

    run(&mut session, SessionCommand::Move(Direction::East), &mut events);
    assert_eq!(tank_coord(&session), Coord::new(3, 10));
}

#[test]
fn close_replay_restores_live_input() {
    let (mut session, mut events) = session();
    run(
        &mut session,
        SessionCommand::LoadReplay(Replay::new(vec![BoardCommand::Fire(Direction::North)])),
        &mut events,
    );
    run(&mut session, SessionCommand::CloseReplay, &mut events);

    run(&mut session, SessionCommand::Move(Direction::North), &mut events);

    assert_eq!(tank_coord(&session), Coord::new(2, 11));
}

#[test]
fn navigate_walks_the_tank_to_the_goal() {
    let (mut session, mut events) = session();
    let goal = Coord::new(6, 10);

    session.handle(SessionCommand::Navigate { goal }, &mut events);
    assert!(session.navigation().is_active());
    assert!(session.scheduler().is_running());
    let _ = session.run_until_idle(&mut events);

    assert_eq!(tank_coord(&session), goal);
    assert!(!session.navigation().is_active());
    assert_eq!(session.history_len(), session.record().len());
    assert_eq!(session.status(), GameStatus::Playing);
}

#[test]
fn navigation_avoids_water_and_cancels_on_new_input() {
    let (mut session, mut events) = session();

    session.handle(
        SessionCommand::Navigate {
            goal: Coord::new(12, 12),
        },
        &mut events,
    );
    assert!(session.navigation().is_active());
    assert!(session
        .navigation()
        .route()
        .all(|coord| coord == Coord::new(12, 12)
            || query::board(session.world()).surface(coord)
                != Some(Surface::Water)));

    session.handle(SessionCommand::Fire, &mut events);
    assert!(!session.navigation().is_active());
}

#[test]
fn unreachable_goal_leaves_navigation_idle() {
    let (mut session, mut events) = session();

    session.handle(
        SessionCommand::Navigate {
            goal: Coord::new(9, 2),
        },
        &mut events,
    );

    assert!(!session.navigation().is_active());
    assert!(!session.scheduler().is_running());
}

#[test]
fn editing_and_exporting_round_trip_through_level_codes() {
    let (mut session, mut events) = session();

    run(
        &mut session,
        SessionCommand::Edit {
            coord: Coord::new(2, 12),
            placement: Placement::Tile(Tile::occupied(Occupant::SolidBlock)),
        },
        &mut events,
    );
    run(
        &mut session,
        SessionCommand::Edit {
            coord: Coord::new(0, 0),
            placement: Placement::Tile(Tile::occupied(Occupant::CrystalBlock)),
        },
        &mut events,
    );

    let exported = session.export_level(LevelMeta {
        name: "edited".into(),
        ..LevelMeta::default()
    });

    assert_eq!(exported.code(Coord::new(2, 12)), Some(TANK_CODE));
    assert_eq!(exported.code(Coord::new(0, 0)), Some(19));
    assert_eq!(exported.code(Coord::new(2, 9)), Some(6));
    assert_eq!(exported.code(Coord::new(12, 12)), Some(3));
    assert_eq!(exported.name, "edited");
}

#[test]
fn replayed_shot_turns_toward_its_recorded_direction() {
    let mut level = Level::empty(LevelMeta::default());
    level.set_code(Coord::new(5, 5), TANK_CODE);
    level.set_code(Coord::new(5, 8), 6);
    let mut session = Session::new(Config::default(), vec![level]);
    let mut events = Vec::new();
    assert!(session.load_level(0, &mut events));
    let start = query::snapshot(session.world());

    let replay: Replay = "1".parse().expect("valid record");
    run(&mut session, SessionCommand::LoadReplay(replay), &mut events);
    run(&mut session, SessionCommand::StepReplay, &mut events);

    assert_eq!(query::tank(session.world()).direction, Direction::South);
    assert_eq!(
        query::board(session.world()).occupant(Coord::new(5, 8)),
        None
    );
    assert_eq!(session.record().to_string(), "1");
    assert_eq!(session.history_len(), 1);

    run(&mut session, SessionCommand::Undo, &mut events);
    assert_eq!(query::snapshot(session.world()), start);
}

#[test]
fn edit_while_rendering_keeps_frames() {
    let (mut session, mut events) = session();
    session.handle(SessionCommand::Fire, &mut events);
    assert!(query::is_rendering(session.world()));
    let revision = session.revision();
    let frames = session.frame_count();

    session.handle(
        SessionCommand::Edit {
            coord: Coord::new(0, 0),
            placement: Placement::Tile(Tile::occupied(Occupant::SolidBlock)),
        },
        &mut events,
    );

    assert_eq!(session.revision(), revision);
    assert_eq!(session.frame_count(), frames);
    assert_eq!(query::board(session.world()).occupant(Coord::new(0, 0)), None);
}
