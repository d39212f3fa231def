use std::time::Duration;

use laser_tank_core::{
    Board, Coord, Direction, Event, GameStatus, Level, LevelMeta, Position, SessionCommand,
    TANK_CODE,
};
use laser_tank_session::{Config, Session};
use laser_tank_world::query;

const STEP_BUDGET: usize = 10_000;

#[test]
fn replaying_a_record_reproduces_the_live_run() {
    let live = play(scripted_commands());
    let again = play(scripted_commands());
    assert_eq!(live, again, "live runs diverged");

    assert_eq!(live.status, GameStatus::Win);
    assert_eq!(live.tank.coord, Coord::new(2, 3));

    let replayed = replay(&live);
    assert_eq!(live.status, replayed.status);
    assert_eq!(live.tank, replayed.tank);
    assert_eq!(live.board, replayed.board);
    assert_eq!(live.events, replayed.events);
}

#[test]
fn auto_replay_paced_by_the_scheduler_matches_the_live_run() {
    let live = play(scripted_commands());

    let mut session = Session::new(Config::default(), vec![gallery()]);
    let mut events = Vec::new();
    assert!(session.load_level(0, &mut events));
    session.handle(SessionCommand::LoadReplay(live.record.clone()), &mut events);
    session.handle(SessionCommand::ToggleAutoReplay, &mut events);
    assert!(session.scheduler().is_running());

    let mut steps = 0;
    while session.scheduler().is_running() && steps < STEP_BUDGET {
        session.advance(Duration::from_millis(50), &mut events);
        steps += 1;
    }

    assert!(!session.scheduler().is_running());
    assert!(!session.replay_loaded());
    assert_eq!(session.status(), live.status);
    assert_eq!(query::tank(session.world()), live.tank);
    assert_eq!(query::board(session.world()), &live.board);
}

#[test]
fn record_text_matches_the_commands_played() {
    let live = play(scripted_commands());

    assert_eq!(live.record.to_string(), "E3N0NNNNN");
}

#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    status: GameStatus,
    tank: Position,
    board: Board,
    events: Vec<Event>,
    record: laser_tank_core::Replay,
}

fn play(commands: Vec<SessionCommand>) -> Outcome {
    let mut session = Session::new(Config::default(), vec![gallery()]);
    let mut events = Vec::new();
    assert!(session.load_level(0, &mut events));
    events.clear();

    for command in commands {
        session.handle(command, &mut events);
        let _ = session.run_until_idle(&mut events);
    }

    outcome(&session, events)
}

fn replay(live: &Outcome) -> Outcome {
    let mut session = Session::new(Config::default(), vec![gallery()]);
    let mut events = Vec::new();
    assert!(session.load_level(0, &mut events));
    session.handle(SessionCommand::LoadReplay(live.record.clone()), &mut events);
    events.clear();

    let mut steps = 0;
    while session.replay_loaded() && steps < STEP_BUDGET {
        session.handle(SessionCommand::StepReplay, &mut events);
        let _ = session.run_until_idle(&mut events);
        steps += 1;
    }

    outcome(&session, events)
}

fn outcome(session: &Session, events: Vec<Event>) -> Outcome {
    Outcome {
        status: session.status(),
        tank: query::tank(session.world()),
        board: query::board(session.world()).clone(),
        events,
        record: session.record(),
    }
}

/// Turn east and shove the block, then clear the bricks and slide up the ice
/// onto the flag.
fn scripted_commands() -> Vec<SessionCommand> {
    let mut commands = vec![
        SessionCommand::Move(Direction::East),
        SessionCommand::Fire,
        SessionCommand::Move(Direction::North),
        SessionCommand::Fire,
    ];
    commands.extend(std::iter::repeat(SessionCommand::Move(Direction::North)).take(5));
    commands
}

fn gallery() -> Level {
    let mut level = Level::empty(LevelMeta {
        name: "gallery".into(),
        ..LevelMeta::default()
    });
    level.set_code(Coord::new(2, 12), TANK_CODE);
    level.set_code(Coord::new(5, 12), 5);
    level.set_code(Coord::new(2, 9), 6);
    for y in 4..=7 {
        level.set_code(Coord::new(2, y), 24);
    }
    level.set_code(Coord::new(2, 3), 2);
    level
}
