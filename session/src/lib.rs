#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command processor that owns a Laser Tank world and everything built
//! around it: undo history, the save-position checkpoint, the frame buffer
//! used for scrubbing, the replay cursor, click-to-navigate and the tick
//! scheduler that paces multi-frame sequences.

mod scheduler;

use std::time::Duration;

use laser_tank_core::{
    BoardCommand, Command, Coord, Direction, Event, GameStatus, Level, LevelMeta, Position,
    Replay, SessionCommand,
};
use laser_tank_system_navigation::Navigation;
use laser_tank_world::{self as world, query, Playfield, World};

pub use scheduler::{Config, Scheduler, DEFAULT_RENDER_INTERVAL};

/// Upper bound on the steps [`Session::run_until_idle`] performs.
///
/// Forced tank motion can cycle forever, for example between two facing
/// tank movers, so draining the scheduler must be bounded.
pub const IDLE_STEP_LIMIT: usize = 100_000;

/// Single save-position slot.
#[derive(Clone, Debug)]
struct Checkpoint {
    field: Playfield,
    record: Vec<BoardCommand>,
}

/// Loaded replay and the position of the next command to issue.
#[derive(Clone, Debug)]
struct ReplayCursor {
    commands: Vec<BoardCommand>,
    index: usize,
    /// History length before each issued command.
    marks: Vec<usize>,
    auto: bool,
}

impl ReplayCursor {
    fn new(replay: Replay) -> Self {
        Self {
            commands: replay.commands().to_vec(),
            index: 0,
            marks: Vec::new(),
            auto: false,
        }
    }

    fn next_command(&self) -> Option<BoardCommand> {
        self.commands.get(self.index).copied()
    }
}

/// Interactive Laser Tank session over a pack of levels.
#[derive(Debug)]
pub struct Session {
    world: World,
    levels: Vec<Level>,
    level_index: Option<usize>,
    history: Vec<Playfield>,
    record: Vec<BoardCommand>,
    frames: Vec<Playfield>,
    frame_index: usize,
    checkpoint: Option<Checkpoint>,
    replay: Option<ReplayCursor>,
    navigation: Navigation,
    scheduler: Scheduler,
    revision: u64,
}

impl Session {
    /// Creates a session over `levels` without loading any of them.
    #[must_use]
    pub fn new(config: Config, levels: Vec<Level>) -> Self {
        Self {
            world: World::new(),
            levels,
            level_index: None,
            history: Vec::new(),
            record: Vec::new(),
            frames: Vec::new(),
            frame_index: 0,
            checkpoint: None,
            replay: None,
            navigation: Navigation::new(),
            scheduler: Scheduler::new(config.render_interval()),
            revision: 0,
        }
    }

    /// Loads the level at `index`, returning whether it exists.
    ///
    /// Reloading the current level keeps the undo history and the saved
    /// position; switching to another level clears both.
    pub fn load_level(&mut self, index: usize, out: &mut Vec<Event>) -> bool {
        let Some(level) = self.levels.get(index) else {
            log::debug!("no level at index {index}");
            return false;
        };
        let parsed = level.parse();
        log::info!("loading level {index} \"{}\"", level.name);

        self.stop_motion();
        world::apply(
            &mut self.world,
            Command::LoadLevel {
                board: parsed.board,
                tank: parsed.tank,
            },
            out,
        );
        self.record.clear();
        self.frames.clear();
        self.frame_index = 0;
        self.replay = None;
        if self.level_index != Some(index) {
            self.history.clear();
            self.checkpoint = None;
            self.level_index = Some(index);
        }
        self.bump_revision();
        true
    }

    /// Processes one session command, appending world events to `out`.
    pub fn handle(&mut self, command: SessionCommand, out: &mut Vec<Event>) {
        if !matches!(command, SessionCommand::Navigate { .. }) {
            self.navigation.cancel();
        }

        match command {
            SessionCommand::Move(direction) => {
                if self.accepts_live_input() {
                    let _ = self.submit(BoardCommand::Move(direction), out);
                }
            }
            SessionCommand::Fire => {
                if self.accepts_live_input() {
                    let facing = query::tank(&self.world).direction;
                    let _ = self.submit(BoardCommand::Fire(facing), out);
                }
            }
            SessionCommand::FireToward { target } => {
                if self.accepts_live_input() {
                    self.fire_toward(target, out);
                }
            }
            SessionCommand::Undo => self.undo(),
            SessionCommand::Restart => {
                if let Some(index) = self.level_index {
                    let _ = self.load_level(index, out);
                }
            }
            SessionCommand::SavePosition => self.save_position(),
            SessionCommand::RestorePosition => self.restore_position(),
            SessionCommand::NextLevel => {
                let next = self.level_index.map_or(0, |index| index + 1);
                let _ = self.load_level(next, out);
            }
            SessionCommand::PrevLevel => {
                if let Some(previous) = self.level_index.and_then(|index| index.checked_sub(1)) {
                    let _ = self.load_level(previous, out);
                }
            }
            SessionCommand::PrevFrame => {
                if !self.frames.is_empty() && !query::is_rendering(&self.world) {
                    let index = (self.frame_index + 1).min(self.frames.len() - 1);
                    self.show_frame(index);
                }
            }
            SessionCommand::NextFrame => {
                if !self.frames.is_empty() && !query::is_rendering(&self.world) {
                    self.show_frame(self.frame_index.saturating_sub(1));
                }
            }
            SessionCommand::LoadReplay(replay) => self.load_replay(replay, out),
            SessionCommand::StepReplay => self.step_replay(out),
            SessionCommand::StepReplayBack => self.step_replay_back(),
            SessionCommand::CloseReplay => self.replay = None,
            SessionCommand::ToggleAutoReplay => {
                if let Some(cursor) = self.replay.as_mut() {
                    cursor.auto = !cursor.auto;
                    log::debug!("auto replay {}", if cursor.auto { "on" } else { "off" });
                }
            }
            SessionCommand::Edit { coord, placement } => {
                let edit = Command::PlaceTile { coord, placement };
                if !self.leave_scrubbing() && query::accepts(&self.world, &edit) {
                    let emitted = out.len();
                    world::apply(&mut self.world, edit, out);
                    if out.len() > emitted {
                        self.frames.clear();
                        self.bump_revision();
                    }
                }
            }
            SessionCommand::Navigate { goal } => {
                if self.accepts_live_input() {
                    let tank = query::tank(&self.world);
                    let _ = self
                        .navigation
                        .navigate(query::board(&self.world), tank, goal);
                }
            }
        }

        self.reschedule();
    }

    /// Feeds elapsed time to the scheduler and runs every step that fell due.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let due = self.scheduler.advance(dt);
        for _ in 0..due {
            if !self.step(out) {
                self.scheduler.cancel();
                break;
            }
        }
    }

    /// Runs scheduled steps back to back until nothing is left to do.
    ///
    /// Returns the number of steps taken, at most [`IDLE_STEP_LIMIT`].
    pub fn run_until_idle(&mut self, out: &mut Vec<Event>) -> usize {
        let mut steps = 0;
        while steps < IDLE_STEP_LIMIT {
            if !self.step(out) {
                self.scheduler.cancel();
                return steps;
            }
            steps += 1;
        }
        log::warn!("session still busy after {IDLE_STEP_LIMIT} steps");
        steps
    }

    /// Read-only access to the world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Levels of the loaded pack.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Index of the level being played.
    #[must_use]
    pub const fn level_index(&self) -> Option<usize> {
        self.level_index
    }

    /// Outcome of the active attempt.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        query::status(&self.world)
    }

    /// Commands accepted since the level was loaded.
    #[must_use]
    pub fn record(&self) -> Replay {
        Replay::new(self.record.clone())
    }

    /// Number of undoable commands.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of frames captured for the last command.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// How many frames back from the latest one the view is scrubbed.
    #[must_use]
    pub const fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Reports whether a save-position checkpoint exists.
    #[must_use]
    pub const fn position_saved(&self) -> bool {
        self.checkpoint.is_some()
    }

    /// Reports whether a replay is loaded.
    #[must_use]
    pub const fn replay_loaded(&self) -> bool {
        self.replay.is_some()
    }

    /// Index of the next replay command, when a replay is loaded.
    #[must_use]
    pub fn replay_index(&self) -> Option<usize> {
        self.replay.as_ref().map(|cursor| cursor.index)
    }

    /// Reports whether the loaded replay steps on its own.
    #[must_use]
    pub fn auto_replay(&self) -> bool {
        self.replay.as_ref().map_or(false, |cursor| cursor.auto)
    }

    /// Click-to-navigate state.
    #[must_use]
    pub const fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// Tick scheduler state.
    #[must_use]
    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Counter bumped whenever the visible state is replaced wholesale.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Maps the live board back to a level carrying `meta`.
    #[must_use]
    pub fn export_level(&self, meta: LevelMeta) -> Level {
        Level::from_board(
            query::board(&self.world),
            query::tank(&self.world).coord,
            meta,
        )
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Live input is refused while a replay drives the board. While
    /// scrubbing, the input only returns the view to the latest frame.
    fn accepts_live_input(&mut self) -> bool {
        if self.replay.is_some() {
            log::debug!("ignored live input while a replay is loaded");
            return false;
        }
        !self.leave_scrubbing()
    }

    /// Returns to the latest frame. Reports whether the view was scrubbed.
    fn leave_scrubbing(&mut self) -> bool {
        if self.frame_index == 0 {
            return false;
        }
        self.show_frame(0);
        true
    }

    /// Issues a board command through the world, recording it on success.
    ///
    /// A shot aimed away from the tank's facing turns the tank first. The
    /// turn and the shot share one history entry and one record entry.
    fn submit(&mut self, command: BoardCommand, out: &mut Vec<Event>) -> bool {
        let facing = query::tank(&self.world).direction;
        let (world_command, turn) = match command {
            BoardCommand::Move(direction) => (Command::Move { direction }, None),
            BoardCommand::Fire(direction) => {
                (Command::Fire, Some(direction).filter(|&aim| aim != facing))
            }
        };
        if !query::accepts(&self.world, &world_command) {
            log::debug!("rejected {command:?}");
            return false;
        }

        let before = query::snapshot(&self.world);
        self.history.push(before.clone());
        self.record.push(command);
        self.frames.clear();
        self.frames.push(before);
        self.frame_index = 0;

        if let Some(direction) = turn {
            world::apply(&mut self.world, Command::Move { direction }, out);
        }
        world::apply(&mut self.world, world_command, out);
        true
    }

    fn fire_toward(&mut self, target: Coord, out: &mut Vec<Event>) {
        let tank = query::tank(&self.world);
        let direction = aim(tank, target);
        if direction != tank.direction && !self.submit(BoardCommand::Move(direction), out) {
            return;
        }
        let _ = self.submit(BoardCommand::Fire(direction), out);
    }

    fn undo(&mut self) {
        let Some(field) = self.history.pop() else {
            return;
        };
        self.stop_motion();
        let _ = self.record.pop();
        self.frames.clear();
        self.frame_index = 0;
        world::restore(&mut self.world, field);
        self.bump_revision();
    }

    fn save_position(&mut self) {
        if self.frame_index > 0 || query::is_rendering(&self.world) {
            return;
        }
        self.checkpoint = Some(Checkpoint {
            field: query::snapshot(&self.world),
            record: self.record.clone(),
        });
    }

    fn restore_position(&mut self) {
        let Some(checkpoint) = self.checkpoint.clone() else {
            return;
        };
        self.stop_motion();
        self.record = checkpoint.record;
        self.frames.clear();
        self.frame_index = 0;
        world::restore(&mut self.world, checkpoint.field);
        self.bump_revision();
    }

    fn show_frame(&mut self, index: usize) {
        let Some(field) = self
            .frames
            .len()
            .checked_sub(1 + index)
            .and_then(|position| self.frames.get(position))
        else {
            return;
        };
        world::restore(&mut self.world, field.clone());
        self.frame_index = index;
        self.bump_revision();
    }

    fn load_replay(&mut self, replay: Replay, out: &mut Vec<Event>) {
        let Some(index) = self.level_index else {
            return;
        };
        if self.load_level(index, out) {
            log::info!("loaded replay of {} commands", replay.len());
            self.replay = Some(ReplayCursor::new(replay));
        }
    }

    /// Issues the next replay command. The replay closes once its last
    /// command has been issued.
    fn step_replay(&mut self, out: &mut Vec<Event>) {
        if query::is_rendering(&self.world) {
            return;
        }
        let _ = self.leave_scrubbing();
        let history_len = self.history.len();
        let Some(cursor) = self.replay.as_mut() else {
            return;
        };
        let Some(command) = cursor.next_command() else {
            self.replay = None;
            return;
        };
        cursor.index += 1;
        cursor.marks.push(history_len);
        let finished = cursor.index >= cursor.commands.len();

        let _ = self.submit(command, out);
        if finished {
            log::debug!("replay finished");
            self.replay = None;
        }
    }

    fn step_replay_back(&mut self) {
        let Some(cursor) = self.replay.as_mut() else {
            return;
        };
        let Some(mark) = cursor.marks.pop() else {
            return;
        };
        cursor.index = cursor.index.saturating_sub(1);
        cursor.auto = false;
        while self.history.len() > mark {
            self.undo();
        }
    }

    /// Cancels every scheduled continuation.
    fn stop_motion(&mut self) {
        self.navigation.cancel();
        self.scheduler.cancel();
    }

    fn has_work(&self) -> bool {
        query::is_rendering(&self.world) || self.navigation.is_active() || self.auto_replay()
    }

    fn reschedule(&mut self) {
        if self.has_work() {
            self.scheduler.start();
        } else {
            self.scheduler.cancel();
        }
    }

    /// Runs one scheduled step: a render frame, else a navigation step,
    /// else an auto-replay step. Returns whether anything ran.
    fn step(&mut self, out: &mut Vec<Event>) -> bool {
        if query::is_rendering(&self.world) {
            world::apply(&mut self.world, Command::RenderFrame, out);
            self.frames.push(query::snapshot(&self.world));
            return true;
        }
        if self.status() != GameStatus::Playing {
            self.navigation.cancel();
            if let Some(cursor) = self.replay.as_mut() {
                cursor.auto = false;
            }
            return false;
        }

        if self.navigation.is_active() {
            let mut commands = Vec::new();
            let tank = query::tank(&self.world);
            self.navigation
                .handle(query::board(&self.world), tank, &mut commands);
            let mut issued = false;
            for command in commands {
                if self.submit(command, out) {
                    issued = true;
                } else {
                    self.navigation.cancel();
                }
            }
            if issued {
                return true;
            }
        }

        if self.auto_replay() {
            self.step_replay(out);
            return true;
        }
        false
    }
}

/// Direction of the dominant axis from the tank toward `target`; vertical
/// wins ties. Aiming at the tank's own cell keeps the current facing.
#[must_use]
pub fn aim(tank: Position, target: Coord) -> Direction {
    let dx = target.x() - tank.coord.x();
    let dy = target.y() - tank.coord.y();
    if dx == 0 && dy == 0 {
        tank.direction
    } else if dy >= dx.abs() {
        Direction::South
    } else if -dy >= dx.abs() {
        Direction::North
    } else if dx > 0 {
        Direction::East
    } else {
        Direction::West
    }
}
