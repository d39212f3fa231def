#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives the Laser Tank engine.

mod board_view;
mod level_transfer;
mod settings;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use laser_tank_core::{Coord, Event, Level, LevelMeta, Replay, SessionCommand};
use laser_tank_session::{Session, IDLE_STEP_LIMIT};
use laser_tank_system_navigation::plan_route;
use laser_tank_world::query;

use crate::settings::Settings;

/// Deterministic Laser Tank puzzle engine.
#[derive(Debug, Parser)]
#[command(name = "laser-tank", version, about)]
struct Cli {
    /// Optional TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Play a record against a level and print the final board.
    Play(PlayArgs),
    /// Plan a click-to-navigate route and draw it over the board.
    Route(RouteArgs),
    /// Print a level as a transfer string.
    Export(ExportArgs),
    /// Decode a transfer string into level JSON.
    Import(ImportArgs),
}

#[derive(Debug, Args)]
struct LevelArgs {
    /// JSON file holding an array of levels.
    #[arg(long)]
    levels: PathBuf,
    /// Zero-based index of the level within the pack.
    #[arg(long, default_value_t = 0)]
    level: usize,
}

#[derive(Debug, Args)]
struct PlayArgs {
    #[command(flatten)]
    level: LevelArgs,
    /// Record text such as `NNE3`.
    #[arg(long, conflicts_with = "record_file")]
    record: Option<String>,
    /// File holding recorded command bytes.
    #[arg(long)]
    record_file: Option<PathBuf>,
    /// Pace the replay with the configured render interval.
    #[arg(long)]
    paced: bool,
    /// Print the board after every replay step.
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct RouteArgs {
    #[command(flatten)]
    level: LevelArgs,
    /// Destination cell as `x,y`.
    #[arg(long, value_parser = parse_coord)]
    to: Coord,
    /// Walk the route through the session and print where the tank ends up.
    #[arg(long)]
    walk: bool,
}

#[derive(Debug, Args)]
struct ExportArgs {
    #[command(flatten)]
    level: LevelArgs,
    /// Replacement level name.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// Transfer string produced by `export`.
    transfer: String,
    /// Write the level JSON to this file instead of standard output.
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Entry point for the Laser Tank command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(&settings);

    match cli.command {
        CliCommand::Play(args) => play(&settings, args),
        CliCommand::Route(args) => route(&settings, args),
        CliCommand::Export(args) => export(&settings, args),
        CliCommand::Import(args) => import(args),
    }
}

fn init_logging(settings: &Settings) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_level.as_str()),
    )
    .init();
}

fn load_levels(path: &Path) -> Result<Vec<Level>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level pack at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse level pack at {}", path.display()))
}

fn open_session(settings: &Settings, args: &LevelArgs) -> Result<Session> {
    let levels = load_levels(&args.levels)?;
    let mut session = Session::new(settings.session_config(), levels);
    let mut events = Vec::new();
    if !session.load_level(args.level, &mut events) {
        bail!(
            "level pack {} has no level {}",
            args.levels.display(),
            args.level
        );
    }
    log::info!("{}", query::welcome_banner(session.world()));
    trace_events(&mut events);
    Ok(session)
}

fn trace_events(events: &mut Vec<Event>) {
    for event in events.drain(..) {
        log::trace!("{event:?}");
    }
}

fn read_record(args: &PlayArgs) -> Result<Replay> {
    if let Some(text) = &args.record {
        return text.parse().context("invalid record text");
    }
    if let Some(path) = &args.record_file {
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read record at {}", path.display()))?;
        return Replay::from_codes(&bytes)
            .with_context(|| format!("invalid record bytes in {}", path.display()));
    }
    Ok(Replay::default())
}

fn print_board(session: &Session) {
    let world = session.world();
    print!(
        "{}",
        board_view::render(
            query::board(world),
            query::tank(world),
            query::laser(world),
            &[]
        )
    );
}

fn play(settings: &Settings, args: PlayArgs) -> Result<()> {
    let replay = read_record(&args)?;
    let mut session = open_session(settings, &args.level)?;
    let mut events = Vec::new();
    let commands = replay.len();
    session.handle(SessionCommand::LoadReplay(replay), &mut events);
    trace_events(&mut events);

    if args.paced {
        session.handle(SessionCommand::ToggleAutoReplay, &mut events);
        let interval = settings.session_config().render_interval();
        let mut steps = 0;
        while session.scheduler().is_running() && steps < IDLE_STEP_LIMIT {
            std::thread::sleep(interval);
            session.advance(interval, &mut events);
            trace_events(&mut events);
            steps += 1;
        }
    } else {
        let mut issued = 0;
        while session.replay_loaded() && issued <= commands {
            session.handle(SessionCommand::StepReplay, &mut events);
            let _ = session.run_until_idle(&mut events);
            trace_events(&mut events);
            issued += 1;
            if args.verbose {
                print_board(&session);
            }
        }
    }

    print_board(&session);
    println!("status: {:?}", session.status());
    println!("record: {}", session.record());
    Ok(())
}

fn route(settings: &Settings, args: RouteArgs) -> Result<()> {
    let mut session = open_session(settings, &args.level)?;
    let world = session.world();
    let tank = query::tank(world);
    let Some(path) = plan_route(query::board(world), tank.coord, args.to) else {
        println!("no route to ({}, {})", args.to.x(), args.to.y());
        return Ok(());
    };

    print!(
        "{}",
        board_view::render(query::board(world), tank, None, &path)
    );
    let cells: Vec<String> = path
        .iter()
        .map(|coord| format!("({}, {})", coord.x(), coord.y()))
        .collect();
    println!("route: {}", cells.join(" "));

    if args.walk {
        let mut events = Vec::new();
        session.handle(SessionCommand::Navigate { goal: args.to }, &mut events);
        let steps = session.run_until_idle(&mut events);
        trace_events(&mut events);
        log::debug!("walked in {steps} steps");
        print_board(&session);
        println!("status: {:?}", session.status());
        println!("record: {}", session.record());
    }
    Ok(())
}

fn export(settings: &Settings, args: ExportArgs) -> Result<()> {
    let session = open_session(settings, &args.level)?;
    let source = session
        .levels()
        .get(args.level.level)
        .context("exported level vanished from the pack")?;
    let meta = LevelMeta {
        name: args.name.unwrap_or_else(|| source.name.clone()),
        hint: source.hint.clone(),
        author: source.author.clone(),
        difficulty: source.difficulty,
    };
    let level = session.export_level(meta);
    println!("{}", level_transfer::encode(&level)?);
    Ok(())
}

fn import(args: ImportArgs) -> Result<()> {
    let level = level_transfer::decode(&args.transfer)?;
    let json = serde_json::to_string_pretty(&level).context("failed to serialise level")?;
    match args.output {
        Some(path) => fs::write(&path, json)
            .with_context(|| format!("failed to write level to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn parse_coord(value: &str) -> Result<Coord, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid column `{x}`: {error}"))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid row `{y}`: {error}"))?;
    let coord = Coord::new(x, y);
    if !coord.in_bounds() {
        return Err(format!("({x}, {y}) is off the board"));
    }
    Ok(coord)
}
