use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use concentration_core::{Engine, GameConfig, GameResult, VirtualScheduler, ViewEvent};
use serde::Serialize;
use web_time::Instant;

use crate::player::{Player, PlayerKind, new_player};

mod player;

/// Upper bound on selections in one game, a random player needs a few hundred.
const MAX_STEPS: usize = 100_000;

#[derive(Parser, Debug)]
#[command(version, about = "Plays Concentration with a simulated player", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// TOML file with game timings and star limits
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the delay before a completed pair is resolved
    #[arg(long)]
    reveal_delay_ms: Option<u64>,

    /// Override the elapsed-time tick period
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Who is playing
    #[arg(short, long, value_enum, default_value_t = PlayerKind::Memory)]
    player: PlayerKind,

    /// Virtual time the player takes before each selection
    #[arg(long, default_value_t = 700)]
    think_ms: u64,

    /// Number of games to play in a row
    #[arg(short = 'n', long, default_value_t = 1)]
    games: u32,

    /// Print results as JSON lines
    #[arg(long)]
    json: bool,

    /// Print every view event as it happens
    #[arg(long)]
    events: bool,

    /// Sleep so that virtual time passes at wall-clock speed
    #[arg(long)]
    realtime: bool,
}

#[derive(Serialize, Debug)]
struct GameSummary {
    game: u32,
    seed: u64,
    #[serde(flatten)]
    result: GameResult,
}

fn init_logging(verbose: &Verbosity<WarnLevel>) {
    use tracing_subscriber::filter::LevelFilter;

    let level = match verbose.log_level_filter() {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read config {}", path.display()))?;
    let config: GameConfig = toml::from_str(&text)
        .with_context(|| format!("Could not parse config {}", path.display()))?;
    log::debug!("Loaded {:?} from {}", config, path.display());
    Ok(config)
}

fn build_config(args: &Args) -> anyhow::Result<GameConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(reveal_delay_ms) = args.reveal_delay_ms {
        config.reveal_delay_ms = reveal_delay_ms;
    }
    if let Some(tick_interval_ms) = args.tick_interval_ms {
        config.tick_interval_ms = tick_interval_ms;
    }
    Ok(config.validate()?)
}

type CliEngine = Engine<Vec<ViewEvent>, VirtualScheduler>;

fn deliver_events(engine: &mut CliEngine, player: &mut dyn Player, print: bool) {
    for event in engine.view_mut().drain(..) {
        if print {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(err) => log::warn!("Could not render {:?}: {}", event, err),
            }
        }
        player.observe(&event);
    }
}

/// Virtual time to let pass before the player can act again. While a pair is being evaluated
/// this reaches at least the next scheduled task, so a zero think time still makes progress.
fn wait_time(engine: &CliEngine, think: Duration) -> Duration {
    if engine.state().accepts_selection() {
        return think;
    }
    let scheduler = engine.scheduler();
    match scheduler.next_due() {
        Some(due) => think.max(due.saturating_sub(scheduler.now())),
        None => think,
    }
}

/// Sleeps until the wall clock since `started` catches up with the virtual clock.
fn keep_pace(engine: &CliEngine, started: Instant) {
    let behind = engine.scheduler().now().saturating_sub(started.elapsed());
    if !behind.is_zero() {
        std::thread::sleep(behind);
    }
}

/// Plays the current game of `engine` to the end. `started` is the wall-clock origin of the
/// virtual clock, used only with `--realtime`.
fn play_game(
    engine: &mut CliEngine,
    player: &mut dyn Player,
    args: &Args,
    started: Instant,
) -> anyhow::Result<GameResult> {
    let think = Duration::from_millis(args.think_ms);
    deliver_events(engine, player, args.events);

    for _ in 0..MAX_STEPS {
        if let Some(result) = engine.result() {
            return Ok(result);
        }

        if engine.state().accepts_selection() {
            match player.choose(engine.deck()) {
                Some(id) => {
                    let outcome = engine.select_card(id);
                    log::trace!("Selected {}: {:?}", id, outcome);
                }
                None => bail!("Player found nothing to select in {:?}", engine.state()),
            }
            deliver_events(engine, player, args.events);
        }

        engine.advance(wait_time(engine, think));
        if args.realtime {
            keep_pace(engine, started);
        }
        deliver_events(engine, player, args.events);
    }

    bail!("Game did not finish within {} steps", MAX_STEPS)
}

fn print_summary(summary: &GameSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(summary)?);
    } else {
        let GameResult {
            moves,
            elapsed_secs,
            stars,
        } = summary.result;
        println!(
            "game {}: {} moves in {}s, {} star{}",
            summary.game,
            moves,
            elapsed_secs,
            stars,
            if stars.count() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose);

    let config = build_config(&args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("seed: {}", seed);

    let started = Instant::now();
    let mut engine = Engine::new(config, seed, Vec::new(), VirtualScheduler::new());
    let mut player = new_player(args.player, seed);

    let mut total_moves = 0u64;
    for game in 1..=args.games {
        if game > 1 {
            engine.restart();
        }
        let result = play_game(&mut engine, player.as_mut(), &args, started)?;
        total_moves += u64::from(result.moves);
        print_summary(&GameSummary { game, seed, result }, args.json)?;
    }

    if args.games > 1 {
        log::info!(
            "{} games, {:.1} moves on average",
            args.games,
            total_moves as f64 / f64::from(args.games)
        );
    }
    log::info!(
        "Played {:?} of game time in {:?}",
        engine.scheduler().now(),
        started.elapsed()
    );
    Ok(())
}
