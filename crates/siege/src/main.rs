//! Siege - light-cycle duel on an NES nametable
//!
//! Usage: siege [OPTIONS]

use anyhow::{Context, Result};
use clap::{ArgAction, Parser as ClapParser, ValueEnum};
use nes::ppu::{COLS, ROWS};
use nes::soft::SoftConsole;
use siege::screen::tile_to_glyph;
use siege::term::Terminal;
use siege::{Game, GameConfig, GameOutcome, Oracle, Rules};
use std::process;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

/// Collision detection strategy
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum OracleArg {
    /// Occupancy grid updated with every queued write
    #[default]
    Shadow,
    /// Read the cell back from VRAM after a flush
    Readback,
}

#[derive(ClapParser, Debug)]
#[command(name = "siege")]
#[command(author = "Siege Team")]
#[command(version)]
#[command(about = "Two-player light-cycle game on a simulated NES nametable", long_about = None)]
struct Args {
    /// Seed for the computer players (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Collision detection strategy
    #[arg(long, value_enum, default_value = "shadow")]
    oracle: OracleArg,

    /// Frames per move at the start of a game
    #[arg(long, default_value_t = siege::config::START_SPEED)]
    start_speed: u8,

    /// Fewest frames per move reached by the speed ramp
    #[arg(long, default_value_t = siege::config::MAX_SPEED)]
    max_speed: u8,

    /// Score needed to win (with a lead of at least one)
    #[arg(long, default_value_t = siege::config::MAX_SCORE)]
    max_score: u8,

    /// Frames per second in the terminal (0 = as fast as possible)
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Play attract-mode games on the software console and print the result
    #[arg(long)]
    headless: bool,

    /// Number of attract-mode games in headless mode
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.headless);

    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Upper bound on what reaches stderr; the terminal frontend shares the
/// screen with the log
fn level_cap(headless: bool) -> LevelFilter {
    if headless {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    }
}

fn init_logging(verbose: u8, headless: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    tracing_subscriber::registry()
        .with(filter)
        .with(level_cap(headless))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: &Args) -> Result<()> {
    let config = GameConfig {
        rules: Rules {
            start_speed: args.start_speed,
            max_speed: args.max_speed,
            max_score: args.max_score,
        },
        oracle: match args.oracle {
            OracleArg::Shadow => Oracle::Shadow,
            OracleArg::Readback => Oracle::Readback,
        },
        seed: args.seed,
    };
    config.rules.validate().context("invalid rules")?;

    if args.headless {
        run_headless(&config, args.games)
    } else {
        run_terminal(&config, args.fps)
    }
}

fn run_headless(config: &GameConfig, games: u32) -> Result<()> {
    let mut game = Game::new(SoftConsole::new(), config)?;
    for n in 1..=games {
        let Ok(outcome) = game.play_game(true);
        let [p0, p1] = &game.state().players;
        match outcome {
            GameOutcome::Winner(winner) => println!(
                "game {n}: player {} wins {}-{} after {} frames",
                winner + 1,
                p0.score.max(p1.score),
                p0.score.min(p1.score),
                game.hal().frame()
            ),
            GameOutcome::DemoInterrupted => println!("game {n}: interrupted"),
        }
    }

    for y in 0..ROWS {
        let row: String = (0..COLS)
            .map(|x| (tile_to_glyph(game.hal().tile(x, y)) & 0x7F) as char)
            .collect();
        println!("{}", row.trim_end());
    }
    Ok(())
}

fn run_terminal(config: &GameConfig, fps: u32) -> Result<()> {
    let terminal = Terminal::open(fps).context("failed to set up terminal")?;
    let mut game = Game::new(terminal, config)?;
    match game.run() {
        Ok(never) => match never {},
        Err(e) if e.is_quit() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "info");
        assert_eq!(default_level(2), "debug");
        assert_eq!(default_level(5), "trace");
    }

    #[test]
    fn test_terminal_mode_caps_logging_at_warn() {
        assert_eq!(level_cap(false), LevelFilter::WARN);
        assert_eq!(level_cap(true), LevelFilter::TRACE);
    }

    #[test]
    fn test_verbose_flag_is_parsed_with_terminal_mode() {
        let args = Args::parse_from(["siege", "-vv"]);
        assert_eq!(args.verbose, 2);
        assert!(!args.headless);
    }
}
