use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dotris_engine::{GameConfig, GameEvent, GameMode, GameSession, PieceSeed};
use log::{debug, info};

use self::{auto_play::AutoPlayArg, run_script::RunScriptArg};

mod auto_play;
mod run_script;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log more (-v for debug, -vv for trace). `RUST_LOG` takes precedence
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Let the engine play an auto-mode session and report the result
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Apply a string of one-character intents to a fresh session
    RunScript(#[clap(flatten)] RunScriptArg),
}

/// Session options shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FieldArg {
    /// Field width in cells
    #[clap(long, default_value_t = 10)]
    width: i32,
    /// Field height in cells
    #[clap(long, default_value_t = 20)]
    height: i32,
    /// Gravity mode: standard, endless or auto
    #[clap(long)]
    mode: Option<GameMode>,
    /// Number of preview pieces
    #[clap(long = "next", default_value_t = GameConfig::DEFAULT_NEXT_COUNT)]
    next_count: usize,
    /// Color scheme name recorded in snapshots
    #[clap(long, default_value = GameConfig::DEFAULT_COLOR_SCHEME)]
    color_scheme: String,
    /// Piece sequence seed (32 hex characters)
    #[clap(long)]
    seed: Option<PieceSeed>,
}

impl FieldArg {
    fn to_config(&self, default_mode: GameMode) -> GameConfig {
        let config = GameConfig::new(self.width, self.height)
            .with_mode(self.mode.unwrap_or(default_mode))
            .with_next_count(self.next_count)
            .with_color_scheme(self.color_scheme.clone());
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    pub(crate) fn new_session(&self, default_mode: GameMode) -> anyhow::Result<GameSession> {
        GameSession::new(self.to_config(default_mode)).context("Invalid game configuration")
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logger(args.verbose);
    match args.mode {
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::RunScript(arg) => run_script::run(&arg)?,
    }
    Ok(())
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Drains the session's pending events into the log.
pub(crate) fn log_events(session: &mut GameSession) {
    for event in session.drain_events() {
        match event {
            GameEvent::ScoreUpdate {
                lines,
                score,
                level,
            } => debug!("score {score}, lines {lines}, level {level}"),
            GameEvent::Message { text } if text.is_empty() => {}
            GameEvent::Message { text } => info!("{}", text.replace('\n', " / ")),
            GameEvent::GameOver => debug!("game over event received"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_script_with_field_options() {
        let args = CommandArgs::try_parse_from([
            "dotris",
            "-v",
            "run-script",
            "hhk",
            "--width",
            "8",
            "--mode",
            "endless",
            "--seed",
            "0123456789abcdef0123456789abcdef",
        ])
        .unwrap();
        assert_eq!(args.verbose, 1);
        let Mode::RunScript(arg) = args.mode else {
            panic!("expected run-script");
        };
        let config = arg.field.to_config(GameMode::Standard);
        assert_eq!(config.field_width(), 8);
        assert_eq!(config.field_height(), 20);
        assert_eq!(config.mode(), GameMode::Endless);
        assert!(config.seed().is_some());
    }

    #[test]
    fn test_auto_play_defaults_to_auto_mode() {
        let args = CommandArgs::try_parse_from(["dotris", "auto-play"]).unwrap();
        let Mode::AutoPlay(arg) = args.mode else {
            panic!("expected auto-play");
        };
        let config = arg.field.to_config(GameMode::Auto);
        assert_eq!(config.mode(), GameMode::Auto);
        assert_eq!(config.next_count(), GameConfig::DEFAULT_NEXT_COUNT);
        assert_eq!(config.color_scheme(), "standard");
    }

    #[test]
    fn test_rejects_bad_mode_and_seed() {
        assert!(CommandArgs::try_parse_from(["dotris", "auto-play", "--mode", "turbo"]).is_err());
        assert!(CommandArgs::try_parse_from(["dotris", "auto-play", "--seed", "xyz"]).is_err());
    }

    #[test]
    fn test_invalid_field_is_reported() {
        let args = CommandArgs::try_parse_from(["dotris", "auto-play", "--width", "2"]).unwrap();
        let Mode::AutoPlay(arg) = args.mode else {
            panic!("expected auto-play");
        };
        let err = arg.field.new_session(GameMode::Auto).unwrap_err();
        assert!(format!("{err:#}").contains("at least 4"));
    }
}
