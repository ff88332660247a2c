use std::path::PathBuf;

use anyhow::bail;
use dotris_engine::{GameMode, GameSession};
use log::debug;

use crate::{
    command::{FieldArg, log_events},
    report,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RunScriptArg {
    /// Intents, one per character: h/l move, j soft drop, k or space hard
    /// drop, x/z rotate cw/ccw, c hold, p pause, `.` gravity tick
    script: String,
    #[clap(flatten)]
    pub(super) field: FieldArg,
    /// Write the board and JSON summary to this file instead of stdout
    #[clap(long)]
    output: Option<PathBuf>,
}

/// One scripted player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateClockwise,
    RotateCounterClockwise,
    Hold,
    Pause,
    Tick,
}

impl Intent {
    fn from_char(c: char) -> Option<Self> {
        let intent = match c {
            'h' => Intent::MoveLeft,
            'l' => Intent::MoveRight,
            'j' => Intent::SoftDrop,
            'k' | ' ' => Intent::HardDrop,
            'x' => Intent::RotateClockwise,
            'z' => Intent::RotateCounterClockwise,
            'c' => Intent::Hold,
            'p' => Intent::Pause,
            '.' => Intent::Tick,
            _ => return None,
        };
        Some(intent)
    }

    fn apply(self, session: &mut GameSession) -> bool {
        match self {
            Intent::MoveLeft => session.move_left(),
            Intent::MoveRight => session.move_right(),
            Intent::SoftDrop => session.soft_drop(),
            Intent::HardDrop => session.hard_drop(),
            Intent::RotateClockwise => session.rotate_clockwise(),
            Intent::RotateCounterClockwise => session.rotate_counterclockwise(),
            Intent::Hold => session.hold(),
            Intent::Pause => session.pause(),
            Intent::Tick => session.step_gravity(),
        }
    }
}

/// Parses a script, skipping line breaks and tabs.
fn parse_script(script: &str) -> anyhow::Result<Vec<Intent>> {
    script
        .chars()
        .enumerate()
        .filter(|(_, c)| !matches!(c, '\n' | '\r' | '\t'))
        .map(|(i, c)| match Intent::from_char(c) {
            Some(intent) => Ok(intent),
            None => bail!("Unknown script command {c:?} at position {i}"),
        })
        .collect()
}

/// Starts the session and applies `intents` in order. Returns how many took
/// effect.
fn execute(session: &mut GameSession, intents: &[Intent]) -> usize {
    session.start();
    log_events(session);
    let mut applied = 0;
    for &intent in intents {
        if intent.apply(session) {
            applied += 1;
        } else {
            debug!("{intent:?} had no effect");
        }
        log_events(session);
    }
    applied
}

pub(crate) fn run(arg: &RunScriptArg) -> anyhow::Result<()> {
    let RunScriptArg {
        script,
        field,
        output,
    } = arg;

    let intents = parse_script(script)?;
    let mut session = field.new_session(GameMode::Standard)?;
    let applied = execute(&mut session, &intents);
    debug!("{applied} of {} intents applied", intents.len());

    let summary = session.quit();
    report::save_summary(&summary, output.as_deref(), true)
}
