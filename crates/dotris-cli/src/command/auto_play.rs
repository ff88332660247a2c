use std::{path::PathBuf, time::Duration};

use dotris_engine::{GameMode, GameSession};
use log::info;

use crate::{
    command::{FieldArg, log_events},
    report,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    #[clap(flatten)]
    pub(super) field: FieldArg,
    /// Give up after this much simulated time
    #[clap(long, default_value_t = 600)]
    duration_secs: u64,
    /// Length of one simulated frame in milliseconds
    #[clap(long, default_value_t = 16)]
    frame_ms: u64,
    /// Write the JSON summary to this file instead of stdout
    #[clap(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        field,
        duration_secs,
        frame_ms,
        output,
    } = arg;

    anyhow::ensure!(*frame_ms > 0, "Frame length must be positive");
    let mut session = field.new_session(GameMode::Auto)?;
    let simulated = simulate(
        &mut session,
        Duration::from_millis(*frame_ms),
        Duration::from_secs(*duration_secs),
    );
    if !session.is_over() {
        info!("time limit reached after {}s", simulated.as_secs());
    }

    let summary = session.quit();
    report::save_summary(&summary, output.as_deref(), false)
}

/// Runs the session frame by frame until it ends or `limit` of simulated time
/// has passed. Returns the simulated time.
fn simulate(session: &mut GameSession, frame: Duration, limit: Duration) -> Duration {
    session.start();
    log_events(session);
    let mut elapsed = Duration::ZERO;
    while !session.is_over() && elapsed < limit {
        session.advance(frame);
        elapsed += frame;
        log_events(session);
    }
    elapsed
}
