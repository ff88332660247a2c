use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context as _;
use dotris_engine::GameSummary;

/// Writes `summary` as pretty JSON to `path`, or to stdout without one.
///
/// With `with_board` the final field is printed first, one ASCII row per line.
pub(crate) fn save_summary(
    summary: &GameSummary,
    path: Option<&Path>,
    with_board: bool,
) -> anyhow::Result<()> {
    let target = path.map_or_else(|| "stdout".to_owned(), |path| path.display().to_string());
    let mut writer: Box<dyn Write> = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {target}"))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };
    write_summary(&mut writer, summary, with_board)
        .with_context(|| format!("Failed to write summary to {target}"))
}

fn write_summary<W: Write>(
    writer: &mut W,
    summary: &GameSummary,
    with_board: bool,
) -> io::Result<()> {
    if with_board {
        writeln!(writer, "{}", summary.field)?;
    }
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    writer.flush()
}
