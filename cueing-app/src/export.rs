use anyhow::{Context, Result};
use cueing_experiment::SessionStateMachine;
use cueing_layout::sequence_csv;
use cueing_timing::Timer;
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SNAPSHOT_FILE: &str = "layouts_debug.json";
pub const CSV_FILE: &str = "layouts.csv";

/// Writes the full layout corpus as pretty JSON.
pub fn write_snapshot<T, R>(dir: &Path, session: &SessionStateMachine<T, R>) -> Result<PathBuf>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(SNAPSHOT_FILE);
    let json = session
        .debug_snapshot()
        .to_json()
        .context("serialising layout snapshot")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "layout snapshot written");
    Ok(path)
}

/// Writes one CSV row per glyph per main trial.
pub fn write_csv<T, R>(dir: &Path, session: &SessionStateMachine<T, R>) -> Result<PathBuf>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(CSV_FILE);
    std::fs::write(&path, sequence_csv(session.sequence()))
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "layout csv written");
    Ok(path)
}
