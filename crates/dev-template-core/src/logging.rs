//! Logger setup for the binary
//!
//! Normal runs log warnings to stderr. Debug runs log everything to a fresh
//! timestamped file in the log directory, keeping only the newest few files.

use crate::config::paths;
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Number of debug log files kept in the log directory
pub const MAX_LOG_FILES: usize = 5;

const LOG_PREFIX: &str = "dev-template-";
const LOG_EXTENSION: &str = ".log";

/// Install the global logger.
///
/// Returns the log file path when `debug` is set.
pub fn init(debug: bool) -> Result<Option<PathBuf>> {
    let mut builder = env_logger::Builder::new();

    if !debug {
        builder
            .filter_level(log::LevelFilter::Warn)
            .format_timestamp(None)
            .try_init()?;
        return Ok(None);
    }

    let dir = paths::log_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    // Make room for the file about to be created
    prune_logs(&dir, MAX_LOG_FILES - 1)
        .with_context(|| format!("Failed to prune old logs in {}", dir.display()))?;

    let path = dir.join(log_file_name(chrono::Local::now()));
    let file = fs::File::create(&path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    builder
        .filter_level(log::LevelFilter::Debug)
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;

    log::debug!("{} {} debug log", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    Ok(Some(path))
}

/// File name for a log started at `now`; sorts chronologically
pub fn log_file_name<Tz: chrono::TimeZone>(now: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}{}{}", LOG_PREFIX, now.format("%Y%m%d-%H%M%S%.3f"), LOG_EXTENSION)
}

/// Delete all but the newest `keep` log files in `dir`. Returns how many were removed.
pub fn prune_logs(dir: &Path, keep: usize) -> io::Result<usize> {
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_log_file(path))
        .collect();

    if logs.len() <= keep {
        return Ok(0);
    }

    logs.sort();
    let excess = logs.len() - keep;
    for old in &logs[..excess] {
        fs::remove_file(old)?;
    }
    Ok(excess)
}

fn is_log_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(LOG_PREFIX) && n.ends_with(LOG_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn test_log_file_name() {
        let at = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(log_file_name(at), "dev-template-20240309-140507.000.log");
    }

    #[test]
    fn test_prune_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=7 {
            touch(dir.path(), &format!("dev-template-2024010{}-120000.000.log", day));
        }
        touch(dir.path(), "notes.txt");

        assert_eq!(prune_logs(dir.path(), 5).unwrap(), 2);

        let mut left: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        left.sort();
        assert_eq!(left.len(), 6);
        assert_eq!(left[0], "dev-template-20240103-120000.000.log");
        assert!(left.contains(&"notes.txt".to_string()));
    }

    #[test]
    fn test_prune_under_limit_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "dev-template-20240101-120000.000.log");
        assert_eq!(prune_logs(dir.path(), 5).unwrap(), 0);
    }
}
