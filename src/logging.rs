/// Tracing subscriber setup.
///
/// The terminal is in raw alternate-screen mode while the game runs, so log
/// lines go to a file instead of stderr.
///
///   SHADOWGUIDE_LOG_FILE  path of the log file (default `shadowguide.log`)
///   SHADOWGUIDE_LOG       filter directives, e.g. `debug` or `shadowguide::sim=trace` (default `info`)

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILE: &str = "shadowguide.log";
const FILTER_ENV: &str = "SHADOWGUIDE_LOG";

/// Directives from the environment; blank or invalid input means `info`.
fn filter_from(raw: Option<&str>) -> EnvFilter {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the file subscriber. Returns the log path on success.
/// On failure the game runs without logging.
pub fn init() -> io::Result<PathBuf> {
    let path = std::env::var_os("SHADOWGUIDE_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let raw = std::env::var(FILTER_ENV).ok();

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(raw.as_deref()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn filter_defaults_to_info() {
        assert_eq!(filter_from(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(filter_from(Some("   ")).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn filter_reads_directives() {
        assert_eq!(filter_from(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(filter_from(Some(" warn ")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn bad_directive_falls_back_to_info() {
        assert_eq!(filter_from(Some("shadowguide=loud")).max_level_hint(), Some(LevelFilter::INFO));
    }
}
