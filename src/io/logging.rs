use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = ".roster.log";

/// Default filter for a `-v` count when RUST_LOG is unset.
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "roster=warn",
        1 => "roster=info",
        2 => "roster=debug",
        _ => "roster=trace",
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Log to stderr (CLI commands).
pub fn init_stderr(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log to `roster/.roster.log` (TUI), keeping the alternate screen clean.
/// Logging is skipped silently if the file can not be opened.
pub fn init_file(roster_dir: &Path, verbosity: u8) {
    let path = roster_dir.join(LOG_FILE);
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(_) => return,
    };
    // The TUI logs at info by default so fetch activity is recorded
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity.max(1))));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
