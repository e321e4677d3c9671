//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the default filter.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "doc_quiz=info,warp=warn";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to stderr. Used by the API server.
pub fn init_stderr(default: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default))
        .with_writer(io::stderr)
        .try_init();
}

/// Append logs to `path`. Used by the terminal client, which owns stderr.
pub fn init_file(path: &Path, default: &str) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
