use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Per-user application directory name under the home directory.
pub const APP_DIR: &str = ".bike-dashboard";

/// Dataset file name looked for by [`discover_data_path`].
pub const DATA_FILE: &str = "bike_sharing_data_cleaned.csv";

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the `~/.bike-dashboard/` directory hierarchy exists.
///
/// Creates, if absent:
/// - `~/.bike-dashboard/`
/// - `~/.bike-dashboard/logs/`
/// - `~/.bike-dashboard/data/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    for sub in [dir.clone(), dir.join("logs"), dir.join("data")] {
        std::fs::create_dir_all(&sub)
            .with_context(|| format!("failed to create {}", sub.display()))?;
    }
    Ok(())
}

/// Log file used by the interactive view when `--log-file` is not given.
pub fn default_log_path() -> PathBuf {
    app_dir().join("logs").join("bike-dashboard.log")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map the upper-case `--log-level` names onto `EnvFilter` directives.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive,
/// falling back to `"info"` if it is not recognised. Output goes to
/// `log_file` when given (appending, no ANSI colours) and to stderr when
/// `to_stderr` is set. The TUI owns the terminal, so the dashboard view
/// passes `to_stderr = false`.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>, to_stderr: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Locate the dataset when `--data` was not given and none was remembered.
///
/// Checks, in order, and returns the first file that exists:
/// 1. `./bike_sharing_data_cleaned.csv`
/// 2. `./data/bike_sharing_data_cleaned.csv`
/// 3. `./Dashboard/bike_sharing_data_cleaned.csv`
/// 4. `~/.bike-dashboard/data/bike_sharing_data_cleaned.csv`
pub fn discover_data_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    discover_data_path_in(&cwd, dirs::home_dir().as_deref())
}

/// [`discover_data_path`] rooted at explicit directories.
pub fn discover_data_path_in(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let mut candidates = vec![
        cwd.join(DATA_FILE),
        cwd.join("data").join(DATA_FILE),
        cwd.join("Dashboard").join(DATA_FILE),
    ];
    if let Some(home) = home {
        candidates.push(home.join(APP_DIR).join("data").join(DATA_FILE));
    }
    candidates.into_iter().find(|p| p.is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
