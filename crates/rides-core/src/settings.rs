use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::categories::{Dimension, TimeBucket};

/// Default mean-shift bandwidth in standardised feature units.
pub const DEFAULT_BANDWIDTH: f64 = 0.8;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Exploratory dashboard for bike-sharing rental data
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bike-dashboard",
    about = "Exploratory dashboard for bike-sharing rental data",
    version
)]
pub struct Settings {
    /// Path to the bike-sharing CSV dataset
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "report"])]
    pub view: String,

    /// Output format of the report view
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Keep only this season (1=Spring, 2=Summer, 3=Fall, 4=Winter)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub season: Option<u8>,

    /// Keep only this weather situation (1=Clear .. 4=Heavy Rain)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub weather: Option<u8>,

    /// Keep only holidays (1) or non-holidays (0)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub holiday: Option<u8>,

    /// Keep only this time of day
    #[arg(long, value_parser = ["night", "morning", "afternoon", "evening"])]
    pub time_of_day: Option<String>,

    /// Write the filtered records to this CSV file
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Mean-shift bandwidth (standardised units)
    #[arg(long, default_value = "0.8", value_parser = parse_bandwidth)]
    pub bandwidth: f64,

    /// Skip the mean-shift clustering step
    #[arg(long)]
    pub no_clustering: bool,

    /// Reject rows where casual + registered != total
    #[arg(long)]
    pub validate_totals: bool,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.bike-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<f64>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".bike-dashboard").join("last_used.json")
    }

    /// Load persisted params from the default path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load persisted params from an explicit path.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        let mut params: Self = serde_json::from_str(&content).unwrap_or_default();
        params.bandwidth = params.bandwidth.filter(|bw| is_valid_bandwidth(*bw));
        params
    }

    /// Atomically write params to the default path.
    pub fn save(&self) -> Result<(), std::io::Error> {
        self.save_to(&Self::config_path())
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. Filters and export targets are per-run and never
        // restored.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "bandwidth") {
            if let Some(v) = last.bandwidth {
                settings.bandwidth = v;
            }
        }
        if settings.data.is_none() {
            settings.data = last.data;
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Categorical filters requested on the command line, as
    /// `(dimension, accepted code)` pairs.
    pub fn filter_pairs(&self) -> Vec<(Dimension, u8)> {
        let mut pairs = Vec::new();
        if let Some(code) = self.season {
            pairs.push((Dimension::Season, code));
        }
        if let Some(code) = self.weather {
            pairs.push((Dimension::Weather, code));
        }
        if let Some(code) = self.holiday {
            pairs.push((Dimension::Holiday, code));
        }
        if let Some(bucket) = self.time_of_day.as_deref().and_then(TimeBucket::from_name) {
            pairs.push((Dimension::TimeBucket, bucket.code()));
        }
        pairs
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            view: Some(s.view.clone()),
            data: s.data.clone(),
            bandwidth: Some(s.bandwidth),
        }
    }
}

/// A usable mean-shift bandwidth is finite and strictly positive.
pub fn is_valid_bandwidth(bandwidth: f64) -> bool {
    bandwidth.is_finite() && bandwidth > 0.0
}

fn parse_bandwidth(raw: &str) -> Result<f64, String> {
    let bandwidth: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if is_valid_bandwidth(bandwidth) {
        Ok(bandwidth)
    } else {
        Err(format!("bandwidth must be finite and positive, got {raw}"))
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
