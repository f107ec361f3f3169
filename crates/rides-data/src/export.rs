//! CSV export of a record subsequence.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use rides_core::models::Observation;
use rides_core::{Result, RidesError};
use serde::Serialize;
use tracing::info;

/// One exported row. Field names are the canonical dataset column names so
/// the file loads back through [`crate::reader::read_observations`].
#[derive(Serialize)]
struct ExportRow<'a> {
    dteday: NaiveDate,
    hr: u8,
    season: u8,
    weathersit: u8,
    holiday: u8,
    temp: f64,
    windspeed: f64,
    casual: f64,
    registered: f64,
    cnt: f64,
    time_bucket: &'a str,
    cluster: Option<usize>,
}

impl<'a> From<&'a Observation> for ExportRow<'a> {
    fn from(obs: &'a Observation) -> Self {
        Self {
            dteday: obs.date,
            hr: obs.hour,
            season: obs.season,
            weathersit: obs.weather,
            holiday: obs.holiday,
            temp: obs.temperature,
            windspeed: obs.windspeed,
            casual: obs.casual,
            registered: obs.registered,
            cnt: obs.total,
            time_bucket: obs.time_bucket.label(),
            cluster: obs.cluster,
        }
    }
}

/// Write `records` as CSV with a header row.
pub fn write_csv<W: Write>(records: &[Observation], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        // serde only emits the header alongside the first row.
        wtr.write_record([
            "dteday",
            "hr",
            "season",
            "weathersit",
            "holiday",
            "temp",
            "windspeed",
            "casual",
            "registered",
            "cnt",
            "time_bucket",
            "cluster",
        ])?;
    }
    for obs in records {
        wtr.serialize(ExportRow::from(obs))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `records` to `path`, replacing it atomically.
pub fn export_to_path(records: &[Observation], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_file = path.with_extension("csv.tmp");
    let result = File::create(&temp_file)
        .map_err(RidesError::from)
        .and_then(|file| write_csv(records, BufWriter::new(file)))
        .and_then(|()| fs::rename(&temp_file, path).map_err(RidesError::from));

    if result.is_err() {
        let _ = fs::remove_file(&temp_file);
    }
    result?;

    info!(path = %path.display(), rows = records.len(), "Exported filtered records");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
