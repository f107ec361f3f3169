//! CSV loading for the bike-sharing dataset.
//!
//! Column names are resolved once against the header row; every data row is
//! then parsed into a typed [`Observation`]. Loading is all-or-nothing: the
//! first malformed row aborts the load.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use rides_core::categories::time_bucket_for;
use rides_core::models::Observation;
use rides_core::{Result, RidesError};
use tracing::{debug, info};

use crate::clustering;

/// Suffix carried by the left-hand columns of the merged dataset.
const MERGE_SUFFIX: &str = "_x";

const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Columns ───────────────────────────────────────────────────────────────────

/// A required input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Hour,
    Season,
    Weather,
    Holiday,
    Temperature,
    Windspeed,
    Casual,
    Registered,
    Total,
}

impl Column {
    pub const COUNT: usize = 10;

    pub const ALL: [Column; Column::COUNT] = [
        Column::Date,
        Column::Hour,
        Column::Season,
        Column::Weather,
        Column::Holiday,
        Column::Temperature,
        Column::Windspeed,
        Column::Casual,
        Column::Registered,
        Column::Total,
    ];

    /// Canonical header name, also used by the exporter.
    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }

    /// Accepted header spellings, canonical first.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Date => &["dteday", "date"],
            Column::Hour => &["hr", "hour"],
            Column::Season => &["season"],
            Column::Weather => &["weathersit", "weather"],
            Column::Holiday => &["holiday"],
            Column::Temperature => &["temp", "temperature"],
            Column::Windspeed => &["windspeed"],
            Column::Casual => &["casual"],
            Column::Registered => &["registered"],
            Column::Total => &["cnt", "count", "total"],
        }
    }

    fn matches(self, header: &str) -> bool {
        let header = header.trim().to_ascii_lowercase();
        let base = header.strip_suffix(MERGE_SUFFIX).unwrap_or(&header);
        self.aliases().contains(&base)
    }
}

/// Optional derived column written by the exporter.
pub const CLUSTER_COLUMN: &str = "cluster";

/// Header positions of every required column.
#[derive(Debug, Clone)]
struct ColumnMap {
    indices: [usize; Column::COUNT],
    cluster: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let mut indices = [0usize; Column::COUNT];
        for (slot, column) in indices.iter_mut().zip(Column::ALL) {
            *slot = headers
                .iter()
                .position(|h| column.matches(h))
                .ok_or_else(|| RidesError::MissingColumn(column.name().to_string()))?;
        }
        let cluster = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(CLUSTER_COLUMN));
        Ok(Self { indices, cluster })
    }

    fn cell<'r>(&self, record: &'r StringRecord, column: Column) -> &'r str {
        let idx = self.indices[column as usize];
        record.get(idx).unwrap_or("").trim()
    }

    fn parse_row(&self, record: &StringRecord, line: u64) -> Result<Observation> {
        let invalid = |column: Column, value: &str, expected: &'static str| RidesError::InvalidValue {
            line,
            column: column.name().to_string(),
            value: value.to_string(),
            expected,
        };

        let raw_date = self.cell(record, Column::Date);
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .map_err(|_| invalid(Column::Date, raw_date, "date (YYYY-MM-DD)"))?;

        let raw_hour = self.cell(record, Column::Hour);
        let hour: i64 = raw_hour
            .parse()
            .map_err(|_| invalid(Column::Hour, raw_hour, "integer hour"))?;
        let time_bucket = time_bucket_for(hour)?;

        let code = |column: Column| -> Result<u8> {
            let raw = self.cell(record, column);
            raw.parse::<u8>()
                .map_err(|_| invalid(column, raw, "integer code"))
        };
        let number = |column: Column| -> Result<f64> {
            let raw = self.cell(record, column);
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid(column, raw, "finite number"))
        };

        let cluster = match self.cluster.and_then(|idx| record.get(idx)).map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<usize>().map_err(|_| RidesError::InvalidValue {
                line,
                column: CLUSTER_COLUMN.to_string(),
                value: raw.to_string(),
                expected: "cluster index",
            })?),
        };

        Ok(Observation {
            date,
            // time_bucket_for accepted it, so it fits in 0..=23.
            hour: hour as u8,
            season: code(Column::Season)?,
            weather: code(Column::Weather)?,
            holiday: code(Column::Holiday)?,
            temperature: number(Column::Temperature)?,
            windspeed: number(Column::Windspeed)?,
            casual: number(Column::Casual)?,
            registered: number(Column::Registered)?,
            total: number(Column::Total)?,
            time_bucket,
            cluster,
        })
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Knobs for [`read_observations`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Fail when a row's total differs from casual + registered.
    pub validate_totals: bool,
}

/// Parse every row of a CSV stream into observations.
pub fn read_observations<R: Read>(reader: R, options: LoadOptions) -> Result<Vec<Observation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = ColumnMap::resolve(&headers)?;
    debug!(?columns, "Resolved dataset columns");

    let mut observations = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1.
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);
        let obs = columns.parse_row(&record, line)?;

        if options.validate_totals && !obs.total_is_consistent() {
            return Err(RidesError::TotalMismatch {
                line,
                casual: obs.casual,
                registered: obs.registered,
                total: obs.total,
            });
        }
        observations.push(obs);
    }

    Ok(observations)
}

/// Open `path` and parse it with [`read_observations`].
pub fn load_observations(path: &Path, options: LoadOptions) -> Result<Vec<Observation>> {
    let file = File::open(path).map_err(|e| RidesError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let observations = read_observations(BufReader::new(file), options)?;
    info!(
        path = %path.display(),
        rows = observations.len(),
        "Loaded bike-sharing observations"
    );
    Ok(observations)
}

// ── RecordStore ───────────────────────────────────────────────────────────────

/// The loaded dataset. Filled once, then only read.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    source: Option<PathBuf>,
    records: Vec<Observation>,
}

impl RecordStore {
    /// Load the dataset at `path`.
    pub fn load(path: &Path, options: LoadOptions) -> Result<Self> {
        Ok(Self {
            source: Some(path.to_path_buf()),
            records: load_observations(path, options)?,
        })
    }

    /// Wrap already-parsed observations.
    pub fn from_records(records: Vec<Observation>) -> Self {
        Self {
            source: None,
            records,
        }
    }

    /// Where the records came from, if loaded from disk.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn records(&self) -> &[Observation] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compute the derived cluster label for every record.
    ///
    /// Returns the number of clusters found.
    pub fn assign_clusters(&mut self, bandwidth: f64) -> Result<usize> {
        clustering::assign_clusters(&mut self.records, bandwidth)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rides_core::categories::TimeBucket;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "dteday,hr,season,weathersit,holiday,temp,windspeed,casual,registered,cnt";

    fn read(csv: &str) -> Result<Vec<Observation>> {
        read_observations(csv.as_bytes(), LoadOptions::default())
    }

    #[test]
    fn test_reads_canonical_columns() {
        let csv = format!("{HEADER}\n2011-01-01,0,1,1,0,0.24,0.0,3,13,16\n2011-01-01,13,1,2,0,0.46,0.29,47,47,94\n");
        let rows = read(&csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2011, 1, 1).unwrap());
        assert_eq!(rows[0].hour, 0);
        assert_eq!(rows[0].time_bucket, TimeBucket::Night);
        assert_eq!(rows[0].total, 16.0);
        assert_eq!(rows[1].weather, 2);
        assert_eq!(rows[1].time_bucket, TimeBucket::Afternoon);
        assert!(rows[1].cluster.is_none());
    }

    #[test]
    fn test_reads_merged_suffix_columns_and_ignores_extras() {
        let csv = "instant,dteday_x,season_x,yr_x,mnth_x,hr,holiday_x,weathersit_x,temp_x,atemp_x,windspeed_x,casual_x,registered_x,cnt_x,cnt_y\n\
                   1,2012-06-15,2,1,6,8,0,1,0.66,0.62,0.1,50,400,450,9999\n";
        let rows = read(csv).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].season, 2);
        assert_eq!(rows[0].month(), 6);
        assert_eq!(rows[0].total, 450.0);
        assert!((rows[0].temperature - 0.66).abs() < 1e-12);
        assert_eq!(rows[0].time_bucket, TimeBucket::Morning);
    }

    #[test]
    fn test_missing_column_fails() {
        let csv = "dteday,hr,season,weathersit,holiday,temp,windspeed,casual,registered\n2011-01-01,0,1,1,0,0.2,0.1,1,2\n";
        match read(csv) {
            Err(RidesError::MissingColumn(col)) => assert_eq!(col, "cnt"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_number_fails_whole_load() {
        let csv = format!("{HEADER}\n2011-01-01,0,1,1,0,0.24,0.0,3,13,16\n2011-01-01,1,1,1,0,warm,0.0,3,13,16\n");
        match read(&csv) {
            Err(RidesError::InvalidValue {
                line,
                column,
                value,
                ..
            }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "temp");
                assert_eq!(value, "warm");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_date_and_code_fail() {
        let bad_date = format!("{HEADER}\n01/01/2011,0,1,1,0,0.2,0.1,1,2,3\n");
        assert!(matches!(
            read(&bad_date),
            Err(RidesError::InvalidValue { .. })
        ));

        let bad_code = format!("{HEADER}\n2011-01-01,0,1.5,1,0,0.2,0.1,1,2,3\n");
        let err = read(&bad_code).unwrap_err();
        assert!(err.is_data_format());
    }

    #[test]
    fn test_non_finite_measure_fails() {
        let csv = format!("{HEADER}\n2011-01-01,0,1,1,0,NaN,0.1,1,2,3\n");
        assert!(matches!(read(&csv), Err(RidesError::InvalidValue { .. })));
    }

    #[test]
    fn test_hour_out_of_range_fails() {
        let csv = format!("{HEADER}\n2011-01-01,24,1,1,0,0.2,0.1,1,2,3\n");
        assert!(matches!(read(&csv), Err(RidesError::HourOutOfRange(24))));
    }

    #[test]
    fn test_unknown_codes_are_loaded_but_not_labelled() {
        let csv = format!("{HEADER}\n2011-01-01,0,7,1,0,0.2,0.1,1,2,3\n");
        let rows = read(&csv).unwrap();
        assert_eq!(rows[0].season, 7);
        assert!(rows[0]
            .label(rides_core::categories::Dimension::Season)
            .is_err());
    }

    #[test]
    fn test_validate_totals_opt_in() {
        let csv = format!("{HEADER}\n2011-01-01,0,1,1,0,0.2,0.1,1,2,4\n");
        assert!(read(&csv).is_ok());

        let strict = LoadOptions {
            validate_totals: true,
        };
        match read_observations(csv.as_bytes(), strict) {
            Err(RidesError::TotalMismatch { line, total, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(total, 4.0);
            }
            other => panic!("expected TotalMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_cluster_column_is_restored() {
        let csv = format!("{HEADER},time_bucket,cluster\n2011-01-01,0,1,1,0,0.2,0.1,1,2,3,Night,2\n2011-01-01,1,1,1,0,0.2,0.1,1,2,3,Night,\n");
        let rows = read(&csv).unwrap();
        assert_eq!(rows[0].cluster, Some(2));
        assert_eq!(rows[1].cluster, None);
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let rows = read(&format!("{HEADER}\n")).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_load_observations_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "2011-03-21,18,2,1,0,0.5,0.2,20,80,100").unwrap();

        let store = RecordStore::load(file.path(), LoadOptions::default()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.source(), Some(file.path()));
        assert_eq!(store.records()[0].time_bucket, TimeBucket::Evening);
        assert_eq!(store.records()[0].cluster, None);
    }

    #[test]
    fn test_load_missing_file_is_file_read_error() {
        let err = load_observations(Path::new("/definitely/not/here.csv"), LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, RidesError::FileRead { .. }));
    }
}
