use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the bike-sharing dashboard crates.
#[derive(Error, Debug)]
pub enum RidesError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader or writer failed (malformed quoting, ragged rows, ...).
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the dataset header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A cell could not be parsed as its declared type.
    #[error("Invalid value {value:?} in column {column} on line {line}: expected {expected}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
        expected: &'static str,
    },

    /// `total = casual + registered` does not hold for a row (opt-in check).
    #[error("Total mismatch on line {line}: casual {casual} + registered {registered} != total {total}")]
    TotalMismatch {
        line: u64,
        casual: f64,
        registered: f64,
        total: f64,
    },

    /// A categorical code has no label in its dimension's mapping.
    #[error("Unknown {dimension} code: {code}")]
    UnknownCode { dimension: &'static str, code: i64 },

    /// A group label is not part of the caller-supplied category order.
    #[error("Category {0:?} is not in the requested order")]
    UnknownCategory(String),

    /// A mean was requested over zero elements.
    #[error("Mean over an empty group: {0}")]
    EmptyGroup(String),

    /// An hour-of-day value outside 0..=23.
    #[error("Hour out of range (0-23): {0}")]
    HourOutOfRange(i64),

    /// Grouping by cluster was requested before clusters were assigned.
    #[error("Cluster labels have not been assigned")]
    ClusterNotAssigned,

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RidesError {
    /// Whether the error means the input file itself is malformed.
    pub fn is_data_format(&self) -> bool {
        matches!(
            self,
            RidesError::Csv(_)
                | RidesError::MissingColumn(_)
                | RidesError::InvalidValue { .. }
                | RidesError::TotalMismatch { .. }
        )
    }
}

/// Convenience alias used throughout the rides crates.
pub type Result<T> = std::result::Result<T, RidesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = RidesError::FileRead {
            path: PathBuf::from("/some/rides.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/rides.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = RidesError::MissingColumn("cnt".to_string());
        assert_eq!(err.to_string(), "Missing required column: cnt");
    }

    #[test]
    fn test_error_display_invalid_value() {
        let err = RidesError::InvalidValue {
            line: 7,
            column: "temp".to_string(),
            value: "warm".to_string(),
            expected: "number",
        };
        assert_eq!(
            err.to_string(),
            "Invalid value \"warm\" in column temp on line 7: expected number"
        );
    }

    #[test]
    fn test_error_display_unknown_code() {
        let err = RidesError::UnknownCode {
            dimension: "season",
            code: 9,
        };
        assert_eq!(err.to_string(), "Unknown season code: 9");
    }

    #[test]
    fn test_error_display_unknown_category() {
        let err = RidesError::UnknownCategory("Monsoon".to_string());
        assert_eq!(
            err.to_string(),
            "Category \"Monsoon\" is not in the requested order"
        );
    }

    #[test]
    fn test_error_display_empty_group() {
        let err = RidesError::EmptyGroup("cnt".to_string());
        assert_eq!(err.to_string(), "Mean over an empty group: cnt");
    }

    #[test]
    fn test_error_display_hour_out_of_range() {
        let err = RidesError::HourOutOfRange(24);
        assert_eq!(err.to_string(), "Hour out of range (0-23): 24");
    }

    #[test]
    fn test_error_display_config() {
        let err = RidesError::Config("bandwidth must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: bandwidth must be positive"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RidesError = io_err.into();
        assert!(err.to_string().contains("denied"));
        assert!(!err.is_data_format());
    }

    #[test]
    fn test_data_format_classification() {
        assert!(RidesError::MissingColumn("hr".to_string()).is_data_format());
        assert!(RidesError::TotalMismatch {
            line: 2,
            casual: 1.0,
            registered: 2.0,
            total: 4.0,
        }
        .is_data_format());
        assert!(!RidesError::HourOutOfRange(30).is_data_format());
        assert!(!RidesError::EmptyGroup("x".to_string()).is_data_format());
    }
}
