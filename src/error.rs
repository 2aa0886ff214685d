use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// a non-empty row that is not made of exactly six comma-separated fields
    #[error("line {line}: expected 6 fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: invalid {field} value {value:?}: {source}")]
    ParseInt {
        line: usize,
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
    /// no first record to take the reference start time from
    #[error("no data rows to take the reference start time from")]
    EmptyInput,
    /// start minus the reference start does not fit in an i64
    #[error("start {start} is too far from the reference start {tmin}")]
    TimeOverflow { start: i64, tmin: i64 },
    #[error("failed to draw the chart: {0}")]
    Render(String),
    #[error("could not write image to {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Error {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
