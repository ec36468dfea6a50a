use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a map from being produced.
#[derive(Debug, Error)]
pub enum MapError {
    /// The input file is missing or unreadable.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file exists but is not parseable as delimited text.
    #[error("malformed CSV in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    /// An expected column is absent from the header row.
    #[error("{}: expected column `{column}` is missing", path.display())]
    MissingColumn { path: PathBuf, column: String },
    /// A value cell holds something other than a number.
    #[error("{}, line {line}: `{value}` is not a number (column `{column}`)", path.display())]
    InvalidField {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },
    #[error("invalid GeoJSON in {}: {source}", path.display())]
    Geometry {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The same (Code, Year) pair appears twice, so the time grid is ambiguous.
    #[error("duplicate observation for `{code}` in {year}")]
    DuplicateObservation { code: String, year: i32 },
    #[error("`{column}` has no numeric values to build a color scale from")]
    NoValues { column: String },
    /// min >= max, or a bound that is not finite.
    #[error("value range for `{column}` is empty ({min} .. {max})")]
    EmptyValueRange { column: String, min: f64, max: f64 },
    #[error("unknown color scale `{0}`")]
    UnknownColorScale(String),
    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, MapError>;
