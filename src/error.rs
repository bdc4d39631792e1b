use std::path::PathBuf;
use thiserror::Error;

/// The main error type for gcpconv operations.
#[derive(Debug, Error)]
pub enum GcpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse marker XML from {path}: {message}")]
    MarkerXmlParse { path: PathBuf, message: String },

    #[error("Failed to write GCP file to {path}: {source}")]
    GcpWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CRS table from {path}: {source}")]
    CrsTableParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid CRS table {path}: {message}")]
    CrsTableInvalid { path: PathBuf, message: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
