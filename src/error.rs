//! @ai:module:intent Define error types for log extraction and comparison
//! @ai:module:layer domain
//! @ai:module:public_api Error, ParseError, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Failure to convert a matched field of a resource-usage report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("invalid numeric value for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid elapsed time: {value:?}")]
    InvalidDuration { value: String },
}

/// @ai:intent Failures of discovery, extraction and configuration loading
#[derive(Error, Debug)]
pub enum Error {
    #[error("Directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("Failed to read file {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unparsable report {}: {source}", path.display())]
    UnparsableReport {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("No benchmark data found under {}", root.display())]
    NoDataFound { root: PathBuf },

    #[error("Invalid configuration in {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
