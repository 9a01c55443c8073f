//! Errors that may be returned by methods in the crate.
use std::fmt;
use std::io;

/// Failure kinds for a pipeline run. Every error is fatal: a stage either
/// fully succeeds or the whole run aborts with one of these.
#[derive(Debug)]
pub enum Error {
    /// The backing dataset file is missing, unreadable, or malformed.
    DataUnavailable(String),
    /// A hyperparameter or structural setting is out of its valid range.
    InvalidConfig(String),
    /// Incompatible shapes or lengths between consecutive stages.
    DimensionMismatch { expected: usize, found: usize },
    /// Training produced a non-finite loss or non-finite parameters.
    OptimizationFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DataUnavailable(msg) => write!(f, "data unavailable: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {}, found {}", expected, found)
            }
            Error::OptimizationFailure(msg) => write!(f, "optimization failure: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Error {
        Error::DataUnavailable(error.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Error {
        Error::DataUnavailable(error.to_string())
    }
}
