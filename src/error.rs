use polars::prelude::PolarsError;
use std::fmt;
use thiserror::Error;

/// A single as-of year whose frame could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearFailure {
    pub year: i32,
    pub reason: String,
}

impl fmt::Display for YearFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.year, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("null value in required column `{column}` at row {row}")]
    InputContract { column: &'static str, row: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cumulative votes overflowed for `{entity}` as of {year}")]
    VoteOverflow { entity: String, year: i32 },

    #[error("frame computation cancelled")]
    Cancelled,

    #[error("{} year(s) failed: {}", .0.len(), join_failures(.0))]
    YearsFailed(Vec<YearFailure>),
}

fn join_failures(failures: &[YearFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, LeaderboardError>;
