//! Descriptive statistics over numeric series.

mod summary;

pub use summary::*;

use thiserror::Error;

/// Statistics error types.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StatsError {
    #[error("input must not be empty")]
    EmptyInput,
}
