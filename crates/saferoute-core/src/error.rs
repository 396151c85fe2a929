//! Error types for the core crate.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown driving profile: {0}")]
    UnknownProfile(String),
    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}
