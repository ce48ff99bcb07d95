use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResetError {
    #[error("Device error: {0}")]
    Device(String),

    #[error("Reset hold interrupted after {elapsed:?} of {requested:?}")]
    TimingInterrupted {
        elapsed: Duration,
        requested: Duration,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type ResetResult<T> = std::result::Result<T, ResetError>;
