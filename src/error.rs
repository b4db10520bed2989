//! The single error type for the owhl library.
//!
//! Validation failures abort the whole call; nothing in here is retried.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OwhlError {
    // =========================================================================
    // === Input validation
    // =========================================================================
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Continuous time series has no natural gaps; a burst length is required")]
    MissingBurstLength,

    #[error("Sampling rate must be positive, got {0}")]
    InvalidSamplingRate(f64),

    #[error("Burst length must be positive, got {0} minutes")]
    InvalidBurstLength(f64),

    #[error("Burst length of {burst_length_minutes} minutes is shorter than one sample at {sampling_rate} Hz")]
    BurstShorterThanSample {
        burst_length_minutes: f64,
        sampling_rate: f64,
    },

    #[error("Latitude is required for depth conversion")]
    MissingLatitude,

    #[error("Unknown time zone: {0}")]
    UnknownTimeZone(String),

    #[error("Unknown analysis method '{0}', expected 'spectral' or 'zero-crossing'")]
    UnknownMethod(String),

    // =========================================================================
    // === Data model invariants
    // =========================================================================
    #[error("Time series is empty")]
    EmptySeries,

    #[error("Length mismatch: {times} timestamps but {values} values")]
    LengthMismatch { times: usize, values: usize },

    #[error("Invalid burst boundaries: {0}")]
    InvalidBounds(String),

    // =========================================================================
    // === Data sufficiency
    // =========================================================================
    #[error("Time series too short: {duration_minutes:.3} minutes available, {burst_length_minutes} requested")]
    SeriesTooShort {
        duration_minutes: f64,
        burst_length_minutes: f64,
    },

    // =========================================================================
    // === External error wrappers
    // =========================================================================
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, OwhlError>;
