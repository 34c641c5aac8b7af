//! Error types surfaced by the capture layer and the session controller
use thiserror::Error;

/// Capture device could not be acquired
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// No input device matched the request
    #[error("no audio input device available")]
    NoDevice,

    /// Device exists but refused to open (permission denied, busy, ...)
    #[error("audio device refused access: {0}")]
    Denied(String),

    /// Device offers a sample format the analyser cannot read
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Stream was built but failed to start or run
    #[error("audio stream error: {0}")]
    Stream(#[from] anyhow::Error),
}

/// Parameter snapshot rejected by validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Value lies outside the declared range of its key
    #[error("{key} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        key: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// NaN or infinite value
    #[error("{key} is not a finite number")]
    NotFinite { key: &'static str },
}

/// Session lifecycle errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// `start` called while a session is already running
    #[error("a session is already active, stop it first")]
    AlreadyActive,

    #[error("audio capture unavailable: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("invalid parameters: {0}")]
    Config(#[from] ConfigError),
}
