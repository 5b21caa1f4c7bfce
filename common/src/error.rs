use std::path::PathBuf;

use thiserror::Error;

/// A probe could not deliver a sample.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("temperature probe: {0}")]
    Temperature(String),

    #[error("motion probe: {0}")]
    Motion(String),
}

#[derive(Debug, Error)]
pub enum ClockError {
    #[error("time has not been synchronised yet")]
    NotSynchronized,

    #[error("time source unreachable: {0}")]
    Unreachable(String),
}

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write record: {0}")]
    Write(#[from] csv::Error),

    #[error("cannot flush record: {0}")]
    Flush(#[from] std::io::Error),
}

/// The request never produced an HTTP status.
#[derive(Debug, Error)]
#[error("http transport failed: {0}")]
pub struct TransportError(pub String);

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("cannot encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("endpoint is empty")]
    EmptyEndpoint,

    #[error("{name} is out of range: {value}")]
    InvalidLimit { name: &'static str, value: f32 },

    #[error("connect_max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("over_temperature_streak must be at least 1")]
    ZeroStreak,
}

/// Conditions that stop the monitor before its first cycle.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("network not available after {attempts} attempts")]
    NetworkUnavailable { attempts: u32 },

    #[error("motion sensor not responding")]
    MotionSensorMissing,

    #[error("cannot capture motion baseline: {0}")]
    Baseline(#[source] SensorError),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] RecorderError),
}
