//! Error types for the track augmentation pipeline.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a pipeline run.
///
/// Degraded inputs (missing ball detections, featureless backgrounds, points off the
/// pitch) are not errors; they are absorbed by the stage that sees them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("frame count mismatch: {frames} frames but {ledger} ledger entries")]
    FrameCountMismatch { frames: usize, ledger: usize },

    #[error("precomputed camera motion has {got} entries, expected {expected}")]
    CameraMotionLength { expected: usize, got: usize },

    #[error("degenerate pitch calibration: {0}")]
    DegenerateCalibration(String),

    #[error("team calibration failed: {0}")]
    TeamCalibration(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("track source failed at frame {frame}: {message}")]
    Source { frame: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn degenerate<S: Into<String>>(msg: S) -> Self {
        Self::DegenerateCalibration(msg.into())
    }

    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn team_calibration<S: Into<String>>(msg: S) -> Self {
        Self::TeamCalibration(msg.into())
    }
}
