//! Pipeline configuration.
//!
//! Every stage takes a plain config struct whose `Default` carries the constants
//! tuned for broadcast footage. The whole set can be loaded from YAML; missing keys
//! fall back to those defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for the camera motion compensator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraMotionConfig {
    /// Column bands `[start, end)` searched for background features
    pub feature_columns: Vec<[u32; 2]>,
    pub max_corners: usize,
    /// Minimum corner response relative to the strongest corner
    pub quality_level: f32,
    /// Minimum spacing between accepted corners in pixels
    pub min_distance: f32,
    /// Side of the structure-tensor window
    pub block_size: usize,
    /// Side of the Lucas-Kanade patch
    pub window_size: usize,
    pub pyramid_levels: usize,
    pub max_iterations: usize,
    pub epsilon: f32,
    /// Displacements shorter than this (pixels) are treated as no motion
    pub min_motion: f32,
    /// Fewer successfully tracked features than this yields zero motion
    pub min_features: usize,
}

impl Default for CameraMotionConfig {
    fn default() -> Self {
        Self {
            feature_columns: vec![[0, 20], [900, 1050]],
            max_corners: 100,
            quality_level: 0.3,
            min_distance: 3.0,
            block_size: 7,
            window_size: 15,
            pyramid_levels: 3,
            max_iterations: 10,
            epsilon: 0.03,
            min_motion: 5.0,
            min_features: 4,
        }
    }
}

/// Pitch calibration for the perspective transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerspectiveConfig {
    /// Pixel corners matching pitch corners `(0, width)`, `(0, 0)`, `(length, 0)`,
    /// `(length, width)`, in that order
    pub pixel_corners: [[f32; 2]; 4],
    /// Court extent along the x axis in meters
    pub court_length: f32,
    /// Court extent along the y axis in meters
    pub court_width: f32,
}

impl Default for PerspectiveConfig {
    fn default() -> Self {
        Self {
            pixel_corners: [[110.0, 1035.0], [265.0, 275.0], [910.0, 260.0], [1640.0, 915.0]],
            court_length: 23.32,
            court_width: 68.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    pub frame_rate: f32,
    /// Sampling window length in frames
    pub frame_window: usize,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            frame_rate: 24.0,
            frame_window: 5,
        }
    }
}

impl KinematicsConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(Error::invalid_config(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if self.frame_window == 0 {
            return Err(Error::invalid_config("frame_window must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    /// Include referees in calibration and classification
    pub classify_referees: bool,
    /// Iteration cap for every 2-means run
    pub kmeans_iterations: usize,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            classify_referees: false,
            kmeans_iterations: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionConfig {
    /// Pickup radius in pixels between the ball center and a player's feet
    pub max_player_ball_distance: f32,
}

impl Default for PossessionConfig {
    fn default() -> Self {
        Self {
            max_player_ball_distance: 70.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Players seen in this many trailing frames are reported
    pub tail_frames: usize,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self { tail_frames: 2 }
    }
}

/// Configuration for the whole augmentation pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub camera_motion: CameraMotionConfig,
    pub perspective: PerspectiveConfig,
    pub kinematics: KinematicsConfig,
    pub team: TeamConfig,
    pub possession: PossessionConfig,
    pub statistics: StatisticsConfig,
}

impl PipelineConfig {
    /// Parse and validate a YAML config.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        self.kinematics.validate()
    }
}
