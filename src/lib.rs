//! Track augmentation for football match video.
//!
//! Takes per-frame tracker output (players, referees, ball) and enriches it with
//! camera-compensated positions, pitch coordinates, speed and distance, team
//! membership and ball possession, then reduces the result to a match summary.

pub mod config;
pub mod error;
pub mod integration;
pub mod ledger;
pub mod persistence;
pub mod stages;
pub mod vision;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use integration::{
    BoxFormat, FrameDetectionsBuilder, MatchAnalysis, MatchAnalyzer, RecordedSource, TrackSource,
};
pub use ledger::{
    BALL_ID, FrameDetections, FrameTracks, ObjectClass, ObjectId, Rect, Rgb, Team, Track,
    TrackLedger,
};
pub use stages::{CameraMotionInput, CameraTrajectory, MatchSummary, PossessionSeries};
pub use vision::FrameImage;
