//! Augmentation stages, in the order the analyzer runs them.

mod ball_interpolation;
mod camera_motion;
mod kinematics;
mod perspective;
mod possession;
mod statistics;
mod team_classifier;

pub use ball_interpolation::{interpolate_ball, interpolate_boxes};
pub use camera_motion::{
    CameraMotionEstimator, CameraMotionInput, CameraTrajectory, apply_camera_motion,
};
pub use kinematics::KinematicsEstimator;
pub use perspective::PerspectiveTransformer;
pub use possession::{PossessionAssigner, PossessionSeries};
pub use statistics::{MatchSummary, PlayerSummary, StatisticsAggregator, TeamPossession};
pub use team_classifier::TeamClassifier;
