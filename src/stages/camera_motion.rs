//! Camera motion compensation.
//!
//! Background corners are picked in column bands that lie off the playing surface,
//! tracked frame to frame with pyramidal Lucas-Kanade, and their median shift is taken
//! as the camera's image-space displacement. Track positions are then corrected by the
//! cumulative displacement so that a stationary object keeps a stationary position.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::CameraMotionConfig;
use crate::error::{Error, Result};
use crate::ledger::TrackLedger;
use crate::vision::{
    CornerParams, FrameImage, GrayImage, LucasKanade, Pyramid, good_features_to_track,
};

/// Where per-frame camera displacements come from. The caller chooses explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraMotionInput {
    /// Estimate from the frame images.
    Compute,
    /// Per-frame displacements from an earlier run; must cover every frame.
    Precomputed(Vec<[f32; 2]>),
}

/// Per-frame camera displacement and its running sum from frame 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraTrajectory {
    displacements: Vec<Vector2<f32>>,
    cumulative: Vec<Vector2<f32>>,
}

impl CameraTrajectory {
    pub fn from_displacements(displacements: Vec<Vector2<f32>>) -> Self {
        let cumulative = displacements
            .iter()
            .scan(Vector2::zeros(), |total: &mut Vector2<f32>, d| {
                *total += d;
                Some(*total)
            })
            .collect();
        Self {
            displacements,
            cumulative,
        }
    }

    /// Trajectory with no motion at all.
    pub fn stationary(frames: usize) -> Self {
        Self::from_displacements(vec![Vector2::zeros(); frames])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.displacements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.displacements.is_empty()
    }

    /// Displacement between frame `index - 1` and frame `index`.
    pub fn displacement(&self, index: usize) -> Option<Vector2<f32>> {
        self.displacements.get(index).copied()
    }

    /// Cumulative displacement from frame 0 to frame `index`.
    pub fn offset(&self, index: usize) -> Option<Vector2<f32>> {
        self.cumulative.get(index).copied()
    }

    /// Per-frame displacements in the form accepted by
    /// [`CameraMotionInput::Precomputed`].
    pub fn to_precomputed(&self) -> Vec<[f32; 2]> {
        self.displacements.iter().map(|d| [d.x, d.y]).collect()
    }
}

/// Estimates camera pan between consecutive frames.
#[derive(Debug, Clone)]
pub struct CameraMotionEstimator {
    config: CameraMotionConfig,
    flow: LucasKanade,
    corners: CornerParams,
}

impl CameraMotionEstimator {
    pub fn new(config: CameraMotionConfig) -> Self {
        let flow = LucasKanade::new(config.window_size, config.max_iterations, config.epsilon);
        let corners = CornerParams {
            max_corners: config.max_corners,
            quality_level: config.quality_level,
            min_distance: config.min_distance,
            block_size: config.block_size,
        };
        Self {
            config,
            flow,
            corners,
        }
    }

    /// Produce the trajectory for `frames` from the selected input.
    pub fn resolve(
        &self,
        input: CameraMotionInput,
        frames: &[FrameImage],
    ) -> Result<CameraTrajectory> {
        match input {
            CameraMotionInput::Compute => Ok(self.estimate(frames)),
            CameraMotionInput::Precomputed(values) => {
                if values.len() != frames.len() {
                    return Err(Error::CameraMotionLength {
                        expected: frames.len(),
                        got: values.len(),
                    });
                }
                info!(frames = values.len(), "using precomputed camera motion");
                Ok(CameraTrajectory::from_displacements(
                    values.into_iter().map(|[x, y]| Vector2::new(x, y)).collect(),
                ))
            }
        }
    }

    /// Estimate the displacement of every frame relative to its predecessor.
    pub fn estimate(&self, frames: &[FrameImage]) -> CameraTrajectory {
        let mut displacements = Vec::with_capacity(frames.len());
        let mut previous: Option<(GrayImage, Pyramid)> = None;

        for (index, frame) in frames.iter().enumerate() {
            let gray = GrayImage::from_rgb(frame);
            let pyramid = Pyramid::build(gray.clone(), self.config.pyramid_levels);

            let displacement = match &previous {
                Some((prev_gray, prev_pyramid)) => {
                    self.estimate_pair(prev_gray, prev_pyramid, &pyramid, index)
                }
                None => Vector2::zeros(),
            };
            displacements.push(displacement);
            previous = Some((gray, pyramid));
        }

        let moving = displacements.iter().filter(|d| d.norm() > 0.0).count();
        info!(frames = frames.len(), moving, "camera motion estimated");
        CameraTrajectory::from_displacements(displacements)
    }

    fn estimate_pair(
        &self,
        prev_gray: &GrayImage,
        prev: &Pyramid,
        curr: &Pyramid,
        index: usize,
    ) -> Vector2<f32> {
        let features =
            good_features_to_track(prev_gray, &self.config.feature_columns, &self.corners);
        if features.len() < self.config.min_features {
            warn!(frame = index, found = features.len(), "too few background features");
            return Vector2::zeros();
        }

        let shifts: Vec<Vector2<f32>> = features
            .iter()
            .zip(self.flow.track(prev, curr, &features))
            .filter_map(|(old, new)| new.map(|p: Point2<f32>| p - *old))
            .collect();
        if shifts.len() < self.config.min_features {
            warn!(frame = index, tracked = shifts.len(), "too few features tracked");
            return Vector2::zeros();
        }

        let dominant = Vector2::new(
            median(shifts.iter().map(|s| s.x).collect()),
            median(shifts.iter().map(|s| s.y).collect()),
        );
        debug!(frame = index, dx = dominant.x, dy = dominant.y, "camera shift");

        if dominant.norm() > self.config.min_motion {
            dominant
        } else {
            Vector2::zeros()
        }
    }
}

fn median(mut values: Vec<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        0.5 * (values[mid - 1] + values[mid])
    } else {
        values[mid]
    }
}

/// Set `position_adjusted` on every track from the cumulative camera offset.
pub fn apply_camera_motion(ledger: &mut TrackLedger, trajectory: &CameraTrajectory) -> Result<()> {
    if trajectory.len() != ledger.len() {
        return Err(Error::FrameCountMismatch {
            frames: trajectory.len(),
            ledger: ledger.len(),
        });
    }

    for (index, frame) in ledger.frames_mut().iter_mut().enumerate() {
        let offset = trajectory.offset(index).unwrap_or_else(Vector2::zeros);
        for track in frame.tracks_mut() {
            track.position_adjusted = Some(track.position - offset);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{FrameDetections, ObjectClass, Rect};
    use ndarray::Array3;

    /// Textured frame whose content is shifted right by `shift` pixels.
    fn textured_frame(shift: f32) -> FrameImage {
        Array3::from_shape_fn((120, 160, 3), |(y, x, _)| {
            let fx = x as f32 - shift;
            let v = 128.0 + 60.0 * (fx * 0.3).sin() * (y as f32 * 0.27).cos();
            v as u8
        })
    }

    fn config() -> CameraMotionConfig {
        CameraMotionConfig {
            feature_columns: vec![[0, 40], [120, 160]],
            min_motion: 1.0,
            max_iterations: 20,
            pyramid_levels: 2,
            ..CameraMotionConfig::default()
        }
    }

    #[test]
    fn test_trajectory_cumulates() {
        let traj = CameraTrajectory::from_displacements(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(2.0, 1.0),
            Vector2::new(3.0, -1.0),
        ]);
        assert_eq!(traj.offset(2), Some(Vector2::new(5.0, 0.0)));
        assert_eq!(traj.to_precomputed(), vec![[0.0, 0.0], [2.0, 1.0], [3.0, -1.0]]);
    }

    #[test]
    fn test_static_frames_have_no_motion() {
        let estimator = CameraMotionEstimator::new(config());
        let frames = vec![textured_frame(0.0), textured_frame(0.0)];
        let traj = estimator.estimate(&frames);
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.offset(1), Some(Vector2::zeros()));
    }

    #[test]
    fn test_featureless_frames_degrade_to_zero() {
        let estimator = CameraMotionEstimator::new(config());
        let frames = vec![Array3::from_elem((60, 80, 3), 90u8); 3];
        let traj = estimator.estimate(&frames);
        assert_eq!(traj, CameraTrajectory::stationary(3));
    }

    #[test]
    fn test_pan_is_detected() {
        let estimator = CameraMotionEstimator::new(config());
        let frames = vec![textured_frame(0.0), textured_frame(3.0)];
        let d = estimator.estimate(&frames).displacement(1).unwrap();
        assert!((d.x - 3.0).abs() < 0.5, "dx = {}", d.x);
        assert!(d.y.abs() < 0.5, "dy = {}", d.y);
    }

    #[test]
    fn test_precomputed_length_is_checked() {
        let estimator = CameraMotionEstimator::new(config());
        let frames = vec![textured_frame(0.0); 2];
        let err = estimator
            .resolve(CameraMotionInput::Precomputed(vec![[0.0, 0.0]]), &frames)
            .unwrap_err();
        assert!(matches!(err, Error::CameraMotionLength { expected: 2, got: 1 }));

        let traj = estimator
            .resolve(CameraMotionInput::Precomputed(vec![[0.0, 0.0], [4.0, 2.0]]), &frames)
            .unwrap();
        assert_eq!(traj.offset(1), Some(Vector2::new(4.0, 2.0)));
    }

    #[test]
    fn test_apply_subtracts_cumulative_offset() {
        let mut det = FrameDetections::default();
        det.players.insert(1, Rect::from_tlbr(10.0, 10.0, 20.0, 40.0));
        let mut ledger = TrackLedger::from_detections(&[det.clone(), det]);
        let traj = CameraTrajectory::from_displacements(vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(5.0, -2.0),
        ]);

        apply_camera_motion(&mut ledger, &traj).unwrap();
        let adjusted = ledger.track(1, ObjectClass::Player, 1).unwrap().position_adjusted;
        assert_eq!(adjusted, Some(Point2::new(10.0, 42.0)));

        let short = CameraTrajectory::stationary(1);
        assert!(apply_camera_motion(&mut ledger, &short).is_err());
    }
}
