//! MatchAnalyzer for combining tracking with the augmentation stages.

use std::fmt::Display;

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::ledger::{FrameDetections, TrackLedger};
use crate::stages::{
    CameraMotionEstimator, CameraMotionInput, CameraTrajectory, KinematicsEstimator,
    MatchSummary, PerspectiveTransformer, PossessionAssigner, PossessionSeries,
    StatisticsAggregator, TeamClassifier, apply_camera_motion, interpolate_ball,
};
use crate::vision::FrameImage;

use super::TrackSource;

/// Everything one run produces: the augmented ledger for the renderer, the possession
/// series, the summary, and the camera trajectory for reuse on a later run.
#[derive(Debug, Clone)]
pub struct MatchAnalysis {
    pub ledger: TrackLedger,
    pub possession: PossessionSeries,
    pub summary: MatchSummary,
    pub trajectory: CameraTrajectory,
}

/// End-to-end runner bundling a `TrackSource` with the augmentation stages.
///
/// Stages run strictly in order: camera motion, pitch projection, ball interpolation,
/// kinematics, teams, possession, statistics. A fresh [`TeamClassifier`] is created for
/// every run so no state leaks between videos.
pub struct MatchAnalyzer<S: TrackSource> {
    source: S,
    config: PipelineConfig,
}

impl<S: TrackSource> MatchAnalyzer<S>
where
    S::Error: Display,
{
    /// Create a new analyzer with the given source and pipeline config.
    pub fn new(source: S, config: PipelineConfig) -> Self {
        Self { source, config }
    }

    /// Create a new analyzer with default configuration.
    pub fn with_default_config(source: S) -> Self {
        Self::new(source, PipelineConfig::default())
    }

    /// Track every frame, then run the full augmentation.
    pub fn analyze(
        &mut self,
        frames: &[FrameImage],
        camera_motion: CameraMotionInput,
    ) -> Result<MatchAnalysis> {
        let detections = self.track(frames)?;
        let ledger = TrackLedger::from_detections(&detections);
        self.augment(frames, ledger, camera_motion)
    }

    /// Run the source over all frames in order.
    pub fn track(&mut self, frames: &[FrameImage]) -> Result<Vec<FrameDetections>> {
        let detections = frames
            .iter()
            .enumerate()
            .map(|(index, frame)| {
                self.source
                    .detect_and_track(frame)
                    .map_err(|e| Error::Source {
                        frame: index,
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        info!(frames = detections.len(), "tracking finished");
        Ok(detections)
    }

    /// Augment a ledger produced elsewhere. `frames` and `ledger` must be the same length.
    pub fn augment(
        &self,
        frames: &[FrameImage],
        mut ledger: TrackLedger,
        camera_motion: CameraMotionInput,
    ) -> Result<MatchAnalysis> {
        if frames.len() != ledger.len() {
            return Err(Error::FrameCountMismatch {
                frames: frames.len(),
                ledger: ledger.len(),
            });
        }
        let config = &self.config;

        let trajectory = CameraMotionEstimator::new(config.camera_motion.clone())
            .resolve(camera_motion, frames)?;
        apply_camera_motion(&mut ledger, &trajectory)?;

        let transformer = PerspectiveTransformer::new(&config.perspective)?;
        transformer.transform_ledger(&mut ledger);
        interpolate_ball(&mut ledger, &trajectory, &transformer);
        KinematicsEstimator::new(config.kinematics.clone())?.estimate(&mut ledger);

        let mut teams = TeamClassifier::new(config.team.clone());
        teams.classify_ledger(frames, &mut ledger)?;

        let possession = PossessionAssigner::new(config.possession.clone()).assign(&mut ledger);
        let summary = StatisticsAggregator::new(config.statistics.clone()).summarize(
            &ledger,
            &possession,
            teams.team_colors(),
        );

        Ok(MatchAnalysis {
            ledger,
            possession,
            summary,
            trajectory,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
