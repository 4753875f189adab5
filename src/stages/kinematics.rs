//! Windowed speed and cumulative distance per player.

use rayon::prelude::*;
use tracing::info;

use crate::config::KinematicsConfig;
use crate::error::Result;
use crate::ledger::{ObjectClass, ObjectId, TrackLedger};

/// Kinematics written back to one player's track in one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    frame: usize,
    speed: Option<f32>,
    distance: f32,
}

/// Speed and distance estimator.
///
/// Pitch positions are sampled every `frame_window` frames. The speed over a window is
/// written to every frame inside it, which smooths out per-frame detection jitter.
#[derive(Debug, Clone)]
pub struct KinematicsEstimator {
    config: KinematicsConfig,
}

impl KinematicsEstimator {
    /// Fails with [`Error::InvalidConfig`](crate::Error::InvalidConfig) for a
    /// non-positive frame rate or an empty window.
    pub fn new(config: KinematicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Fill `speed` and `distance` for every player track.
    pub fn estimate(&self, ledger: &mut TrackLedger) {
        let ids = ledger.object_ids(ObjectClass::Player);
        let shared: &TrackLedger = ledger;
        let results: Vec<(ObjectId, Vec<Sample>)> = ids
            .par_iter()
            .map(|&id| (id, self.player_samples(shared, id)))
            .collect();

        let mut written = 0usize;
        for (id, samples) in results {
            for sample in samples {
                if let Some(track) = ledger
                    .frame_mut(sample.frame)
                    .and_then(|frame| frame.players.get_mut(&id))
                {
                    track.speed = sample.speed;
                    track.distance = Some(sample.distance);
                    written += 1;
                }
            }
        }
        info!(players = ids.len(), written, "speed and distance estimated");
    }

    fn player_samples(&self, ledger: &TrackLedger, id: ObjectId) -> Vec<Sample> {
        let n = ledger.len();
        let window = self.config.frame_window;
        let mut total = 0.0f32;
        let mut samples = Vec::new();

        for start in (0..n).step_by(window) {
            let end = (start + window).min(n - 1);
            let stop = if end == n - 1 && (start < end || start == 0) {
                end + 1
            } else {
                end
            };
            if !(start..stop).any(|f| ledger.track(f, ObjectClass::Player, id).is_some()) {
                continue;
            }

            let endpoints = (
                ledger
                    .track(start, ObjectClass::Player, id)
                    .and_then(|t| t.position_transformed),
                ledger
                    .track(end, ObjectClass::Player, id)
                    .and_then(|t| t.position_transformed),
            );
            let mut speed = None;
            if let (Some(from), Some(to)) = endpoints {
                let elapsed = (end - start) as f32 / self.config.frame_rate;
                if end > start && elapsed > 0.0 {
                    let covered = (to - from).norm();
                    total += covered;
                    speed = Some(covered / elapsed * 3.6);
                }
            }

            for frame in start..stop {
                if ledger.track(frame, ObjectClass::Player, id).is_some() {
                    samples.push(Sample {
                        frame,
                        speed,
                        distance: total,
                    });
                }
            }
        }
        samples
    }
}
