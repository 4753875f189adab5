//! Per-frame ball ownership and the team possession series.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PossessionConfig;
use crate::ledger::{FrameTracks, ObjectId, Team, TrackLedger};

/// Team in possession for every frame; `0` means no owner has been seen yet.
///
/// A frame without an owner repeats the previous frame's label instead of dropping
/// to unknown, so possession does not flicker while the ball travels between players.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PossessionSeries {
    labels: Vec<u8>,
}

impl PossessionSeries {
    pub const UNKNOWN: u8 = 0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame owned by `team`.
    pub fn record_owner(&mut self, team: Team) {
        self.labels.push(team.label());
    }

    /// Append a frame without an owner: repeat the last label, or unknown.
    pub fn carry_forward(&mut self) {
        let last = self.labels.last().copied().unwrap_or(Self::UNKNOWN);
        self.labels.push(last);
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of frames credited to `team`.
    pub fn frames_for(&self, team: Team) -> usize {
        self.labels.iter().filter(|&&l| l == team.label()).count()
    }

    /// Share of all frames credited to `team`, in percent; zero for an empty series.
    pub fn percentage(&self, team: Team) -> f32 {
        if self.labels.is_empty() {
            return 0.0;
        }
        self.frames_for(team) as f32 / self.labels.len() as f32 * 100.0
    }
}

/// Assigns the ball to the nearest player within the pickup radius.
#[derive(Debug, Clone)]
pub struct PossessionAssigner {
    config: PossessionConfig,
}

impl PossessionAssigner {
    pub fn new(config: PossessionConfig) -> Self {
        Self { config }
    }

    /// The player owning the ball in `frame`, if any.
    ///
    /// A player's distance is the smaller of the ball-center distances to the two
    /// bottom corners of their box. The lowest ID wins ties.
    pub fn owner(&self, frame: &FrameTracks) -> Option<ObjectId> {
        let ball = frame.ball()?.bbox.center();
        let mut best: Option<(ObjectId, f32)> = None;

        for (&id, player) in &frame.players {
            let left = (player.bbox.bottom_left() - ball).norm();
            let right = (player.bbox.bottom_right() - ball).norm();
            let distance = left.min(right);
            if distance < self.config.max_player_ball_distance
                && best.is_none_or(|(_, d)| distance < d)
            {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Mark `has_ball` on each frame's owner and build the possession series.
    pub fn assign(&self, ledger: &mut TrackLedger) -> PossessionSeries {
        let mut series = PossessionSeries::new();
        let mut owned = 0usize;

        for frame in ledger.frames_mut() {
            for player in frame.players.values_mut() {
                player.has_ball = false;
            }
            let owner = self.owner(frame);
            let team = owner.and_then(|id| {
                let player = frame.players.get_mut(&id)?;
                player.has_ball = true;
                player.team
            });
            if owner.is_some() {
                owned += 1;
            }

            match team {
                Some(team) => series.record_owner(team),
                None => series.carry_forward(),
            }
        }

        info!(frames = series.len(), owned, "ball possession assigned");
        series
    }
}
