//! Match summary for the presentation and persistence layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::StatisticsConfig;
use crate::error::Result;
use crate::ledger::{ObjectClass, ObjectId, Rgb, Team, TrackLedger};
use crate::stages::PossessionSeries;

/// Possession share of each team in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamPossession {
    pub team1: f32,
    pub team2: f32,
}

impl TeamPossession {
    pub fn get(&self, team: Team) -> f32 {
        match team {
            Team::One => self.team1,
            Team::Two => self.team2,
        }
    }
}

/// Aggregated figures for one player identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSummary {
    /// Mean of all windowed speed estimates, km/h
    pub avg_speed: f32,
    /// Cumulative distance at the last observed frame, meters
    pub total_distance: f32,
    pub team: Option<Team>,
    pub team_color: Option<Rgb>,
}

/// Immutable result of one processed match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSummary {
    pub team_possession: TeamPossession,
    pub team_colors: BTreeMap<Team, Rgb>,
    pub players: BTreeMap<ObjectId, PlayerSummary>,
}

impl MatchSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Reduces a finished ledger and possession series to a [`MatchSummary`].
#[derive(Debug, Clone, Default)]
pub struct StatisticsAggregator {
    config: StatisticsConfig,
}

impl StatisticsAggregator {
    pub fn new(config: StatisticsConfig) -> Self {
        Self { config }
    }

    pub fn summarize(
        &self,
        ledger: &TrackLedger,
        possession: &PossessionSeries,
        team_colors: Option<[Rgb; 2]>,
    ) -> MatchSummary {
        let team_possession = TeamPossession {
            team1: possession.percentage(Team::One),
            team2: possession.percentage(Team::Two),
        };

        let tail_start = ledger.len().saturating_sub(self.config.tail_frames.max(1));
        let mut reported: Vec<ObjectId> = ledger.frames()[tail_start..]
            .iter()
            .flat_map(|frame| frame.players.keys().copied())
            .collect();
        reported.sort_unstable();
        reported.dedup();

        let players: BTreeMap<ObjectId, PlayerSummary> = reported
            .into_iter()
            .map(|id| (id, Self::player_summary(ledger, id)))
            .collect();

        let team_colors = team_colors
            .map(|c| BTreeMap::from([(Team::One, c[0]), (Team::Two, c[1])]))
            .unwrap_or_default();

        info!(
            team1 = team_possession.team1,
            team2 = team_possession.team2,
            players = players.len(),
            "match summary ready"
        );
        MatchSummary {
            team_possession,
            team_colors,
            players,
        }
    }

    fn player_summary(ledger: &TrackLedger, id: ObjectId) -> PlayerSummary {
        let tracks: Vec<_> = ledger
            .class_iter(ObjectClass::Player)
            .filter_map(|players| players.get(&id))
            .collect();

        let speeds: Vec<f32> = tracks.iter().filter_map(|t| t.speed).collect();
        let avg_speed = if speeds.is_empty() {
            0.0
        } else {
            speeds.iter().sum::<f32>() / speeds.len() as f32
        };

        let last = tracks.last();
        PlayerSummary {
            avg_speed,
            total_distance: last.and_then(|t| t.distance).unwrap_or(0.0),
            team: last.and_then(|t| t.team),
            team_color: last.and_then(|t| t.team_color),
        }
    }
}
