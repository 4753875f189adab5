//! Persisted shapes of a processed match.
//!
//! Five tables: `match_info`, `team`, `teamstats`, `player`, `playerstats`. Every
//! identifier is a fresh random UUID. Team colors are stored as `"(r, g, b)"` text.

mod store;

pub use store::{InMemoryStore, MatchStore, save_records};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::ledger::{ObjectId, Rgb, Team};
use crate::stages::MatchSummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInfo {
    pub match_id: Uuid,
    pub match_video_name: String,
    /// Encoded rendered video
    pub processed_match_video: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team_id: Uuid,
    pub match_id: Uuid,
    pub team_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub team_id: Uuid,
    pub match_id: Uuid,
    /// Whole percent
    pub ball_possession: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: Uuid,
    /// `None` for players never assigned to a team
    pub team_id: Option<Uuid>,
    pub match_id: Uuid,
    pub player_number: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player_id: Uuid,
    pub team_id: Option<Uuid>,
    pub match_id: Uuid,
    pub distance: f32,
    pub avg_speed: f32,
}

/// All rows produced for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecords {
    pub match_info: MatchInfo,
    pub teams: Vec<(TeamRecord, TeamStats)>,
    pub players: Vec<(PlayerRecord, PlayerStats)>,
}

/// Build the rows for a finished match, with fresh UUIDs for every entity.
///
/// Both teams are always written; a team without calibrated color is stored as
/// `(0, 0, 0)`. The player number is the tracker's object ID.
pub fn records_from_summary(
    summary: &MatchSummary,
    video_name: &str,
    processed_video: Vec<u8>,
) -> MatchRecords {
    let match_id = Uuid::new_v4();
    let match_info = MatchInfo {
        match_id,
        match_video_name: video_name.to_string(),
        processed_match_video: processed_video,
    };

    let mut team_ids = [Uuid::nil(); 2];
    let teams: Vec<(TeamRecord, TeamStats)> = Team::ALL
        .iter()
        .zip(team_ids.iter_mut())
        .map(|(&team, slot)| {
            let team_id = Uuid::new_v4();
            *slot = team_id;
            let color = summary.team_colors.get(&team).copied().unwrap_or_default();
            (
                TeamRecord {
                    team_id,
                    match_id,
                    team_color: format_team_color(&color),
                },
                TeamStats {
                    team_id,
                    match_id,
                    ball_possession: summary.team_possession.get(team).round() as i32,
                },
            )
        })
        .collect();

    let players: Vec<(PlayerRecord, PlayerStats)> = summary
        .players
        .iter()
        .map(|(&number, stats)| {
            let player_id = Uuid::new_v4();
            let team_id = stats.team.map(|team| match team {
                Team::One => team_ids[0],
                Team::Two => team_ids[1],
            });
            (
                PlayerRecord {
                    player_id,
                    team_id,
                    match_id,
                    player_number: number,
                },
                PlayerStats {
                    player_id,
                    team_id,
                    match_id,
                    distance: stats.total_distance,
                    avg_speed: stats.avg_speed,
                },
            )
        })
        .collect();

    debug!(%match_id, players = players.len(), "match records built");
    MatchRecords {
        match_info,
        teams,
        players,
    }
}

/// Format a color as `"(r, g, b)"` with byte channels.
pub fn format_team_color(color: &Rgb) -> String {
    let [r, g, b] = color.to_u8();
    format!("({r}, {g}, {b})")
}

/// Parse a color written by [`format_team_color`]. Anything malformed yields black.
pub fn parse_team_color(text: &str) -> [u8; 3] {
    let channels: Option<Vec<u8>> = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(|c| c.trim().parse::<u8>().ok())
        .collect();
    match channels.as_deref() {
        Some(&[r, g, b]) => [r, g, b],
        _ => [0, 0, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{PlayerSummary, TeamPossession};
    use std::collections::BTreeMap;

    #[test]
    fn test_color_text() {
        assert_eq!(format_team_color(&Rgb::new(219.6, 20.0, 0.2)), "(220, 20, 0)");
        assert_eq!(parse_team_color("(220, 20, 0)"), [220, 20, 0]);
        assert_eq!(parse_team_color(" (1,2,3) "), [1, 2, 3]);
        assert_eq!(parse_team_color("red"), [0, 0, 0]);
        assert_eq!(parse_team_color("(1, 2)"), [0, 0, 0]);
        assert_eq!(parse_team_color("(1, 2, 300)"), [0, 0, 0]);
    }

    #[test]
    fn test_records_link_players_to_teams() {
        let summary = MatchSummary {
            team_possession: TeamPossession {
                team1: 61.4,
                team2: 38.6,
            },
            team_colors: BTreeMap::from([(Team::Two, Rgb::new(20.0, 30.0, 210.0))]),
            players: BTreeMap::from([
                (
                    4,
                    PlayerSummary {
                        avg_speed: 7.0,
                        total_distance: 120.0,
                        team: Some(Team::Two),
                        team_color: None,
                    },
                ),
                (9, PlayerSummary::default()),
            ]),
        };
        let records = records_from_summary(&summary, "derby.mp4", vec![1, 2, 3]);

        assert_eq!(records.teams.len(), 2);
        let (team1, stats1) = &records.teams[0];
        let (team2, stats2) = &records.teams[1];
        assert_eq!(team1.team_color, "(0, 0, 0)");
        assert_eq!(team2.team_color, "(20, 30, 210)");
        assert_eq!(stats1.ball_possession, 61);
        assert_eq!(stats2.ball_possession, 39);
        assert_ne!(team1.team_id, team2.team_id);

        let (player, stats) = &records.players[0];
        assert_eq!(player.player_number, 4);
        assert_eq!(player.team_id, Some(team2.team_id));
        assert_eq!(stats.player_id, player.player_id);
        assert_eq!(stats.distance, 120.0);
        assert_eq!(records.players[1].0.team_id, None);
        let match_id = records.match_info.match_id;
        assert!(records.players.iter().all(|(p, _)| p.match_id == match_id));
    }
}
