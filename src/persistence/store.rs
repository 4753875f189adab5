//! Storage seam for match records.

use std::collections::BTreeMap;

use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::persistence::{
    MatchInfo, MatchRecords, PlayerRecord, PlayerStats, TeamRecord, TeamStats, parse_team_color,
};

/// Backend that persists match records.
///
/// Each insert writes an entity together with its stats row and returns the entity's
/// ID. Implementations are expected to make each insert atomic. Table reads are scoped
/// to one match.
pub trait MatchStore {
    fn insert_match(&mut self, info: MatchInfo) -> Result<Uuid>;

    fn insert_team(&mut self, team: TeamRecord, stats: TeamStats) -> Result<Uuid>;

    fn insert_player(&mut self, player: PlayerRecord, stats: PlayerStats) -> Result<Uuid>;

    /// Every stored match, in insertion order.
    fn matches(&self) -> Result<Vec<MatchInfo>>;

    fn find_match(&self, match_id: Uuid) -> Result<Option<MatchInfo>>;

    fn teams(&self, match_id: Uuid) -> Result<Vec<TeamRecord>>;

    fn team_stats(&self, match_id: Uuid) -> Result<Vec<TeamStats>>;

    fn players(&self, match_id: Uuid) -> Result<Vec<PlayerRecord>>;

    fn player_stats(&self, match_id: Uuid) -> Result<Vec<PlayerStats>>;

    /// Team colors of one match, keyed by team ID.
    fn team_colors(&self, match_id: Uuid) -> Result<BTreeMap<Uuid, [u8; 3]>> {
        Ok(self
            .teams(match_id)?
            .into_iter()
            .map(|t| (t.team_id, parse_team_color(&t.team_color)))
            .collect())
    }
}

/// Write every row of `records`; returns the match ID.
pub fn save_records<S: MatchStore + ?Sized>(store: &mut S, records: MatchRecords) -> Result<Uuid> {
    let match_id = store.insert_match(records.match_info)?;
    let teams = records.teams.len();
    let players = records.players.len();
    for (team, stats) in records.teams {
        store.insert_team(team, stats)?;
    }
    for (player, stats) in records.players {
        store.insert_player(player, stats)?;
    }
    info!(%match_id, teams, players, "match saved");
    Ok(match_id)
}

/// Store that keeps every table in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    matches: Vec<MatchInfo>,
    teams: Vec<TeamRecord>,
    team_stats: Vec<TeamStats>,
    players: Vec<PlayerRecord>,
    player_stats: Vec<PlayerStats>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn rows_of<T: Clone>(rows: &[T], match_id: Uuid, key: impl Fn(&T) -> Uuid) -> Vec<T> {
    rows.iter().filter(|&r| key(r) == match_id).cloned().collect()
}

impl MatchStore for InMemoryStore {
    fn insert_match(&mut self, info: MatchInfo) -> Result<Uuid> {
        let id = info.match_id;
        self.matches.push(info);
        Ok(id)
    }

    fn insert_team(&mut self, team: TeamRecord, stats: TeamStats) -> Result<Uuid> {
        let id = team.team_id;
        self.teams.push(team);
        self.team_stats.push(stats);
        Ok(id)
    }

    fn insert_player(&mut self, player: PlayerRecord, stats: PlayerStats) -> Result<Uuid> {
        let id = player.player_id;
        self.players.push(player);
        self.player_stats.push(stats);
        Ok(id)
    }

    fn matches(&self) -> Result<Vec<MatchInfo>> {
        Ok(self.matches.clone())
    }

    fn find_match(&self, match_id: Uuid) -> Result<Option<MatchInfo>> {
        Ok(self.matches.iter().find(|m| m.match_id == match_id).cloned())
    }

    fn teams(&self, match_id: Uuid) -> Result<Vec<TeamRecord>> {
        Ok(rows_of(&self.teams, match_id, |t| t.match_id))
    }

    fn team_stats(&self, match_id: Uuid) -> Result<Vec<TeamStats>> {
        Ok(rows_of(&self.team_stats, match_id, |t| t.match_id))
    }

    fn players(&self, match_id: Uuid) -> Result<Vec<PlayerRecord>> {
        Ok(rows_of(&self.players, match_id, |p| p.match_id))
    }

    fn player_stats(&self, match_id: Uuid) -> Result<Vec<PlayerStats>> {
        Ok(rows_of(&self.player_stats, match_id, |p| p.match_id))
    }
}
