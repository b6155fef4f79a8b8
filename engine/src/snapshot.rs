//! On-disk snapshot of fetched stats: the "manual file" data tier.
//!
//! The file is written by `lpranker --update` from a machine that can reach
//! stats.nba.com and read back by hosts that cannot. The same shape, embedded
//! at build time, is the static fallback tier.

use crate::client::SourceClient;
use crate::{PlayerRecord, PlayerRow, TeamStats};
use chrono::Local;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

const FALLBACK_STARS_JSON: &str = include_str!("../data/fallback_stars.json");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub teams: BTreeMap<String, SnapshotTeam>,
    #[serde(default)]
    pub players: BTreeMap<String, Vec<PlayerRecord>>,
    #[serde(default)]
    pub active_players: Vec<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTeam {
    pub net_rating: f64,
    pub pace: f64,
    pub w_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_rating: Option<f64>,
}

#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error, String),
    Format(serde_json::Error, String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(e, path) => write!(f, "could not access snapshot {path}: {e}"),
            SnapshotError::Format(e, path) => write!(f, "invalid snapshot json at {path}: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::Io(e, display.clone()))?;
        serde_json::from_str(&content).map_err(|e| SnapshotError::Format(e, display))
    }

    /// Load if the file exists, logging and discarding any error.
    pub fn load_optional(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::load(path) {
            Ok(snap) => Some(snap),
            Err(e) => {
                warn!("{e}; ignoring manual snapshot");
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let display = path.display().to_string();
        let json = serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Format(e, display.clone()))?;
        std::fs::write(path, json).map_err(|e| SnapshotError::Io(e, display))
    }

    /// The star table compiled into the binary, used when no roster source is reachable.
    pub fn embedded_fallback() -> Self {
        match serde_json::from_str(FALLBACK_STARS_JSON) {
            Ok(snap) => snap,
            Err(e) => {
                error!("embedded fallback table is invalid: {e}");
                Self::default()
            }
        }
    }

    /// Fetch live team stats, player stats, and lineups into a new snapshot.
    /// Each section degrades to empty independently.
    pub async fn capture(client: &SourceClient, season: &str) -> Self {
        let (teams, players, active) = tokio::join!(
            client.fetch_team_stats(season),
            client.fetch_player_stats(season),
            client.fetch_active_players(),
        );

        let teams = teams
            .inspect_err(|e| warn!("team stats failed: {e}"))
            .unwrap_or_default()
            .into_iter()
            .map(|t| {
                let entry = SnapshotTeam {
                    net_rating: t.net_rating,
                    pace: t.pace,
                    w_pct: t.win_pct,
                    off_rating: Some(t.off_rating),
                };
                (t.abbreviation, entry)
            })
            .collect();

        let players = crate::roster::group_rosters(
            players.inspect_err(|e| warn!("player stats failed: {e}")).unwrap_or_default(),
        );

        let active_players = active.inspect_err(|e| warn!("lineups failed: {e}")).unwrap_or_default();

        let snap = Self {
            teams,
            players,
            active_players,
            last_updated: Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        };
        info!(
            "captured snapshot: {} teams, {} rosters, {} active players",
            snap.teams.len(),
            snap.players.len(),
            snap.active_players.len()
        );
        snap
    }

    pub fn player_rows(&self) -> Vec<PlayerRow> {
        self.players
            .iter()
            .flat_map(|(team, roster)| {
                roster.iter().map(move |p| PlayerRow { team_code: team.clone(), record: p.clone() })
            })
            .collect()
    }

    pub fn team_stats(&self) -> Vec<TeamStats> {
        self.teams
            .iter()
            .map(|(abbr, t)| TeamStats {
                abbreviation: abbr.clone(),
                pace: t.pace,
                net_rating: t.net_rating,
                off_rating: t.off_rating.unwrap_or(TeamStats::LEAGUE_AVERAGE_OFF_RATING),
                win_pct: t.w_pct,
            })
            .collect()
    }
}
