pub mod availability;
pub mod cache;
pub mod client;
pub mod config;
pub mod espn;
pub mod nba_stats;
pub mod odds;
pub mod roster;
pub mod schedule;
pub mod scoring;
pub mod scrape;
pub mod snapshot;
pub mod teams;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub use schedule::{Ranker, RankerError};

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of any source's wire format
// ---------------------------------------------------------------------------

/// A single player's production, reduced to one fantasy-points figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    #[serde(rename = "fp")]
    pub fantasy_points: f64,
}

impl PlayerRecord {
    pub fn from_line(name: impl Into<String>, line: &StatLine) -> Self {
        Self { name: name.into(), fantasy_points: line.fantasy_points() }
    }
}

/// Raw counting stats for one box-score or season row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatLine {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub turnovers: f64,
    /// Games played; `None` when the source row is already a single game or a per-game average.
    pub games: Option<f64>,
}

impl StatLine {
    /// `PTS + 1.2*REB + 1.5*AST + 3*STL + 3*BLK - TOV`, per game when games played is known.
    pub fn fantasy_points(&self) -> f64 {
        let total = self.points + 1.2 * self.rebounds + 1.5 * self.assists + 3.0 * self.steals
            + 3.0 * self.blocks
            - self.turnovers;
        let per_game = match self.games {
            Some(gp) if gp > 0.0 => total / gp,
            _ => total,
        };
        if per_game.is_finite() { round1(per_game) } else { 0.0 }
    }
}

/// Players for one team, best first.
pub type TeamRoster = Vec<PlayerRecord>;

/// One row from a player-stats source, before team codes are normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRow {
    pub team_code: String,
    pub record: PlayerRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub abbreviation: String,
    pub pace: f64,
    pub net_rating: f64,
    pub off_rating: f64,
    pub win_pct: f64,
}

impl TeamStats {
    pub const LEAGUE_AVERAGE_PACE: f64 = 100.0;
    pub const LEAGUE_AVERAGE_NET_RATING: f64 = 0.0;
    pub const LEAGUE_AVERAGE_OFF_RATING: f64 = 115.0;
    pub const LEAGUE_AVERAGE_WIN_PCT: f64 = 0.5;

    pub fn league_average(abbreviation: &str) -> Self {
        Self { abbreviation: abbreviation.to_owned(), ..Self::default() }
    }
}

impl Default for TeamStats {
    fn default() -> Self {
        Self {
            abbreviation: String::new(),
            pace: Self::LEAGUE_AVERAGE_PACE,
            net_rating: Self::LEAGUE_AVERAGE_NET_RATING,
            off_rating: Self::LEAGUE_AVERAGE_OFF_RATING,
            win_pct: Self::LEAGUE_AVERAGE_WIN_PCT,
        }
    }
}

/// Names listed as Out/Doubtful on the injury report.
pub type InjuryStatus = BTreeSet<String>;

/// Names listed in projected lineups for tonight.
pub type ActivePlayers = Vec<String>;

/// Point spread keyed by team abbreviation; negative favors that team.
pub type Spreads = BTreeMap<String, f64>;

/// When a game starts, in whatever shape the schedule source provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStart {
    /// US Eastern civil time on the given date ("7:30 pm ET").
    Eastern(NaiveDate, NaiveTime),
    Utc(DateTime<Utc>),
    /// Status text with no usable time ("Final", "PPD", "TBD").
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledGame {
    pub game_id: String,
    pub home: String,
    pub away: String,
    pub start: GameStart,
    pub broadcaster: Option<String>,
}

/// Which tier of roster data powered a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataTier {
    Live,
    ManualFile { last_updated: Option<String> },
    StaticFallback,
}

impl DataTier {
    pub fn label(&self) -> String {
        match self {
            DataTier::Live => "Live (stats.nba.com)".to_owned(),
            DataTier::ManualFile { last_updated: Some(ts) } => format!("Manual file ({ts})"),
            DataTier::ManualFile { last_updated: None } => "Manual file".to_owned(),
            DataTier::StaticFallback => "Static fallback".to_owned(),
        }
    }

    /// Live and manual-file tiers are considered healthy; the static table is not.
    pub fn is_online(&self) -> bool {
        !matches!(self, DataTier::StaticFallback)
    }
}

/// One enriched game, the unit consumers render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub matchup: String,
    pub start_time: String,
    pub sort_hour: f64,
    pub spread: f64,
    pub star_index: i32,
    pub score: f64,
    pub pace: f64,
    pub source_label: String,
    pub broadcast: String,
    pub home_logo: String,
    pub away_logo: String,
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Replace NaN/inf with a documented default before it reaches a record.
pub(crate) fn finite_or(v: f64, default: f64) -> f64 {
    if v.is_finite() { v } else { default }
}
