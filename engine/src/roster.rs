//! Per-run roster and team-stats index.
//!
//! Built once per scoring run from whatever the adapters returned. All team
//! codes are normalized through [`teams::lookup_code`] before keying, and
//! multi-team aggregate rows are dropped rather than attributed to anyone.

use crate::snapshot::Snapshot;
use crate::teams::{self, TeamCode};
use crate::{DataTier, PlayerRecord, PlayerRow, TeamRoster, TeamStats, finite_or};
use log::{debug, info};
use std::collections::BTreeMap;

/// Team stats for one side of a game, plus whether they came from a source.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsLookup {
    pub stats: TeamStats,
    pub sourced: bool,
}

#[derive(Debug, Clone)]
pub struct TeamIndex {
    rosters: BTreeMap<String, TeamRoster>,
    stats: BTreeMap<String, TeamStats>,
    tier: DataTier,
}

impl TeamIndex {
    /// Pick the best available roster tier (live, then manual file, then the
    /// embedded table) and the best available team-stats tier (live, then
    /// manual file, then league-average defaults).
    pub fn build(
        live_players: Vec<PlayerRow>,
        live_teams: Vec<TeamStats>,
        manual: Option<&Snapshot>,
        fallback: &Snapshot,
    ) -> Self {
        let live_rosters = group_rosters(live_players);
        let (rosters, tier) = if !live_rosters.is_empty() {
            (live_rosters, DataTier::Live)
        } else if let Some(snap) = manual.filter(|s| !s.players.is_empty()) {
            (group_rosters(snap.player_rows()), DataTier::ManualFile { last_updated: snap.last_updated.clone() })
        } else {
            (group_rosters(fallback.player_rows()), DataTier::StaticFallback)
        };

        let mut stats = index_team_stats(live_teams);
        if stats.is_empty()
            && let Some(snap) = manual
        {
            stats = index_team_stats(snap.team_stats());
        }

        info!(
            "team index built: {} rosters, {} team stat rows, tier={}",
            rosters.len(),
            stats.len(),
            tier.label()
        );
        Self { rosters, stats, tier }
    }

    /// Roster for a canonical abbreviation, best player first. Empty when unknown.
    pub fn roster(&self, abbrev: &str) -> &[PlayerRecord] {
        self.rosters.get(abbrev).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn team_stats(&self, abbrev: &str) -> StatsLookup {
        match self.stats.get(abbrev) {
            Some(stats) => StatsLookup { stats: stats.clone(), sourced: true },
            None => StatsLookup { stats: TeamStats::league_average(abbrev), sourced: false },
        }
    }

    pub fn tier(&self) -> &DataTier {
        &self.tier
    }

    pub fn rosters(&self) -> &BTreeMap<String, TeamRoster> {
        &self.rosters
    }
}

/// Group player rows by canonical team, each roster sorted by fantasy points
/// (descending, stable).
pub fn group_rosters(rows: Vec<PlayerRow>) -> BTreeMap<String, TeamRoster> {
    let mut rosters: BTreeMap<String, TeamRoster> = BTreeMap::new();
    for row in rows {
        match teams::lookup_code(&row.team_code) {
            TeamCode::Team(team) => rosters.entry(team.abbrev.to_owned()).or_default().push(row.record),
            TeamCode::Combined => debug!("dropping combined-team row for {}", row.record.name),
            TeamCode::Unknown => debug!("dropping row for {} with unknown team code {:?}", row.record.name, row.team_code),
        }
    }
    for roster in rosters.values_mut() {
        roster.sort_by(|a, b| b.fantasy_points.total_cmp(&a.fantasy_points));
    }
    rosters
}

/// Key team stats by canonical abbreviation, replacing any non-finite field
/// with its league-average default.
pub fn index_team_stats(rows: Vec<TeamStats>) -> BTreeMap<String, TeamStats> {
    let mut out = BTreeMap::new();
    for row in rows {
        let TeamCode::Team(team) = teams::lookup_code(&row.abbreviation) else {
            debug!("dropping team stats for unknown code {:?}", row.abbreviation);
            continue;
        };
        let stats = TeamStats {
            abbreviation: team.abbrev.to_owned(),
            pace: finite_or(row.pace, TeamStats::LEAGUE_AVERAGE_PACE),
            net_rating: finite_or(row.net_rating, TeamStats::LEAGUE_AVERAGE_NET_RATING),
            off_rating: finite_or(row.off_rating, TeamStats::LEAGUE_AVERAGE_OFF_RATING),
            win_pct: finite_or(row.win_pct, TeamStats::LEAGUE_AVERAGE_WIN_PCT),
        };
        out.insert(stats.abbreviation.clone(), stats);
    }
    out
}
