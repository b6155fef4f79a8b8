//! Schedule enrichment: fetch every source, score each game, and turn the
//! result into display-ready [`GameRecord`]s.

use crate::availability::Availability;
use crate::client::{SourceClient, SourceResult};
use crate::config::EngineConfig;
use crate::roster::TeamIndex;
use crate::scoring::{GameInputs, ScoringWeights, SideInputs, score, spread_for};
use crate::snapshot::Snapshot;
use crate::teams;
use crate::{
    ActivePlayers, GameRecord, GameStart, InjuryStatus, PlayerRow, ScheduledGame, Spreads, TeamStats, finite_or,
    round1,
};
use chrono::{DateTime, NaiveDate, TimeZone, Timelike};
use chrono_tz::Tz;
use log::{info, warn};
use std::fmt;

/// Sort key for games with no usable start time; after every real slot.
pub const UNSCHEDULED_SORT_HOUR: f64 = 24.0;
/// Local hour from which a game counts as a late viewing slot.
pub const LATE_SLOT_HOUR: f64 = 8.0;
pub const GENERIC_BROADCAST: &str = "League Pass";

/// The upstream data a [`Ranker`] needs. Implemented by [`SourceClient`];
/// tests substitute frozen outputs.
#[allow(async_fn_in_trait)]
pub trait Sources {
    async fn schedule(&self, date: NaiveDate) -> SourceResult<Vec<ScheduledGame>>;
    async fn player_stats(&self, season: &str) -> SourceResult<Vec<PlayerRow>>;
    async fn team_stats(&self, season: &str) -> SourceResult<Vec<TeamStats>>;
    async fn injuries(&self) -> SourceResult<InjuryStatus>;
    async fn active_players(&self) -> SourceResult<ActivePlayers>;
    async fn spreads(&self) -> SourceResult<Spreads>;
}

impl Sources for SourceClient {
    async fn schedule(&self, date: NaiveDate) -> SourceResult<Vec<ScheduledGame>> {
        self.fetch_schedule(date).await
    }

    async fn player_stats(&self, season: &str) -> SourceResult<Vec<PlayerRow>> {
        self.fetch_player_stats(season).await
    }

    async fn team_stats(&self, season: &str) -> SourceResult<Vec<TeamStats>> {
        self.fetch_team_stats(season).await
    }

    async fn injuries(&self) -> SourceResult<InjuryStatus> {
        self.fetch_injuries().await
    }

    async fn active_players(&self) -> SourceResult<ActivePlayers> {
        self.fetch_active_players().await
    }

    async fn spreads(&self) -> SourceResult<Spreads> {
        self.fetch_spreads().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankerError {
    InvalidDate(String),
}

impl fmt::Display for RankerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankerError::InvalidDate(raw) => write!(f, "invalid date {raw:?}, expected YYYY-MM-DD"),
        }
    }
}

impl std::error::Error for RankerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewingSlot {
    Early,
    Late,
}

impl ViewingSlot {
    pub fn from_sort_hour(hour: f64) -> Self {
        if hour < LATE_SLOT_HOUR { ViewingSlot::Early } else { ViewingSlot::Late }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewingSlot::Early => "Early",
            ViewingSlot::Late => "Late",
        }
    }
}

impl GameRecord {
    pub fn viewing_slot(&self) -> ViewingSlot {
        ViewingSlot::from_sort_hour(self.sort_hour)
    }
}

/// Composition root for one ranking run: sources, configuration, and the
/// offline data tiers.
#[derive(Debug)]
pub struct Ranker<S> {
    sources: S,
    config: EngineConfig,
    weights: ScoringWeights,
    manual: Option<Snapshot>,
    fallback: Snapshot,
}

impl Ranker<SourceClient> {
    pub fn from_config(config: EngineConfig) -> Self {
        let client = SourceClient::new(&config);
        Self::new(client, config)
    }
}

impl<S: Sources> Ranker<S> {
    /// Loads the manual snapshot named by the config (if present) and the embedded fallback table.
    pub fn new(sources: S, config: EngineConfig) -> Self {
        let manual = Snapshot::load_optional(&config.snapshot_path);
        Self::with_data(sources, config, manual, Snapshot::embedded_fallback())
    }

    pub fn with_data(sources: S, config: EngineConfig, manual: Option<Snapshot>, fallback: Snapshot) -> Self {
        Self { sources, config, weights: ScoringWeights::default(), manual, fallback }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sources(&self) -> &S {
        &self.sources
    }

    /// Enriched games for a `YYYY-MM-DD` date, in schedule order.
    pub async fn get_schedule_with_stats(&self, date: &str) -> Result<Vec<GameRecord>, RankerError> {
        let date = parse_date(date)?;
        Ok(self.schedule_for(date).await)
    }

    pub async fn schedule_for(&self, date: NaiveDate) -> Vec<GameRecord> {
        let games = degrade("schedule", self.sources.schedule(date).await);
        if games.is_empty() {
            info!("no games scheduled on {date}");
            return Vec::new();
        }

        let season = self.config.season_for(date);
        let (players, team_stats, injuries, active, spreads) = tokio::join!(
            self.sources.player_stats(&season),
            self.sources.team_stats(&season),
            self.sources.injuries(),
            self.sources.active_players(),
            self.sources.spreads(),
        );
        let players = degrade("player stats", players);
        let team_stats = degrade("team stats", team_stats);
        let injuries = degrade("injury report", injuries);
        let spreads = degrade("odds", spreads);
        let mut active = degrade("lineups", active);
        if active.is_empty()
            && let Some(snap) = &self.manual
        {
            active = snap.active_players.clone();
        }

        let index = TeamIndex::build(players, team_stats, self.manual.as_ref(), &self.fallback);
        let availability = Availability::new(&injuries, &active);
        info!(
            "scoring {} games for {date} (season {season}, {} injured, {} in lineups, {} spreads)",
            games.len(),
            injuries.len(),
            active.len(),
            spreads.len()
        );

        games.iter().map(|game| self.enrich(game, &index, &availability, &spreads)).collect()
    }

    fn enrich(&self, game: &ScheduledGame, index: &TeamIndex, availability: &Availability, spreads: &Spreads) -> GameRecord {
        let spread = spread_for(spreads, &game.home);
        let inputs = GameInputs {
            home: SideInputs::resolve(&game.home, index, availability),
            away: SideInputs::resolve(&game.away, index, availability),
            spread,
            broadcaster: game.broadcaster.as_deref(),
        };
        let breakdown = score(&inputs, &self.weights);
        let (start_time, sort_hour) = display_time(&game.start, self.config.display_tz);

        GameRecord {
            matchup: format!("{} @ {}", game.away, game.home),
            start_time,
            sort_hour,
            spread,
            star_index: breakdown.star_index,
            score: breakdown.final_score,
            pace: round1(finite_or(breakdown.avg_pace, TeamStats::LEAGUE_AVERAGE_PACE)),
            source_label: index.tier().label(),
            broadcast: game.broadcaster.clone().unwrap_or_else(|| GENERIC_BROADCAST.to_owned()),
            home_logo: teams::logo_for(&game.home),
            away_logo: teams::logo_for(&game.away),
        }
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, RankerError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| RankerError::InvalidDate(raw.to_owned()))
}

fn degrade<T: Default>(what: &str, result: SourceResult<T>) -> T {
    result.inspect_err(|e| warn!("{what} unavailable, continuing without it: {e}")).unwrap_or_default()
}

/// Display label and sortable hour of a start in `tz`.
pub fn display_time(start: &GameStart, tz: Tz) -> (String, f64) {
    let local: Option<DateTime<Tz>> = match start {
        GameStart::Eastern(date, time) => chrono_tz::America::New_York
            .from_local_datetime(&date.and_time(*time))
            .earliest()
            .map(|dt| dt.with_timezone(&tz)),
        GameStart::Utc(dt) => Some(dt.with_timezone(&tz)),
        GameStart::Text(_) => None,
    };
    match (local, start) {
        (Some(dt), _) => {
            let label = dt.format("%a %I:%M %p").to_string();
            (label, f64::from(dt.hour()) + f64::from(dt.minute()) / 60.0)
        }
        (None, GameStart::Text(text)) => (text.clone(), UNSCHEDULED_SORT_HOUR),
        (None, GameStart::Eastern(_, time)) => (format!("{} ET", time.format("%I:%M %p")), UNSCHEDULED_SORT_HOUR),
        (None, GameStart::Utc(_)) => ("TBD".to_owned(), UNSCHEDULED_SORT_HOUR),
    }
}
