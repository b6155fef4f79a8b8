use crate::config::EngineConfig;
use crate::espn::{EspnEvent, ScoreboardResponse};
use crate::nba_stats::{StatTable, StatsResponse, cell_f64, cell_str};
use crate::odds::OddsEvent;
use crate::scrape;
use crate::teams::{self, TeamCode};
use crate::{ActivePlayers, GameStart, InjuryStatus, PlayerRecord, PlayerRow, ScheduledGame, Spreads, StatLine, TeamStats};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use log::{debug, warn};
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

pub type SourceResult<T> = Result<T, SourceError>;

const NBA_STATS: &str = "https://stats.nba.com/stats";
const ESPN_SCOREBOARD: &str = "https://site.api.espn.com/apis/site/v2/sports/basketball/nba/scoreboard";
const CBS_INJURIES: &str = "https://www.cbssports.com/nba/injuries/";
const ROTOWIRE_LINEUPS: &str = "https://www.rotowire.com/basketball/nba-lineups.php";
const BBREF_LEAGUES: &str = "https://www.basketball-reference.com/leagues";
const ODDS_API: &str = "https://api.the-odds-api.com/v4/sports/basketball_nba/odds";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const GAME_HEADER: &str = "GameHeader";
const BBREF_PER_GAME_TABLE: &str = "per_game_stats";

static EASTERN_TIME: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(am|pm)").ok());

#[derive(Debug)]
pub enum SourceError {
    Network(reqwest::Error, String),
    Status(reqwest::Error, String),
    Parsing(serde_json::Error, String),
    /// A response parsed but lacked a required table or column.
    Schema(String),
    MissingCredential(&'static str),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            SourceError::Status(e, url) => write!(f, "Bad status from {url}: {e}"),
            SourceError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            SourceError::Schema(msg) => write!(f, "Unexpected response shape: {msg}"),
            SourceError::MissingCredential(name) => write!(f, "Missing credential: {name} is not set"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Base URLs for every upstream, overridable so tests can point at a local server.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub nba_stats: String,
    pub espn_scoreboard: String,
    pub injuries: String,
    pub lineups: String,
    pub bbref: String,
    pub odds: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            nba_stats: NBA_STATS.into(),
            espn_scoreboard: ESPN_SCOREBOARD.into(),
            injuries: CBS_INJURIES.into(),
            lineups: ROTOWIRE_LINEUPS.into(),
            bbref: BBREF_LEAGUES.into(),
            odds: ODDS_API.into(),
        }
    }
}

impl Endpoints {
    /// Every source under one host, each on its own path.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            nba_stats: format!("{base}/stats"),
            espn_scoreboard: format!("{base}/espn/scoreboard"),
            injuries: format!("{base}/injuries"),
            lineups: format!("{base}/lineups"),
            bbref: format!("{base}/bbref"),
            odds: format!("{base}/odds"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Host {
    NbaStats,
    Other,
}

/// Whether a player-stats table holds season totals or per-game averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerMode {
    Totals,
    PerGame,
}

/// HTTP client for every upstream source.
#[derive(Debug, Clone)]
pub struct SourceClient {
    client: Client,
    timeout: Duration,
    endpoints: Endpoints,
    odds_api_key: Option<String>,
}

impl Default for SourceClient {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl SourceClient {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            client: Client::builder().user_agent(USER_AGENT).build().unwrap_or_default(),
            timeout: config.timeout,
            endpoints: Endpoints::default(),
            odds_api_key: config.odds_api_key.clone(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Scheduled games for a US calendar date.
    ///
    /// Fallback chain:
    /// 1) stats.nba.com `scoreboardv2` game header, start times in Eastern.
    /// 2) ESPN scoreboard, start times as UTC instants.
    pub async fn fetch_schedule(&self, date: NaiveDate) -> SourceResult<Vec<ScheduledGame>> {
        let url = format!(
            "{}/scoreboardv2?DayOffset=0&GameDate={}&LeagueID=00",
            self.endpoints.nba_stats,
            date.format("%Y-%m-%d")
        );
        let primary = match self.get_json::<StatsResponse>(&url, Host::NbaStats).await {
            Ok(raw) => match raw.table(GAME_HEADER) {
                Some(table) => parse_game_header(table, date),
                None => Err(SourceError::Schema(format!("no {GAME_HEADER} result set"))),
            },
            Err(e) => Err(e),
        };
        match primary {
            Ok(games) => Ok(games),
            Err(e) => {
                warn!("stats.nba.com schedule unavailable ({e}); trying ESPN");
                let url = format!("{}?dates={}", self.endpoints.espn_scoreboard, date.format("%Y%m%d"));
                let raw: ScoreboardResponse = self.get_json(&url, Host::Other).await?;
                Ok(raw.events.unwrap_or_default().iter().filter_map(map_espn_event).collect())
            }
        }
    }

    /// Season player stats: stats.nba.com totals, falling back to the
    /// basketball-reference per-game table.
    pub async fn fetch_player_stats(&self, season: &str) -> SourceResult<Vec<PlayerRow>> {
        let url = format!(
            "{}/leaguedashplayerstats?LastNGames=0&LeagueID=00&MeasureType=Base&Month=0&OpponentTeamID=0\
             &PaceAdjust=N&PerMode=Totals&Period=0&PlusMinus=N&Rank=N&Season={season}\
             &SeasonType=Regular%20Season&TeamID=0",
            self.endpoints.nba_stats
        );
        let primary = match self.get_json::<StatsResponse>(&url, Host::NbaStats).await {
            Ok(raw) => match raw.table("LeagueDashPlayerStats") {
                Some(table) => parse_player_rows(table, PerMode::Totals),
                None => Err(SourceError::Schema("no player stats result set".into())),
            },
            Err(e) => Err(e),
        };
        match primary {
            Ok(rows) if !rows.is_empty() => Ok(rows),
            Ok(_) => {
                warn!("stats.nba.com returned no player rows; trying basketball-reference");
                self.fetch_bbref_player_stats(season).await
            }
            Err(e) => {
                warn!("stats.nba.com player stats unavailable ({e}); trying basketball-reference");
                self.fetch_bbref_player_stats(season).await
            }
        }
    }

    async fn fetch_bbref_player_stats(&self, season: &str) -> SourceResult<Vec<PlayerRow>> {
        let year = season_end_year(season)
            .ok_or_else(|| SourceError::Schema(format!("cannot derive a season year from {season:?}")))?;
        let url = format!("{}/NBA_{year}_per_game.html", self.endpoints.bbref);
        let html = self.get_text(&url, Host::Other).await?;
        let table = scrape::parse_stat_table(&html, BBREF_PER_GAME_TABLE)
            .ok_or_else(|| SourceError::Schema(format!("no table#{BBREF_PER_GAME_TABLE} at {url}")))?;
        parse_player_rows(&table, PerMode::PerGame)
    }

    /// Advanced team stats (pace, ratings, win percentage).
    pub async fn fetch_team_stats(&self, season: &str) -> SourceResult<Vec<TeamStats>> {
        let url = format!(
            "{}/leaguedashteamstats?LastNGames=0&LeagueID=00&MeasureType=Advanced&Month=0&OpponentTeamID=0\
             &PaceAdjust=N&PerMode=PerGame&Period=0&PlusMinus=N&Rank=N&Season={season}\
             &SeasonType=Regular%20Season&TeamID=0",
            self.endpoints.nba_stats
        );
        let raw: StatsResponse = self.get_json(&url, Host::NbaStats).await?;
        let table = raw
            .table("LeagueDashTeamStats")
            .ok_or_else(|| SourceError::Schema("no team stats result set".into()))?;
        parse_team_stats(table)
    }

    pub async fn fetch_injuries(&self) -> SourceResult<InjuryStatus> {
        let html = self.get_text(&self.endpoints.injuries, Host::Other).await?;
        let injured = scrape::parse_injury_report(&html);
        debug!("injury report lists {} unavailable players", injured.len());
        Ok(injured)
    }

    pub async fn fetch_active_players(&self) -> SourceResult<ActivePlayers> {
        let html = self.get_text(&self.endpoints.lineups, Host::Other).await?;
        let active = scrape::parse_lineups(&html);
        debug!("projected lineups list {} players", active.len());
        Ok(active)
    }

    /// Point spreads from The Odds API. Requires `ODDS_API_KEY`.
    pub async fn fetch_spreads(&self) -> SourceResult<Spreads> {
        let key = self.odds_api_key.as_deref().ok_or(SourceError::MissingCredential("ODDS_API_KEY"))?;
        let url = format!(
            "{}?apiKey={key}&regions=us&markets=spreads&oddsFormat=decimal",
            self.endpoints.odds
        );
        let events: Vec<OddsEvent> = self.get_json(&url, Host::Other).await?;
        Ok(map_spreads(&events))
    }

    async fn get_text(&self, url: &str, host: Host) -> SourceResult<String> {
        let shown = redact(url);
        debug!("GET {shown}");
        let mut request = self.client.get(url).timeout(self.timeout);
        if host == Host::NbaStats {
            request = request.headers(nba_stats_headers());
        }
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Network(e.without_url(), shown.clone()))?;
        let response = response
            .error_for_status()
            .map_err(|e| SourceError::Status(e.without_url(), shown.clone()))?;
        response.text().await.map_err(|e| SourceError::Network(e.without_url(), shown))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, host: Host) -> SourceResult<T> {
        let body = self.get_text(url, host).await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Parsing(e, redact(url)))
    }
}

/// stats.nba.com drops requests that do not look like they came from nba.com.
fn nba_stats_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers
}

/// Hide the odds API key in anything that gets logged.
fn redact(url: &str) -> String {
    match url.find("apiKey=") {
        Some(start) => {
            let value_start = start + "apiKey=".len();
            let value_end = url[value_start..].find('&').map_or(url.len(), |i| value_start + i);
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_owned(),
    }
}

/// "2024-25" → 2025.
fn season_end_year(season: &str) -> Option<i32> {
    let start: i32 = season.get(..4)?.parse().ok()?;
    Some(start + 1)
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn require(table: &StatTable, aliases: &[&str]) -> SourceResult<usize> {
    table
        .column(aliases)
        .ok_or_else(|| SourceError::Schema(format!("{} has no {} column", table.name, aliases.join("|"))))
}

/// Map a `scoreboardv2` game header into scheduled games. Rows with unknown
/// team ids are skipped; duplicate game ids keep the first row.
pub fn parse_game_header(table: &StatTable, date: NaiveDate) -> SourceResult<Vec<ScheduledGame>> {
    let game_id = require(table, &["GAME_ID"])?;
    let home_id = require(table, &["HOME_TEAM_ID"])?;
    let away_id = require(table, &["VISITOR_TEAM_ID"])?;
    let status = require(table, &["GAME_STATUS_TEXT"])?;
    let tv = table.column(&["NATL_TV_BROADCASTER_ABBREVIATION"]);

    let mut seen = HashSet::new();
    let mut games = Vec::new();
    for row in &table.rows {
        let Some(id) = cell_str(row, game_id) else { continue };
        if !seen.insert(id.clone()) {
            continue;
        }
        let team = |idx| cell_f64(row, idx).and_then(|v| teams::by_id(v as u32));
        let (Some(home), Some(away)) = (team(home_id), team(away_id)) else {
            debug!("skipping game {id}: unknown team id");
            continue;
        };
        let status_text = cell_str(row, status).unwrap_or_default();
        games.push(ScheduledGame {
            game_id: id,
            home: home.abbrev.to_owned(),
            away: away.abbrev.to_owned(),
            start: parse_eastern_start(&status_text, date).unwrap_or(GameStart::Text(status_text)),
            broadcaster: tv.and_then(|idx| cell_str(row, idx)),
        });
    }
    Ok(games)
}

/// Read "7:30 pm ET" style status text as an Eastern civil time on `date`.
pub fn parse_eastern_start(text: &str, date: NaiveDate) -> Option<GameStart> {
    let caps = EASTERN_TIME.as_ref()?.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let pm = caps[3].eq_ignore_ascii_case("pm");
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour, minute, 0).map(|t| GameStart::Eastern(date, t))
}

/// Map player rows. Requires name, team, and every counting-stat column;
/// a row with no name or unreadable points is skipped.
pub fn parse_player_rows(table: &StatTable, mode: PerMode) -> SourceResult<Vec<PlayerRow>> {
    let name = require(table, &["PLAYER_NAME", "Player"])?;
    let team = require(table, &["TEAM_ABBREVIATION", "Team", "Tm"])?;
    let pts = require(table, &["PTS"])?;
    let reb = require(table, &["REB", "TRB"])?;
    let ast = require(table, &["AST"])?;
    let stl = require(table, &["STL"])?;
    let blk = require(table, &["BLK"])?;
    let tov = require(table, &["TOV"])?;
    let gp = table.column(&["GP", "G"]);

    let mut out = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let Some(player) = cell_str(row, name).map(|n| n.trim_end_matches('*').trim().to_owned()) else {
            continue;
        };
        let Some(points) = cell_f64(row, pts) else {
            debug!("skipping {player}: unreadable points");
            continue;
        };
        let stat = |idx| cell_f64(row, idx).unwrap_or(0.0);
        let line = StatLine {
            points,
            rebounds: stat(reb),
            assists: stat(ast),
            steals: stat(stl),
            blocks: stat(blk),
            turnovers: stat(tov),
            games: match mode {
                PerMode::Totals => gp.and_then(|idx| cell_f64(row, idx)),
                PerMode::PerGame => None,
            },
        };
        out.push(PlayerRow {
            team_code: cell_str(row, team).unwrap_or_default(),
            record: PlayerRecord::from_line(player, &line),
        });
    }
    Ok(out)
}

/// Map advanced team stats. Teams are identified by abbreviation, id, or
/// full name, whichever the table carries; missing fields read as league average.
pub fn parse_team_stats(table: &StatTable) -> SourceResult<Vec<TeamStats>> {
    let abbrev = table.column(&["TEAM_ABBREVIATION"]);
    let id = table.column(&["TEAM_ID"]);
    let name = table.column(&["TEAM_NAME"]);
    if abbrev.is_none() && id.is_none() && name.is_none() {
        return Err(SourceError::Schema(format!("{} has no team identity column", table.name)));
    }
    let win_pct = table.column(&["W_PCT"]);
    let pace = table.column(&["PACE", "E_PACE"]);
    let net = table.column(&["NET_RATING", "E_NET_RATING"]);
    let off = table.column(&["OFF_RATING", "E_OFF_RATING"]);
    if [win_pct, pace, net, off].iter().all(Option::is_none) {
        return Err(SourceError::Schema(format!("{} has no team stat columns", table.name)));
    }

    let mut out = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let resolved = abbrev
            .and_then(|idx| cell_str(row, idx))
            .and_then(|code| match teams::lookup_code(&code) {
                TeamCode::Team(t) => Some(t),
                _ => None,
            })
            .or_else(|| id.and_then(|idx| cell_f64(row, idx)).and_then(|v| teams::by_id(v as u32)))
            .or_else(|| name.and_then(|idx| cell_str(row, idx)).and_then(|n| teams::by_name(&n)));
        let Some(team) = resolved else {
            debug!("skipping team stats row with no recognizable team");
            continue;
        };
        let field = |col: Option<usize>, default: f64| col.and_then(|idx| cell_f64(row, idx)).unwrap_or(default);
        out.push(TeamStats {
            abbreviation: team.abbrev.to_owned(),
            pace: field(pace, TeamStats::LEAGUE_AVERAGE_PACE),
            net_rating: field(net, TeamStats::LEAGUE_AVERAGE_NET_RATING),
            off_rating: field(off, TeamStats::LEAGUE_AVERAGE_OFF_RATING),
            win_pct: field(win_pct, TeamStats::LEAGUE_AVERAGE_WIN_PCT),
        });
    }
    Ok(out)
}

/// ESPN timestamps usually omit seconds ("2025-01-16T00:30Z").
fn parse_espn_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ").ok().map(|dt| dt.and_utc()))
}

/// Map one ESPN scoreboard event. Scheduled games carry their UTC start;
/// anything else keeps ESPN's short status text.
pub fn map_espn_event(event: &EspnEvent) -> Option<ScheduledGame> {
    let competition = event.competitions.as_deref().unwrap_or_default().first()?;
    let side = |which: &str| {
        competition
            .competitors
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|c| c.home_away.as_deref() == Some(which))
            .and_then(|c| c.team.as_ref())
            .and_then(|t| t.abbreviation.as_deref())
            .and_then(|code| match teams::lookup_code(code) {
                TeamCode::Team(t) => Some(t),
                _ => None,
            })
    };
    let (Some(home), Some(away)) = (side("home"), side("away")) else {
        debug!("skipping ESPN event {:?}: unknown teams", event.name);
        return None;
    };

    let status = event.status.as_ref().and_then(|s| s.status_type.as_ref());
    let scheduled = status.and_then(|t| t.name.as_deref()).is_none_or(|n| n == "STATUS_SCHEDULED");
    let start = match (scheduled, event.date.as_deref().and_then(parse_espn_date)) {
        (true, Some(dt)) => GameStart::Utc(dt),
        _ => GameStart::Text(status.and_then(|t| t.short_detail.clone()).unwrap_or_else(|| "TBD".into())),
    };

    let national: Vec<String> = competition
        .broadcasts
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|b| b.market.as_deref() == Some("national"))
        .flat_map(|b| b.names.iter().flatten().cloned())
        .collect();

    Some(ScheduledGame {
        game_id: event.id.clone().unwrap_or_default(),
        home: home.abbrev.to_owned(),
        away: away.abbrev.to_owned(),
        start,
        broadcaster: (!national.is_empty()).then(|| national.join("/")),
    })
}

/// Spreads from the first bookmaker's first market of each event, keyed by abbreviation.
pub fn map_spreads(events: &[OddsEvent]) -> Spreads {
    let mut spreads = Spreads::new();
    for event in events {
        let Some(market) = event.bookmakers.first().and_then(|b| b.markets.first()) else {
            continue;
        };
        for outcome in &market.outcomes {
            let (Some(team), Some(point)) = (teams::by_name(&outcome.name), outcome.point) else {
                debug!("ignoring odds outcome {:?}", outcome.name);
                continue;
            };
            if point.is_finite() {
                spreads.insert(team.abbrev.to_owned(), point);
            }
        }
    }
    spreads
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn game_header_json() -> serde_json::Value {
        json!({
            "resultSets": [{
                "name": "GameHeader",
                "headers": ["GAME_DATE_EST", "GAME_ID", "GAME_STATUS_TEXT", "HOME_TEAM_ID", "VISITOR_TEAM_ID", "NATL_TV_BROADCASTER_ABBREVIATION"],
                "rowSet": [
                    ["2025-01-15T00:00:00", "0022400560", "7:30 pm ET", 1610612747, 1610612743, "ESPN"],
                    ["2025-01-15T00:00:00", "0022400560", "7:30 pm ET", 1610612747, 1610612743, "ESPN"],
                    ["2025-01-15T00:00:00", "0022400561", "Final", 1610612738, 1610612752, null],
                    ["2025-01-15T00:00:00", "0022400562", "10:00 pm ET", 1610612999, 1610612752, null]
                ]
            }, {
                "name": "LineScore", "headers": [], "rowSet": []
            }]
        })
    }

    fn table(headers: &[&str], rows: Vec<Vec<serde_json::Value>>) -> StatTable {
        StatTable { name: "T".into(), headers: headers.iter().map(|h| h.to_string()).collect(), rows }
    }

    fn test_client(base: &str, odds_key: Option<&str>) -> SourceClient {
        let config = EngineConfig { odds_api_key: odds_key.map(str::to_owned), ..EngineConfig::default() };
        SourceClient::new(&config).with_endpoints(Endpoints::with_base(base))
    }

    #[test]
    fn game_header_maps_ids_times_and_tv() {
        let raw: StatsResponse = serde_json::from_value(game_header_json()).unwrap();
        let games = parse_game_header(raw.table(GAME_HEADER).unwrap(), date()).unwrap();
        assert_eq!(games.len(), 2, "duplicate and unknown-team rows dropped");

        let lal = &games[0];
        assert_eq!((lal.home.as_str(), lal.away.as_str()), ("LAL", "DEN"));
        assert_eq!(lal.start, GameStart::Eastern(date(), NaiveTime::from_hms_opt(19, 30, 0).unwrap()));
        assert_eq!(lal.broadcaster.as_deref(), Some("ESPN"));

        let bos = &games[1];
        assert_eq!(bos.start, GameStart::Text("Final".into()));
        assert_eq!(bos.broadcaster, None);
    }

    #[test]
    fn game_header_missing_column_is_schema_error() {
        let t = table(&["GAME_ID", "HOME_TEAM_ID"], vec![]);
        assert!(matches!(parse_game_header(&t, date()), Err(SourceError::Schema(_))));
    }

    #[test]
    fn eastern_times_parse_to_24_hour() {
        let at = |h, m| Some(GameStart::Eastern(date(), NaiveTime::from_hms_opt(h, m, 0).unwrap()));
        assert_eq!(parse_eastern_start("7:00 pm ET", date()), at(19, 0));
        assert_eq!(parse_eastern_start("12:00 pm ET", date()), at(12, 0));
        assert_eq!(parse_eastern_start("12:30 am ET", date()), at(0, 30));
        assert_eq!(parse_eastern_start("10:00 AM ET", date()), at(10, 0));
        assert_eq!(parse_eastern_start("Final/OT", date()), None);
        assert_eq!(parse_eastern_start("Q3 5:32", date()), None);
    }

    #[test]
    fn totals_are_averaged_per_game() {
        let t = table(
            &["PLAYER_NAME", "TEAM_ABBREVIATION", "GP", "PTS", "REB", "AST", "STL", "BLK", "TOV"],
            vec![
                vec![json!("Nikola Jokic"), json!("DEN"), json!(10), json!(300), json!(120), json!(100), json!(15), json!(7), json!(30)],
                vec![json!(null), json!("DEN"), json!(1), json!(1), json!(1), json!(1), json!(1), json!(1), json!(1)],
                vec![json!("Bad Row"), json!("DEN"), json!(1), json!("n/a"), json!(1), json!(1), json!(1), json!(1), json!(1)],
            ],
        );
        let rows = parse_player_rows(&t, PerMode::Totals).unwrap();
        assert_eq!(rows.len(), 1);
        // (300 + 144 + 150 + 45 + 21 - 30) / 10
        assert_eq!(rows[0].record.fantasy_points, 63.0);
        assert_eq!(rows[0].team_code, "DEN");
    }

    #[test]
    fn per_game_html_rows_use_row_values() {
        let t = table(
            &["Rk", "Player", "Team", "G", "TRB", "AST", "STL", "BLK", "TOV", "PTS"],
            vec![vec![
                json!("1"), json!("Precious Achiuwa"), json!("2TM"), json!("74"), json!("4.0"),
                json!("1.0"), json!("0.5"), json!("1.0"), json!("1.0"), json!("7.0"),
            ]],
        );
        let rows = parse_player_rows(&t, PerMode::PerGame).unwrap();
        // 7 + 4.8 + 1.5 + 1.5 + 3 - 1
        assert_eq!(rows[0].record.fantasy_points, 16.8);
        assert_eq!(rows[0].team_code, "2TM");
    }

    #[test]
    fn player_table_without_points_is_schema_error() {
        let t = table(&["PLAYER_NAME", "TEAM_ABBREVIATION", "REB"], vec![]);
        assert!(matches!(parse_player_rows(&t, PerMode::Totals), Err(SourceError::Schema(_))));
    }

    #[test]
    fn team_stats_by_id_with_estimated_aliases() {
        let t = table(
            &["TEAM_ID", "TEAM_NAME", "W_PCT", "E_PACE", "E_NET_RATING", "E_OFF_RATING"],
            vec![
                vec![json!(1610612760), json!("Oklahoma City Thunder"), json!(0.82), json!(100.1), json!(12.9), json!(119.0)],
                vec![json!(1610612764), json!("Washington Wizards"), json!(null), json!(101.4), json!(-10.2), json!(107.3)],
                vec![json!(1), json!("Seattle SuperSonics"), json!(0.5), json!(99.0), json!(0.0), json!(110.0)],
            ],
        );
        let stats = parse_team_stats(&t).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].abbreviation, "OKC");
        assert_eq!(stats[0].net_rating, 12.9);
        assert_eq!(stats[1].abbreviation, "WAS");
        assert_eq!(stats[1].win_pct, TeamStats::LEAGUE_AVERAGE_WIN_PCT);
    }

    #[test]
    fn team_stats_without_identity_is_schema_error() {
        let t = table(&["W_PCT", "PACE"], vec![]);
        assert!(matches!(parse_team_stats(&t), Err(SourceError::Schema(_))));
    }

    #[test]
    fn espn_event_normalizes_codes_and_reads_national_tv() {
        let raw: ScoreboardResponse = serde_json::from_value(json!({
            "events": [{
                "id": "401705100",
                "name": "Golden State Warriors at New York Knicks",
                "date": "2025-01-16T00:30Z",
                "status": {"type": {"name": "STATUS_SCHEDULED", "shortDetail": "1/15 - 7:30 PM EST"}},
                "competitions": [{
                    "competitors": [
                        {"homeAway": "home", "team": {"abbreviation": "NY", "displayName": "New York Knicks"}},
                        {"homeAway": "away", "team": {"abbreviation": "GS", "displayName": "Golden State Warriors"}}
                    ],
                    "broadcasts": [
                        {"market": "home", "names": ["MSG"]},
                        {"market": "national", "names": ["TNT"]}
                    ]
                }]
            }, {
                "id": "401705101",
                "date": "2025-01-16T03:00Z",
                "status": {"type": {"name": "STATUS_POSTPONED", "shortDetail": "Postponed"}},
                "competitions": [{
                    "competitors": [
                        {"homeAway": "home", "team": {"abbreviation": "UTAH"}},
                        {"homeAway": "away", "team": {"abbreviation": "SA"}}
                    ]
                }]
            }]
        }))
        .unwrap();
        let games: Vec<ScheduledGame> = raw.events.unwrap().iter().filter_map(map_espn_event).collect();
        assert_eq!(games.len(), 2);
        assert_eq!((games[0].home.as_str(), games[0].away.as_str()), ("NYK", "GSW"));
        assert_eq!(games[0].broadcaster.as_deref(), Some("TNT"));
        let expected = NaiveDate::from_ymd_opt(2025, 1, 16).unwrap().and_hms_opt(0, 30, 0).unwrap().and_utc();
        assert_eq!(games[0].start, GameStart::Utc(expected));

        assert_eq!((games[1].home.as_str(), games[1].away.as_str()), ("UTA", "SAS"));
        assert_eq!(games[1].start, GameStart::Text("Postponed".into()));
        assert_eq!(games[1].broadcaster, None);
    }

    #[test]
    fn spreads_use_first_bookmaker_and_market() {
        let events: Vec<OddsEvent> = serde_json::from_value(json!([{
            "id": "e1",
            "home_team": "Los Angeles Lakers",
            "away_team": "Denver Nuggets",
            "bookmakers": [
                {"key": "draftkings", "markets": [{"key": "spreads", "outcomes": [
                    {"name": "Los Angeles Lakers", "point": -5.5},
                    {"name": "Denver Nuggets", "point": 5.5}
                ]}]},
                {"key": "fanduel", "markets": [{"key": "spreads", "outcomes": [
                    {"name": "Los Angeles Lakers", "point": -6.5}
                ]}]}
            ]
        }, {
            "id": "e2",
            "bookmakers": [{"key": "x", "markets": [{"key": "spreads", "outcomes": [
                {"name": "Seattle SuperSonics", "point": 3.0},
                {"name": "LA Clippers", "point": -3.0}
            ]}]}]
        }, {
            "id": "e3", "bookmakers": []
        }]))
        .unwrap();
        let spreads = map_spreads(&events);
        assert_eq!(spreads.get("LAL"), Some(&-5.5));
        assert_eq!(spreads.get("DEN"), Some(&5.5));
        assert_eq!(spreads.get("LAC"), Some(&-3.0));
        assert_eq!(spreads.len(), 3);
    }

    #[test]
    fn api_key_is_redacted() {
        assert_eq!(redact("https://x/odds?apiKey=secret&regions=us"), "https://x/odds?apiKey=***&regions=us");
        assert_eq!(redact("https://x/odds?apiKey=secret"), "https://x/odds?apiKey=***");
        assert_eq!(redact("https://x/stats"), "https://x/stats");
    }

    #[test]
    fn season_years() {
        assert_eq!(season_end_year("2024-25"), Some(2025));
        assert_eq!(season_end_year("bad"), None);
    }

    #[tokio::test]
    async fn schedule_falls_back_to_espn() {
        let mut server = mockito::Server::new_async().await;
        let stats = server
            .mock("GET", "/stats/scoreboardv2")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let espn = server
            .mock("GET", "/espn/scoreboard")
            .match_query(Matcher::UrlEncoded("dates".into(), "20250115".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"events": [{
                    "id": "1",
                    "date": "2025-01-16T00:30Z",
                    "status": {"type": {"name": "STATUS_SCHEDULED"}},
                    "competitions": [{"competitors": [
                        {"homeAway": "home", "team": {"abbreviation": "BOS"}},
                        {"homeAway": "away", "team": {"abbreviation": "MIA"}}
                    ]}]
                }]})
                .to_string(),
            )
            .create_async()
            .await;

        let games = test_client(&server.url(), None).fetch_schedule(date()).await.unwrap();
        stats.assert_async().await;
        espn.assert_async().await;
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].home, "BOS");
    }

    #[tokio::test]
    async fn schedule_without_game_header_uses_espn() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stats/scoreboardv2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"resultSets": [{"name": "LineScore", "headers": [], "rowSet": []}]}).to_string())
            .create_async()
            .await;
        let espn = server
            .mock("GET", "/espn/scoreboard")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"events": []}).to_string())
            .create_async()
            .await;
        let games = test_client(&server.url(), None).fetch_schedule(date()).await.unwrap();
        espn.assert_async().await;
        assert!(games.is_empty());
    }

    #[tokio::test]
    async fn schedule_from_stats_nba_when_reachable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stats/scoreboardv2")
            .match_query(Matcher::UrlEncoded("GameDate".into(), "2025-01-15".into()))
            .match_header("referer", "https://www.nba.com/")
            .with_status(200)
            .with_body(game_header_json().to_string())
            .create_async()
            .await;
        let games = test_client(&server.url(), None).fetch_schedule(date()).await.unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].game_id, "0022400560");
    }

    #[tokio::test]
    async fn player_stats_fall_back_to_html_table() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stats/leaguedashplayerstats")
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;
        let html = r#"<table id="per_game_stats">
            <thead><tr><th>Rk</th><th>Player</th><th>Team</th><th>G</th><th>PTS</th><th>TRB</th><th>AST</th><th>STL</th><th>BLK</th><th>TOV</th></tr></thead>
            <tbody><tr><th>1</th><td>LaMelo Ball</td><td>CHO</td><td>47</td><td>25.2</td><td>4.9</td><td>7.4</td><td>1.1</td><td>0.3</td><td>3.6</td></tr></tbody>
            </table>"#;
        server
            .mock("GET", "/bbref/NBA_2025_per_game.html")
            .with_status(200)
            .with_body(html)
            .create_async()
            .await;
        let rows = test_client(&server.url(), None).fetch_player_stats("2024-25").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team_code, "CHO");
        assert_eq!(rows[0].record.name, "LaMelo Ball");
    }

    #[tokio::test]
    async fn spreads_need_an_api_key() {
        let client = test_client("http://127.0.0.1:9", None);
        assert!(matches!(client.fetch_spreads().await, Err(SourceError::MissingCredential("ODDS_API_KEY"))));
    }

    #[tokio::test]
    async fn spreads_fetched_with_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/odds")
            .match_query(Matcher::UrlEncoded("apiKey".into(), "k123".into()))
            .with_status(200)
            .with_body(
                json!([{"bookmakers": [{"markets": [{"outcomes": [{"name": "Boston Celtics", "point": -9.5}]}]}]}])
                    .to_string(),
            )
            .create_async()
            .await;
        let spreads = test_client(&server.url(), Some("k123")).fetch_spreads().await.unwrap();
        assert_eq!(spreads.get("BOS"), Some(&-9.5));
    }

    #[tokio::test]
    async fn scraped_pages_parse_through_client() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/injuries")
            .with_status(200)
            .with_body(
                "<table><thead><tr><th>Player</th><th>Injury Status</th></tr></thead>\
                 <tbody><tr><td>Joel Embiid</td><td>Out</td></tr></tbody></table>",
            )
            .create_async()
            .await;
        server
            .mock("GET", "/lineups")
            .with_status(200)
            .with_body(r#"<div class="lineup__box"><a title="Tyrese Maxey">T. Maxey</a></div>"#)
            .create_async()
            .await;
        let client = test_client(&server.url(), None);
        assert!(client.fetch_injuries().await.unwrap().contains("Joel Embiid"));
        assert_eq!(client.fetch_active_players().await.unwrap(), vec!["Tyrese Maxey".to_owned()]);
    }

    #[tokio::test]
    async fn error_status_is_a_status_error() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/injuries").with_status(503).create_async().await;
        let client = test_client(&server.url(), None);
        assert!(matches!(client.fetch_injuries().await, Err(SourceError::Status(..))));
    }
}
