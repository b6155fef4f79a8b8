/// ESPN API raw wire types: serde shapes for the NBA scoreboard, which backs
/// the schedule adapter when stats.nba.com is unreachable.
use serde::Deserialize;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScoreboardResponse {
    pub events: Option<Vec<EspnEvent>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EspnEvent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>, // ISO 8601, UTC ("2025-01-15T00:30Z")
    pub status: Option<EspnStatus>,
    pub competitions: Option<Vec<EspnCompetition>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnStatus {
    #[serde(rename = "type")]
    pub status_type: Option<EspnStatusType>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnStatusType {
    pub name: Option<String>, // "STATUS_SCHEDULED", "STATUS_FINAL", "STATUS_POSTPONED"
    #[serde(rename = "shortDetail")]
    pub short_detail: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnCompetition {
    pub competitors: Option<Vec<EspnCompetitor>>,
    pub broadcasts: Option<Vec<EspnBroadcast>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EspnCompetitor {
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>, // "home" | "away"
    pub team: Option<EspnTeam>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnTeam {
    pub abbreviation: Option<String>, // ESPN short codes: "GS", "NY", "UTAH"
}

#[derive(Debug, Deserialize, Clone)]
pub struct EspnBroadcast {
    pub market: Option<String>, // "national" | "home" | "away"
    pub names: Option<Vec<String>>,
}
