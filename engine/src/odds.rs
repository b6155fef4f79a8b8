/// The Odds API raw wire types (`/v4/sports/basketball_nba/odds`).
use serde::Deserialize;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OddsEvent {
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Bookmaker {
    #[serde(default)]
    pub markets: Vec<Market>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Market {
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Outcome {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub point: Option<f64>,
}
