//! Runtime configuration read from `LPRANKER_*` environment variables.

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use log::warn;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SNAPSHOT_PATH: &str = "nba_data.json";
pub const DEFAULT_DISPLAY_TZ: Tz = chrono_tz::Asia::Kolkata;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Months from October on belong to the season that ends next year.
const SEASON_START_MONTH: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub odds_api_key: Option<String>,
    pub snapshot_path: PathBuf,
    pub display_tz: Tz,
    pub timeout: Duration,
    /// Explicit season ("2024-25"); derived from the requested date when unset.
    pub season: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            odds_api_key: None,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            display_tz: DEFAULT_DISPLAY_TZ,
            timeout: DEFAULT_TIMEOUT,
            season: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset and
    /// unparseable values fall back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.odds_api_key = get("ODDS_API_KEY");

        if let Some(path) = get("LPRANKER_SNAPSHOT_JSON") {
            config.snapshot_path = PathBuf::from(path);
        }

        if let Some(tz) = get("LPRANKER_DISPLAY_TZ") {
            match tz.parse::<Tz>() {
                Ok(tz) => config.display_tz = tz,
                Err(_) => warn!("unknown LPRANKER_DISPLAY_TZ {tz:?}, using {DEFAULT_DISPLAY_TZ}"),
            }
        }

        if let Some(secs) = get("LPRANKER_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!("invalid LPRANKER_TIMEOUT_SECS {secs:?}, using {}s", DEFAULT_TIMEOUT.as_secs()),
            }
        }

        config.season = get("LPRANKER_SEASON");
        config
    }

    pub fn season_for(&self, date: NaiveDate) -> String {
        self.season.clone().unwrap_or_else(|| season_for(date))
    }
}

/// Today's date in US Eastern, the calendar the league schedules by.
pub fn today_in_eastern() -> NaiveDate {
    Utc::now().with_timezone(&chrono_tz::America::New_York).date_naive()
}

/// NBA season string ("2024-25") containing `date`.
pub fn season_for(date: NaiveDate) -> String {
    let start = if date.month() >= SEASON_START_MONTH { date.year() } else { date.year() - 1 };
    format!("{start}-{:02}", (start + 1).rem_euclid(100))
}
