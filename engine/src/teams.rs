//! Canonical NBA team table and team-code normalization.
//!
//! Every source spells teams differently: stats.nba.com uses `BKN`/`CHA`/`PHX`,
//! basketball-reference uses `BRK`/`CHO`/`PHO`, ESPN uses `GS`/`NY`/`UTAH`, and
//! the odds feed only has full names. All lookups funnel through here before
//! anything is keyed by abbreviation.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    pub id: u32,
    pub abbrev: &'static str,
    pub name: &'static str,
}

impl Team {
    pub fn logo_url(&self) -> String {
        format!("https://cdn.nba.com/logos/nba/{}/global/L/logo.svg", self.id)
    }
}

/// Shown when a schedule row names a team we cannot resolve.
pub const GENERIC_LOGO_URL: &str = "https://cdn.nba.com/logos/leagues/logo-nba.svg";

pub static TEAMS: [Team; 30] = [
    Team { id: 1610612737, abbrev: "ATL", name: "Atlanta Hawks" },
    Team { id: 1610612738, abbrev: "BOS", name: "Boston Celtics" },
    Team { id: 1610612751, abbrev: "BKN", name: "Brooklyn Nets" },
    Team { id: 1610612766, abbrev: "CHA", name: "Charlotte Hornets" },
    Team { id: 1610612741, abbrev: "CHI", name: "Chicago Bulls" },
    Team { id: 1610612739, abbrev: "CLE", name: "Cleveland Cavaliers" },
    Team { id: 1610612742, abbrev: "DAL", name: "Dallas Mavericks" },
    Team { id: 1610612743, abbrev: "DEN", name: "Denver Nuggets" },
    Team { id: 1610612765, abbrev: "DET", name: "Detroit Pistons" },
    Team { id: 1610612744, abbrev: "GSW", name: "Golden State Warriors" },
    Team { id: 1610612745, abbrev: "HOU", name: "Houston Rockets" },
    Team { id: 1610612754, abbrev: "IND", name: "Indiana Pacers" },
    Team { id: 1610612746, abbrev: "LAC", name: "Los Angeles Clippers" },
    Team { id: 1610612747, abbrev: "LAL", name: "Los Angeles Lakers" },
    Team { id: 1610612763, abbrev: "MEM", name: "Memphis Grizzlies" },
    Team { id: 1610612748, abbrev: "MIA", name: "Miami Heat" },
    Team { id: 1610612749, abbrev: "MIL", name: "Milwaukee Bucks" },
    Team { id: 1610612750, abbrev: "MIN", name: "Minnesota Timberwolves" },
    Team { id: 1610612740, abbrev: "NOP", name: "New Orleans Pelicans" },
    Team { id: 1610612752, abbrev: "NYK", name: "New York Knicks" },
    Team { id: 1610612760, abbrev: "OKC", name: "Oklahoma City Thunder" },
    Team { id: 1610612753, abbrev: "ORL", name: "Orlando Magic" },
    Team { id: 1610612755, abbrev: "PHI", name: "Philadelphia 76ers" },
    Team { id: 1610612756, abbrev: "PHX", name: "Phoenix Suns" },
    Team { id: 1610612757, abbrev: "POR", name: "Portland Trail Blazers" },
    Team { id: 1610612758, abbrev: "SAC", name: "Sacramento Kings" },
    Team { id: 1610612759, abbrev: "SAS", name: "San Antonio Spurs" },
    Team { id: 1610612761, abbrev: "TOR", name: "Toronto Raptors" },
    Team { id: 1610612762, abbrev: "UTA", name: "Utah Jazz" },
    Team { id: 1610612764, abbrev: "WAS", name: "Washington Wizards" },
];

/// Alternate codes seen across sources, mapped to the canonical abbreviation.
static LEGACY_CODES: [(&str, &str); 15] = [
    ("BRK", "BKN"),
    ("NJN", "BKN"),
    ("CHO", "CHA"),
    ("CHH", "CHA"),
    ("PHO", "PHX"),
    ("NOH", "NOP"),
    ("NOK", "NOP"),
    ("NO", "NOP"),
    ("GS", "GSW"),
    ("NY", "NYK"),
    ("SA", "SAS"),
    ("UTAH", "UTA"),
    ("WSH", "WAS"),
    ("SEA", "OKC"),
    ("VAN", "MEM"),
];

/// Outcome of resolving a raw team code from some source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamCode {
    Team(&'static Team),
    /// Multi-team aggregate row for a player traded mid-season (`TOT`, `2TM`, ...).
    Combined,
    Unknown,
}

pub fn lookup_code(code: &str) -> TeamCode {
    let code = code.trim().to_ascii_uppercase();
    if is_combined_sentinel(&code) {
        return TeamCode::Combined;
    }
    let canonical = LEGACY_CODES
        .iter()
        .find(|(legacy, _)| *legacy == code)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(code.as_str());
    by_abbrev(canonical).map_or(TeamCode::Unknown, TeamCode::Team)
}

fn is_combined_sentinel(code: &str) -> bool {
    if code == "TOT" {
        return true;
    }
    // basketball-reference switched to "2TM", "3TM", ... in 2024-25.
    code.len() == 3 && code.ends_with("TM") && code.as_bytes()[0].is_ascii_digit()
}

pub fn by_abbrev(abbrev: &str) -> Option<&'static Team> {
    TEAMS.iter().find(|t| t.abbrev.eq_ignore_ascii_case(abbrev))
}

pub fn by_id(id: u32) -> Option<&'static Team> {
    TEAMS.iter().find(|t| t.id == id)
}

/// Resolve a full franchise name ("Los Angeles Lakers"), as used by the odds feed.
pub fn by_name(name: &str) -> Option<&'static Team> {
    let name = name.trim();
    TEAMS.iter().find(|t| t.name.eq_ignore_ascii_case(name)).or_else(|| {
        // "LA Clippers" is the franchise's own branding and shows up in some feeds.
        name.eq_ignore_ascii_case("LA Clippers").then(|| by_abbrev("LAC")).flatten()
    })
}

pub fn logo_for(abbrev: &str) -> String {
    by_abbrev(abbrev).map_or_else(|| GENERIC_LOGO_URL.to_owned(), Team::logo_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_brooklyn_and_charlotte_codes_map_to_canonical() {
        assert_eq!(lookup_code("BRK"), TeamCode::Team(by_abbrev("BKN").unwrap()));
        assert_eq!(lookup_code("CHO"), TeamCode::Team(by_abbrev("CHA").unwrap()));
        assert_eq!(lookup_code("pho"), TeamCode::Team(by_abbrev("PHX").unwrap()));
    }

    #[test]
    fn espn_short_codes_map_to_canonical() {
        assert_eq!(lookup_code("GS"), TeamCode::Team(by_abbrev("GSW").unwrap()));
        assert_eq!(lookup_code("UTAH"), TeamCode::Team(by_abbrev("UTA").unwrap()));
        assert_eq!(lookup_code("WSH"), TeamCode::Team(by_abbrev("WAS").unwrap()));
    }

    #[test]
    fn combined_rows_are_flagged() {
        assert_eq!(lookup_code("TOT"), TeamCode::Combined);
        assert_eq!(lookup_code("2TM"), TeamCode::Combined);
        assert_eq!(lookup_code("3TM"), TeamCode::Combined);
        assert_eq!(lookup_code("XYZ"), TeamCode::Unknown);
    }

    #[test]
    fn canonical_codes_resolve_to_themselves() {
        for team in &TEAMS {
            assert_eq!(lookup_code(team.abbrev), TeamCode::Team(team));
            assert_eq!(by_id(team.id), Some(team));
        }
    }

    #[test]
    fn full_names_resolve() {
        assert_eq!(by_name("Los Angeles Lakers").map(|t| t.abbrev), Some("LAL"));
        assert_eq!(by_name("LA Clippers").map(|t| t.abbrev), Some("LAC"));
        assert!(by_name("Seattle Supersonics").is_none());
    }

    #[test]
    fn unknown_team_gets_generic_logo() {
        assert_eq!(logo_for("???"), GENERIC_LOGO_URL);
        assert!(logo_for("LAL").contains("1610612747"));
    }
}
