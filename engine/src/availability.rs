//! Decide which rostered players are realistically expected to play.
//!
//! Player names are never a stable key across sources: box scores, lineup
//! pages and injury reports differ in diacritics, punctuation and suffixes.
//! Matching always errs toward "available" since a false "out" silently
//! deflates a team: injury names must match exactly after normalization,
//! while lineup names may also match fuzzily above a high threshold.

use crate::{ActivePlayers, InjuryStatus, PlayerRecord};
use std::collections::HashSet;
use strsim::normalized_levenshtein;

/// Below this many names the lineup signal is treated as missing.
pub const MIN_ACTIVE_SIGNAL: usize = 10;

/// Normalized similarity required to call two different spellings the same player.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.88;

const NAME_SUFFIXES: [&str; 5] = ["jr", "sr", "ii", "iii", "iv"];

/// A set of names that can be queried exactly or approximately.
#[derive(Debug, Clone, Default)]
pub struct NameSet {
    exact: HashSet<String>,
    normalized: Vec<String>,
}

impl NameSet {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        let mut set = Self::default();
        for name in names {
            let key = normalize_name(name);
            if set.exact.insert(name.clone()) && !key.is_empty() {
                set.normalized.push(key);
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Exact or normalized-equal match.
    pub fn contains_exact(&self, name: &str) -> bool {
        if self.exact.contains(name) {
            return true;
        }
        let key = normalize_name(name);
        !key.is_empty() && self.normalized.contains(&key)
    }

    /// Exact, normalized-equal, or fuzzy match.
    pub fn contains(&self, name: &str) -> bool {
        if self.exact.contains(name) {
            return true;
        }
        let key = normalize_name(name);
        if key.is_empty() {
            return false;
        }
        self.normalized.iter().any(|candidate| names_match(&key, candidate))
    }
}

fn names_match(a: &str, b: &str) -> bool {
    a == b || normalized_levenshtein(a, b) >= FUZZY_MATCH_THRESHOLD
}

/// Similarity of two raw names on a 0..=1 scale, after normalization.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&normalize_name(a), &normalize_name(b))
}

/// Lowercase, fold Latin diacritics, drop periods and apostrophes ("P.J.",
/// "De'Aaron"), split on other punctuation, drop generational suffixes, then
/// sort tokens so word order does not matter.
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .chars()
        .filter(|c| !matches!(c, '.' | '\'' | '’'))
        .flat_map(fold_char)
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    let mut tokens: Vec<&str> = folded
        .split_whitespace()
        .filter(|t| !NAME_SUFFIXES.contains(t))
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn fold_char(c: char) -> Vec<char> {
    let lower: Vec<char> = c.to_lowercase().collect();
    lower
        .into_iter()
        .flat_map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => vec!['a'],
            'æ' => vec!['a', 'e'],
            'ç' | 'ć' | 'č' => vec!['c'],
            'ď' | 'đ' => vec!['d'],
            'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => vec!['e'],
            'ğ' | 'ģ' => vec!['g'],
            'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => vec!['i'],
            'ķ' => vec!['k'],
            'ĺ' | 'ļ' | 'ľ' | 'ł' => vec!['l'],
            'ñ' | 'ń' | 'ņ' | 'ň' => vec!['n'],
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => vec!['o'],
            'ŕ' | 'ř' => vec!['r'],
            'ś' | 'ş' | 'š' | 'ș' => vec!['s'],
            'ß' => vec!['s', 's'],
            'ţ' | 'ť' | 'ț' => vec!['t'],
            'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => vec!['u'],
            'ý' | 'ÿ' => vec!['y'],
            'ź' | 'ż' | 'ž' => vec!['z'],
            other => vec![other],
        })
        .collect()
}

/// Injury and lineup signals for one run.
#[derive(Debug, Clone, Default)]
pub struct Availability {
    injured: NameSet,
    active: NameSet,
    min_signal: usize,
}

impl Availability {
    pub fn new(injuries: &InjuryStatus, active: &ActivePlayers) -> Self {
        Self::with_min_signal(injuries, active, MIN_ACTIVE_SIGNAL)
    }

    pub fn with_min_signal(injuries: &InjuryStatus, active: &ActivePlayers, min_signal: usize) -> Self {
        Self { injured: NameSet::new(injuries), active: NameSet::new(active), min_signal }
    }

    /// Whether the lineup signal is big enough to be trusted.
    pub fn has_lineup_signal(&self) -> bool {
        self.active.len() >= self.min_signal
    }

    pub fn is_injured(&self, name: &str) -> bool {
        self.injured.contains_exact(name)
    }

    /// Whether the lineup page covers this team: the league-wide signal is
    /// strong and at least one of its rostered players is listed.
    pub fn covers(&self, roster: &[PlayerRecord]) -> bool {
        self.has_lineup_signal() && roster.iter().any(|p| self.active.contains(&p.name))
    }

    /// The roster filtered to available players, order preserved. Lineups
    /// only filter teams the lineup page covers; injuries always apply.
    pub fn available<'a>(&self, roster: &'a [PlayerRecord]) -> Vec<&'a PlayerRecord> {
        let lineup_applies = self.covers(roster);
        roster
            .iter()
            .filter(|p| !self.is_injured(&p.name))
            .filter(|p| !lineup_applies || self.active.contains(&p.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, fp: f64) -> PlayerRecord {
        PlayerRecord { name: name.into(), fantasy_points: fp }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diacritics_fold_to_same_player() {
        assert_eq!(normalize_name("Luka Dončić"), normalize_name("Luka Doncic"));
        let set = NameSet::new(&names(&["Luka Doncic"]));
        assert!(set.contains("Luka Dončić"));
        assert!(name_similarity("Nikola Jokić", "Nikola Jokic") >= FUZZY_MATCH_THRESHOLD);
    }

    #[test]
    fn different_players_do_not_match() {
        let set = NameSet::new(&names(&["Jalen Johnson"]));
        assert!(!set.contains("Jalen Green"));
        assert!(name_similarity("Jalen Green", "Jalen Johnson") < FUZZY_MATCH_THRESHOLD);
        assert!(!NameSet::new(&names(&["Jaylin Williams"])).contains("Jalen Williams"));
    }

    #[test]
    fn suffixes_and_punctuation_are_ignored() {
        let set = NameSet::new(&names(&["Jaren Jackson", "Trey Murphy", "PJ Washington"]));
        assert!(set.contains("Jaren Jackson Jr."));
        assert!(set.contains("Trey Murphy III"));
        assert!(set.contains("P.J. Washington"));
    }

    #[test]
    fn small_signal_treats_everyone_as_available() {
        let roster = vec![player("A", 40.0), player("B", 30.0), player("C", 20.0)];
        let active = names(&["A"]);
        let availability = Availability::new(&InjuryStatus::new(), &active);
        assert!(!availability.has_lineup_signal());
        assert_eq!(availability.available(&roster).len(), roster.len());

        let none = Availability::new(&InjuryStatus::new(), &ActivePlayers::new());
        assert_eq!(none.available(&roster).len(), roster.len());
    }

    #[test]
    fn strong_signal_keeps_only_listed_players() {
        let mut active: Vec<String> = (0..MIN_ACTIVE_SIGNAL).map(|i| format!("Bench Guy {i}")).collect();
        active.push("Luka Doncic".into());
        let availability = Availability::new(&InjuryStatus::new(), &active);
        let roster = vec![player("Luka Dončić", 58.5), player("LeBron James", 48.6)];
        let available = availability.available(&roster);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Luka Dončić");
    }

    #[test]
    fn team_missing_from_lineups_keeps_its_roster() {
        let active: Vec<String> = (0..12).map(|i| format!("Listed Player {i}")).collect();
        let availability = Availability::new(&InjuryStatus::new(), &active);
        assert!(availability.has_lineup_signal());
        let roster = vec![player("Jayson Tatum", 49.3), player("Jaylen Brown", 37.0)];
        assert!(!availability.covers(&roster));
        assert_eq!(availability.available(&roster).len(), 2);
    }

    #[test]
    fn uncovered_team_still_loses_injured_players() {
        let active: Vec<String> = (0..12).map(|i| format!("Listed Player {i}")).collect();
        let injuries: InjuryStatus = ["Jayson Tatum".to_string()].into_iter().collect();
        let availability = Availability::new(&injuries, &active);
        let roster = vec![player("Jayson Tatum", 49.3), player("Jaylen Brown", 37.0)];
        let available = availability.available(&roster);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Jaylen Brown");
    }

    #[test]
    fn injury_matches_are_never_fuzzy() {
        let injuries: InjuryStatus = ["Jalen McDaniels".to_string()].into_iter().collect();
        let availability = Availability::new(&injuries, &ActivePlayers::new());
        assert!(name_similarity("Jaden McDaniels", "Jalen McDaniels") >= FUZZY_MATCH_THRESHOLD);
        assert!(!availability.is_injured("Jaden McDaniels"));
        assert!(availability.is_injured("Jalen McDaniels"));
        let roster = vec![player("Jaden McDaniels", 30.0)];
        assert_eq!(availability.available(&roster).len(), 1);
    }

    #[test]
    fn injury_matches_fold_spelling_variants() {
        let injuries: InjuryStatus =
            ["Luka Doncic".to_string(), "Jaren Jackson Jr.".to_string()].into_iter().collect();
        let availability = Availability::new(&injuries, &ActivePlayers::new());
        assert!(availability.is_injured("Luka Dončić"));
        assert!(availability.is_injured("Jaren Jackson"));
    }

    #[test]
    fn injured_players_removed_even_without_lineups() {
        let injuries: InjuryStatus = ["Joel Embiid".to_string()].into_iter().collect();
        let availability = Availability::new(&injuries, &ActivePlayers::new());
        let roster = vec![player("Joel Embiid", 45.0), player("Tyrese Maxey", 43.0)];
        let available = availability.available(&roster);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Tyrese Maxey");
    }
}
