//! Watchability scoring.
//!
//! One formula, every constant named in [`ScoringWeights`]. The score is a
//! sum of independent components (star power, team quality, a narrative
//! bonus, pace, offensive style, national TV) minus a capped spread penalty,
//! clamped to 0..=100.

use crate::availability::Availability;
use crate::roster::{StatsLookup, TeamIndex};
use crate::{GameRecord, PlayerRecord, Spreads, finite_or, round1};

pub const STAR_WEIGHTS: [f64; 3] = [1.5, 1.0, 0.5];
/// Divides the weighted star sum so two top-five players land near the top of the scale.
pub const STAR_NORMALIZER: f64 = 5.0;
pub const QUALITY_WEIGHT: f64 = 1.2;
pub const CONTENDER_WIN_PCT: f64 = 0.60;
pub const CONTENDER_BONUS: f64 = 10.0;
pub const WINNING_WIN_PCT: f64 = 0.50;
pub const WINNING_BONUS: f64 = 5.0;
pub const PACE_BASELINE: f64 = 98.0;
pub const PACE_WEIGHT: f64 = 1.5;
pub const OFF_RATING_BASELINE: f64 = 112.0;
pub const STYLE_WEIGHT: f64 = 1.0;
pub const MARQUEE_BROADCASTERS: [&str; 5] = ["ESPN", "ABC", "TNT", "NBC", "PRIME VIDEO"];
pub const TV_BONUS: f64 = 5.0;
pub const SPREAD_PENALTY_RATE: f64 = 2.5;
pub const SPREAD_PENALTY_CAP: f64 = 45.0;
pub const BASE_SCORE: f64 = 30.0;
/// Base used when neither team has any roster data, so a game with no star
/// signal still lands mid-scale.
pub const NO_SIGNAL_BASE_SCORE: f64 = 50.0;
/// Spread assumed when the odds source has nothing for the home team.
pub const DEFAULT_SPREAD: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    pub star_weights: [f64; 3],
    pub star_normalizer: f64,
    pub quality_weight: f64,
    pub contender_win_pct: f64,
    pub contender_bonus: f64,
    pub winning_win_pct: f64,
    pub winning_bonus: f64,
    pub pace_baseline: f64,
    pub pace_weight: f64,
    pub off_rating_baseline: f64,
    pub style_weight: f64,
    pub marquee_broadcasters: Vec<String>,
    pub tv_bonus: f64,
    pub spread_penalty_rate: f64,
    pub spread_penalty_cap: f64,
    pub base_score: f64,
    pub no_signal_base_score: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            star_weights: STAR_WEIGHTS,
            star_normalizer: STAR_NORMALIZER,
            quality_weight: QUALITY_WEIGHT,
            contender_win_pct: CONTENDER_WIN_PCT,
            contender_bonus: CONTENDER_BONUS,
            winning_win_pct: WINNING_WIN_PCT,
            winning_bonus: WINNING_BONUS,
            pace_baseline: PACE_BASELINE,
            pace_weight: PACE_WEIGHT,
            off_rating_baseline: OFF_RATING_BASELINE,
            style_weight: STYLE_WEIGHT,
            marquee_broadcasters: MARQUEE_BROADCASTERS.iter().map(|s| s.to_string()).collect(),
            tv_bonus: TV_BONUS,
            spread_penalty_rate: SPREAD_PENALTY_RATE,
            spread_penalty_cap: SPREAD_PENALTY_CAP,
            base_score: BASE_SCORE,
            no_signal_base_score: NO_SIGNAL_BASE_SCORE,
        }
    }
}

impl ScoringWeights {
    /// True when any `/`- or `,`-separated network in `broadcaster` is marquee.
    pub fn is_marquee(&self, broadcaster: &str) -> bool {
        broadcaster
            .split(['/', ','])
            .map(str::trim)
            .any(|part| self.marquee_broadcasters.iter().any(|m| m.eq_ignore_ascii_case(part)))
    }
}

/// Everything the formula knows about one side of a game.
#[derive(Debug, Clone)]
pub struct SideInputs<'a> {
    /// Whether the roster source had any entry for this team before injuries were applied.
    pub has_roster: bool,
    /// Available players, best first.
    pub available: Vec<&'a PlayerRecord>,
    pub stats: StatsLookup,
}

impl<'a> SideInputs<'a> {
    pub fn resolve(abbrev: &str, index: &'a TeamIndex, availability: &Availability) -> Self {
        let roster = index.roster(abbrev);
        Self {
            has_roster: !roster.is_empty(),
            available: availability.available(roster),
            stats: index.team_stats(abbrev),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameInputs<'a> {
    pub home: SideInputs<'a>,
    pub away: SideInputs<'a>,
    pub spread: f64,
    pub broadcaster: Option<&'a str>,
}

/// Every component of a score, kept for display and for tests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub home_star: f64,
    pub away_star: f64,
    pub star_component: f64,
    pub quality_component: f64,
    pub narrative_bonus: f64,
    pub avg_pace: f64,
    pub pace_bonus: f64,
    pub style_bonus: f64,
    pub tv_bonus: f64,
    pub spread_penalty: f64,
    pub base: f64,
    pub raw: f64,
    pub final_score: f64,
    pub star_index: i32,
    pub used_fallback_base: bool,
}

/// Weighted sum of the top three available players.
pub fn side_star(available: &[&PlayerRecord], weights: &ScoringWeights) -> f64 {
    available
        .iter()
        .zip(weights.star_weights.iter())
        .map(|(p, w)| finite_or(p.fantasy_points, 0.0) * w)
        .sum()
}

/// Spread keyed by the home team; [`DEFAULT_SPREAD`] when absent or non-finite.
pub fn spread_for(spreads: &Spreads, home: &str) -> f64 {
    spreads.get(home).copied().map(|s| finite_or(s, DEFAULT_SPREAD)).unwrap_or(DEFAULT_SPREAD)
}

pub fn score(inputs: &GameInputs<'_>, weights: &ScoringWeights) -> ScoreBreakdown {
    let mut b = ScoreBreakdown::default();
    let (home, away) = (&inputs.home, &inputs.away);

    b.used_fallback_base = !home.has_roster && !away.has_roster;
    if b.used_fallback_base {
        b.base = weights.no_signal_base_score;
    } else {
        b.base = weights.base_score;
        b.home_star = side_star(&home.available, weights);
        b.away_star = side_star(&away.available, weights);
        b.star_component = (b.home_star + b.away_star) / weights.star_normalizer;
    }

    let (hs, aws) = (&home.stats.stats, &away.stats.stats);
    b.avg_pace = (hs.pace + aws.pace) / 2.0;

    // Two league-average placeholders carry no signal.
    if home.stats.sourced || away.stats.sourced {
        b.quality_component = (hs.net_rating + aws.net_rating) * weights.quality_weight;

        let weaker = hs.win_pct.min(aws.win_pct);
        b.narrative_bonus = if weaker > weights.contender_win_pct {
            weights.contender_bonus
        } else if weaker > weights.winning_win_pct {
            weights.winning_bonus
        } else {
            0.0
        };

        b.pace_bonus = ((b.avg_pace - weights.pace_baseline) * weights.pace_weight).max(0.0);
        let avg_off = (hs.off_rating + aws.off_rating) / 2.0;
        b.style_bonus = ((avg_off - weights.off_rating_baseline) * weights.style_weight).max(0.0);
    }

    if inputs.broadcaster.is_some_and(|tv| weights.is_marquee(tv)) {
        b.tv_bonus = weights.tv_bonus;
    }

    let spread = finite_or(inputs.spread, DEFAULT_SPREAD);
    b.spread_penalty = (spread.abs() * weights.spread_penalty_rate).min(weights.spread_penalty_cap);

    b.raw = b.base + b.star_component + b.quality_component + b.narrative_bonus + b.pace_bonus + b.style_bonus
        + b.tv_bonus
        - b.spread_penalty;
    b.final_score = round1(finite_or(b.raw, b.base).clamp(0.0, 100.0));
    b.star_index = finite_or((b.home_star + b.away_star).round(), 0.0) as i32;
    b
}

/// Sort best first. Stable, so equal scores keep schedule order.
pub fn rank_by_score(records: &mut [GameRecord]) {
    records.sort_by(|a, b| b.score.total_cmp(&a.score));
}
