//! Plain-text report for a ranked slate.

use chrono::NaiveDate;
use lp_engine::{DataTier, GameRecord};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Tabled)]
struct Row {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Slot")]
    slot: &'static str,
    #[tabled(rename = "Matchup")]
    matchup: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Spread")]
    spread: String,
    #[tabled(rename = "Stars")]
    stars: i32,
    #[tabled(rename = "Pace")]
    pace: String,
    #[tabled(rename = "TV")]
    tv: String,
}

impl Row {
    fn new(rank: usize, record: &GameRecord) -> Self {
        Self {
            rank,
            time: record.start_time.clone(),
            slot: record.viewing_slot().label(),
            matchup: record.matchup.clone(),
            score: format!("{:.1}", record.score),
            spread: format!("{:+.1}", record.spread),
            stars: record.star_index,
            pace: format!("{:.1}", record.pace),
            tv: record.broadcast.clone(),
        }
    }
}

/// ONLINE unless every game was scored from the built-in star table.
pub fn status_line(records: &[GameRecord]) -> String {
    let fallback = DataTier::StaticFallback.label();
    match records.first() {
        None => "NO GAMES".to_owned(),
        Some(first) if records.iter().all(|r| r.source_label == fallback) => {
            format!("FALLBACK - {}", first.source_label)
        }
        Some(first) => format!("ONLINE - {}", first.source_label),
    }
}

/// Expects `records` already ranked best first.
pub fn game_of_the_day(records: &[GameRecord]) -> Option<String> {
    records
        .first()
        .map(|top| format!("Game of the Day: {} ({:.1}) at {} on {}", top.matchup, top.score, top.start_time, top.broadcast))
}

pub fn report(date: NaiveDate, records: &[GameRecord]) -> String {
    if records.is_empty() {
        return format!("No games found for {date}.");
    }
    let rows: Vec<Row> = records.iter().enumerate().map(|(i, r)| Row::new(i + 1, r)).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());

    let mut out = format!("League Pass ranking for {date}\n{}\n", status_line(records));
    if let Some(line) = game_of_the_day(records) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&table.to_string());
    out
}
