//! Cleaning and parsing of scraped HTML pages. Fetching lives in `client.rs`;
//! everything here is a pure function from page text to typed data.

use crate::nba_stats::StatTable;
use crate::{ActivePlayers, InjuryStatus};
use log::debug;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Injury statuses that take a player out of consideration.
pub const UNAVAILABLE_STATUSES: [&str; 4] = ["out", "doubtful", "expected to be out", "out for season"];

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive substring match against [`UNAVAILABLE_STATUSES`].
pub fn is_unavailable_status(status: &str) -> bool {
    let status = status.to_lowercase();
    UNAVAILABLE_STATUSES.iter().any(|s| status.contains(s))
}

/// Injury pages render a short and a long name in the same cell, which
/// flattens to text like "M. StrusMax Strus". Keep the long form.
pub fn clean_player_name(raw: &str) -> String {
    let raw = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<(usize, char)> = raw.char_indices().collect();
    for pair in chars.windows(2) {
        let ((_, prev), (idx, cur)) = (pair[0], pair[1]);
        if !(prev.is_lowercase() && cur.is_uppercase()) {
            continue;
        }
        let (left, right) = raw.split_at(idx);
        if !left.contains('.') {
            continue;
        }
        if left.split_whitespace().last() == right.split_whitespace().last() {
            return right.to_owned();
        }
    }
    raw
}

/// Parse every table on an injury report page, collecting players whose
/// status marks them unavailable. Tables without both a player and a status
/// column are skipped.
pub fn parse_injury_report(html: &str) -> InjuryStatus {
    let mut out = InjuryStatus::new();
    let doc = Html::parse_document(html);
    let (Some(table_sel), Some(th_sel), Some(row_sel), Some(td_sel), Some(long_sel)) = (
        selector("table"),
        selector("thead th"),
        selector("tbody tr"),
        selector("td"),
        selector("[class*='long']"),
    ) else {
        return out;
    };

    for table in doc.select(&table_sel) {
        let headers: Vec<String> = table.select(&th_sel).map(|th| element_text(th).to_lowercase()).collect();
        let player_col = headers.iter().position(|h| h == "player");
        let status_col = headers.iter().position(|h| h == "injury status" || h == "status");
        let (Some(player_col), Some(status_col)) = (player_col, status_col) else {
            debug!("injury table skipped, headers={headers:?}");
            continue;
        };

        for row in table.select(&row_sel) {
            let cells: Vec<ElementRef<'_>> = row.select(&td_sel).collect();
            let (Some(player), Some(status)) = (cells.get(player_col), cells.get(status_col)) else {
                continue;
            };
            if !is_unavailable_status(&element_text(*status)) {
                continue;
            }
            let name = match player.select(&long_sel).next() {
                Some(long) => element_text(long),
                None => clean_player_name(&element_text(*player)),
            };
            if !name.is_empty() {
                out.insert(name);
            }
        }
    }
    out
}

/// Names from a projected-lineups page (`.lineup__box a[title]`), in page order, deduplicated.
pub fn parse_lineups(html: &str) -> ActivePlayers {
    let doc = Html::parse_document(html);
    let Some(sel) = selector(".lineup__box a[title]") else {
        return ActivePlayers::new();
    };
    let mut out = ActivePlayers::new();
    for link in doc.select(&sel) {
        let Some(title) = link.value().attr("title") else { continue };
        let name = title.trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_owned());
        }
    }
    out
}

/// Parse an HTML stats table (`<table id=...>`) into a [`StatTable`]. Header
/// cells come from the last `thead` row; repeated mid-table header rows are
/// dropped. Returns `None` when the table is missing or has no header.
pub fn parse_stat_table(html: &str, table_id: &str) -> Option<StatTable> {
    let doc = Html::parse_document(html);
    let table_sel = selector(&format!("table#{table_id}"))?;
    let head_row_sel = selector("thead tr")?;
    let cell_sel = selector("th, td")?;
    let body_row_sel = selector("tbody tr")?;

    let table = doc.select(&table_sel).next()?;
    let headers: Vec<String> = table
        .select(&head_row_sel)
        .last()?
        .select(&cell_sel)
        .map(element_text)
        .collect();
    if headers.is_empty() {
        return None;
    }

    let rows = table
        .select(&body_row_sel)
        .filter(|tr| !tr.value().classes().any(|c| c == "thead"))
        .map(|tr| tr.select(&cell_sel).map(|c| Value::String(element_text(c))).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();

    Some(StatTable { name: table_id.to_owned(), headers, rows })
}
