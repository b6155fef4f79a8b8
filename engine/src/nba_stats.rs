/// stats.nba.com raw wire types. Every endpoint answers with a list of
/// header/row tables; `StatTable` is also what the HTML scrapers produce so the
/// same column-lookup code serves both.
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StatsResponse {
    #[serde(rename = "resultSets", default)]
    pub result_sets: Vec<StatTable>,
}

impl StatsResponse {
    /// Find a result set by name (case-insensitive).
    pub fn table(&self, name: &str) -> Option<&StatTable> {
        self.result_sets.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct StatTable {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    pub rows: Vec<Vec<Value>>,
}

impl StatTable {
    /// Index of the first header matching any alias (case-insensitive).
    pub fn column(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|alias| {
            self.headers.iter().position(|h| h.trim().eq_ignore_ascii_case(alias))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a cell as text. Numbers are rendered; null and missing cells are `None`.
pub fn cell_str(row: &[Value], idx: usize) -> Option<String> {
    match row.get(idx)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a cell as a number. Scraped cells arrive as text ("27.4", ".612").
pub fn cell_f64(row: &[Value], idx: usize) -> Option<f64> {
    let v = match row.get(idx)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}
