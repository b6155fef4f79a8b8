mod app;
mod render;

use crate::app::App;
use lp_engine::config::{EngineConfig, today_in_eastern};
use lp_engine::schedule::parse_date;

#[derive(Debug, Clone, Default, PartialEq)]
struct Options {
    date: Option<String>,
    update: bool,
    json: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum CliAction {
    Run(Options),
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = match handle_cli_args(std::env::args().skip(1)) {
        Ok(CliAction::Run(options)) => options,
        Ok(CliAction::Help) => {
            println!("{}", usage_text());
            return Ok(());
        }
        Ok(CliAction::Version) => {
            println!("lpranker {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    better_panic::install();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut app = App::new(EngineConfig::from_env());

    if options.update {
        let path = app.update_snapshot().await?;
        println!("Snapshot written to {}", path.display());
        return Ok(());
    }

    let date = match options.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => today_in_eastern(),
    };
    let records = app.ranked(date).await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        println!("{}", render::report(date, &records));
    }
    Ok(())
}

fn handle_cli_args(args: impl IntoIterator<Item = String>) -> Result<CliAction, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliAction::Help),
            "-V" | "--version" => return Ok(CliAction::Version),
            "-d" | "--date" => {
                let value = args.next().ok_or_else(|| format!("{arg} needs a YYYY-MM-DD value"))?;
                options.date = Some(value);
            }
            "--update" => options.update = true,
            "--json" => options.json = true,
            _ => match arg.strip_prefix("--date=") {
                Some(value) => options.date = Some(value.to_owned()),
                None => return Err(format!("Unknown argument: {arg}")),
            },
        }
    }
    Ok(CliAction::Run(options))
}

fn usage_text() -> &'static str {
    "lpranker - rank tonight's NBA games by watchability

Usage:
  lpranker [-d|--date YYYY-MM-DD] [--json]
  lpranker --update
  lpranker --help
  lpranker --version

Options:
  -d, --date     US calendar date to rank (default: today in US Eastern)
  --json         Print the ranked games as JSON
  --update       Fetch live team/player/lineup data and write the snapshot file

Environment:
  ODDS_API_KEY             The Odds API key; spreads default to 10 without it
  LPRANKER_SNAPSHOT_JSON   Snapshot file path (default nba_data.json)
  LPRANKER_DISPLAY_TZ      Display timezone (default Asia/Kolkata)
  LPRANKER_TIMEOUT_SECS    Per-request timeout in seconds (default 5)
  LPRANKER_SEASON          Season such as 2024-25 (default: derived from the date)
  RUST_LOG                 Log filter (default warn)"
}
