use chrono::NaiveDate;
use lp_engine::cache::ScheduleCache;
use lp_engine::client::SourceClient;
use lp_engine::config::{EngineConfig, today_in_eastern};
use lp_engine::scoring::rank_by_score;
use lp_engine::snapshot::Snapshot;
use lp_engine::{GameRecord, Ranker};
use log::info;
use std::path::PathBuf;

pub struct App {
    ranker: Ranker<SourceClient>,
    cache: ScheduleCache,
}

impl App {
    pub fn new(config: EngineConfig) -> Self {
        Self { ranker: Ranker::from_config(config), cache: ScheduleCache::default() }
    }

    /// Games for `date`, best first. Served from the cache while fresh.
    pub async fn ranked(&mut self, date: NaiveDate) -> Vec<GameRecord> {
        let mut records = match self.cache.get(date) {
            Some(hit) => {
                info!("using cached schedule for {date}");
                hit.to_vec()
            }
            None => {
                let fresh = self.ranker.schedule_for(date).await;
                self.cache.insert(date, fresh.clone());
                fresh
            }
        };
        rank_by_score(&mut records);
        records
    }

    /// Capture live data into the snapshot file and drop cached results.
    pub async fn update_snapshot(&mut self) -> anyhow::Result<PathBuf> {
        let config = self.ranker.config();
        let season = config.season_for(today_in_eastern());
        let path = config.snapshot_path.clone();
        let snapshot = Snapshot::capture(self.ranker.sources(), &season).await;
        snapshot.save(&path)?;
        self.cache.clear();
        Ok(path)
    }
}
