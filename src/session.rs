// Session-scoped data context
// The three tables are loaded once and stay read-only for the session
use chrono::{DateTime, Utc};

use crate::config::{DatasetSchemas, RetryPolicy};
use crate::state::{
    self, with_retry, ArtRecord, SeasonalTrend, SourceResult, TabularSource, TourismStat,
};

#[derive(Debug, Clone)]
pub struct Session {
    art: Vec<ArtRecord>,
    tourism: Vec<TourismStat>,
    seasonal: Vec<SeasonalTrend>,
    loaded_at: DateTime<Utc>,
}

impl Session {
    /// Load all three datasets. Any hard failure aborts the whole load;
    /// every view depends on every table.
    pub fn load(
        source: &dyn TabularSource,
        datasets: &DatasetSchemas,
        retry: &RetryPolicy,
    ) -> SourceResult<Session> {
        let art = with_retry(retry, "loading art records", || {
            state::load_art_records(source, &datasets.art)
        })?;
        let tourism = with_retry(retry, "loading tourism stats", || {
            state::load_tourism_stats(source, &datasets.tourism)
        })?;
        let seasonal = with_retry(retry, "loading seasonal trends", || {
            state::load_seasonal_trends(source, &datasets.seasonal)
        })?;

        log::info!(
            "session loaded from {}: {} art records, {} tourism stats, {} seasonal rows",
            source.name(),
            art.len(),
            tourism.len(),
            seasonal.len()
        );

        Ok(Session::from_tables(art, tourism, seasonal))
    }

    pub fn from_tables(
        art: Vec<ArtRecord>,
        tourism: Vec<TourismStat>,
        seasonal: Vec<SeasonalTrend>,
    ) -> Session {
        Session {
            art,
            tourism,
            seasonal,
            loaded_at: Utc::now(),
        }
    }

    pub fn art(&self) -> &[ArtRecord] {
        &self.art
    }

    pub fn tourism(&self) -> &[TourismStat] {
        &self.tourism
    }

    pub fn seasonal(&self) -> &[SeasonalTrend] {
        &self.seasonal
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
