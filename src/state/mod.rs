// Data access module
// Reads the three datasets from the configured tabular store

pub mod db;
pub mod models;
pub mod queries;
pub mod snowflake;
pub mod source;

pub use db::SqliteSource;
pub use models::{ArtRecord, Month, SeasonalTrend, StateKey, TourismStat};
pub use queries::{load_art_records, load_seasonal_trends, load_tourism_stats};
pub use snowflake::SnowflakeSource;
pub use source::{with_retry, Cell, DataSourceError, SourceResult, Table, TabularSource};

use crate::config::{Config, SourceConfig};

/// Build the backend named in the config
pub fn open_source(config: &Config) -> SourceResult<Box<dyn TabularSource>> {
    match &config.source {
        SourceConfig::Sqlite(sqlite) => {
            log::info!("using sqlite source ({} schemas)", sqlite.schemas.len());
            Ok(Box::new(SqliteSource::new(
                sqlite.schemas.clone(),
                config.timeout(),
            )))
        }
        SourceConfig::Snowflake(snowflake) => {
            log::info!(
                "using snowflake source (account {}, database {})",
                snowflake.account,
                snowflake.database
            );
            Ok(Box::new(SnowflakeSource::new(snowflake, config.timeout())?))
        }
    }
}
