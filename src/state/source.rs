// Tabular source abstraction
// Every backend answers a fixed projection query with a Table of Cells

use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::config::RetryPolicy;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),
    #[error("Database file for schema {schema} not found: {path}")]
    MissingDatabase { schema: String, path: String },
    #[error("Data source unreachable: {0}")]
    Unreachable(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Query failed ({code}): {message}")]
    Query { code: String, message: String },
    #[error("Incomplete result: expected {expected} rows, received {received}")]
    IncompleteResult { expected: u64, received: u64 },
    #[error("Missing column '{column}' in result")]
    MissingColumn { column: String },
    #[error("Bad value in column '{column}' at row {row}: {reason}")]
    Decode {
        column: String,
        row: usize,
        reason: String,
    },
}

impl DataSourceError {
    /// Whether another attempt could succeed. Shape and config problems
    /// will fail the same way every time.
    pub fn is_transient(&self) -> bool {
        match self {
            DataSourceError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            DataSourceError::Http(err) => err.is_timeout() || err.is_connect(),
            DataSourceError::Unreachable(_) => true,
            _ => false,
        }
    }
}

pub type SourceResult<T> = Result<T, DataSourceError>;

/// A single value as returned by a backend driver
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

/// Query result: column identifiers plus rows in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Table { columns, rows }
    }

    /// Lower-case and trim every column identifier
    pub fn normalize_columns(mut self) -> Self {
        for column in &mut self.columns {
            *column = column.trim().to_lowercase();
        }
        self
    }

    /// Position of a column by its normalized name
    pub fn column_index(&self, name: &str) -> SourceResult<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DataSourceError::MissingColumn {
                column: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read-only query interface to a tabular store
pub trait TabularSource {
    /// Run `sql` scoped to `schema` and return the full result
    fn query(&self, schema: &str, sql: &str) -> SourceResult<Table>;

    /// Short backend name for logs
    fn name(&self) -> &str;
}

/// Run `op`, retrying transient failures with doubling backoff
pub fn with_retry<T, F>(policy: &RetryPolicy, label: &str, mut op: F) -> SourceResult<T>
where
    F: FnMut() -> SourceResult<T>,
{
    let mut backoff = Duration::from_millis(policy.initial_backoff_ms);
    let mut attempt = 0;

    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                log::warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    label,
                    attempt,
                    policy.max_retries + 1,
                    e,
                    backoff
                );
                thread::sleep(backoff);
                backoff = backoff.saturating_mul(2);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as Counter;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff_ms: 0,
        }
    }

    #[test]
    fn test_normalize_columns() {
        let table = Table::new(
            vec![" State ".to_string(), "ArtForm".to_string(), "image_url".to_string()],
            vec![],
        )
        .normalize_columns();

        assert_eq!(table.columns, vec!["state", "artform", "image_url"]);
        assert_eq!(table.column_index("artform").unwrap(), 1);
    }

    #[test]
    fn test_missing_column() {
        let table = Table::new(vec!["state".to_string()], vec![]);
        let err = table.column_index("month").unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn { ref column } if column == "month"));
    }

    #[test]
    fn test_retry_recovers_from_transient_failure() {
        let calls = Counter::new(0);
        let result = with_retry(&fast_policy(2), "load", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(DataSourceError::Unreachable("down".to_string()))
            } else {
                Ok(42)
            }
        });

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retry_gives_up_after_limit() {
        let calls = Counter::new(0);
        let result: SourceResult<()> = with_retry(&fast_policy(1), "load", || {
            calls.set(calls.get() + 1);
            Err(DataSourceError::Unreachable("down".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_missing_database_is_not_transient() {
        let err = DataSourceError::MissingDatabase {
            schema: "ART".to_string(),
            path: "/nope/art.db".to_string(),
        };
        assert!(!err.is_transient());
        assert!(DataSourceError::Unreachable("down".to_string()).is_transient());

        let calls = Counter::new(0);
        let result: SourceResult<()> = with_retry(&fast_policy(3), "load", || {
            calls.set(calls.get() + 1);
            Err(DataSourceError::MissingDatabase {
                schema: "ART".to_string(),
                path: "/nope/art.db".to_string(),
            })
        });
        assert!(matches!(result, Err(DataSourceError::MissingDatabase { .. })));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_retry_skips_permanent_errors() {
        let calls = Counter::new(0);
        let result: SourceResult<()> = with_retry(&fast_policy(5), "load", || {
            calls.set(calls.get() + 1);
            Err(DataSourceError::UnknownSchema("NOPE".to_string()))
        });

        assert!(matches!(result, Err(DataSourceError::UnknownSchema(_))));
        assert_eq!(calls.get(), 1);
    }
}
