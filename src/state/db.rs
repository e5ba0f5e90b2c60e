// SQLite-backed tabular source
// Each schema is a separate database file, opened read-only per query
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::source::{Cell, DataSourceError, SourceResult, Table, TabularSource};

pub struct SqliteSource {
    schemas: HashMap<String, PathBuf>,
    busy_timeout: Duration,
}

impl SqliteSource {
    pub fn new(schemas: HashMap<String, PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            schemas,
            busy_timeout,
        }
    }

    /// Open the file behind `schema`. Read-only, so a missing file is an
    /// error instead of a freshly created empty database.
    fn open(&self, schema: &str) -> SourceResult<Connection> {
        let path = self
            .schemas
            .get(schema)
            .ok_or_else(|| DataSourceError::UnknownSchema(schema.to_string()))?;

        if !path.is_file() {
            return Err(DataSourceError::MissingDatabase {
                schema: schema.to_string(),
                path: path.display().to_string(),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(self.busy_timeout)?;

        Ok(conn)
    }
}

impl TabularSource for SqliteSource {
    fn query(&self, schema: &str, sql: &str) -> SourceResult<Table> {
        let conn = self.open(schema)?;
        let mut stmt = conn.prepare(sql)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                let mut cells = Vec::with_capacity(width);
                for i in 0..width {
                    cells.push(to_cell(row.get_ref(i)?));
                }
                Ok(cells)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("sqlite {}: {} rows", schema, rows.len());
        Ok(Table::new(columns, rows))
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

fn to_cell(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Integer(i) => Cell::Integer(i),
        ValueRef::Real(f) => Cell::Real(f),
        ValueRef::Text(t) | ValueRef::Blob(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed(dir: &TempDir, file: &str, statements: &[&str]) -> PathBuf {
        let path = dir.path().join(file);
        let conn = Connection::open(&path).unwrap();
        for sql in statements {
            conn.execute(sql, []).unwrap();
        }
        path
    }

    #[test]
    fn test_query_returns_columns_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = seed(
            &dir,
            "tourism.db",
            &[
                "CREATE TABLE TOURISM_STATS (State TEXT, DomesticVisitors INTEGER, ForeignVisitors INTEGER)",
                "INSERT INTO TOURISM_STATS VALUES ('Goa', 800000, 90000)",
                "INSERT INTO TOURISM_STATS VALUES ('Kerala', 1500000, NULL)",
            ],
        );

        let source = SqliteSource::new(
            HashMap::from([("TOURISM_DATA".to_string(), path)]),
            Duration::from_secs(1),
        );
        let table = source
            .query(
                "TOURISM_DATA",
                "SELECT State, DomesticVisitors, ForeignVisitors FROM TOURISM_STATS",
            )
            .unwrap();

        assert_eq!(table.columns, vec!["State", "DomesticVisitors", "ForeignVisitors"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("Goa".to_string()));
        assert_eq!(table.rows[0][1], Cell::Integer(800_000));
        assert_eq!(table.rows[1][2], Cell::Null);
    }

    #[test]
    fn test_unknown_schema() {
        let source = SqliteSource::new(HashMap::new(), Duration::from_secs(1));
        let err = source.query("ARTFORM_DATA", "SELECT 1").unwrap_err();
        assert!(matches!(err, DataSourceError::UnknownSchema(_)));
    }

    #[test]
    fn test_missing_file_is_not_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.db");
        let source = SqliteSource::new(
            HashMap::from([("SEASONAL_DATA".to_string(), path.clone())]),
            Duration::from_secs(1),
        );

        let err = source.query("SEASONAL_DATA", "SELECT 1").unwrap_err();
        assert!(matches!(err, DataSourceError::MissingDatabase { ref schema, .. } if schema == "SEASONAL_DATA"));
        assert!(!err.is_transient());
        assert!(!path.exists());
    }

    #[test]
    fn test_read_only() {
        let dir = TempDir::new().unwrap();
        let path = seed(&dir, "art.db", &["CREATE TABLE ART_FORMS (State TEXT)"]);
        let source = SqliteSource::new(
            HashMap::from([("ARTFORM_DATA".to_string(), path)]),
            Duration::from_secs(1),
        );

        let result = source.query("ARTFORM_DATA", "INSERT INTO ART_FORMS VALUES ('Goa') RETURNING State");
        assert!(result.is_err());
    }
}
