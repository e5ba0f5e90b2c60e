// Dataset loaders
// Fixed projection queries, one per dataset, decoded into typed rows
use super::models::{ArtRecord, Month, SeasonalTrend, TourismStat};
use super::source::{Cell, DataSourceError, SourceResult, Table, TabularSource};

pub const ART_FORMS_QUERY: &str =
    "SELECT State, ArtForm, Category, Description, image_url FROM ART_FORMS";
pub const TOURISM_STATS_QUERY: &str =
    "SELECT State, DomesticVisitors, ForeignVisitors FROM TOURISM_STATS";
pub const SEASONAL_TREND_QUERY: &str = "SELECT State, Month, Visitors FROM SEASONAL_TREND";

// ==================== LOADERS ====================

/// Load every art record from `schema`
pub fn load_art_records(source: &dyn TabularSource, schema: &str) -> SourceResult<Vec<ArtRecord>> {
    let table = fetch(source, schema, ART_FORMS_QUERY)?;
    let state = table.column_index("state")?;
    let artform = table.column_index("artform")?;
    let category = table.column_index("category")?;
    let description = table.column_index("description")?;
    let image_url = table.column_index("image_url")?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Ok(ArtRecord {
                state: required_text(row, state, "state", i)?,
                artform: required_text(row, artform, "artform", i)?,
                category: required_text(row, category, "category", i)?,
                description: optional_text(cell_at(row, description, "description", i)?),
                image_url: optional_text(cell_at(row, image_url, "image_url", i)?),
            })
        })
        .collect()
}

/// Load the per-state visitor totals from `schema`
pub fn load_tourism_stats(source: &dyn TabularSource, schema: &str) -> SourceResult<Vec<TourismStat>> {
    let table = fetch(source, schema, TOURISM_STATS_QUERY)?;
    let state = table.column_index("state")?;
    let domestic = table.column_index("domesticvisitors")?;
    let foreign = table.column_index("foreignvisitors")?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            Ok(TourismStat {
                state: required_text(row, state, "state", i)?,
                domestic_visitors: required_count(row, domestic, "domesticvisitors", i)?,
                foreign_visitors: required_count(row, foreign, "foreignvisitors", i)?,
            })
        })
        .collect()
}

/// Load the monthly observations from `schema`. Rows whose month is not a
/// calendar month name are dropped.
pub fn load_seasonal_trends(
    source: &dyn TabularSource,
    schema: &str,
) -> SourceResult<Vec<SeasonalTrend>> {
    let table = fetch(source, schema, SEASONAL_TREND_QUERY)?;
    let state = table.column_index("state")?;
    let month = table.column_index("month")?;
    let visitors = table.column_index("visitors")?;

    let mut trends = Vec::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        let raw_month = required_text(row, month, "month", i)?;
        let Some(parsed) = Month::parse(&raw_month) else {
            log::warn!("skipping seasonal row {}: unknown month '{}'", i, raw_month);
            continue;
        };

        trends.push(SeasonalTrend {
            state: required_text(row, state, "state", i)?,
            month: parsed,
            visitors: required_count(row, visitors, "visitors", i)?,
        });
    }

    Ok(trends)
}

// ==================== DECODING ====================

fn fetch(source: &dyn TabularSource, schema: &str, sql: &str) -> SourceResult<Table> {
    let table = source.query(schema, sql)?.normalize_columns();
    log::debug!(
        "{} returned {} rows from {} ({})",
        source.name(),
        table.len(),
        schema,
        sql
    );
    Ok(table)
}

fn decode_error(column: &str, row: usize, reason: impl Into<String>) -> DataSourceError {
    DataSourceError::Decode {
        column: column.to_string(),
        row,
        reason: reason.into(),
    }
}

fn cell_at<'a>(row: &'a [Cell], idx: usize, column: &str, row_idx: usize) -> SourceResult<&'a Cell> {
    row.get(idx)
        .ok_or_else(|| decode_error(column, row_idx, "row is shorter than the header"))
}

fn required_text(row: &[Cell], idx: usize, column: &str, row_idx: usize) -> SourceResult<String> {
    match cell_at(row, idx, column, row_idx)? {
        Cell::Null => Err(decode_error(column, row_idx, "unexpected NULL")),
        Cell::Text(s) => Ok(s.clone()),
        Cell::Integer(i) => Ok(i.to_string()),
        Cell::Real(f) => Ok(f.to_string()),
    }
}

fn optional_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Null => None,
        Cell::Text(s) => Some(s.clone()),
        Cell::Integer(i) => Some(i.to_string()),
        Cell::Real(f) => Some(f.to_string()),
    }
}

/// Visitor counts are non-negative integers. Integral reals and numeric text
/// are accepted since drivers disagree on how they ship NUMBER columns.
fn required_count(row: &[Cell], idx: usize, column: &str, row_idx: usize) -> SourceResult<u64> {
    let value = match cell_at(row, idx, column, row_idx)? {
        Cell::Null => return Err(decode_error(column, row_idx, "unexpected NULL")),
        Cell::Integer(i) => {
            return u64::try_from(*i)
                .map_err(|_| decode_error(column, row_idx, format!("negative count {}", i)));
        }
        Cell::Real(f) => *f,
        Cell::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| decode_error(column, row_idx, format!("'{}' is not a number", s)))?,
    };

    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > u64::MAX as f64 {
        return Err(decode_error(
            column,
            row_idx,
            format!("{} is not a non-negative integer", value),
        ));
    }
    Ok(value as u64)
}
