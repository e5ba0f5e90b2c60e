// Seasonal trend aggregation
// Per-state monthly sums and best-month ranking

use serde::{Serialize, Serializer};
use std::ops::Index;

use crate::state::{Month, SeasonalTrend, StateKey};

/// Placeholder returned by `best_months` when a state has no rows
pub const DATA_NOT_AVAILABLE: &str = "Data not available";

pub const DEFAULT_TOP_MONTHS: usize = 3;

/// Visitor sums for all 12 months in calendar order. Months with no rows
/// hold 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthlyVisitors {
    counts: [u64; 12],
}

impl MonthlyVisitors {
    pub fn get(&self, month: Month) -> u64 {
        self.counts[month.index()]
    }

    /// Look up by month name, e.g. "January"
    pub fn get_by_name(&self, name: &str) -> Option<u64> {
        Month::parse(name).map(|m| self.get(m))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Month, u64)> + '_ {
        Month::ALL.iter().map(move |m| (*m, self.get(*m)))
    }

    /// Saturates at `u64::MAX`, matching `total_visitors`
    pub fn total(&self) -> u64 {
        self.counts.iter().fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    fn add(&mut self, month: Month, visitors: u64) {
        let slot = &mut self.counts[month.index()];
        *slot = slot.saturating_add(visitors);
    }
}

impl Index<Month> for MonthlyVisitors {
    type Output = u64;

    fn index(&self, month: Month) -> &u64 {
        &self.counts[month.index()]
    }
}

/// Serializes as an ordered map of month name to visitors
impl Serialize for MonthlyVisitors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(m, v)| (m.name(), v)))
    }
}

fn rows_for_state<'a>(
    seasonal_rows: &'a [SeasonalTrend],
    state: &str,
) -> impl Iterator<Item = &'a SeasonalTrend> {
    let key = StateKey::new(state);
    seasonal_rows.iter().filter(move |r| r.state_key() == key)
}

/// Months with the most visitors for a state, highest first. Ties keep
/// input order. No matching rows gives an empty vector.
pub fn top_months(state: &str, seasonal_rows: &[SeasonalTrend], top_n: usize) -> Vec<Month> {
    let mut rows: Vec<&SeasonalTrend> = rows_for_state(seasonal_rows, state).collect();
    // sort_by is stable
    rows.sort_by(|a, b| b.visitors.cmp(&a.visitors));
    rows.into_iter().take(top_n).map(|r| r.month).collect()
}

/// Month names for display. A state without rows yields a single
/// `DATA_NOT_AVAILABLE` entry; fewer than `top_n` rows are not padded.
pub fn best_months(state: &str, seasonal_rows: &[SeasonalTrend], top_n: usize) -> Vec<String> {
    if rows_for_state(seasonal_rows, state).next().is_none() {
        return vec![DATA_NOT_AVAILABLE.to_string()];
    }
    top_months(state, seasonal_rows, top_n)
        .into_iter()
        .map(|m| m.name().to_string())
        .collect()
}

/// Sum visitors per calendar month for a state
pub fn aggregate_seasonal(state: &str, seasonal_rows: &[SeasonalTrend]) -> MonthlyVisitors {
    let mut monthly = MonthlyVisitors::default();
    for row in rows_for_state(seasonal_rows, state) {
        monthly.add(row.month, row.visitors);
    }
    monthly
}

/// Sum of visitors over every row for a state
pub fn total_visitors(state: &str, seasonal_rows: &[SeasonalTrend]) -> u64 {
    rows_for_state(seasonal_rows, state).fold(0u64, |acc, r| acc.saturating_add(r.visitors))
}
