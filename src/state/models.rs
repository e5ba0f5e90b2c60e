// Data models for the three dashboard datasets
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized region key used to join and filter across tables.
/// Source tables do not agree on casing or padding, so every
/// cross-table comparison goes through this type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    pub fn new(state: &str) -> Self {
        StateKey(state.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One curated art or cultural record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtRecord {
    pub state: String,
    pub artform: String,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl ArtRecord {
    pub fn state_key(&self) -> StateKey {
        StateKey::new(&self.state)
    }
}

/// Aggregate visitor counts for a state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourismStat {
    pub state: String,
    pub domestic_visitors: u64,
    pub foreign_visitors: u64,
}

impl TourismStat {
    pub fn state_key(&self) -> StateKey {
        StateKey::new(&self.state)
    }

    pub fn total_visitors(&self) -> u64 {
        self.domestic_visitors.saturating_add(self.foreign_visitors)
    }
}

/// One (state, month, visitors) observation. Rows for the same state and
/// month are additive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalTrend {
    pub state: String,
    pub month: Month,
    pub visitors: u64,
}

impl SeasonalTrend {
    pub fn state_key(&self) -> StateKey {
        StateKey::new(&self.state)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    /// Calendar order
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Zero-based position in the calendar
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse a month name, ignoring surrounding whitespace and case
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Month::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key_normalization() {
        assert_eq!(StateKey::new("Odisha"), StateKey::new(" odisha "));
        assert_eq!(StateKey::new("ODISHA"), StateKey::new("odisha"));
        assert_eq!(StateKey::new("  Tamil Nadu\t").as_str(), "tamil nadu");
    }

    #[test]
    fn test_state_key_idempotent() {
        let once = StateKey::new("  West Bengal ");
        let twice = StateKey::new(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_month_parse() {
        assert_eq!(Month::parse("January"), Some(Month::January));
        assert_eq!(Month::parse("  march "), Some(Month::March));
        assert_eq!(Month::parse("DECEMBER"), Some(Month::December));
        assert_eq!(Month::parse("Jan"), None);
        assert_eq!(Month::parse(""), None);
    }

    #[test]
    fn test_month_calendar_order() {
        for (i, month) in Month::ALL.iter().enumerate() {
            assert_eq!(month.index(), i);
        }
        assert_eq!(Month::ALL[0].name(), "January");
        assert_eq!(Month::ALL[11].name(), "December");
    }

    #[test]
    fn test_tourism_total_visitors() {
        let stat = TourismStat {
            state: "Goa".to_string(),
            domestic_visitors: 800_000,
            foreign_visitors: 90_000,
        };
        assert_eq!(stat.total_visitors(), 890_000);
    }
}
