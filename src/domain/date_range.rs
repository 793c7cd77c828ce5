// Date range domain model - the single input every panel depends on
use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use thiserror::Error;

/// Earliest date the selector accepts.
pub const MIN_SELECTABLE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2022, 1, 1) {
    Some(date) => date,
    None => panic!("invalid minimum date"),
};

/// How many months back the default range starts.
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Unparsable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a selectable range: dates before the floor are clamped to it,
    /// inverted ranges are rejected.
    pub fn select(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        let start = start.max(MIN_SELECTABLE_DATE);
        let end = end.max(MIN_SELECTABLE_DATE);

        if start > end {
            return Err(RangeError::Inverted { start, end });
        }

        Ok(Self { start, end })
    }

    /// Parses two ISO dates and applies the same rules as [`DateRange::select`].
    pub fn parse(start: &str, end: &str) -> Result<Self, RangeError> {
        Self::select(parse_date(start)?, parse_date(end)?)
    }

    /// First day of the month five months before `today`, through `today`.
    pub fn default_for(today: NaiveDate) -> Self {
        let month_start = today.with_day(1).unwrap_or(today);
        let start = month_start
            .checked_sub_months(Months::new(DEFAULT_LOOKBACK_MONTHS))
            .unwrap_or(month_start);

        Self { start, end: today }
    }

    pub fn default_today() -> Self {
        Self::default_for(chrono::Local::now().date_naive())
    }

    /// Day after `end`, for half-open time filters.
    pub fn end_exclusive(&self) -> NaiveDate {
        self.end.succ_opt().unwrap_or(self.end)
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| RangeError::Unparsable(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_range_mid_year() {
        let range = DateRange::default_for(date(2024, 8, 17));
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 8, 17));
    }

    #[test]
    fn test_default_range_crosses_year_boundary() {
        let range = DateRange::default_for(date(2025, 2, 10));
        assert_eq!(range.start, date(2024, 9, 1));
        assert_eq!(range.end, date(2025, 2, 10));
    }

    #[test]
    fn test_select_clamps_to_minimum_date() {
        let range = DateRange::select(date(2021, 6, 1), date(2022, 6, 30)).unwrap();
        assert_eq!(range.start, MIN_SELECTABLE_DATE);
        assert_eq!(range.end, date(2022, 6, 30));
    }

    #[test]
    fn test_select_rejects_inverted_range() {
        let err = DateRange::select(date(2023, 5, 1), date(2023, 4, 1)).unwrap_err();
        assert_eq!(
            err,
            RangeError::Inverted {
                start: date(2023, 5, 1),
                end: date(2023, 4, 1)
            }
        );
    }

    #[test]
    fn test_parse() {
        let range = DateRange::parse("2022-01-01", "2022-06-30").unwrap();
        assert_eq!(range.start_str(), "2022-01-01");
        assert_eq!(range.end_str(), "2022-06-30");
        assert_eq!(range.end_exclusive(), date(2022, 7, 1));

        assert_eq!(
            DateRange::parse("01/02/2022", "2022-06-30").unwrap_err(),
            RangeError::Unparsable("01/02/2022".to_string())
        );
    }
}
