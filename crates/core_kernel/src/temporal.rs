//! Calendar types for billing-period arithmetic
//!
//! Billing operates on whole civil days: settlement periods, holiday
//! intervals, and invoice months are all inclusive `NaiveDate` ranges.
//! The only timezone-sensitive operation is resolving "today" at scheduler
//! trigger time, handled by [`Timezone`].

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod { start: String, end: String },

    #[error("Date out of calendar range: {0}")]
    OutOfRange(String),
}

/// An inclusive range of civil days
///
/// Both endpoints belong to the range: a holiday from Jan 10 to Jan 12
/// covers three days. This matches how settlement periods are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new inclusive range, rejecting start > end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day
    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    /// The calendar month containing `date`, as an inclusive range
    pub fn month_of(date: NaiveDate) -> Self {
        Self {
            start: month_start(date),
            end: month_end(date),
        }
    }

    /// Number of days in the range, endpoints included
    pub fn day_count(&self) -> u32 {
        ((self.end - self.start).num_days() + 1) as u32
    }

    /// Returns true if the range contains the given date
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true if this range overlaps another
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The intersection of two ranges, if any
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start <= end {
            Some(DateRange { start, end })
        } else {
            None
        }
    }

    /// Returns true if `other` starts exactly one day after this range ends
    pub fn abuts(&self, other: &DateRange) -> bool {
        other.start == self.end + Duration::days(1)
    }
}

/// First day of the calendar month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 exists in every month")
}

/// Last day of the calendar month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is valid") - Duration::days(1)
}

/// Number of calendar days in the month containing `date`
pub fn days_in_month(date: NaiveDate) -> u32 {
    month_end(date).day()
}

/// Timezone wrapper for the marketplace's billing jurisdiction
///
/// Wraps chrono_tz::Tz with custom serialization support. The scheduler uses
/// this to decide which civil day "today" is when a cycle triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// The current civil date in this timezone
    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }

    /// The civil date of a UTC instant in this timezone
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Kolkata)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::OutOfRange(format!("invalid timezone: {}", s)))
    }
}

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_range_rejects_inverted_endpoints() {
        let result = DateRange::new(d(2024, 3, 10), d(2024, 3, 1));
        assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
    }

    #[test]
    fn test_inclusive_day_count() {
        let range = DateRange::new(d(2024, 1, 10), d(2024, 1, 12)).unwrap();
        assert_eq!(range.day_count(), 3);
        assert_eq!(DateRange::single(d(2024, 1, 10)).day_count(), 1);
    }

    #[test]
    fn test_intersect_clamps_to_overlap() {
        let month = DateRange::month_of(d(2024, 2, 1));
        let holiday = DateRange::new(d(2024, 1, 28), d(2024, 2, 3)).unwrap();

        let overlap = month.intersect(&holiday).unwrap();
        assert_eq!(overlap.start, d(2024, 2, 1));
        assert_eq!(overlap.end, d(2024, 2, 3));
        assert_eq!(overlap.day_count(), 3);
    }

    #[test]
    fn test_disjoint_ranges_do_not_intersect() {
        let a = DateRange::new(d(2024, 1, 1), d(2024, 1, 5)).unwrap();
        let b = DateRange::new(d(2024, 1, 6), d(2024, 1, 9)).unwrap();

        assert!(a.intersect(&b).is_none());
        assert!(!a.overlaps(&b));
        assert!(a.abuts(&b));
    }

    #[test]
    fn test_month_boundaries() {
        assert_eq!(month_start(d(2024, 2, 17)), d(2024, 2, 1));
        assert_eq!(month_end(d(2024, 2, 17)), d(2024, 2, 29));
        assert_eq!(month_end(d(2023, 2, 17)), d(2023, 2, 28));
        assert_eq!(month_end(d(2024, 12, 5)), d(2024, 12, 31));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(d(2024, 2, 29)), 29);
        assert_eq!(days_in_month(d(2023, 2, 1)), 28);
        assert_eq!(days_in_month(d(2024, 4, 30)), 30);
        assert_eq!(days_in_month(d(2024, 1, 15)), 31);
    }

    #[test]
    fn test_timezone_parsing() {
        let tz: Timezone = "Asia/Kolkata".parse().unwrap();
        assert_eq!(tz, Timezone::default());
        assert!("Not/AZone".parse::<Timezone>().is_err());
    }
}
