//! Calendar date keys and day windows.
//!
//! Ledger entries are keyed by zero-padded ISO dates (`YYYY-MM-DD`), so
//! lexicographic order equals chronological order. Day arithmetic is pure:
//! there is no mutable "today" — callers take a [`DateKey`] and apply an
//! explicit offset.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A validated `YYYY-MM-DD` ledger key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

/// Error returned when a string is not a valid date key.
#[derive(Debug, Clone, Error)]
#[error("invalid date {input:?}: expected YYYY-MM-DD")]
pub struct DateKeyError {
    input: String,
}

impl DateKey {
    /// Today's date in the local timezone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// The date `days` away from this one. `None` if out of range.
    pub fn offset(self, days: i64) -> Option<Self> {
        self.0.checked_add_signed(TimeDelta::days(days)).map(Self)
    }

    /// The `[local midnight, next local midnight)` window for this date.
    ///
    /// On DST transition days the window is 23 or 25 hours long; an ambiguous
    /// midnight resolves to the earlier instant, and a midnight skipped by a
    /// spring-forward gap falls forward to the first valid wall-clock time.
    pub fn window(self) -> DayWindow {
        let start = local_midnight(self.0);
        let end = self
            .0
            .succ_opt()
            .map_or_else(|| start + TimeDelta::hours(24), local_midnight);
        DayWindow { start, end }
    }

    /// Every calendar date in `[start, end]`, in chronological order.
    ///
    /// Empty when `start > end`.
    pub fn range_inclusive(start: Self, end: Self) -> impl Iterator<Item = Self> {
        let mut cursor = (start <= end).then_some(start.0);
        std::iter::from_fn(move || {
            let current = cursor?;
            cursor = current.succ_opt().filter(|next| *next <= end.0);
            Some(Self(current))
        })
    }
}

fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) => {
            instant.with_timezone(&Utc)
        }
        LocalResult::None => {
            // Midnight fell in a spring-forward gap. Probe forward in
            // 15-minute steps until the wall clock exists again.
            let mut probe = naive;
            for _ in 0..96 {
                probe += TimeDelta::minutes(15);
                if let LocalResult::Single(instant) | LocalResult::Ambiguous(instant, _) =
                    Local.from_local_datetime(&probe)
                {
                    return instant.with_timezone(&Utc);
                }
            }
            Utc.from_utc_datetime(&naive)
        }
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DateKeyError {
            input: s.to_string(),
        };
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())?;
        // chrono accepts unpadded fields; require the canonical form so that
        // keys sort chronologically.
        if date.format("%Y-%m-%d").to_string() != s {
            return Err(invalid());
        }
        Ok(Self(date))
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The UTC instants bounding one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// Local midnight of the target date.
    pub start: DateTime<Utc>,
    /// Local midnight of the following date.
    pub end: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_date_key() {
        let key: DateKey = "2024-01-31".parse().unwrap();
        assert_eq!(key.to_string(), "2024-01-31");
    }

    #[test]
    fn rejects_unpadded_date_key() {
        assert!("2024-1-31".parse::<DateKey>().is_err());
        assert!("2024-01-1".parse::<DateKey>().is_err());
    }

    #[test]
    fn rejects_invalid_dates() {
        assert!("2024-13-01".parse::<DateKey>().is_err());
        assert!("2024-02-30".parse::<DateKey>().is_err());
        assert!("not-a-date".parse::<DateKey>().is_err());
        assert!("".parse::<DateKey>().is_err());
    }

    #[test]
    fn ordering_is_chronological() {
        let early: DateKey = "2023-12-31".parse().unwrap();
        let late: DateKey = "2024-01-01".parse().unwrap();
        assert!(early < late);
    }

    #[test]
    fn offset_moves_across_month_boundaries() {
        let key: DateKey = "2024-03-01".parse().unwrap();
        assert_eq!(key.offset(-1).unwrap().to_string(), "2024-02-29");
        assert_eq!(key.offset(1).unwrap().to_string(), "2024-03-02");
        assert_eq!(key.offset(0).unwrap(), key);
    }

    #[test]
    fn range_inclusive_covers_both_endpoints() {
        let start: DateKey = "2024-01-30".parse().unwrap();
        let end: DateKey = "2024-02-02".parse().unwrap();
        let dates: Vec<String> = DateKey::range_inclusive(start, end)
            .map(|d| d.to_string())
            .collect();
        assert_eq!(
            dates,
            ["2024-01-30", "2024-01-31", "2024-02-01", "2024-02-02"]
        );
    }

    #[test]
    fn range_inclusive_single_day() {
        let day: DateKey = "2024-01-01".parse().unwrap();
        assert_eq!(DateKey::range_inclusive(day, day).count(), 1);
    }

    #[test]
    fn range_inclusive_empty_when_reversed() {
        let start: DateKey = "2024-01-02".parse().unwrap();
        let end: DateKey = "2024-01-01".parse().unwrap();
        assert_eq!(DateKey::range_inclusive(start, end).count(), 0);
    }

    #[test]
    fn window_spans_roughly_one_day() {
        let key: DateKey = "2024-06-15".parse().unwrap();
        let window = key.window();
        assert!(window.start < window.end);
        let length = window.end - window.start;
        // 23 or 25 hours on DST transition days, 24 otherwise.
        assert!(length >= TimeDelta::hours(23));
        assert!(length <= TimeDelta::hours(25));
    }

    #[test]
    fn consecutive_windows_are_contiguous() {
        let key: DateKey = "2024-06-15".parse().unwrap();
        let next = key.offset(1).unwrap();
        assert_eq!(key.window().end, next.window().start);
    }

    #[test]
    fn serializes_as_json_string() {
        let key: DateKey = "2024-01-02".parse().unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), r#""2024-01-02""#);
        let back: DateKey = serde_json::from_str(r#""2024-01-02""#).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn deserialize_rejects_malformed_key() {
        assert!(serde_json::from_str::<DateKey>(r#""2024/01/02""#).is_err());
    }
}
