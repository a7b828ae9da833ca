//! Scheduling cycle model.
//!
//! A cycle is a manager-defined multi-week date range that owns a set of
//! assignments and a published/draft state. Once published, no slot
//! mutation is permitted except through the re-open path.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{week_start, WeekWindow};

/// A multi-week scheduling cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    /// Unique cycle identifier.
    pub id: String,
    /// Display label (e.g. "March A").
    pub label: String,
    /// First date of the cycle (inclusive).
    pub start: NaiveDate,
    /// Last date of the cycle (inclusive).
    pub end: NaiveDate,
    /// Whether the cycle has been published.
    pub published: bool,
}

impl Cycle {
    /// Creates an unpublished cycle over `[start, end]`.
    pub fn new(id: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            start,
            end,
            published: false,
        }
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Whether `date` falls inside the cycle.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of dates in the cycle.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterates every date in the cycle in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.day_count()).map(move |d| start + Duration::days(d))
    }

    /// ISO weeks (Monday-anchored) overlapping the cycle, in order.
    pub fn weeks(&self) -> Vec<WeekWindow> {
        let mut weeks = Vec::new();
        let mut cursor = week_start(self.start);
        while cursor <= self.end {
            weeks.push(WeekWindow::starting(cursor));
            cursor += Duration::days(7);
        }
        weeks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_contains_and_day_count() {
        let c = Cycle::new("c1", d(2025, 3, 3), d(2025, 3, 16));
        assert!(c.contains(d(2025, 3, 3)));
        assert!(c.contains(d(2025, 3, 16)));
        assert!(!c.contains(d(2025, 3, 17)));
        assert_eq!(c.day_count(), 14);
    }

    #[test]
    fn test_dates_iteration() {
        let c = Cycle::new("c1", d(2025, 3, 3), d(2025, 3, 5));
        let dates: Vec<_> = c.dates().collect();
        assert_eq!(dates, vec![d(2025, 3, 3), d(2025, 3, 4), d(2025, 3, 5)]);
    }

    #[test]
    fn test_weeks_aligned() {
        // Mon 2025-03-03 .. Sun 2025-03-16: exactly two ISO weeks.
        let c = Cycle::new("c1", d(2025, 3, 3), d(2025, 3, 16));
        let weeks = c.weeks();
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].start, d(2025, 3, 3));
        assert_eq!(weeks[0].end, d(2025, 3, 9));
        assert_eq!(weeks[1].start, d(2025, 3, 10));
    }

    #[test]
    fn test_weeks_partial_overlap() {
        // Wed .. Tue spans two ISO weeks, both partially.
        let c = Cycle::new("c1", d(2025, 3, 5), d(2025, 3, 11));
        let weeks = c.weeks();
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].start, d(2025, 3, 3));
        assert_eq!(weeks[1].start, d(2025, 3, 10));
    }
}
