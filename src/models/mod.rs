//! Rostering domain models.
//!
//! Core data types for therapist coverage scheduling: therapist profiles
//! and work patterns, cycles, shift rows, and availability overrides.
//!
//! # Entity Relationships
//!
//! | Entity | Owned by | Keyed by |
//! |--------|----------|----------|
//! | Therapist | — | id |
//! | Cycle | — | id |
//! | Shift | Cycle | (cycle, therapist, date) unique |
//! | AvailabilityOverride | Cycle | (therapist, cycle, date, shift scope) |
//!
//! A *slot* — one date and shift type — is derived from shift rows, never
//! stored.

mod cycle;
mod overrides;
mod shift;
mod therapist;

pub use cycle::Cycle;
pub use overrides::{AvailabilityOverride, OverrideKind, OverrideShift};
pub use shift::{
    AssignmentStatus, NewShift, Shift, ShiftRole, ShiftStatus, SlotKey, StatusNote,
};
pub use therapist::{
    EmploymentType, ShiftAffinity, ShiftType, Therapist, WeekendRotation, WorkPattern,
};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Monday of the ISO week containing `date`.
#[inline]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// An ISO week window `[start, end]` (Monday through Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    /// Monday of the week.
    pub start: NaiveDate,
    /// Sunday of the week.
    pub end: NaiveDate,
}

impl WeekWindow {
    /// Creates a window from its Monday.
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// The window containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self::starting(week_start(date))
    }

    /// Whether `date` falls inside this window.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
