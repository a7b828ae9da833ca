//! Availability override records.
//!
//! A manager-entered exception that outranks computed availability for one
//! therapist/date/shift-type. `force_off` blocks an otherwise-available
//! therapist; `force_on` offers an otherwise-unavailable one (including
//! PRN therapists, who are never offered without it).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ShiftType;

/// Which slot types an override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideShift {
    /// Day slots only.
    Day,
    /// Night slots only.
    Night,
    /// Both slot types.
    Both,
}

impl OverrideShift {
    /// Whether this scope covers the given slot type.
    #[inline]
    pub fn covers(&self, shift_type: ShiftType) -> bool {
        matches!(
            (self, shift_type),
            (OverrideShift::Both, _)
                | (OverrideShift::Day, ShiftType::Day)
                | (OverrideShift::Night, ShiftType::Night)
        )
    }
}

/// Direction of an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    /// Block the therapist regardless of computed availability.
    ForceOff,
    /// Offer the therapist regardless of pattern rules.
    ForceOn,
}

/// A manager-entered availability exception.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityOverride {
    /// Therapist the exception applies to.
    pub therapist_id: String,
    /// Owning cycle.
    pub cycle_id: String,
    /// Date the exception applies to.
    pub date: NaiveDate,
    /// Slot-type scope.
    pub shift: OverrideShift,
    /// Exception direction.
    pub kind: OverrideKind,
    /// Optional audit note.
    pub note: Option<String>,
}

impl AvailabilityOverride {
    /// Creates a `force_off` exception for both slot types.
    pub fn force_off(
        therapist_id: impl Into<String>,
        cycle_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            therapist_id: therapist_id.into(),
            cycle_id: cycle_id.into(),
            date,
            shift: OverrideShift::Both,
            kind: OverrideKind::ForceOff,
            note: None,
        }
    }

    /// Creates a `force_on` exception for both slot types.
    pub fn force_on(
        therapist_id: impl Into<String>,
        cycle_id: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind: OverrideKind::ForceOn,
            ..Self::force_off(therapist_id, cycle_id, date)
        }
    }

    /// Restricts the exception to one slot type.
    pub fn with_shift(mut self, shift: OverrideShift) -> Self {
        self.shift = shift;
        self
    }

    /// Attaches an audit note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Whether this exception applies to the given therapist/date/slot.
    pub fn applies_to(
        &self,
        therapist_id: &str,
        cycle_id: &str,
        date: NaiveDate,
        shift_type: ShiftType,
    ) -> bool {
        self.therapist_id == therapist_id
            && self.cycle_id == cycle_id
            && self.date == date
            && self.shift.covers(shift_type)
    }
}
