//! Shift (assignment) row model.
//!
//! A shift row assigns one therapist to one (date, shift-type) slot within
//! a cycle. At most one row may exist per (cycle, therapist, date) — the
//! uniqueness invariant behind all duplicate-safe upserts.
//!
//! A *slot* is not stored: it is the derived set of rows sharing one date
//! and shift-type, keyed by [`SlotKey`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ShiftType;

/// Role of a shift row within its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftRole {
    /// The single designated senior assignment of the slot.
    Lead,
    /// Regular covering assignment.
    Staff,
}

/// Lifecycle status; determines whether a row counts toward coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// Working as scheduled.
    Scheduled,
    /// On call; still counts toward coverage.
    OnCall,
    /// Called in sick; excluded from coverage.
    Sick,
    /// Shift called off; excluded from coverage.
    CalledOff,
}

/// Administrative assignment status recorded by status-change operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Default state.
    Scheduled,
    /// Therapist called in (sick).
    CallIn,
    /// Assignment cancelled by the manager.
    Cancelled,
    /// Converted to on-call.
    OnCall,
    /// Worked but left early.
    LeftEarly,
}

impl AssignmentStatus {
    /// Lifecycle status implied by this administrative status.
    ///
    /// `LeftEarly` still covered the slot and maps back to `Scheduled`.
    pub fn lifecycle(&self) -> ShiftStatus {
        match self {
            AssignmentStatus::Scheduled | AssignmentStatus::LeftEarly => ShiftStatus::Scheduled,
            AssignmentStatus::CallIn => ShiftStatus::Sick,
            AssignmentStatus::Cancelled => ShiftStatus::CalledOff,
            AssignmentStatus::OnCall => ShiftStatus::OnCall,
        }
    }
}

/// Audit note attached to a status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusNote {
    /// Free-form note.
    pub note: Option<String>,
    /// When the change was recorded (date of the acting request).
    pub at: NaiveDate,
    /// Who made the change.
    pub actor: Option<String>,
}

/// Derived slot identity: one date and one shift type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    /// Slot date.
    pub date: NaiveDate,
    /// Slot shift type.
    pub shift_type: ShiftType,
}

impl SlotKey {
    /// Creates a slot key.
    pub fn new(date: NaiveDate, shift_type: ShiftType) -> Self {
        Self { date, shift_type }
    }
}

/// One therapist-to-slot assignment row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    /// Row identifier (store-assigned).
    pub id: u64,
    /// Owning cycle.
    pub cycle_id: String,
    /// Assigned therapist.
    pub therapist_id: String,
    /// Slot date.
    pub date: NaiveDate,
    /// Slot shift type.
    pub shift_type: ShiftType,
    /// Role within the slot.
    pub role: ShiftRole,
    /// Lifecycle status (drives coverage counting).
    pub status: ShiftStatus,
    /// Administrative status.
    pub assignment_status: AssignmentStatus,
    /// Audit note from the latest status change.
    pub status_note: Option<StatusNote>,
}

impl Shift {
    /// Whether this row counts toward slot coverage.
    ///
    /// Only `scheduled` and `on_call` rows cover; `sick` and `called_off`
    /// are excluded.
    #[inline]
    pub fn counts_toward_coverage(&self) -> bool {
        matches!(self.status, ShiftStatus::Scheduled | ShiftStatus::OnCall)
    }

    /// Slot key of this row.
    #[inline]
    pub fn slot(&self) -> SlotKey {
        SlotKey::new(self.date, self.shift_type)
    }

    /// Whether this row is the slot lead.
    #[inline]
    pub fn is_lead(&self) -> bool {
        self.role == ShiftRole::Lead
    }
}

/// Insert payload for a new shift row (ID assigned by the store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShift {
    /// Owning cycle.
    pub cycle_id: String,
    /// Assigned therapist.
    pub therapist_id: String,
    /// Slot date.
    pub date: NaiveDate,
    /// Slot shift type.
    pub shift_type: ShiftType,
    /// Role within the slot.
    pub role: ShiftRole,
}

impl NewShift {
    /// Creates a staff-role insert payload.
    pub fn staff(
        cycle_id: impl Into<String>,
        therapist_id: impl Into<String>,
        date: NaiveDate,
        shift_type: ShiftType,
    ) -> Self {
        Self {
            cycle_id: cycle_id.into(),
            therapist_id: therapist_id.into(),
            date,
            shift_type,
            role: ShiftRole::Staff,
        }
    }

    /// Creates a lead-role insert payload.
    pub fn lead(
        cycle_id: impl Into<String>,
        therapist_id: impl Into<String>,
        date: NaiveDate,
        shift_type: ShiftType,
    ) -> Self {
        Self {
            role: ShiftRole::Lead,
            ..Self::staff(cycle_id, therapist_id, date, shift_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(status: ShiftStatus) -> Shift {
        Shift {
            id: 1,
            cycle_id: "c1".into(),
            therapist_id: "t1".into(),
            date: d(2025, 3, 3),
            shift_type: ShiftType::Day,
            role: ShiftRole::Staff,
            status,
            assignment_status: AssignmentStatus::Scheduled,
            status_note: None,
        }
    }

    #[test]
    fn test_coverage_counting_statuses() {
        assert!(row(ShiftStatus::Scheduled).counts_toward_coverage());
        assert!(row(ShiftStatus::OnCall).counts_toward_coverage());
        assert!(!row(ShiftStatus::Sick).counts_toward_coverage());
        assert!(!row(ShiftStatus::CalledOff).counts_toward_coverage());
    }

    #[test]
    fn test_assignment_status_lifecycle_mapping() {
        assert_eq!(
            AssignmentStatus::CallIn.lifecycle(),
            ShiftStatus::Sick
        );
        assert_eq!(
            AssignmentStatus::Cancelled.lifecycle(),
            ShiftStatus::CalledOff
        );
        assert_eq!(AssignmentStatus::OnCall.lifecycle(), ShiftStatus::OnCall);
        assert_eq!(
            AssignmentStatus::LeftEarly.lifecycle(),
            ShiftStatus::Scheduled
        );
    }

    #[test]
    fn test_slot_key() {
        let s = row(ShiftStatus::Scheduled);
        assert_eq!(s.slot(), SlotKey::new(d(2025, 3, 3), ShiftType::Day));
    }

    #[test]
    fn test_new_shift_roles() {
        let staff = NewShift::staff("c1", "t1", d(2025, 3, 3), ShiftType::Day);
        assert_eq!(staff.role, ShiftRole::Staff);
        let lead = NewShift::lead("c1", "t1", d(2025, 3, 3), ShiftType::Night);
        assert_eq!(lead.role, ShiftRole::Lead);
        assert_eq!(lead.shift_type, ShiftType::Night);
    }
}
