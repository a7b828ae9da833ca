//! Error types and stable wire codes.
//!
//! Internal operations fail with [`RosterError`]; the handler boundary
//! converts every failure into a machine-readable [`ErrorCode`] plus a
//! human-readable summary. Validators never produce errors for rule
//! violations — they return structured reports.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ShiftType, WeekWindow};

/// Stable machine-readable rejection codes consumed by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Soft availability block; resubmit with an explicit override.
    AvailabilityConflict,
    /// Hard availability block; never override-able.
    NotEligible,
    /// A row already exists for this (cycle, therapist, date).
    DuplicateShift,
    /// Slot is already at maximum coverage.
    CoverageMaxExceeded,
    /// Weekly work-day quota reached.
    WeeklyLimitExceeded,
    /// `set_lead` target lacks the lead-eligibility flag.
    SetLeadNotEligible,
    /// Slot already has a different designated lead.
    SetLeadMultiple,
    /// Draft generation refused: cycle already published.
    AutoCyclePublished,
    /// Draft generation refused: zero eligible therapists.
    AutoNoTherapists,
    /// Draft generation dropped rows to duplicate conflicts.
    AutoGenerateCoverageIncomplete,
    /// Publish rejected by the weekly quota validator.
    PublishWeeklyRuleViolation,
    /// Publish rejected by the coverage/lead slot validator.
    PublishShiftRuleViolation,
    /// Unknown cycle.
    CycleNotFound,
    /// Unknown shift row.
    ShiftNotFound,
    /// Unknown therapist.
    TherapistNotFound,
    /// Mutation refused: owning cycle is published.
    CyclePublished,
    /// Reopen refused: cycle is not published.
    CycleNotPublished,
}

/// Rostering operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Cycle lookup failed.
    #[error("cycle not found: {0}")]
    CycleNotFound(String),

    /// Shift row lookup failed.
    #[error("shift not found: {0}")]
    ShiftNotFound(u64),

    /// Therapist lookup failed.
    #[error("therapist not found: {0}")]
    TherapistNotFound(String),

    /// Mutation attempted against a published cycle.
    #[error("cycle {0} is published; reopen it before editing")]
    CyclePublished(String),

    /// Reopen attempted against a draft cycle.
    #[error("cycle {0} is not published")]
    CycleNotPublished(String),

    /// Uniqueness violation on (cycle, therapist, date).
    #[error("therapist {therapist_id} already has a shift on {date}")]
    DuplicateShift {
        /// Conflicting therapist.
        therapist_id: String,
        /// Conflicting date.
        date: NaiveDate,
    },

    /// Slot already at the configured coverage maximum.
    #[error("{date} {} slot is already at maximum coverage ({max})", .shift_type.label())]
    CoverageMaxExceeded {
        /// Slot date.
        date: NaiveDate,
        /// Slot shift type.
        shift_type: ShiftType,
        /// Configured maximum.
        max: u32,
    },

    /// Weekly work-day quota reached for the target week.
    #[error("therapist {therapist_id} has reached the weekly limit ({worked}/{quota}) for the week of {}", .week.start)]
    WeeklyLimitExceeded {
        /// Affected therapist.
        therapist_id: String,
        /// ISO week the limit applies to.
        week: WeekWindow,
        /// Worked dates already counted in that week.
        worked: u32,
        /// Effective quota.
        quota: u32,
    },

    /// `set_lead` target lacks the lead-eligibility flag.
    #[error("therapist {0} is not lead-eligible")]
    LeadNotEligible(String),

    /// A different lead already holds the slot.
    #[error("slot already has a designated lead ({current_lead})")]
    MultipleLeadsPrevented {
        /// Therapist currently holding the lead.
        current_lead: String,
    },
}

impl RosterError {
    /// Stable wire code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RosterError::CycleNotFound(_) => ErrorCode::CycleNotFound,
            RosterError::ShiftNotFound(_) => ErrorCode::ShiftNotFound,
            RosterError::TherapistNotFound(_) => ErrorCode::TherapistNotFound,
            RosterError::CyclePublished(_) => ErrorCode::CyclePublished,
            RosterError::CycleNotPublished(_) => ErrorCode::CycleNotPublished,
            RosterError::DuplicateShift { .. } => ErrorCode::DuplicateShift,
            RosterError::CoverageMaxExceeded { .. } => ErrorCode::CoverageMaxExceeded,
            RosterError::WeeklyLimitExceeded { .. } => ErrorCode::WeeklyLimitExceeded,
            RosterError::LeadNotEligible(_) => ErrorCode::SetLeadNotEligible,
            RosterError::MultipleLeadsPrevented { .. } => ErrorCode::SetLeadMultiple,
        }
    }
}

/// Result type for rostering operations.
pub type Result<T> = std::result::Result<T, RosterError>;
