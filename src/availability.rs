//! Availability resolution.
//!
//! Pure function deciding, per therapist/date/shift-type, whether an
//! assignment is legal. Overrides outrank computed availability; inactive
//! and FMLA states are terminal and outrank even `force_on`.
//!
//! # Precedence (highest first)
//!
//! 1. `force_off` override — blocked (forced)
//! 2. inactive or on-FMLA — blocked, terminal (never override-able)
//! 3. `force_on` override — allowed (forced), bypassing remaining checks
//! 4. PRN with no `force_on` for the date — not offered (hard)
//! 5. hard weekday mismatch (off-day, or outside the hard works-set)
//! 6. every-other weekend rotation parity
//! 7. soft-day and shift-preference mismatches — advisory, never block

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    AvailabilityOverride, EmploymentType, OverrideKind, ShiftType, Therapist,
};

/// Why an availability decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityReason {
    /// Allowed with no rule engaged.
    Available,
    /// Allowed because a `force_on` override applies.
    ForcedOn,
    /// Blocked by a `force_off` override.
    ForcedOff,
    /// Blocked: therapist is inactive.
    Inactive,
    /// Blocked: therapist is on FMLA leave.
    OnFmla,
    /// Blocked: PRN therapist with no `force_on` for this date.
    PrnNotOffered,
    /// Blocked: date's weekday is in the off set.
    OffDay,
    /// Blocked: date's weekday is outside the hard works-set.
    NotWorkDay,
    /// Blocked: off weekend under an every-other rotation.
    WeekendRotation,
    /// Blocked: therapist does not cover this slot type.
    ShiftTypeMismatch,
}

impl AvailabilityReason {
    /// Whether this reason is terminal: never recoverable by a manager
    /// override confirmation.
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            AvailabilityReason::Inactive
                | AvailabilityReason::OnFmla
                | AvailabilityReason::PrnNotOffered
                | AvailabilityReason::ShiftTypeMismatch
        )
    }

    /// Human-readable summary.
    pub fn summary(&self) -> &'static str {
        match self {
            AvailabilityReason::Available => "available",
            AvailabilityReason::ForcedOn => "forced on by override",
            AvailabilityReason::ForcedOff => "forced off by override",
            AvailabilityReason::Inactive => "therapist is inactive",
            AvailabilityReason::OnFmla => "therapist is on FMLA leave",
            AvailabilityReason::PrnNotOffered => {
                "PRN therapist is not offered without an override"
            }
            AvailabilityReason::OffDay => "scheduled off day",
            AvailabilityReason::NotWorkDay => "outside contracted work days",
            AvailabilityReason::WeekendRotation => "off weekend in rotation",
            AvailabilityReason::ShiftTypeMismatch => "does not cover this shift type",
        }
    }
}

/// Non-blocking signals surfaced for calendar decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Date's weekday misses the soft (preferred) work-day set.
    SoftDayMismatch,
    /// Slot type differs from the therapist's preferred shift.
    ShiftPreferenceMismatch,
}

/// Outcome of resolving one therapist/date/shift-type combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityDecision {
    /// Whether the assignment is legal.
    pub allowed: bool,
    /// The rule that decided.
    pub reason: AvailabilityReason,
    /// Whether an override forced the result.
    pub forced: bool,
    /// Non-blocking mismatches, populated only on allowed decisions.
    pub advisories: Vec<Advisory>,
}

impl AvailabilityDecision {
    fn allowed(reason: AvailabilityReason, forced: bool) -> Self {
        Self {
            allowed: true,
            reason,
            forced,
            advisories: Vec::new(),
        }
    }

    fn blocked(reason: AvailabilityReason, forced: bool) -> Self {
        Self {
            allowed: false,
            reason,
            forced,
            advisories: Vec::new(),
        }
    }

    /// Whether the block is terminal (non-negotiable).
    #[inline]
    pub fn is_hard_block(&self) -> bool {
        !self.allowed && self.reason.is_hard()
    }

    /// Whether the block can be cleared by explicit manager confirmation.
    #[inline]
    pub fn is_soft_block(&self) -> bool {
        !self.allowed && !self.reason.is_hard()
    }
}

/// Resolves availability for one therapist/date/shift-type.
///
/// Pure: reads the profile, work pattern, and the override records for the
/// cycle; performs no mutation. Overrides not matching the therapist,
/// cycle, date, or slot scope are ignored.
pub fn resolve(
    therapist: &Therapist,
    cycle_id: &str,
    date: NaiveDate,
    shift_type: ShiftType,
    overrides: &[AvailabilityOverride],
) -> AvailabilityDecision {
    let applicable = |kind: OverrideKind| {
        overrides.iter().any(|o| {
            o.kind == kind && o.applies_to(&therapist.id, cycle_id, date, shift_type)
        })
    };

    if applicable(OverrideKind::ForceOff) {
        return AvailabilityDecision::blocked(AvailabilityReason::ForcedOff, true);
    }

    if !therapist.active {
        return AvailabilityDecision::blocked(AvailabilityReason::Inactive, false);
    }
    if therapist.fmla_blocks(date) {
        return AvailabilityDecision::blocked(AvailabilityReason::OnFmla, false);
    }

    if applicable(OverrideKind::ForceOn) {
        return AvailabilityDecision::allowed(AvailabilityReason::ForcedOn, true);
    }

    if therapist.employment == EmploymentType::Prn {
        return AvailabilityDecision::blocked(AvailabilityReason::PrnNotOffered, false);
    }

    if !therapist.affinity.covers(shift_type) {
        return AvailabilityDecision::blocked(AvailabilityReason::ShiftTypeMismatch, false);
    }

    let mut advisories = Vec::new();
    if let Some(pattern) = &therapist.work_pattern {
        if pattern.is_off_day(date) {
            return AvailabilityDecision::blocked(AvailabilityReason::OffDay, false);
        }
        if pattern.violates_hard_days(date) {
            return AvailabilityDecision::blocked(AvailabilityReason::NotWorkDay, false);
        }
        if pattern.rotation_blocks(date) {
            return AvailabilityDecision::blocked(AvailabilityReason::WeekendRotation, false);
        }
        if pattern.misses_soft_days(date) {
            advisories.push(Advisory::SoftDayMismatch);
        }
        if pattern
            .preferred_shift
            .is_some_and(|preferred| preferred != shift_type)
        {
            advisories.push(Advisory::ShiftPreferenceMismatch);
        }
    }

    let mut decision = AvailabilityDecision::allowed(AvailabilityReason::Available, false);
    decision.advisories = advisories;
    decision
}
