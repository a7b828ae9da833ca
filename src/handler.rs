//! Drag/drop action handler.
//!
//! Wire boundary for interactive roster edits: assign, move, remove, and
//! set-lead actions arrive as tagged payloads, are checked against every
//! rule before any write, and come back as a uniform response carrying a
//! stable error code, structured conflict detail, and an undo payload.
//!
//! Soft availability blocks are a two-step confirmation: the first attempt
//! is rejected with `availability_conflict` plus the conflict detail; a
//! resubmission with `availability_override: true` proceeds. Hard blocks
//! (`not_eligible`) and coverage maximums are never overridable here.
//! Weekly quota blocks honor `override_weekly_rules`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::availability::{self, AvailabilityReason};
use crate::config::CoverageConfig;
use crate::error::{ErrorCode, RosterError};
use crate::lead;
use crate::models::{
    AvailabilityOverride, NewShift, Shift, ShiftRole, ShiftType, Therapist, WeekWindow,
};
use crate::rotation::WorkTally;
use crate::store::Roster;

/// One interactive roster edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RosterAction {
    /// Assign a therapist to a slot as staff.
    Assign {
        cycle_id: String,
        therapist_id: String,
        date: NaiveDate,
        shift_type: ShiftType,
        /// Skip the weekly quota check.
        #[serde(default)]
        override_weekly_rules: bool,
        /// Confirm past a soft availability block.
        #[serde(default)]
        availability_override: bool,
        /// Audit reason for the availability override.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        availability_override_reason: Option<String>,
    },
    /// Move an existing row to another slot.
    Move {
        cycle_id: String,
        shift_id: u64,
        target_date: NaiveDate,
        target_shift_type: ShiftType,
        #[serde(default)]
        override_weekly_rules: bool,
        #[serde(default)]
        availability_override: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        availability_override_reason: Option<String>,
    },
    /// Delete a row.
    Remove { cycle_id: String, shift_id: u64 },
    /// Make a therapist the designated lead of a slot.
    SetLead {
        cycle_id: String,
        therapist_id: String,
        date: NaiveDate,
        shift_type: ShiftType,
        #[serde(default)]
        override_weekly_rules: bool,
        #[serde(default)]
        availability_override: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        availability_override_reason: Option<String>,
    },
}

/// Conflict detail for a soft availability rejection, shaped for the
/// confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityConflict {
    pub therapist_id: String,
    pub therapist_name: String,
    pub date: NaiveDate,
    pub shift_type: ShiftType,
    pub reason: AvailabilityReason,
    pub summary: String,
}

/// Quota detail for a weekly-limit rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDetail {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub worked: u32,
    pub quota: u32,
}

/// Uniform handler response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Whether the edit was applied.
    pub ok: bool,
    /// Human-readable summary.
    pub message: String,
    /// Stable rejection code, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Soft availability conflict detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<AvailabilityConflict>,
    /// Weekly quota detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaDetail>,
    /// Action that reverses this edit, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undo: Option<RosterAction>,
}

impl ActionResponse {
    fn applied(message: String, undo: Option<RosterAction>) -> Self {
        Self {
            ok: true,
            message,
            code: None,
            availability: None,
            quota: None,
            undo,
        }
    }

    fn rejected(err: RosterError) -> Self {
        let quota = match &err {
            RosterError::WeeklyLimitExceeded {
                week,
                worked,
                quota,
                ..
            } => Some(QuotaDetail {
                week_start: week.start,
                week_end: week.end,
                worked: *worked,
                quota: *quota,
            }),
            _ => None,
        };
        Self {
            ok: false,
            message: err.to_string(),
            code: Some(err.code()),
            availability: None,
            quota,
            undo: None,
        }
    }
}

/// Applies one action against the roster.
///
/// Rule failures come back as rejected responses, never as panics; only
/// the happy path mutates the store.
pub fn handle(store: &mut Roster, config: &CoverageConfig, action: RosterAction) -> ActionResponse {
    let response = match action {
        RosterAction::Assign {
            cycle_id,
            therapist_id,
            date,
            shift_type,
            override_weekly_rules,
            availability_override,
            ..
        } => assign(
            store,
            config,
            &cycle_id,
            &therapist_id,
            date,
            shift_type,
            override_weekly_rules,
            availability_override,
        ),
        RosterAction::Move {
            cycle_id,
            shift_id,
            target_date,
            target_shift_type,
            override_weekly_rules,
            availability_override,
            ..
        } => move_shift(
            store,
            config,
            &cycle_id,
            shift_id,
            target_date,
            target_shift_type,
            override_weekly_rules,
            availability_override,
        ),
        RosterAction::Remove { cycle_id, shift_id } => remove(store, &cycle_id, shift_id),
        RosterAction::SetLead {
            cycle_id,
            therapist_id,
            date,
            shift_type,
            override_weekly_rules,
            availability_override,
            ..
        } => set_lead(
            store,
            config,
            &cycle_id,
            &therapist_id,
            date,
            shift_type,
            override_weekly_rules,
            availability_override,
        ),
    };

    if !response.ok {
        warn!(code = ?response.code, message = %response.message, "action rejected");
    }
    response
}

/// Availability gate shared by assign, move, and set-lead inserts.
///
/// Hard blocks reject unconditionally; soft blocks reject with conflict
/// detail unless the caller already confirmed.
fn availability_gate(
    therapist: &Therapist,
    cycle_id: &str,
    date: NaiveDate,
    shift_type: ShiftType,
    overrides: &[AvailabilityOverride],
    confirmed: bool,
) -> Option<ActionResponse> {
    let decision = availability::resolve(therapist, cycle_id, date, shift_type, overrides);
    if decision.is_hard_block() {
        return Some(ActionResponse {
            ok: false,
            message: format!(
                "{} cannot work {date} {}: {}",
                therapist.name,
                shift_type.label(),
                decision.reason.summary()
            ),
            code: Some(ErrorCode::NotEligible),
            availability: None,
            quota: None,
            undo: None,
        });
    }
    if decision.is_soft_block() && !confirmed {
        return Some(ActionResponse {
            ok: false,
            message: format!(
                "{} is unavailable on {date} {}: {}",
                therapist.name,
                shift_type.label(),
                decision.reason.summary()
            ),
            code: Some(ErrorCode::AvailabilityConflict),
            availability: Some(AvailabilityConflict {
                therapist_id: therapist.id.clone(),
                therapist_name: therapist.name.clone(),
                date,
                shift_type,
                reason: decision.reason,
                summary: decision.reason.summary().to_string(),
            }),
            quota: None,
            undo: None,
        });
    }
    None
}

/// Weekly quota gate. `exclude` names a row being moved, whose current
/// worked date must not count against its own target week.
fn quota_gate(
    store: &Roster,
    therapist: &Therapist,
    cycle_id: &str,
    date: NaiveDate,
    exclude: Option<&Shift>,
) -> Option<RosterError> {
    let tally = WorkTally::from_shifts(store.shifts_in_cycle(cycle_id));
    let week = WeekWindow::containing(date);
    let mut worked = tally.worked_in_week(&therapist.id, week.start);
    if let Some(moved) = exclude {
        if moved.counts_toward_coverage() && week.contains(moved.date) {
            worked = worked.saturating_sub(1);
        }
    }
    (worked >= therapist.quota()).then(|| RosterError::WeeklyLimitExceeded {
        therapist_id: therapist.id.clone(),
        week,
        worked,
        quota: therapist.quota(),
    })
}

fn coverage_gate(
    store: &Roster,
    config: &CoverageConfig,
    cycle_id: &str,
    date: NaiveDate,
    shift_type: ShiftType,
) -> Option<RosterError> {
    let coverage = store.coverage_count(cycle_id, date, shift_type);
    (coverage >= config.max_per_slot).then_some(RosterError::CoverageMaxExceeded {
        date,
        shift_type,
        max: config.max_per_slot,
    })
}

#[allow(clippy::too_many_arguments)]
fn assign(
    store: &mut Roster,
    config: &CoverageConfig,
    cycle_id: &str,
    therapist_id: &str,
    date: NaiveDate,
    shift_type: ShiftType,
    override_weekly: bool,
    availability_confirmed: bool,
) -> ActionResponse {
    let cycle = match store.cycle(cycle_id) {
        Ok(c) => c,
        Err(e) => return ActionResponse::rejected(e),
    };
    if cycle.published {
        return ActionResponse::rejected(RosterError::CyclePublished(cycle_id.to_string()));
    }
    let therapist = match store.therapist(therapist_id) {
        Ok(t) => t.clone(),
        Err(e) => return ActionResponse::rejected(e),
    };

    if let Some(blocked) = availability_gate(
        &therapist,
        cycle_id,
        date,
        shift_type,
        store.overrides(),
        availability_confirmed,
    ) {
        return blocked;
    }
    if store.row_for(cycle_id, therapist_id, date).is_some() {
        return ActionResponse::rejected(RosterError::DuplicateShift {
            therapist_id: therapist_id.to_string(),
            date,
        });
    }
    if let Some(e) = coverage_gate(store, config, cycle_id, date, shift_type) {
        return ActionResponse::rejected(e);
    }
    if !override_weekly {
        if let Some(e) = quota_gate(store, &therapist, cycle_id, date, None) {
            return ActionResponse::rejected(e);
        }
    }

    match store.insert(NewShift::staff(cycle_id, therapist_id, date, shift_type)) {
        Ok(shift_id) => {
            info!(cycle_id, therapist_id, %date, shift = shift_type.label(), "assigned");
            ActionResponse::applied(
                format!("assigned {} to {date} {}", therapist.name, shift_type.label()),
                Some(RosterAction::Remove {
                    cycle_id: cycle_id.to_string(),
                    shift_id,
                }),
            )
        }
        Err(e) => ActionResponse::rejected(e),
    }
}

#[allow(clippy::too_many_arguments)]
fn move_shift(
    store: &mut Roster,
    config: &CoverageConfig,
    cycle_id: &str,
    shift_id: u64,
    target_date: NaiveDate,
    target_shift_type: ShiftType,
    override_weekly: bool,
    availability_confirmed: bool,
) -> ActionResponse {
    let shift = match store.shift(shift_id) {
        Ok(s) if s.cycle_id == cycle_id => s.clone(),
        Ok(_) => return ActionResponse::rejected(RosterError::ShiftNotFound(shift_id)),
        Err(e) => return ActionResponse::rejected(e),
    };
    let therapist = match store.therapist(&shift.therapist_id) {
        Ok(t) => t.clone(),
        Err(e) => return ActionResponse::rejected(e),
    };

    if let Some(blocked) = availability_gate(
        &therapist,
        cycle_id,
        target_date,
        target_shift_type,
        store.overrides(),
        availability_confirmed,
    ) {
        return blocked;
    }
    if store
        .row_for(cycle_id, &shift.therapist_id, target_date)
        .is_some_and(|existing| existing.id != shift_id)
    {
        return ActionResponse::rejected(RosterError::DuplicateShift {
            therapist_id: shift.therapist_id.clone(),
            date: target_date,
        });
    }

    let same_slot = shift.date == target_date && shift.shift_type == target_shift_type;
    if !same_slot {
        if let Some(e) = coverage_gate(store, config, cycle_id, target_date, target_shift_type) {
            return ActionResponse::rejected(e);
        }
    }
    if !override_weekly {
        if let Some(e) = quota_gate(store, &therapist, cycle_id, target_date, Some(&shift)) {
            return ActionResponse::rejected(e);
        }
    }

    // A moving lead keeps the role only when the target slot has none.
    let target_has_lead = store
        .lead_rows(cycle_id, target_date, target_shift_type)
        .iter()
        .any(|r| r.id != shift_id);

    if let Err(e) = store.reslot(shift_id, target_date, target_shift_type) {
        return ActionResponse::rejected(e);
    }
    if shift.is_lead() && target_has_lead && !same_slot {
        if let Err(e) = store.set_role(shift_id, ShiftRole::Staff) {
            return ActionResponse::rejected(e);
        }
    }

    info!(
        cycle_id,
        shift_id,
        %target_date,
        shift = target_shift_type.label(),
        "moved"
    );
    ActionResponse::applied(
        format!(
            "moved {} to {target_date} {}",
            therapist.name,
            target_shift_type.label()
        ),
        Some(RosterAction::Move {
            cycle_id: cycle_id.to_string(),
            shift_id,
            target_date: shift.date,
            target_shift_type: shift.shift_type,
            override_weekly_rules: true,
            availability_override: true,
            availability_override_reason: None,
        }),
    )
}

fn remove(store: &mut Roster, cycle_id: &str, shift_id: u64) -> ActionResponse {
    match store.shift(shift_id) {
        Ok(s) if s.cycle_id == cycle_id => {}
        Ok(_) => return ActionResponse::rejected(RosterError::ShiftNotFound(shift_id)),
        Err(e) => return ActionResponse::rejected(e),
    }
    let removed = match store.remove(shift_id) {
        Ok(s) => s,
        Err(e) => return ActionResponse::rejected(e),
    };

    info!(cycle_id, shift_id, "removed");
    ActionResponse::applied(
        format!("removed {} from {} {}", removed.therapist_id, removed.date, removed.shift_type.label()),
        Some(RosterAction::Assign {
            cycle_id: cycle_id.to_string(),
            therapist_id: removed.therapist_id.clone(),
            date: removed.date,
            shift_type: removed.shift_type,
            override_weekly_rules: true,
            availability_override: true,
            availability_override_reason: None,
        }),
    )
}

#[allow(clippy::too_many_arguments)]
fn set_lead(
    store: &mut Roster,
    config: &CoverageConfig,
    cycle_id: &str,
    therapist_id: &str,
    date: NaiveDate,
    shift_type: ShiftType,
    override_weekly: bool,
    availability_confirmed: bool,
) -> ActionResponse {
    let therapist = match store.therapist(therapist_id) {
        Ok(t) => t.clone(),
        Err(e) => return ActionResponse::rejected(e),
    };

    // Promoting an existing row needs no further gates; inserting one is
    // an assignment and runs the full assign checks first.
    let has_own_row = store
        .row_for(cycle_id, therapist_id, date)
        .is_some_and(|r| r.shift_type == shift_type);
    if !has_own_row {
        if let Some(blocked) = availability_gate(
            &therapist,
            cycle_id,
            date,
            shift_type,
            store.overrides(),
            availability_confirmed,
        ) {
            return blocked;
        }
        if let Some(e) = coverage_gate(store, config, cycle_id, date, shift_type) {
            return ActionResponse::rejected(e);
        }
        if !override_weekly {
            if let Some(e) = quota_gate(store, &therapist, cycle_id, date, None) {
                return ActionResponse::rejected(e);
            }
        }
    }

    match lead::set_designated_lead(store, cycle_id, therapist_id, date, shift_type) {
        Ok(change) => {
            let undo = change.inserted.then_some(RosterAction::Remove {
                cycle_id: cycle_id.to_string(),
                shift_id: change.lead_shift_id,
            });
            ActionResponse::applied(
                format!(
                    "{} is now lead for {date} {}",
                    therapist.name,
                    shift_type.label()
                ),
                undo,
            )
        }
        Err(e) => ActionResponse::rejected(e),
    }
}
