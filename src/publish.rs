//! Publish gate.
//!
//! Publication freezes a cycle: once the flag is set, every shift
//! mutation path refuses to touch its rows until the cycle is reopened.
//! Both validators run before the flag flips; the slot report blocks
//! unconditionally, the weekly report only without an explicit manager
//! override. Check-then-write: a failed gate leaves the cycle untouched.

use thiserror::Error;
use tracing::info;

use crate::config::CoverageConfig;
use crate::error::{ErrorCode, RosterError};
use crate::store::Roster;
use crate::validate::{validate_slots, validate_weekly, QuotaReport, SlotReport};

/// Why a publish attempt was refused.
#[derive(Error, Debug)]
pub enum PublishError {
    /// Slot rules failed. Never bypassable.
    #[error("cycle has {} slot rule violations", .report.issues.len())]
    SlotRules {
        /// The full failing report, for display.
        report: SlotReport,
    },

    /// Weekly quota rules failed and no override was given.
    #[error("cycle has {} weekly quota violations", .report.issues.len())]
    WeeklyRules {
        /// The full failing report, for display.
        report: QuotaReport,
    },

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] RosterError),
}

impl PublishError {
    /// Stable wire code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            PublishError::SlotRules { .. } => ErrorCode::PublishShiftRuleViolation,
            PublishError::WeeklyRules { .. } => ErrorCode::PublishWeeklyRuleViolation,
            PublishError::Store(e) => e.code(),
        }
    }
}

/// Validates and publishes a cycle.
///
/// `override_weekly` skips the weekly quota gate only; slot rules always
/// apply. Publishing an already-published cycle fails with
/// [`RosterError::CyclePublished`].
pub fn publish_cycle(
    store: &mut Roster,
    cycle_id: &str,
    config: &CoverageConfig,
    override_weekly: bool,
) -> Result<(), PublishError> {
    let cycle = store.cycle(cycle_id)?.clone();
    if cycle.published {
        return Err(RosterError::CyclePublished(cycle_id.to_string()).into());
    }

    let slot_report = validate_slots(store, &cycle, config);
    if !slot_report.is_clean() {
        return Err(PublishError::SlotRules {
            report: slot_report,
        });
    }

    let quota_report = validate_weekly(store, &cycle);
    if !quota_report.is_clean() && !override_weekly {
        return Err(PublishError::WeeklyRules {
            report: quota_report,
        });
    }

    store.set_published(cycle_id, true)?;
    info!(cycle_id, override_weekly, "cycle published");
    Ok(())
}

/// Reopens a published cycle for editing.
pub fn reopen_cycle(store: &mut Roster, cycle_id: &str) -> Result<(), RosterError> {
    if !store.cycle(cycle_id)?.published {
        return Err(RosterError::CycleNotPublished(cycle_id.to_string()));
    }
    store.set_published(cycle_id, false)?;
    info!(cycle_id, "cycle reopened");
    Ok(())
}
