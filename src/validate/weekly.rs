//! Weekly quota validation.
//!
//! Scans every active, non-FMLA therapist across every ISO week
//! overlapping a cycle and classifies under- and over-quota weeks.
//! Bypassable per-publish via an explicit manager override flag; the slot
//! validator never is.

use serde::{Deserialize, Serialize};

use crate::models::{Cycle, WeekWindow};
use crate::rotation::WorkTally;
use crate::store::Roster;

/// Direction of a quota violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaIssueKind {
    /// Worked dates below quota.
    UnderQuota,
    /// Worked dates above quota.
    OverQuota,
}

/// One (therapist, week) quota violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaIssue {
    /// Affected therapist.
    pub therapist_id: String,
    /// ISO week.
    pub week: WeekWindow,
    /// Direction.
    pub kind: QuotaIssueKind,
    /// Worked-date count (coverage-counting statuses only).
    pub worked: u32,
    /// Effective quota.
    pub quota: u32,
}

/// Aggregate result of a weekly quota pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaReport {
    /// All issues in therapist/week order.
    pub issues: Vec<QuotaIssue>,
    /// Under-quota count.
    pub under: u32,
    /// Over-quota count.
    pub over: u32,
}

impl QuotaReport {
    /// Total violation count.
    #[inline]
    pub fn violations(&self) -> u32 {
        self.under + self.over
    }

    /// Whether no violations exist.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validates weekly quotas for every schedulable therapist in the cycle.
///
/// A therapist inactive or FMLA-blocked at the start of a week is skipped
/// for that week.
pub fn validate_weekly(store: &Roster, cycle: &Cycle) -> QuotaReport {
    let tally = WorkTally::from_shifts(store.shifts_in_cycle(&cycle.id));

    let mut report = QuotaReport::default();
    for therapist in store.therapists() {
        for week in cycle.weeks() {
            if !therapist.is_schedulable(week.start) {
                continue;
            }
            let worked = tally.worked_in_week(&therapist.id, week.start);
            let quota = therapist.quota();
            let kind = if worked < quota {
                QuotaIssueKind::UnderQuota
            } else if worked > quota {
                QuotaIssueKind::OverQuota
            } else {
                continue;
            };
            match kind {
                QuotaIssueKind::UnderQuota => report.under += 1,
                QuotaIssueKind::OverQuota => report.over += 1,
            }
            report.issues.push(QuotaIssue {
                therapist_id: therapist.id.clone(),
                week,
                kind,
                worked,
                quota,
            });
        }
    }
    report
}
