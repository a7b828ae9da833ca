//! Round-robin candidate selection.
//!
//! Picks the next eligible therapist from an ordered pool, starting at an
//! explicit cursor and wrapping once. The cursor is passed in and returned
//! — never hidden in shared state — so a generation pass can thread it
//! through sequential slots while staying trivially testable.
//!
//! Fairness is approximate round-robin: no candidate is revisited twice
//! within one full pass, and the cursor resumes after the last pick.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::availability;
use crate::models::{week_start, AvailabilityOverride, Shift, ShiftType, Therapist};

/// Per-therapist worked-date bookkeeping, grouped by ISO week.
///
/// Counts only rows whose status counts toward coverage, and counts each
/// date once per therapist (the uniqueness key guarantees one row per
/// date anyway).
#[derive(Debug, Clone, Default)]
pub struct WorkTally {
    worked: HashMap<String, HashMap<NaiveDate, HashSet<NaiveDate>>>,
}

impl WorkTally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tally from existing shift rows.
    pub fn from_shifts<'a>(shifts: impl IntoIterator<Item = &'a Shift>) -> Self {
        let mut tally = Self::new();
        for shift in shifts {
            if shift.counts_toward_coverage() {
                tally.record(&shift.therapist_id, shift.date);
            }
        }
        tally
    }

    /// Records a worked date for a therapist.
    pub fn record(&mut self, therapist_id: &str, date: NaiveDate) {
        self.worked
            .entry(therapist_id.to_string())
            .or_default()
            .entry(week_start(date))
            .or_default()
            .insert(date);
    }

    /// Worked-date count for a therapist in the week containing `date`.
    pub fn worked_in_week(&self, therapist_id: &str, date: NaiveDate) -> u32 {
        self.worked
            .get(therapist_id)
            .and_then(|weeks| weeks.get(&week_start(date)))
            .map_or(0, |dates| dates.len() as u32)
    }

    /// Whether the therapist already worked `date`.
    pub fn worked_on(&self, therapist_id: &str, date: NaiveDate) -> bool {
        self.worked
            .get(therapist_id)
            .and_then(|weeks| weeks.get(&week_start(date)))
            .is_some_and(|dates| dates.contains(&date))
    }
}

/// Inputs shared by every pick within one slot.
#[derive(Debug)]
pub struct PickContext<'a> {
    /// Owning cycle.
    pub cycle_id: &'a str,
    /// Slot date.
    pub date: NaiveDate,
    /// Slot shift type.
    pub shift_type: ShiftType,
    /// Override records for the cycle.
    pub overrides: &'a [AvailabilityOverride],
    /// Therapist ids already assigned on this date.
    pub assigned_today: &'a HashSet<String>,
    /// Worked-date counts per therapist/week.
    pub tally: &'a WorkTally,
    /// Whether the weekly quota check applies. `false` only when the
    /// caller explicitly overrides weekly rules.
    pub enforce_quota: bool,
}

/// A successful pick: the pool index chosen and where to resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    /// Index of the chosen therapist in the pool.
    pub index: usize,
    /// Cursor for the next pick (index immediately after the chosen one).
    pub next_cursor: usize,
}

/// Scans the pool from `cursor`, wrapping once, for the first candidate
/// that is not yet assigned today, availability-allowed, and under quota.
///
/// Returns `None` when the full pool is exhausted. The quota check is
/// strict (`worked < quota`) and skipped only when
/// `ctx.enforce_quota == false`.
pub fn pick_candidate(pool: &[&Therapist], cursor: usize, ctx: &PickContext<'_>) -> Option<Pick> {
    if pool.is_empty() {
        return None;
    }

    let start = cursor % pool.len();
    for offset in 0..pool.len() {
        let index = (start + offset) % pool.len();
        let therapist = pool[index];

        if ctx.assigned_today.contains(&therapist.id) {
            continue;
        }

        let decision = availability::resolve(
            therapist,
            ctx.cycle_id,
            ctx.date,
            ctx.shift_type,
            ctx.overrides,
        );
        if !decision.allowed {
            continue;
        }

        if ctx.enforce_quota
            && ctx.tally.worked_in_week(&therapist.id, ctx.date) >= therapist.quota()
        {
            continue;
        }

        return Some(Pick {
            index,
            next_cursor: (index + 1) % pool.len(),
        });
    }

    None
}
