//! Draft generation.
//!
//! Fills a non-published cycle's slots with a constrained greedy pass:
//! for every date and shift type, secure a designated lead (promoting an
//! existing eligible row before drafting a new one), then add staff until
//! coverage reaches the fill target or the pool is exhausted.
//!
//! All new rows are submitted as one duplicate-ignoring batch keyed on
//! (cycle, therapist, date); the outcome reports requested vs. inserted
//! so partial insert conflicts surface instead of silently dropping data.
//!
//! Round-robin cursors live only for the duration of one pass — fairness
//! is guaranteed within a single run, not across runs.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::CoverageConfig;
use crate::error::{ErrorCode, RosterError};
use crate::lead;
use crate::models::{EmploymentType, NewShift, ShiftType, Therapist};
use crate::rotation::{pick_candidate, PickContext, WorkTally};
use crate::store::Roster;

/// Draft generation failures.
#[derive(Error, Debug)]
pub enum DraftError {
    /// The cycle is already published; nothing was mutated.
    #[error("cycle {0} is already published")]
    CyclePublished(String),

    /// No eligible therapists exist for the cycle; nothing was mutated.
    #[error("no eligible therapists for cycle {0}")]
    NoTherapists(String),

    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] RosterError),
}

impl DraftError {
    /// Stable wire code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            DraftError::CyclePublished(_) => ErrorCode::AutoCyclePublished,
            DraftError::NoTherapists(_) => ErrorCode::AutoNoTherapists,
            DraftError::Store(e) => e.code(),
        }
    }
}

/// Tallies from one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftOutcome {
    /// Rows submitted in the batch upsert.
    pub requested: usize,
    /// Rows actually inserted.
    pub inserted: usize,
    /// Rows dropped to duplicate conflicts (lost writes surfaced).
    pub dropped: usize,
    /// Slots that ended below minimum coverage.
    pub unfilled_slots: u32,
    /// Slots that ended without any lead.
    pub missing_lead_slots: u32,
    /// Existing rows promoted to lead.
    pub promoted_leads: u32,
}

impl DraftOutcome {
    /// Wire code when the draft is usable but incomplete, `None` when the
    /// batch landed fully.
    pub fn incomplete_code(&self) -> Option<ErrorCode> {
        (self.dropped > 0).then_some(ErrorCode::AutoGenerateCoverageIncomplete)
    }
}

/// Ordered candidate pools for one shift type.
struct Pools<'a> {
    staff: Vec<&'a Therapist>,
    leads: Vec<&'a Therapist>,
}

fn build_pools<'a>(
    therapists: &'a [Therapist],
    shift_type: ShiftType,
    config: &CoverageConfig,
) -> Pools<'a> {
    let staff: Vec<&Therapist> = therapists
        .iter()
        .filter(|t| t.active)
        .filter(|t| t.affinity.covers(shift_type))
        .filter(|t| config.prn_in_pool || t.employment != EmploymentType::Prn)
        .collect();
    let leads = staff.iter().copied().filter(|t| t.lead_eligible).collect();
    Pools { staff, leads }
}

/// Generates draft assignments for every slot of an unpublished cycle.
///
/// Check-then-write: fatal conditions (published cycle, empty pools) are
/// detected before any mutation. Lead promotions apply immediately; new
/// rows land in one batch at the end.
pub fn generate_draft(
    store: &mut Roster,
    cycle_id: &str,
    config: &CoverageConfig,
) -> Result<DraftOutcome, DraftError> {
    let cycle = store.cycle(cycle_id)?.clone();
    if cycle.published {
        return Err(DraftError::CyclePublished(cycle_id.to_string()));
    }

    let therapists = store.therapists().to_vec();
    let day_pools = build_pools(&therapists, ShiftType::Day, config);
    let night_pools = build_pools(&therapists, ShiftType::Night, config);
    if day_pools.staff.is_empty() && night_pools.staff.is_empty() {
        return Err(DraftError::NoTherapists(cycle_id.to_string()));
    }

    // Seed rotation state from existing rows: any row blocks its
    // (therapist, date) pair; only covering rows count toward quotas.
    let mut assigned: HashMap<NaiveDate, HashSet<String>> = HashMap::new();
    for shift in store.shifts_in_cycle(cycle_id) {
        assigned
            .entry(shift.date)
            .or_default()
            .insert(shift.therapist_id.clone());
    }
    let mut tally = WorkTally::from_shifts(store.shifts_in_cycle(cycle_id));

    let mut cursors: HashMap<(ShiftType, bool), usize> = HashMap::new();
    let mut batch: Vec<NewShift> = Vec::new();
    let mut outcome = DraftOutcome::default();

    for date in cycle.dates() {
        for shift_type in ShiftType::ALL {
            let pools = match shift_type {
                ShiftType::Day => &day_pools,
                ShiftType::Night => &night_pools,
            };
            let rows = store.slot_rows(cycle_id, date, shift_type);
            let mut coverage = rows.iter().filter(|r| r.counts_toward_coverage()).count() as u32;
            let mut has_lead = rows.iter().any(|r| r.is_lead());

            // Lead first: promote an existing eligible row, else draft one.
            let promotable = rows
                .iter()
                .filter(|r| r.counts_toward_coverage())
                .find(|r| {
                    therapists
                        .iter()
                        .any(|t| t.id == r.therapist_id && t.lead_eligible)
                })
                .map(|r| r.therapist_id.clone());

            if !has_lead {
                if let Some(therapist_id) = promotable {
                    lead::set_designated_lead(store, cycle_id, &therapist_id, date, shift_type)?;
                    outcome.promoted_leads += 1;
                    has_lead = true;
                } else {
                    let day_assigned = assigned.entry(date).or_default();
                    let ctx = PickContext {
                        cycle_id,
                        date,
                        shift_type,
                        overrides: store.overrides(),
                        assigned_today: day_assigned,
                        tally: &tally,
                        enforce_quota: true,
                    };
                    let cursor = cursors.entry((shift_type, true)).or_insert(0);
                    if let Some(pick) = pick_candidate(&pools.leads, *cursor, &ctx) {
                        *cursor = pick.next_cursor;
                        let therapist = pools.leads[pick.index];
                        batch.push(NewShift::lead(cycle_id, &therapist.id, date, shift_type));
                        assigned.entry(date).or_default().insert(therapist.id.clone());
                        tally.record(&therapist.id, date);
                        coverage += 1;
                        has_lead = true;
                    }
                }
            }

            // Staff fill up to the target.
            while coverage < config.fill_target() {
                let day_assigned = assigned.entry(date).or_default();
                let ctx = PickContext {
                    cycle_id,
                    date,
                    shift_type,
                    overrides: store.overrides(),
                    assigned_today: day_assigned,
                    tally: &tally,
                    enforce_quota: true,
                };
                let cursor = cursors.entry((shift_type, false)).or_insert(0);
                let Some(pick) = pick_candidate(&pools.staff, *cursor, &ctx) else {
                    break;
                };
                *cursor = pick.next_cursor;
                let therapist = pools.staff[pick.index];

                // A lead-eligible staff pick fills a still-missing lead.
                let new = if !has_lead && therapist.lead_eligible {
                    has_lead = true;
                    NewShift::lead(cycle_id, &therapist.id, date, shift_type)
                } else {
                    NewShift::staff(cycle_id, &therapist.id, date, shift_type)
                };
                batch.push(new);
                assigned.entry(date).or_default().insert(therapist.id.clone());
                tally.record(&therapist.id, date);
                coverage += 1;
            }

            if coverage < config.min_per_slot {
                outcome.unfilled_slots += 1;
            }
            if !has_lead {
                outcome.missing_lead_slots += 1;
            }
            debug!(
                %date,
                shift = shift_type.label(),
                coverage,
                has_lead,
                "slot drafted"
            );
        }
    }

    let batch_outcome = store.upsert_batch(batch)?;
    outcome.requested = batch_outcome.requested;
    outcome.inserted = batch_outcome.inserted;
    outcome.dropped = batch_outcome.dropped();

    info!(
        cycle_id,
        requested = outcome.requested,
        inserted = outcome.inserted,
        dropped = outcome.dropped,
        unfilled = outcome.unfilled_slots,
        missing_lead = outcome.missing_lead_slots,
        "draft generated"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cycle, ShiftAffinity, ShiftRole};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn two_day_cycle() -> Cycle {
        Cycle::new("c1", d(2025, 3, 3), d(2025, 3, 4))
    }

    fn add_staff(r: &mut Roster, n: usize, affinity: ShiftAffinity, lead: bool) {
        for i in 0..n {
            let prefix = match (affinity, lead) {
                (ShiftAffinity::Day, false) => "ds",
                (ShiftAffinity::Day, true) => "dl",
                (ShiftAffinity::Night, false) => "ns",
                (ShiftAffinity::Night, true) => "nl",
                (ShiftAffinity::Either, false) => "es",
                (ShiftAffinity::Either, true) => "el",
            };
            let mut t = Therapist::new(format!("{prefix}{i}")).with_affinity(affinity);
            if lead {
                t = t.lead_eligible();
            }
            r.add_therapist(t);
        }
    }

    #[test]
    fn test_fills_slots_with_leads() {
        let mut r = Roster::new();
        r.add_cycle(two_day_cycle());
        add_staff(&mut r, 2, ShiftAffinity::Day, true);
        add_staff(&mut r, 6, ShiftAffinity::Day, false);
        add_staff(&mut r, 2, ShiftAffinity::Night, true);
        add_staff(&mut r, 6, ShiftAffinity::Night, false);

        let config = CoverageConfig::new().with_min(2).with_max(4).with_generation_target(3);
        let outcome = generate_draft(&mut r, "c1", &config).unwrap();

        assert_eq!(outcome.dropped, 0);
        assert_eq!(outcome.unfilled_slots, 0);
        assert_eq!(outcome.missing_lead_slots, 0);
        // 2 dates x 2 shift types x 3 coverage.
        assert_eq!(outcome.inserted, 12);
        for date in [d(2025, 3, 3), d(2025, 3, 4)] {
            for shift_type in ShiftType::ALL {
                let rows = r.slot_rows("c1", date, shift_type);
                assert_eq!(rows.len(), 3);
                assert_eq!(rows.iter().filter(|s| s.is_lead()).count(), 1);
            }
        }
    }

    #[test]
    fn test_published_cycle_fatal_no_mutation() {
        let mut r = Roster::new();
        let mut cycle = two_day_cycle();
        cycle.published = true;
        r.add_cycle(cycle);
        add_staff(&mut r, 3, ShiftAffinity::Either, true);

        let err = generate_draft(&mut r, "c1", &CoverageConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AutoCyclePublished);
        assert_eq!(r.shifts_in_cycle("c1").count(), 0);
    }

    #[test]
    fn test_no_therapists_fatal() {
        let mut r = Roster::new();
        r.add_cycle(two_day_cycle());
        let err = generate_draft(&mut r, "c1", &CoverageConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AutoNoTherapists);
    }

    #[test]
    fn test_short_pool_tallies_unfilled() {
        let mut r = Roster::new();
        r.add_cycle(two_day_cycle());
        add_staff(&mut r, 2, ShiftAffinity::Day, true);

        let config = CoverageConfig::new().with_min(3).with_max(5).with_generation_target(4);
        let outcome = generate_draft(&mut r, "c1", &config).unwrap();
        // Day slots got 2 of 3 minimum; night slots got nothing.
        assert_eq!(outcome.unfilled_slots, 4);
        assert_eq!(outcome.missing_lead_slots, 2); // both night slots
    }

    #[test]
    fn test_promotes_existing_eligible_row() {
        let mut r = Roster::new();
        r.add_cycle(two_day_cycle());
        add_staff(&mut r, 1, ShiftAffinity::Day, true);
        add_staff(&mut r, 3, ShiftAffinity::Day, false);
        // A lead-eligible therapist already sits in the slot as staff.
        r.insert(NewShift::staff("c1", "dl0", d(2025, 3, 3), ShiftType::Day))
            .unwrap();

        let config = CoverageConfig::new().with_min(1).with_max(4).with_generation_target(2);
        let outcome = generate_draft(&mut r, "c1", &config).unwrap();
        assert!(outcome.promoted_leads >= 1);
        let promoted = r.row_for("c1", "dl0", d(2025, 3, 3)).unwrap();
        assert_eq!(promoted.role, ShiftRole::Lead);
    }

    #[test]
    fn test_idempotent_second_run_inserts_nothing() {
        let mut r = Roster::new();
        r.add_cycle(two_day_cycle());
        add_staff(&mut r, 2, ShiftAffinity::Either, true);
        add_staff(&mut r, 8, ShiftAffinity::Either, false);

        let config = CoverageConfig::new().with_min(2).with_max(4).with_generation_target(3);
        let first = generate_draft(&mut r, "c1", &config).unwrap();
        assert!(first.inserted > 0);

        let second = generate_draft(&mut r, "c1", &config).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.requested, 0);
    }

    #[test]
    fn test_round_robin_spreads_assignments() {
        let mut r = Roster::new();
        // One week, day slots only need 1 each, pool of 7 therapists.
        r.add_cycle(Cycle::new("c1", d(2025, 3, 3), d(2025, 3, 9)));
        add_staff(&mut r, 7, ShiftAffinity::Day, true);

        let config = CoverageConfig::new().with_min(1).with_max(1).with_generation_target(1);
        generate_draft(&mut r, "c1", &config).unwrap();

        // 7 slots over 7 candidates: every candidate assigned exactly once.
        let mut counts: HashMap<String, usize> = HashMap::new();
        for shift in r.shifts_in_cycle("c1") {
            *counts.entry(shift.therapist_id.clone()).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 7);
        assert!(counts.values().all(|&c| c == 1));
    }

    #[test]
    fn test_prn_excluded_from_pool_by_default() {
        let mut r = Roster::new();
        r.add_cycle(Cycle::new("c1", d(2025, 3, 3), d(2025, 3, 3)));
        r.add_therapist(
            Therapist::new("prn1")
                .with_employment(EmploymentType::Prn)
                .with_affinity(ShiftAffinity::Day),
        );

        let config = CoverageConfig::new().with_min(1).with_max(1).with_generation_target(1);
        let err = generate_draft(&mut r, "c1", &config).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AutoNoTherapists);
    }

    #[test]
    fn test_prn_in_pool_still_gated_by_override() {
        let mut r = Roster::new();
        r.add_cycle(Cycle::new("c1", d(2025, 3, 3), d(2025, 3, 4)));
        r.add_therapist(
            Therapist::new("prn1")
                .with_employment(EmploymentType::Prn)
                .with_affinity(ShiftAffinity::Day),
        );
        r.add_override(crate::models::AvailabilityOverride::force_on(
            "prn1",
            "c1",
            d(2025, 3, 3),
        ));

        let config = CoverageConfig::new()
            .with_min(1)
            .with_max(1)
            .with_generation_target(1)
            .with_prn_in_pool(true);
        let outcome = generate_draft(&mut r, "c1", &config).unwrap();
        // Offered on the forced date only.
        assert_eq!(outcome.inserted, 1);
        assert!(r.row_for("c1", "prn1", d(2025, 3, 3)).is_some());
        assert!(r.row_for("c1", "prn1", d(2025, 3, 4)).is_none());
    }
}
