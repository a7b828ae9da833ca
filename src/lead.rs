//! Designated-lead mutation.
//!
//! Swaps or assigns the single lead for one slot while preserving the
//! single-lead invariant: after any successful call, exactly one row in
//! the slot carries the lead role.
//!
//! Eligibility is re-checked here as a final guard against stale callers;
//! capacity and quota preconditions are the caller's responsibility
//! (see the handler and the draft generator).

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Result, RosterError};
use crate::models::{NewShift, ShiftRole, ShiftType};
use crate::store::Roster;

/// What a successful lead mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadChange {
    /// Row now holding the lead role.
    pub lead_shift_id: u64,
    /// Whether a new row was inserted (vs. an existing one promoted).
    pub inserted: bool,
}

/// Promotes (or inserts) `therapist_id` as the lead of one slot.
///
/// Fails with [`RosterError::LeadNotEligible`] if the flag is missing and
/// with [`RosterError::MultipleLeadsPrevented`] if a different therapist
/// already holds the lead — the original row is left untouched. The
/// uniqueness key over (cycle, therapist, date) guarantees at most one
/// own row to promote.
pub fn set_designated_lead(
    store: &mut Roster,
    cycle_id: &str,
    therapist_id: &str,
    date: NaiveDate,
    shift_type: ShiftType,
) -> Result<LeadChange> {
    let therapist = store.therapist(therapist_id)?;
    if !therapist.lead_eligible {
        return Err(RosterError::LeadNotEligible(therapist_id.to_string()));
    }

    if let Some(other) = store
        .lead_rows(cycle_id, date, shift_type)
        .into_iter()
        .find(|r| r.therapist_id != therapist_id)
    {
        return Err(RosterError::MultipleLeadsPrevented {
            current_lead: other.therapist_id.clone(),
        });
    }

    let own_rows: Vec<(u64, bool)> = store
        .slot_rows(cycle_id, date, shift_type)
        .iter()
        .filter(|r| r.therapist_id == therapist_id)
        .map(|r| (r.id, r.is_lead()))
        .collect();

    let (lead_shift_id, inserted) = match own_rows.first() {
        Some(&(id, _)) => {
            store.set_role(id, ShiftRole::Lead)?;
            (id, false)
        }
        None => {
            let id = store.insert(NewShift::lead(cycle_id, therapist_id, date, shift_type))?;
            (id, true)
        }
    };

    debug!(
        cycle_id,
        therapist_id,
        %date,
        shift = shift_type.label(),
        inserted,
        "designated lead set"
    );
    Ok(LeadChange {
        lead_shift_id,
        inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cycle, NewShift, Therapist};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn roster() -> Roster {
        let mut r = Roster::new();
        r.add_cycle(Cycle::new("c1", d(2025, 3, 3), d(2025, 3, 9)));
        r.add_therapist(Therapist::new("lead1").lead_eligible());
        r.add_therapist(Therapist::new("lead2").lead_eligible());
        r.add_therapist(Therapist::new("staff1"));
        r
    }

    #[test]
    fn test_inserts_when_no_row_exists() {
        let mut r = roster();
        let change =
            set_designated_lead(&mut r, "c1", "lead1", d(2025, 3, 3), ShiftType::Day).unwrap();
        assert!(change.inserted);
        let shift = r.shift(change.lead_shift_id).unwrap();
        assert_eq!(shift.role, ShiftRole::Lead);
    }

    #[test]
    fn test_promotes_existing_row() {
        let mut r = roster();
        let id = r
            .insert(NewShift::staff("c1", "lead1", d(2025, 3, 3), ShiftType::Day))
            .unwrap();
        let change =
            set_designated_lead(&mut r, "c1", "lead1", d(2025, 3, 3), ShiftType::Day).unwrap();
        assert!(!change.inserted);
        assert_eq!(change.lead_shift_id, id);
        assert!(r.shift(id).unwrap().is_lead());
    }

    #[test]
    fn test_not_eligible_rejected() {
        let mut r = roster();
        let err = set_designated_lead(&mut r, "c1", "staff1", d(2025, 3, 3), ShiftType::Day)
            .unwrap_err();
        assert!(matches!(err, RosterError::LeadNotEligible(_)));
    }

    #[test]
    fn test_second_lead_prevented_and_original_unchanged() {
        let mut r = roster();
        let first =
            set_designated_lead(&mut r, "c1", "lead1", d(2025, 3, 3), ShiftType::Day).unwrap();

        let err = set_designated_lead(&mut r, "c1", "lead2", d(2025, 3, 3), ShiftType::Day)
            .unwrap_err();
        assert!(matches!(
            err,
            RosterError::MultipleLeadsPrevented { ref current_lead } if current_lead == "lead1"
        ));
        assert!(r.shift(first.lead_shift_id).unwrap().is_lead());
    }

    #[test]
    fn test_idempotent_for_current_lead() {
        let mut r = roster();
        let first =
            set_designated_lead(&mut r, "c1", "lead1", d(2025, 3, 3), ShiftType::Day).unwrap();
        let again =
            set_designated_lead(&mut r, "c1", "lead1", d(2025, 3, 3), ShiftType::Day).unwrap();
        assert!(!again.inserted);
        assert_eq!(again.lead_shift_id, first.lead_shift_id);
        let leads = r
            .slot_rows("c1", d(2025, 3, 3), ShiftType::Day)
            .iter()
            .filter(|s| s.is_lead())
            .count();
        assert_eq!(leads, 1);
    }

    #[test]
    fn test_single_lead_invariant_across_slots() {
        // Leads on day and night of the same date are independent slots.
        let mut r = roster();
        set_designated_lead(&mut r, "c1", "lead1", d(2025, 3, 3), ShiftType::Day).unwrap();
        let err = set_designated_lead(&mut r, "c1", "lead1", d(2025, 3, 3), ShiftType::Night)
            .unwrap_err();
        // Same therapist/date on the other slot hits the uniqueness key.
        assert!(matches!(err, RosterError::DuplicateShift { .. }));
    }
}
