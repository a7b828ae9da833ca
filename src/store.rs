//! In-memory roster store.
//!
//! Holds cycles, therapists, overrides, and shift rows, and enforces the
//! relational invariants every mutation path relies on:
//!
//! - uniqueness over (cycle, therapist, date) — the basis for all
//!   duplicate-safe upserts;
//! - no shift mutation once the owning cycle is published (the publish
//!   flag itself changes only through [`Roster::set_published`]).
//!
//! Batch inserts use insert-or-ignore semantics and report requested vs.
//! inserted counts so callers can surface lost writes instead of assuming
//! success.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{Result, RosterError};
use crate::models::{
    AssignmentStatus, AvailabilityOverride, Cycle, NewShift, Shift, ShiftRole, ShiftStatus,
    ShiftType, StatusNote, Therapist,
};

/// Result of a duplicate-ignoring batch upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Rows the caller asked to insert.
    pub requested: usize,
    /// Rows actually inserted.
    pub inserted: usize,
}

impl BatchOutcome {
    /// Rows dropped to duplicate conflicts.
    #[inline]
    pub fn dropped(&self) -> usize {
        self.requested - self.inserted
    }
}

/// The shared roster dataset.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    cycles: Vec<Cycle>,
    therapists: Vec<Therapist>,
    overrides: Vec<AvailabilityOverride>,
    shifts: Vec<Shift>,
    next_id: u64,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Adds a cycle.
    pub fn add_cycle(&mut self, cycle: Cycle) {
        self.cycles.push(cycle);
    }

    /// Adds a therapist.
    pub fn add_therapist(&mut self, therapist: Therapist) {
        self.therapists.push(therapist);
    }

    /// Adds an availability override.
    pub fn add_override(&mut self, record: AvailabilityOverride) {
        self.overrides.push(record);
    }

    /// Looks up a cycle.
    pub fn cycle(&self, cycle_id: &str) -> Result<&Cycle> {
        self.cycles
            .iter()
            .find(|c| c.id == cycle_id)
            .ok_or_else(|| RosterError::CycleNotFound(cycle_id.to_string()))
    }

    /// Looks up a therapist.
    pub fn therapist(&self, therapist_id: &str) -> Result<&Therapist> {
        self.therapists
            .iter()
            .find(|t| t.id == therapist_id)
            .ok_or_else(|| RosterError::TherapistNotFound(therapist_id.to_string()))
    }

    /// All therapists in pool order.
    pub fn therapists(&self) -> &[Therapist] {
        &self.therapists
    }

    /// All override records.
    pub fn overrides(&self) -> &[AvailabilityOverride] {
        &self.overrides
    }

    /// Looks up a shift row.
    pub fn shift(&self, shift_id: u64) -> Result<&Shift> {
        self.shifts
            .iter()
            .find(|s| s.id == shift_id)
            .ok_or(RosterError::ShiftNotFound(shift_id))
    }

    /// All shift rows in a cycle.
    pub fn shifts_in_cycle(&self, cycle_id: &str) -> impl Iterator<Item = &Shift> + '_ {
        let cycle_id = cycle_id.to_string();
        self.shifts.iter().filter(move |s| s.cycle_id == cycle_id)
    }

    /// The derived slot: all rows sharing one date and shift type.
    pub fn slot_rows(&self, cycle_id: &str, date: NaiveDate, shift_type: ShiftType) -> Vec<&Shift> {
        self.shifts
            .iter()
            .filter(|s| s.cycle_id == cycle_id && s.date == date && s.shift_type == shift_type)
            .collect()
    }

    /// Lead rows of a slot.
    pub fn lead_rows(&self, cycle_id: &str, date: NaiveDate, shift_type: ShiftType) -> Vec<&Shift> {
        self.slot_rows(cycle_id, date, shift_type)
            .into_iter()
            .filter(|s| s.is_lead())
            .collect()
    }

    /// Coverage count for a slot (scheduled and on-call rows only).
    pub fn coverage_count(&self, cycle_id: &str, date: NaiveDate, shift_type: ShiftType) -> u32 {
        self.slot_rows(cycle_id, date, shift_type)
            .iter()
            .filter(|s| s.counts_toward_coverage())
            .count() as u32
    }

    /// The row for a (cycle, therapist, date), if any.
    pub fn row_for(&self, cycle_id: &str, therapist_id: &str, date: NaiveDate) -> Option<&Shift> {
        self.shifts.iter().find(|s| {
            s.cycle_id == cycle_id && s.therapist_id == therapist_id && s.date == date
        })
    }

    fn assert_unpublished(&self, cycle_id: &str) -> Result<()> {
        if self.cycle(cycle_id)?.published {
            return Err(RosterError::CyclePublished(cycle_id.to_string()));
        }
        Ok(())
    }

    /// Inserts one row, rejecting duplicates on (cycle, therapist, date).
    pub fn insert(&mut self, new: NewShift) -> Result<u64> {
        self.assert_unpublished(&new.cycle_id)?;
        if self
            .row_for(&new.cycle_id, &new.therapist_id, new.date)
            .is_some()
        {
            return Err(RosterError::DuplicateShift {
                therapist_id: new.therapist_id,
                date: new.date,
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.shifts.push(Shift {
            id,
            cycle_id: new.cycle_id,
            therapist_id: new.therapist_id,
            date: new.date,
            shift_type: new.shift_type,
            role: new.role,
            status: ShiftStatus::Scheduled,
            assignment_status: AssignmentStatus::Scheduled,
            status_note: None,
        });
        Ok(id)
    }

    /// Batch insert with insert-or-ignore semantics.
    ///
    /// Duplicates — against existing rows or earlier rows in the same
    /// batch — are silently skipped; the outcome reports requested vs.
    /// inserted so the caller can reconcile.
    pub fn upsert_batch(&mut self, batch: Vec<NewShift>) -> Result<BatchOutcome> {
        let requested = batch.len();
        if let Some(first) = batch.first() {
            self.assert_unpublished(&first.cycle_id)?;
        }

        let mut inserted = 0;
        for new in batch {
            match self.insert(new) {
                Ok(_) => inserted += 1,
                Err(RosterError::DuplicateShift { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        if inserted < requested {
            debug!(requested, inserted, "batch upsert dropped duplicate rows");
        }
        Ok(BatchOutcome {
            requested,
            inserted,
        })
    }

    /// Deletes one row.
    pub fn remove(&mut self, shift_id: u64) -> Result<Shift> {
        let cycle_id = self.shift(shift_id)?.cycle_id.clone();
        self.assert_unpublished(&cycle_id)?;
        let pos = self
            .shifts
            .iter()
            .position(|s| s.id == shift_id)
            .ok_or(RosterError::ShiftNotFound(shift_id))?;
        Ok(self.shifts.remove(pos))
    }

    /// Changes a row's role.
    pub fn set_role(&mut self, shift_id: u64, role: ShiftRole) -> Result<()> {
        let cycle_id = self.shift(shift_id)?.cycle_id.clone();
        self.assert_unpublished(&cycle_id)?;
        if let Some(shift) = self.shifts.iter_mut().find(|s| s.id == shift_id) {
            shift.role = role;
        }
        Ok(())
    }

    /// Moves a row to a new date and shift type.
    ///
    /// Enforces the uniqueness key against the target date.
    pub fn reslot(&mut self, shift_id: u64, date: NaiveDate, shift_type: ShiftType) -> Result<()> {
        let shift = self.shift(shift_id)?;
        let cycle_id = shift.cycle_id.clone();
        let therapist_id = shift.therapist_id.clone();
        self.assert_unpublished(&cycle_id)?;

        if self
            .row_for(&cycle_id, &therapist_id, date)
            .is_some_and(|existing| existing.id != shift_id)
        {
            return Err(RosterError::DuplicateShift { therapist_id, date });
        }

        if let Some(shift) = self.shifts.iter_mut().find(|s| s.id == shift_id) {
            shift.date = date;
            shift.shift_type = shift_type;
        }
        Ok(())
    }

    /// Records a status change with its audit note.
    ///
    /// The lifecycle status used by coverage counting follows the
    /// administrative status.
    pub fn update_status(
        &mut self,
        shift_id: u64,
        status: AssignmentStatus,
        at: NaiveDate,
        note: Option<String>,
        actor: Option<String>,
    ) -> Result<()> {
        let cycle_id = self.shift(shift_id)?.cycle_id.clone();
        self.assert_unpublished(&cycle_id)?;
        if let Some(shift) = self.shifts.iter_mut().find(|s| s.id == shift_id) {
            shift.assignment_status = status;
            shift.status = status.lifecycle();
            shift.status_note = Some(StatusNote { note, at, actor });
        }
        Ok(())
    }

    /// Flips a cycle's published flag (used by the publish gate only).
    pub fn set_published(&mut self, cycle_id: &str, published: bool) -> Result<()> {
        self.cycle(cycle_id)?;
        if let Some(cycle) = self.cycles.iter_mut().find(|c| c.id == cycle_id) {
            cycle.published = published;
        }
        Ok(())
    }
}
