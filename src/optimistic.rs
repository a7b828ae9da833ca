//! Optimistic edit application.
//!
//! Interactive edits apply eagerly and roll back on rejection: a snapshot
//! is taken before the handler runs, and any non-applied response restores
//! the exact prior state. An [`EditLock`] serializes edits so a second
//! drag cannot start while one is still settling.

use tracing::debug;

use crate::config::CoverageConfig;
use crate::error::Result;
use crate::handler::{self, ActionResponse, RosterAction};
use crate::store::Roster;

/// Runs a fallible mutation against the roster, restoring the pre-call
/// snapshot when it fails.
pub fn with_rollback<T>(
    store: &mut Roster,
    op: impl FnOnce(&mut Roster) -> Result<T>,
) -> Result<T> {
    let snapshot = store.clone();
    match op(store) {
        Ok(value) => Ok(value),
        Err(e) => {
            *store = snapshot;
            debug!(error = %e, "mutation rolled back");
            Err(e)
        }
    }
}

/// Applies one handler action, restoring the snapshot on rejection.
pub fn apply(store: &mut Roster, config: &CoverageConfig, action: RosterAction) -> ActionResponse {
    let snapshot = store.clone();
    let response = handler::handle(store, config, action);
    if !response.ok {
        *store = snapshot;
    }
    response
}

/// Single-flight guard for interactive edits.
///
/// Acquire before dispatching an edit, release once its response has been
/// applied or rolled back. A failed acquire means an edit is still in
/// flight and the new one must be dropped, not queued.
#[derive(Debug, Default)]
pub struct EditLock {
    in_flight: bool,
}

impl EditLock {
    /// Creates a released lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to start an edit. Returns `false` while one is in flight.
    pub fn try_acquire(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Marks the in-flight edit as settled.
    pub fn release(&mut self) {
        self.in_flight = false;
    }

    /// Whether an edit is currently in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RosterError;
    use crate::models::{Cycle, NewShift, ShiftType, Therapist};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn roster() -> Roster {
        let mut r = Roster::new();
        r.add_cycle(Cycle::new("c1", d(2025, 3, 3), d(2025, 3, 9)));
        r.add_therapist(Therapist::new("t1"));
        r.add_therapist(Therapist::new("t2"));
        r
    }

    #[test]
    fn test_rollback_restores_partial_writes() {
        let mut r = roster();
        let err = with_rollback(&mut r, |store| {
            store.insert(NewShift::staff("c1", "t1", d(2025, 3, 3), ShiftType::Day))?;
            // Second write fails after the first landed.
            store.insert(NewShift::staff("c1", "t1", d(2025, 3, 3), ShiftType::Night))?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, RosterError::DuplicateShift { .. }));
        // The first insert was rolled back with the failure.
        assert!(r.row_for("c1", "t1", d(2025, 3, 3)).is_none());
    }

    #[test]
    fn test_success_keeps_writes() {
        let mut r = roster();
        with_rollback(&mut r, |store| {
            store.insert(NewShift::staff("c1", "t1", d(2025, 3, 3), ShiftType::Day))
        })
        .unwrap();
        assert!(r.row_for("c1", "t1", d(2025, 3, 3)).is_some());
    }

    #[test]
    fn test_apply_rejection_leaves_store_unchanged() {
        let mut r = roster();
        let before = r.shifts_in_cycle("c1").count();
        let response = apply(
            &mut r,
            &CoverageConfig::default(),
            RosterAction::Remove {
                cycle_id: "c1".into(),
                shift_id: 99,
            },
        );
        assert!(!response.ok);
        assert_eq!(r.shifts_in_cycle("c1").count(), before);
    }

    #[test]
    fn test_edit_lock_single_flight() {
        let mut lock = EditLock::new();
        assert!(!lock.is_busy());
        assert!(lock.try_acquire());
        assert!(lock.is_busy());
        // A second edit while one is in flight is dropped.
        assert!(!lock.try_acquire());
        lock.release();
        assert!(lock.try_acquire());
    }
}
