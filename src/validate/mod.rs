//! Cycle validation.
//!
//! Two independent validators gate publication and decorate the live
//! calendar:
//!
//! - [`slots::validate_slots`] — per-slot coverage and lead rules
//!   (never bypassable at publish time);
//! - [`weekly::validate_weekly`] — per-therapist/week quota rules
//!   (bypassable per-publish via an explicit manager override).
//!
//! Validators never fail: they return structured reports even when zero
//! violations exist.

pub mod slots;
pub mod weekly;

pub use slots::{validate_slots, SlotIssue, SlotIssueKind, SlotReport};
pub use weekly::{validate_weekly, QuotaIssue, QuotaIssueKind, QuotaReport};
