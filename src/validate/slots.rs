//! Coverage and lead validation per slot.
//!
//! Scans every (date, shift-type) slot in a cycle's range — including
//! slots with zero assignments — and classifies coverage and lead
//! problems. Never fails: the report is the result, used both for live
//! calendar decoration and as the non-bypassable publish gate.

use serde::{Deserialize, Serialize};

use crate::config::CoverageConfig;
use crate::models::{Cycle, ShiftType, SlotKey};
use crate::store::Roster;

/// Why a slot failed validation. Any subset may apply to one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotIssueKind {
    /// Covering assignments below the minimum.
    UnderCoverage,
    /// Covering assignments above the maximum.
    OverCoverage,
    /// No lead row, or no lead-eligible covering assignment at all.
    MissingLead,
    /// More than one lead row.
    MultipleLeads,
    /// A lead row whose therapist lacks lead eligibility.
    IneligibleLead,
}

/// One slot problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotIssue {
    /// The affected slot.
    pub slot: SlotKey,
    /// Problem classification.
    pub kind: SlotIssueKind,
    /// Coverage count observed on the slot.
    pub coverage: u32,
    /// Human-readable description.
    pub message: String,
}

/// Aggregate result of a slot validation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotReport {
    /// All issues in slot order.
    pub issues: Vec<SlotIssue>,
    /// Slots below minimum coverage.
    pub under_coverage: u32,
    /// Slots above maximum coverage.
    pub over_coverage: u32,
    /// Slots without a usable lead.
    pub missing_lead: u32,
    /// Slots with more than one lead row.
    pub multiple_leads: u32,
    /// Slots whose lead lacks eligibility.
    pub ineligible_lead: u32,
}

impl SlotReport {
    /// Whether the cycle passed with zero issues.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn record(&mut self, slot: SlotKey, kind: SlotIssueKind, coverage: u32, message: String) {
        match kind {
            SlotIssueKind::UnderCoverage => self.under_coverage += 1,
            SlotIssueKind::OverCoverage => self.over_coverage += 1,
            SlotIssueKind::MissingLead => self.missing_lead += 1,
            SlotIssueKind::MultipleLeads => self.multiple_leads += 1,
            SlotIssueKind::IneligibleLead => self.ineligible_lead += 1,
        }
        self.issues.push(SlotIssue {
            slot,
            kind,
            coverage,
            message,
        });
    }
}

/// Validates every slot in the cycle's date range.
pub fn validate_slots(store: &Roster, cycle: &Cycle, config: &CoverageConfig) -> SlotReport {
    let lead_eligible =
        |id: &str| store.therapists().iter().any(|t| t.id == id && t.lead_eligible);

    let mut report = SlotReport::default();
    for date in cycle.dates() {
        for shift_type in ShiftType::ALL {
            let slot = SlotKey::new(date, shift_type);
            let rows = store.slot_rows(&cycle.id, date, shift_type);
            let coverage = rows.iter().filter(|r| r.counts_toward_coverage()).count() as u32;
            let leads: Vec<_> = rows.iter().filter(|r| r.is_lead()).collect();

            if coverage < config.min_per_slot {
                report.record(
                    slot,
                    SlotIssueKind::UnderCoverage,
                    coverage,
                    format!(
                        "{date} {}: coverage {coverage} below minimum {}",
                        shift_type.label(),
                        config.min_per_slot
                    ),
                );
            }
            if coverage > config.max_per_slot {
                report.record(
                    slot,
                    SlotIssueKind::OverCoverage,
                    coverage,
                    format!(
                        "{date} {}: coverage {coverage} above maximum {}",
                        shift_type.label(),
                        config.max_per_slot
                    ),
                );
            }

            let has_usable_lead = rows
                .iter()
                .any(|r| r.counts_toward_coverage() && lead_eligible(&r.therapist_id));
            if leads.is_empty() || !has_usable_lead {
                report.record(
                    slot,
                    SlotIssueKind::MissingLead,
                    coverage,
                    format!("{date} {}: no usable lead", shift_type.label()),
                );
            }
            if leads.len() > 1 {
                report.record(
                    slot,
                    SlotIssueKind::MultipleLeads,
                    coverage,
                    format!("{date} {}: {} lead rows", shift_type.label(), leads.len()),
                );
            }
            for lead in &leads {
                if !lead_eligible(&lead.therapist_id) {
                    report.record(
                        slot,
                        SlotIssueKind::IneligibleLead,
                        coverage,
                        format!(
                            "{date} {}: lead {} is not lead-eligible",
                            shift_type.label(),
                            lead.therapist_id
                        ),
                    );
                }
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentStatus, NewShift, Therapist};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// One-day cycle so each check inspects exactly two slots.
    fn one_day_roster() -> (Roster, Cycle) {
        let cycle = Cycle::new("c1", d(2025, 3, 3), d(2025, 3, 3));
        let mut r = Roster::new();
        r.add_cycle(cycle.clone());
        r.add_therapist(Therapist::new("lead1").lead_eligible());
        r.add_therapist(Therapist::new("lead2").lead_eligible());
        r.add_therapist(Therapist::new("s1"));
        r.add_therapist(Therapist::new("s2"));
        r.add_therapist(Therapist::new("s3"));
        (r, cycle)
    }

    fn config() -> CoverageConfig {
        CoverageConfig::new().with_min(2).with_max(3)
    }

    #[test]
    fn test_empty_slots_report_under_and_missing() {
        let (r, cycle) = one_day_roster();
        let report = validate_slots(&r, &cycle, &config());
        // Two slots (day, night), each under-covered and lead-less.
        assert_eq!(report.under_coverage, 2);
        assert_eq!(report.missing_lead, 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_clean_slot() {
        let (mut r, cycle) = one_day_roster();
        for (t, role_lead) in [("lead1", true), ("s1", false)] {
            let new = if role_lead {
                NewShift::lead("c1", t, d(2025, 3, 3), ShiftType::Day)
            } else {
                NewShift::staff("c1", t, d(2025, 3, 3), ShiftType::Day)
            };
            r.insert(new).unwrap();
        }
        r.insert(NewShift::lead("c1", "lead2", d(2025, 3, 3), ShiftType::Night))
            .unwrap();
        r.insert(NewShift::staff("c1", "s2", d(2025, 3, 3), ShiftType::Night))
            .unwrap();

        let report = validate_slots(&r, &cycle, &config());
        assert!(report.is_clean());
    }

    #[test]
    fn test_over_coverage() {
        let (mut r, cycle) = one_day_roster();
        r.insert(NewShift::lead("c1", "lead1", d(2025, 3, 3), ShiftType::Day))
            .unwrap();
        for t in ["s1", "s2", "s3"] {
            r.insert(NewShift::staff("c1", t, d(2025, 3, 3), ShiftType::Day))
                .unwrap();
        }
        let report = validate_slots(&r, &cycle, &config());
        assert_eq!(report.over_coverage, 1);
        let issue = report
            .issues
            .iter()
            .find(|i| i.kind == SlotIssueKind::OverCoverage)
            .unwrap();
        assert_eq!(issue.coverage, 4);
    }

    #[test]
    fn test_sick_rows_excluded_from_coverage() {
        let (mut r, cycle) = one_day_roster();
        let lead = r
            .insert(NewShift::lead("c1", "lead1", d(2025, 3, 3), ShiftType::Day))
            .unwrap();
        r.insert(NewShift::staff("c1", "s1", d(2025, 3, 3), ShiftType::Day))
            .unwrap();
        r.update_status(lead, AssignmentStatus::CallIn, d(2025, 3, 3), None, None)
            .unwrap();

        let report = validate_slots(&r, &cycle, &config());
        // Lead went sick: coverage drops to 1 and the lead row no longer covers.
        let day_issues: Vec<_> = report
            .issues
            .iter()
            .filter(|i| i.slot.shift_type == ShiftType::Day)
            .collect();
        assert!(day_issues
            .iter()
            .any(|i| i.kind == SlotIssueKind::UnderCoverage && i.coverage == 1));
        assert!(day_issues.iter().any(|i| i.kind == SlotIssueKind::MissingLead));
    }

    #[test]
    fn test_multiple_leads() {
        let (mut r, cycle) = one_day_roster();
        r.insert(NewShift::lead("c1", "lead1", d(2025, 3, 3), ShiftType::Day))
            .unwrap();
        r.insert(NewShift::lead("c1", "lead2", d(2025, 3, 3), ShiftType::Day))
            .unwrap();
        let report = validate_slots(&r, &cycle, &config());
        assert_eq!(report.multiple_leads, 1);
    }

    #[test]
    fn test_ineligible_lead() {
        let (mut r, cycle) = one_day_roster();
        r.insert(NewShift::lead("c1", "s1", d(2025, 3, 3), ShiftType::Day))
            .unwrap();
        r.insert(NewShift::staff("c1", "s2", d(2025, 3, 3), ShiftType::Day))
            .unwrap();
        let report = validate_slots(&r, &cycle, &config());
        assert_eq!(report.ineligible_lead, 1);
        // The ineligible lead also means no usable lead exists.
        assert!(report.missing_lead >= 1);
    }
}
