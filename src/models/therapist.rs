//! Therapist profile model.
//!
//! A therapist is the schedulable resource: a shift-type affinity,
//! an employment type, a lead-eligibility flag, a weekly work-day quota,
//! and an optional recurring work pattern (hard/soft weekday rules,
//! weekend rotation, shift preference).
//!
//! # Quota Derivation
//! An explicit `weekly_quota` always wins; otherwise the employment type
//! supplies a default (full_time 5, part_time 3, prn 2).

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// The two coverage slots of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// Day coverage slot.
    Day,
    /// Night coverage slot.
    Night,
}

impl ShiftType {
    /// Both slot types in generation order.
    pub const ALL: [ShiftType; 2] = [ShiftType::Day, ShiftType::Night];

    /// Lowercase label for messages.
    pub fn label(&self) -> &'static str {
        match self {
            ShiftType::Day => "day",
            ShiftType::Night => "night",
        }
    }
}

/// Which slot types a therapist can be scheduled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftAffinity {
    /// Day slots only.
    Day,
    /// Night slots only.
    Night,
    /// Any slot type.
    Either,
}

impl ShiftAffinity {
    /// Whether this affinity covers the given slot type.
    #[inline]
    pub fn covers(&self, shift_type: ShiftType) -> bool {
        matches!(
            (self, shift_type),
            (ShiftAffinity::Either, _)
                | (ShiftAffinity::Day, ShiftType::Day)
                | (ShiftAffinity::Night, ShiftType::Night)
        )
    }
}

/// Employment classification.
///
/// Drives the default weekly quota and PRN offer semantics: a PRN
/// therapist is never offered a slot without an explicit `force_on`
/// override for that date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Full-time (default quota 5 days/week).
    FullTime,
    /// Part-time (default quota 3 days/week).
    PartTime,
    /// As-needed (default quota 2 days/week; only assignable via override).
    Prn,
}

impl EmploymentType {
    /// Default weekly work-day quota for this employment type.
    pub fn default_quota(&self) -> u32 {
        match self {
            EmploymentType::FullTime => 5,
            EmploymentType::PartTime => 3,
            EmploymentType::Prn => 2,
        }
    }
}

/// Weekend rotation mode within a work pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum WeekendRotation {
    /// No rotation: weekend eligibility follows the weekday rules alone.
    None,
    /// Works every other weekend; `anchor` falls in a working weekend.
    EveryOther {
        /// A date inside a weekend the therapist works.
        anchor: NaiveDate,
    },
}

/// A therapist's recurring availability rule set.
///
/// Hard rules block assignment; soft rules are advisory only.
/// Empty `hard_days` means no hard weekday restriction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkPattern {
    /// Weekdays the therapist is contracted to work. Empty = unrestricted.
    pub hard_days: Vec<Weekday>,
    /// Weekdays the therapist prefers to work (advisory).
    pub soft_days: Vec<Weekday>,
    /// Weekdays the therapist never works.
    pub off_days: Vec<Weekday>,
    /// Weekend rotation mode.
    pub weekend_rotation: Option<WeekendRotation>,
    /// Preferred slot type (advisory).
    pub preferred_shift: Option<ShiftType>,
}

impl WorkPattern {
    /// Creates an unrestricted pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hard work day.
    pub fn with_hard_day(mut self, day: Weekday) -> Self {
        self.hard_days.push(day);
        self
    }

    /// Adds a soft (preferred) work day.
    pub fn with_soft_day(mut self, day: Weekday) -> Self {
        self.soft_days.push(day);
        self
    }

    /// Adds an off day.
    pub fn with_off_day(mut self, day: Weekday) -> Self {
        self.off_days.push(day);
        self
    }

    /// Sets an every-other-weekend rotation anchored at `anchor`.
    pub fn with_every_other_weekend(mut self, anchor: NaiveDate) -> Self {
        self.weekend_rotation = Some(WeekendRotation::EveryOther { anchor });
        self
    }

    /// Sets the preferred slot type.
    pub fn with_preferred_shift(mut self, shift_type: ShiftType) -> Self {
        self.preferred_shift = Some(shift_type);
        self
    }

    /// Whether `date`'s weekday is in the off set.
    pub fn is_off_day(&self, date: NaiveDate) -> bool {
        self.off_days.contains(&date.weekday())
    }

    /// Whether `date`'s weekday violates the hard works-set.
    ///
    /// Only meaningful when `hard_days` is non-empty.
    pub fn violates_hard_days(&self, date: NaiveDate) -> bool {
        !self.hard_days.is_empty() && !self.hard_days.contains(&date.weekday())
    }

    /// Whether `date`'s weekday misses the soft set (advisory).
    pub fn misses_soft_days(&self, date: NaiveDate) -> bool {
        !self.soft_days.is_empty() && !self.soft_days.contains(&date.weekday())
    }

    /// Whether an every-other rotation blocks this weekend date.
    ///
    /// Parity is measured in whole weeks between `date`'s week and the
    /// anchor's week: odd parity = the off weekend. Non-weekend dates are
    /// never blocked by rotation.
    pub fn rotation_blocks(&self, date: NaiveDate) -> bool {
        let Some(WeekendRotation::EveryOther { anchor }) = self.weekend_rotation else {
            return false;
        };
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let weeks = (super::week_start(date) - super::week_start(anchor)).num_days() / 7;
        weeks.rem_euclid(2) == 1
    }
}

/// A schedulable therapist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Therapist {
    /// Unique therapist identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Slot-type affinity.
    pub affinity: ShiftAffinity,
    /// Employment classification.
    pub employment: EmploymentType,
    /// Whether this therapist may hold the designated-lead role.
    pub lead_eligible: bool,
    /// Explicit weekly quota override. `None` = employment default.
    pub weekly_quota: Option<u32>,
    /// Whether the therapist is active.
    pub active: bool,
    /// Whether the therapist is on FMLA leave.
    pub on_fmla: bool,
    /// FMLA return date; schedulable again on and after this date.
    pub fmla_return: Option<NaiveDate>,
    /// Recurring availability rules.
    pub work_pattern: Option<WorkPattern>,
}

impl Therapist {
    /// Creates an active full-time therapist covering either slot type.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            affinity: ShiftAffinity::Either,
            employment: EmploymentType::FullTime,
            lead_eligible: false,
            weekly_quota: None,
            active: true,
            on_fmla: false,
            fmla_return: None,
            work_pattern: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the slot-type affinity.
    pub fn with_affinity(mut self, affinity: ShiftAffinity) -> Self {
        self.affinity = affinity;
        self
    }

    /// Sets the employment type.
    pub fn with_employment(mut self, employment: EmploymentType) -> Self {
        self.employment = employment;
        self
    }

    /// Marks the therapist lead-eligible.
    pub fn lead_eligible(mut self) -> Self {
        self.lead_eligible = true;
        self
    }

    /// Sets an explicit weekly quota.
    pub fn with_weekly_quota(mut self, quota: u32) -> Self {
        self.weekly_quota = Some(quota);
        self
    }

    /// Marks the therapist inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Puts the therapist on FMLA, optionally with a return date.
    pub fn on_fmla(mut self, return_date: Option<NaiveDate>) -> Self {
        self.on_fmla = true;
        self.fmla_return = return_date;
        self
    }

    /// Sets the work pattern.
    pub fn with_work_pattern(mut self, pattern: WorkPattern) -> Self {
        self.work_pattern = Some(pattern);
        self
    }

    /// Effective weekly quota (explicit override or employment default).
    pub fn quota(&self) -> u32 {
        self.weekly_quota
            .unwrap_or_else(|| self.employment.default_quota())
    }

    /// Whether FMLA blocks this therapist on `date`.
    ///
    /// A return date re-opens eligibility on and after that date.
    pub fn fmla_blocks(&self, date: NaiveDate) -> bool {
        self.on_fmla && self.fmla_return.map_or(true, |ret| date < ret)
    }

    /// Whether the therapist can appear on schedules at all on `date`.
    pub fn is_schedulable(&self, date: NaiveDate) -> bool {
        self.active && !self.fmla_blocks(date)
    }
}
