// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Duty shift records and the limits that span several shifts.
//!
//! A single shift has no upper bound on its length. Limits apply across
//! records instead: shifts may not overlap, a calendar week (Monday to
//! Sunday) may not exceed [`WEEKLY_HOURS_LIMIT`], and each month is expected
//! to reach the regime's minimum.

use crate::error::DomainError;
use crate::sync_status::{SyncStatus, SyncTracked, SyncTransition, apply_edit};
use crate::types::{RecordKind, ShiftId, SmkVersion};
use crate::validation::{validate_medical_shift, validate_shift_location, validate_year_bounds};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, PrimitiveDateTime};

/// Most duty hours allowed in one calendar week.
pub const WEEKLY_HOURS_LIMIT: i64 = 48;
/// Monthly duty minimum under the Old regime, in hours.
pub const OLD_MONTHLY_MINIMUM_HOURS: i64 = 160;
/// Monthly duty minimum under the New regime, in hours.
pub const NEW_MONTHLY_MINIMUM_HOURS: i64 = 140;

/// Length of a shift as recorded.
///
/// Minutes are kept exactly as entered and may exceed 59. Use
/// [`ShiftDuration::normalized`] only for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDuration {
    hours: i32,
    minutes: i32,
}

impl ShiftDuration {
    /// Creates a validated duration.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is negative or both are zero.
    pub fn new(hours: i32, minutes: i32) -> Result<Self, DomainError> {
        validate_medical_shift(hours, minutes)?;
        Ok(Self { hours, minutes })
    }

    #[must_use]
    pub const fn hours(&self) -> i32 {
        self.hours
    }

    #[must_use]
    pub const fn minutes(&self) -> i32 {
        self.minutes
    }

    #[must_use]
    pub fn total_minutes(&self) -> i64 {
        i64::from(self.hours) * 60 + i64::from(self.minutes)
    }

    /// Hours and minutes with minutes carried into hours.
    #[must_use]
    pub fn normalized(&self) -> (i64, i64) {
        let total: i64 = self.total_minutes();
        (total / 60, total % 60)
    }
}

impl std::fmt::Display for ShiftDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hours, minutes) = self.normalized();
        write!(f, "{hours}h {minutes:02}min")
    }
}

/// The editable content of a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDetails {
    pub date: Date,
    pub hours: i32,
    pub minutes: i32,
    pub location: String,
    /// Training year, `0` if unassigned.
    #[serde(default)]
    pub year: i32,
}

impl ShiftDetails {
    /// Checks the record-local rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration, location or year bounds are invalid.
    pub fn validate(&self) -> Result<ShiftDuration, DomainError> {
        let duration: ShiftDuration = ShiftDuration::new(self.hours, self.minutes)?;
        validate_shift_location(&self.location)?;
        validate_year_bounds(self.year)?;
        Ok(duration)
    }
}

/// A duty shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalShift {
    id: ShiftId,
    date: Date,
    duration: ShiftDuration,
    location: String,
    year: i32,
    sync_status: SyncStatus,
}

impl SyncTracked for MedicalShift {
    const KIND: RecordKind = RecordKind::MedicalShift;

    fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    fn set_sync_status(&mut self, status: SyncStatus) {
        self.sync_status = status;
    }
}

impl MedicalShift {
    /// Creates a new, unsynced shift.
    ///
    /// # Errors
    ///
    /// Returns an error if the details are invalid.
    pub fn new(id: ShiftId, details: &ShiftDetails) -> Result<Self, DomainError> {
        let duration: ShiftDuration = details.validate()?;
        Ok(Self {
            id,
            date: details.date,
            duration,
            location: details.location.trim().to_string(),
            year: details.year,
            sync_status: SyncStatus::NotSynced,
        })
    }

    #[must_use]
    pub const fn id(&self) -> ShiftId {
        self.id
    }

    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    #[must_use]
    pub const fn duration(&self) -> ShiftDuration {
        self.duration
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    /// When the shift starts and ends. Shifts start at midnight of their date.
    #[must_use]
    pub fn interval(&self) -> (PrimitiveDateTime, PrimitiveDateTime) {
        let start: PrimitiveDateTime = self.date.midnight();
        let end: PrimitiveDateTime =
            start.saturating_add(Duration::minutes(self.duration.total_minutes()));
        (start, end)
    }

    /// Returns true if the two shifts share any time.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let (start, end) = self.interval();
        let (other_start, other_end) = other.interval();
        start < other_end && end > other_start
    }

    /// Replaces the shift's content.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is approved or the details are invalid.
    /// The record is unchanged on error.
    pub fn update(&mut self, details: &ShiftDetails) -> Result<SyncTransition, DomainError> {
        apply_edit(self, |shift| {
            shift.duration = details.validate()?;
            shift.date = details.date;
            shift.location = details.location.trim().to_string();
            shift.year = details.year;
            Ok(())
        })
    }
}

/// Monday of the week containing `date`.
#[must_use]
pub fn week_start(date: Date) -> Date {
    date.saturating_sub(Duration::days(i64::from(
        date.weekday().number_days_from_monday(),
    )))
}

/// Total minutes of the shifts starting within `first..=last`.
fn minutes_within<'a>(
    shifts: impl Iterator<Item = &'a MedicalShift>,
    first: Date,
    last: Date,
) -> i64 {
    shifts
        .filter(|s| (first..=last).contains(&s.date))
        .map(|s| s.duration.total_minutes())
        .sum()
}

/// Fails if `shift` overlaps any other shift in `existing`.
///
/// A record with the same id as `shift` is its stored version and is skipped.
///
/// # Errors
///
/// Returns `ShiftOverlap` naming the first colliding shift.
pub fn check_shift_overlap(
    shift: &MedicalShift,
    existing: &[MedicalShift],
) -> Result<(), DomainError> {
    existing
        .iter()
        .filter(|other| other.id != shift.id)
        .find(|other| shift.overlaps(other))
        .map_or(Ok(()), |other| {
            Err(DomainError::ShiftOverlap {
                date: shift.date,
                existing: other.id,
            })
        })
}

/// Checks that adding `shift` keeps its week within [`WEEKLY_HOURS_LIMIT`].
///
/// # Returns
///
/// The week's total in minutes, including `shift`.
///
/// # Errors
///
/// Returns `WeeklyLimitExceeded` if the total is over the limit.
pub fn check_weekly_limit(
    shift: &MedicalShift,
    existing: &[MedicalShift],
) -> Result<i64, DomainError> {
    let first: Date = week_start(shift.date);
    let last: Date = first.saturating_add(Duration::days(6));
    let others: i64 = minutes_within(
        existing.iter().filter(|other| other.id != shift.id),
        first,
        last,
    );
    let total_minutes: i64 = others + shift.duration.total_minutes();

    if total_minutes > WEEKLY_HOURS_LIMIT * 60 {
        return Err(DomainError::WeeklyLimitExceeded {
            week_start: first,
            total_minutes,
            limit_hours: WEEKLY_HOURS_LIMIT,
        });
    }
    Ok(total_minutes)
}

/// Weekly and monthly duty totals around one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub week_start: Date,
    pub weekly_minutes: i64,
    pub weekly_limit_hours: i64,
    pub exceeds_weekly_limit: bool,
    pub monthly_minutes: i64,
    pub monthly_minimum_hours: i64,
    pub below_monthly_minimum: bool,
    /// True once `date` is the last day of its month.
    pub month_elapsed: bool,
}

impl ShiftSummary {
    /// True when the month is over and its minimum was missed.
    #[must_use]
    pub const fn missed_monthly_minimum(&self) -> bool {
        self.month_elapsed && self.below_monthly_minimum
    }
}

/// The monthly duty minimum for a regime, in hours.
#[must_use]
pub const fn monthly_minimum_hours(regime: SmkVersion) -> i64 {
    match regime {
        SmkVersion::Old => OLD_MONTHLY_MINIMUM_HOURS,
        SmkVersion::New => NEW_MONTHLY_MINIMUM_HOURS,
    }
}

/// Summarizes the week and month containing `date`.
#[must_use]
pub fn shift_summary(regime: SmkVersion, shifts: &[MedicalShift], date: Date) -> ShiftSummary {
    let first: Date = week_start(date);
    let weekly_minutes: i64 =
        minutes_within(shifts.iter(), first, first.saturating_add(Duration::days(6)));

    let monthly_minutes: i64 = shifts
        .iter()
        .filter(|s| s.date.year() == date.year() && s.date.month() == date.month())
        .map(|s| s.duration.total_minutes())
        .sum();
    let monthly_minimum: i64 = monthly_minimum_hours(regime);

    ShiftSummary {
        week_start: first,
        weekly_minutes,
        weekly_limit_hours: WEEKLY_HOURS_LIMIT,
        exceeds_weekly_limit: weekly_minutes > WEEKLY_HOURS_LIMIT * 60,
        monthly_minutes,
        monthly_minimum_hours: monthly_minimum,
        below_monthly_minimum: monthly_minutes < monthly_minimum * 60,
        month_elapsed: date
            .next_day()
            .is_none_or(|next| next.month() != date.month()),
    }
}
