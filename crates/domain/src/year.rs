// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Training year derivation.
//!
//! The "current" training year is never stored. It is a pure function of
//! the specialization structure and the time elapsed since training began,
//! so callers must recompute it rather than cache it.

use crate::specialization::{Module, Specialization};
use crate::types::{MAX_TRAINING_YEAR, MIN_TRAINING_YEAR, SmkVersion, UNASSIGNED_YEAR};
use time::{Date, Duration};

/// Length of one training year, in days.
const DAYS_PER_TRAINING_YEAR: i64 = 365;

/// Returns the years a record may be assigned to.
///
/// Under the Old regime this is always `1..=6`. Under the New regime it is
/// the unassigned sentinel `0` followed by the active module's range; with no
/// active module only `0` is available.
#[must_use]
pub fn available_years(specialization: &Specialization) -> Vec<i32> {
    match specialization.smk_version() {
        SmkVersion::Old => (MIN_TRAINING_YEAR..=MAX_TRAINING_YEAR).collect(),
        SmkVersion::New => {
            let mut years: Vec<i32> = vec![UNASSIGNED_YEAR];
            if let Some(module) = specialization.active_module() {
                years.extend(module.min_year()..=module.max_year());
            }
            years
        }
    }
}

/// Checks a year against a module's configured range.
///
/// Year `0` (unassigned) is always valid. Negative years and years past the
/// last training year are never valid, whatever the module says.
#[must_use]
pub const fn is_year_valid_for_module(year: i32, module: &Module) -> bool {
    if year == UNASSIGNED_YEAR {
        return true;
    }
    if year < MIN_TRAINING_YEAR || year > MAX_TRAINING_YEAR {
        return false;
    }
    module.contains_year(year)
}

/// Checks a year against whatever range currently governs the specialization.
///
/// With an active module the module range applies. Without one, the Old
/// regime falls back to the flat `0..=6` rule, while the New regime accepts
/// only the unassigned year, matching [`available_years`].
#[must_use]
pub fn is_year_valid_for_specialization(year: i32, specialization: &Specialization) -> bool {
    match (specialization.active_module(), specialization.smk_version()) {
        (Some(module), _) => is_year_valid_for_module(year, module),
        (None, SmkVersion::Old) => (UNASSIGNED_YEAR..=MAX_TRAINING_YEAR).contains(&year),
        (None, SmkVersion::New) => year == UNASSIGNED_YEAR,
    }
}

/// Derives the current training year from time elapsed since training began.
///
/// Each started 365-day block is one year. The result is clipped to the
/// active module's range, or to `1..=6` when no module is active. Negative
/// elapsed time clips to the lower bound.
#[must_use]
pub fn current_year(specialization: &Specialization, elapsed: Duration) -> i32 {
    let (lower, upper) = specialization
        .active_module()
        .map_or((MIN_TRAINING_YEAR, MAX_TRAINING_YEAR), |m| {
            (m.min_year(), m.max_year())
        });

    let whole_years: i64 = elapsed.whole_days().div_euclid(DAYS_PER_TRAINING_YEAR);
    let raw: i64 = whole_years.saturating_add(1);

    // Clipped to at most 6, so the narrowing below cannot truncate.
    let clipped: i64 = raw.clamp(i64::from(lower), i64::from(upper));
    i32::try_from(clipped).unwrap_or(upper)
}

/// Derives the current training year as of a calendar date.
#[must_use]
pub fn current_year_at(specialization: &Specialization, date: Date) -> i32 {
    current_year(specialization, date - specialization.start_date())
}

/// Finds the module a training year belongs to.
///
/// Under the New regime modules are selected explicitly, so the active
/// module is returned regardless of the year. Under the Old regime the first
/// module (by ordinal) whose range contains the year is returned.
#[must_use]
pub fn module_for_year(year: i32, specialization: &Specialization) -> Option<&Module> {
    match specialization.smk_version() {
        SmkVersion::New => specialization.active_module(),
        SmkVersion::Old => specialization
            .modules()
            .iter()
            .find(|m| m.contains_year(year)),
    }
}

/// Decides whether a record belongs in statistics for a target year.
///
/// Unassigned records are counted toward every real year.
#[must_use]
pub const fn should_include_in_year_statistics(entity_year: i32, target_year: i32) -> bool {
    entity_year == target_year || (entity_year == UNASSIGNED_YEAR && target_year > UNASSIGNED_YEAR)
}
