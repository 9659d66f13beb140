// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::internship::InternshipChanges;
use crate::types::{MAX_TRAINING_YEAR, UNASSIGNED_YEAR, require_non_blank};
use time::Date;

/// Longest accepted shift location.
pub const MAX_LOCATION_LEN: usize = 100;

/// Validates a shift duration.
///
/// Neither component has an upper bound and minutes are not capped at 59:
/// raw accumulated minutes are accepted as recorded.
///
/// # Arguments
///
/// * `hours` - Whole hours worked
/// * `minutes` - Minutes worked in addition to `hours`
///
/// # Errors
///
/// Returns an error if:
/// - `hours` is negative
/// - `minutes` is negative
/// - Both are zero
pub fn validate_medical_shift(hours: i32, minutes: i32) -> Result<(), DomainError> {
    if hours < 0 {
        return Err(DomainError::invalid("hours", "cannot be negative"));
    }

    if minutes < 0 {
        return Err(DomainError::invalid("minutes", "cannot be negative"));
    }

    if hours == 0 && minutes == 0 {
        return Err(DomainError::InvalidField {
            field: "hours",
            reason: String::from("shift duration must be greater than zero"),
        });
    }

    Ok(())
}

/// Validates a shift location.
///
/// # Errors
///
/// Returns an error if the location is blank or longer than 100 characters.
pub fn validate_shift_location(location: &str) -> Result<(), DomainError> {
    require_non_blank("location", location)?;

    if location.chars().count() > MAX_LOCATION_LEN {
        return Err(DomainError::invalid(
            "location",
            format!("cannot exceed {MAX_LOCATION_LEN} characters"),
        ));
    }

    Ok(())
}

/// Validates a training year against the flat regime bounds `0..=6`.
///
/// Module-specific ranges are checked by the year calculator.
///
/// # Errors
///
/// Returns an error if the year is negative or greater than 6.
pub fn validate_year_bounds(year: i32) -> Result<(), DomainError> {
    if !(UNASSIGNED_YEAR..=MAX_TRAINING_YEAR).contains(&year) {
        return Err(DomainError::invalid(
            "year",
            format!("must be 0 (unassigned) or between 1 and {MAX_TRAINING_YEAR}, got {year}"),
        ));
    }
    Ok(())
}

/// Validates an internship's date range.
///
/// A single-day internship (`start == end`) is allowed.
///
/// # Errors
///
/// Returns an error if the start date falls after the end date.
pub fn validate_internship_dates(start_date: Date, end_date: Date) -> Result<(), DomainError> {
    if start_date > end_date {
        return Err(DomainError::invalid(
            "end_date",
            format!("end date {end_date} is before start date {start_date}"),
        ));
    }
    Ok(())
}

/// Validates an internship update.
///
/// # Arguments
///
/// * `start_date` - The requested start date
/// * `end_date` - The requested end date
/// * `other` - Any other fields being changed
///
/// # Errors
///
/// Returns an error if:
/// - The start date falls after the end date
/// - A supplied institution, department or supervisor name is blank
pub fn validate_internship_update(
    start_date: Date,
    end_date: Date,
    other: &InternshipChanges,
) -> Result<(), DomainError> {
    validate_internship_dates(start_date, end_date)?;

    if let Some(institution) = &other.institution_name {
        require_non_blank("institution_name", institution)?;
    }
    if let Some(department) = &other.department_name {
        require_non_blank("department_name", department)?;
    }
    if let Some(supervisor) = &other.supervisor_name {
        require_non_blank("supervisor_name", supervisor)?;
    }

    Ok(())
}
