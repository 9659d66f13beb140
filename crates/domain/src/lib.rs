// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod internship;
mod medical_shift;
mod procedure;
mod progress;
mod specialization;
mod sync_status;
mod types;
mod validation;
mod year;

#[cfg(test)]
mod tests;

pub use internship::{Internship, InternshipChanges};
pub use medical_shift::{
    MedicalShift, NEW_MONTHLY_MINIMUM_HOURS, OLD_MONTHLY_MINIMUM_HOURS, ShiftDetails,
    ShiftDuration, ShiftSummary, WEEKLY_HOURS_LIMIT, check_shift_overlap, check_weekly_limit,
    monthly_minimum_hours, shift_summary, week_start,
};
pub use procedure::{
    NewSmkProcedure, OldSmkProcedure, OperatorCodes, OperatorGroups, PatientGender, Procedure,
    ProcedureCommon, ProcedureFields,
};
pub use progress::{
    COURSE_WEIGHT, CompletedCounts, GroupProgress, INTERNSHIP_WEIGHT, ModuleProgress,
    PROCEDURE_WEIGHT, ProcedureRequirement, RequirementProgress, SHIFT_WEIGHT, completion_ratio,
    compute_module_progress, compute_requirement_progress, unmet_requirements, weighted_progress,
};
pub use specialization::{Module, ModuleRequirements, Specialization};
pub use sync_status::{
    EditRejected, SyncStatus, SyncTracked, SyncTransition, apply_edit, apply_sync_transition,
    approve, mark_synced,
};
pub use year::{
    available_years, current_year, current_year_at, is_year_valid_for_module,
    is_year_valid_for_specialization, module_for_year, should_include_in_year_statistics,
};

// Re-export public types
pub use error::{DomainError, ErrorKind};
pub use types::{
    InternshipId, MAX_TRAINING_YEAR, MIN_TRAINING_YEAR, ModuleId, ProcedureId, RecordKind,
    ShiftId, SmkVersion, SpecializationId, UNASSIGNED_YEAR,
};
pub use validation::{
    MAX_LOCATION_LEN, validate_internship_dates, validate_internship_update,
    validate_medical_shift, validate_shift_location, validate_year_bounds,
};
