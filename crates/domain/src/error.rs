// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{ModuleId, RecordKind, ShiftId, SmkVersion, SpecializationId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;

/// Broad classification of a domain failure.
///
/// Callers use this to decide presentation: a validation failure points at
/// fields, a state conflict at the record's lifecycle, and a structural
/// inconsistency at the module/specialization pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A field value broke a rule.
    Validation,
    /// The record is approved and no longer editable.
    StateConflict,
    /// The module structure does not fit the request.
    StructuralInconsistency,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::StateConflict => write!(f, "state_conflict"),
            Self::StructuralInconsistency => write!(f, "structural_inconsistency"),
        }
    }
}

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A single field holds a value the rules do not allow.
    #[error("Invalid {field}: {reason}")]
    InvalidField {
        /// The offending field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
    /// Fields exclusive to the other regime were supplied.
    #[error(
        "Fields not permitted under the {regime} regime: {}",
        .fields.join(", ")
    )]
    ForeignRegimeFields {
        /// The regime the record is being validated under.
        regime: SmkVersion,
        /// Every foreign field that carried a non-default value.
        fields: Vec<&'static str>,
    },
    /// A New-regime aggregate carries no counted procedures.
    #[error("At least one of count_a or count_b must be greater than zero")]
    EmptyAggregate,
    /// An edit was attempted on an approved record.
    #[error("{record} is approved and cannot be modified")]
    ApprovedRecord {
        /// The kind of record that was targeted.
        record: RecordKind,
    },
    /// A New-regime procedure was submitted while no module is active.
    #[error(
        "No current module selected for specialization {specialization}: procedures cannot be added without an active module"
    )]
    NoActiveModule {
        /// The specialization without an active module.
        specialization: SpecializationId,
    },
    /// A procedure targets a module other than the active one.
    #[error(
        "Procedure belongs to module {procedure_module} but current module is {active_module} (specialization {specialization})"
    )]
    ModuleMismatch {
        /// The owning specialization.
        specialization: SpecializationId,
        /// The module named by the procedure.
        procedure_module: ModuleId,
        /// The specialization's active module.
        active_module: ModuleId,
    },
    /// A module reference does not belong to the specialization.
    #[error("Module {module} is not part of specialization {specialization}")]
    UnknownModule {
        /// The specialization searched.
        specialization: SpecializationId,
        /// The missing module.
        module: ModuleId,
    },
    /// A module was configured for a different regime than its specialization.
    #[error(
        "Module {module} uses the {module_regime} regime but specialization {specialization} uses {specialization_regime}"
    )]
    RegimeMismatch {
        /// The specialization.
        specialization: SpecializationId,
        /// The offending module.
        module: ModuleId,
        /// The module's regime.
        module_regime: SmkVersion,
        /// The specialization's regime.
        specialization_regime: SmkVersion,
    },
    /// A stored procedure was recorded under a different regime than its specialization.
    #[error(
        "Procedure was recorded under the {procedure_regime} regime but specialization {specialization} uses {specialization_regime}"
    )]
    ProcedureRegimeMismatch {
        /// The specialization.
        specialization: SpecializationId,
        /// The regime of the stored procedure.
        procedure_regime: SmkVersion,
        /// The specialization's regime.
        specialization_regime: SmkVersion,
    },
    /// A module's training-year range is empty or outside `1..=6`.
    #[error("Module {module} has an invalid year range {min_year}..={max_year}")]
    InvalidModuleYearRange {
        /// The offending module.
        module: ModuleId,
        /// Configured lower bound.
        min_year: i32,
        /// Configured upper bound.
        max_year: i32,
    },
    /// A shift overlaps a shift already on record.
    #[error("Shift on {date} overlaps existing shift {existing}")]
    ShiftOverlap {
        /// Start date of the shift being checked.
        date: Date,
        /// The shift it collides with.
        existing: ShiftId,
    },
    /// Adding a shift would push its week past the weekly duty limit.
    #[error(
        "Week starting {week_start} would total {total_minutes} minutes, over the {limit_hours} hour limit"
    )]
    WeeklyLimitExceeded {
        /// Monday of the affected week.
        week_start: Date,
        /// Minutes in that week including the new shift.
        total_minutes: i64,
        /// The weekly limit, in hours.
        limit_hours: i64,
    },
    /// A module was entered before the one preceding it was complete.
    #[error(
        "Module {module} of specialization {specialization} is locked until module {prerequisite} is complete"
    )]
    ModuleProgressionBlocked {
        /// The owning specialization.
        specialization: SpecializationId,
        /// The module that was requested.
        module: ModuleId,
        /// The module that must be completed first.
        prerequisite: ModuleId,
    },
    /// The same module id appears twice in one specialization.
    #[error("Module {module} appears more than once in specialization {specialization}")]
    DuplicateModule {
        /// The specialization.
        specialization: SpecializationId,
        /// The duplicated module.
        module: ModuleId,
    },
}

impl DomainError {
    /// Builds an `InvalidField` error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidField { .. }
            | Self::ForeignRegimeFields { .. }
            | Self::EmptyAggregate
            | Self::ShiftOverlap { .. }
            | Self::WeeklyLimitExceeded { .. } => ErrorKind::Validation,
            Self::ApprovedRecord { .. } => ErrorKind::StateConflict,
            Self::NoActiveModule { .. }
            | Self::ModuleMismatch { .. }
            | Self::UnknownModule { .. }
            | Self::RegimeMismatch { .. }
            | Self::ProcedureRegimeMismatch { .. }
            | Self::InvalidModuleYearRange { .. }
            | Self::ModuleProgressionBlocked { .. }
            | Self::DuplicateModule { .. } => ErrorKind::StructuralInconsistency,
        }
    }

    /// Returns the names of the fields the error is about.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidField { field, .. } => vec![*field],
            Self::ForeignRegimeFields { fields, .. } => fields.clone(),
            Self::EmptyAggregate => vec!["count_a", "count_b"],
            Self::ApprovedRecord { .. } => vec!["sync_status"],
            Self::ShiftOverlap { .. } => vec!["date"],
            Self::WeeklyLimitExceeded { .. } => vec!["hours", "minutes"],
            Self::NoActiveModule { .. } | Self::ModuleProgressionBlocked { .. } => {
                vec!["active_module"]
            }
            Self::ModuleMismatch { .. } | Self::UnknownModule { .. } | Self::DuplicateModule { .. } => {
                vec!["module_id"]
            }
            Self::RegimeMismatch { .. } | Self::ProcedureRegimeMismatch { .. } => {
                vec!["smk_version"]
            }
            Self::InvalidModuleYearRange { .. } => vec!["min_year", "max_year"],
        }
    }
}
