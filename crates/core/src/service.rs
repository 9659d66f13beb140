// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The validation service.
//!
//! The service combines the record-local rules of the domain crate with the
//! checks that need the owning specialization: the active module, the
//! regime, and the year range currently in force. Checks that span several
//! records (shift overlap, weekly duty totals, module progression) take the
//! related records as arguments. The service holds only immutable
//! configuration and never stores records, so a single instance may be
//! shared freely between callers.

use crate::config::EngineConfig;
use crate::error::CoreError;
use sledz_domain::{
    CompletedCounts, DomainError, Internship, InternshipChanges, MedicalShift, Module, ModuleId,
    ModuleProgress, Procedure, ProcedureFields, ProcedureRequirement, RequirementProgress,
    ShiftDetails, ShiftDuration, ShiftId, ShiftSummary, SmkVersion, Specialization, SyncTracked,
    SyncTransition, check_shift_overlap, check_weekly_limit, compute_module_progress,
    compute_requirement_progress, is_year_valid_for_specialization, shift_summary,
    unmet_requirements, validate_internship_update, validate_medical_shift,
};
use time::Date;
use tracing::{debug, warn};

/// Validates candidate and edited training records.
#[derive(Debug, Clone, Default)]
pub struct ValidationService {
    config: EngineConfig,
}

/// Logs a rejected request and lifts it into a `CoreError`.
fn rejected(operation: &'static str, err: DomainError) -> CoreError {
    warn!(
        operation,
        kind = %err.kind(),
        fields = ?err.fields(),
        reason = %err,
        "Rejected record"
    );
    CoreError::DomainViolation(err)
}

/// Fails if the record is approved.
fn ensure_editable<R: SyncTracked>(record: &R) -> Result<(), DomainError> {
    if record.sync_status().is_read_only() {
        Err(DomainError::ApprovedRecord { record: R::KIND })
    } else {
        Ok(())
    }
}

/// Fails unless a New-regime specialization has an active module.
fn require_active_module(specialization: &Specialization) -> Result<&Module, DomainError> {
    specialization
        .active_module()
        .ok_or(DomainError::NoActiveModule {
            specialization: specialization.id(),
        })
}

/// Checks a New-regime module reference against the specialization.
fn check_module_reference(
    specialization: &Specialization,
    module_id: ModuleId,
) -> Result<(), DomainError> {
    let active: &Module = require_active_module(specialization)?;

    if specialization.module(module_id).is_none() {
        return Err(DomainError::UnknownModule {
            specialization: specialization.id(),
            module: module_id,
        });
    }

    if module_id != active.id() {
        return Err(DomainError::ModuleMismatch {
            specialization: specialization.id(),
            procedure_module: module_id,
            active_module: active.id(),
        });
    }

    Ok(())
}

/// Checks a training year against the range in force for the specialization.
fn check_year(specialization: &Specialization, year: i32) -> Result<(), DomainError> {
    if is_year_valid_for_specialization(year, specialization) {
        return Ok(());
    }

    let reason: String = specialization.active_module().map_or_else(
        || match specialization.smk_version() {
            SmkVersion::Old => format!("year {year} is outside 0..=6"),
            SmkVersion::New => {
                format!("year {year} cannot be assigned until a module is active")
            }
        },
        |module| {
            format!(
                "year {year} is outside the range {}..={} of module {}",
                module.min_year(),
                module.max_year(),
                module.id()
            )
        },
    );
    Err(DomainError::invalid("year", reason))
}

/// Fails unless a stored procedure was recorded under the specialization's regime.
fn check_regime(specialization: &Specialization, procedure: &Procedure) -> Result<(), DomainError> {
    if procedure.smk_version() == specialization.smk_version() {
        Ok(())
    } else {
        Err(DomainError::ProcedureRegimeMismatch {
            specialization: specialization.id(),
            procedure_regime: procedure.smk_version(),
            specialization_regime: specialization.smk_version(),
        })
    }
}

/// Checks where a validated procedure sits within the specialization.
fn check_placement(specialization: &Specialization, procedure: &Procedure) -> Result<(), DomainError> {
    check_regime(specialization, procedure)?;
    match procedure {
        Procedure::New(p) => check_module_reference(specialization, p.module_id()),
        Procedure::Old(p) => check_year(specialization, p.year()),
    }
}

#[allow(clippy::unused_self)]
impl ValidationService {
    /// Creates a service with the given configuration.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates a candidate procedure for a specialization.
    ///
    /// # Arguments
    ///
    /// * `specialization` - The owning specialization; its regime selects the record shape
    /// * `fields` - The candidate field values
    ///
    /// # Returns
    ///
    /// The validated procedure, tagged `NotSynced`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - New regime: no module is active, or the procedure names another module
    /// - Any field exclusive to the other regime is set
    /// - Any record-level rule fails
    /// - Old regime: the year is outside the range in force
    pub fn validate_procedure(
        &self,
        specialization: &Specialization,
        fields: &ProcedureFields,
    ) -> Result<Procedure, CoreError> {
        debug!(
            specialization = %specialization.id(),
            regime = %specialization.smk_version(),
            "Validating procedure"
        );

        if specialization.smk_version() == SmkVersion::New {
            require_active_module(specialization)
                .map_err(|err| rejected("validate_procedure", err))?;
        }

        let procedure: Procedure = Procedure::from_fields(
            specialization.smk_version(),
            &self.config.operator_codes,
            fields,
        )
        .map_err(|err| rejected("validate_procedure", err))?;

        check_placement(specialization, &procedure)
            .map_err(|err| rejected("validate_procedure", err))?;

        debug!(
            specialization = %specialization.id(),
            module = ?procedure.module_id(),
            "Procedure accepted"
        );
        Ok(procedure)
    }

    /// Applies a general update to a stored procedure.
    ///
    /// The merged record is checked against the specialization before it is
    /// committed; on error the procedure is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the procedure belongs to another regime, is
    /// approved, or the merged record fails any rule `validate_procedure`
    /// applies.
    pub fn update_procedure(
        &self,
        specialization: &Specialization,
        procedure: &mut Procedure,
        changes: &ProcedureFields,
    ) -> Result<SyncTransition, CoreError> {
        debug!(
            specialization = %specialization.id(),
            procedure = ?procedure.id(),
            "Updating procedure"
        );

        let mut staged: Procedure = procedure.clone();
        let transition: SyncTransition = ensure_editable(&staged)
            .and_then(|()| check_regime(specialization, &staged))
            .and_then(|()| {
                if specialization.smk_version() == SmkVersion::New {
                    require_active_module(specialization)?;
                }
                staged.apply_fields(&self.config.operator_codes, changes)
            })
            .and_then(|transition| {
                check_placement(specialization, &staged)?;
                Ok(transition)
            })
            .map_err(|err| rejected("update_procedure", err))?;

        *procedure = staged;
        debug!(from = %transition.from, to = %transition.to, "Procedure updated");
        Ok(transition)
    }

    /// Replaces the aggregate counts of a New-regime procedure.
    ///
    /// # Errors
    ///
    /// Returns an error if the procedure is not a New-regime aggregate, its
    /// module is not the active one, it is approved, or the counts are
    /// invalid.
    pub fn update_procedure_counts(
        &self,
        specialization: &Specialization,
        procedure: &mut Procedure,
        count_a: i32,
        count_b: i32,
    ) -> Result<SyncTransition, CoreError> {
        debug!(
            specialization = %specialization.id(),
            procedure = ?procedure.id(),
            count_a,
            count_b,
            "Updating procedure counts"
        );

        ensure_editable(&*procedure)
            .and_then(|()| check_placement(specialization, procedure))
            .map_err(|err| rejected("update_procedure_counts", err))?;

        let transition: SyncTransition = match procedure {
            Procedure::New(p) => p.update_counts(count_a, count_b),
            Procedure::Old(_) => Err(DomainError::ForeignRegimeFields {
                regime: SmkVersion::Old,
                fields: vec!["count_a", "count_b"],
            }),
        }
        .map_err(|err| rejected("update_procedure_counts", err))?;

        Ok(transition)
    }

    /// Returns the procedures visible in the current listing.
    ///
    /// Under the New regime only procedures of the active module are shown,
    /// and nothing is shown while no module is active. The Old regime is
    /// not scoped by module.
    #[must_use]
    pub fn visible_procedures<'a>(
        &self,
        specialization: &Specialization,
        procedures: &'a [Procedure],
    ) -> Vec<&'a Procedure> {
        match specialization.smk_version() {
            SmkVersion::Old => procedures.iter().collect(),
            SmkVersion::New => {
                let active: Option<ModuleId> = specialization.active_module_id();
                procedures
                    .iter()
                    .filter(|p| active.is_some() && p.module_id() == active)
                    .collect()
            }
        }
    }

    /// Validates a shift duration on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is negative or both are zero.
    pub fn validate_medical_shift(&self, hours: i32, minutes: i32) -> Result<(), CoreError> {
        validate_medical_shift(hours, minutes)
            .map_err(|err| rejected("validate_medical_shift", err))
    }

    /// Validates a full shift against the specialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration or location is invalid, or the year
    /// is outside the range in force.
    pub fn validate_shift(
        &self,
        specialization: &Specialization,
        details: &ShiftDetails,
    ) -> Result<ShiftDuration, CoreError> {
        debug!(
            specialization = %specialization.id(),
            hours = details.hours,
            minutes = details.minutes,
            year = details.year,
            "Validating medical shift"
        );

        details
            .validate()
            .and_then(|duration| {
                check_year(specialization, details.year)?;
                Ok(duration)
            })
            .map_err(|err| rejected("validate_shift", err))
    }

    /// Validates and creates a shift record.
    ///
    /// # Errors
    ///
    /// Returns an error under the same rules as [`ValidationService::validate_shift`].
    pub fn create_shift(
        &self,
        specialization: &Specialization,
        id: ShiftId,
        details: &ShiftDetails,
    ) -> Result<MedicalShift, CoreError> {
        self.validate_shift(specialization, details)?;
        MedicalShift::new(id, details).map_err(|err| rejected("create_shift", err))
    }

    /// Applies an edit to a stored shift.
    ///
    /// # Errors
    ///
    /// Returns an error if the shift is approved or the new details are invalid.
    pub fn update_shift(
        &self,
        specialization: &Specialization,
        shift: &mut MedicalShift,
        details: &ShiftDetails,
    ) -> Result<SyncTransition, CoreError> {
        ensure_editable(&*shift)
            .and_then(|()| check_year(specialization, details.year))
            .map_err(|err| rejected("update_shift", err))?;
        let transition: SyncTransition =
            shift.update(details).map_err(|err| rejected("update_shift", err))?;
        debug!(shift = %shift.id(), from = %transition.from, to = %transition.to, "Shift updated");
        Ok(transition)
    }

    /// Validates an internship update without applying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the start date falls after the end date or a
    /// supplied name is blank.
    pub fn validate_internship_update(
        &self,
        start_date: Date,
        end_date: Date,
        changes: &InternshipChanges,
    ) -> Result<(), CoreError> {
        validate_internship_update(start_date, end_date, changes)
            .map_err(|err| rejected("validate_internship_update", err))
    }

    /// Validates and applies an internship update.
    ///
    /// # Errors
    ///
    /// Returns an error if the internship is approved, the update is invalid,
    /// or a module reassignment names a module outside the specialization.
    pub fn update_internship(
        &self,
        specialization: &Specialization,
        internship: &mut Internship,
        start_date: Date,
        end_date: Date,
        changes: &InternshipChanges,
    ) -> Result<SyncTransition, CoreError> {
        debug!(
            specialization = %specialization.id(),
            internship = %internship.id(),
            "Updating internship"
        );

        ensure_editable(&*internship).map_err(|err| rejected("update_internship", err))?;

        if let Some(module_id) = changes
            .module_id
            .filter(|id| specialization.module(*id).is_none())
        {
            return Err(rejected(
                "update_internship",
                DomainError::UnknownModule {
                    specialization: specialization.id(),
                    module: module_id,
                },
            ));
        }

        let transition: SyncTransition = internship
            .apply_update(start_date, end_date, changes)
            .map_err(|err| rejected("update_internship", err))?;
        debug!(from = %transition.from, to = %transition.to, "Internship updated");
        Ok(transition)
    }

    /// Computes progress for one module of a specialization.
    ///
    /// # Errors
    ///
    /// Returns an error if the module does not belong to the specialization.
    pub fn module_progress(
        &self,
        specialization: &Specialization,
        module_id: ModuleId,
        completed: &CompletedCounts,
    ) -> Result<ModuleProgress, CoreError> {
        let module: &Module = specialization.module(module_id).ok_or_else(|| {
            rejected(
                "module_progress",
                DomainError::UnknownModule {
                    specialization: specialization.id(),
                    module: module_id,
                },
            )
        })?;

        let progress: ModuleProgress = compute_module_progress(module, completed);
        debug!(
            module = %module_id,
            overall_percent = progress.overall_percent,
            "Computed module progress"
        );
        Ok(progress)
    }

    /// Fails if a shift overlaps any other shift on record.
    ///
    /// # Errors
    ///
    /// Returns `ShiftOverlap` naming the first colliding shift.
    pub fn check_shift_overlap(
        &self,
        shift: &MedicalShift,
        existing: &[MedicalShift],
    ) -> Result<(), CoreError> {
        check_shift_overlap(shift, existing).map_err(|err| rejected("check_shift_overlap", err))
    }

    /// Checks that a shift keeps its week within the weekly duty limit.
    ///
    /// # Returns
    ///
    /// The week's total in minutes, including the shift.
    ///
    /// # Errors
    ///
    /// Returns `WeeklyLimitExceeded` if the total is over the limit.
    pub fn check_weekly_limit(
        &self,
        shift: &MedicalShift,
        existing: &[MedicalShift],
    ) -> Result<i64, CoreError> {
        let total_minutes: i64 =
            check_weekly_limit(shift, existing).map_err(|err| rejected("check_weekly_limit", err))?;
        debug!(shift = %shift.id(), total_minutes, "Weekly duty total within limit");
        Ok(total_minutes)
    }

    /// Checks a shift against the shifts already on record: overlap first,
    /// then the weekly limit.
    ///
    /// # Errors
    ///
    /// Returns the first failing check's error.
    pub fn check_shift_schedule(
        &self,
        shift: &MedicalShift,
        existing: &[MedicalShift],
    ) -> Result<(), CoreError> {
        self.check_shift_overlap(shift, existing)?;
        self.check_weekly_limit(shift, existing)?;
        Ok(())
    }

    /// Weekly and monthly duty totals around a date, against the limits of
    /// the specialization's regime.
    #[must_use]
    pub fn shift_summary(
        &self,
        specialization: &Specialization,
        shifts: &[MedicalShift],
        date: Date,
    ) -> ShiftSummary {
        let summary: ShiftSummary = shift_summary(specialization.smk_version(), shifts, date);
        if summary.exceeds_weekly_limit {
            warn!(
                specialization = %specialization.id(),
                week_start = %summary.week_start,
                weekly_minutes = summary.weekly_minutes,
                "Weekly duty limit exceeded"
            );
        }
        if summary.missed_monthly_minimum() {
            warn!(
                specialization = %specialization.id(),
                monthly_minutes = summary.monthly_minutes,
                minimum_hours = summary.monthly_minimum_hours,
                "Monthly duty minimum missed"
            );
        }
        summary
    }

    /// Decides whether training may move on to `target`.
    ///
    /// The first module is always open. Any later module requires the module
    /// ordered before it to be complete, judged by `prerequisite_progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `target` is not part of the specialization
    /// - `prerequisite_progress` was computed for a module other than the prerequisite
    /// - The prerequisite module is not complete
    pub fn can_progress_to_module(
        &self,
        specialization: &Specialization,
        target: ModuleId,
        prerequisite_progress: &ModuleProgress,
    ) -> Result<(), CoreError> {
        if specialization.module(target).is_none() {
            return Err(rejected(
                "can_progress_to_module",
                DomainError::UnknownModule {
                    specialization: specialization.id(),
                    module: target,
                },
            ));
        }

        let Some(prerequisite) = specialization.preceding_module(target) else {
            return Ok(());
        };

        if prerequisite_progress.module != prerequisite.id() {
            return Err(rejected(
                "can_progress_to_module",
                DomainError::invalid(
                    "module",
                    format!(
                        "progress is for module {} but module {} must be complete first",
                        prerequisite_progress.module,
                        prerequisite.id()
                    ),
                ),
            ));
        }

        if !prerequisite_progress.is_complete() {
            return Err(rejected(
                "can_progress_to_module",
                DomainError::ModuleProgressionBlocked {
                    specialization: specialization.id(),
                    module: target,
                    prerequisite: prerequisite.id(),
                },
            ));
        }

        Ok(())
    }

    /// Makes `target` the active module once progression to it is allowed.
    ///
    /// # Errors
    ///
    /// Returns an error under the rules of [`ValidationService::can_progress_to_module`].
    /// The specialization is unchanged on error.
    pub fn progress_to_module(
        &self,
        specialization: &mut Specialization,
        target: ModuleId,
        prerequisite_progress: &ModuleProgress,
    ) -> Result<(), CoreError> {
        self.can_progress_to_module(specialization, target, prerequisite_progress)?;
        specialization
            .set_active_module(target)
            .map_err(|err| rejected("progress_to_module", err))?;
        debug!(
            specialization = %specialization.id(),
            module = %target,
            "Active module changed"
        );
        Ok(())
    }

    /// Tallies completed totals, counting Old-regime procedures by the
    /// configured operator groups.
    #[must_use]
    pub fn completed_counts(
        &self,
        internships: &[Internship],
        procedures: &[Procedure],
        shifts: &[MedicalShift],
        completed_courses: u32,
    ) -> CompletedCounts {
        CompletedCounts::tally(
            internships,
            procedures,
            shifts,
            completed_courses,
            &self.config.operator_groups,
        )
    }

    /// Measures procedures against each per-code requirement of a catalogue.
    #[must_use]
    pub fn procedure_requirements(
        &self,
        requirements: &[ProcedureRequirement],
        procedures: &[Procedure],
    ) -> Vec<RequirementProgress> {
        requirements
            .iter()
            .map(|requirement| {
                compute_requirement_progress(requirement, procedures, &self.config.operator_groups)
            })
            .collect()
    }

    /// The catalogue requirements not yet met, with their shortfalls.
    #[must_use]
    pub fn unmet_procedure_requirements(
        &self,
        requirements: &[ProcedureRequirement],
        procedures: &[Procedure],
    ) -> Vec<RequirementProgress> {
        let unmet: Vec<RequirementProgress> =
            unmet_requirements(requirements, procedures, &self.config.operator_groups);
        debug!(
            requirements = requirements.len(),
            unmet = unmet.len(),
            "Checked procedure requirements"
        );
        unmet
    }
}
