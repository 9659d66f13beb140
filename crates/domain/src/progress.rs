// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Module completion statistics.
//!
//! Progress is derived on demand from accepted records and is never stored.
//! Each of the four sources yields a ratio in `[0, 1]`; the overall figure is
//! their fixed weighted sum. Procedure catalogues may also set per-code
//! minimums, tracked separately by [`compute_requirement_progress`].

use crate::internship::Internship;
use crate::medical_shift::MedicalShift;
use crate::procedure::{OperatorGroups, Procedure};
use crate::specialization::{Module, ModuleRequirements};
use crate::types::ModuleId;
use serde::{Deserialize, Serialize};

/// Share of the overall figure contributed by completed internships.
pub const INTERNSHIP_WEIGHT: f64 = 0.35;
/// Share of the overall figure contributed by completed courses.
pub const COURSE_WEIGHT: f64 = 0.25;
/// Share of the overall figure contributed by procedures.
pub const PROCEDURE_WEIGHT: f64 = 0.30;
/// Share of the overall figure contributed by duty hours.
pub const SHIFT_WEIGHT: f64 = 0.10;

/// Returns `completed / required`, capped at `1.0`.
///
/// A zero requirement is already satisfied and yields `1.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completion_ratio(completed: u64, required: u64) -> f64 {
    if required == 0 {
        return 1.0;
    }
    (completed as f64 / required as f64).min(1.0)
}

/// Combines four sub-progress ratios into the overall weighted ratio.
///
/// Inputs are clamped to `[0, 1]` first.
#[must_use]
pub fn weighted_progress(internships: f64, courses: f64, procedures: f64, shifts: f64) -> f64 {
    INTERNSHIP_WEIGHT * internships.clamp(0.0, 1.0)
        + COURSE_WEIGHT * courses.clamp(0.0, 1.0)
        + PROCEDURE_WEIGHT * procedures.clamp(0.0, 1.0)
        + SHIFT_WEIGHT * shifts.clamp(0.0, 1.0)
}

/// Ratio expressed as a percentage rounded to two decimals.
fn as_percent(ratio: f64) -> f64 {
    (ratio * 10_000.0).round() / 100.0
}

/// Completed totals for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletedCounts {
    pub internships: u32,
    pub courses: u32,
    pub procedures_a: u32,
    pub procedures_b: u32,
    pub shift_minutes: u64,
}

impl CompletedCounts {
    /// Tallies completed totals from accepted records.
    ///
    /// Courses are not modelled as records here and are passed in as a count.
    /// Only internships flagged as completed are counted. Old-regime
    /// procedures count toward the group their operator code maps to in
    /// `groups`. Callers are expected to pass records already scoped to the
    /// module.
    #[must_use]
    pub fn tally(
        internships: &[Internship],
        procedures: &[Procedure],
        shifts: &[MedicalShift],
        completed_courses: u32,
        groups: &OperatorGroups,
    ) -> Self {
        let completed_internships: usize =
            internships.iter().filter(|i| i.is_completed()).count();

        let (procedures_a, procedures_b) = procedures
            .iter()
            .map(|p| p.group_counts(groups))
            .fold((0_u32, 0_u32), |(a, b), (da, db)| {
                (a.saturating_add(da), b.saturating_add(db))
            });

        let shift_minutes: i64 = shifts
            .iter()
            .map(|s| s.duration().total_minutes())
            .sum();

        Self {
            internships: u32::try_from(completed_internships).unwrap_or(u32::MAX),
            courses: completed_courses,
            procedures_a,
            procedures_b,
            shift_minutes: u64::try_from(shift_minutes).unwrap_or_default(),
        }
    }
}

/// Progress of one procedure group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupProgress {
    pub completed: u32,
    pub required: u32,
    pub ratio: f64,
    pub percent: f64,
}

impl GroupProgress {
    fn new(completed: u32, required: u32) -> Self {
        let ratio: f64 = completion_ratio(u64::from(completed), u64::from(required));
        Self {
            completed,
            required,
            ratio,
            percent: as_percent(ratio),
        }
    }
}

/// A module's completion snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub module: ModuleId,
    /// Procedures performed as operator.
    pub procedures_a: GroupProgress,
    /// Procedures performed as assistant.
    pub procedures_b: GroupProgress,
    pub procedure_ratio: f64,
    pub procedure_percent: f64,
    pub internship_ratio: f64,
    pub course_ratio: f64,
    pub shift_ratio: f64,
    pub overall: f64,
    pub overall_percent: f64,
}

impl ModuleProgress {
    /// Returns true once every requirement is met, each procedure group
    /// included.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            self.procedures_a.ratio,
            self.procedures_b.ratio,
            self.procedure_ratio,
            self.internship_ratio,
            self.course_ratio,
            self.shift_ratio,
        ]
        .iter()
        .all(|ratio| *ratio >= 1.0)
    }
}

/// Combined procedure ratio for both groups.
///
/// All completed procedures count against the combined requirement, so a
/// surplus in one group raises the ratio. Shortfalls in a single group show
/// in the per-group figures.
fn procedure_ratio(completed: &CompletedCounts, required: &ModuleRequirements) -> f64 {
    let required_total: u64 = u64::from(required.procedures_a) + u64::from(required.procedures_b);
    let completed_total: u64 =
        u64::from(completed.procedures_a) + u64::from(completed.procedures_b);
    completion_ratio(completed_total, required_total)
}

/// Computes a module's progress from its completed totals.
///
/// # Arguments
///
/// * `module` - The module whose requirements apply
/// * `completed` - Completed totals within that module
///
/// # Returns
///
/// Per-group and per-source ratios and the overall weighted figure.
#[must_use]
pub fn compute_module_progress(module: &Module, completed: &CompletedCounts) -> ModuleProgress {
    let required: &ModuleRequirements = module.requirements();

    let procedures_a: GroupProgress =
        GroupProgress::new(completed.procedures_a, required.procedures_a);
    let procedures_b: GroupProgress =
        GroupProgress::new(completed.procedures_b, required.procedures_b);
    let procedure: f64 = procedure_ratio(completed, required);

    let internship: f64 = completion_ratio(
        u64::from(completed.internships),
        u64::from(required.internships),
    );
    let course: f64 = completion_ratio(u64::from(completed.courses), u64::from(required.courses));
    let shift: f64 = completion_ratio(
        completed.shift_minutes,
        u64::from(required.shift_hours) * 60,
    );

    let overall: f64 = weighted_progress(internship, course, procedure, shift);

    ModuleProgress {
        module: module.id(),
        procedures_a,
        procedures_b,
        procedure_ratio: procedure,
        procedure_percent: as_percent(procedure),
        internship_ratio: internship,
        course_ratio: course,
        shift_ratio: shift,
        overall,
        overall_percent: as_percent(overall),
    }
}

/// Minimum counts for one catalogue procedure code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureRequirement {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub minimum_a: u32,
    #[serde(default)]
    pub minimum_b: u32,
    /// Combined minimum. The effective combined target is never below
    /// `minimum_a + minimum_b`.
    #[serde(default)]
    pub minimum_total: u32,
}

impl ProcedureRequirement {
    /// The combined count the ratio is measured against.
    #[must_use]
    pub fn required_total(&self) -> u64 {
        u64::from(self.minimum_total).max(u64::from(self.minimum_a) + u64::from(self.minimum_b))
    }
}

/// Progress toward one [`ProcedureRequirement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementProgress {
    pub code: String,
    pub name: String,
    pub completed_a: u32,
    pub completed_b: u32,
    pub total_completed: u32,
    pub ratio: f64,
    pub percent: f64,
    pub is_met: bool,
    /// Group A procedures still needed.
    pub missing_a: u32,
    /// Group B procedures still needed.
    pub missing_b: u32,
}

impl RequirementProgress {
    /// Describes each group shortfall, e.g. "missing 3 procedures as operator (A)".
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = Vec::new();
        if self.missing_a > 0 {
            messages.push(format!(
                "missing {} procedures as operator (A)",
                self.missing_a
            ));
        }
        if self.missing_b > 0 {
            messages.push(format!(
                "missing {} procedures as assistant (B)",
                self.missing_b
            ));
        }
        messages
    }
}

/// Measures procedures against one per-code requirement.
///
/// Only procedures whose code matches the requirement are counted. Old-regime
/// records count once in the group `groups` maps their operator code to, and
/// New-regime records contribute their aggregate counts.
#[must_use]
pub fn compute_requirement_progress(
    requirement: &ProcedureRequirement,
    procedures: &[Procedure],
    groups: &OperatorGroups,
) -> RequirementProgress {
    let code: &str = requirement.code.trim();
    let (completed_a, completed_b) = procedures
        .iter()
        .filter(|p| p.common().code == code)
        .map(|p| p.group_counts(groups))
        .fold((0_u32, 0_u32), |(a, b), (da, db)| {
            (a.saturating_add(da), b.saturating_add(db))
        });
    let total_completed: u32 = completed_a.saturating_add(completed_b);
    let ratio: f64 = completion_ratio(u64::from(total_completed), requirement.required_total());

    RequirementProgress {
        code: code.to_string(),
        name: requirement.name.clone(),
        completed_a,
        completed_b,
        total_completed,
        ratio,
        percent: as_percent(ratio),
        is_met: completed_a >= requirement.minimum_a
            && completed_b >= requirement.minimum_b
            && total_completed >= requirement.minimum_total,
        missing_a: requirement.minimum_a.saturating_sub(completed_a),
        missing_b: requirement.minimum_b.saturating_sub(completed_b),
    }
}

/// Progress toward every requirement that is not yet met, in catalogue order.
#[must_use]
pub fn unmet_requirements(
    requirements: &[ProcedureRequirement],
    procedures: &[Procedure],
    groups: &OperatorGroups,
) -> Vec<RequirementProgress> {
    requirements
        .iter()
        .map(|requirement| compute_requirement_progress(requirement, procedures, groups))
        .filter(|progress| !progress.is_met)
        .collect()
}
