// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Clinical procedure records.
//!
//! A procedure takes one of two shapes depending on the owning
//! specialization's regime. Old-regime procedures describe a single patient
//! encounter; New-regime procedures are aggregated counts within a module.
//! The shapes share only a handful of common fields and each rejects the
//! other's fields outright.

use crate::error::DomainError;
use crate::sync_status::{SyncStatus, SyncTracked, SyncTransition, apply_edit};
use crate::types::{ModuleId, ProcedureId, RecordKind, SmkVersion, is_blank, require_non_blank};
use crate::validation::validate_year_bounds;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::Date;

/// Operator codes permitted for Old-regime procedures.
///
/// Codes are compared case-insensitively and are stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct OperatorCodes(BTreeSet<String>);

impl OperatorCodes {
    /// Builds a permitted code set.
    ///
    /// # Errors
    ///
    /// Returns an error if a code is blank or the set is empty.
    pub fn new<I, S>(codes: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: BTreeSet<String> = BTreeSet::new();
        for code in codes {
            let code: &str = code.as_ref();
            require_non_blank("operator_codes", code)?;
            set.insert(Self::normalize(code));
        }

        if set.is_empty() {
            return Err(DomainError::invalid(
                "operator_codes",
                "at least one permitted operator code is required",
            ));
        }

        Ok(Self(set))
    }

    fn normalize(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Returns true if the code is permitted.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(&Self::normalize(code))
    }

    /// Iterates over the permitted codes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for OperatorCodes {
    fn default() -> Self {
        Self(BTreeSet::from([String::from("A"), String::from("B")]))
    }
}

impl TryFrom<Vec<String>> for OperatorCodes {
    type Error = DomainError;

    fn try_from(codes: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(codes)
    }
}

impl From<OperatorCodes> for Vec<String> {
    fn from(codes: OperatorCodes) -> Self {
        codes.0.into_iter().collect()
    }
}

/// Assigns Old-regime operator codes to procedure groups.
///
/// Group A counts procedures performed as operator, group B those performed
/// as assistant. A code may belong to at most one group; permitted codes in
/// neither group are accepted but not counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorGroups {
    operator: OperatorCodes,
    assistant: OperatorCodes,
}

impl OperatorGroups {
    /// Builds a group mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if a code is assigned to both groups.
    pub fn new(operator: OperatorCodes, assistant: OperatorCodes) -> Result<Self, DomainError> {
        if let Some(code) = operator.iter().find(|code| assistant.contains(code)) {
            return Err(DomainError::invalid(
                "operator_groups",
                format!("code '{code}' cannot count toward both groups"),
            ));
        }
        Ok(Self {
            operator,
            assistant,
        })
    }

    /// Codes counted in group A.
    #[must_use]
    pub const fn operator(&self) -> &OperatorCodes {
        &self.operator
    }

    /// Codes counted in group B.
    #[must_use]
    pub const fn assistant(&self) -> &OperatorCodes {
        &self.assistant
    }

    /// How one record with this code counts toward groups A and B.
    #[must_use]
    pub fn group_counts(&self, code: &str) -> (u32, u32) {
        if self.operator.contains(code) {
            (1, 0)
        } else if self.assistant.contains(code) {
            (0, 1)
        } else {
            (0, 0)
        }
    }

    /// Fails unless every grouped code is also permitted.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first grouped code missing from `permitted`.
    pub fn ensure_within(&self, permitted: &OperatorCodes) -> Result<(), DomainError> {
        self.operator
            .iter()
            .chain(self.assistant.iter())
            .find(|code| !permitted.contains(code))
            .map_or(Ok(()), |code| {
                Err(DomainError::invalid(
                    "operator_groups",
                    format!("code '{code}' is grouped but not a permitted operator code"),
                ))
            })
    }
}

impl Default for OperatorGroups {
    fn default() -> Self {
        Self {
            operator: OperatorCodes(BTreeSet::from([String::from("A")])),
            assistant: OperatorCodes(BTreeSet::from([String::from("B")])),
        }
    }
}

/// Patient sex as recorded on an Old-regime procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientGender {
    Female,
    Male,
}

/// An unvalidated bag of procedure fields, as handed in by a caller.
///
/// Every field is optional; which ones are legal depends on the regime the
/// bag is validated under. For updates, `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcedureFields {
    pub id: Option<ProcedureId>,
    pub date: Option<Date>,
    pub code: Option<String>,
    pub location: Option<String>,

    // Old regime only.
    pub operator_code: Option<String>,
    pub performing_person: Option<String>,
    pub patient_initials: Option<String>,
    pub patient_gender: Option<PatientGender>,
    pub procedure_group: Option<String>,
    pub assistant_data: Option<String>,
    pub year: Option<i32>,

    // New regime only.
    pub module_id: Option<ModuleId>,
    pub procedure_name: Option<String>,
    pub count_a: Option<i32>,
    pub count_b: Option<i32>,
    pub supervisor: Option<String>,
    pub institution: Option<String>,
}

fn has_text(value: Option<&String>) -> bool {
    value.is_some_and(|v| !is_blank(v))
}

fn has_number(value: Option<i32>) -> bool {
    value.is_some_and(|v| v != 0)
}

fn optional_text(value: Option<&String>) -> Option<String> {
    value
        .filter(|v| !is_blank(v))
        .map(|v| v.trim().to_string())
}

impl ProcedureFields {
    /// Names of Old-only fields carrying a non-default value.
    #[must_use]
    pub fn old_only_fields(&self) -> Vec<&'static str> {
        [
            ("operator_code", has_text(self.operator_code.as_ref())),
            ("performing_person", has_text(self.performing_person.as_ref())),
            ("patient_initials", has_text(self.patient_initials.as_ref())),
            ("patient_gender", self.patient_gender.is_some()),
            ("procedure_group", has_text(self.procedure_group.as_ref())),
            ("assistant_data", has_text(self.assistant_data.as_ref())),
            ("year", has_number(self.year)),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    /// Names of New-only fields carrying a non-default value.
    #[must_use]
    pub fn new_only_fields(&self) -> Vec<&'static str> {
        [
            ("module_id", self.module_id.is_some()),
            ("procedure_name", has_text(self.procedure_name.as_ref())),
            ("count_a", has_number(self.count_a)),
            ("count_b", has_number(self.count_b)),
            ("supervisor", has_text(self.supervisor.as_ref())),
            ("institution", has_text(self.institution.as_ref())),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    /// Fails if any field belonging to the other regime is set.
    ///
    /// # Errors
    ///
    /// Returns `ForeignRegimeFields` listing every offending field.
    pub fn ensure_no_foreign_fields(&self, regime: SmkVersion) -> Result<(), DomainError> {
        let foreign: Vec<&'static str> = match regime {
            SmkVersion::Old => self.new_only_fields(),
            SmkVersion::New => self.old_only_fields(),
        };

        if foreign.is_empty() {
            Ok(())
        } else {
            Err(DomainError::ForeignRegimeFields {
                regime,
                fields: foreign,
            })
        }
    }

    /// Overlays the values set in `self` onto `base`.
    #[must_use]
    pub fn merged_over(&self, base: Self) -> Self {
        Self {
            id: self.id.or(base.id),
            date: self.date.or(base.date),
            code: self.code.clone().or(base.code),
            location: self.location.clone().or(base.location),
            operator_code: self.operator_code.clone().or(base.operator_code),
            performing_person: self.performing_person.clone().or(base.performing_person),
            patient_initials: self.patient_initials.clone().or(base.patient_initials),
            patient_gender: self.patient_gender.or(base.patient_gender),
            procedure_group: self.procedure_group.clone().or(base.procedure_group),
            assistant_data: self.assistant_data.clone().or(base.assistant_data),
            year: self.year.or(base.year),
            module_id: self.module_id.or(base.module_id),
            procedure_name: self.procedure_name.clone().or(base.procedure_name),
            count_a: self.count_a.or(base.count_a),
            count_b: self.count_b.or(base.count_b),
            supervisor: self.supervisor.clone().or(base.supervisor),
            institution: self.institution.clone().or(base.institution),
        }
    }
}

/// Fields shared by both procedure shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureCommon {
    /// `None` until the record has been persisted.
    pub id: Option<ProcedureId>,
    pub date: Date,
    /// Procedure code from the program's catalogue.
    pub code: String,
    pub location: String,
    pub sync_status: SyncStatus,
}

impl ProcedureCommon {
    fn from_fields(fields: &ProcedureFields, sync_status: SyncStatus) -> Result<Self, DomainError> {
        let date: Date = fields
            .date
            .ok_or_else(|| DomainError::invalid("date", "is required"))?;
        let code: &str = fields.code.as_deref().unwrap_or_default();
        require_non_blank("code", code)?;
        let location: &str = fields.location.as_deref().unwrap_or_default();
        require_non_blank("location", location)?;

        Ok(Self {
            id: fields.id,
            date,
            code: code.trim().to_string(),
            location: location.trim().to_string(),
            sync_status,
        })
    }

    fn to_fields(&self) -> ProcedureFields {
        ProcedureFields {
            id: self.id,
            date: Some(self.date),
            code: Some(self.code.clone()),
            location: Some(self.location.clone()),
            ..ProcedureFields::default()
        }
    }
}

/// One physical procedure with one patient (Old regime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldSmkProcedure {
    #[serde(flatten)]
    pub common: ProcedureCommon,
    operator_code: String,
    performing_person: Option<String>,
    patient_initials: Option<String>,
    patient_gender: Option<PatientGender>,
    procedure_group: Option<String>,
    assistant_data: Option<String>,
    year: i32,
}

impl OldSmkProcedure {
    fn from_fields(
        codes: &OperatorCodes,
        fields: &ProcedureFields,
        sync_status: SyncStatus,
    ) -> Result<Self, DomainError> {
        let common: ProcedureCommon = ProcedureCommon::from_fields(fields, sync_status)?;

        let operator_code: &str = fields.operator_code.as_deref().unwrap_or_default();
        require_non_blank("operator_code", operator_code)?;
        if !codes.contains(operator_code) {
            let permitted: Vec<&str> = codes.iter().collect();
            return Err(DomainError::invalid(
                "operator_code",
                format!(
                    "'{}' is not a permitted operator code (expected one of {})",
                    operator_code.trim(),
                    permitted.join(", ")
                ),
            ));
        }

        let year: i32 = fields.year.unwrap_or_default();
        validate_year_bounds(year)?;

        Ok(Self {
            common,
            operator_code: operator_code.trim().to_uppercase(),
            performing_person: optional_text(fields.performing_person.as_ref()),
            patient_initials: optional_text(fields.patient_initials.as_ref()),
            patient_gender: fields.patient_gender,
            procedure_group: optional_text(fields.procedure_group.as_ref()),
            assistant_data: optional_text(fields.assistant_data.as_ref()),
            year,
        })
    }

    fn to_fields(&self) -> ProcedureFields {
        ProcedureFields {
            operator_code: Some(self.operator_code.clone()),
            performing_person: self.performing_person.clone(),
            patient_initials: self.patient_initials.clone(),
            patient_gender: self.patient_gender,
            procedure_group: self.procedure_group.clone(),
            assistant_data: self.assistant_data.clone(),
            year: Some(self.year),
            ..self.common.to_fields()
        }
    }

    #[must_use]
    pub fn operator_code(&self) -> &str {
        &self.operator_code
    }

    #[must_use]
    pub fn performing_person(&self) -> Option<&str> {
        self.performing_person.as_deref()
    }

    #[must_use]
    pub fn patient_initials(&self) -> Option<&str> {
        self.patient_initials.as_deref()
    }

    #[must_use]
    pub const fn patient_gender(&self) -> Option<PatientGender> {
        self.patient_gender
    }

    #[must_use]
    pub fn procedure_group(&self) -> Option<&str> {
        self.procedure_group.as_deref()
    }

    #[must_use]
    pub fn assistant_data(&self) -> Option<&str> {
        self.assistant_data.as_deref()
    }

    /// Training year, `0` if unassigned.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }
}

/// An aggregated batch of procedures within one module (New regime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSmkProcedure {
    #[serde(flatten)]
    pub common: ProcedureCommon,
    module_id: ModuleId,
    procedure_name: String,
    count_a: u32,
    count_b: u32,
    supervisor: Option<String>,
    institution: Option<String>,
}

/// Checks aggregate counts and converts them to their stored form.
fn validate_counts(count_a: i32, count_b: i32) -> Result<(u32, u32), DomainError> {
    let a: u32 =
        u32::try_from(count_a).map_err(|_| DomainError::invalid("count_a", "cannot be negative"))?;
    let b: u32 =
        u32::try_from(count_b).map_err(|_| DomainError::invalid("count_b", "cannot be negative"))?;

    if a == 0 && b == 0 {
        return Err(DomainError::EmptyAggregate);
    }

    Ok((a, b))
}

impl NewSmkProcedure {
    fn from_fields(fields: &ProcedureFields, sync_status: SyncStatus) -> Result<Self, DomainError> {
        let common: ProcedureCommon = ProcedureCommon::from_fields(fields, sync_status)?;

        let module_id: ModuleId = fields
            .module_id
            .ok_or_else(|| DomainError::invalid("module_id", "is required under the new regime"))?;

        let procedure_name: &str = fields.procedure_name.as_deref().unwrap_or_default();
        require_non_blank("procedure_name", procedure_name)?;

        let (count_a, count_b) = validate_counts(
            fields.count_a.unwrap_or_default(),
            fields.count_b.unwrap_or_default(),
        )?;

        Ok(Self {
            common,
            module_id,
            procedure_name: procedure_name.trim().to_string(),
            count_a,
            count_b,
            supervisor: optional_text(fields.supervisor.as_ref()),
            institution: optional_text(fields.institution.as_ref()),
        })
    }

    fn to_fields(&self) -> ProcedureFields {
        ProcedureFields {
            module_id: Some(self.module_id),
            procedure_name: Some(self.procedure_name.clone()),
            count_a: i32::try_from(self.count_a).ok(),
            count_b: i32::try_from(self.count_b).ok(),
            supervisor: self.supervisor.clone(),
            institution: self.institution.clone(),
            ..self.common.to_fields()
        }
    }

    #[must_use]
    pub const fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn procedure_name(&self) -> &str {
        &self.procedure_name
    }

    /// Procedures performed as operator.
    #[must_use]
    pub const fn count_a(&self) -> u32 {
        self.count_a
    }

    /// Procedures performed as assistant.
    #[must_use]
    pub const fn count_b(&self) -> u32 {
        self.count_b
    }

    #[must_use]
    pub fn supervisor(&self) -> Option<&str> {
        self.supervisor.as_deref()
    }

    #[must_use]
    pub fn institution(&self) -> Option<&str> {
        self.institution.as_deref()
    }

    /// Replaces both aggregate counts.
    ///
    /// This is separate from a general field update and runs its own sync
    /// transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is approved, a count is negative, or
    /// both counts are zero. The record is unchanged on error.
    pub fn update_counts(
        &mut self,
        count_a: i32,
        count_b: i32,
    ) -> Result<SyncTransition, DomainError> {
        apply_edit(self, |procedure| {
            let (a, b) = validate_counts(count_a, count_b)?;
            procedure.count_a = a;
            procedure.count_b = b;
            Ok(())
        })
    }

    /// Adjusts both counts by a signed delta.
    ///
    /// # Errors
    ///
    /// Same rules as [`NewSmkProcedure::update_counts`], applied to the resulting counts.
    pub fn increment_counts(
        &mut self,
        delta_a: i32,
        delta_b: i32,
    ) -> Result<SyncTransition, DomainError> {
        let next_a: i64 = i64::from(self.count_a) + i64::from(delta_a);
        let next_b: i64 = i64::from(self.count_b) + i64::from(delta_b);
        let next_a: i32 = i32::try_from(next_a)
            .map_err(|_| DomainError::invalid("count_a", "resulting count is out of range"))?;
        let next_b: i32 = i32::try_from(next_b)
            .map_err(|_| DomainError::invalid("count_b", "resulting count is out of range"))?;
        self.update_counts(next_a, next_b)
    }
}

/// A procedure record in the shape of its regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "smk_version", rename_all = "snake_case")]
pub enum Procedure {
    Old(OldSmkProcedure),
    New(NewSmkProcedure),
}

impl Procedure {
    /// Builds a procedure from a field bag under the given regime.
    ///
    /// # Arguments
    ///
    /// * `regime` - The owning specialization's regime
    /// * `codes` - Permitted Old-regime operator codes
    /// * `fields` - The candidate field values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any field exclusive to the other regime is set
    /// - Date, code or location is missing
    /// - Old: the operator code is missing or not permitted, or the year is out of bounds
    /// - New: the module or name is missing, a count is negative, or both counts are zero
    pub fn from_fields(
        regime: SmkVersion,
        codes: &OperatorCodes,
        fields: &ProcedureFields,
    ) -> Result<Self, DomainError> {
        Self::build(regime, codes, fields, SyncStatus::NotSynced)
    }

    fn build(
        regime: SmkVersion,
        codes: &OperatorCodes,
        fields: &ProcedureFields,
        sync_status: SyncStatus,
    ) -> Result<Self, DomainError> {
        fields.ensure_no_foreign_fields(regime)?;

        match regime {
            SmkVersion::Old => Ok(Self::Old(OldSmkProcedure::from_fields(
                codes,
                fields,
                sync_status,
            )?)),
            SmkVersion::New => Ok(Self::New(NewSmkProcedure::from_fields(fields, sync_status)?)),
        }
    }

    /// Applies a general field update, re-validating the merged record.
    ///
    /// Only fields set in `changes` are replaced. The record's regime does
    /// not change.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is approved or the merged record is
    /// invalid. The record is unchanged on error.
    pub fn apply_fields(
        &mut self,
        codes: &OperatorCodes,
        changes: &ProcedureFields,
    ) -> Result<SyncTransition, DomainError> {
        let regime: SmkVersion = self.smk_version();
        apply_edit(self, |procedure| {
            changes.ensure_no_foreign_fields(regime)?;
            let merged: ProcedureFields = changes.merged_over(procedure.to_fields());
            *procedure = Self::build(regime, codes, &merged, procedure.common().sync_status)?;
            Ok(())
        })
    }

    /// The regime this record was built under.
    #[must_use]
    pub const fn smk_version(&self) -> SmkVersion {
        match self {
            Self::Old(_) => SmkVersion::Old,
            Self::New(_) => SmkVersion::New,
        }
    }

    #[must_use]
    pub const fn common(&self) -> &ProcedureCommon {
        match self {
            Self::Old(p) => &p.common,
            Self::New(p) => &p.common,
        }
    }

    const fn common_mut(&mut self) -> &mut ProcedureCommon {
        match self {
            Self::Old(p) => &mut p.common,
            Self::New(p) => &mut p.common,
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<ProcedureId> {
        self.common().id
    }

    #[must_use]
    pub const fn sync_status(&self) -> SyncStatus {
        self.common().sync_status
    }

    /// The module a New-regime procedure belongs to.
    #[must_use]
    pub const fn module_id(&self) -> Option<ModuleId> {
        match self {
            Self::Old(_) => None,
            Self::New(p) => Some(p.module_id),
        }
    }

    /// The training year of an Old-regime procedure.
    #[must_use]
    pub const fn year(&self) -> Option<i32> {
        match self {
            Self::Old(p) => Some(p.year),
            Self::New(_) => None,
        }
    }

    /// How many procedures this record contributes to groups A and B.
    ///
    /// An Old-regime record counts once, in the group its operator code is
    /// mapped to by `groups`. New-regime records carry their own counts.
    #[must_use]
    pub fn group_counts(&self, groups: &OperatorGroups) -> (u32, u32) {
        match self {
            Self::Old(p) => groups.group_counts(&p.operator_code),
            Self::New(p) => (p.count_a, p.count_b),
        }
    }

    /// Returns the record as a field bag.
    #[must_use]
    pub fn to_fields(&self) -> ProcedureFields {
        match self {
            Self::Old(p) => p.to_fields(),
            Self::New(p) => p.to_fields(),
        }
    }
}

impl SyncTracked for Procedure {
    const KIND: RecordKind = RecordKind::Procedure;

    fn sync_status(&self) -> SyncStatus {
        self.common().sync_status
    }

    fn set_sync_status(&mut self, status: SyncStatus) {
        self.common_mut().sync_status = status;
    }
}

impl SyncTracked for NewSmkProcedure {
    const KIND: RecordKind = RecordKind::Procedure;

    fn sync_status(&self) -> SyncStatus {
        self.common.sync_status
    }

    fn set_sync_status(&mut self, status: SyncStatus) {
        self.common.sync_status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync_status::{approve, mark_synced};
    use time::macros::date;

    fn old_fields(operator_code: &str) -> ProcedureFields {
        ProcedureFields {
            date: Some(date!(2024 - 03 - 12)),
            code: Some(String::from("A-12")),
            location: Some(String::from("Blok operacyjny")),
            operator_code: Some(String::from(operator_code)),
            performing_person: Some(String::from("Dr Nowak")),
            patient_initials: Some(String::from("JK")),
            patient_gender: Some(PatientGender::Female),
            year: Some(2),
            ..ProcedureFields::default()
        }
    }

    fn new_fields(count_a: i32, count_b: i32) -> ProcedureFields {
        ProcedureFields {
            date: Some(date!(2024 - 03 - 12)),
            code: Some(String::from("B-07")),
            location: Some(String::from("Pracownia hemodynamiki")),
            module_id: Some(ModuleId::new(1)),
            procedure_name: Some(String::from("Koronarografia")),
            count_a: Some(count_a),
            count_b: Some(count_b),
            ..ProcedureFields::default()
        }
    }

    fn new_procedure(count_a: i32, count_b: i32) -> NewSmkProcedure {
        match Procedure::from_fields(
            SmkVersion::New,
            &OperatorCodes::default(),
            &new_fields(count_a, count_b),
        ) {
            Ok(Procedure::New(p)) => p,
            other => panic!("expected a new-regime procedure, got {other:?}"),
        }
    }

    #[test]
    fn test_operator_code_must_be_permitted() {
        let codes: OperatorCodes = OperatorCodes::default();

        let rejected = Procedure::from_fields(SmkVersion::Old, &codes, &old_fields("C"));
        assert!(matches!(
            rejected,
            Err(DomainError::InvalidField {
                field: "operator_code",
                ..
            })
        ));

        let accepted = Procedure::from_fields(SmkVersion::Old, &codes, &old_fields("A"));
        assert!(matches!(accepted, Ok(Procedure::Old(_))));
    }

    #[test]
    fn test_operator_code_matching_ignores_case() {
        let codes: OperatorCodes = OperatorCodes::default();
        let procedure = Procedure::from_fields(SmkVersion::Old, &codes, &old_fields(" b ")).unwrap();
        assert_eq!(procedure.group_counts(&OperatorGroups::default()), (0, 1));
    }

    #[test]
    fn test_configured_groups_decide_counting() {
        let codes: OperatorCodes = OperatorCodes::new(["1", "2", "3"]).unwrap();
        let groups: OperatorGroups = OperatorGroups::new(
            OperatorCodes::new(["1"]).unwrap(),
            OperatorCodes::new(["2"]).unwrap(),
        )
        .unwrap();
        assert!(groups.ensure_within(&codes).is_ok());
        assert!(groups.ensure_within(&OperatorCodes::default()).is_err());

        let operator = Procedure::from_fields(SmkVersion::Old, &codes, &old_fields("1")).unwrap();
        let assistant = Procedure::from_fields(SmkVersion::Old, &codes, &old_fields("2")).unwrap();
        let ungrouped = Procedure::from_fields(SmkVersion::Old, &codes, &old_fields("3")).unwrap();

        assert_eq!(operator.group_counts(&groups), (1, 0));
        assert_eq!(assistant.group_counts(&groups), (0, 1));
        assert_eq!(ungrouped.group_counts(&groups), (0, 0));
        assert_eq!(operator.group_counts(&OperatorGroups::default()), (0, 0));
    }

    #[test]
    fn test_code_cannot_be_in_both_groups() {
        let result = OperatorGroups::new(
            OperatorCodes::new(["A", "B"]).unwrap(),
            OperatorCodes::new(["b"]).unwrap(),
        );
        assert!(matches!(
            result,
            Err(DomainError::InvalidField {
                field: "operator_groups",
                ..
            })
        ));
    }

    #[test]
    fn test_custom_operator_code_set() {
        let codes: OperatorCodes = OperatorCodes::new(["A", "B", "C"]).unwrap();
        assert!(Procedure::from_fields(SmkVersion::Old, &codes, &old_fields("C")).is_ok());
        assert!(OperatorCodes::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_old_regime_rejects_new_fields() {
        let mut fields: ProcedureFields = old_fields("A");
        fields.count_a = Some(3);
        fields.module_id = Some(ModuleId::new(1));

        let result = Procedure::from_fields(SmkVersion::Old, &OperatorCodes::default(), &fields);

        assert_eq!(
            result,
            Err(DomainError::ForeignRegimeFields {
                regime: SmkVersion::Old,
                fields: vec!["module_id", "count_a"],
            })
        );
    }

    #[test]
    fn test_default_foreign_values_are_ignored() {
        let mut fields: ProcedureFields = old_fields("A");
        fields.count_a = Some(0);
        fields.supervisor = Some(String::new());

        assert!(Procedure::from_fields(SmkVersion::Old, &OperatorCodes::default(), &fields).is_ok());
    }

    #[test]
    fn test_new_regime_rejects_old_fields() {
        let mut fields: ProcedureFields = new_fields(1, 0);
        fields.patient_initials = Some(String::from("JK"));

        let result = Procedure::from_fields(SmkVersion::New, &OperatorCodes::default(), &fields);
        assert!(matches!(
            result,
            Err(DomainError::ForeignRegimeFields {
                regime: SmkVersion::New,
                ..
            })
        ));
    }

    #[test]
    fn test_new_regime_counts() {
        let codes: OperatorCodes = OperatorCodes::default();
        assert_eq!(
            Procedure::from_fields(SmkVersion::New, &codes, &new_fields(0, 0)),
            Err(DomainError::EmptyAggregate)
        );
        assert!(Procedure::from_fields(SmkVersion::New, &codes, &new_fields(-1, 4)).is_err());
        assert!(Procedure::from_fields(SmkVersion::New, &codes, &new_fields(5, 3)).is_ok());
    }

    #[test]
    fn test_new_regime_requires_module() {
        let mut fields: ProcedureFields = new_fields(5, 3);
        fields.module_id = None;

        let result = Procedure::from_fields(SmkVersion::New, &OperatorCodes::default(), &fields);
        assert!(matches!(
            result,
            Err(DomainError::InvalidField {
                field: "module_id",
                ..
            })
        ));
    }

    #[test]
    fn test_update_counts_transitions_synced_record() {
        let mut procedure: NewSmkProcedure = new_procedure(5, 3);
        mark_synced(&mut procedure);

        let transition: SyncTransition = procedure.update_counts(8, 5).unwrap();

        assert_eq!(transition.from, SyncStatus::Synced);
        assert_eq!(transition.to, SyncStatus::Modified);
        assert_eq!((procedure.count_a(), procedure.count_b()), (8, 5));
    }

    #[test]
    fn test_update_counts_to_zero_is_rejected() {
        let mut procedure: NewSmkProcedure = new_procedure(5, 3);
        mark_synced(&mut procedure);

        assert_eq!(procedure.update_counts(0, 0), Err(DomainError::EmptyAggregate));
        assert_eq!(procedure.common.sync_status, SyncStatus::Synced);
        assert_eq!((procedure.count_a(), procedure.count_b()), (5, 3));
    }

    #[test]
    fn test_increment_counts() {
        let mut procedure: NewSmkProcedure = new_procedure(5, 3);
        procedure.increment_counts(2, -3).unwrap();
        assert_eq!((procedure.count_a(), procedure.count_b()), (7, 0));

        assert!(procedure.increment_counts(-8, 0).is_err());
    }

    #[test]
    fn test_approved_procedure_counts_are_frozen() {
        let mut procedure: NewSmkProcedure = new_procedure(5, 3);
        approve(&mut procedure);

        assert_eq!(
            procedure.update_counts(8, 5),
            Err(DomainError::ApprovedRecord {
                record: RecordKind::Procedure
            })
        );
    }

    #[test]
    fn test_apply_fields_merges_and_transitions() {
        let codes: OperatorCodes = OperatorCodes::default();
        let mut procedure: Procedure =
            Procedure::from_fields(SmkVersion::Old, &codes, &old_fields("A")).unwrap();
        mark_synced(&mut procedure);

        let changes: ProcedureFields = ProcedureFields {
            operator_code: Some(String::from("B")),
            ..ProcedureFields::default()
        };
        procedure.apply_fields(&codes, &changes).unwrap();

        assert_eq!(procedure.sync_status(), SyncStatus::Modified);
        assert_eq!(procedure.year(), Some(2));
        match &procedure {
            Procedure::Old(p) => {
                assert_eq!(p.operator_code(), "B");
                assert_eq!(p.patient_initials(), Some("JK"));
            }
            Procedure::New(_) => panic!("regime changed during update"),
        }
    }

    #[test]
    fn test_apply_fields_rejects_foreign_fields_without_changes() {
        let codes: OperatorCodes = OperatorCodes::default();
        let mut procedure: Procedure =
            Procedure::from_fields(SmkVersion::Old, &codes, &old_fields("A")).unwrap();
        let before: Procedure = procedure.clone();

        let changes: ProcedureFields = ProcedureFields {
            count_b: Some(4),
            ..ProcedureFields::default()
        };
        assert!(procedure.apply_fields(&codes, &changes).is_err());
        assert_eq!(procedure, before);
    }

    #[test]
    fn test_serde_shape_is_tagged_by_regime() {
        let procedure: Procedure = Procedure::New(new_procedure(5, 3));
        let json: serde_json::Value = serde_json::to_value(&procedure).unwrap();
        assert_eq!(json["smk_version"], "new");
        assert_eq!(json["count_a"], 5);
        assert_eq!(json["sync_status"], "not_synced");

        let back: Procedure = serde_json::from_value(json).unwrap();
        assert_eq!(back, procedure);
    }
}
