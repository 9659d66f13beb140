// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Internship (rotation) records.

use crate::error::DomainError;
use crate::sync_status::{SyncStatus, SyncTracked, SyncTransition, apply_edit};
use crate::types::{InternshipId, ModuleId, RecordKind, require_non_blank};
use crate::validation::{validate_internship_dates, validate_internship_update};
use serde::{Deserialize, Serialize};
use time::Date;

/// Optional field changes accompanying an internship update.
///
/// `None` leaves the field as it is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InternshipChanges {
    pub institution_name: Option<String>,
    pub department_name: Option<String>,
    pub supervisor_name: Option<String>,
    pub module_id: Option<ModuleId>,
}

/// A rotation at an institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Internship {
    id: InternshipId,
    module_id: Option<ModuleId>,
    institution_name: String,
    department_name: String,
    supervisor_name: Option<String>,
    start_date: Date,
    end_date: Date,
    is_completed: bool,
    sync_status: SyncStatus,
}

impl SyncTracked for Internship {
    const KIND: RecordKind = RecordKind::Internship;

    fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    fn set_sync_status(&mut self, status: SyncStatus) {
        self.sync_status = status;
    }
}

impl Internship {
    /// Creates a new, unsynced internship.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is blank or `start_date > end_date`.
    pub fn new(
        id: InternshipId,
        institution_name: &str,
        department_name: &str,
        start_date: Date,
        end_date: Date,
    ) -> Result<Self, DomainError> {
        require_non_blank("institution_name", institution_name)?;
        require_non_blank("department_name", department_name)?;
        validate_internship_dates(start_date, end_date)?;

        Ok(Self {
            id,
            module_id: None,
            institution_name: institution_name.trim().to_string(),
            department_name: department_name.trim().to_string(),
            supervisor_name: None,
            start_date,
            end_date,
            is_completed: false,
            sync_status: SyncStatus::NotSynced,
        })
    }

    #[must_use]
    pub const fn id(&self) -> InternshipId {
        self.id
    }

    #[must_use]
    pub const fn module_id(&self) -> Option<ModuleId> {
        self.module_id
    }

    #[must_use]
    pub fn institution_name(&self) -> &str {
        &self.institution_name
    }

    #[must_use]
    pub fn department_name(&self) -> &str {
        &self.department_name
    }

    #[must_use]
    pub fn supervisor_name(&self) -> Option<&str> {
        self.supervisor_name.as_deref()
    }

    #[must_use]
    pub const fn start_date(&self) -> Date {
        self.start_date
    }

    #[must_use]
    pub const fn end_date(&self) -> Date {
        self.end_date
    }

    /// Number of calendar days covered, both ends inclusive.
    #[must_use]
    pub fn days_count(&self) -> i64 {
        (self.end_date - self.start_date).whole_days() + 1
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub const fn sync_status(&self) -> SyncStatus {
        self.sync_status
    }

    /// Applies a validated update of dates and any other supplied fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is approved or the update is invalid.
    /// The record is unchanged on error.
    pub fn apply_update(
        &mut self,
        start_date: Date,
        end_date: Date,
        changes: &InternshipChanges,
    ) -> Result<SyncTransition, DomainError> {
        apply_edit(self, |internship| {
            validate_internship_update(start_date, end_date, changes)?;

            internship.start_date = start_date;
            internship.end_date = end_date;
            if let Some(institution) = &changes.institution_name {
                internship.institution_name = institution.trim().to_string();
            }
            if let Some(department) = &changes.department_name {
                internship.department_name = department.trim().to_string();
            }
            if let Some(supervisor) = &changes.supervisor_name {
                internship.supervisor_name = Some(supervisor.trim().to_string());
            }
            if let Some(module_id) = changes.module_id {
                internship.module_id = Some(module_id);
            }
            Ok(())
        })
    }

    /// Moves the internship to new dates.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is approved or `start_date > end_date`.
    pub fn update_dates(
        &mut self,
        start_date: Date,
        end_date: Date,
    ) -> Result<SyncTransition, DomainError> {
        self.apply_update(start_date, end_date, &InternshipChanges::default())
    }

    /// Changes where the internship takes place.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is approved or either name is blank.
    pub fn update_institution(
        &mut self,
        institution_name: &str,
        department_name: &str,
    ) -> Result<SyncTransition, DomainError> {
        let changes: InternshipChanges = InternshipChanges {
            institution_name: Some(institution_name.to_string()),
            department_name: Some(department_name.to_string()),
            ..InternshipChanges::default()
        };
        self.apply_update(self.start_date, self.end_date, &changes)
    }

    /// Records the supervising physician.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is approved or the name is blank.
    pub fn set_supervisor(&mut self, supervisor_name: &str) -> Result<SyncTransition, DomainError> {
        let changes: InternshipChanges = InternshipChanges {
            supervisor_name: Some(supervisor_name.to_string()),
            ..InternshipChanges::default()
        };
        self.apply_update(self.start_date, self.end_date, &changes)
    }

    /// Attaches the internship to a module.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is approved.
    pub fn assign_to_module(&mut self, module_id: ModuleId) -> Result<SyncTransition, DomainError> {
        apply_edit(self, |internship| {
            internship.module_id = Some(module_id);
            Ok(())
        })
    }

    /// Marks the internship as completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is approved or `today` is before the end date.
    pub fn mark_completed(&mut self, today: Date) -> Result<SyncTransition, DomainError> {
        apply_edit(self, |internship| {
            if today < internship.end_date {
                return Err(DomainError::invalid(
                    "is_completed",
                    format!(
                        "cannot complete an internship before its end date {}",
                        internship.end_date
                    ),
                ));
            }
            internship.is_completed = true;
            Ok(())
        })
    }
}
