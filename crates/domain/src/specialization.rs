// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Residency program structure: specializations and their modules.

use crate::error::DomainError;
use crate::types::{MAX_TRAINING_YEAR, MIN_TRAINING_YEAR, ModuleId, SmkVersion, SpecializationId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::Date;

/// Totals a module requires before it counts as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleRequirements {
    /// Procedures performed as operator (group A).
    pub procedures_a: u32,
    /// Procedures performed as assistant (group B).
    pub procedures_b: u32,
    pub internships: u32,
    pub courses: u32,
    /// Duty hours.
    pub shift_hours: u32,
}

/// A structural subdivision of a specialization.
///
/// Modules are created at program setup and are not edited by this engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ModuleData")]
pub struct Module {
    id: ModuleId,
    name: String,
    smk_version: SmkVersion,
    /// Position within the specialization (1-based).
    ordinal: u8,
    min_year: i32,
    max_year: i32,
    requirements: ModuleRequirements,
}

impl Module {
    /// Creates a module.
    ///
    /// # Errors
    ///
    /// Returns `InvalidModuleYearRange` unless `1 <= min_year <= max_year <= 6`,
    /// and `InvalidField` if the name is blank.
    pub fn new(
        id: ModuleId,
        name: &str,
        smk_version: SmkVersion,
        ordinal: u8,
        year_range: (i32, i32),
        requirements: ModuleRequirements,
    ) -> Result<Self, DomainError> {
        let (min_year, max_year) = year_range;
        crate::types::require_non_blank("name", name)?;

        if min_year < MIN_TRAINING_YEAR || max_year > MAX_TRAINING_YEAR || min_year > max_year {
            return Err(DomainError::InvalidModuleYearRange {
                module: id,
                min_year,
                max_year,
            });
        }

        Ok(Self {
            id,
            name: name.trim().to_string(),
            smk_version,
            ordinal,
            min_year,
            max_year,
            requirements,
        })
    }

    #[must_use]
    pub const fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn smk_version(&self) -> SmkVersion {
        self.smk_version
    }

    #[must_use]
    pub const fn ordinal(&self) -> u8 {
        self.ordinal
    }

    /// Lower bound of the module's training years.
    #[must_use]
    pub const fn min_year(&self) -> i32 {
        self.min_year
    }

    /// Upper bound of the module's training years.
    #[must_use]
    pub const fn max_year(&self) -> i32 {
        self.max_year
    }

    #[must_use]
    pub const fn requirements(&self) -> &ModuleRequirements {
        &self.requirements
    }

    /// Returns true if the year lies inside `[min_year, max_year]`.
    #[must_use]
    pub const fn contains_year(&self, year: i32) -> bool {
        year >= self.min_year && year <= self.max_year
    }
}

/// A residency program instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SpecializationData")]
pub struct Specialization {
    id: SpecializationId,
    name: String,
    smk_version: SmkVersion,
    start_date: Date,
    /// Ordered by `ordinal`.
    modules: Vec<Module>,
    active_module: Option<ModuleId>,
}

impl Specialization {
    /// Creates a specialization from its module structure.
    ///
    /// Modules are sorted by ordinal.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is blank
    /// - A module is configured for the other regime
    /// - A module id appears twice
    /// - `active_module` is not one of the modules
    pub fn new(
        id: SpecializationId,
        name: &str,
        smk_version: SmkVersion,
        start_date: Date,
        mut modules: Vec<Module>,
        active_module: Option<ModuleId>,
    ) -> Result<Self, DomainError> {
        crate::types::require_non_blank("name", name)?;

        let mut seen: HashSet<ModuleId> = HashSet::new();
        for module in &modules {
            if module.smk_version() != smk_version {
                return Err(DomainError::RegimeMismatch {
                    specialization: id,
                    module: module.id(),
                    module_regime: module.smk_version(),
                    specialization_regime: smk_version,
                });
            }
            if !seen.insert(module.id()) {
                return Err(DomainError::DuplicateModule {
                    specialization: id,
                    module: module.id(),
                });
            }
        }
        modules.sort_by_key(Module::ordinal);

        let mut specialization: Self = Self {
            id,
            name: name.trim().to_string(),
            smk_version,
            start_date,
            modules,
            active_module: None,
        };
        if let Some(module_id) = active_module {
            specialization.set_active_module(module_id)?;
        }

        Ok(specialization)
    }

    #[must_use]
    pub const fn id(&self) -> SpecializationId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn smk_version(&self) -> SmkVersion {
        self.smk_version
    }

    /// The date training started.
    #[must_use]
    pub const fn start_date(&self) -> Date {
        self.start_date
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Looks up a module by id.
    #[must_use]
    pub fn module(&self, module_id: ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| m.id() == module_id)
    }

    /// The module ordered directly before `module_id`, if any.
    #[must_use]
    pub fn preceding_module(&self, module_id: ModuleId) -> Option<&Module> {
        let position: usize = self.modules.iter().position(|m| m.id() == module_id)?;
        position.checked_sub(1).and_then(|i| self.modules.get(i))
    }

    /// The id of the module currently being trained in, if any.
    #[must_use]
    pub const fn active_module_id(&self) -> Option<ModuleId> {
        self.active_module
    }

    /// The module currently being trained in, if any.
    #[must_use]
    pub fn active_module(&self) -> Option<&Module> {
        self.active_module.and_then(|id| self.module(id))
    }

    /// Switches the active module.
    ///
    /// # Errors
    ///
    /// Returns `UnknownModule` if the module does not belong to this specialization.
    pub fn set_active_module(&mut self, module_id: ModuleId) -> Result<(), DomainError> {
        if self.module(module_id).is_none() {
            return Err(DomainError::UnknownModule {
                specialization: self.id,
                module: module_id,
            });
        }
        self.active_module = Some(module_id);
        Ok(())
    }

    /// Clears the active module.
    pub const fn clear_active_module(&mut self) {
        self.active_module = None;
    }
}

/// Unvalidated wire shape of a `Module`.
#[derive(Deserialize)]
struct ModuleData {
    id: ModuleId,
    name: String,
    smk_version: SmkVersion,
    ordinal: u8,
    min_year: i32,
    max_year: i32,
    #[serde(default)]
    requirements: ModuleRequirements,
}

impl TryFrom<ModuleData> for Module {
    type Error = DomainError;

    fn try_from(data: ModuleData) -> Result<Self, Self::Error> {
        Self::new(
            data.id,
            &data.name,
            data.smk_version,
            data.ordinal,
            (data.min_year, data.max_year),
            data.requirements,
        )
    }
}

/// Unvalidated wire shape of a `Specialization`.
#[derive(Deserialize)]
struct SpecializationData {
    id: SpecializationId,
    name: String,
    smk_version: SmkVersion,
    start_date: Date,
    #[serde(default)]
    modules: Vec<Module>,
    #[serde(default)]
    active_module: Option<ModuleId>,
}

impl TryFrom<SpecializationData> for Specialization {
    type Error = DomainError;

    fn try_from(data: SpecializationData) -> Result<Self, Self::Error> {
        Self::new(
            data.id,
            &data.name,
            data.smk_version,
            data.start_date,
            data.modules,
            data.active_module,
        )
    }
}
