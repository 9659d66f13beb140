// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The year value meaning "not yet assigned to a training year".
pub const UNASSIGNED_YEAR: i32 = 0;

/// The first real training year.
pub const MIN_TRAINING_YEAR: i32 = 1;

/// The last training year any regime recognizes.
pub const MAX_TRAINING_YEAR: i32 = 6;

/// The regulatory regime a specialization is recorded under.
///
/// The two regimes record procedures and training years differently and
/// their record shapes are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmkVersion {
    /// The historical regime: one record per physical procedure, year-based.
    Old,
    /// The current regime: aggregated counts per module.
    New,
}

impl SmkVersion {
    /// Returns the string representation of the regime.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }
}

impl std::fmt::Display for SmkVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SmkVersion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Ok(Self::Old),
            "new" => Ok(Self::New),
            other => Err(DomainError::invalid(
                "smk_version",
                format!("unknown regime '{other}', expected 'old' or 'new'"),
            )),
        }
    }
}

/// The kind of mutable training record carrying a sync tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Internship,
    MedicalShift,
    Procedure,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &str = match self {
            Self::Internship => "Internship",
            Self::MedicalShift => "Medical shift",
            Self::Procedure => "Procedure",
        };
        write!(f, "{name}")
    }
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifies a residency program instance.
    SpecializationId
);
record_id!(
    /// Identifies a module within a specialization.
    ModuleId
);
record_id!(
    /// Identifies an internship (rotation) record.
    InternshipId
);
record_id!(
    /// Identifies a medical shift record.
    ShiftId
);
record_id!(
    /// Identifies a procedure record.
    ProcedureId
);

/// Returns true if the value is missing or only whitespace.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Fails with `InvalidField` if the value is blank.
pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), DomainError> {
    if is_blank(value) {
        return Err(DomainError::invalid(field, "cannot be empty"));
    }
    Ok(())
}
