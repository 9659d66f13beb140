// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use sledz_domain::{DomainError, OperatorCodes, OperatorGroups};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid JSON or has the wrong shape.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value parsed but breaks a rule, such as an empty operator code set.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Raw file shape. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    operator_codes: Option<Vec<String>>,
    operator_groups: Option<GroupsFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupsFile {
    operator: Vec<String>,
    assistant: Vec<String>,
}

/// Runtime configuration for the validation engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EngineConfig {
    /// Operator codes accepted on Old-regime procedures.
    pub operator_codes: OperatorCodes,
    /// Which operator codes count toward procedure groups A and B.
    pub operator_groups: OperatorGroups,
}

impl EngineConfig {
    /// Parses configuration from a JSON document.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed, the operator code
    /// set is empty, or the groups name a code twice or a code that is not
    /// permitted.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json)?;

        let operator_codes: OperatorCodes = match file.operator_codes {
            Some(codes) => OperatorCodes::new(codes)?,
            None => OperatorCodes::default(),
        };
        let operator_groups: OperatorGroups = match file.operator_groups {
            Some(groups) => OperatorGroups::new(
                OperatorCodes::new(groups.operator)?,
                OperatorCodes::new(groups.assistant)?,
            )?,
            None => OperatorGroups::default(),
        };
        operator_groups.ensure_within(&operator_codes)?;

        Ok(Self {
            operator_codes,
            operator_groups,
        })
    }

    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path: &Path = path.as_ref();
        let contents: String = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }
}
