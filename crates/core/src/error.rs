// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::config::ConfigError;
use sledz_domain::{DomainError, ErrorKind};

/// Errors returned by the validation service.
#[derive(Debug)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The engine could not be configured.
    Config(ConfigError),
}

impl CoreError {
    /// The underlying domain error, if this is a rule violation.
    #[must_use]
    pub const fn domain_error(&self) -> Option<&DomainError> {
        match self {
            Self::DomainViolation(err) => Some(err),
            Self::Config(_) => None,
        }
    }

    /// Classification of a rule violation.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::DomainViolation(err) => Some(err.kind()),
            Self::Config(_) => None,
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::Config(err) => write!(f, "Configuration error: {err}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DomainViolation(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
