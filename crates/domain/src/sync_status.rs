// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Sync tag tracking and edit transition logic.
//!
//! Every mutable training record carries a `SyncStatus` describing how it
//! relates to the remote system of record. Edits move the tag through a
//! fixed set of transitions; `Approved` records are read-only.

use crate::error::DomainError;
use crate::types::RecordKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle tag of a mutable training record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Created locally, never sent to the remote system.
    #[default]
    NotSynced,
    /// Previously synced, edited locally since.
    Modified,
    /// Matches the remote system.
    Synced,
    /// Finalized remotely. No further edits.
    Approved,
}

/// An edit was attempted on an `Approved` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("records in the approved state cannot be edited")]
pub struct EditRejected;

/// The tag change produced by an accepted edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTransition {
    /// Status before the edit.
    pub from: SyncStatus,
    /// Status after the edit.
    pub to: SyncStatus,
}

impl SyncTransition {
    /// Returns true if the edit changed the tag.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

impl SyncStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotSynced => "not_synced",
            Self::Modified => "modified",
            Self::Synced => "synced",
            Self::Approved => "approved",
        }
    }

    /// Returns true if the record can no longer be edited.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Status after an accepted field-level edit.
    ///
    /// # Errors
    ///
    /// Returns `EditRejected` if the record is approved.
    pub const fn after_edit(self) -> Result<Self, EditRejected> {
        match self {
            Self::Synced => Ok(Self::Modified),
            Self::NotSynced | Self::Modified => Ok(self),
            Self::Approved => Err(EditRejected),
        }
    }

    /// Status after the remote system confirms a synchronization.
    #[must_use]
    pub const fn after_sync(self) -> Self {
        match self {
            Self::NotSynced | Self::Modified | Self::Synced => Self::Synced,
            Self::Approved => Self::Approved,
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_synced" => Ok(Self::NotSynced),
            "modified" => Ok(Self::Modified),
            "synced" => Ok(Self::Synced),
            "approved" => Ok(Self::Approved),
            _ => Err(DomainError::invalid(
                "sync_status",
                format!("unknown sync status '{s}'"),
            )),
        }
    }
}

/// Computes the status a record must carry after an operation.
///
/// Non-edit operations leave every status untouched, `Approved` included.
///
/// # Errors
///
/// Returns `EditRejected` when `is_edit` is true and the record is approved.
pub const fn apply_sync_transition(
    current: SyncStatus,
    is_edit: bool,
) -> Result<SyncStatus, EditRejected> {
    if is_edit {
        current.after_edit()
    } else {
        Ok(current)
    }
}

/// A training record that owns a sync tag.
pub trait SyncTracked: Clone {
    /// The record kind reported in errors.
    const KIND: RecordKind;

    /// Current tag.
    fn sync_status(&self) -> SyncStatus;

    /// Overwrites the tag. Only the transition helpers in this module call it.
    fn set_sync_status(&mut self, status: SyncStatus);
}

/// Applies a field edit and its sync transition as one unit.
///
/// The edit runs against a staged copy. Fields and tag are written back only
/// if the transition is allowed and the edit succeeds, so a failed edit
/// leaves the record exactly as it was.
///
/// # Errors
///
/// Returns `DomainError::ApprovedRecord` for approved records, or whatever
/// error the edit itself reports.
pub fn apply_edit<R, F>(record: &mut R, edit: F) -> Result<SyncTransition, DomainError>
where
    R: SyncTracked,
    F: FnOnce(&mut R) -> Result<(), DomainError>,
{
    let from: SyncStatus = record.sync_status();
    let to: SyncStatus =
        apply_sync_transition(from, true).map_err(|_| DomainError::ApprovedRecord { record: R::KIND })?;

    let mut staged: R = record.clone();
    edit(&mut staged)?;
    staged.set_sync_status(to);
    *record = staged;

    Ok(SyncTransition { from, to })
}

/// Records a completed synchronization with the remote system.
pub fn mark_synced<R: SyncTracked>(record: &mut R) -> SyncTransition {
    let from: SyncStatus = record.sync_status();
    let to: SyncStatus = from.after_sync();
    record.set_sync_status(to);
    SyncTransition { from, to }
}

/// Records remote approval. The record becomes read-only.
pub fn approve<R: SyncTracked>(record: &mut R) -> SyncTransition {
    let from: SyncStatus = record.sync_status();
    record.set_sync_status(SyncStatus::Approved);
    SyncTransition {
        from,
        to: SyncStatus::Approved,
    }
}
