//! Error type shared by every draw operation.

use crate::model::GroupId;
use crate::store::LedgerError;
use thiserror::Error;

/// Errors that can occur during draw operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DrawError {
    /// The referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// One or more guards failed. Every violated guard is listed.
    #[error("Preconditions not met: {}", .0.join("; "))]
    Precondition(Vec<String>),

    /// A unique index already holds the key (suite claimed, number used, ...).
    #[error("Already taken: {0}")]
    AlreadyTaken(String),

    /// The field cannot change in the record's current state.
    #[error("{entity}.{field} cannot be changed")]
    Immutable {
        entity: &'static str,
        field: &'static str,
    },

    /// The request itself is malformed.
    #[error("Invalid request: {0}")]
    Invalid(String),

    /// Pruning could not destroy the listed groups; nothing was pruned.
    #[error("Prune failed for groups {groups:?}")]
    PruneFailed { groups: Vec<GroupId> },

    /// The store actor could not be reached.
    #[error("Store communication error: {0}")]
    Store(String),
}

impl DrawError {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        DrawError::Precondition(vec![message.into()])
    }

    pub(crate) fn not_found(what: impl std::fmt::Display) -> Self {
        DrawError::NotFound(what.to_string())
    }
}

impl From<LedgerError> for DrawError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Duplicate { .. } => DrawError::AlreadyTaken(e.to_string()),
            LedgerError::Missing { .. } => DrawError::NotFound(e.to_string()),
        }
    }
}

pub type DrawResult<T> = Result<T, DrawError>;
