//! Constraint violations raised by the store's insert paths.

use thiserror::Error;

/// A write the store refused because it would break a unique index or dangle a reference.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    /// A unique index already holds the key.
    #[error("{index} already holds {key}")]
    Duplicate { index: &'static str, key: String },

    /// A row references another row that does not exist.
    #[error("{table} has no row {id}")]
    Missing { table: &'static str, id: String },
}

impl LedgerError {
    pub(crate) fn duplicate(index: &'static str, key: impl ToString) -> Self {
        LedgerError::Duplicate {
            index,
            key: key.to_string(),
        }
    }

    pub(crate) fn missing(table: &'static str, id: impl ToString) -> Self {
        LedgerError::Missing {
            table,
            id: id.to_string(),
        }
    }
}
