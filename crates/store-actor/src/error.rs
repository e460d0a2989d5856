//! # Store Errors
//!
//! Errors surfaced by [`StoreClient`](crate::StoreClient). Channel failures are the store's
//! own; everything the state itself refuses comes back untouched as `Rejected`.

/// Errors that can occur when talking to a store actor.
#[derive(Debug, thiserror::Error)]
pub enum StoreError<E> {
    #[error("Store actor closed")]
    Closed,
    #[error("Store actor dropped response channel")]
    Dropped,
    #[error("{0}")]
    Rejected(E),
}

impl<E> StoreError<E> {
    /// Returns the state's own error when the request reached the state and was refused.
    pub fn into_rejection(self) -> Option<E> {
        match self {
            StoreError::Rejected(e) => Some(e),
            StoreError::Closed | StoreError::Dropped => None,
        }
    }
}
