//! # StoreFacade Trait
//!
//! Common interface for domain-specific clients built on a [`StoreClient`]. Implementors
//! supply the inner client and an error mapping; `snapshot` comes for free.
use crate::{StoreClient, StoreError, Transactional};
use async_trait::async_trait;

/// Trait for domain clients wrapping a generic `StoreClient`.
///
/// ```rust,ignore
/// #[async_trait]
/// impl StoreFacade<Ledger> for LedgerClient {
///     type Error = LedgerError;
///     fn inner(&self) -> &StoreClient<Ledger> { &self.inner }
///     fn map_error(e: StoreError<LedgerError>) -> LedgerError { ... }
/// }
///
/// let state = client.snapshot().await?;
/// ```
#[async_trait]
pub trait StoreFacade<T: Transactional>: Send + Sync {
    /// The domain error type.
    type Error: Send + Sync;

    /// Access the inner generic client.
    fn inner(&self) -> &StoreClient<T>;

    /// Map store errors to the domain error type.
    fn map_error(e: StoreError<T::Error>) -> Self::Error;

    /// Clone the committed state.
    #[tracing::instrument(skip(self))]
    async fn snapshot(&self) -> Result<T, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().snapshot().await.map_err(Self::map_error)
    }
}
