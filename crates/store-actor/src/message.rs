//! # Store Messages
//!
//! Message types exchanged between [`StoreClient`](crate::StoreClient) and
//! [`StoreActor`](crate::StoreActor).

use crate::error::StoreError;
use crate::transactional::Transactional;
use tokio::sync::oneshot;

/// One-shot reply channel carrying the result of a request.
pub type Response<T, E> = oneshot::Sender<Result<T, StoreError<E>>>;

/// Requests understood by a store actor.
///
/// - **Execute**: run a command as one transaction.
/// - **Query**: read-only lookup against committed state.
/// - **Snapshot**: clone of the whole committed state (diagnostics and tests).
#[derive(Debug)]
pub enum StoreRequest<T: Transactional> {
    Execute {
        command: T::Command,
        respond_to: Response<T::Output, T::Error>,
    },
    Query {
        query: T::Query,
        respond_to: Response<T::QueryOutput, T::Error>,
    },
    Snapshot {
        respond_to: Response<T, T::Error>,
    },
}
