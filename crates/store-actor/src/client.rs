//! # Store Client
//!
//! The generic client for talking to a [`StoreActor`](crate::StoreActor).

use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::transactional::Transactional;
use tokio::sync::{mpsc, oneshot};

/// ## StoreClient
///
/// Type-safe async handle to a `StoreActor<T>`. It forwards requests over the actor's mpsc
/// channel and awaits the reply on a oneshot channel. Cloning only clones the sender, so
/// the client can be shared freely across tasks.
pub struct StoreClient<T: Transactional> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: Transactional> Clone for StoreClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Transactional> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    /// Runs `command` as one transaction.
    pub async fn execute(&self, command: T::Command) -> Result<T::Output, StoreError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Execute {
                command,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    /// Answers a read-only query.
    pub async fn query(&self, query: T::Query) -> Result<T::QueryOutput, StoreError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Query { query, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    /// Clones the committed state.
    pub async fn snapshot(&self) -> Result<T, StoreError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Snapshot { respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }
}
