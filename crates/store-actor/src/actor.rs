//! # Store Actor
//!
//! This module defines the `StoreActor`, the server side of the store. It owns one piece of
//! [`Transactional`] state and processes requests strictly one after another, which makes
//! every command behave like a serialized database transaction.

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::transactional::Transactional;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The actor that owns a [`Transactional`] state.
///
/// **Concurrency Model**:
/// Requests are received over an mpsc channel and handled one at a time in a loop, so
/// two commands can never interleave. Racing callers are serialized by the channel; the
/// loser of a race simply observes the winner's committed state.
///
/// ## Transactions
///
/// * **Execute**:
///     1. Clones the current state as a snapshot.
///     2. Runs [`Transactional::execute`], collecting effects.
///     3. On `Err`, restores the snapshot and discards the effects.
///     4. On `Ok`, keeps the new state, hands the effects to
///        [`Transactional::after_commit`] and replies.
///
/// * **Query**: runs [`Transactional::query`] against committed state.
///
/// * **Snapshot**: replies with a clone of committed state.
///
/// ```rust,ignore
/// let (actor, client) = StoreActor::new(state, 32);
/// tokio::spawn(actor.run(context));
/// let output = client.execute(command).await?;
/// ```
pub struct StoreActor<T: Transactional> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    state: T,
    committed: u64,
}

impl<T: Transactional> StoreActor<T> {
    /// Creates a new `StoreActor` around `state` and its associated `StoreClient`.
    ///
    /// `buffer_size` is the capacity of the request channel. When it is full, callers wait
    /// until there is room.
    pub fn new(state: T, buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            state,
            committed: 0,
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs the actor's event loop until every client has been dropped.
    ///
    /// The `context` is handed to every command, query and commit hook.
    pub async fn run(mut self, mut context: T::Context) {
        let state_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(state_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Execute {
                    command,
                    respond_to,
                } => {
                    debug!(state_type, ?command, "Execute");
                    let snapshot = self.state.clone();
                    let mut effects = Vec::new();

                    match self.state.execute(command, &mut context, &mut effects) {
                        Ok(output) => {
                            self.committed += 1;
                            info!(
                                state_type,
                                tx = self.committed,
                                effects = effects.len(),
                                "Committed"
                            );
                            if !effects.is_empty() {
                                self.state.after_commit(effects, &context).await;
                            }
                            let _ = respond_to.send(Ok(output));
                        }
                        Err(e) => {
                            self.state = snapshot;
                            warn!(state_type, error = %e, discarded = effects.len(), "Rolled back");
                            let _ = respond_to.send(Err(StoreError::Rejected(e)));
                        }
                    }
                }
                StoreRequest::Query { query, respond_to } => {
                    debug!(state_type, ?query, "Query");
                    let result = self
                        .state
                        .query(query, &context)
                        .map_err(StoreError::Rejected);
                    if let Err(e) = &result {
                        debug!(state_type, error = %e, "Query refused");
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Snapshot { respond_to } => {
                    debug!(state_type, "Snapshot");
                    let _ = respond_to.send(Ok(self.state.clone()));
                }
            }
        }

        info!(state_type, committed = self.committed, "Shutdown");
    }
}
