//! # Mock Store & Testing Guide
//!
//! `MockClient<T>` hands out a real [`StoreClient<T>`] whose requests are answered from a
//! queue of scripted expectations instead of a running state. Use it to test code that sits
//! *around* a store (domain client wrappers, error mapping, adapters) without building any
//! state at all.
//!
//! ## When to use Mocks vs a Real Store
//!
//! | Feature | MockClient | StoreActor |
//! |---------|------------|------------|
//! | **State** | None (scripted replies) | Real transactional state |
//! | **Determinism** | Fully deterministic | Deterministic per request order |
//! | **Use Case** | Logic around the client | The state's commands themselves |
//! | **Error Injection** | `return_err(StoreError::Closed)` | Requires a real failing command |
//!
//! ```rust,ignore
//! let mut mock = MockClient::<Ledger>::new();
//! mock.expect_execute().return_err(StoreError::Closed);
//! let client = DomainClient::new(mock.client());
//! assert!(client.do_something().await.is_err());
//! mock.verify();
//! ```
//!
//! The lower-level [`create_mock_client`] returns the raw request receiver, so a test can
//! inspect each request and answer it by hand.

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::transactional::Transactional;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// A scripted reply for the next request.
enum Expectation<T: Transactional> {
    Execute {
        response: Result<T::Output, StoreError<T::Error>>,
    },
    Query {
        response: Result<T::QueryOutput, StoreError<T::Error>>,
    },
    Snapshot {
        response: Result<T, StoreError<T::Error>>,
    },
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock store with expectation tracking.
///
/// Requests are answered in order. A request that does not match the kind of the next
/// expectation panics inside the background task, and the caller then sees
/// `StoreError::Dropped`.
pub struct MockClient<T: Transactional> {
    client: StoreClient<T>,
    expectations: Queue<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: Transactional> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transactional> MockClient<T> {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<T>>(100);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        StoreRequest::Execute { respond_to, .. },
                        Some(Expectation::Execute { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Query { respond_to, .. },
                        Some(Expectation::Query { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Snapshot { respond_to },
                        Some(Expectation::Snapshot { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> StoreClient<T> {
        self.client.clone()
    }

    /// Expects an `execute` request.
    pub fn expect_execute(&mut self) -> ExpectationBuilder<T, T::Output> {
        ExpectationBuilder::new(self.expectations.clone(), |response| {
            Expectation::Execute { response }
        })
    }

    /// Expects a `query` request.
    pub fn expect_query(&mut self) -> ExpectationBuilder<T, T::QueryOutput> {
        ExpectationBuilder::new(self.expectations.clone(), |response| {
            Expectation::Query { response }
        })
    }

    /// Expects a `snapshot` request.
    pub fn expect_snapshot(&mut self) -> ExpectationBuilder<T, T> {
        ExpectationBuilder::new(self.expectations.clone(), |response| {
            Expectation::Snapshot { response }
        })
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder completing one expectation with either a success or an error reply.
pub struct ExpectationBuilder<T: Transactional, R> {
    expectations: Queue<T>,
    wrap: fn(Result<R, StoreError<T::Error>>) -> Expectation<T>,
}

impl<T: Transactional, R> ExpectationBuilder<T, R> {
    fn new(
        expectations: Queue<T>,
        wrap: fn(Result<R, StoreError<T::Error>>) -> Expectation<T>,
    ) -> Self {
        Self { expectations, wrap }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        let expectation = (self.wrap)(Ok(value));
        self.expectations.lock().unwrap().push_back(expectation);
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError<T::Error>) {
        let expectation = (self.wrap)(Err(error));
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// The test plays the actor: it pulls requests off the receiver with [`expect_execute`] or
/// [`expect_query`] and answers them through the returned responder.
pub fn create_mock_client<T: Transactional>(
    buffer_size: usize,
) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Helper to verify that the next message is an Execute request.
pub async fn expect_execute<T: Transactional>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(
    T::Command,
    tokio::sync::oneshot::Sender<Result<T::Output, StoreError<T::Error>>>,
)> {
    match receiver.recv().await {
        Some(StoreRequest::Execute {
            command,
            respond_to,
        }) => Some((command, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Query request.
pub async fn expect_query<T: Transactional>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(
    T::Query,
    tokio::sync::oneshot::Sender<Result<T::QueryOutput, StoreError<T::Error>>>,
)> {
    match receiver.recv().await {
        Some(StoreRequest::Query { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default)]
    struct Tally {
        total: u32,
    }

    #[derive(Debug)]
    enum TallyCommand {
        Add(u32),
    }

    #[derive(Debug, thiserror::Error)]
    #[error("tally error")]
    struct TallyError;

    impl Transactional for Tally {
        type Command = TallyCommand;
        type Output = u32;
        type Query = ();
        type QueryOutput = u32;
        type Effect = ();
        type Context = ();
        type Error = TallyError;

        fn execute(
            &mut self,
            command: TallyCommand,
            _ctx: &mut (),
            _effects: &mut Vec<()>,
        ) -> Result<u32, TallyError> {
            match command {
                TallyCommand::Add(n) => {
                    self.total += n;
                    Ok(self.total)
                }
            }
        }

        fn query(&self, _query: (), _ctx: &()) -> Result<u32, TallyError> {
            Ok(self.total)
        }
    }

    #[tokio::test]
    async fn test_raw_mock_client() {
        let (client, mut receiver) = create_mock_client::<Tally>(10);

        let task = tokio::spawn(async move { client.execute(TallyCommand::Add(3)).await });

        let (command, responder) = expect_execute(&mut receiver)
            .await
            .expect("Expected Execute request");
        assert!(matches!(command, TallyCommand::Add(3)));
        responder.send(Ok(3)).unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Ok(3)));
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<Tally>::new();
        mock.expect_execute().return_ok(5);
        mock.expect_query().return_err(StoreError::Rejected(TallyError));
        mock.expect_snapshot().return_ok(Tally { total: 5 });

        let client = mock.client();
        assert_eq!(client.execute(TallyCommand::Add(5)).await.unwrap(), 5);
        assert!(matches!(
            client.query(()).await,
            Err(StoreError::Rejected(TallyError))
        ));
        assert_eq!(client.snapshot().await.unwrap().total, 5);

        mock.verify();
    }
}
