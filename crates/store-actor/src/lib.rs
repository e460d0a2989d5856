//! # Store Actor
//!
//! A small framework for owning relational state inside a single Tokio task and mutating it
//! through serialized, all-or-nothing transactions.
//!
//! ## Why an actor for state?
//!
//! Engines that enforce multi-record invariants need two things from their storage:
//! commands that never interleave, and commands that either fully apply or leave no trace.
//! An actor gives the first for free (one message at a time, no locks). Snapshot-and-restore
//! around every command gives the second.
//!
//! ## Core Concepts
//!
//! - [`Transactional`]: the contract the owned state implements (`execute`, `query`,
//!   `after_commit`).
//! - [`StoreActor`]: the server half. Owns the state and the request receiver.
//! - [`StoreClient`]: the cloneable client half.
//! - [`StoreFacade`]: a trait for domain clients that wrap a `StoreClient`.
//! - [`StoreError`]: channel failures plus the state's own rejections.
//!
//! ## Quick Example
//!
//! ```rust
//! use store_actor::{StoreActor, Transactional};
//!
//! #[derive(Clone, Debug, Default)]
//! struct Counter { value: i64 }
//!
//! #[derive(Debug)]
//! enum CounterCommand { Add(i64) }
//!
//! #[derive(Debug)]
//! struct Overflow;
//! impl std::fmt::Display for Overflow {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "overflow") }
//! }
//! impl std::error::Error for Overflow {}
//!
//! impl Transactional for Counter {
//!     type Command = CounterCommand;
//!     type Output = i64;
//!     type Query = ();
//!     type QueryOutput = i64;
//!     type Effect = ();
//!     type Context = ();
//!     type Error = Overflow;
//!
//!     fn execute(&mut self, command: CounterCommand, _: &mut (), _: &mut Vec<()>) -> Result<i64, Overflow> {
//!         let CounterCommand::Add(n) = command;
//!         self.value += n;
//!         if self.value > 10 { return Err(Overflow); }
//!         Ok(self.value)
//!     }
//!
//!     fn query(&self, _: (), _: &()) -> Result<i64, Overflow> { Ok(self.value) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = StoreActor::new(Counter::default(), 8);
//!     tokio::spawn(actor.run(()));
//!
//!     assert_eq!(client.execute(CounterCommand::Add(7)).await.unwrap(), 7);
//!     // Rejected: the +5 is rolled back.
//!     assert!(client.execute(CounterCommand::Add(5)).await.is_err());
//!     assert_eq!(client.query(()).await.unwrap(), 7);
//! }
//! ```
//!
//! ## Testing
//!
//! See the [`mock`] module for [`MockClient`](mock::MockClient), which scripts replies
//! without any state.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;
pub mod transactional;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use client_trait::StoreFacade;
pub use error::StoreError;
pub use message::{Response, StoreRequest};
pub use transactional::Transactional;
