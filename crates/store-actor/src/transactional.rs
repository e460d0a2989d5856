//! # Transactional Trait
//!
//! The `Transactional` trait is the contract a piece of state must satisfy to be owned by a
//! [`StoreActor`](crate::StoreActor). The state exposes two entry points: `execute` for
//! commands that may mutate it, and `query` for read-only lookups. The actor takes care of
//! the rest: one command at a time, a snapshot before every command, rollback when the
//! command fails, and the `after_commit` hook once the new state is kept.
//!
//! # Effects
//! Commands never talk to the outside world directly. Anything that should happen *because*
//! a command succeeded (sending a notification, publishing an event) is pushed into the
//! `effects` buffer. The buffer is discarded on rollback and handed to
//! [`Transactional::after_commit`] on success, so no side effect ever escapes a transaction
//! that did not commit.

use async_trait::async_trait;
use std::fmt::Debug;

/// State that can be owned and mutated by a [`StoreActor`](crate::StoreActor).
///
/// # Context
/// `Context` carries the dependencies a command needs at runtime (random sources,
/// configuration, outbound collaborators). It is injected through
/// [`StoreActor::run`](crate::StoreActor::run), not at construction time, and commands
/// receive it mutably so stateful dependencies such as an RNG can advance.
#[async_trait]
pub trait Transactional: Clone + Send + Sync + 'static {
    /// Mutating request applied inside a transaction.
    type Command: Send + Debug;

    /// Successful result of a command.
    type Output: Send + Debug;

    /// Read-only request. Never mutates the state and never produces effects.
    type Query: Send + Debug;

    /// Successful result of a query.
    type QueryOutput: Send + Debug;

    /// Deferred side effect released only after commit.
    type Effect: Send + Debug;

    /// Runtime dependencies injected into every call.
    type Context: Send + Sync;

    /// Error returned by rejected commands and queries.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Applies `command` to the state.
    ///
    /// An `Err` causes the actor to restore the snapshot taken before the call and to drop
    /// every effect pushed during it.
    fn execute(
        &mut self,
        command: Self::Command,
        ctx: &mut Self::Context,
        effects: &mut Vec<Self::Effect>,
    ) -> Result<Self::Output, Self::Error>;

    /// Answers a read-only query against the current committed state.
    fn query(&self, query: Self::Query, ctx: &Self::Context)
        -> Result<Self::QueryOutput, Self::Error>;

    /// Called with the effects of a committed command. The default drops them.
    async fn after_commit(&self, _effects: Vec<Self::Effect>, _ctx: &Self::Context) {}
}
