//! # Suite Draw
//!
//! > **A housing draw engine: groups form, a lottery orders them, suites get picked.**
//!
//! A draw allocates a pool of suites (each built of rooms) to competing groups of students.
//! It moves strictly forward through five phases:
//!
//! ```text
//! draft → pre_lottery → lottery → suite_selection → results
//! ```
//!
//! Students form groups during `pre_lottery`, optionally clip groups together so they share
//! one lottery number, and lock their rosters. The lottery hands every unit a random number;
//! during `suite_selection` the lowest unselected number picks next.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One store, one transaction at a time
//! All relational state lives in a single [`DrawStore`](store::DrawStore) owned by a
//! [`StoreActor`](store_actor::StoreActor). Commands never interleave, and a failed command
//! is rolled back whole. Guards that span many rows ("every group is locked", "no suite is
//! contested") are therefore checked and acted on atomically.
//!
//! ### Plain functions for the rules
//! Every rule lives in a synchronous function over `&mut DrawStore`. The actor only
//! provides isolation, so the rules are tested without a runtime.
//!
//! ### Side effects after commit
//! Operations push [`Notification`](notify::Notification)s into an outbox. The outbox
//! reaches the [`Notifier`](notify::Notifier) only once the command has committed.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`], [`store`])
//! - **Role**: typed records and the tables holding them, with their unique indices.
//! - **Key items**: [`DrawStore`](store::DrawStore), [`GroupStatus`](model::GroupStatus).
//!
//! ### 2. The Rules
//! - [`ledger`]: groups, memberships, locking and the group cascade.
//! - [`clips`]: joint lottery units.
//! - [`phase`]: the phase state machine and draw setup.
//! - [`lottery`]: lottery units and number assignment.
//! - [`selection`]: turn order and suite picks.
//! - [`oversubscription`]: demand against supply, and pruning.
//!
//! ### 3. The Engine ([`engine`])
//! - **Role**: maps each [`DrawCommand`](engine::DrawCommand) onto the rules and implements
//!   [`Transactional`](store_actor::Transactional) for the store.
//!
//! ### 4. The Interface ([`clients`])
//! - **Role**: [`DrawClient`](clients::DrawClient), one async method per operation.
//!
//! ### 5. The Orchestrator ([`lifecycle`])
//! - **Role**: [`DrawSystem`](lifecycle::DrawSystem) spawns the store and mailer actors and
//!   shuts them down.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo draw with info logs
//! RUST_LOG=info cargo run
//!
//! # Reproducible lottery, smallest groups first
//! SUITE_DRAW_SEED=7 SUITE_DRAW_SIZE_SORT=ascending cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test --workspace
//! ```

pub mod clients;
pub mod clips;
pub mod config;
pub mod engine;
pub mod error;
mod guard;
pub mod ledger;
pub mod lifecycle;
pub mod lottery;
pub mod model;
pub mod notify;
pub mod oversubscription;
pub mod phase;
pub mod policy;
pub mod rng;
pub mod selection;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{DrawError, DrawResult};
