//! # Observability
//!
//! [`setup_tracing`] installs the compact subscriber used by every binary built on the
//! store. Verbosity follows `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=info cargo run            # commits, rollbacks, domain decisions
//! RUST_LOG=debug cargo run           # full command payloads
//! RUST_LOG=store_actor=debug cargo run
//! ```
//!
//! With `info`, a committed command and a refused one look like:
//!
//! ```text
//! INFO Committed state_type="DrawStore" tx=12 effects=1
//! WARN Rolled back state_type="DrawStore" error=Preconditions not met: ... discarded=0
//! ```

/// Initializes the global tracing subscriber.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
