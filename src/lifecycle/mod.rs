//! Startup, wiring and shutdown of the draw engine's actors.

pub mod draw_system;

pub use draw_system::DrawSystem;
pub use store_actor::tracing::setup_tracing;
