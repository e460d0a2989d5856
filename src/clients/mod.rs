//! Type-safe wrappers around [`StoreClient`](store_actor::StoreClient).

pub mod draw_client;

pub use draw_client::*;
