//! Plain records stored in the [`DrawStore`](crate::store::DrawStore), plus the payloads
//! used to create them.

pub mod clip;
pub mod draw;
pub mod group;
pub mod ids;
pub mod lottery;
pub mod membership;
pub mod suite;
pub mod user;

pub use clip::*;
pub use draw::*;
pub use group::*;
pub use ids::*;
pub use lottery::*;
pub use membership::*;
pub use suite::*;
pub use user::*;
