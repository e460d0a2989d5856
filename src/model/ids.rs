//! Type-safe identifiers for every table in the draw store.
//!
//! Each id wraps a `u32` handed out by the store's sequence and renders with a table prefix
//! (`group_3`, `suite_12`) so log lines stay readable.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

macro_rules! entity_id {
    ($($name:ident => $prefix:literal),* $(,)?) => {
        paste::paste! {
            $(
                /// Type-safe identifier.
                #[derive(
                    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
                )]
                pub struct [<$name Id>](pub u32);

                impl From<u32> for [<$name Id>] {
                    fn from(id: u32) -> Self {
                        Self(id)
                    }
                }

                impl Display for [<$name Id>] {
                    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                        write!(f, concat!($prefix, "_{}"), self.0)
                    }
                }
            )*
        }
    };
}

entity_id! {
    User => "user",
    Draw => "draw",
    Group => "group",
    Membership => "membership",
    Clip => "clip",
    ClipMembership => "clip_membership",
    Lottery => "lottery",
    Suite => "suite",
}
