//! Allocation policy knobs, passed to the engine through its context.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Re-ranking applied to lottery numbers after the shuffle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSort {
    #[default]
    None,
    Ascending,
    Descending,
}

impl FromStr for SizeSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(SizeSort::None),
            "ascending" | "asc" => Ok(SizeSort::Ascending),
            "descending" | "desc" => Ok(SizeSort::Descending),
            other => Err(format!("unknown size sort '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub size_sort: SizeSort,
    /// Whether a clip ranks by its most favourable constituent size.
    pub advantage_clips: bool,
    /// Clips may only join groups of equal size.
    pub restrict_clipping_size: bool,
    /// College-wide clipping switch, on top of each draw's own flag.
    pub allow_clipping: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            size_sort: SizeSort::None,
            advantage_clips: false,
            restrict_clipping_size: true,
            allow_clipping: true,
        }
    }
}
