use crate::model::{ClipId, DrawId, GroupId, LotteryId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// The subject of one lottery number: a lone group or a whole clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitKey {
    Group(GroupId),
    Clip(ClipId),
}

impl Display for UnitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKey::Group(id) => id.fmt(f),
            UnitKey::Clip(id) => id.fmt(f),
        }
    }
}

/// A persisted lottery unit with its number.
///
/// `selected` is true exactly when every group in `groups` holds a suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotteryAssignment {
    pub id: LotteryId,
    pub draw: DrawId,
    pub number: u32,
    pub selected: bool,
    pub clip: Option<ClipId>,
    pub groups: BTreeSet<GroupId>,
}

impl LotteryAssignment {
    /// The unit this number belongs to. `None` for an assignment with neither clip nor
    /// group, which the store never keeps.
    pub fn key(&self) -> Option<UnitKey> {
        match self.clip {
            Some(clip) => Some(UnitKey::Clip(clip)),
            None => self.groups.first().copied().map(UnitKey::Group),
        }
    }
}
