use crate::model::{ClipId, ClipMembershipId, DrawId, GroupId, UserId};
use serde::{Deserialize, Serialize};

/// Groups that go through the lottery as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub draw: DrawId,
}

/// A group's seat in a clip. `clip` and `group` never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipMembership {
    pub id: ClipMembershipId,
    pub clip: ClipId,
    pub group: GroupId,
    pub confirmed: bool,
}

/// Payload for forming a clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipCreate {
    pub draw: DrawId,
    pub groups: Vec<GroupId>,
    /// Who submitted the clip; decides which memberships start confirmed.
    pub creator: UserId,
}
