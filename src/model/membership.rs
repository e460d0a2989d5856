use crate::model::{GroupId, MembershipId, UserId};
use serde::{Deserialize, Serialize};

/// Where a membership is in the request/invite handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipStatus {
    /// The user asked to join; the leader has not answered.
    Requested,
    /// The leader invited the user; the user has not answered.
    Invited,
    Accepted,
}

/// A (group, user) pair.
///
/// Once `locked`, the row is immutable and cannot be destroyed on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub group: GroupId,
    pub user: UserId,
    pub status: MembershipStatus,
    pub locked: bool,
}

impl Membership {
    pub fn is_accepted(&self) -> bool {
        self.status == MembershipStatus::Accepted
    }

    pub fn is_pending(&self) -> bool {
        !self.is_accepted()
    }
}
