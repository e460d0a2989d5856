use crate::model::{DrawId, GroupId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Fill state of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupStatus {
    Open,
    Full,
    Finalizing,
    Locked,
}

impl GroupStatus {
    /// Derives the status from the membership table.
    ///
    /// `accepted` counts accepted memberships and `locked` counts the locked ones among
    /// them.
    pub fn derive(size: u32, accepted: u32, locked: u32) -> GroupStatus {
        if accepted < size {
            GroupStatus::Open
        } else if locked >= size {
            GroupStatus::Locked
        } else if locked > 0 {
            GroupStatus::Finalizing
        } else {
            GroupStatus::Full
        }
    }
}

impl Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GroupStatus::Open => "open",
            GroupStatus::Full => "full",
            GroupStatus::Finalizing => "finalizing",
            GroupStatus::Locked => "locked",
        };
        f.write_str(name)
    }
}

/// A set of users jointly seeking one suite.
///
/// `status` is only ever written by the ledger's status refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub size: u32,
    pub status: GroupStatus,
    pub leader: UserId,
    /// `None` for drawless (special) groups.
    pub draw: Option<DrawId>,
}

/// Payload for forming a group inside a draw.
///
/// The leader joins immediately; everyone in `invite` receives an invitation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCreate {
    pub leader: UserId,
    pub size: u32,
    pub invite: Vec<UserId>,
}

/// Payload for an administrator-built drawless group.
///
/// Every listed member joins immediately, accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialGroupCreate {
    pub leader: UserId,
    pub size: u32,
    pub members: Vec<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_status_table() {
        assert_eq!(GroupStatus::derive(3, 2, 0), GroupStatus::Open);
        assert_eq!(GroupStatus::derive(3, 3, 0), GroupStatus::Full);
        assert_eq!(GroupStatus::derive(3, 3, 1), GroupStatus::Finalizing);
        assert_eq!(GroupStatus::derive(3, 3, 3), GroupStatus::Locked);
        assert_eq!(GroupStatus::derive(1, 1, 1), GroupStatus::Locked);
    }

    proptest! {
        #[test]
        fn full_iff_accepted_equals_size(size in 1u32..8, accepted in 0u32..8) {
            prop_assume!(accepted <= size);
            let status = GroupStatus::derive(size, accepted, 0);
            prop_assert_eq!(status == GroupStatus::Full, accepted == size);
            prop_assert_eq!(status == GroupStatus::Open, accepted < size);
        }
    }
}
