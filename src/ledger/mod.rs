//! # Group & Membership Ledger
//!
//! Who belongs to which group, and how full each group is.
//!
//! A group's [`GroupStatus`] is never written directly. Every function here that touches the
//! membership table ends with [`refresh_status`], which re-derives the status from the
//! accepted and locked membership counts.

pub mod cascade;
pub mod groups;
pub mod locking;
pub mod memberships;

pub use cascade::destroy_group;
pub use groups::{change_leader, create_group, create_special_group, update_group_size};
pub use locking::{finalize_group, lock_group, lock_membership, unlock_group};
pub use memberships::{
    accept_membership, invite_member, leave_group, remove_member, request_membership,
};

use crate::error::DrawResult;
use crate::guard::Guards;
use crate::model::{GroupId, GroupStatus, Intent, UserId};
use crate::store::DrawStore;

/// Re-derives the group's status from its memberships and stores it.
pub fn refresh_status(store: &mut DrawStore, group: GroupId) -> DrawResult<GroupStatus> {
    let (accepted, locked) = store.fill_counts(group);
    let group = store.group_mut(group)?;
    group.status = GroupStatus::derive(group.size, accepted, locked);
    Ok(group.status)
}

/// Rules every new membership must satisfy.
///
/// `accepting` is set when the membership is created (or turns) accepted, which is when the
/// one-group-per-user rule applies.
pub(crate) fn check_membership(
    store: &DrawStore,
    group: GroupId,
    user: UserId,
    accepting: bool,
    guards: &mut Guards,
) -> DrawResult<()> {
    let group = store.require_group(group)?;
    let user = store.require_user(user)?;
    guards
        .check(group.draw == user.draw, || {
            format!("{} and {} are not in the same draw", user.id, group.id)
        })
        .check(group.status == GroupStatus::Open, || {
            format!("{} is {}", group.id, group.status)
        })
        .check(user.intent == Intent::OnCampus, || {
            format!("{} has not declared on-campus intent", user.id)
        })
        .check(
            !accepting || store.group_of(user.id).map_or(true, |g| g == group.id),
            || format!("{} already belongs to a group", user.id),
        );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MembershipStatus;
    use crate::testing::Fixture;

    #[test]
    fn test_status_follows_membership_counts() {
        let mut fx = Fixture::new();
        let leader = fx.student("Lee");
        let group = fx
            .store
            .insert_group("G".into(), 2, leader, Some(fx.draw));
        fx.store
            .insert_membership(group, leader, MembershipStatus::Accepted)
            .unwrap();
        assert_eq!(refresh_status(&mut fx.store, group).unwrap(), GroupStatus::Open);

        let mate = fx.student("Mo");
        fx.store
            .insert_membership(group, mate, MembershipStatus::Accepted)
            .unwrap();
        assert_eq!(refresh_status(&mut fx.store, group).unwrap(), GroupStatus::Full);
    }

    #[test]
    fn test_membership_rules_report_every_violation() {
        let mut fx = Fixture::new();
        let group = fx.group(1);
        let stranger = fx
            .store
            .insert_user(crate::model::UserCreate::student("Zed", Intent::Undeclared));

        let mut guards = Guards::new();
        check_membership(&fx.store, group, stranger, true, &mut guards).unwrap();
        assert_eq!(guards.into_violations().len(), 3);
    }
}
