//! The request/invite handshake, and leaving.

use super::{check_membership, refresh_status};
use crate::error::{DrawError, DrawResult};
use crate::guard::Guards;
use crate::model::*;
use crate::store::DrawStore;
use tracing::info;

/// A user asks to join `group`.
pub fn request_membership(
    store: &mut DrawStore,
    group: GroupId,
    user: UserId,
) -> DrawResult<MembershipId> {
    open_pending(store, group, user, MembershipStatus::Requested)
}

/// The leader of `group` invites `user`.
pub fn invite_member(
    store: &mut DrawStore,
    group: GroupId,
    user: UserId,
) -> DrawResult<MembershipId> {
    open_pending(store, group, user, MembershipStatus::Invited)
}

fn open_pending(
    store: &mut DrawStore,
    group: GroupId,
    user: UserId,
    status: MembershipStatus,
) -> DrawResult<MembershipId> {
    let target = store.require_group(group)?.clone();
    store.ensure_group_formation(&target)?;
    let mut guards = Guards::new();
    check_membership(store, group, user, false, &mut guards)?;
    guards.finish("open_membership")?;

    let membership = store.insert_membership(group, user, status)?;
    info!(%membership, %group, %user, ?status, "Membership opened");
    Ok(membership)
}

/// The counterpart of a pending membership accepts it.
///
/// Every other pending membership of the user is destroyed.
pub fn accept_membership(store: &mut DrawStore, membership: MembershipId) -> DrawResult<()> {
    let pending = store.require_membership(membership)?.clone();
    let group = store.require_group(pending.group)?.clone();
    store.ensure_group_formation(&group)?;

    let (accepted, _) = store.fill_counts(group.id);
    let mut guards = Guards::new();
    guards
        .check(pending.is_pending(), || format!("{membership} is already accepted"))
        .check(accepted < group.size, || format!("{} is full", group.id));
    check_membership(store, group.id, pending.user, true, &mut guards)?;
    guards.finish("accept_membership")?;

    store.accept_membership(membership)?;
    let stale: Vec<MembershipId> = store
        .memberships_of_user(pending.user)
        .filter(|m| m.is_pending())
        .map(|m| m.id)
        .collect();
    for id in &stale {
        store.remove_membership(*id);
    }
    let status = refresh_status(store, group.id)?;

    info!(
        %membership,
        group = %group.id,
        user = %pending.user,
        %status,
        purged = stale.len(),
        "Membership accepted"
    );
    Ok(())
}

/// A member leaves their group.
pub fn leave_group(store: &mut DrawStore, membership: MembershipId) -> DrawResult<()> {
    destroy_membership(store, membership, "leave_group")
}

/// The leader removes a member, or declines a request or invitation.
pub fn remove_member(store: &mut DrawStore, membership: MembershipId) -> DrawResult<()> {
    destroy_membership(store, membership, "remove_member")
}

fn destroy_membership(
    store: &mut DrawStore,
    membership: MembershipId,
    operation: &'static str,
) -> DrawResult<()> {
    let target = store.require_membership(membership)?.clone();
    let group = store.require_group(target.group)?.clone();
    if target.locked {
        return Err(DrawError::Immutable {
            entity: "membership",
            field: "locked",
        });
    }
    store.ensure_group_formation(&group)?;
    let mut guards = Guards::new();
    guards.check(target.user != group.leader, || {
        format!("{} leads {}; change the leader or disband", target.user, group.id)
    });
    guards.finish(operation)?;

    store.remove_membership(membership);
    let status = refresh_status(store, group.id)?;
    info!(%membership, group = %group.id, user = %target.user, %status, "Membership destroyed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{create_group, lock_group};
    use crate::testing::Fixture;

    fn open_group(fx: &mut Fixture, size: u32) -> (GroupId, UserId) {
        fx.suite(size);
        let leader = fx.student("Lead");
        let group = create_group(
            &mut fx.store,
            GroupCreate {
                leader,
                size,
                invite: vec![],
            },
        )
        .unwrap();
        (group, leader)
    }

    #[test]
    fn test_accepting_purges_other_pending_memberships() {
        let mut fx = Fixture::new();
        let (first, _) = open_group(&mut fx, 2);
        let (second, _) = open_group(&mut fx, 2);
        let user = fx.student("Sam");

        let invite = invite_member(&mut fx.store, first, user).unwrap();
        let request = request_membership(&mut fx.store, second, user).unwrap();
        accept_membership(&mut fx.store, invite).unwrap();

        assert!(fx.store.membership(request).is_none());
        assert_eq!(fx.store.group_of(user), Some(first));
        assert_eq!(fx.store.group(first).unwrap().status, GroupStatus::Full);
    }

    #[test]
    fn test_accepting_into_full_group_is_rejected() {
        let mut fx = Fixture::new();
        let (group, _) = open_group(&mut fx, 2);
        let a = fx.student("A");
        let b = fx.student("B");
        let first = invite_member(&mut fx.store, group, a).unwrap();
        let second = invite_member(&mut fx.store, group, b).unwrap();

        accept_membership(&mut fx.store, first).unwrap();
        let err = accept_membership(&mut fx.store, second).unwrap_err();
        assert!(matches!(err, DrawError::Precondition(_)));
        assert!(fx.store.membership(second).unwrap().is_pending());
    }

    #[test]
    fn test_undeclared_students_cannot_join() {
        let mut fx = Fixture::new();
        let (group, _) = open_group(&mut fx, 2);
        let user = fx
            .store
            .insert_user(UserCreate::student("Una", Intent::Undeclared).in_draw(fx.draw));
        assert!(request_membership(&mut fx.store, group, user).is_err());
    }

    #[test]
    fn test_leader_and_locked_memberships_cannot_leave() {
        let mut fx = Fixture::new();
        let group = fx.group(2);
        let leader = fx.store.group(group).unwrap().leader;
        let leader_membership = fx.store.accepted_membership(leader).unwrap().id;
        assert!(matches!(
            leave_group(&mut fx.store, leader_membership),
            Err(DrawError::Precondition(_))
        ));

        let mut outbox = Vec::new();
        lock_group(&mut fx.store, group, &mut outbox).unwrap();
        let other = fx
            .store
            .memberships_of(group)
            .find(|m| m.user != leader)
            .unwrap()
            .id;
        assert_eq!(
            remove_member(&mut fx.store, other).unwrap_err(),
            DrawError::Immutable {
                entity: "membership",
                field: "locked"
            }
        );
    }

    #[test]
    fn test_leaving_reopens_group() {
        let mut fx = Fixture::new();
        let group = fx.group(2);
        let leader = fx.store.group(group).unwrap().leader;
        let other = fx
            .store
            .memberships_of(group)
            .find(|m| m.user != leader)
            .unwrap()
            .id;

        leave_group(&mut fx.store, other).unwrap();
        assert_eq!(fx.store.group(group).unwrap().status, GroupStatus::Open);
    }
}
