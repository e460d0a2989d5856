//! Locking: the path from `full` through `finalizing` to `locked`.

use super::refresh_status;
use crate::error::{DrawError, DrawResult};
use crate::guard::Guards;
use crate::model::*;
use crate::notify::{Notification, NotificationEvent, Outbox};
use crate::store::DrawStore;
use tracing::info;

/// Locks every accepted member of a full group at once.
///
/// Each newly locked member is notified. Locking an already locked group is a no-op.
/// Only during group formation.
pub fn lock_group(store: &mut DrawStore, group: GroupId, outbox: &mut Outbox) -> DrawResult<()> {
    let target = store.require_group(group)?.clone();
    store.ensure_group_formation(&target)?;
    let mut guards = Guards::new();
    guards.check(target.status != GroupStatus::Open, || {
        format!("{group} is open and cannot be locked")
    });
    guards.finish("lock_group")?;

    let newly_locked: Vec<MembershipId> = store
        .memberships_of(group)
        .filter(|m| m.is_accepted() && !m.locked)
        .map(|m| m.id)
        .collect();
    let mut recipients = Vec::with_capacity(newly_locked.len());
    for id in newly_locked {
        let membership = store.membership_mut(id)?;
        membership.locked = true;
        recipients.push(membership.user);
    }
    let status = refresh_status(store, group)?;

    if !recipients.is_empty() {
        info!(%group, locked = recipients.len(), %status, "Group locked");
        outbox.push(Notification::new(
            NotificationEvent::GroupLocked { group },
            recipients,
        ));
    }
    Ok(())
}

/// Unlocks every membership. The group drops back to `full`.
pub fn unlock_group(store: &mut DrawStore, group: GroupId) -> DrawResult<()> {
    let target = store.require_group(group)?.clone();
    store.ensure_group_formation(&target)?;

    let ids: Vec<MembershipId> = store.memberships_of(group).map(|m| m.id).collect();
    for id in ids {
        store.membership_mut(id)?.locked = false;
    }
    let status = refresh_status(store, group)?;
    info!(%group, %status, "Group unlocked");
    Ok(())
}

/// The leader commits to the current roster by locking their own membership.
pub fn finalize_group(store: &mut DrawStore, group: GroupId) -> DrawResult<()> {
    let target = store.require_group(group)?.clone();
    store.ensure_group_formation(&target)?;
    let (accepted, locked) = store.fill_counts(group);

    let mut guards = Guards::new();
    guards
        .check(accepted == target.size, || {
            format!("{group} has {accepted} of {} members", target.size)
        })
        .check(locked == 0, || format!("{group} is already {}", target.status));
    if let Some(draw) = target.draw {
        let draw = store.require_draw(draw)?;
        guards.check(!draw.locked_sizes.contains(&target.size), || {
            format!("size {} is locked in {}", target.size, draw.id)
        });
    }
    guards.finish("finalize_group")?;

    let leader = store
        .memberships_of(group)
        .find(|m| m.user == target.leader && m.is_accepted())
        .map(|m| m.id)
        .ok_or_else(|| DrawError::not_found(format!("membership of {} in {group}", target.leader)))?;
    store.membership_mut(leader)?.locked = true;
    let status = refresh_status(store, group)?;
    info!(%group, %status, "Group finalizing");
    Ok(())
}

/// A member of a finalizing group locks their own place.
///
/// The last lock moves the group to `locked` and notifies the whole group.
pub fn lock_membership(
    store: &mut DrawStore,
    membership: MembershipId,
    outbox: &mut Outbox,
) -> DrawResult<()> {
    let target = store.require_membership(membership)?.clone();
    let group = store.require_group(target.group)?.clone();

    let mut guards = Guards::new();
    guards
        .check(group.status == GroupStatus::Finalizing, || {
            format!("{} is {}, not finalizing", group.id, group.status)
        })
        .check(target.is_accepted(), || format!("{membership} is not accepted"))
        .check(!target.locked, || format!("{membership} is already locked"));
    guards.finish("lock_membership")?;

    store.membership_mut(membership)?.locked = true;
    let status = refresh_status(store, group.id)?;
    info!(%membership, group = %group.id, %status, "Membership locked");
    if status == GroupStatus::Locked {
        outbox.push(Notification::new(
            NotificationEvent::GroupLocked { group: group.id },
            store.members_of(group.id),
        ));
    }
    Ok(())
}
