//! Group creation and group-level edits.

use super::{check_membership, refresh_status};
use crate::error::{DrawError, DrawResult};
use crate::guard::Guards;
use crate::model::*;
use crate::store::DrawStore;
use std::collections::BTreeSet;
use tracing::info;

/// Forms a group led by `params.leader` in the leader's draw.
///
/// The leader's membership is accepted on the spot; everyone in `params.invite` is invited.
pub fn create_group(store: &mut DrawStore, params: GroupCreate) -> DrawResult<GroupId> {
    let leader = store.require_user(params.leader)?.clone();
    let draw_id = leader
        .draw
        .ok_or_else(|| DrawError::precondition(format!("{} is not in a draw", leader.id)))?;
    let draw = store.require_draw(draw_id)?;
    let size = params.size;

    let invitees: BTreeSet<UserId> = params
        .invite
        .iter()
        .copied()
        .filter(|u| *u != leader.id)
        .collect();

    let mut guards = Guards::new();
    guards
        .check(draw.phase.is_group_formation(), || {
            format!("{} is in {}, not pre_lottery", draw.id, draw.phase)
        })
        .check(size > 0, || "group size must be at least 1".into())
        .check(!draw.locked_sizes.contains(&size), || {
            format!("size {size} is locked in {}", draw.id)
        })
        .check(
            store
                .available_suites(draw_id)
                .iter()
                .any(|s| s.size() == size),
            || format!("{} has no available suite of size {size}", draw.id),
        )
        .check(store.group_of(leader.id).is_none(), || {
            format!("{} already belongs to a group", leader.id)
        })
        .check(leader.intent == Intent::OnCampus, || {
            format!("{} has not declared on-campus intent", leader.id)
        })
        .check(invitees.len() < size.max(1) as usize, || {
            format!("{} invitations do not fit a group of {size}", invitees.len())
        });
    guards.finish("create_group")?;

    let group = store.insert_group(
        format!("{}'s Group", leader.name),
        size,
        leader.id,
        Some(draw_id),
    );
    store.insert_membership(group, leader.id, MembershipStatus::Accepted)?;
    for user in invitees {
        let mut guards = Guards::new();
        check_membership(store, group, user, false, &mut guards)?;
        guards.finish("create_group")?;
        store.insert_membership(group, user, MembershipStatus::Invited)?;
    }
    let status = refresh_status(store, group)?;

    info!(%group, %draw_id, size, %status, "Group created");
    Ok(group)
}

/// Forms a drawless group with every member accepted.
///
/// Members leave their draws: each draw pointer is parked in `old_draw` until the group is
/// disbanded.
pub fn create_special_group(
    store: &mut DrawStore,
    params: SpecialGroupCreate,
) -> DrawResult<GroupId> {
    let leader = store.require_user(params.leader)?.clone();
    let mut members = vec![leader.id];
    for user in params.members {
        if !members.contains(&user) {
            members.push(user);
        }
    }

    let mut guards = Guards::new();
    guards
        .check(params.size > 0, || "group size must be at least 1".into())
        .check(members.len() <= params.size as usize, || {
            format!("{} members do not fit a group of {}", members.len(), params.size)
        });
    for user in &members {
        let user = store.require_user(*user)?;
        guards
            .check(store.group_of(user.id).is_none(), || {
                format!("{} already belongs to a group", user.id)
            })
            .check(user.intent == Intent::OnCampus, || {
                format!("{} has not declared on-campus intent", user.id)
            });
    }
    guards.finish("create_special_group")?;

    for user in &members {
        let user = store.user_mut(*user)?;
        user.old_draw = user.draw.take();
    }
    let group = store.insert_group(
        format!("{}'s Special Group", leader.name),
        params.size,
        leader.id,
        None,
    );
    for user in &members {
        store.insert_membership(group, *user, MembershipStatus::Accepted)?;
    }
    let status = refresh_status(store, group)?;

    info!(%group, members = members.len(), %status, "Special group created");
    Ok(group)
}

/// Hands leadership to another accepted member. Only during group formation.
pub fn change_leader(store: &mut DrawStore, group: GroupId, user: UserId) -> DrawResult<()> {
    let target = store.require_group(group)?.clone();
    store.ensure_group_formation(&target)?;
    let accepted = store
        .memberships_of(group)
        .any(|m| m.user == user && m.is_accepted());
    let mut guards = Guards::new();
    guards.check(accepted, || format!("{user} is not an accepted member of {group}"));
    guards.finish("change_leader")?;

    store.group_mut(group)?.leader = user;
    info!(%group, leader = %user, "Leader changed");
    Ok(())
}

/// Resizes a group that has not started locking.
pub fn update_group_size(store: &mut DrawStore, group: GroupId, size: u32) -> DrawResult<()> {
    let current = store.require_group(group)?.clone();
    store.ensure_group_formation(&current)?;
    let (accepted, _) = store.fill_counts(group);

    let mut guards = Guards::new();
    guards
        .check(
            !matches!(current.status, GroupStatus::Finalizing | GroupStatus::Locked),
            || format!("{group} is {}", current.status),
        )
        .check(size > 0 && size >= accepted, || {
            format!("size {size} is smaller than the {accepted} accepted members")
        });
    if let Some(draw_id) = current.draw {
        let draw = store.require_draw(draw_id)?;
        guards
            .check(!draw.locked_sizes.contains(&size), || {
                format!("size {size} is locked in {draw_id}")
            })
            .check(
                store
                    .available_suites(draw_id)
                    .iter()
                    .any(|s| s.size() == size),
                || format!("{draw_id} has no available suite of size {size}"),
            );
    }
    guards.finish("update_group_size")?;

    store.group_mut(group)?.size = size;
    let status = refresh_status(store, group)?;
    info!(%group, size, %status, "Group resized");
    Ok(())
}
