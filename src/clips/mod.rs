//! # Clip Aggregator
//!
//! Clips bind groups of one draw into a single lottery unit. Only confirmed clip memberships
//! count; a clip left with one confirmed group (or none) after a removal is destroyed by
//! [`reconcile_clip`].

use crate::error::{DrawError, DrawResult};
use crate::guard::Guards;
use crate::model::*;
use crate::policy::Policy;
use crate::store::DrawStore;
use std::collections::BTreeSet;
use tracing::info;

/// Forms a clip from `params.groups`.
///
/// A student creator's own group joins the list and is the only seat confirmed up front;
/// reps and admins confirm every seat.
pub fn create_clip(store: &mut DrawStore, policy: &Policy, params: ClipCreate) -> DrawResult<ClipId> {
    let draw = store.require_draw(params.draw)?.clone();
    let creator = store.require_user(params.creator)?.clone();
    let creator_group = store
        .group_of(creator.id)
        .filter(|g| store.group(*g).is_some_and(|g| g.draw == Some(draw.id)));

    let mut groups = Vec::new();
    if creator.role == Role::Student {
        groups.extend(creator_group);
    }
    for group in params.groups {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }

    let mut guards = Guards::new();
    guards
        .check(draw.allow_clipping && policy.allow_clipping, || {
            format!("clipping is not allowed in {}", draw.id)
        })
        .check(draw.phase.is_group_formation(), || {
            format!("{} is in {}, not pre_lottery", draw.id, draw.phase)
        })
        .check(groups.len() >= 2, || "a clip needs at least 2 groups".into());
    let mut sizes = BTreeSet::new();
    for id in &groups {
        let group = store.require_group(*id)?;
        sizes.insert(group.size);
        guards
            .check(group.draw == Some(draw.id), || {
                format!("{id} is not in {}", draw.id)
            })
            .check(store.clip_of(*id).is_none(), || {
                format!("{id} is already in a clip")
            });
    }
    guards.check(!policy.restrict_clipping_size || sizes.len() <= 1, || {
        format!("clipped groups must share one size, got {sizes:?}")
    });
    guards.finish("create_clip")?;

    let clip = store.insert_clip(draw.id);
    for group in &groups {
        let confirmed = match creator.role {
            Role::Student => Some(*group) == creator_group,
            Role::Rep | Role::Admin => true,
        };
        let seat = store.insert_clip_membership(clip, *group, confirmed)?;
        if confirmed {
            withdraw_other_seats(store, *group, seat)?;
        }
    }

    info!(%clip, draw = %draw.id, groups = groups.len(), "Clip created");
    Ok(clip)
}

/// A group accepts its seat in a clip.
///
/// Every other pending seat of the group is withdrawn and the clips it left are reconciled.
pub fn confirm_clip_membership(store: &mut DrawStore, id: ClipMembershipId) -> DrawResult<()> {
    let seat = store.require_clip_membership(id)?.clone();
    let clip = store.require_clip(seat.clip)?.clone();
    if !store.require_draw(clip.draw)?.phase.is_group_formation() {
        return Err(DrawError::Immutable {
            entity: "clip_membership",
            field: "confirmed",
        });
    }
    let mut guards = Guards::new();
    guards.check(!seat.confirmed, || format!("{id} is already confirmed"));
    guards.finish("confirm_clip_membership")?;

    store.confirm_clip_membership(id)?;
    withdraw_other_seats(store, seat.group, id)?;

    info!(clip_membership = %id, clip = %clip.id, group = %seat.group, "Clip membership confirmed");
    Ok(())
}

/// Drops every pending seat of `group` except `kept`, then reconciles the clips it left.
fn withdraw_other_seats(
    store: &mut DrawStore,
    group: GroupId,
    kept: ClipMembershipId,
) -> DrawResult<()> {
    let withdrawn: Vec<(ClipMembershipId, ClipId)> = store
        .clip_memberships_of_group(group)
        .filter(|cm| !cm.confirmed && cm.id != kept)
        .map(|cm| (cm.id, cm.clip))
        .collect();
    for (other, _) in &withdrawn {
        store.remove_clip_membership(*other);
    }
    for clip in withdrawn.iter().map(|(_, c)| *c).collect::<BTreeSet<_>>() {
        reconcile_clip(store, clip)?;
    }
    Ok(())
}

/// Declines or leaves a clip seat.
pub fn destroy_clip_membership(store: &mut DrawStore, id: ClipMembershipId) -> DrawResult<()> {
    let seat = store.require_clip_membership(id)?.clone();
    ensure_clip_formation(store, seat.clip)?;

    store.remove_clip_membership(id);
    let destroyed = reconcile_clip(store, seat.clip)?;
    info!(clip_membership = %id, clip = %seat.clip, clip_destroyed = destroyed, "Clip membership destroyed");
    Ok(())
}

/// Removes a clip and every seat in it.
pub fn destroy_clip(store: &mut DrawStore, clip: ClipId) -> DrawResult<()> {
    store.require_clip(clip)?;
    ensure_clip_formation(store, clip)?;
    store.remove_clip(clip);
    info!(%clip, "Clip destroyed");
    Ok(())
}

/// Destroys the clip once it has at most one confirmed group. Returns whether it did.
pub fn reconcile_clip(store: &mut DrawStore, clip: ClipId) -> DrawResult<bool> {
    if store.clip(clip).is_none() {
        return Ok(false);
    }
    if store.clip_groups(clip).len() <= 1 {
        store.remove_clip(clip);
        info!(%clip, "Clip dissolved");
        return Ok(true);
    }
    Ok(false)
}

fn ensure_clip_formation(store: &DrawStore, clip: ClipId) -> DrawResult<()> {
    let draw = store.require_draw(store.require_clip(clip)?.draw)?;
    if draw.phase.is_group_formation() {
        Ok(())
    } else {
        Err(DrawError::precondition(format!(
            "{} is in {}; clips only change during pre_lottery",
            draw.id, draw.phase
        )))
    }
}
