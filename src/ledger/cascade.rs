//! Destroying a group and everything hanging off it.

use crate::clips::reconcile_clip;
use crate::error::DrawResult;
use crate::guard::Guards;
use crate::model::*;
use crate::notify::{Notification, NotificationEvent, Outbox};
use crate::selection::refresh_selected;
use crate::store::DrawStore;
use std::collections::BTreeSet;
use tracing::info;

/// Destroys `group` with its memberships, clip seats and lottery seat.
///
/// Affected clips are reconciled and the group's lottery assignment loses the group (and
/// disappears once empty). Members of a drawless group get their parked draw back. The
/// accepted members are notified.
pub fn destroy_group(store: &mut DrawStore, group: GroupId, outbox: &mut Outbox) -> DrawResult<()> {
    let target = store.require_group(group)?.clone();
    let mut guards = Guards::new();
    guards.check(store.suite_of(group).is_none(), || {
        format!("{group} holds a suite; remove it first")
    });
    guards.finish("destroy_group")?;

    let members = store.members_of(group);
    let memberships: Vec<MembershipId> = store.memberships_of(group).map(|m| m.id).collect();
    for id in memberships {
        store.remove_membership(id);
    }

    let seats: Vec<(ClipMembershipId, ClipId)> = store
        .clip_memberships_of_group(group)
        .map(|cm| (cm.id, cm.clip))
        .collect();
    let clips: BTreeSet<ClipId> = seats.iter().map(|(_, clip)| *clip).collect();
    for (id, _) in seats {
        store.remove_clip_membership(id);
    }
    for clip in clips {
        reconcile_clip(store, clip)?;
    }

    if let Some(lottery) = store.lottery_of(group).map(|l| l.id) {
        if let Some(assignment) = store.lotteries.get_mut(&lottery) {
            assignment.groups.remove(&group);
        }
        if store.lottery(lottery).is_some_and(|l| l.groups.is_empty()) {
            store.remove_lottery(lottery);
        } else {
            refresh_selected(store, lottery)?;
        }
    }

    if target.draw.is_none() {
        for user in &members {
            let user = store.user_mut(*user)?;
            user.draw = user.old_draw.take();
        }
    }
    store.remove_group(group);

    info!(%group, members = members.len(), "Group destroyed");
    outbox.push(Notification::new(
        NotificationEvent::GroupDisbanded { group },
        members,
    ));
    Ok(())
}
