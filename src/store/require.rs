//! Lookups that turn a missing row into [`DrawError::NotFound`].

use super::DrawStore;
use crate::error::{DrawError, DrawResult};
use crate::model::*;

impl DrawStore {
    pub fn require_user(&self, id: UserId) -> DrawResult<&User> {
        self.user(id).ok_or_else(|| DrawError::not_found(id))
    }

    pub fn require_draw(&self, id: DrawId) -> DrawResult<&Draw> {
        self.draw(id).ok_or_else(|| DrawError::not_found(id))
    }

    pub fn require_group(&self, id: GroupId) -> DrawResult<&Group> {
        self.group(id).ok_or_else(|| DrawError::not_found(id))
    }

    pub fn require_membership(&self, id: MembershipId) -> DrawResult<&Membership> {
        self.membership(id).ok_or_else(|| DrawError::not_found(id))
    }

    pub fn require_clip(&self, id: ClipId) -> DrawResult<&Clip> {
        self.clip(id).ok_or_else(|| DrawError::not_found(id))
    }

    pub fn require_clip_membership(&self, id: ClipMembershipId) -> DrawResult<&ClipMembership> {
        self.clip_membership(id)
            .ok_or_else(|| DrawError::not_found(id))
    }

    pub fn require_suite(&self, id: SuiteId) -> DrawResult<&Suite> {
        self.suite(id).ok_or_else(|| DrawError::not_found(id))
    }

    pub(crate) fn draw_mut(&mut self, id: DrawId) -> DrawResult<&mut Draw> {
        self.draws.get_mut(&id).ok_or_else(|| DrawError::not_found(id))
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> DrawResult<&mut Group> {
        self.groups.get_mut(&id).ok_or_else(|| DrawError::not_found(id))
    }

    pub(crate) fn user_mut(&mut self, id: UserId) -> DrawResult<&mut User> {
        self.users.get_mut(&id).ok_or_else(|| DrawError::not_found(id))
    }

    pub(crate) fn membership_mut(&mut self, id: MembershipId) -> DrawResult<&mut Membership> {
        self.memberships
            .get_mut(&id)
            .ok_or_else(|| DrawError::not_found(id))
    }

    /// The phase gating changes to `group`. Drawless groups are never gated.
    pub(crate) fn ensure_group_formation(&self, group: &Group) -> DrawResult<()> {
        let Some(draw) = group.draw else {
            return Ok(());
        };
        let draw = self.require_draw(draw)?;
        if draw.phase.is_group_formation() {
            Ok(())
        } else {
            Err(DrawError::precondition(format!(
                "{} is in {}; groups only change during pre_lottery",
                draw.id, draw.phase
            )))
        }
    }
}
