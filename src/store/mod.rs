//! # Draw Store
//!
//! The in-memory relational state every engine operation reads and writes. Tables are
//! ordered maps keyed by typed ids, which keeps iteration (and therefore every seeded random
//! choice made over it) deterministic.
//!
//! Unique indices live on the insert paths:
//!
//! | Index | Enforced by |
//! |-------|-------------|
//! | one membership per (group, user) | [`DrawStore::insert_membership`] |
//! | one accepted membership per user | [`DrawStore::insert_membership`], [`DrawStore::accept_membership`] |
//! | one clip membership per (clip, group) | [`DrawStore::insert_clip_membership`] |
//! | one confirmed clip membership per group | [`DrawStore::confirm_clip_membership`] |
//! | lottery number unique per draw | [`DrawStore::insert_lottery`], [`DrawStore::renumber_lottery`] |
//! | suite owned by one group, group owns one suite | [`DrawStore::assign_suite`] |
//!
//! Cascades are not the store's business; the engine modules run them explicitly.

pub mod error;
mod require;

pub use error::LedgerError;

use crate::model::*;
use std::collections::{BTreeMap, BTreeSet};

/// Every table of the draw engine.
#[derive(Debug, Clone, Default)]
pub struct DrawStore {
    sequence: u32,
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) draws: BTreeMap<DrawId, Draw>,
    pub(crate) groups: BTreeMap<GroupId, Group>,
    pub(crate) memberships: BTreeMap<MembershipId, Membership>,
    pub(crate) clips: BTreeMap<ClipId, Clip>,
    pub(crate) clip_memberships: BTreeMap<ClipMembershipId, ClipMembership>,
    pub(crate) lotteries: BTreeMap<LotteryId, LotteryAssignment>,
    pub(crate) suites: BTreeMap<SuiteId, Suite>,
    /// Suite ownership, indexed both ways.
    pub(crate) suite_owners: BTreeMap<SuiteId, GroupId>,
    pub(crate) group_suites: BTreeMap<GroupId, SuiteId>,
}

impl DrawStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        self.sequence += 1;
        self.sequence
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn draw(&self, id: DrawId) -> Option<&Draw> {
        self.draws.get(&id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn membership(&self, id: MembershipId) -> Option<&Membership> {
        self.memberships.get(&id)
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.get(&id)
    }

    pub fn clip_membership(&self, id: ClipMembershipId) -> Option<&ClipMembership> {
        self.clip_memberships.get(&id)
    }

    pub fn lottery(&self, id: LotteryId) -> Option<&LotteryAssignment> {
        self.lotteries.get(&id)
    }

    pub fn suite(&self, id: SuiteId) -> Option<&Suite> {
        self.suites.get(&id)
    }

    pub fn draws(&self) -> impl Iterator<Item = &Draw> {
        self.draws.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Users of the draw with the student role.
    pub fn students_in(&self, draw: DrawId) -> impl Iterator<Item = &User> {
        self.users
            .values()
            .filter(move |u| u.role == Role::Student && u.draw == Some(draw))
    }

    pub fn groups_in(&self, draw: DrawId) -> impl Iterator<Item = &Group> {
        self.groups.values().filter(move |g| g.draw == Some(draw))
    }

    pub fn memberships_of(&self, group: GroupId) -> impl Iterator<Item = &Membership> {
        self.memberships.values().filter(move |m| m.group == group)
    }

    pub fn memberships_of_user(&self, user: UserId) -> impl Iterator<Item = &Membership> {
        self.memberships.values().filter(move |m| m.user == user)
    }

    /// The user's accepted membership, if any.
    pub fn accepted_membership(&self, user: UserId) -> Option<&Membership> {
        self.memberships_of_user(user).find(|m| m.is_accepted())
    }

    /// The group the user has accepted a place in.
    pub fn group_of(&self, user: UserId) -> Option<GroupId> {
        self.accepted_membership(user).map(|m| m.group)
    }

    /// Accepted members of the group.
    pub fn members_of(&self, group: GroupId) -> Vec<UserId> {
        self.memberships_of(group)
            .filter(|m| m.is_accepted())
            .map(|m| m.user)
            .collect()
    }

    /// `(accepted, locked)` membership counts of the group.
    pub fn fill_counts(&self, group: GroupId) -> (u32, u32) {
        self.memberships_of(group)
            .filter(|m| m.is_accepted())
            .fold((0, 0), |(accepted, locked), m| {
                (accepted + 1, locked + u32::from(m.locked))
            })
    }

    pub fn clip_memberships_of_clip(&self, clip: ClipId) -> impl Iterator<Item = &ClipMembership> {
        self.clip_memberships.values().filter(move |cm| cm.clip == clip)
    }

    pub fn clip_memberships_of_group(
        &self,
        group: GroupId,
    ) -> impl Iterator<Item = &ClipMembership> {
        self.clip_memberships
            .values()
            .filter(move |cm| cm.group == group)
    }

    /// Groups holding a confirmed seat in the clip.
    pub fn clip_groups(&self, clip: ClipId) -> Vec<GroupId> {
        self.clip_memberships_of_clip(clip)
            .filter(|cm| cm.confirmed)
            .map(|cm| cm.group)
            .collect()
    }

    /// The clip the group holds a confirmed seat in.
    pub fn clip_of(&self, group: GroupId) -> Option<ClipId> {
        self.clip_memberships_of_group(group)
            .find(|cm| cm.confirmed)
            .map(|cm| cm.clip)
    }

    pub fn clips_in(&self, draw: DrawId) -> impl Iterator<Item = &Clip> {
        self.clips.values().filter(move |c| c.draw == draw)
    }

    pub fn lotteries_in(&self, draw: DrawId) -> impl Iterator<Item = &LotteryAssignment> {
        self.lotteries.values().filter(move |l| l.draw == draw)
    }

    /// The lottery assignment covering the group.
    pub fn lottery_of(&self, group: GroupId) -> Option<&LotteryAssignment> {
        self.lotteries.values().find(|l| l.groups.contains(&group))
    }

    pub fn suite_of(&self, group: GroupId) -> Option<SuiteId> {
        self.group_suites.get(&group).copied()
    }

    pub fn owner_of(&self, suite: SuiteId) -> Option<GroupId> {
        self.suite_owners.get(&suite).copied()
    }

    /// Active, unclaimed suites attached to the draw.
    pub fn available_suites(&self, draw: DrawId) -> Vec<&Suite> {
        let Some(draw) = self.draws.get(&draw) else {
            return Vec::new();
        };
        draw.suites
            .iter()
            .filter_map(|id| self.suites.get(id))
            .filter(|s| s.active && !self.suite_owners.contains_key(&s.id))
            .collect()
    }

    // =========================================================================
    // INSERTS
    // =========================================================================

    pub fn insert_user(&mut self, params: UserCreate) -> UserId {
        let id = UserId(self.next_id());
        self.users.insert(
            id,
            User {
                id,
                name: params.name,
                email: params.email,
                role: params.role,
                intent: params.intent,
                draw: params.draw,
                old_draw: None,
            },
        );
        id
    }

    pub fn insert_suite(&mut self, params: SuiteCreate) -> SuiteId {
        let id = SuiteId(self.next_id());
        self.suites.insert(
            id,
            Suite {
                id,
                building: params.building,
                number: params.number,
                rooms: params.rooms,
                active: true,
            },
        );
        id
    }

    pub fn insert_draw(&mut self, params: DrawCreate, phase: Phase) -> DrawId {
        let id = DrawId(self.next_id());
        self.draws.insert(
            id,
            Draw {
                id,
                name: params.name,
                phase,
                locked_sizes: BTreeSet::new(),
                allow_clipping: params.allow_clipping,
                active: true,
                suites: BTreeSet::new(),
            },
        );
        id
    }

    /// Inserts a group with no memberships. Its status starts `open`.
    pub fn insert_group(
        &mut self,
        name: String,
        size: u32,
        leader: UserId,
        draw: Option<DrawId>,
    ) -> GroupId {
        let id = GroupId(self.next_id());
        self.groups.insert(
            id,
            Group {
                id,
                name,
                size,
                status: GroupStatus::Open,
                leader,
                draw,
            },
        );
        id
    }

    pub fn insert_membership(
        &mut self,
        group: GroupId,
        user: UserId,
        status: MembershipStatus,
    ) -> Result<MembershipId, LedgerError> {
        if !self.groups.contains_key(&group) {
            return Err(LedgerError::missing("groups", group));
        }
        if !self.users.contains_key(&user) {
            return Err(LedgerError::missing("users", user));
        }
        if self.memberships_of(group).any(|m| m.user == user) {
            return Err(LedgerError::duplicate(
                "memberships(group, user)",
                format!("({group}, {user})"),
            ));
        }
        if status == MembershipStatus::Accepted && self.accepted_membership(user).is_some() {
            return Err(LedgerError::duplicate("accepted memberships(user)", user));
        }
        let id = MembershipId(self.next_id());
        self.memberships.insert(
            id,
            Membership {
                id,
                group,
                user,
                status,
                locked: false,
            },
        );
        Ok(id)
    }

    /// Flips a pending membership to accepted, guarding the one-accepted-per-user index.
    pub fn accept_membership(&mut self, id: MembershipId) -> Result<(), LedgerError> {
        let user = self
            .memberships
            .get(&id)
            .map(|m| m.user)
            .ok_or_else(|| LedgerError::missing("memberships", id))?;
        if self.accepted_membership(user).is_some_and(|m| m.id != id) {
            return Err(LedgerError::duplicate("accepted memberships(user)", user));
        }
        if let Some(membership) = self.memberships.get_mut(&id) {
            membership.status = MembershipStatus::Accepted;
        }
        Ok(())
    }

    pub fn insert_clip(&mut self, draw: DrawId) -> ClipId {
        let id = ClipId(self.next_id());
        self.clips.insert(id, Clip { id, draw });
        id
    }

    pub fn insert_clip_membership(
        &mut self,
        clip: ClipId,
        group: GroupId,
        confirmed: bool,
    ) -> Result<ClipMembershipId, LedgerError> {
        if !self.clips.contains_key(&clip) {
            return Err(LedgerError::missing("clips", clip));
        }
        if self.clip_memberships_of_clip(clip).any(|cm| cm.group == group) {
            return Err(LedgerError::duplicate(
                "clip_memberships(clip, group)",
                format!("({clip}, {group})"),
            ));
        }
        if confirmed && self.clip_of(group).is_some() {
            return Err(LedgerError::duplicate("confirmed clip_memberships(group)", group));
        }
        let id = ClipMembershipId(self.next_id());
        self.clip_memberships.insert(
            id,
            ClipMembership {
                id,
                clip,
                group,
                confirmed,
            },
        );
        Ok(id)
    }

    pub fn confirm_clip_membership(&mut self, id: ClipMembershipId) -> Result<(), LedgerError> {
        let group = self
            .clip_memberships
            .get(&id)
            .map(|cm| cm.group)
            .ok_or_else(|| LedgerError::missing("clip_memberships", id))?;
        if self
            .clip_memberships_of_group(group)
            .any(|cm| cm.confirmed && cm.id != id)
        {
            return Err(LedgerError::duplicate("confirmed clip_memberships(group)", group));
        }
        if let Some(cm) = self.clip_memberships.get_mut(&id) {
            cm.confirmed = true;
        }
        Ok(())
    }

    pub fn insert_lottery(
        &mut self,
        draw: DrawId,
        number: u32,
        clip: Option<ClipId>,
        groups: BTreeSet<GroupId>,
    ) -> Result<LotteryId, LedgerError> {
        if self.lotteries_in(draw).any(|l| l.number == number) {
            return Err(LedgerError::duplicate(
                "lotteries(draw, number)",
                format!("({draw}, {number})"),
            ));
        }
        let id = LotteryId(self.next_id());
        self.lotteries.insert(
            id,
            LotteryAssignment {
                id,
                draw,
                number,
                selected: false,
                clip,
                groups,
            },
        );
        Ok(id)
    }

    pub fn renumber_lottery(&mut self, id: LotteryId, number: u32) -> Result<(), LedgerError> {
        let draw = self
            .lotteries
            .get(&id)
            .map(|l| l.draw)
            .ok_or_else(|| LedgerError::missing("lotteries", id))?;
        if self
            .lotteries_in(draw)
            .any(|l| l.number == number && l.id != id)
        {
            return Err(LedgerError::duplicate(
                "lotteries(draw, number)",
                format!("({draw}, {number})"),
            ));
        }
        if let Some(lottery) = self.lotteries.get_mut(&id) {
            lottery.number = number;
        }
        Ok(())
    }

    /// Records that `group` owns `suite`.
    pub fn assign_suite(&mut self, suite: SuiteId, group: GroupId) -> Result<(), LedgerError> {
        if let Some(owner) = self.suite_owners.get(&suite) {
            return Err(LedgerError::duplicate(
                "suite_assignments(suite)",
                format!("{suite} (held by {owner})"),
            ));
        }
        if self.group_suites.contains_key(&group) {
            return Err(LedgerError::duplicate("suite_assignments(group)", group));
        }
        self.suite_owners.insert(suite, group);
        self.group_suites.insert(group, suite);
        Ok(())
    }

    // =========================================================================
    // REMOVALS
    // =========================================================================

    /// Releases the group's suite, returning it.
    pub fn release_suite(&mut self, group: GroupId) -> Option<SuiteId> {
        let suite = self.group_suites.remove(&group)?;
        self.suite_owners.remove(&suite);
        Some(suite)
    }

    pub fn remove_membership(&mut self, id: MembershipId) -> Option<Membership> {
        self.memberships.remove(&id)
    }

    pub fn remove_group(&mut self, id: GroupId) -> Option<Group> {
        self.groups.remove(&id)
    }

    pub fn remove_clip_membership(&mut self, id: ClipMembershipId) -> Option<ClipMembership> {
        self.clip_memberships.remove(&id)
    }

    /// Removes the clip with every membership it still has.
    pub fn remove_clip(&mut self, id: ClipId) -> Option<Clip> {
        self.clip_memberships.retain(|_, cm| cm.clip != id);
        for lottery in self.lotteries.values_mut() {
            if lottery.clip == Some(id) {
                lottery.clip = None;
            }
        }
        self.clips.remove(&id)
    }

    pub fn remove_lottery(&mut self, id: LotteryId) -> Option<LotteryAssignment> {
        self.lotteries.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (DrawStore, DrawId, UserId, UserId) {
        let mut store = DrawStore::new();
        let draw = store.insert_draw(
            DrawCreate {
                name: "Spring".into(),
                allow_clipping: true,
            },
            Phase::PreLottery,
        );
        let ada = store.insert_user(UserCreate::student("Ada", Intent::OnCampus).in_draw(draw));
        let bo = store.insert_user(UserCreate::student("Bo", Intent::OnCampus).in_draw(draw));
        (store, draw, ada, bo)
    }

    #[test]
    fn test_one_accepted_membership_per_user() {
        let (mut store, draw, ada, bo) = seeded();
        let first = store.insert_group("A".into(), 2, ada, Some(draw));
        let second = store.insert_group("B".into(), 2, bo, Some(draw));
        store
            .insert_membership(first, ada, MembershipStatus::Accepted)
            .unwrap();

        let err = store
            .insert_membership(second, ada, MembershipStatus::Accepted)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));

        let pending = store
            .insert_membership(second, ada, MembershipStatus::Invited)
            .unwrap();
        assert!(store.accept_membership(pending).is_err());
        assert_eq!(store.group_of(ada), Some(first));
    }

    #[test]
    fn test_suite_ownership_is_unique_both_ways() {
        let (mut store, draw, ada, bo) = seeded();
        let suite = store.insert_suite(SuiteCreate::singles("Hall", "101", 2));
        let other = store.insert_suite(SuiteCreate::singles("Hall", "102", 2));
        let first = store.insert_group("A".into(), 2, ada, Some(draw));
        let second = store.insert_group("B".into(), 2, bo, Some(draw));

        store.assign_suite(suite, first).unwrap();
        assert!(store.assign_suite(suite, second).is_err());
        assert!(store.assign_suite(other, first).is_err());

        assert_eq!(store.release_suite(first), Some(suite));
        store.assign_suite(suite, second).unwrap();
        assert_eq!(store.owner_of(suite), Some(second));
    }

    #[test]
    fn test_lottery_numbers_unique_per_draw() {
        let (mut store, draw, ada, bo) = seeded();
        let a = store.insert_group("A".into(), 1, ada, Some(draw));
        let b = store.insert_group("B".into(), 1, bo, Some(draw));
        let first = store
            .insert_lottery(draw, 1, None, BTreeSet::from([a]))
            .unwrap();
        assert!(store
            .insert_lottery(draw, 1, None, BTreeSet::from([b]))
            .is_err());
        let second = store
            .insert_lottery(draw, 2, None, BTreeSet::from([b]))
            .unwrap();
        assert!(store.renumber_lottery(second, 1).is_err());
        store.renumber_lottery(first, 3).unwrap();
        store.renumber_lottery(second, 1).unwrap();
    }

    #[test]
    fn test_available_suites_skip_claimed_and_inactive() {
        let (mut store, draw, ada, _) = seeded();
        let claimed = store.insert_suite(SuiteCreate::singles("Hall", "101", 1));
        let inactive = store.insert_suite(SuiteCreate::singles("Hall", "102", 1));
        let open = store.insert_suite(SuiteCreate::singles("Hall", "103", 1));
        store
            .draws
            .get_mut(&draw)
            .unwrap()
            .suites
            .extend([claimed, inactive, open]);
        store.suites.get_mut(&inactive).unwrap().active = false;
        let group = store.insert_group("A".into(), 1, ada, Some(draw));
        store.assign_suite(claimed, group).unwrap();

        let available: Vec<SuiteId> = store.available_suites(draw).iter().map(|s| s.id).collect();
        assert_eq!(available, vec![open]);
    }
}
