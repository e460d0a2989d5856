//! Store fixtures shared by the unit tests.

use crate::ledger::refresh_status;
use crate::model::*;
use crate::store::DrawStore;

/// A store holding one active draw, in pre_lottery unless moved.
pub(crate) struct Fixture {
    pub store: DrawStore,
    pub draw: DrawId,
    students: u32,
    suites: u32,
}

impl Fixture {
    pub fn new() -> Self {
        let mut store = DrawStore::new();
        let draw = store.insert_draw(
            DrawCreate {
                name: "Spring".into(),
                allow_clipping: true,
            },
            Phase::PreLottery,
        );
        Self {
            store,
            draw,
            students: 0,
            suites: 0,
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        if let Some(draw) = self.store.draws.get_mut(&self.draw) {
            draw.phase = phase;
        }
    }

    /// An on-campus student of the draw.
    pub fn student(&mut self, name: &str) -> UserId {
        self.students += 1;
        self.store.insert_user(
            UserCreate::student(format!("{name} {}", self.students), Intent::OnCampus)
                .in_draw(self.draw),
        )
    }

    /// A suite of `size` singles, attached to the draw.
    pub fn suite(&mut self, size: u32) -> SuiteId {
        self.suites += 1;
        let suite = self
            .store
            .insert_suite(SuiteCreate::singles("Hall", self.suites.to_string(), size));
        if let Some(draw) = self.store.draws.get_mut(&self.draw) {
            draw.suites.insert(suite);
        }
        suite
    }

    /// A full group of fresh students.
    pub fn group(&mut self, size: u32) -> GroupId {
        let leader = self.student("Leader");
        let group = self
            .store
            .insert_group(format!("Group {}", self.students), size, leader, Some(self.draw));
        self.store
            .insert_membership(group, leader, MembershipStatus::Accepted)
            .unwrap();
        for _ in 1..size {
            let member = self.student("Member");
            self.store
                .insert_membership(group, member, MembershipStatus::Accepted)
                .unwrap();
        }
        refresh_status(&mut self.store, group).unwrap();
        group
    }

    /// A full group with every membership locked.
    pub fn locked_group(&mut self, size: u32) -> GroupId {
        let group = self.group(size);
        let ids: Vec<MembershipId> = self.store.memberships_of(group).map(|m| m.id).collect();
        for id in ids {
            if let Some(membership) = self.store.memberships.get_mut(&id) {
                membership.locked = true;
            }
        }
        refresh_status(&mut self.store, group).unwrap();
        group
    }
}
