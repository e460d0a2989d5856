//! # Draw Engine
//!
//! Binds the component modules to the store actor: [`DrawStore`] implements
//! [`Transactional`], so every [`DrawCommand`] runs alone, rolls back as a whole on error,
//! and only releases its notifications once committed.

pub mod command;

pub use command::{DrawCommand, DrawOutput, DrawQuery, DrawQueryOutput};

use crate::error::DrawError;
use crate::notify::{Notification, Notifier, NullNotifier, Outbox};
use crate::policy::Policy;
use crate::rng::DrawRng;
use crate::store::DrawStore;
use crate::{clips, ledger, lottery, oversubscription, phase, selection};
use async_trait::async_trait;
use std::sync::Arc;
use store_actor::Transactional;
use tracing::debug;

/// Dependencies injected into the store actor at `run` time.
pub struct DrawContext {
    pub rng: DrawRng,
    pub policy: Policy,
    pub notifier: Arc<dyn Notifier>,
}

impl DrawContext {
    pub fn new(rng: DrawRng, policy: Policy, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            rng,
            policy,
            notifier,
        }
    }
}

impl Default for DrawContext {
    fn default() -> Self {
        Self::new(DrawRng::default(), Policy::default(), Arc::new(NullNotifier))
    }
}

#[async_trait]
impl Transactional for DrawStore {
    type Command = DrawCommand;
    type Output = DrawOutput;
    type Query = DrawQuery;
    type QueryOutput = DrawQueryOutput;
    type Effect = Notification;
    type Context = DrawContext;
    type Error = DrawError;

    fn execute(
        &mut self,
        command: DrawCommand,
        ctx: &mut DrawContext,
        outbox: &mut Outbox,
    ) -> Result<DrawOutput, DrawError> {
        use DrawCommand as C;
        use DrawOutput as O;

        let store = self;
        Ok(match command {
            C::CreateUser(params) => O::User(store.insert_user(params)),
            C::CreateSuite(params) => O::Suite(store.insert_suite(params)),

            C::CreateDraw(params) => O::Draw(phase::create_draw(store, params)?),
            C::AddSuiteToDraw { draw, suite } => {
                phase::add_suite_to_draw(store, draw, suite)?;
                O::Done
            }
            C::RemoveSuiteFromDraw { draw, suite } => {
                phase::remove_suite_from_draw(store, draw, suite)?;
                O::Done
            }
            C::AddStudentToDraw { draw, user } => {
                phase::add_student_to_draw(store, draw, user)?;
                O::Done
            }
            C::ToggleSizeLock { draw, size } => {
                O::SizeLocked(phase::toggle_size_lock(store, draw, size)?)
            }
            C::ArchiveDraw(draw) => {
                phase::archive_draw(store, draw, outbox)?;
                O::Done
            }
            C::AdvancePhase(draw) => O::Advanced(phase::advance(store, draw, outbox)?),

            C::CreateGroup(params) => O::Group(ledger::create_group(store, params)?),
            C::CreateSpecialGroup(params) => O::Group(ledger::create_special_group(store, params)?),
            C::RequestMembership { group, user } => {
                O::Membership(ledger::request_membership(store, group, user)?)
            }
            C::InviteMember { group, user } => {
                O::Membership(ledger::invite_member(store, group, user)?)
            }
            C::AcceptMembership(membership) => {
                ledger::accept_membership(store, membership)?;
                O::Done
            }
            C::LeaveGroup(membership) => {
                ledger::leave_group(store, membership)?;
                O::Done
            }
            C::RemoveMember(membership) => {
                ledger::remove_member(store, membership)?;
                O::Done
            }
            C::ChangeLeader { group, user } => {
                ledger::change_leader(store, group, user)?;
                O::Done
            }
            C::UpdateGroupSize { group, size } => {
                ledger::update_group_size(store, group, size)?;
                O::Done
            }
            C::LockGroup(group) => {
                ledger::lock_group(store, group, outbox)?;
                O::Done
            }
            C::UnlockGroup(group) => {
                ledger::unlock_group(store, group)?;
                O::Done
            }
            C::FinalizeGroup(group) => {
                ledger::finalize_group(store, group)?;
                O::Done
            }
            C::LockMembership(membership) => {
                ledger::lock_membership(store, membership, outbox)?;
                O::Done
            }
            C::DisbandGroup(group) => {
                ledger::destroy_group(store, group, outbox)?;
                O::Done
            }

            C::CreateClip(params) => O::Clip(clips::create_clip(store, &ctx.policy, params)?),
            C::ConfirmClipMembership(id) => {
                clips::confirm_clip_membership(store, id)?;
                O::Done
            }
            C::DestroyClipMembership(id) => {
                clips::destroy_clip_membership(store, id)?;
                O::Done
            }
            C::DestroyClip(clip) => {
                clips::destroy_clip(store, clip)?;
                O::Done
            }

            C::RunLottery(draw) => O::Drawn(lottery::run_lottery(
                store,
                draw,
                &mut ctx.rng,
                &ctx.policy,
                outbox,
            )?),
            C::AssignLotteryNumber { draw, unit, number } => {
                O::Lottery(lottery::assign_lottery_number(store, draw, unit, number)?)
            }
            C::SelectSuite { group, suite } => {
                selection::select_suite(store, group, suite, outbox)?;
                O::Done
            }
            C::SkipGroup(group) => {
                selection::skip_group(store, group, outbox)?;
                O::Done
            }
            C::RemoveSuite(group) => O::SuiteReleased(selection::remove_suite(store, group)?),
            C::AssignSuites(assignments) => {
                selection::assign_suites(store, assignments)?;
                O::Done
            }

            C::Prune { draw, sizes } => O::Pruned(oversubscription::prune(
                store,
                draw,
                &sizes,
                &mut ctx.rng,
                outbox,
            )?),
        })
    }

    fn query(&self, query: DrawQuery, _ctx: &DrawContext) -> Result<DrawQueryOutput, DrawError> {
        use DrawQuery as Q;
        use DrawQueryOutput as O;

        Ok(match query {
            Q::Draw(draw) => O::Draw(self.require_draw(draw)?.clone()),
            Q::Group(group) => O::Group(self.require_group(group)?.clone()),
            Q::PhaseViolations(draw) => O::Violations(phase::violations(self, draw)?),
            Q::NextUnits(draw) => O::Units(selection::next_units(self, draw)?),
            Q::LotteryUnits(draw) => {
                self.require_draw(draw)?;
                O::Units(lottery::lottery_units(self, draw))
            }
            Q::Oversubscribed { draw, size } => {
                self.require_draw(draw)?;
                O::Oversubscribed(oversubscription::oversubscribed(self, draw, size))
            }
            Q::OversubscriptionReport(draw) => O::Report(oversubscription::report(self, draw)?),
        })
    }

    async fn after_commit(&self, effects: Vec<Notification>, ctx: &DrawContext) {
        for notification in effects {
            debug!(event = ?notification.event, recipients = notification.recipients.len(), "Releasing notification");
            ctx.notifier.notify(notification);
        }
    }
}
