use crate::engine::{DrawCommand, DrawOutput, DrawQuery, DrawQueryOutput};
use crate::error::DrawError;
use crate::model::*;
use crate::oversubscription::{PruneOutcome, SizeReport};
use crate::phase::Advance;
use crate::store::DrawStore;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt::Debug;
use store_actor::{StoreClient, StoreError, StoreFacade};
use tracing::{debug, instrument};

/// Typed administrative surface over the draw store.
///
/// Each method sends one command or query and unpacks the reply. Rules live in the engine,
/// not here.
#[derive(Clone)]
pub struct DrawClient {
    inner: StoreClient<DrawStore>,
}

#[async_trait]
impl StoreFacade<DrawStore> for DrawClient {
    type Error = DrawError;

    fn inner(&self) -> &StoreClient<DrawStore> {
        &self.inner
    }

    fn map_error(e: StoreError<DrawError>) -> DrawError {
        match e {
            StoreError::Rejected(e) => e,
            other => DrawError::Store(other.to_string()),
        }
    }
}

fn unexpected(reply: impl Debug) -> DrawError {
    DrawError::Store(format!("unexpected reply {reply:?}"))
}

/// Generates one method per command: send it, then match the expected output.
macro_rules! commands {
    ($(
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),*) -> $out:ty {
            $command:expr, $pattern:pat => $value:expr
        }
    )*) => {
        $(
            $(#[$meta])*
            #[instrument(skip(self))]
            pub async fn $name(&self, $($arg: $ty),*) -> Result<$out, DrawError> {
                debug!("Sending request");
                match self.execute($command).await? {
                    $pattern => Ok($value),
                    other => Err(unexpected(other)),
                }
            }
        )*
    };
}

impl DrawClient {
    pub fn new(inner: StoreClient<DrawStore>) -> Self {
        Self { inner }
    }

    async fn execute(&self, command: DrawCommand) -> Result<DrawOutput, DrawError> {
        self.inner.execute(command).await.map_err(Self::map_error)
    }

    async fn query(&self, query: DrawQuery) -> Result<DrawQueryOutput, DrawError> {
        self.inner.query(query).await.map_err(Self::map_error)
    }

    commands! {
        fn create_user(params: UserCreate) -> UserId {
            DrawCommand::CreateUser(params), DrawOutput::User(id) => id
        }
        fn create_suite(params: SuiteCreate) -> SuiteId {
            DrawCommand::CreateSuite(params), DrawOutput::Suite(id) => id
        }

        fn create_draw(params: DrawCreate) -> DrawId {
            DrawCommand::CreateDraw(params), DrawOutput::Draw(id) => id
        }
        fn add_suite_to_draw(draw: DrawId, suite: SuiteId) -> () {
            DrawCommand::AddSuiteToDraw { draw, suite }, DrawOutput::Done => ()
        }
        fn remove_suite_from_draw(draw: DrawId, suite: SuiteId) -> () {
            DrawCommand::RemoveSuiteFromDraw { draw, suite }, DrawOutput::Done => ()
        }
        fn add_student_to_draw(draw: DrawId, user: UserId) -> () {
            DrawCommand::AddStudentToDraw { draw, user }, DrawOutput::Done => ()
        }
        /// Returns whether the size is locked afterwards.
        fn toggle_size_lock(draw: DrawId, size: u32) -> bool {
            DrawCommand::ToggleSizeLock { draw, size }, DrawOutput::SizeLocked(locked) => locked
        }
        fn archive_draw(draw: DrawId) -> () {
            DrawCommand::ArchiveDraw(draw), DrawOutput::Done => ()
        }
        fn advance_phase(draw: DrawId) -> Advance {
            DrawCommand::AdvancePhase(draw), DrawOutput::Advanced(step) => step
        }

        fn create_group(params: GroupCreate) -> GroupId {
            DrawCommand::CreateGroup(params), DrawOutput::Group(id) => id
        }
        fn create_special_group(params: SpecialGroupCreate) -> GroupId {
            DrawCommand::CreateSpecialGroup(params), DrawOutput::Group(id) => id
        }
        fn request_membership(group: GroupId, user: UserId) -> MembershipId {
            DrawCommand::RequestMembership { group, user }, DrawOutput::Membership(id) => id
        }
        fn invite_member(group: GroupId, user: UserId) -> MembershipId {
            DrawCommand::InviteMember { group, user }, DrawOutput::Membership(id) => id
        }
        fn accept_membership(membership: MembershipId) -> () {
            DrawCommand::AcceptMembership(membership), DrawOutput::Done => ()
        }
        fn leave_group(membership: MembershipId) -> () {
            DrawCommand::LeaveGroup(membership), DrawOutput::Done => ()
        }
        fn remove_member(membership: MembershipId) -> () {
            DrawCommand::RemoveMember(membership), DrawOutput::Done => ()
        }
        fn change_leader(group: GroupId, user: UserId) -> () {
            DrawCommand::ChangeLeader { group, user }, DrawOutput::Done => ()
        }
        fn update_group_size(group: GroupId, size: u32) -> () {
            DrawCommand::UpdateGroupSize { group, size }, DrawOutput::Done => ()
        }
        fn lock_group(group: GroupId) -> () {
            DrawCommand::LockGroup(group), DrawOutput::Done => ()
        }
        fn unlock_group(group: GroupId) -> () {
            DrawCommand::UnlockGroup(group), DrawOutput::Done => ()
        }
        fn finalize_group(group: GroupId) -> () {
            DrawCommand::FinalizeGroup(group), DrawOutput::Done => ()
        }
        fn lock_membership(membership: MembershipId) -> () {
            DrawCommand::LockMembership(membership), DrawOutput::Done => ()
        }
        fn disband_group(group: GroupId) -> () {
            DrawCommand::DisbandGroup(group), DrawOutput::Done => ()
        }

        fn create_clip(params: ClipCreate) -> ClipId {
            DrawCommand::CreateClip(params), DrawOutput::Clip(id) => id
        }
        fn confirm_clip_membership(id: ClipMembershipId) -> () {
            DrawCommand::ConfirmClipMembership(id), DrawOutput::Done => ()
        }
        fn destroy_clip_membership(id: ClipMembershipId) -> () {
            DrawCommand::DestroyClipMembership(id), DrawOutput::Done => ()
        }
        fn destroy_clip(clip: ClipId) -> () {
            DrawCommand::DestroyClip(clip), DrawOutput::Done => ()
        }

        fn run_lottery(draw: DrawId) -> Vec<LotteryAssignment> {
            DrawCommand::RunLottery(draw), DrawOutput::Drawn(units) => units
        }
        fn assign_lottery_number(draw: DrawId, unit: UnitKey, number: u32) -> LotteryId {
            DrawCommand::AssignLotteryNumber { draw, unit, number }, DrawOutput::Lottery(id) => id
        }
        fn select_suite(group: GroupId, suite: SuiteId) -> () {
            DrawCommand::SelectSuite { group, suite }, DrawOutput::Done => ()
        }
        fn skip_group(group: GroupId) -> () {
            DrawCommand::SkipGroup(group), DrawOutput::Done => ()
        }
        fn remove_suite(group: GroupId) -> SuiteId {
            DrawCommand::RemoveSuite(group), DrawOutput::SuiteReleased(suite) => suite
        }
        fn assign_suites(assignments: BTreeMap<GroupId, Option<SuiteId>>) -> () {
            DrawCommand::AssignSuites(assignments), DrawOutput::Done => ()
        }

        fn prune(draw: DrawId, sizes: Vec<u32>) -> PruneOutcome {
            DrawCommand::Prune { draw, sizes }, DrawOutput::Pruned(outcome) => outcome
        }
    }

    #[instrument(skip(self))]
    pub async fn draw(&self, draw: DrawId) -> Result<Draw, DrawError> {
        debug!("Sending request");
        match self.query(DrawQuery::Draw(draw)).await? {
            DrawQueryOutput::Draw(draw) => Ok(draw),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn group(&self, group: GroupId) -> Result<Group, DrawError> {
        debug!("Sending request");
        match self.query(DrawQuery::Group(group)).await? {
            DrawQueryOutput::Group(group) => Ok(group),
            other => Err(unexpected(other)),
        }
    }

    /// Rules currently blocking the draw's next phase. Empty when it may advance.
    #[instrument(skip(self))]
    pub async fn phase_violations(&self, draw: DrawId) -> Result<Vec<String>, DrawError> {
        debug!("Sending request");
        match self.query(DrawQuery::PhaseViolations(draw)).await? {
            DrawQueryOutput::Violations(violations) => Ok(violations),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn next_units(&self, draw: DrawId) -> Result<Vec<LotteryAssignment>, DrawError> {
        debug!("Sending request");
        match self.query(DrawQuery::NextUnits(draw)).await? {
            DrawQueryOutput::Units(units) => Ok(units),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn lottery_units(&self, draw: DrawId) -> Result<Vec<LotteryAssignment>, DrawError> {
        debug!("Sending request");
        match self.query(DrawQuery::LotteryUnits(draw)).await? {
            DrawQueryOutput::Units(units) => Ok(units),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn oversubscribed(&self, draw: DrawId, size: u32) -> Result<bool, DrawError> {
        debug!("Sending request");
        match self.query(DrawQuery::Oversubscribed { draw, size }).await? {
            DrawQueryOutput::Oversubscribed(flag) => Ok(flag),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn oversubscription_report(&self, draw: DrawId) -> Result<Vec<SizeReport>, DrawError> {
        debug!("Sending request");
        match self.query(DrawQuery::OversubscriptionReport(draw)).await? {
            DrawQueryOutput::Report(report) => Ok(report),
            other => Err(unexpected(other)),
        }
    }
}
