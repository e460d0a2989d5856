//! Messages accepted by the draw engine.

use crate::model::*;
use crate::oversubscription::{PruneOutcome, SizeReport};
use crate::phase::Advance;
use std::collections::BTreeMap;

/// Mutating requests. Each runs as one transaction.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    // Housing stock and people
    CreateUser(UserCreate),
    CreateSuite(SuiteCreate),

    // Draw setup and phases
    CreateDraw(DrawCreate),
    AddSuiteToDraw { draw: DrawId, suite: SuiteId },
    RemoveSuiteFromDraw { draw: DrawId, suite: SuiteId },
    AddStudentToDraw { draw: DrawId, user: UserId },
    ToggleSizeLock { draw: DrawId, size: u32 },
    ArchiveDraw(DrawId),
    AdvancePhase(DrawId),

    // Groups and memberships
    CreateGroup(GroupCreate),
    CreateSpecialGroup(SpecialGroupCreate),
    RequestMembership { group: GroupId, user: UserId },
    InviteMember { group: GroupId, user: UserId },
    AcceptMembership(MembershipId),
    LeaveGroup(MembershipId),
    RemoveMember(MembershipId),
    ChangeLeader { group: GroupId, user: UserId },
    UpdateGroupSize { group: GroupId, size: u32 },
    LockGroup(GroupId),
    UnlockGroup(GroupId),
    FinalizeGroup(GroupId),
    LockMembership(MembershipId),
    DisbandGroup(GroupId),

    // Clips
    CreateClip(ClipCreate),
    ConfirmClipMembership(ClipMembershipId),
    DestroyClipMembership(ClipMembershipId),
    DestroyClip(ClipId),

    // Lottery and selection
    RunLottery(DrawId),
    AssignLotteryNumber { draw: DrawId, unit: UnitKey, number: u32 },
    SelectSuite { group: GroupId, suite: SuiteId },
    SkipGroup(GroupId),
    RemoveSuite(GroupId),
    AssignSuites(BTreeMap<GroupId, Option<SuiteId>>),

    // Oversubscription
    Prune { draw: DrawId, sizes: Vec<u32> },
}

/// Successful results of [`DrawCommand`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutput {
    Done,
    User(UserId),
    Suite(SuiteId),
    Draw(DrawId),
    Group(GroupId),
    Membership(MembershipId),
    Clip(ClipId),
    Lottery(LotteryId),
    SizeLocked(bool),
    SuiteReleased(SuiteId),
    Advanced(Advance),
    Drawn(Vec<LotteryAssignment>),
    Pruned(PruneOutcome),
}

/// Read-only requests.
#[derive(Debug, Clone)]
pub enum DrawQuery {
    Draw(DrawId),
    Group(GroupId),
    /// Rules blocking the draw's next phase.
    PhaseViolations(DrawId),
    NextUnits(DrawId),
    LotteryUnits(DrawId),
    Oversubscribed { draw: DrawId, size: u32 },
    OversubscriptionReport(DrawId),
}

/// Results of [`DrawQuery`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawQueryOutput {
    Draw(Draw),
    Group(Group),
    Violations(Vec<String>),
    Units(Vec<LotteryAssignment>),
    Oversubscribed(bool),
    Report(Vec<SizeReport>),
}
