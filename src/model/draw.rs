use crate::model::{DrawId, SuiteId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Phases of a draw, in the only order they may be visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Draft,
    PreLottery,
    Lottery,
    SuiteSelection,
    Results,
}

impl Phase {
    /// The phase after this one, if any.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Draft => Some(Phase::PreLottery),
            Phase::PreLottery => Some(Phase::Lottery),
            Phase::Lottery => Some(Phase::SuiteSelection),
            Phase::SuiteSelection => Some(Phase::Results),
            Phase::Results => None,
        }
    }

    /// Groups, memberships and clips may only change shape during group formation.
    pub fn is_group_formation(self) -> bool {
        self == Phase::PreLottery
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Draft => "draft",
            Phase::PreLottery => "pre_lottery",
            Phase::Lottery => "lottery",
            Phase::SuiteSelection => "suite_selection",
            Phase::Results => "results",
        };
        f.write_str(name)
    }
}

/// A cohort competing for one pool of suites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draw {
    pub id: DrawId,
    pub name: String,
    pub phase: Phase,
    /// Suite sizes for which no new groups may form.
    pub locked_sizes: BTreeSet<u32>,
    pub allow_clipping: bool,
    /// Archival flag, independent of `phase`.
    pub active: bool,
    pub suites: BTreeSet<SuiteId>,
}

/// Payload for creating a draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawCreate {
    pub name: String,
    pub allow_clipping: bool,
}
