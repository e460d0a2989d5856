//! # Draw Phase Controller
//!
//! Draws move forward through
//! `draft → pre_lottery → lottery → suite_selection → results`, one step at a time. Each
//! step has a guard; a refused step lists every violated rule and writes nothing.
//!
//! Draw setup (suites, students, size locks) and archival live here as well.

use crate::error::{DrawError, DrawResult};
use crate::guard::Guards;
use crate::ledger::destroy_group;
use crate::lottery;
use crate::model::*;
use crate::notify::{Notification, NotificationEvent, Outbox};
use crate::selection::announce_turns;
use crate::store::DrawStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Result of a phase step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    pub phase: Phase,
    /// Draw created for students still ungrouped when results were reached.
    pub spawned: Option<DrawId>,
}

pub fn create_draw(store: &mut DrawStore, params: DrawCreate) -> DrawResult<DrawId> {
    if params.name.trim().is_empty() {
        return Err(DrawError::Invalid("draw name cannot be blank".into()));
    }
    let draw = store.insert_draw(params, Phase::Draft);
    info!(%draw, "Draw created");
    Ok(draw)
}

fn ensure_setup_phase(draw: &Draw) -> DrawResult<()> {
    if matches!(draw.phase, Phase::Draft | Phase::PreLottery) && draw.active {
        Ok(())
    } else {
        Err(DrawError::precondition(format!(
            "{} is in {}; it can only be set up during draft or pre_lottery",
            draw.id, draw.phase
        )))
    }
}

pub fn add_suite_to_draw(store: &mut DrawStore, draw: DrawId, suite: SuiteId) -> DrawResult<()> {
    ensure_setup_phase(store.require_draw(draw)?)?;
    store.require_suite(suite)?;
    store.draw_mut(draw)?.suites.insert(suite);
    info!(%draw, %suite, "Suite added to draw");
    Ok(())
}

pub fn remove_suite_from_draw(
    store: &mut DrawStore,
    draw: DrawId,
    suite: SuiteId,
) -> DrawResult<()> {
    ensure_setup_phase(store.require_draw(draw)?)?;
    let mut guards = Guards::new();
    guards.check(store.owner_of(suite).is_none(), || {
        format!("{suite} is held by a group")
    });
    guards.finish("remove_suite_from_draw")?;
    store.draw_mut(draw)?.suites.remove(&suite);
    info!(%draw, %suite, "Suite removed from draw");
    Ok(())
}

/// Moves a student into `draw`.
pub fn add_student_to_draw(store: &mut DrawStore, draw: DrawId, user: UserId) -> DrawResult<()> {
    ensure_setup_phase(store.require_draw(draw)?)?;
    let student = store.require_user(user)?;
    let mut guards = Guards::new();
    guards
        .check(student.role == Role::Student, || format!("{user} is not a student"))
        .check(store.memberships_of_user(user).next().is_none(), || {
            format!("{user} has group memberships")
        });
    guards.finish("add_student_to_draw")?;
    store.user_mut(user)?.draw = Some(draw);
    info!(%draw, %user, "Student added to draw");
    Ok(())
}

/// Flips `size` in the draw's locked sizes. Returns whether the size is now locked.
pub fn toggle_size_lock(store: &mut DrawStore, draw: DrawId, size: u32) -> DrawResult<bool> {
    let draw = store.draw_mut(draw)?;
    let locked = if draw.locked_sizes.remove(&size) {
        false
    } else {
        draw.locked_sizes.insert(size);
        true
    };
    info!(draw = %draw.id, size, locked, "Size lock toggled");
    Ok(locked)
}

/// Retires a draw: every group is destroyed after giving back its suite.
pub fn archive_draw(store: &mut DrawStore, draw: DrawId, outbox: &mut Outbox) -> DrawResult<()> {
    store.require_draw(draw)?;
    let groups: Vec<GroupId> = store.groups_in(draw).map(|g| g.id).collect();
    for group in &groups {
        store.release_suite(*group);
        destroy_group(store, *group, outbox)?;
    }
    let clips: Vec<ClipId> = store.clips_in(draw).map(|c| c.id).collect();
    for clip in clips {
        store.remove_clip(clip);
    }
    let lotteries: Vec<LotteryId> = store.lotteries_in(draw).map(|l| l.id).collect();
    for lottery in lotteries {
        store.remove_lottery(lottery);
    }
    store.draw_mut(draw)?.active = false;
    info!(%draw, groups = groups.len(), "Draw archived");
    Ok(())
}

fn bed_count(store: &DrawStore, draw: DrawId) -> u32 {
    store.available_suites(draw).iter().map(|s| s.size()).sum()
}

fn housing_demand(store: &DrawStore, draw: DrawId) -> u32 {
    store
        .students_in(draw)
        .filter(|u| u.intent.needs_housing())
        .count() as u32
}

/// Available suites of `draw` also offered by another active draw that is running its
/// lottery or suite selection.
pub fn contested_suites(store: &DrawStore, draw: DrawId) -> Vec<SuiteId> {
    let busy: BTreeSet<SuiteId> = store
        .draws()
        .filter(|d| {
            d.id != draw && d.active && matches!(d.phase, Phase::Lottery | Phase::SuiteSelection)
        })
        .flat_map(|d| d.suites.iter().copied())
        .collect();
    store
        .available_suites(draw)
        .into_iter()
        .map(|s| s.id)
        .filter(|s| busy.contains(s))
        .collect()
}

/// Every rule blocking the draw's next step.
pub fn violations(store: &DrawStore, draw: DrawId) -> DrawResult<Vec<String>> {
    let current = store.require_draw(draw)?;
    let mut guards = Guards::new();
    guards.check(current.active, || format!("{draw} is archived"));

    match current.phase {
        Phase::Draft => {
            let students = store.students_in(draw).count();
            let (beds, demand) = (bed_count(store, draw), housing_demand(store, draw));
            guards
                .check(students > 0, || format!("{draw} has no students"))
                .check(beds >= demand, || {
                    format!("{beds} beds for {demand} students")
                });
        }
        Phase::PreLottery => {
            let ungrouped = store
                .students_in(draw)
                .filter(|u| u.intent.needs_housing() && store.group_of(u.id).is_none())
                .count();
            let unlocked: Vec<GroupId> = store
                .groups_in(draw)
                .filter(|g| g.status != GroupStatus::Locked)
                .map(|g| g.id)
                .collect();
            let contested = contested_suites(store, draw);
            let (beds, demand) = (bed_count(store, draw), housing_demand(store, draw));
            guards
                .check(store.groups_in(draw).next().is_some(), || {
                    format!("{draw} has no groups")
                })
                .check(ungrouped == 0, || {
                    format!("{ungrouped} students without a group")
                })
                .check(beds >= demand, || {
                    format!("{beds} beds for {demand} students")
                })
                .check(contested.is_empty(), || {
                    format!("suites {contested:?} are contested by another draw")
                })
                .check(unlocked.is_empty(), || {
                    format!("groups {unlocked:?} are not locked")
                });
        }
        Phase::Lottery => {
            let missing = lottery::unnumbered(store, draw);
            guards
                .check(!lottery::units(store, draw).is_empty(), || {
                    format!("{draw} has no lottery units")
                })
                .check(missing.is_empty(), || {
                    format!("units {missing:?} have no lottery number")
                });
        }
        Phase::SuiteSelection => {
            let homeless: Vec<GroupId> = store
                .groups_in(draw)
                .filter(|g| store.suite_of(g.id).is_none())
                .map(|g| g.id)
                .collect();
            guards.check(homeless.is_empty(), || {
                format!("groups {homeless:?} have no suite")
            });
        }
        Phase::Results => {
            guards.check(false, || format!("{draw} is already in results"));
        }
    }
    Ok(guards.into_violations())
}

/// Moves the draw one phase forward.
///
/// Reaching results with ungrouped students who still need housing forks a new
/// pre_lottery draw holding them and the suites nobody claimed.
pub fn advance(store: &mut DrawStore, draw: DrawId, outbox: &mut Outbox) -> DrawResult<Advance> {
    let violations = violations(store, draw)?;
    let mut guards = Guards::new();
    for violation in violations {
        guards.check(false, || violation);
    }
    guards.finish("advance_phase")?;

    let current = store.require_draw(draw)?.clone();
    let next = current
        .phase
        .next()
        .ok_or_else(|| DrawError::precondition(format!("{draw} is already in results")))?;
    let recipients: Vec<UserId> = store.students_in(draw).map(|u| u.id).collect();
    store.draw_mut(draw)?.phase = next;

    let spawned = if next == Phase::Results {
        spawn_remainder(store, &current)?
    } else {
        None
    };
    info!(%draw, from = %current.phase, to = %next, ?spawned, "Phase advanced");

    outbox.push(Notification::new(
        NotificationEvent::PhaseAdvanced { draw, phase: next },
        recipients,
    ));
    if next == Phase::SuiteSelection {
        announce_turns(store, draw, &BTreeSet::new(), outbox)?;
    }
    Ok(Advance {
        phase: next,
        spawned,
    })
}

fn spawn_remainder(store: &mut DrawStore, origin: &Draw) -> DrawResult<Option<DrawId>> {
    let ungrouped: Vec<UserId> = store
        .students_in(origin.id)
        .filter(|u| u.intent.needs_housing() && store.group_of(u.id).is_none())
        .map(|u| u.id)
        .collect();
    if ungrouped.is_empty() {
        return Ok(None);
    }
    let suites: BTreeSet<SuiteId> = store
        .available_suites(origin.id)
        .into_iter()
        .map(|s| s.id)
        .collect();

    let spawned = store.insert_draw(
        DrawCreate {
            name: format!("{} (continued)", origin.name),
            allow_clipping: origin.allow_clipping,
        },
        Phase::PreLottery,
    );
    store.draw_mut(spawned)?.suites = suites;
    for user in &ungrouped {
        store.user_mut(*user)?.draw = Some(spawned);
    }
    info!(origin = %origin.id, %spawned, students = ungrouped.len(), "Draw spawned for ungrouped students");
    Ok(Some(spawned))
}
