//! # Selection Turn Engine
//!
//! During suite selection the unselected lottery unit with the lowest number holds the
//! turn. Each group of that unit picks its own suite; the turn passes once every group of
//! the unit has one.

use crate::error::{DrawError, DrawResult};
use crate::guard::Guards;
use crate::model::*;
use crate::notify::{Notification, NotificationEvent, Outbox};
use crate::store::DrawStore;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Units whose turn it is: those with the lowest number among the unselected.
pub fn next_units(store: &DrawStore, draw: DrawId) -> DrawResult<Vec<LotteryAssignment>> {
    store.require_draw(draw)?;
    let Some(lowest) = store
        .lotteries_in(draw)
        .filter(|l| !l.selected)
        .map(|l| l.number)
        .min()
    else {
        return Ok(Vec::new());
    };
    Ok(store
        .lotteries_in(draw)
        .filter(|l| !l.selected && l.number == lowest)
        .cloned()
        .collect())
}

fn next_ids(store: &DrawStore, draw: DrawId) -> DrawResult<BTreeSet<LotteryId>> {
    Ok(next_units(store, draw)?.into_iter().map(|l| l.id).collect())
}

/// Recomputes whether every group of the assignment holds a suite.
pub fn refresh_selected(store: &mut DrawStore, lottery: LotteryId) -> DrawResult<bool> {
    let groups = store
        .lottery(lottery)
        .ok_or_else(|| DrawError::not_found(lottery))?
        .groups
        .clone();
    let selected = groups.iter().all(|g| store.suite_of(*g).is_some());
    if let Some(assignment) = store.lotteries.get_mut(&lottery) {
        assignment.selected = selected;
    }
    Ok(selected)
}

/// Tells the leaders of units that just got the turn.
pub(crate) fn announce_turns(
    store: &DrawStore,
    draw: DrawId,
    previous: &BTreeSet<LotteryId>,
    outbox: &mut Outbox,
) -> DrawResult<()> {
    for unit in next_units(store, draw)? {
        if previous.contains(&unit.id) {
            continue;
        }
        for group in &unit.groups {
            if store.suite_of(*group).is_some() {
                continue;
            }
            let leader = store.require_group(*group)?.leader;
            outbox.push(Notification::new(
                NotificationEvent::NowSelecting {
                    draw,
                    group: *group,
                },
                vec![leader],
            ));
        }
    }
    Ok(())
}

fn check_suite(store: &DrawStore, group: &Group, suite: SuiteId, guards: &mut Guards) -> DrawResult<()> {
    let suite = store.require_suite(suite)?;
    guards
        .check(suite.active, || format!("{} is inactive", suite.id))
        .check(store.owner_of(suite.id).is_none(), || {
            format!("{} is already taken", suite.id)
        })
        .check(suite.size() == group.size, || {
            format!(
                "{} sleeps {}, {} has {} members",
                suite.id,
                suite.size(),
                group.id,
                group.size
            )
        });
    if let Some(draw) = group.draw {
        let in_draw = store.require_draw(draw)?.suites.contains(&suite.id);
        guards.check(in_draw, || format!("{} is not in {draw}", suite.id));
    }
    Ok(())
}

fn claim(store: &mut DrawStore, group: GroupId, suite: SuiteId) -> DrawResult<()> {
    store.assign_suite(suite, group)?;
    if let Some(lottery) = store.lottery_of(group).map(|l| l.id) {
        refresh_selected(store, lottery)?;
    }
    Ok(())
}

fn release(store: &mut DrawStore, group: GroupId) -> DrawResult<Option<SuiteId>> {
    let suite = store.release_suite(group);
    if let Some(lottery) = store.lottery_of(group).map(|l| l.id) {
        refresh_selected(store, lottery)?;
    }
    Ok(suite)
}

/// `group` picks `suite` on its turn.
///
/// Drawless groups are never turn-checked.
pub fn select_suite(
    store: &mut DrawStore,
    group: GroupId,
    suite: SuiteId,
    outbox: &mut Outbox,
) -> DrawResult<()> {
    let picker = store.require_group(group)?.clone();
    let mut guards = Guards::new();
    guards.check(store.suite_of(group).is_none(), || {
        format!("{group} already holds a suite")
    });

    let previous = match picker.draw {
        Some(draw) => {
            let phase = store.require_draw(draw)?.phase;
            let next = next_ids(store, draw)?;
            let unit = store.lottery_of(group).map(|l| l.id);
            guards
                .check(phase == Phase::SuiteSelection, || {
                    format!("{draw} is in {phase}, not suite_selection")
                })
                .check(unit.is_some_and(|id| next.contains(&id)), || {
                    format!("it is not {group}'s turn")
                });
            Some((draw, next))
        }
        None => None,
    };
    check_suite(store, &picker, suite, &mut guards)?;
    guards.finish("select_suite")?;

    claim(store, group, suite)?;
    info!(%group, %suite, "Suite selected");
    if let Some((draw, previous)) = previous {
        announce_turns(store, draw, &previous, outbox)?;
    }
    Ok(())
}

/// Sends the group's unit to the back of the line.
pub fn skip_group(store: &mut DrawStore, group: GroupId, outbox: &mut Outbox) -> DrawResult<()> {
    let target = store.require_group(group)?.clone();
    let draw = target
        .draw
        .ok_or_else(|| DrawError::precondition(format!("{group} is not in a draw")))?;
    let phase = store.require_draw(draw)?.phase;
    let unit = store
        .lottery_of(group)
        .cloned()
        .ok_or_else(|| DrawError::not_found(format!("lottery unit of {group}")))?;

    let mut guards = Guards::new();
    guards
        .check(phase == Phase::SuiteSelection, || {
            format!("{draw} is in {phase}, not suite_selection")
        })
        .check(!unit.selected, || format!("{group} has already selected"));
    guards.finish("skip_group")?;

    let previous = next_ids(store, draw)?;
    let last = store
        .lotteries_in(draw)
        .map(|l| l.number)
        .max()
        .unwrap_or(unit.number);
    store.renumber_lottery(unit.id, last + 1)?;
    info!(%group, from = unit.number, to = last + 1, "Group skipped");

    outbox.push(Notification::new(
        NotificationEvent::Skipped { group },
        vec![target.leader],
    ));
    announce_turns(store, draw, &previous, outbox)
}

/// Gives back the group's suite.
pub fn remove_suite(store: &mut DrawStore, group: GroupId) -> DrawResult<SuiteId> {
    store.require_group(group)?;
    let suite = release(store, group)?
        .ok_or_else(|| DrawError::precondition(format!("{group} holds no suite")))?;
    info!(%group, %suite, "Suite removed");
    Ok(suite)
}

/// Sets suites for many groups at once, outside turn order.
///
/// `None` releases the group's suite. Releases happen before claims, so suites can move
/// between groups in one call.
pub fn assign_suites(
    store: &mut DrawStore,
    assignments: BTreeMap<GroupId, Option<SuiteId>>,
) -> DrawResult<()> {
    for (group, suite) in &assignments {
        store.require_group(*group)?;
        if store.suite_of(*group) != *suite {
            release(store, *group)?;
        }
    }
    for (group, suite) in &assignments {
        let Some(suite) = suite else { continue };
        if store.suite_of(*group) == Some(*suite) {
            continue;
        }
        let target = store.require_group(*group)?.clone();
        let mut guards = Guards::new();
        check_suite(store, &target, *suite, &mut guards)?;
        guards.finish("assign_suites")?;
        claim(store, *group, *suite)?;
    }
    info!(groups = assignments.len(), "Suites assigned");
    Ok(())
}
