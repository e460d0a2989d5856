//! # Lottery Allocator
//!
//! Turns a draw's groups and clips into lottery units and gives each unit a number. Lower
//! numbers pick suites first.

use crate::error::{DrawError, DrawResult};
use crate::guard::Guards;
use crate::model::*;
use crate::notify::Outbox;
use crate::phase;
use crate::policy::{Policy, SizeSort};
use crate::rng::DrawRng;
use crate::store::DrawStore;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use tracing::info;

/// A group, or a clip of groups, that receives one number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotteryUnit {
    pub key: UnitKey,
    pub clip: Option<ClipId>,
    pub groups: BTreeSet<GroupId>,
}

/// Every clip of the draw with a confirmed group, plus every group not covered by one.
pub fn units(store: &DrawStore, draw: DrawId) -> Vec<LotteryUnit> {
    let mut covered = BTreeSet::new();
    let mut units = Vec::new();
    for clip in store.clips_in(draw) {
        let groups: BTreeSet<GroupId> = store.clip_groups(clip.id).into_iter().collect();
        if groups.is_empty() {
            continue;
        }
        covered.extend(groups.iter().copied());
        units.push(LotteryUnit {
            key: UnitKey::Clip(clip.id),
            clip: Some(clip.id),
            groups,
        });
    }
    for group in store.groups_in(draw) {
        if !covered.contains(&group.id) {
            units.push(LotteryUnit {
                key: UnitKey::Group(group.id),
                clip: None,
                groups: BTreeSet::from([group.id]),
            });
        }
    }
    units
}

/// The size a unit is ranked by when sorting is on.
///
/// A lone group uses its own size. A clip uses its smallest or largest constituent,
/// whichever helps it under the sort direction when clips are advantaged, and whichever
/// hurts it otherwise.
pub fn effective_size(store: &DrawStore, unit: &LotteryUnit, policy: &Policy) -> u32 {
    let sizes = unit
        .groups
        .iter()
        .filter_map(|g| store.group(*g))
        .map(|g| g.size);
    let smallest_first = match (policy.size_sort, policy.advantage_clips) {
        (SizeSort::Ascending, true) | (SizeSort::Descending, false) => true,
        (SizeSort::Ascending, false) | (SizeSort::Descending, true) => false,
        (SizeSort::None, _) => true,
    };
    if smallest_first {
        sizes.min().unwrap_or(0)
    } else {
        sizes.max().unwrap_or(0)
    }
}

/// Runs the lottery for `draw` and opens suite selection.
///
/// A draw still in pre_lottery is first advanced into the lottery phase. Stale assignments
/// are dropped, every unit gets a number from a uniform shuffle (re-ranked by size when
/// the policy asks for it), and the draw advances to suite_selection.
pub fn run_lottery(
    store: &mut DrawStore,
    draw: DrawId,
    rng: &mut DrawRng,
    policy: &Policy,
    outbox: &mut Outbox,
) -> DrawResult<Vec<LotteryAssignment>> {
    if store.require_draw(draw)?.phase == Phase::PreLottery {
        phase::advance(store, draw, outbox)?;
    }
    let current = store.require_draw(draw)?.phase;
    let mut guards = Guards::new();
    guards.check(current == Phase::Lottery, || {
        format!("{draw} is in {current}, not lottery")
    });
    guards.finish("run_lottery")?;

    let stale: Vec<LotteryId> = store.lotteries_in(draw).map(|l| l.id).collect();
    for id in &stale {
        store.remove_lottery(*id);
    }

    let mut order = units(store, draw);
    rng.shuffle(&mut order);
    let view: &DrawStore = store;
    match policy.size_sort {
        SizeSort::None => {}
        SizeSort::Ascending => order.sort_by_key(|u| effective_size(view, u, policy)),
        SizeSort::Descending => order.sort_by_key(|u| Reverse(effective_size(view, u, policy))),
    }
    for (index, unit) in order.into_iter().enumerate() {
        store.insert_lottery(draw, index as u32 + 1, unit.clip, unit.groups)?;
    }
    info!(%draw, units = store.lotteries_in(draw).count(), replaced = stale.len(), "Lottery drawn");

    phase::advance(store, draw, outbox)?;
    Ok(lottery_units(store, draw))
}

/// Gives one unit a number by hand during the lottery phase.
pub fn assign_lottery_number(
    store: &mut DrawStore,
    draw: DrawId,
    key: UnitKey,
    number: u32,
) -> DrawResult<LotteryId> {
    if store.require_draw(draw)?.phase != Phase::Lottery {
        return Err(DrawError::Immutable {
            entity: "lottery",
            field: "number",
        });
    }
    if number == 0 {
        return Err(DrawError::Invalid("lottery numbers start at 1".into()));
    }
    let unit = units(store, draw)
        .into_iter()
        .find(|u| u.key == key)
        .ok_or_else(|| DrawError::not_found(format!("lottery unit {key} in {draw}")))?;

    let existing = store
        .lotteries_in(draw)
        .find(|l| covers(l, &unit))
        .map(|l| l.id);
    let id = match existing {
        Some(id) => {
            store.renumber_lottery(id, number)?;
            id
        }
        None => store.insert_lottery(draw, number, unit.clip, unit.groups)?,
    };
    info!(%draw, unit = %key, number, "Lottery number assigned");
    Ok(id)
}

/// The draw's lottery assignments, lowest number first.
pub fn lottery_units(store: &DrawStore, draw: DrawId) -> Vec<LotteryAssignment> {
    let mut assignments: Vec<LotteryAssignment> = store.lotteries_in(draw).cloned().collect();
    assignments.sort_by_key(|l| l.number);
    assignments
}

/// Units that still lack a number.
pub fn unnumbered(store: &DrawStore, draw: DrawId) -> Vec<UnitKey> {
    units(store, draw)
        .into_iter()
        .filter(|u| !store.lotteries_in(draw).any(|l| covers(l, u)))
        .map(|u| u.key)
        .collect()
}

fn covers(assignment: &LotteryAssignment, unit: &LotteryUnit) -> bool {
    match unit.key {
        UnitKey::Clip(clip) => assignment.clip == Some(clip),
        UnitKey::Group(group) => assignment.clip.is_none() && assignment.groups.contains(&group),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::next_units;
    use crate::testing::Fixture;
    use proptest::prelude::*;

    fn clip_of(fx: &mut Fixture, groups: &[GroupId]) -> ClipId {
        let clip = fx.store.insert_clip(fx.draw);
        for group in groups {
            fx.store.insert_clip_membership(clip, *group, true).unwrap();
        }
        clip
    }

    fn lottery_fixture() -> Fixture {
        let mut fx = Fixture::new();
        fx.set_phase(Phase::Lottery);
        fx
    }

    #[test]
    fn test_clipped_groups_share_a_number_and_are_next_together() {
        let mut fx = lottery_fixture();
        let a = fx.locked_group(2);
        let b = fx.locked_group(2);
        clip_of(&mut fx, &[a, b]);

        let assignments = run_lottery(
            &mut fx.store,
            fx.draw,
            &mut DrawRng::from_seed(1),
            &Policy::default(),
            &mut Vec::new(),
        )
        .unwrap();

        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].groups, BTreeSet::from([a, b]));
        assert_eq!(
            fx.store.draw(fx.draw).unwrap().phase,
            Phase::SuiteSelection
        );
        let next = next_units(&fx.store, fx.draw).unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].groups, BTreeSet::from([a, b]));
    }

    #[test]
    fn test_lone_groups_get_their_own_numbers() {
        let mut fx = lottery_fixture();
        let a = fx.locked_group(2);
        let b = fx.locked_group(2);
        let c = fx.locked_group(2);
        clip_of(&mut fx, &[a, b]);

        run_lottery(
            &mut fx.store,
            fx.draw,
            &mut DrawRng::from_seed(1),
            &Policy::default(),
            &mut Vec::new(),
        )
        .unwrap();

        let shared = fx.store.lottery_of(a).unwrap();
        assert_eq!(shared.id, fx.store.lottery_of(b).unwrap().id);
        assert_ne!(shared.number, fx.store.lottery_of(c).unwrap().number);
    }

    /// Clip of sizes {1, 3} against a lone group of size 2.
    fn sorted_positions(size_sort: SizeSort, advantage_clips: bool) -> (u32, u32) {
        let mut fx = lottery_fixture();
        let small = fx.locked_group(1);
        let large = fx.locked_group(3);
        let lone = fx.locked_group(2);
        let clip = clip_of(&mut fx, &[small, large]);
        let policy = Policy {
            size_sort,
            advantage_clips,
            ..Policy::default()
        };

        run_lottery(
            &mut fx.store,
            fx.draw,
            &mut DrawRng::from_seed(99),
            &policy,
            &mut Vec::new(),
        )
        .unwrap();

        let clip_number = fx
            .store
            .lotteries_in(fx.draw)
            .find(|l| l.clip == Some(clip))
            .unwrap()
            .number;
        (clip_number, fx.store.lottery_of(lone).unwrap().number)
    }

    #[test]
    fn test_ascending_advantaged_clip_ranks_by_smallest_group() {
        assert_eq!(sorted_positions(SizeSort::Ascending, true), (1, 2));
    }

    #[test]
    fn test_ascending_disadvantaged_clip_ranks_by_largest_group() {
        assert_eq!(sorted_positions(SizeSort::Ascending, false), (2, 1));
    }

    #[test]
    fn test_descending_advantaged_clip_ranks_by_largest_group() {
        assert_eq!(sorted_positions(SizeSort::Descending, true), (1, 2));
    }

    #[test]
    fn test_descending_disadvantaged_clip_ranks_by_smallest_group() {
        assert_eq!(sorted_positions(SizeSort::Descending, false), (2, 1));
    }

    #[test]
    fn test_manual_numbers_are_unique_and_phase_gated() {
        let mut fx = lottery_fixture();
        let a = fx.locked_group(1);
        let b = fx.locked_group(1);

        assign_lottery_number(&mut fx.store, fx.draw, UnitKey::Group(a), 1).unwrap();
        let err =
            assign_lottery_number(&mut fx.store, fx.draw, UnitKey::Group(b), 1).unwrap_err();
        assert!(matches!(err, DrawError::AlreadyTaken(_)));
        assert_eq!(unnumbered(&fx.store, fx.draw), vec![UnitKey::Group(b)]);

        assign_lottery_number(&mut fx.store, fx.draw, UnitKey::Group(b), 2).unwrap();
        assert!(unnumbered(&fx.store, fx.draw).is_empty());

        fx.set_phase(Phase::SuiteSelection);
        assert_eq!(
            assign_lottery_number(&mut fx.store, fx.draw, UnitKey::Group(a), 5).unwrap_err(),
            DrawError::Immutable {
                entity: "lottery",
                field: "number"
            }
        );
    }

    #[test]
    fn test_run_lottery_replaces_manual_numbers() {
        let mut fx = lottery_fixture();
        let a = fx.locked_group(1);
        fx.locked_group(1);
        assign_lottery_number(&mut fx.store, fx.draw, UnitKey::Group(a), 40).unwrap();

        run_lottery(
            &mut fx.store,
            fx.draw,
            &mut DrawRng::from_seed(5),
            &Policy::default(),
            &mut Vec::new(),
        )
        .unwrap();

        let mut numbers: Vec<u32> = fx.store.lotteries_in(fx.draw).map(|l| l.number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn test_run_lottery_outside_lottery_phase_fails() {
        let mut fx = Fixture::new();
        fx.locked_group(1);
        fx.set_phase(Phase::Draft);

        let result = run_lottery(
            &mut fx.store,
            fx.draw,
            &mut DrawRng::from_seed(5),
            &Policy::default(),
            &mut Vec::new(),
        );
        assert!(matches!(result, Err(DrawError::Precondition(_))));
    }

    proptest! {
        #[test]
        fn numbers_are_a_permutation(groups in 1usize..12, seed in any::<u64>()) {
            let mut fx = lottery_fixture();
            for _ in 0..groups {
                fx.locked_group(1);
            }
            run_lottery(
                &mut fx.store,
                fx.draw,
                &mut DrawRng::from_seed(seed),
                &Policy::default(),
                &mut Vec::new(),
            )
            .unwrap();

            let mut numbers: Vec<u32> = fx.store.lotteries_in(fx.draw).map(|l| l.number).collect();
            numbers.sort_unstable();
            prop_assert_eq!(numbers, (1..=groups as u32).collect::<Vec<_>>());
        }
    }
}
