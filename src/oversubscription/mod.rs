//! # Oversubscription Resolver
//!
//! A size is oversubscribed when a draw has more groups of that size than available suites
//! of that size. Pruning destroys randomly chosen groups until demand fits supply, then
//! locks the size so no new groups of it can form.

use crate::error::{DrawError, DrawResult};
use crate::guard::Guards;
use crate::ledger::destroy_group;
use crate::model::*;
use crate::notify::Outbox;
use crate::rng::DrawRng;
use crate::store::DrawStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Demand against supply for one suite size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeReport {
    pub size: u32,
    pub groups: u32,
    pub suites: u32,
    pub oversubscribed: bool,
}

/// Result of a prune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneOutcome {
    pub destroyed: Vec<GroupId>,
    /// The draw, when none of its sizes is oversubscribed any more.
    pub resolved: Option<DrawId>,
}

fn demand(store: &DrawStore, draw: DrawId, size: u32) -> u32 {
    store.groups_in(draw).filter(|g| g.size == size).count() as u32
}

fn supply(store: &DrawStore, draw: DrawId, size: u32) -> u32 {
    store
        .available_suites(draw)
        .iter()
        .filter(|s| s.size() == size)
        .count() as u32
}

pub fn oversubscribed(store: &DrawStore, draw: DrawId, size: u32) -> bool {
    demand(store, draw, size) > supply(store, draw, size)
}

/// Per-size demand and supply, for every size that has either.
pub fn report(store: &DrawStore, draw: DrawId) -> DrawResult<Vec<SizeReport>> {
    store.require_draw(draw)?;
    let mut rows: BTreeMap<u32, (u32, u32)> = BTreeMap::new();
    for group in store.groups_in(draw) {
        rows.entry(group.size).or_default().0 += 1;
    }
    for suite in store.available_suites(draw) {
        rows.entry(suite.size()).or_default().1 += 1;
    }
    Ok(rows
        .into_iter()
        .map(|(size, (groups, suites))| SizeReport {
            size,
            groups,
            suites,
            oversubscribed: groups > suites,
        })
        .collect())
}

/// Destroys `demand - supply` random groups for each size and locks the size.
///
/// Every size must currently be oversubscribed; otherwise nothing happens and the invalid
/// sizes are reported.
pub fn prune(
    store: &mut DrawStore,
    draw: DrawId,
    sizes: &[u32],
    rng: &mut DrawRng,
    outbox: &mut Outbox,
) -> DrawResult<PruneOutcome> {
    let phase = store.require_draw(draw)?.phase;
    let sizes: BTreeSet<u32> = sizes.iter().copied().collect();

    let mut guards = Guards::new();
    guards
        .check(phase == Phase::PreLottery, || {
            format!("{draw} is in {phase}, not pre_lottery")
        })
        .check(!sizes.is_empty(), || "no sizes to prune".into());
    let invalid: Vec<u32> = sizes
        .iter()
        .copied()
        .filter(|size| demand(store, draw, *size) == 0 || !oversubscribed(store, draw, *size))
        .collect();
    guards.check(invalid.is_empty(), || {
        format!("sizes {invalid:?} are not oversubscribed")
    });
    guards.finish("prune")?;

    let mut destroyed = Vec::new();
    let mut failed = Vec::new();
    for size in &sizes {
        let excess = (demand(store, draw, *size) - supply(store, draw, *size)) as usize;
        let candidates: Vec<GroupId> = store
            .groups_in(draw)
            .filter(|g| g.size == *size)
            .map(|g| g.id)
            .collect();
        let mut chosen = rng.sample(candidates, excess);
        chosen.sort_unstable();
        for group in chosen {
            match destroy_group(store, group, outbox) {
                Ok(()) => destroyed.push(group),
                Err(e) => {
                    warn!(%group, error = %e, "Prune could not destroy group");
                    failed.push(group);
                }
            }
        }
        store.draw_mut(draw)?.locked_sizes.insert(*size);
    }
    if !failed.is_empty() {
        return Err(DrawError::PruneFailed { groups: failed });
    }

    let resolved = report(store, draw)?
        .iter()
        .all(|row| !row.oversubscribed)
        .then_some(draw);
    info!(%draw, ?sizes, destroyed = destroyed.len(), resolved = resolved.is_some(), "Draw pruned");
    Ok(PruneOutcome {
        destroyed,
        resolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationEvent;
    use crate::testing::Fixture;

    #[test]
    fn test_prune_destroys_exactly_the_excess() {
        let mut fx = Fixture::new();
        let groups = [fx.group(2), fx.group(2), fx.group(2)];
        fx.suite(2);
        fx.suite(2);
        assert!(oversubscribed(&fx.store, fx.draw, 2));

        let mut outbox = Vec::new();
        let outcome = prune(
            &mut fx.store,
            fx.draw,
            &[2],
            &mut DrawRng::from_seed(11),
            &mut outbox,
        )
        .unwrap();

        assert_eq!(outcome.destroyed.len(), 1);
        assert!(groups.contains(&outcome.destroyed[0]));
        assert_eq!(outcome.resolved, Some(fx.draw));
        assert_eq!(fx.store.groups_in(fx.draw).count(), 2);
        assert!(!oversubscribed(&fx.store, fx.draw, 2));
        assert!(fx.store.draw(fx.draw).unwrap().locked_sizes.contains(&2));
        assert!(matches!(
            outbox[0].event,
            NotificationEvent::GroupDisbanded { .. }
        ));
        assert_eq!(outbox[0].recipients.len(), 2);
    }

    #[test]
    fn test_prune_reports_invalid_sizes_and_writes_nothing() {
        let mut fx = Fixture::new();
        fx.group(2);
        fx.suite(2);

        let err = prune(
            &mut fx.store,
            fx.draw,
            &[2, 4],
            &mut DrawRng::from_seed(1),
            &mut Vec::new(),
        )
        .unwrap_err();

        let DrawError::Precondition(violations) = err else {
            panic!("expected precondition error, got {err:?}");
        };
        assert!(violations[0].contains("[2, 4]"));
        assert!(fx.store.draw(fx.draw).unwrap().locked_sizes.is_empty());
    }

    #[test]
    fn test_prune_leaves_other_sizes_unresolved() {
        let mut fx = Fixture::new();
        fx.group(1);
        fx.group(1);
        fx.group(3);
        fx.group(3);
        fx.suite(1);
        fx.suite(3);

        let outcome = prune(
            &mut fx.store,
            fx.draw,
            &[1],
            &mut DrawRng::from_seed(2),
            &mut Vec::new(),
        )
        .unwrap();

        assert_eq!(outcome.destroyed.len(), 1);
        assert_eq!(outcome.resolved, None);
        assert!(oversubscribed(&fx.store, fx.draw, 3));
    }

    #[test]
    fn test_report_lists_every_size() {
        let mut fx = Fixture::new();
        fx.group(2);
        fx.suite(2);
        fx.suite(4);

        assert_eq!(
            report(&fx.store, fx.draw).unwrap(),
            vec![
                SizeReport {
                    size: 2,
                    groups: 1,
                    suites: 1,
                    oversubscribed: false
                },
                SizeReport {
                    size: 4,
                    groups: 0,
                    suites: 1,
                    oversubscribed: false
                },
            ]
        );
    }
}
