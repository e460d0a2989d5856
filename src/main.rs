//! Runs one draw from draft to results.

use store_actor::StoreFacade;
use suite_draw::config::EngineConfig;
use suite_draw::lifecycle::{setup_tracing, DrawSystem};
use suite_draw::model::*;
use suite_draw::DrawError;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = EngineConfig::from_env()?;
    info!(?config, "Starting demo draw");
    let system = DrawSystem::new(config);
    let client = &system.client;

    let draw = client
        .create_draw(DrawCreate {
            name: "Spring Housing".to_string(),
            allow_clipping: true,
        })
        .await?;

    // Eight students, four pairs, but only three doubles.
    for (number, size) in [("101", 2), ("102", 2), ("103", 2), ("201", 1), ("202", 1)] {
        let suite = client
            .create_suite(SuiteCreate::singles("North Hall", number, size))
            .await?;
        client.add_suite_to_draw(draw, suite).await?;
    }
    let mut students = Vec::new();
    for name in ["Ada", "Bo", "Cy", "Di", "Ed", "Flo", "Gus", "Hal"] {
        let user = client
            .create_user(UserCreate::student(name, Intent::OnCampus))
            .await?;
        client.add_student_to_draw(draw, user).await?;
        students.push(user);
    }
    client.advance_phase(draw).await?;

    let span = tracing::info_span!("group_formation", %draw);
    let groups = async {
        let mut groups = Vec::new();
        for pair in students.chunks(2) {
            let group = client
                .create_group(GroupCreate {
                    leader: pair[0],
                    size: 2,
                    invite: vec![],
                })
                .await?;
            let invite = client.invite_member(group, pair[1]).await?;
            client.accept_membership(invite).await?;
            groups.push(group);
        }
        Ok::<_, DrawError>(groups)
    }
    .instrument(span)
    .await?;

    let report = client.oversubscription_report(draw).await?;
    info!(?report, "Demand before pruning");
    let outcome = client.prune(draw, vec![2]).await?;
    info!(destroyed = ?outcome.destroyed, "Pruned oversubscribed size");

    for group in groups.iter().filter(|g| !outcome.destroyed.contains(g)) {
        client.lock_group(*group).await?;
    }

    // The pruned pair splits up into the singles.
    let snapshot = client.snapshot().await?;
    let stranded: Vec<UserId> = students
        .iter()
        .copied()
        .filter(|u| snapshot.group_of(*u).is_none())
        .collect();
    for user in stranded {
        let group = client
            .create_group(GroupCreate {
                leader: user,
                size: 1,
                invite: vec![],
            })
            .await?;
        client.lock_group(group).await?;
    }
    let violations = client.phase_violations(draw).await?;
    info!(?violations, "Ready for the lottery");

    let units = client.run_lottery(draw).await?;
    info!(units = units.len(), "Lottery drawn");

    let span = tracing::info_span!("suite_selection", %draw);
    async {
        while let Some(unit) = client.next_units(draw).await?.into_iter().next() {
            for group in &unit.groups {
                let size = client.group(*group).await?.size;
                let snapshot = client.snapshot().await?;
                let Some(suite) = snapshot
                    .available_suites(draw)
                    .into_iter()
                    .find(|s| s.size() == size)
                    .map(|s| s.id)
                else {
                    warn!(%group, size, "No suite left to pick");
                    return Ok(());
                };
                client.select_suite(*group, suite).await?;
                info!(%group, %suite, number = unit.number, "Suite picked");
            }
        }
        Ok::<_, DrawError>(())
    }
    .instrument(span)
    .await?;

    let step = client.advance_phase(draw).await?;
    info!(phase = %step.phase, spawned = ?step.spawned, "Draw finished");

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
