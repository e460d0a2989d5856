use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use store_actor::{StoreActor, StoreError, Transactional};

// --- Test State ---

/// Seats that can each be claimed by one holder.
#[derive(Clone, Debug, Default)]
struct Seats {
    holders: BTreeMap<u32, String>,
}

#[derive(Debug)]
enum SeatCommand {
    Claim { seat: u32, holder: String },
    ClaimMany(Vec<(u32, String)>),
}

#[derive(Debug, PartialEq, thiserror::Error)]
enum SeatError {
    #[error("seat {0} already taken")]
    Taken(u32),
}

/// Records committed effects so tests can see what escaped each transaction.
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

#[async_trait]
impl Transactional for Seats {
    type Command = SeatCommand;
    type Output = usize;
    type Query = u32;
    type QueryOutput = Option<String>;
    type Effect = String;
    type Context = Journal;
    type Error = SeatError;

    fn execute(
        &mut self,
        command: SeatCommand,
        _ctx: &mut Journal,
        effects: &mut Vec<String>,
    ) -> Result<usize, SeatError> {
        let claims = match command {
            SeatCommand::Claim { seat, holder } => vec![(seat, holder)],
            SeatCommand::ClaimMany(claims) => claims,
        };
        for (seat, holder) in claims {
            if self.holders.contains_key(&seat) {
                return Err(SeatError::Taken(seat));
            }
            effects.push(format!("{holder} took {seat}"));
            self.holders.insert(seat, holder);
        }
        Ok(self.holders.len())
    }

    fn query(&self, seat: u32, _ctx: &Journal) -> Result<Option<String>, SeatError> {
        Ok(self.holders.get(&seat).cloned())
    }

    async fn after_commit(&self, effects: Vec<String>, ctx: &Journal) {
        ctx.0.lock().unwrap().extend(effects);
    }
}

// --- Tests ---

#[tokio::test]
async fn test_failed_command_rolls_back_partial_writes() {
    let journal = Journal::default();
    let (actor, client) = StoreActor::new(Seats::default(), 8);
    let handle = tokio::spawn(actor.run(journal.clone()));

    client
        .execute(SeatCommand::Claim {
            seat: 2,
            holder: "ada".into(),
        })
        .await
        .unwrap();

    // Seat 1 is written before seat 2 collides; both must vanish.
    let result = client
        .execute(SeatCommand::ClaimMany(vec![
            (1, "bob".into()),
            (2, "bob".into()),
        ]))
        .await;
    assert!(matches!(
        result,
        Err(StoreError::Rejected(SeatError::Taken(2)))
    ));

    assert_eq!(client.query(1).await.unwrap(), None);
    assert_eq!(client.query(2).await.unwrap(), Some("ada".to_string()));
    assert_eq!(client.snapshot().await.unwrap().holders.len(), 1);

    // Only the committed claim produced an effect.
    assert_eq!(*journal.0.lock().unwrap(), vec!["ada took 2".to_string()]);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_racing_claims_have_one_winner() {
    let (actor, client) = StoreActor::new(Seats::default(), 32);
    let handle = tokio::spawn(actor.run(Journal::default()));

    let mut tasks = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client
                .execute(SeatCommand::Claim {
                    seat: 7,
                    holder: format!("racer_{i}"),
                })
                .await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => winners += 1,
            Err(StoreError::Rejected(SeatError::Taken(7))) => losers += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(losers, 9);

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_closed_store_reports_closed() {
    let (actor, client) = StoreActor::new(Seats::default(), 1);
    drop(actor);

    let result = client.query(1).await;
    assert!(matches!(result, Err(StoreError::Closed)));
}
