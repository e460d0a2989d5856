use store_actor::mock::MockClient;
use store_actor::{StoreError, StoreFacade};
use suite_draw::clients::DrawClient;
use suite_draw::engine::{DrawOutput, DrawQueryOutput};
use suite_draw::model::*;
use suite_draw::store::DrawStore;
use suite_draw::DrawError;

/// Client wrapper against a scripted store: no rules run, only reply unpacking.
#[tokio::test]
async fn test_client_unpacks_replies() {
    let mut mock = MockClient::<DrawStore>::new();
    mock.expect_execute().return_ok(DrawOutput::Draw(DrawId(4)));
    mock.expect_execute().return_ok(DrawOutput::SizeLocked(true));
    mock.expect_query()
        .return_ok(DrawQueryOutput::Violations(vec!["draw_4 has no students".into()]));

    let client = DrawClient::new(mock.client());
    let draw = client
        .create_draw(DrawCreate {
            name: "Spring".into(),
            allow_clipping: false,
        })
        .await
        .unwrap();
    assert_eq!(draw, DrawId(4));
    assert!(client.toggle_size_lock(draw, 2).await.unwrap());
    assert_eq!(
        client.phase_violations(draw).await.unwrap(),
        vec!["draw_4 has no students".to_string()]
    );

    mock.verify();
}

#[tokio::test]
async fn test_client_maps_store_errors() {
    let mut mock = MockClient::<DrawStore>::new();
    mock.expect_execute().return_err(StoreError::Closed);
    mock.expect_execute()
        .return_err(StoreError::Rejected(DrawError::NotFound("group_9".into())));
    mock.expect_snapshot().return_err(StoreError::Dropped);

    let client = DrawClient::new(mock.client());
    assert!(matches!(
        client.lock_group(GroupId(1)).await,
        Err(DrawError::Store(_))
    ));
    assert_eq!(
        client.lock_group(GroupId(9)).await,
        Err(DrawError::NotFound("group_9".into()))
    );
    assert!(matches!(client.snapshot().await, Err(DrawError::Store(_))));

    mock.verify();
}

#[tokio::test]
async fn test_client_rejects_mismatched_reply() {
    let mut mock = MockClient::<DrawStore>::new();
    mock.expect_execute().return_ok(DrawOutput::Done);
    mock.expect_query().return_ok(DrawQueryOutput::Oversubscribed(true));

    let client = DrawClient::new(mock.client());
    let err = client
        .create_group(GroupCreate {
            leader: UserId(1),
            size: 2,
            invite: vec![],
        })
        .await
        .unwrap_err();
    let DrawError::Store(message) = err else {
        panic!("expected store error, got {err:?}");
    };
    assert!(message.contains("Done"));
    assert!(client.draw(DrawId(1)).await.is_err());

    mock.verify();
}
