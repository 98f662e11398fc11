//! Integration tests for the event store, including the cascade invariant.
//!
//! Run with: cargo test --test events_store_test

mod common;

use pool_db::error::AppError;
use pool_db::store::events::{
    EventFields, EventKind, add_event, add_event_by_time, delete_event_by_id, get_events,
    get_events_at, get_events_by_kind,
};
use pool_db::store::readings::{ReadingFields, add_reading, delete_reading_at, delete_readings};

async fn seed_reading(db: &sea_orm::DatabaseConnection, ts: i64) -> pool_db::entity::readings::Model {
    add_reading(
        db,
        ReadingFields {
            ts: Some(ts),
            ..ReadingFields::default()
        },
    )
    .await
    .unwrap()
}

fn chlorine(quantity: f64) -> EventFields {
    EventFields {
        event_type: Some("ADD-CL".to_string()),
        quantity: Some(quantity),
        comment: None,
    }
}

#[tokio::test]
async fn event_attaches_to_its_reading() {
    let db = common::test_db().await;
    let reading = seed_reading(&db, 100).await;

    let event = add_event(
        &db,
        &reading,
        EventFields {
            event_type: Some("SWIM".to_string()),
            quantity: Some(4.0),
            comment: Some("pool party".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(event.reading_ts, 100);
    assert_eq!(event.event_type, "SWIM");

    let at = get_events_at(&db, 100).await.unwrap();
    assert_eq!(at.len(), 1);
    assert_eq!(at[0].event_id, event.event_id);
    assert_eq!(at[0].comment.as_deref(), Some("pool party"));
}

#[tokio::test]
async fn add_by_time_requires_an_existing_reading() {
    let db = common::test_db().await;

    let err = add_event_by_time(&db, 123, chlorine(1.0)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    seed_reading(&db, 123).await;
    let event = add_event_by_time(&db, 123, chlorine(1.0)).await.unwrap();
    assert_eq!(event.reading_ts, 123);
}

#[tokio::test]
async fn missing_or_unknown_type_is_rejected() {
    let db = common::test_db().await;
    let reading = seed_reading(&db, 1).await;

    let err = add_event(&db, &reading, EventFields::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = add_event(
        &db,
        &reading,
        EventFields {
            event_type: Some("ADD-SALT".to_string()),
            ..EventFields::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert!(get_events_at(&db, 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn range_and_kind_filters() {
    let db = common::test_db().await;
    for ts in [1, 2, 3] {
        seed_reading(&db, ts).await;
    }
    add_event_by_time(&db, 1, chlorine(0.5)).await.unwrap();
    add_event_by_time(
        &db,
        2,
        EventFields {
            event_type: Some("BACKWASH".to_string()),
            ..EventFields::default()
        },
    )
    .await
    .unwrap();
    add_event_by_time(&db, 3, chlorine(1.0)).await.unwrap();

    let all = get_events(&db, 1, 3).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(
        all.iter().map(|e| e.reading_ts).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    // Inclusive bounds
    assert_eq!(get_events(&db, 2, 2).await.unwrap().len(), 1);

    let chlorine_only = get_events_by_kind(&db, 1, 3, EventKind::AddChlorine)
        .await
        .unwrap();
    assert_eq!(chlorine_only.len(), 2);
    assert!(chlorine_only.iter().all(|e| e.event_type == "ADD-CL"));
}

#[tokio::test]
async fn deleting_a_reading_cascades_to_its_events() {
    let db = common::test_db().await;
    seed_reading(&db, 50).await;
    seed_reading(&db, 60).await;
    add_event_by_time(&db, 50, chlorine(1.0)).await.unwrap();
    add_event_by_time(&db, 50, chlorine(2.0)).await.unwrap();
    add_event_by_time(&db, 60, chlorine(3.0)).await.unwrap();

    assert!(delete_reading_at(&db, 50).await.unwrap());

    assert!(get_events_at(&db, 50).await.unwrap().is_empty());
    // The neighbor is untouched
    assert_eq!(get_events_at(&db, 60).await.unwrap().len(), 1);
}

#[tokio::test]
async fn range_delete_cascades_too() {
    let db = common::test_db().await;
    for ts in [10, 20, 30] {
        seed_reading(&db, ts).await;
        add_event_by_time(&db, ts, chlorine(1.0)).await.unwrap();
    }

    delete_readings(&db, 10, 20).await.unwrap();

    assert!(get_events(&db, 10, 20).await.unwrap().is_empty());
    assert_eq!(get_events(&db, 0, 100).await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_by_id_reports_presence_exactly_once() {
    let db = common::test_db().await;
    seed_reading(&db, 1).await;
    let event = add_event_by_time(&db, 1, chlorine(1.0)).await.unwrap();

    assert!(delete_event_by_id(&db, event.event_id).await.unwrap());
    assert!(!delete_event_by_id(&db, event.event_id).await.unwrap());
}
