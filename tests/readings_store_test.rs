//! Integration tests for the reading store.
//!
//! Run with: cargo test --test readings_store_test

mod common;

use sea_orm::Order;

use pool_db::error::AppError;
use pool_db::store::readings::{
    ReadingField, ReadingFields, add_reading, delete_reading_at, delete_readings, get_most_recent,
    get_reading_at, get_readings, update_reading,
};

fn fields(ts: i64) -> ReadingFields {
    ReadingFields {
        ts: Some(ts),
        ..ReadingFields::default()
    }
}

#[tokio::test]
async fn add_then_get_round_trips() {
    let db = common::test_db().await;

    let input = ReadingFields {
        ts: Some(1_000),
        fc: Some(2.5),
        tc: Some(3.0),
        ph: Some(7.4),
        ta: Some(120),
        ca: Some(250),
        cya: Some(40),
        pool_temp: Some(26.5),
        air_temp: Some(33.0),
        cpu_temp: None,
    };
    add_reading(&db, input).await.unwrap();

    let got = get_reading_at(&db, 1_000).await.unwrap().expect("stored");
    assert_eq!(got.ts, 1_000);
    assert_eq!(got.fc, Some(2.5));
    assert_eq!(got.tc, Some(3.0));
    assert_eq!(got.ph, Some(7.4));
    assert_eq!(got.ta, Some(120));
    assert_eq!(got.ca, Some(250));
    assert_eq!(got.cya, Some(40));
    assert_eq!(got.pool_temp, Some(26.5));
    assert_eq!(got.air_temp, Some(33.0));
    assert_eq!(got.cpu_temp, None);
}

#[tokio::test]
async fn omitted_ts_defaults_to_now() {
    let db = common::test_db().await;

    let before = pool_db::store::now_millis();
    let stored = add_reading(&db, ReadingFields::default()).await.unwrap();
    let after = pool_db::store::now_millis();

    assert!(stored.ts >= before && stored.ts <= after);
}

#[tokio::test]
async fn duplicate_ts_is_a_conflict() {
    let db = common::test_db().await;

    add_reading(&db, fields(42)).await.unwrap();
    let err = add_reading(&db, fields(42)).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateTimestamp(42)));

    // The first row survives
    assert!(get_reading_at(&db, 42).await.unwrap().is_some());
}

#[tokio::test]
async fn range_query_is_inclusive_on_both_ends() {
    let db = common::test_db().await;
    for ts in [1, 2, 3] {
        add_reading(&db, fields(ts)).await.unwrap();
    }

    let all = get_readings(&db, 1, 3, Order::Asc).await.unwrap();
    assert_eq!(all.iter().map(|r| r.ts).collect::<Vec<_>>(), vec![1, 2, 3]);

    let one = get_readings(&db, 2, 2, Order::Asc).await.unwrap();
    assert_eq!(one.len(), 1);
    assert_eq!(one[0].ts, 2);

    let desc = get_readings(&db, 1, 3, Order::Desc).await.unwrap();
    assert_eq!(desc.iter().map(|r| r.ts).collect::<Vec<_>>(), vec![3, 2, 1]);

    let none = get_readings(&db, 4, 10, Order::Asc).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn most_recent_skips_null_columns() {
    let db = common::test_db().await;

    add_reading(
        &db,
        ReadingFields {
            ts: Some(1),
            fc: Some(7.5),
            ph: Some(7.4),
            ..ReadingFields::default()
        },
    )
    .await
    .unwrap();
    add_reading(
        &db,
        ReadingFields {
            ts: Some(2),
            fc: Some(10.0),
            ..ReadingFields::default()
        },
    )
    .await
    .unwrap();
    add_reading(
        &db,
        ReadingFields {
            ts: Some(3),
            ta: Some(150),
            ..ReadingFields::default()
        },
    )
    .await
    .unwrap();

    // fc is set on ts=1 and ts=2; the later one wins
    let fc = get_most_recent(&db, ReadingField::Fc)
        .await
        .unwrap()
        .expect("fc exists");
    assert_eq!(fc.ts, 2);
    assert_eq!(fc.fc, Some(10.0));

    // ph only on ts=1
    let ph = get_most_recent(&db, ReadingField::Ph)
        .await
        .unwrap()
        .expect("ph exists");
    assert_eq!(ph.ts, 1);

    // ca never set
    assert!(get_most_recent(&db, ReadingField::Ca).await.unwrap().is_none());
}

#[test]
fn unknown_column_is_rejected_before_querying() {
    let err = ReadingField::parse("fc; DROP TABLE readings").unwrap_err();
    assert!(matches!(err, AppError::UnknownColumn(_)));
    assert!(ReadingField::parse("pool_temp").is_ok());
}

#[tokio::test]
async fn delete_range_returns_count() {
    let db = common::test_db().await;
    for ts in [10, 20, 30, 40] {
        add_reading(&db, fields(ts)).await.unwrap();
    }

    let deleted = delete_readings(&db, 20, 30).await.unwrap();
    assert_eq!(deleted, 2);

    let left = get_readings(&db, 0, 100, Order::Asc).await.unwrap();
    assert_eq!(left.iter().map(|r| r.ts).collect::<Vec<_>>(), vec![10, 40]);
}

#[tokio::test]
async fn delete_at_reports_presence() {
    let db = common::test_db().await;
    add_reading(&db, fields(5)).await.unwrap();

    assert!(delete_reading_at(&db, 5).await.unwrap());
    assert!(!delete_reading_at(&db, 5).await.unwrap());
}

#[tokio::test]
async fn update_is_a_full_replace() {
    let db = common::test_db().await;
    add_reading(
        &db,
        ReadingFields {
            ts: Some(7),
            fc: Some(1.0),
            ph: Some(7.2),
            ..ReadingFields::default()
        },
    )
    .await
    .unwrap();

    let updated = update_reading(
        &db,
        ReadingFields {
            ts: Some(7),
            ta: Some(100),
            ..ReadingFields::default()
        },
    )
    .await
    .unwrap();

    // fc and ph were not resupplied, so they are gone
    assert_eq!(updated.ta, Some(100));
    assert_eq!(updated.fc, None);
    assert_eq!(updated.ph, None);
}

#[tokio::test]
async fn update_of_missing_reading_is_not_found() {
    let db = common::test_db().await;
    let err = update_reading(&db, fields(99)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
