//! Integration tests for the settings store: seeding, typed updates, atomic
//! batches, and the startup schema-version gate.
//!
//! Run with: cargo test --test settings_store_test

mod common;

use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

use pool_db::entity::settings;
use pool_db::error::AppError;
use pool_db::store::settings::{DB_VERSION, SettingName, SettingValue, SettingsStore};

#[tokio::test]
async fn first_startup_seeds_the_full_default_set() {
    let db = common::test_db().await;
    let store = SettingsStore::load(&db).await.unwrap();

    let all = store.all();
    assert_eq!(all.len(), SettingName::ALL.len());
    assert_eq!(all["reading_interval"], SettingValue::Int(60));
    assert_eq!(all["compensation_temp"], SettingValue::Float(25.0));
    assert_eq!(all["compensation_delta"], SettingValue::Float(1.0));
    assert_eq!(all["database_version"], SettingValue::Int(DB_VERSION));

    // Loading again is idempotent
    let again = SettingsStore::load(&db).await.unwrap();
    assert_eq!(again.all(), all);
}

#[tokio::test]
async fn updates_persist_across_reload() {
    let db = common::test_db().await;
    let mut store = SettingsStore::load(&db).await.unwrap();

    store
        .update(&db, SettingName::ReadingInterval, SettingValue::Int(30))
        .await
        .unwrap();
    assert_eq!(
        store.get(SettingName::ReadingInterval),
        SettingValue::Int(30)
    );

    let reloaded = SettingsStore::load(&db).await.unwrap();
    assert_eq!(
        reloaded.get(SettingName::ReadingInterval),
        SettingValue::Int(30)
    );
}

#[tokio::test]
async fn database_version_is_read_only() {
    let db = common::test_db().await;
    let mut store = SettingsStore::load(&db).await.unwrap();

    let err = store
        .update(&db, SettingName::DatabaseVersion, SettingValue::Int(2))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReadOnlySetting(_)));
    assert_eq!(
        store.get(SettingName::DatabaseVersion),
        SettingValue::Int(DB_VERSION)
    );
}

#[tokio::test]
async fn batch_with_unknown_name_applies_nothing() {
    let db = common::test_db().await;
    let mut store = SettingsStore::load(&db).await.unwrap();

    let entries = json!({
        "reading_interval": 30,
        "unknown_key": 1,
    });
    let err = store
        .update_many(&db, entries.as_object().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnknownSetting(_)));

    // Neither the cache nor the database changed
    assert_eq!(
        store.get(SettingName::ReadingInterval),
        SettingValue::Int(60)
    );
    let reloaded = SettingsStore::load(&db).await.unwrap();
    assert_eq!(
        reloaded.get(SettingName::ReadingInterval),
        SettingValue::Int(60)
    );
}

#[tokio::test]
async fn batch_with_read_only_name_applies_nothing() {
    let db = common::test_db().await;
    let mut store = SettingsStore::load(&db).await.unwrap();

    let entries = json!({
        "reading_interval": 30,
        "database_version": 9,
    });
    let err = store
        .update_many(&db, entries.as_object().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReadOnlySetting(_)));
    assert_eq!(
        store.get(SettingName::ReadingInterval),
        SettingValue::Int(60)
    );
}

#[tokio::test]
async fn valid_batch_applies_everything() {
    let db = common::test_db().await;
    let mut store = SettingsStore::load(&db).await.unwrap();

    let entries = json!({
        "reading_interval": 120,
        "compensation_delta": 2.5,
    });
    store
        .update_many(&db, entries.as_object().unwrap())
        .await
        .unwrap();

    assert_eq!(
        store.get(SettingName::ReadingInterval),
        SettingValue::Int(120)
    );
    assert_eq!(
        store.get(SettingName::CompensationDelta),
        SettingValue::Float(2.5)
    );
    assert!(store.should_compensate(28.0));
    assert!(!store.should_compensate(27.0));
}

#[tokio::test]
async fn schema_version_mismatch_is_fatal_at_load() {
    let db = common::test_db().await;
    SettingsStore::load(&db).await.unwrap();

    // Simulate a data file from a newer build
    settings::ActiveModel {
        name: Set("database_version".to_string()),
        value: Set("2".to_string()),
    }
    .update(&db)
    .await
    .unwrap();

    let err = SettingsStore::load(&db).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::SchemaVersionMismatch {
            found: 2,
            expected: DB_VERSION,
        }
    ));
}
