use std::collections::BTreeMap;

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::settings;
use crate::error::{AppError, AppResult};

/// Schema version this build understands. A database created by a different
/// version refuses to start; migrations are supplied externally.
pub const DB_VERSION: i64 = 1;

/// The fixed set of persisted configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingName {
    /// When the controller last booted (seconds since epoch)
    StartUpTime,
    /// How often to capture a reading (seconds); <= 0 pauses capture
    ReadingInterval,
    /// Water temperature last pushed to the pH probe for compensation (°C)
    CompensationTemp,
    /// How far the water temperature may drift before re-compensating (°C)
    CompensationDelta,
    /// Schema version; read-only after initialization
    DatabaseVersion,
}

impl SettingName {
    pub const ALL: [Self; 5] = [
        Self::StartUpTime,
        Self::ReadingInterval,
        Self::CompensationTemp,
        Self::CompensationDelta,
        Self::DatabaseVersion,
    ];

    /// Parse a setting name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnknownSetting` for anything outside the fixed set.
    pub fn parse(name: &str) -> AppResult<Self> {
        match name {
            "start_up_time" => Ok(Self::StartUpTime),
            "reading_interval" => Ok(Self::ReadingInterval),
            "compensation_temp" => Ok(Self::CompensationTemp),
            "compensation_delta" => Ok(Self::CompensationDelta),
            "database_version" => Ok(Self::DatabaseVersion),
            other => Err(AppError::UnknownSetting(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartUpTime => "start_up_time",
            Self::ReadingInterval => "reading_interval",
            Self::CompensationTemp => "compensation_temp",
            Self::CompensationDelta => "compensation_delta",
            Self::DatabaseVersion => "database_version",
        }
    }

    #[must_use]
    pub fn kind(self) -> SettingKind {
        match self {
            Self::StartUpTime | Self::ReadingInterval | Self::DatabaseVersion => SettingKind::Int,
            Self::CompensationTemp | Self::CompensationDelta => SettingKind::Float,
        }
    }

    #[must_use]
    pub fn default_value(self) -> SettingValue {
        match self {
            Self::StartUpTime => SettingValue::Int(0),
            Self::ReadingInterval => SettingValue::Int(60),
            Self::CompensationTemp => SettingValue::Float(25.0),
            Self::CompensationDelta => SettingValue::Float(1.0),
            Self::DatabaseVersion => SettingValue::Int(DB_VERSION),
        }
    }
}

/// Per-name value type. Rows persist as text; this tag says how to read it
/// back and what to accept on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Int,
    Float,
}

/// A typed setting value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Float(f64),
}

impl SettingValue {
    /// Interpret a stored text value according to the name's kind.
    fn parse_stored(kind: SettingKind, text: &str) -> AppResult<Self> {
        match kind {
            SettingKind::Int => text
                .parse::<i64>()
                .map(Self::Int)
                .map_err(|_| AppError::Internal(format!("Corrupt integer setting value: {text}"))),
            SettingKind::Float => text
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|_| AppError::Internal(format!("Corrupt float setting value: {text}"))),
        }
    }

    /// Convert a JSON value from the update surface.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` when the value does not fit the kind
    /// (a fractional number for an integer setting, a non-numeric string).
    pub fn from_json(kind: SettingKind, value: &serde_json::Value) -> AppResult<Self> {
        match kind {
            SettingKind::Int => {
                if let Some(v) = value.as_i64() {
                    return Ok(Self::Int(v));
                }
                if let Some(s) = value.as_str()
                    && let Ok(v) = s.parse::<i64>()
                {
                    return Ok(Self::Int(v));
                }
                Err(AppError::Validation(format!(
                    "Expected an integer, got {value}"
                )))
            }
            SettingKind::Float => {
                if let Some(v) = value.as_f64() {
                    return Ok(Self::Float(v));
                }
                if let Some(s) = value.as_str()
                    && let Ok(v) = s.parse::<f64>()
                {
                    return Ok(Self::Float(v));
                }
                Err(AppError::Validation(format!(
                    "Expected a number, got {value}"
                )))
            }
        }
    }

    fn to_stored(self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
        }
    }

    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Int(v) => v,
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(v) => v as i64,
        }
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }
}

/// Typed, cached view of the settings table. Loaded once at startup and the
/// only way settings are mutated afterwards; the cache is updated write-through
/// after the database commit.
#[derive(Debug)]
pub struct SettingsStore {
    values: BTreeMap<SettingName, SettingValue>,
}

impl SettingsStore {
    /// Load settings, seeding defaults on first startup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SchemaVersionMismatch` if the stored
    /// `database_version` differs from [`DB_VERSION`]. This is fatal to
    /// startup; the operator must migrate the data file externally.
    pub async fn load(db: &DatabaseConnection) -> AppResult<Self> {
        let rows = settings::Entity::find().all(db).await?;

        let mut values = BTreeMap::new();
        for row in &rows {
            match SettingName::parse(&row.name) {
                Ok(name) => {
                    values.insert(name, SettingValue::parse_stored(name.kind(), &row.value)?);
                }
                Err(_) => {
                    tracing::warn!(name = %row.name, "Ignoring unrecognized settings row");
                }
            }
        }

        if values.is_empty() {
            tracing::info!("No settings found, seeding defaults");
        }

        // Seed any missing names. On first startup that is the full set.
        let missing: Vec<SettingName> = SettingName::ALL
            .into_iter()
            .filter(|name| !values.contains_key(name))
            .collect();
        if !missing.is_empty() {
            let txn = db.begin().await?;
            for name in &missing {
                let default = name.default_value();
                settings::ActiveModel {
                    name: Set(name.as_str().to_string()),
                    value: Set(default.to_stored()),
                }
                .insert(&txn)
                .await?;
                values.insert(*name, default);
            }
            txn.commit().await?;
        }

        let found = values
            .get(&SettingName::DatabaseVersion)
            .copied()
            .unwrap_or_else(|| SettingName::DatabaseVersion.default_value())
            .as_i64();
        if found != DB_VERSION {
            return Err(AppError::SchemaVersionMismatch {
                found,
                expected: DB_VERSION,
            });
        }

        Ok(Self { values })
    }

    /// Current typed value. The cache holds the full fixed set after `load`.
    #[must_use]
    pub fn get(&self, name: SettingName) -> SettingValue {
        self.values
            .get(&name)
            .copied()
            .unwrap_or_else(|| name.default_value())
    }

    /// All current values keyed by wire name.
    #[must_use]
    pub fn all(&self) -> BTreeMap<&'static str, SettingValue> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect()
    }

    /// Update one setting, write-through.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ReadOnlySetting` for `database_version` and
    /// `AppError::Validation` if the value does not fit the name's kind.
    pub async fn update(
        &mut self,
        db: &impl ConnectionTrait,
        name: SettingName,
        value: SettingValue,
    ) -> AppResult<()> {
        if name == SettingName::DatabaseVersion {
            return Err(AppError::ReadOnlySetting("database_version"));
        }
        let value = coerce(name.kind(), value)?;
        persist(db, name, value).await?;
        self.values.insert(name, value);
        Ok(())
    }

    /// Apply a batch of raw (name, value) updates atomically. Either every
    /// entry lands or none does; the cache is untouched on failure.
    ///
    /// # Errors
    ///
    /// Any unknown name, read-only name, or ill-typed value rejects the whole
    /// batch.
    pub async fn update_many(
        &mut self,
        db: &DatabaseConnection,
        entries: &serde_json::Map<String, serde_json::Value>,
    ) -> AppResult<()> {
        // Validate and convert everything before touching the database.
        let mut converted: Vec<(SettingName, SettingValue)> = Vec::with_capacity(entries.len());
        for (raw_name, raw_value) in entries {
            let name = SettingName::parse(raw_name)?;
            if name == SettingName::DatabaseVersion {
                return Err(AppError::ReadOnlySetting("database_version"));
            }
            converted.push((name, SettingValue::from_json(name.kind(), raw_value)?));
        }

        let txn = db.begin().await?;
        for (name, value) in &converted {
            persist(&txn, *name, *value).await?;
        }
        txn.commit().await?;

        for (name, value) in converted {
            self.values.insert(name, value);
        }
        Ok(())
    }

    /// Whether the water temperature has drifted far enough from the last
    /// applied compensation temperature to push a new one to the pH probe.
    /// Strictly greater than the delta; equal drift does not trigger.
    #[must_use]
    pub fn should_compensate(&self, current_temp: f64) -> bool {
        let last = self.get(SettingName::CompensationTemp).as_f64();
        let delta = self.get(SettingName::CompensationDelta).as_f64();
        (current_temp - last).abs() > delta
    }
}

fn coerce(kind: SettingKind, value: SettingValue) -> AppResult<SettingValue> {
    match (kind, value) {
        (SettingKind::Int, SettingValue::Int(_)) | (SettingKind::Float, SettingValue::Float(_)) => {
            Ok(value)
        }
        (SettingKind::Float, SettingValue::Int(v)) => Ok(SettingValue::Float(v as f64)),
        (SettingKind::Int, SettingValue::Float(_)) => Err(AppError::Validation(
            "Expected an integer value".to_string(),
        )),
    }
}

async fn persist(
    db: &impl ConnectionTrait,
    name: SettingName,
    value: SettingValue,
) -> AppResult<()> {
    settings::ActiveModel {
        name: Set(name.as_str().to_string()),
        value: Set(value.to_stored()),
    }
    .update(db)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_defaults() -> SettingsStore {
        SettingsStore {
            values: SettingName::ALL
                .into_iter()
                .map(|n| (n, n.default_value()))
                .collect(),
        }
    }

    #[test]
    fn compensation_triggers_only_beyond_delta() {
        // Defaults: compensation_temp = 25.0, compensation_delta = 1.0
        let store = store_with_defaults();
        assert!(!store.should_compensate(25.0));
        assert!(!store.should_compensate(26.0)); // drift == delta: no
        assert!(!store.should_compensate(24.0));
        assert!(store.should_compensate(27.0)); // strictly greater: yes
        assert!(store.should_compensate(23.0));
    }

    #[test]
    fn setting_names_round_trip() {
        for name in SettingName::ALL {
            assert_eq!(SettingName::parse(name.as_str()).unwrap(), name);
        }
        assert!(matches!(
            SettingName::parse("pump_speed"),
            Err(AppError::UnknownSetting(_))
        ));
    }

    #[test]
    fn json_conversion_respects_kind() {
        let v = SettingValue::from_json(SettingKind::Int, &serde_json::json!(30)).unwrap();
        assert_eq!(v, SettingValue::Int(30));
        let v = SettingValue::from_json(SettingKind::Float, &serde_json::json!(26)).unwrap();
        assert_eq!(v, SettingValue::Float(26.0));
        let v = SettingValue::from_json(SettingKind::Float, &serde_json::json!("2.5")).unwrap();
        assert_eq!(v, SettingValue::Float(2.5));
        assert!(SettingValue::from_json(SettingKind::Int, &serde_json::json!("warm")).is_err());
    }
}
