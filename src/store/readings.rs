use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{events, readings};
use crate::error::{AppError, AppResult};
use crate::store::now_millis;

/// Incoming reading values. Everything is optional; an omitted `ts` means
/// "now". Unsupplied measurements are stored as NULL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReadingFields {
    pub ts: Option<i64>,
    pub fc: Option<f64>,
    pub tc: Option<f64>,
    pub ph: Option<f64>,
    pub ta: Option<i32>,
    pub ca: Option<i32>,
    pub cya: Option<i32>,
    pub pool_temp: Option<f64>,
    pub air_temp: Option<f64>,
    pub cpu_temp: Option<f64>,
}

impl ReadingFields {
    fn into_active_model(self, ts: i64) -> readings::ActiveModel {
        readings::ActiveModel {
            ts: Set(ts),
            fc: Set(self.fc),
            tc: Set(self.tc),
            ph: Set(self.ph),
            ta: Set(self.ta),
            ca: Set(self.ca),
            cya: Set(self.cya),
            pool_temp: Set(self.pool_temp),
            air_temp: Set(self.air_temp),
            cpu_temp: Set(self.cpu_temp),
        }
    }
}

/// The closed set of queryable measurement columns. Names arrive from the
/// HTTP layer as strings; parsing up front keeps typos and injection out of
/// query construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingField {
    Fc,
    Tc,
    Ph,
    Ta,
    Ca,
    Cya,
    PoolTemp,
    AirTemp,
    CpuTemp,
}

impl ReadingField {
    pub const ALL: [Self; 9] = [
        Self::Fc,
        Self::Tc,
        Self::Ph,
        Self::Ta,
        Self::Ca,
        Self::Cya,
        Self::PoolTemp,
        Self::AirTemp,
        Self::CpuTemp,
    ];

    /// Parse a column name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnknownColumn` for anything outside the fixed set.
    pub fn parse(name: &str) -> AppResult<Self> {
        match name {
            "fc" => Ok(Self::Fc),
            "tc" => Ok(Self::Tc),
            "ph" => Ok(Self::Ph),
            "ta" => Ok(Self::Ta),
            "ca" => Ok(Self::Ca),
            "cya" => Ok(Self::Cya),
            "pool_temp" => Ok(Self::PoolTemp),
            "air_temp" => Ok(Self::AirTemp),
            "cpu_temp" => Ok(Self::CpuTemp),
            other => Err(AppError::UnknownColumn(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fc => "fc",
            Self::Tc => "tc",
            Self::Ph => "ph",
            Self::Ta => "ta",
            Self::Ca => "ca",
            Self::Cya => "cya",
            Self::PoolTemp => "pool_temp",
            Self::AirTemp => "air_temp",
            Self::CpuTemp => "cpu_temp",
        }
    }

    #[must_use]
    pub fn display(self) -> &'static str {
        match self {
            Self::Fc => "Free Chlorine",
            Self::Tc => "Total Chlorine",
            Self::Ph => "pH",
            Self::Ta => "Total Alkalinity",
            Self::Ca => "Calcium Hardness",
            Self::Cya => "Cyanuric Acid",
            Self::PoolTemp => "Pool Temperature",
            Self::AirTemp => "Air Temperature",
            Self::CpuTemp => "CPU Temperature",
        }
    }

    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Ph => "",
            Self::PoolTemp | Self::AirTemp | Self::CpuTemp => "°C",
            _ => "ppm",
        }
    }

    fn column(self) -> readings::Column {
        match self {
            Self::Fc => readings::Column::Fc,
            Self::Tc => readings::Column::Tc,
            Self::Ph => readings::Column::Ph,
            Self::Ta => readings::Column::Ta,
            Self::Ca => readings::Column::Ca,
            Self::Cya => readings::Column::Cya,
            Self::PoolTemp => readings::Column::PoolTemp,
            Self::AirTemp => readings::Column::AirTemp,
            Self::CpuTemp => readings::Column::CpuTemp,
        }
    }
}

/// Insert a reading. `ts` defaults to the current time in milliseconds.
///
/// # Errors
///
/// Returns `AppError::DuplicateTimestamp` if a reading already exists at the
/// resolved `ts`.
pub async fn add_reading(
    db: &impl ConnectionTrait,
    fields: ReadingFields,
) -> AppResult<readings::Model> {
    let ts = fields.ts.unwrap_or_else(now_millis);
    match fields.into_active_model(ts).insert(db).await {
        Ok(model) => Ok(model),
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::DuplicateTimestamp(ts)),
            _ => Err(e.into()),
        },
    }
}

/// Readings with `after <= ts <= before`, inclusive on both ends, ordered by
/// `ts` in the requested direction.
pub async fn get_readings(
    db: &impl ConnectionTrait,
    after: i64,
    before: i64,
    order: Order,
) -> AppResult<Vec<readings::Model>> {
    let rows = readings::Entity::find()
        .filter(readings::Column::Ts.between(after, before))
        .order_by(readings::Column::Ts, order)
        .all(db)
        .await?;
    Ok(rows)
}

/// The reading at exactly `ts`, if any.
pub async fn get_reading_at(
    db: &impl ConnectionTrait,
    ts: i64,
) -> AppResult<Option<readings::Model>> {
    Ok(readings::Entity::find_by_id(ts).one(db).await?)
}

/// The most recent reading whose `field` column is non-null, if any.
pub async fn get_most_recent(
    db: &impl ConnectionTrait,
    field: ReadingField,
) -> AppResult<Option<readings::Model>> {
    let row = readings::Entity::find()
        .filter(field.column().is_not_null())
        .order_by_desc(readings::Column::Ts)
        .one(db)
        .await?;
    Ok(row)
}

/// Delete readings in the inclusive range, returning the number removed.
///
/// Child events are deleted in the same transaction; the schema-level cascade
/// would also cover this, the explicit delete keeps the invariant independent
/// of the connection's foreign-key pragma.
pub async fn delete_readings(db: &DatabaseConnection, after: i64, before: i64) -> AppResult<u64> {
    let txn = db.begin().await?;
    events::Entity::delete_many()
        .filter(events::Column::ReadingTs.between(after, before))
        .exec(&txn)
        .await?;
    let res = readings::Entity::delete_many()
        .filter(readings::Column::Ts.between(after, before))
        .exec(&txn)
        .await?;
    txn.commit().await?;
    Ok(res.rows_affected)
}

/// Delete the reading at `ts` (and its events). Returns whether one existed.
pub async fn delete_reading_at(db: &DatabaseConnection, ts: i64) -> AppResult<bool> {
    let txn = db.begin().await?;
    events::Entity::delete_many()
        .filter(events::Column::ReadingTs.eq(ts))
        .exec(&txn)
        .await?;
    let res = readings::Entity::delete_by_id(ts).exec(&txn).await?;
    txn.commit().await?;
    Ok(res.rows_affected > 0)
}

/// Full replace of the reading identified by `fields.ts`.
///
/// # Errors
///
/// Returns `AppError::Validation` if `ts` is missing and
/// `AppError::NotFound` if no reading exists at that timestamp.
pub async fn update_reading(
    db: &impl ConnectionTrait,
    fields: ReadingFields,
) -> AppResult<readings::Model> {
    let Some(ts) = fields.ts else {
        return Err(AppError::Validation(
            "ts is required when updating a reading".to_string(),
        ));
    };
    if readings::Entity::find_by_id(ts).one(db).await?.is_none() {
        return Err(AppError::NotFound(format!("No reading at ts={ts}")));
    }
    let model = fields.into_active_model(ts).update(db).await?;
    Ok(model)
}
