use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{events, readings};
use crate::error::{AppError, AppResult};
use crate::store::readings::get_reading_at;

/// The fixed set of loggable pool actions. The wire names are the historical
/// ones, so existing databases and clients keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Add chlorine (gallons)
    AddChlorine,
    /// Add muriatic acid (gallons)
    AddAcid,
    /// Add algaecide (liters)
    AddAlgaecide,
    /// Swim load (number of people)
    Swim,
    /// Backwash the filter
    Backwash,
    /// Clean the filter
    CleanFilter,
    /// Notable weather (storm, heat wave, ...)
    Weather,
}

impl EventKind {
    pub const ALL: [Self; 7] = [
        Self::AddChlorine,
        Self::AddAcid,
        Self::AddAlgaecide,
        Self::Swim,
        Self::Backwash,
        Self::CleanFilter,
        Self::Weather,
    ];

    /// Parse a wire name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for anything outside the fixed set.
    pub fn parse(name: &str) -> AppResult<Self> {
        match name {
            "ADD-CL" => Ok(Self::AddChlorine),
            "ADD-ACID" => Ok(Self::AddAcid),
            "ADD-ALGAECIDE" => Ok(Self::AddAlgaecide),
            "SWIM" => Ok(Self::Swim),
            "BACKWASH" => Ok(Self::Backwash),
            "CLEAN-FILTER" => Ok(Self::CleanFilter),
            "WEATHER" => Ok(Self::Weather),
            other => Err(AppError::Validation(format!(
                "Unknown event type: {other}"
            ))),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddChlorine => "ADD-CL",
            Self::AddAcid => "ADD-ACID",
            Self::AddAlgaecide => "ADD-ALGAECIDE",
            Self::Swim => "SWIM",
            Self::Backwash => "BACKWASH",
            Self::CleanFilter => "CLEAN-FILTER",
            Self::Weather => "WEATHER",
        }
    }
}

/// Incoming event values. `event_type` is required and must be a known kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EventFields {
    pub event_type: Option<String>,
    pub quantity: Option<f64>,
    pub comment: Option<String>,
}

/// Attach an event to an existing reading.
///
/// # Errors
///
/// Returns `AppError::Validation` if `event_type` is missing or unknown.
pub async fn add_event(
    db: &impl ConnectionTrait,
    reading: &readings::Model,
    fields: EventFields,
) -> AppResult<events::Model> {
    let Some(ref type_name) = fields.event_type else {
        return Err(AppError::Validation("event_type is required".to_string()));
    };
    let kind = EventKind::parse(type_name)?;

    let model = events::ActiveModel {
        event_id: NotSet,
        event_type: Set(kind.as_str().to_string()),
        quantity: Set(fields.quantity),
        comment: Set(fields.comment),
        reading_ts: Set(reading.ts),
    }
    .insert(db)
    .await?;
    Ok(model)
}

/// Attach an event to the reading at `ts`.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no reading exists at that timestamp.
pub async fn add_event_by_time(
    db: &impl ConnectionTrait,
    ts: i64,
    fields: EventFields,
) -> AppResult<events::Model> {
    let reading = get_reading_at(db, ts)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No reading at ts={ts}")))?;
    add_event(db, &reading, fields).await
}

/// Events whose owning reading falls in the inclusive range, oldest first.
pub async fn get_events(
    db: &impl ConnectionTrait,
    after: i64,
    before: i64,
) -> AppResult<Vec<events::Model>> {
    let rows = events::Entity::find()
        .filter(events::Column::ReadingTs.between(after, before))
        .order_by_asc(events::Column::ReadingTs)
        .order_by_asc(events::Column::EventId)
        .all(db)
        .await?;
    Ok(rows)
}

/// All events owned by the reading at `ts`.
pub async fn get_events_at(db: &impl ConnectionTrait, ts: i64) -> AppResult<Vec<events::Model>> {
    let rows = events::Entity::find()
        .filter(events::Column::ReadingTs.eq(ts))
        .order_by_asc(events::Column::EventId)
        .all(db)
        .await?;
    Ok(rows)
}

/// Range query additionally filtered by event kind.
pub async fn get_events_by_kind(
    db: &impl ConnectionTrait,
    after: i64,
    before: i64,
    kind: EventKind,
) -> AppResult<Vec<events::Model>> {
    let rows = events::Entity::find()
        .filter(events::Column::ReadingTs.between(after, before))
        .filter(events::Column::EventType.eq(kind.as_str()))
        .order_by_asc(events::Column::ReadingTs)
        .order_by_asc(events::Column::EventId)
        .all(db)
        .await?;
    Ok(rows)
}

/// Delete one event. Returns whether it existed.
pub async fn delete_event_by_id(db: &impl ConnectionTrait, event_id: i32) -> AppResult<bool> {
    let res = events::Entity::delete_by_id(event_id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// Delete all events owned by the reading at `ts`, returning the count.
pub async fn delete_events_at(db: &impl ConnectionTrait, ts: i64) -> AppResult<u64> {
    let res = events::Entity::delete_many()
        .filter(events::Column::ReadingTs.eq(ts))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
