use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::common::AppState;
use crate::entity::events;
use crate::error::{AppError, AppResult};
use crate::store;
use crate::store::events::{EventFields, EventKind};
use crate::store::now_millis;

#[derive(Debug, Deserialize, IntoParams)]
pub struct EventsQuery {
    /// Range start in epoch millis, inclusive (default 0)
    pub after: Option<i64>,
    /// Range end in epoch millis, inclusive (default now)
    pub before: Option<i64>,
    /// Filter by event type, e.g. ADD-CL or BACKWASH
    pub kind: Option<String>,
}

/// List events whose owning reading falls in a time range
#[utoipa::path(
    get,
    path = "/api/events",
    params(EventsQuery),
    responses(
        (status = 200, description = "Events retrieved successfully", body = Vec<events::Model>),
        (status = 400, description = "Unknown event type filter"),
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> AppResult<Json<Vec<events::Model>>> {
    let after = query.after.unwrap_or(0);
    let before = query.before.unwrap_or_else(now_millis);

    let rows = match query.kind.as_deref() {
        Some(name) => {
            let kind = EventKind::parse(name)?;
            store::events::get_events_by_kind(&state.db, after, before, kind).await?
        }
        None => store::events::get_events(&state.db, after, before).await?,
    };
    Ok(Json(rows))
}

/// Delete one event by id
#[utoipa::path(
    delete,
    path = "/api/events/{event_id}",
    params(("event_id" = i32, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 404, description = "No event with that id"),
    ),
    tag = "events"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
) -> AppResult<Json<serde_json::Value>> {
    if store::events::delete_event_by_id(&state.db, event_id).await? {
        Ok(Json(json!({ "deleted": true })))
    } else {
        Err(AppError::NotFound(format!("No event with id={event_id}")))
    }
}

/// List the events owned by a reading
#[utoipa::path(
    get,
    path = "/api/readings/{ts}/events",
    params(("ts" = i64, Path, description = "Owning reading timestamp (epoch millis)")),
    responses(
        (status = 200, description = "Events retrieved successfully", body = Vec<events::Model>),
    ),
    tag = "events"
)]
pub async fn list_reading_events(
    State(state): State<AppState>,
    Path(ts): Path<i64>,
) -> AppResult<Json<Vec<events::Model>>> {
    let rows = store::events::get_events_at(&state.db, ts).await?;
    Ok(Json(rows))
}

/// Delete all events owned by a reading
#[utoipa::path(
    delete,
    path = "/api/readings/{ts}/events",
    params(("ts" = i64, Path, description = "Owning reading timestamp (epoch millis)")),
    responses(
        (status = 200, description = "Events deleted"),
    ),
    tag = "events"
)]
pub async fn delete_reading_events(
    State(state): State<AppState>,
    Path(ts): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = store::events::delete_events_at(&state.db, ts).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

/// Log an event against the reading at a timestamp
#[utoipa::path(
    post,
    path = "/api/readings/{ts}/events",
    params(("ts" = i64, Path, description = "Owning reading timestamp (epoch millis)")),
    request_body = EventFields,
    responses(
        (status = 200, description = "Event stored", body = events::Model),
        (status = 400, description = "Missing or unknown event type"),
        (status = 404, description = "No reading at that timestamp"),
    ),
    tag = "events"
)]
pub async fn add_reading_event(
    State(state): State<AppState>,
    Path(ts): Path<i64>,
    Json(fields): Json<EventFields>,
) -> AppResult<Json<events::Model>> {
    let model = store::events::add_event_by_time(&state.db, ts, fields).await?;
    Ok(Json(model))
}
