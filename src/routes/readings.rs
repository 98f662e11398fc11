use axum::{
    Json,
    extract::{Path, Query, State},
    http::header::{self, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use sea_orm::Order;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::{IntoParams, ToSchema};

use crate::capture::worker::{self, ReadingSample};
use crate::common::AppState;
use crate::entity::readings;
use crate::error::{AppError, AppResult};
use crate::store;
use crate::store::now_millis;
use crate::store::readings::{ReadingField, ReadingFields};

fn default_format() -> String {
    "json".to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReadingsQuery {
    /// Range start in epoch millis, inclusive (default 0)
    pub after: Option<i64>,
    /// Range end in epoch millis, inclusive (default now)
    pub before: Option<i64>,
    /// Sort direction: asc (default) or desc
    pub order: Option<String>,
    /// Response format: json (default) or csv
    #[serde(default = "default_format")]
    pub format: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RangeQuery {
    /// Range start in epoch millis, inclusive
    pub after: Option<i64>,
    /// Range end in epoch millis, inclusive
    pub before: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResponse {
    pub deleted: u64,
}

fn determine_format(query_format: &str, headers: &HeaderMap) -> String {
    // Query parameter takes precedence
    if query_format != "json" {
        return query_format.to_lowercase();
    }

    if let Some(accept) = headers.get(header::ACCEPT)
        && let Ok(accept_str) = accept.to_str()
        && accept_str.contains("text/csv")
    {
        return "csv".to_string();
    }

    "json".to_string()
}

fn csv_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn build_csv_response(rows: Vec<readings::Model>) -> AppResult<Response> {
    let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, std::io::Error>>(100);

    tokio::spawn(async move {
        let mut header = "ts".to_string();
        for field in ReadingField::ALL {
            header.push(',');
            header.push_str(field.as_str());
        }
        header.push('\n');
        let _ = tx.send(Ok(header)).await;

        for r in rows {
            let line = format!(
                "{},{},{},{},{},{},{},{},{},{}\n",
                r.ts,
                csv_cell(r.fc),
                csv_cell(r.tc),
                csv_cell(r.ph),
                csv_cell(r.ta),
                csv_cell(r.ca),
                csv_cell(r.cya),
                csv_cell(r.pool_temp),
                csv_cell(r.air_temp),
                csv_cell(r.cpu_temp),
            );
            if tx.send(Ok(line)).await.is_err() {
                break;
            }
        }
    });

    let stream = ReceiverStream::new(rx);
    let body = axum::body::Body::from_stream(stream);

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// List readings in a time range
///
/// Inclusive on both bounds. Supports JSON and streaming CSV.
#[utoipa::path(
    get,
    path = "/api/readings",
    params(ReadingsQuery),
    responses(
        (status = 200, description = "Readings retrieved successfully", body = Vec<readings::Model>),
        (status = 400, description = "Invalid query parameters"),
    ),
    tag = "readings"
)]
pub async fn list_readings(
    State(state): State<AppState>,
    Query(query): Query<ReadingsQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let after = query.after.unwrap_or(0);
    let before = query.before.unwrap_or_else(now_millis);
    let order = match query.order.as_deref() {
        Some("desc") => Order::Desc,
        _ => Order::Asc,
    };

    let rows = store::readings::get_readings(&state.db, after, before, order).await?;

    if determine_format(&query.format, &headers) == "csv" {
        return build_csv_response(rows);
    }
    Ok(Json(rows).into_response())
}

/// Record a reading
///
/// Omitted fields are stored as null; an omitted `ts` defaults to now.
#[utoipa::path(
    post,
    path = "/api/readings",
    request_body = ReadingFields,
    responses(
        (status = 200, description = "Reading stored", body = readings::Model),
        (status = 409, description = "A reading already exists at that timestamp"),
    ),
    tag = "readings"
)]
pub async fn add_reading(
    State(state): State<AppState>,
    Json(fields): Json<ReadingFields>,
) -> AppResult<Json<readings::Model>> {
    let model = store::readings::add_reading(&state.db, fields).await?;
    Ok(Json(model))
}

/// Delete readings in a time range
///
/// Both bounds are required. Owned events are removed with their readings.
#[utoipa::path(
    delete,
    path = "/api/readings",
    params(RangeQuery),
    responses(
        (status = 200, description = "Readings deleted", body = DeletedResponse),
        (status = 400, description = "Missing bounds"),
    ),
    tag = "readings"
)]
pub async fn delete_readings(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<DeletedResponse>> {
    let (Some(after), Some(before)) = (query.after, query.before) else {
        return Err(AppError::BadRequest(
            "after and before must both be specified".to_string(),
        ));
    };
    let deleted = store::readings::delete_readings(&state.db, after, before).await?;
    Ok(Json(DeletedResponse { deleted }))
}

/// Get the reading at an exact timestamp
#[utoipa::path(
    get,
    path = "/api/readings/{ts}",
    params(("ts" = i64, Path, description = "Reading timestamp (epoch millis)")),
    responses(
        (status = 200, description = "Reading found", body = readings::Model),
        (status = 404, description = "No reading at that timestamp"),
    ),
    tag = "readings"
)]
pub async fn get_reading(
    State(state): State<AppState>,
    Path(ts): Path<i64>,
) -> AppResult<Json<readings::Model>> {
    let model = store::readings::get_reading_at(&state.db, ts)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No reading at ts={ts}")))?;
    Ok(Json(model))
}

/// Replace the reading at a timestamp
///
/// Full replace: fields omitted from the body become null.
#[utoipa::path(
    put,
    path = "/api/readings/{ts}",
    params(("ts" = i64, Path, description = "Reading timestamp (epoch millis)")),
    request_body = ReadingFields,
    responses(
        (status = 200, description = "Reading replaced", body = readings::Model),
        (status = 404, description = "No reading at that timestamp"),
    ),
    tag = "readings"
)]
pub async fn update_reading(
    State(state): State<AppState>,
    Path(ts): Path<i64>,
    Json(mut fields): Json<ReadingFields>,
) -> AppResult<Json<readings::Model>> {
    fields.ts = Some(ts);
    let model = store::readings::update_reading(&state.db, fields).await?;
    Ok(Json(model))
}

/// Delete the reading at a timestamp
#[utoipa::path(
    delete,
    path = "/api/readings/{ts}",
    params(("ts" = i64, Path, description = "Reading timestamp (epoch millis)")),
    responses(
        (status = 200, description = "Reading deleted"),
        (status = 404, description = "No reading at that timestamp"),
    ),
    tag = "readings"
)]
pub async fn delete_reading(
    State(state): State<AppState>,
    Path(ts): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    if store::readings::delete_reading_at(&state.db, ts).await? {
        Ok(Json(json!({ "deleted": true })))
    } else {
        Err(AppError::NotFound(format!("No reading at ts={ts}")))
    }
}

/// Most recent reading with a non-null value for a column
#[utoipa::path(
    get,
    path = "/api/readings/latest/{field}",
    params(("field" = String, Path, description = "Reading column name, e.g. fc, ph, pool_temp")),
    responses(
        (status = 200, description = "Reading found", body = readings::Model),
        (status = 400, description = "Unknown column"),
        (status = 404, description = "No reading has that column set"),
    ),
    tag = "readings"
)]
pub async fn latest_reading(
    State(state): State<AppState>,
    Path(field): Path<String>,
) -> AppResult<Json<readings::Model>> {
    let field = ReadingField::parse(&field)?;
    let model = store::readings::get_most_recent(&state.db, field)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No reading with {} recorded", field.as_str()))
        })?;
    Ok(Json(model))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CurrentQuery {
    /// Persist the captured reading (default false)
    pub store: Option<bool>,
}

/// Capture a reading from the sensors right now
///
/// Runs the temperature-compensation check before sampling pH. Set `store=true`
/// to persist the sample.
#[utoipa::path(
    get,
    path = "/api/readings/current",
    params(CurrentQuery),
    responses(
        (status = 200, description = "Sensor sweep completed", body = ReadingSample),
    ),
    tag = "readings"
)]
pub async fn current_reading(
    State(state): State<AppState>,
    Query(query): Query<CurrentQuery>,
) -> AppResult<Json<ReadingSample>> {
    let sample = worker::capture_reading(&state, query.store.unwrap_or(false)).await?;
    Ok(Json(sample))
}
