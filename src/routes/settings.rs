use std::collections::BTreeMap;

use axum::{Json, extract::State};

use crate::common::AppState;
use crate::error::AppResult;
use crate::store::settings::SettingValue;

/// Current settings as a name-to-value map
#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Settings retrieved successfully"),
    ),
    tag = "settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Json<BTreeMap<&'static str, SettingValue>> {
    let settings = state.settings.read().await;
    Json(settings.all())
}

/// Update settings as a name-to-value map
///
/// All-or-nothing: any unknown name, read-only name, or ill-typed value
/// rejects the whole batch. Responds with the full updated settings map.
/// A changed `reading_interval` re-paces the capture scheduler on its next
/// tick.
#[utoipa::path(
    put,
    path = "/api/settings",
    responses(
        (status = 200, description = "Settings updated"),
        (status = 400, description = "Unknown name, read-only name, or ill-typed value"),
    ),
    tag = "settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(entries): Json<serde_json::Map<String, serde_json::Value>>,
) -> AppResult<Json<BTreeMap<&'static str, SettingValue>>> {
    let mut settings = state.settings.write().await;
    settings.update_many(&state.db, &entries).await?;
    tracing::info!(count = entries.len(), "Settings updated");
    Ok(Json(settings.all()))
}
