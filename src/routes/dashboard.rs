use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::chem;
use crate::common::AppState;
use crate::error::AppResult;
use crate::store;
use crate::store::readings::ReadingField;

/// Latest known value for one chemistry category.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryStatus {
    pub field: &'static str,
    pub display: &'static str,
    pub unit: &'static str,
    /// Most recent non-null value, if any reading has one
    pub value: Option<f64>,
    /// Timestamp of that reading (epoch millis)
    pub ts: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub categories: Vec<CategoryStatus>,
    /// Langelier Saturation Index from the latest pH, water temperature,
    /// calcium hardness, and total alkalinity; null until all four exist
    pub saturation_index: Option<f64>,
}

const DASHBOARD_FIELDS: [ReadingField; 7] = [
    ReadingField::Fc,
    ReadingField::Tc,
    ReadingField::Ph,
    ReadingField::Ta,
    ReadingField::Ca,
    ReadingField::Cya,
    ReadingField::PoolTemp,
];

fn field_value(reading: &crate::entity::readings::Model, field: ReadingField) -> Option<f64> {
    match field {
        ReadingField::Fc => reading.fc,
        ReadingField::Tc => reading.tc,
        ReadingField::Ph => reading.ph,
        ReadingField::Ta => reading.ta.map(f64::from),
        ReadingField::Ca => reading.ca.map(f64::from),
        ReadingField::Cya => reading.cya.map(f64::from),
        ReadingField::PoolTemp => reading.pool_temp,
        ReadingField::AirTemp => reading.air_temp,
        ReadingField::CpuTemp => reading.cpu_temp,
    }
}

/// Latest chemistry per category plus the derived water-balance index
///
/// Each category reports the most recent reading where that column is
/// non-null, so a manual alkalinity test from last week still shows next to
/// this morning's sensor temperatures.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Dashboard data retrieved successfully", body = DashboardResponse),
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardResponse>> {
    let mut categories = Vec::with_capacity(DASHBOARD_FIELDS.len());
    let mut by_field = std::collections::HashMap::new();
    for field in DASHBOARD_FIELDS {
        let reading = store::readings::get_most_recent(&state.db, field).await?;
        let (value, ts) = reading
            .as_ref()
            .map(|r| (field_value(r, field), Some(r.ts)))
            .unwrap_or((None, None));
        by_field.insert(field.as_str(), value);
        categories.push(CategoryStatus {
            field: field.as_str(),
            display: field.display(),
            unit: field.unit(),
            value,
            ts,
        });
    }

    let saturation_index = chem::saturation_index(
        by_field.get("ph").copied().flatten(),
        by_field.get("pool_temp").copied().flatten(),
        by_field.get("ca").copied().flatten(),
        by_field.get("ta").copied().flatten(),
        None,
    );

    Ok(Json(DashboardResponse {
        categories,
        saturation_index,
    }))
}
