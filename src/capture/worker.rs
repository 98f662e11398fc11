use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::error::AppResult;
use crate::store;
use crate::store::readings::ReadingFields;
use crate::store::settings::{SettingName, SettingValue};

/// What one sensor sweep produced. `ts` is set only when the sample was
/// persisted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadingSample {
    pub ts: Option<i64>,
    pub ph: f64,
    pub pool_temp: f64,
    pub air_temp: f64,
    pub cpu_temp: f64,
}

/// Sweep the sensor hub and optionally persist the result as a reading.
///
/// Before sampling pH, checks whether the water temperature has drifted past
/// the compensation threshold; if so, pushes the new temperature to the probe
/// and records it as `compensation_temp` so future sweeps compare against it.
pub async fn capture_reading(state: &AppState, persist: bool) -> AppResult<ReadingSample> {
    let water_temp = state.sensors.water_temperature();

    let drifted = state.settings.read().await.should_compensate(water_temp);
    if drifted {
        state.sensors.set_ph_compensation(water_temp);
        let mut settings = state.settings.write().await;
        settings
            .update(
                &state.db,
                SettingName::CompensationTemp,
                SettingValue::Float(water_temp),
            )
            .await?;
        tracing::info!(water_temp, "Pushed pH temperature compensation to probe");
    }

    let mut sample = ReadingSample {
        ts: None,
        ph: state.sensors.ph(),
        pool_temp: water_temp,
        air_temp: state.sensors.air_temperature(),
        cpu_temp: state.sensors.internal_temperature(),
    };

    if persist {
        let stored = store::readings::add_reading(
            &state.db,
            ReadingFields {
                ph: Some(sample.ph),
                pool_temp: Some(sample.pool_temp),
                air_temp: Some(sample.air_temp),
                cpu_temp: Some(sample.cpu_temp),
                ..ReadingFields::default()
            },
        )
        .await?;
        sample.ts = Some(stored.ts);
    }

    Ok(sample)
}
