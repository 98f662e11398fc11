use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::sensors::SensorHub;
use crate::store::settings::SettingsStore;

/// Shared handles for route handlers and the capture scheduler. Settings sit
/// behind an RwLock because `PUT /api/settings` mutates the typed cache while
/// the scheduler reads it.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub settings: Arc<RwLock<SettingsStore>>,
    pub sensors: Arc<dyn SensorHub>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        config: Config,
        settings: SettingsStore,
        sensors: Arc<dyn SensorHub>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            settings: Arc::new(RwLock::new(settings)),
            sensors,
        }
    }
}
