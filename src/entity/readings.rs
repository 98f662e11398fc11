use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One timestamped chemistry snapshot. Every measurement column is nullable:
/// a manual entry may carry only test-kit values, a sensor capture only
/// temperatures and pH.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Reading)]
#[sea_orm(table_name = "readings")]
pub struct Model {
    /// Milliseconds since epoch
    #[sea_orm(primary_key, auto_increment = false)]
    pub ts: i64,
    /// Free chlorine (ppm)
    pub fc: Option<f64>,
    /// Total chlorine (ppm)
    pub tc: Option<f64>,
    /// pH (unitless)
    pub ph: Option<f64>,
    /// Total alkalinity (ppm)
    pub ta: Option<i32>,
    /// Calcium hardness (ppm)
    pub ca: Option<i32>,
    /// Cyanuric acid (ppm)
    pub cya: Option<i32>,
    /// Water temperature (°C)
    pub pool_temp: Option<f64>,
    /// Air temperature (°C)
    pub air_temp: Option<f64>,
    /// Controller CPU temperature (°C)
    pub cpu_temp: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::events::Entity")]
    Events,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
