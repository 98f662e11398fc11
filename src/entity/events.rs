use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A logged pool action (chemical addition, swim load, maintenance), owned by
/// the reading taken at `reading_ts`. The schema declares ON DELETE CASCADE so
/// events never outlive their reading.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Event)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub event_id: i32,
    pub event_type: String,
    /// Unit depends on the event type (gallons, liters, people, ...)
    pub quantity: Option<f64>,
    pub comment: Option<String>,
    pub reading_ts: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::readings::Entity",
        from = "Column::ReadingTs",
        to = "super::readings::Column::Ts",
        on_delete = "Cascade"
    )]
    Reading,
}

impl Related<super::readings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reading.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
