use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Incident document row. Embedded collections (recommendations, assigned
/// resources, contacted responder ids) live in Json columns, document-store
/// style; the store layer appends to them via read-modify-write.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "incidents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub severity: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: String,
    pub priority_score: Option<i16>,
    pub escalation_status: String,
    pub recommendations: Json,
    pub assigned_resources: Json,
    pub contacted_responders: Json,
    pub created_at: DateTimeWithTimeZone,
    pub last_action_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
