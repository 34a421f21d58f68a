use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "opinions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub poi_id: i32,
    #[sea_orm(belongs_to, from = "poi_id", to = "id")]
    pub poi: HasOne<super::person_of_interest::Entity>,

    /// Author. At most one opinion per (poi_id, user_id).
    pub user_id: i32,

    /// Serialized `common::OpinionDocument`. Kept as text so a corrupted row
    /// can be reported instead of failing the whole query.
    #[sea_orm(column_type = "Text")]
    pub opinion_data: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
