use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub poi_id: Option<i32>,
    #[sea_orm(belongs_to, from = "poi_id", to = "id")]
    pub poi: HasOne<super::person_of_interest::Entity>,

    pub user_id: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub review_text: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
