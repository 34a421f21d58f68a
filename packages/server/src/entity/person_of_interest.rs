use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "person_of_interest")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    pub name: String,
    pub state: String,
    pub pic_url: String,

    /// References `astrological_signs.id`.
    pub sun_sign_id: i32,
    /// References `astrological_signs.id`.
    pub pluto_sign_id: i32,

    pub vip_count: i32,

    #[sea_orm(has_many)]
    pub opinions: HasMany<super::opinion::Entity>,

    #[sea_orm(has_many)]
    pub reviews: HasMany<super::review::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
