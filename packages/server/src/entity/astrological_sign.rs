use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reference row for one of the twelve signs. Seeded by the initial migration.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "astrological_signs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub sign_name: String,
}

impl ActiveModelBehavior for ActiveModel {}
