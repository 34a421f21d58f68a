use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger row: presence means the migration with this id has been applied.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "migrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub executed_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
