use chrono::Utc;
use sea_orm::sea_query::{ColumnDef, Expr, Table};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QueryOrder, Set};

use crate::entity::migration;

/// Durable record of applied migrations, backed by the `migrations` table.
///
/// Works against any connection, so the runner can use it inside the same
/// transaction that applies a migration.
pub struct Ledger<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> Ledger<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create the ledger table if it does not exist yet.
    pub async fn ensure_table(&self) -> Result<(), DbErr> {
        let stmt = Table::create()
            .table(migration::Entity)
            .if_not_exists()
            .col(
                ColumnDef::new(migration::Column::Id)
                    .string()
                    .not_null()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(migration::Column::ExecutedAt)
                    .timestamp_with_time_zone()
                    .not_null()
                    .default(Expr::current_timestamp()),
            )
            .to_owned();

        let backend = self.conn.get_database_backend();
        self.conn.execute_raw(backend.build(&stmt)).await?;
        Ok(())
    }

    pub async fn is_applied(&self, id: &str) -> Result<bool, DbErr> {
        Ok(migration::Entity::find_by_id(id.to_string())
            .one(self.conn)
            .await?
            .is_some())
    }

    /// Append a ledger row. Fails with a unique-constraint violation if the id
    /// is already recorded.
    pub async fn record(&self, id: &str) -> Result<(), DbErr> {
        let row = migration::ActiveModel {
            id: Set(id.to_string()),
            executed_at: Set(Utc::now()),
        };
        migration::Entity::insert(row)
            .exec_without_returning(self.conn)
            .await?;
        Ok(())
    }

    /// Delete a ledger row. Returns whether a row existed.
    pub async fn remove(&self, id: &str) -> Result<bool, DbErr> {
        let result = migration::Entity::delete_by_id(id.to_string())
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// All ledger rows, ordered by id.
    pub async fn entries(&self) -> Result<Vec<migration::Model>, DbErr> {
        migration::Entity::find()
            .order_by_asc(migration::Column::Id)
            .all(self.conn)
            .await
    }
}
