use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DbBackend, DbErr, SqlErr, SqliteTransactionMode, Statement,
    TransactionOptions, TransactionSession, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use super::{Ledger, Migration, MigrationError};

/// Applied state of one migration id, as reported by [`Migrator::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub id: String,
    pub applied_at: Option<DateTime<Utc>>,
    /// False for ledger rows no registered migration accounts for.
    pub known: bool,
}

/// Brings a store up to date with a set of migrations.
pub struct Migrator<'m> {
    migrations: Vec<&'m Migration>,
}

impl<'m> Migrator<'m> {
    /// Order `migrations` by id. Fails if two migrations share an id.
    pub fn new(migrations: &'m [Migration]) -> Result<Self, MigrationError> {
        let mut sorted: Vec<&Migration> = migrations.iter().collect();
        sorted.sort_by_key(|m| m.id);

        if let Some(pair) = sorted.windows(2).find(|pair| pair[0].id == pair[1].id) {
            return Err(MigrationError::DuplicateId(pair[0].id.to_string()));
        }

        Ok(Self { migrations: sorted })
    }

    /// Registered ids in execution order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.migrations.iter().map(|m| m.id).collect()
    }

    /// Apply every migration missing from the ledger, in id order.
    ///
    /// Each migration runs in its own transaction together with its ledger
    /// insert. The first failure aborts the run; migrations applied earlier in
    /// the same run stay applied. Returns the ids applied by this call.
    #[instrument(skip_all)]
    pub async fn run<C>(&self, db: &C) -> Result<Vec<String>, MigrationError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        info!(registered = self.migrations.len(), "Starting migration run");
        Ledger::new(db).ensure_table().await?;
        self.warn_unknown_entries(db).await?;

        let mut applied = Vec::new();
        for migration in &self.migrations {
            if self.apply_one(db, migration).await? {
                applied.push(migration.id.to_string());
            }
        }

        info!(applied = applied.len(), "Migration run complete");
        Ok(applied)
    }

    /// Returns false if the ledger already had the id.
    async fn apply_one<C>(&self, db: &C, migration: &Migration) -> Result<bool, MigrationError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let id = migration.id;
        let backend = db.get_database_backend();
        let txn = begin_write(db).await?;

        if backend == DbBackend::Postgres {
            // Serializes concurrent runners; released at commit or rollback.
            let lock = Statement::from_string(
                backend,
                "LOCK TABLE migrations IN SHARE ROW EXCLUSIVE MODE",
            );
            if let Err(e) = txn.execute_raw(lock).await {
                rollback(txn, id).await;
                return Err(e.into());
            }
        }

        let ledger = Ledger::new(&txn);
        match ledger.is_applied(id).await {
            Ok(true) => {
                debug!(id, "Migration already applied, skipping");
                rollback(txn, id).await;
                return Ok(false);
            }
            Ok(false) => {}
            Err(e) => {
                rollback(txn, id).await;
                return Err(e.into());
            }
        }

        info!(id, "Applying migration");
        for stmt in (migration.apply)(backend) {
            if let Err(source) = txn.execute_raw(stmt).await {
                warn!(id, error = %source, "Migration statement failed, rolling back");
                rollback(txn, id).await;
                return Err(MigrationError::Apply {
                    id: id.to_string(),
                    source,
                });
            }
        }

        if let Err(source) = ledger.record(id).await {
            rollback(txn, id).await;
            return Err(match source.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    MigrationError::Conflict { id: id.to_string() }
                }
                _ => MigrationError::Apply {
                    id: id.to_string(),
                    source,
                },
            });
        }

        txn.commit().await.map_err(|source| MigrationError::Apply {
            id: id.to_string(),
            source,
        })?;
        info!(id, "Migration applied");
        Ok(true)
    }

    /// Revert the last applied migration (in id order) and delete its ledger
    /// row, atomically. Returns the reverted id, or `None` if nothing is applied.
    #[instrument(skip_all)]
    pub async fn revert_latest<C>(&self, db: &C) -> Result<Option<String>, MigrationError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        Ledger::new(db).ensure_table().await?;
        let entries = Ledger::new(db).entries().await?;
        let applied: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();

        let Some(migration) = self
            .migrations
            .iter()
            .rev()
            .find(|m| applied.contains(m.id))
        else {
            info!("No applied migration to revert");
            return Ok(None);
        };

        let id = migration.id;
        let revert = migration.revert.ok_or_else(|| MigrationError::Irreversible {
            id: id.to_string(),
        })?;

        info!(id, "Reverting migration");
        let txn = begin_write(db).await?;
        for stmt in revert(db.get_database_backend()) {
            if let Err(source) = txn.execute_raw(stmt).await {
                rollback(txn, id).await;
                return Err(MigrationError::Revert {
                    id: id.to_string(),
                    source,
                });
            }
        }

        if let Err(source) = Ledger::new(&txn).remove(id).await {
            rollback(txn, id).await;
            return Err(MigrationError::Revert {
                id: id.to_string(),
                source,
            });
        }

        txn.commit().await.map_err(|source| MigrationError::Revert {
            id: id.to_string(),
            source,
        })?;
        info!(id, "Migration reverted");
        Ok(Some(id.to_string()))
    }

    /// Every registered migration with its ledger state, followed by ledger
    /// rows that match no registered migration.
    pub async fn status<C>(&self, db: &C) -> Result<Vec<MigrationStatus>, MigrationError>
    where
        C: ConnectionTrait,
    {
        let ledger = Ledger::new(db);
        ledger.ensure_table().await?;
        let entries = ledger.entries().await?;

        let mut report: Vec<MigrationStatus> = self
            .migrations
            .iter()
            .map(|m| MigrationStatus {
                id: m.id.to_string(),
                applied_at: entries
                    .iter()
                    .find(|e| e.id == m.id)
                    .map(|e| e.executed_at),
                known: true,
            })
            .collect();

        report.extend(
            entries
                .into_iter()
                .filter(|e| !self.migrations.iter().any(|m| m.id == e.id))
                .map(|e| MigrationStatus {
                    id: e.id,
                    applied_at: Some(e.executed_at),
                    known: false,
                }),
        );

        Ok(report)
    }

    async fn warn_unknown_entries<C: ConnectionTrait>(&self, db: &C) -> Result<(), DbErr> {
        for entry in Ledger::new(db).entries().await? {
            if !self.migrations.iter().any(|m| m.id == entry.id) {
                warn!(id = %entry.id, "Ledger contains a migration this build does not know");
            }
        }
        Ok(())
    }
}

/// On SQLite, takes the write lock at `BEGIN` so a concurrent runner waits on
/// the busy timeout and then sees the committed ledger row.
async fn begin_write<C>(db: &C) -> Result<C::Transaction, DbErr>
where
    C: ConnectionTrait + TransactionTrait,
{
    let sqlite_transaction_mode = (db.get_database_backend() == DbBackend::Sqlite)
        .then_some(SqliteTransactionMode::Immediate);
    db.begin_with_options(TransactionOptions {
        sqlite_transaction_mode,
        ..Default::default()
    })
    .await
}

async fn rollback<T: TransactionSession>(txn: T, id: &str) {
    if let Err(e) = txn.rollback().await {
        warn!(id, error = %e, "Failed to roll back migration transaction");
    }
}
