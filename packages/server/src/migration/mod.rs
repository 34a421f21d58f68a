//! Schema migrations.
//!
//! Migrations are registered at compile time in [`MIGRATIONS`]. Each one is a
//! pair of functions that render its `apply` (and optionally `revert`) steps as
//! store statements for the connected backend. The [`Migrator`] diffs the
//! registry against the `migrations` ledger table and applies whatever is
//! missing, one transaction per migration.

mod ledger;
mod m001_initial_schema;
mod m002_seed_system_user;
mod runner;

use sea_orm::{DbBackend, DbErr, Statement};

pub use ledger::Ledger;
pub use runner::{MigrationStatus, Migrator};

/// Renders the statements of one migration step for a backend.
pub type StepFn = fn(DbBackend) -> Vec<Statement>;

/// A named, ordered schema or data transformation.
///
/// Ids are compared lexically, so they must sort in intended execution order
/// (`001_...`, `002_...`). Once released, a migration must not change.
#[derive(Clone, Copy)]
pub struct Migration {
    pub id: &'static str,
    pub apply: StepFn,
    pub revert: Option<StepFn>,
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("id", &self.id)
            .field("reversible", &self.revert.is_some())
            .finish()
    }
}

/// Every migration shipped with the service.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        id: m001_initial_schema::ID,
        apply: m001_initial_schema::apply,
        revert: Some(m001_initial_schema::revert),
    },
    Migration {
        id: m002_seed_system_user::ID,
        apply: m002_seed_system_user::apply,
        revert: Some(m002_seed_system_user::revert),
    },
];

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("migration id `{0}` is registered more than once")]
    DuplicateId(String),

    #[error("migration `{id}` failed: {source}")]
    Apply {
        id: String,
        #[source]
        source: DbErr,
    },

    #[error("migration `{id}` was recorded by another process while this one was applying it")]
    Conflict { id: String },

    #[error("migration `{id}` failed to revert: {source}")]
    Revert {
        id: String,
        #[source]
        source: DbErr,
    },

    #[error("migration `{id}` has no revert step")]
    Irreversible { id: String },

    #[error("migration ledger error: {0}")]
    Ledger(#[from] DbErr),
}
