use sea_orm::sea_query::{Expr, ExprTrait, OnConflict, Query};
use sea_orm::{DbBackend, DeriveIden, Statement};

use crate::entity::user::SYSTEM_USER_ID;

pub const ID: &str = "002_seed_system_user";

/// Every POI and opinion defaults to user 1; the row must exist for the
/// foreign keys to hold.
pub fn apply(backend: DbBackend) -> Vec<Statement> {
    let insert = Query::insert()
        .into_table(Users::Table)
        .columns([Users::Id, Users::Username, Users::Email, Users::PasswordHash])
        .values_panic([
            SYSTEM_USER_ID.into(),
            "system".into(),
            "system@streetreview.local".into(),
            // Not a valid hash; the account cannot log in.
            "!".into(),
        ])
        .on_conflict(OnConflict::column(Users::Id).do_nothing().to_owned())
        .to_owned();

    let mut statements = vec![backend.build(&insert)];

    if backend == DbBackend::Postgres {
        // An explicit id does not advance the serial sequence.
        statements.push(Statement::from_string(
            backend,
            "SELECT setval(pg_get_serial_sequence('users', 'id'), (SELECT MAX(id) FROM users))",
        ));
    }

    statements
}

pub fn revert(backend: DbBackend) -> Vec<Statement> {
    let delete = Query::delete()
        .from_table(Users::Table)
        .and_where(Expr::col(Users::Id).eq(SYSTEM_USER_ID))
        .to_owned();

    vec![backend.build(&delete)]
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
}
