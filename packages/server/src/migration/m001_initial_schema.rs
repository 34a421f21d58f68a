use common::AstrologicalSign;
use sea_orm::sea_query::{ColumnDef, Expr, ForeignKey, Index, IntoIden, OnConflict, Query, Table};
use sea_orm::{DbBackend, DeriveIden, Statement};

pub const ID: &str = "001_initial_schema";

pub fn apply(backend: DbBackend) -> Vec<Statement> {
    let signs = Table::create()
        .table(AstrologicalSigns::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(AstrologicalSigns::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(AstrologicalSigns::SignName)
                .string()
                .not_null()
                .unique_key(),
        )
        .to_owned();

    let mut seed_signs = Query::insert();
    seed_signs
        .into_table(AstrologicalSigns::Table)
        .columns([AstrologicalSigns::SignName]);
    for sign in AstrologicalSign::ALL {
        seed_signs.values_panic([sign.as_str().into()]);
    }
    seed_signs.on_conflict(
        OnConflict::column(AstrologicalSigns::SignName)
            .do_nothing()
            .to_owned(),
    );

    let users = Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Users::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
        .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
        .col(timestamp(Users::CreatedAt))
        .col(timestamp(Users::UpdatedAt))
        .to_owned();

    let poi = Table::create()
        .table(PersonOfInterest::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(PersonOfInterest::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(PersonOfInterest::UserId)
                .integer()
                .not_null()
                .default(1),
        )
        .col(ColumnDef::new(PersonOfInterest::Name).string().not_null())
        .col(ColumnDef::new(PersonOfInterest::State).string().not_null())
        .col(ColumnDef::new(PersonOfInterest::PicUrl).text().not_null())
        .col(ColumnDef::new(PersonOfInterest::SunSignId).integer().not_null())
        .col(
            ColumnDef::new(PersonOfInterest::PlutoSignId)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(PersonOfInterest::VipCount)
                .integer()
                .not_null()
                .default(0),
        )
        .col(timestamp(PersonOfInterest::CreatedAt))
        .col(timestamp(PersonOfInterest::UpdatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_poi_user")
                .from(PersonOfInterest::Table, PersonOfInterest::UserId)
                .to(Users::Table, Users::Id),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_poi_sun_sign")
                .from(PersonOfInterest::Table, PersonOfInterest::SunSignId)
                .to(AstrologicalSigns::Table, AstrologicalSigns::Id),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_poi_pluto_sign")
                .from(PersonOfInterest::Table, PersonOfInterest::PlutoSignId)
                .to(AstrologicalSigns::Table, AstrologicalSigns::Id),
        )
        .to_owned();

    let reviews = Table::create()
        .table(Reviews::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Reviews::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Reviews::PoiId).integer())
        .col(ColumnDef::new(Reviews::UserId).integer().not_null().default(1))
        .col(ColumnDef::new(Reviews::ReviewText).text())
        .col(timestamp(Reviews::CreatedAt))
        .col(timestamp(Reviews::UpdatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_reviews_poi")
                .from(Reviews::Table, Reviews::PoiId)
                .to(PersonOfInterest::Table, PersonOfInterest::Id),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_reviews_user")
                .from(Reviews::Table, Reviews::UserId)
                .to(Users::Table, Users::Id),
        )
        .to_owned();

    let opinions = Table::create()
        .table(Opinions::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Opinions::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Opinions::PoiId).integer().not_null())
        .col(ColumnDef::new(Opinions::UserId).integer().not_null().default(1))
        .col(ColumnDef::new(Opinions::OpinionData).text().not_null())
        .col(timestamp(Opinions::CreatedAt))
        .col(timestamp(Opinions::UpdatedAt))
        .foreign_key(
            ForeignKey::create()
                .name("fk_opinions_poi")
                .from(Opinions::Table, Opinions::PoiId)
                .to(PersonOfInterest::Table, PersonOfInterest::Id),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_opinions_user")
                .from(Opinions::Table, Opinions::UserId)
                .to(Users::Table, Users::Id),
        )
        .to_owned();

    let idx_poi_user = Index::create()
        .if_not_exists()
        .name("idx_poi_user")
        .table(PersonOfInterest::Table)
        .col(PersonOfInterest::UserId)
        .to_owned();

    let idx_reviews_poi = Index::create()
        .if_not_exists()
        .name("idx_reviews_poi")
        .table(Reviews::Table)
        .col(Reviews::PoiId)
        .to_owned();

    // At most one opinion per (poi, author).
    let idx_opinions_poi_user = Index::create()
        .if_not_exists()
        .name("idx_opinions_poi_user")
        .table(Opinions::Table)
        .col(Opinions::PoiId)
        .col(Opinions::UserId)
        .unique()
        .to_owned();

    vec![
        backend.build(&signs),
        backend.build(&seed_signs),
        backend.build(&users),
        backend.build(&poi),
        backend.build(&reviews),
        backend.build(&opinions),
        backend.build(&idx_poi_user),
        backend.build(&idx_reviews_poi),
        backend.build(&idx_opinions_poi_user),
    ]
}

pub fn revert(backend: DbBackend) -> Vec<Statement> {
    vec![
        backend.build(&Table::drop().table(Opinions::Table).if_exists().to_owned()),
        backend.build(&Table::drop().table(Reviews::Table).if_exists().to_owned()),
        backend.build(
            &Table::drop()
                .table(PersonOfInterest::Table)
                .if_exists()
                .to_owned(),
        ),
        backend.build(&Table::drop().table(Users::Table).if_exists().to_owned()),
        backend.build(
            &Table::drop()
                .table(AstrologicalSigns::Table)
                .if_exists()
                .to_owned(),
        ),
    ]
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveIden)]
enum AstrologicalSigns {
    Table,
    Id,
    SignName,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PersonOfInterest {
    Table,
    Id,
    UserId,
    Name,
    State,
    PicUrl,
    SunSignId,
    PlutoSignId,
    VipCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    PoiId,
    UserId,
    ReviewText,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Opinions {
    Table,
    Id,
    PoiId,
    UserId,
    OpinionData,
    CreatedAt,
    UpdatedAt,
}
