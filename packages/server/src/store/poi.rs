use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{AstrologicalSign, ValidationErrors, Violation};
use reqwest::Url;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr, TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::StoreError;
use crate::entity::{astrological_sign, opinion, person_of_interest, review};
use crate::utils::image_probe::ImageProbe;

/// Input for creating a POI. Missing fields deserialize as empty strings and
/// are reported by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPoi {
    pub name: String,
    pub state: String,
    pub pic_url: String,
    pub sun_sign: String,
    pub pluto_sign: String,
}

/// Partial update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PoiPatch {
    pub name: Option<String>,
    pub state: Option<String>,
    pub pic_url: Option<String>,
    pub sun_sign: Option<String>,
    pub pluto_sign: Option<String>,
}

/// A POI with its sign references resolved to names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiView {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub state: String,
    pub pic_url: String,
    pub sun_sign: Option<String>,
    pub pluto_sign: Option<String>,
    pub vip_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PoiView {
    fn new(model: person_of_interest::Model, sign_names: &HashMap<i32, String>) -> Self {
        Self {
            sun_sign: sign_names.get(&model.sun_sign_id).cloned(),
            pluto_sign: sign_names.get(&model.pluto_sign_id).cloned(),
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            state: model.state,
            pic_url: model.pic_url,
            vip_count: model.vip_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// What a cascading POI delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoiDeletion {
    pub poi_id: i32,
    pub opinions_deleted: u64,
    pub reviews_deleted: u64,
}

/// Validated field set. Every field of [`NewPoi`] resolved.
struct PoiFields {
    name: String,
    state: String,
    pic_url: String,
    sun_sign: AstrologicalSign,
    pluto_sign: AstrologicalSign,
}

struct PoiChanges {
    name: Option<String>,
    state: Option<String>,
    pic_url: Option<String>,
    sun_sign: Option<AstrologicalSign>,
    pluto_sign: Option<AstrologicalSign>,
}

impl NewPoi {
    fn validate(&self) -> Result<PoiFields, ValidationErrors> {
        match (
            text_field("name", &self.name),
            text_field("state", &self.state),
            url_field("pic_url", &self.pic_url),
            sign_field("sun_sign", &self.sun_sign),
            sign_field("pluto_sign", &self.pluto_sign),
        ) {
            (Ok(name), Ok(state), Ok(pic_url), Ok(sun_sign), Ok(pluto_sign)) => Ok(PoiFields {
                name,
                state,
                pic_url,
                sun_sign,
                pluto_sign,
            }),
            (name, state, pic_url, sun_sign, pluto_sign) => Err([
                name.err(),
                state.err(),
                pic_url.err(),
                sun_sign.err(),
                pluto_sign.err(),
            ]
            .into_iter()
            .flatten()
            .collect()),
        }
    }
}

impl PoiPatch {
    fn validate(&self) -> Result<PoiChanges, ValidationErrors> {
        match (
            self.name.as_deref().map(|v| text_field("name", v)).transpose(),
            self.state.as_deref().map(|v| text_field("state", v)).transpose(),
            self.pic_url.as_deref().map(|v| url_field("pic_url", v)).transpose(),
            self.sun_sign.as_deref().map(|v| sign_field("sun_sign", v)).transpose(),
            self.pluto_sign.as_deref().map(|v| sign_field("pluto_sign", v)).transpose(),
        ) {
            (Ok(name), Ok(state), Ok(pic_url), Ok(sun_sign), Ok(pluto_sign)) => Ok(PoiChanges {
                name,
                state,
                pic_url,
                sun_sign,
                pluto_sign,
            }),
            (name, state, pic_url, sun_sign, pluto_sign) => Err([
                name.err(),
                state.err(),
                pic_url.err(),
                sun_sign.err(),
                pluto_sign.err(),
            ]
            .into_iter()
            .flatten()
            .collect()),
        }
    }
}

fn text_field(field: &str, value: &str) -> Result<String, Violation> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Violation::new(field, "is required"));
    }
    Ok(value.to_string())
}

fn url_field(field: &str, value: &str) -> Result<String, Violation> {
    let value = text_field(field, value)?;
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(value),
        _ => Err(Violation::new(field, "must be an absolute http or https URL")),
    }
}

fn sign_field(field: &str, value: &str) -> Result<AstrologicalSign, Violation> {
    let value = text_field(field, value)?;
    value
        .parse()
        .map_err(|_| Violation::new(field, format!("is not one of the twelve signs: {value}")))
}

/// Owns every write to `person_of_interest`, including the only sanctioned
/// way to delete one.
pub struct PoiLifecycle<'a, C: ConnectionTrait + TransactionTrait> {
    conn: &'a C,
    image_probe: Option<&'a dyn ImageProbe>,
}

impl<'a, C: ConnectionTrait + TransactionTrait> PoiLifecycle<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self {
            conn,
            image_probe: None,
        }
    }

    /// Require new or changed picture URLs to pass `probe`.
    pub fn with_image_probe(mut self, probe: &'a dyn ImageProbe) -> Self {
        self.image_probe = Some(probe);
        self
    }

    pub async fn create(&self, owner_id: i32, new: NewPoi) -> Result<PoiView, StoreError> {
        let fields = new.validate()?;
        self.probe_pic_url(&fields.pic_url).await?;

        let sun_sign_id = sign_id(self.conn, fields.sun_sign).await?;
        let pluto_sign_id = sign_id(self.conn, fields.pluto_sign).await?;

        let now = Utc::now();
        let model = person_of_interest::ActiveModel {
            user_id: Set(owner_id),
            name: Set(fields.name),
            state: Set(fields.state),
            pic_url: Set(fields.pic_url),
            sun_sign_id: Set(sun_sign_id),
            pluto_sign_id: Set(pluto_sign_id),
            vip_count: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = model.insert(self.conn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                StoreError::NotFound(format!("User {owner_id} not found"))
            }
            _ => StoreError::Storage(e),
        })?;

        info!(poi_id = model.id, owner_id, "Created POI");
        self.view(model).await
    }

    /// Apply only the fields present in `patch`. `updated_at` moves only when
    /// a stored value actually changes.
    pub async fn update(&self, id: i32, patch: PoiPatch) -> Result<PoiView, StoreError> {
        let changes = patch.validate()?;
        if let Some(pic_url) = &changes.pic_url {
            self.probe_pic_url(pic_url).await?;
        }
        self.apply_changes(id, changes).await
    }

    pub async fn set_vip_count(&self, id: i32, count: i64) -> Result<PoiView, StoreError> {
        let count = match i32::try_from(count) {
            Ok(count) if count >= 0 => count,
            _ => {
                return Err(ValidationErrors::single(
                    "vip_count",
                    format!("must be an integer between 0 and {}", i32::MAX),
                )
                .into());
            }
        };

        let existing = find_poi(self.conn, id).await?;
        if existing.vip_count == count {
            return self.view(existing).await;
        }

        let mut active: person_of_interest::ActiveModel = existing.into();
        active.vip_count = Set(count);
        active.updated_at = Set(Utc::now());
        let model = active.update(self.conn).await?;

        info!(poi_id = id, vip_count = count, "Updated VIP count");
        self.view(model).await
    }

    pub async fn get(&self, id: i32) -> Result<PoiView, StoreError> {
        let model = find_poi(self.conn, id).await?;
        self.view(model).await
    }

    /// Every POI, oldest first.
    pub async fn list(&self) -> Result<Vec<PoiView>, StoreError> {
        let names = sign_names(self.conn).await?;
        let rows = person_of_interest::Entity::find()
            .order_by_asc(person_of_interest::Column::Id)
            .all(self.conn)
            .await?;
        Ok(rows.into_iter().map(|m| PoiView::new(m, &names)).collect())
    }

    /// Delete a POI together with its reviews and opinions in one transaction.
    /// Any failure rolls the whole transaction back.
    pub async fn delete(&self, id: i32) -> Result<PoiDeletion, StoreError> {
        let txn = self.conn.begin().await?;

        match cascade_delete(&txn, id).await {
            Ok(deletion) => {
                txn.commit().await?;
                info!(
                    poi_id = id,
                    opinions_deleted = deletion.opinions_deleted,
                    reviews_deleted = deletion.reviews_deleted,
                    "Deleted POI"
                );
                Ok(deletion)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(poi_id = id, error = %rollback_err, "Failed to roll back POI delete");
                }
                Err(e)
            }
        }
    }

    async fn apply_changes(&self, id: i32, changes: PoiChanges) -> Result<PoiView, StoreError> {
        let existing = find_poi(self.conn, id).await?;
        let mut active: person_of_interest::ActiveModel = existing.clone().into();

        if let Some(name) = changes.name {
            active.name.set_if_not_equals(name);
        }
        if let Some(state) = changes.state {
            active.state.set_if_not_equals(state);
        }
        if let Some(pic_url) = changes.pic_url {
            active.pic_url.set_if_not_equals(pic_url);
        }
        if let Some(sign) = changes.sun_sign {
            active
                .sun_sign_id
                .set_if_not_equals(sign_id(self.conn, sign).await?);
        }
        if let Some(sign) = changes.pluto_sign {
            active
                .pluto_sign_id
                .set_if_not_equals(sign_id(self.conn, sign).await?);
        }

        if !active.is_changed() {
            return self.view(existing).await;
        }

        active.updated_at = Set(Utc::now());
        let model = active.update(self.conn).await?;

        info!(poi_id = id, "Updated POI");
        self.view(model).await
    }

    async fn probe_pic_url(&self, pic_url: &str) -> Result<(), ValidationErrors> {
        if let Some(probe) = self.image_probe
            && !probe.is_live(pic_url).await
        {
            return Err(ValidationErrors::single(
                "pic_url",
                "does not point at a reachable image",
            ));
        }
        Ok(())
    }

    async fn view(&self, model: person_of_interest::Model) -> Result<PoiView, StoreError> {
        let names = sign_names(self.conn).await?;
        Ok(PoiView::new(model, &names))
    }
}

async fn cascade_delete<T: ConnectionTrait>(
    txn: &T,
    id: i32,
) -> Result<PoiDeletion, StoreError> {
    find_poi(txn, id).await?;

    let reviews = review::Entity::delete_many()
        .filter(review::Column::PoiId.eq(id))
        .exec(txn)
        .await?;
    let opinions = opinion::Entity::delete_many()
        .filter(opinion::Column::PoiId.eq(id))
        .exec(txn)
        .await?;
    person_of_interest::Entity::delete_by_id(id).exec(txn).await?;

    Ok(PoiDeletion {
        poi_id: id,
        opinions_deleted: opinions.rows_affected,
        reviews_deleted: reviews.rows_affected,
    })
}

async fn find_poi<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<person_of_interest::Model, StoreError> {
    person_of_interest::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("POI {id} not found")))
}

async fn sign_id<C: ConnectionTrait>(conn: &C, sign: AstrologicalSign) -> Result<i32, StoreError> {
    astrological_sign::Entity::find()
        .filter(astrological_sign::Column::SignName.eq(sign.as_str()))
        .one(conn)
        .await?
        .map(|row| row.id)
        .ok_or_else(|| {
            StoreError::Storage(DbErr::RecordNotFound(format!(
                "astrological sign {sign} is not seeded"
            )))
        })
}

async fn sign_names<C: ConnectionTrait>(conn: &C) -> Result<HashMap<i32, String>, DbErr> {
    let rows = astrological_sign::Entity::find().all(conn).await?;
    Ok(rows.into_iter().map(|row| (row.id, row.sign_name)).collect())
}
