use chrono::{DateTime, Utc};
use common::{DocumentError, OpinionDocument, ValidationErrors};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use serde_json::Value;
use tracing::{info, warn};

use super::StoreError;
use crate::entity::{opinion, person_of_interest};

/// One opinion row as read back from the store.
///
/// `document` holds the decode result for this row only. A corrupted row does
/// not prevent its neighbours from being listed.
#[derive(Debug)]
pub struct StoredOpinion {
    pub id: i32,
    pub poi_id: i32,
    pub user_id: i32,
    pub document: Result<OpinionDocument, DocumentError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<opinion::Model> for StoredOpinion {
    fn from(model: opinion::Model) -> Self {
        let document = OpinionDocument::from_json_str(&model.opinion_data);
        if let Err(e) = &document {
            warn!(opinion_id = model.id, error = %e, "Stored opinion could not be decoded");
        }
        Self {
            id: model.id,
            poi_id: model.poi_id,
            user_id: model.user_id,
            document,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct OpinionStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> OpinionStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Validate `document` and insert it as `author_id`'s opinion of `poi_id`.
    ///
    /// Every violation in the document is reported together with a bad
    /// `poi_id`. A second opinion by the same author on the same POI is a
    /// [`StoreError::Conflict`].
    pub async fn create(
        &self,
        poi_id: i32,
        author_id: i32,
        document: Value,
    ) -> Result<StoredOpinion, StoreError> {
        let parsed = OpinionDocument::from_value(document);
        let document = if poi_id < 1 {
            let mut errors = ValidationErrors::single("poi_id", "must be a positive integer");
            if let Err(doc_errors) = parsed {
                errors.extend(doc_errors);
            }
            return Err(errors.into());
        } else {
            parsed?
        };

        person_of_interest::Entity::find_by_id(poi_id)
            .one(self.conn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("POI {poi_id} not found")))?;

        let opinion_data = document
            .to_json_string()
            .map_err(|e| DbErr::Custom(format!("failed to serialize opinion: {e}")))?;

        let now = Utc::now();
        let model = opinion::ActiveModel {
            poi_id: Set(poi_id),
            user_id: Set(author_id),
            opinion_data: Set(opinion_data),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = model.insert(self.conn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict(format!(
                "User {author_id} already has an opinion on POI {poi_id}"
            )),
            // The POI may have been deleted since the check above.
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => StoreError::NotFound(format!(
                "POI {poi_id} or user {author_id} not found"
            )),
            _ => StoreError::Storage(e),
        })?;

        info!(opinion_id = model.id, poi_id, author_id, "Created opinion");
        Ok(StoredOpinion {
            id: model.id,
            poi_id: model.poi_id,
            user_id: model.user_id,
            document: Ok(document),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    pub async fn find(&self, id: i32) -> Result<Option<StoredOpinion>, StoreError> {
        let model = opinion::Entity::find_by_id(id).one(self.conn).await?;
        Ok(model.map(StoredOpinion::from))
    }

    /// Every opinion, oldest first.
    pub async fn list(&self) -> Result<Vec<StoredOpinion>, StoreError> {
        let rows = opinion::Entity::find()
            .order_by_asc(opinion::Column::Id)
            .all(self.conn)
            .await?;
        Ok(rows.into_iter().map(StoredOpinion::from).collect())
    }

    pub async fn list_for_poi(&self, poi_id: i32) -> Result<Vec<StoredOpinion>, StoreError> {
        let rows = opinion::Entity::find()
            .filter(opinion::Column::PoiId.eq(poi_id))
            .order_by_asc(opinion::Column::Id)
            .all(self.conn)
            .await?;
        Ok(rows.into_iter().map(StoredOpinion::from).collect())
    }

    /// Remove an opinion by id. Returns false if there was nothing to remove.
    pub async fn delete(&self, id: i32) -> Result<bool, StoreError> {
        let result = opinion::Entity::delete_by_id(id).exec(self.conn).await?;
        let deleted = result.rows_affected > 0;
        if deleted {
            info!(opinion_id = id, "Deleted opinion");
        }
        Ok(deleted)
    }
}
