use chrono::{DateTime, Utc};
use common::OpinionDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::StoredOpinion;

#[derive(Deserialize)]
pub struct CreateOpinionRequest {
    pub poi_id: i32,
    /// Checked against the opinion schema by the store, not by serde.
    pub opinion_data: Value,
}

#[derive(Deserialize)]
pub struct OpinionListQuery {
    pub poi_id: Option<i32>,
}

#[derive(Serialize)]
pub struct OpinionResponse {
    pub id: i32,
    pub poi_id: i32,
    pub user_id: i32,
    /// `None` when the stored document could not be decoded.
    pub opinion_data: Option<OpinionDocument>,
    /// Why `opinion_data` is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StoredOpinion> for OpinionResponse {
    fn from(stored: StoredOpinion) -> Self {
        let (opinion_data, error) = match stored.document {
            Ok(document) => (Some(document), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            id: stored.id,
            poi_id: stored.poi_id,
            user_id: stored.user_id,
            opinion_data,
            error,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct DeleteOpinionResponse {
    pub id: i32,
    /// False if no opinion had this id.
    pub deleted: bool,
}
