use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::entity::user::SYSTEM_USER_ID;
use crate::error::AppError;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::extractors::query::AppQuery;
use crate::models::opinion::*;
use crate::state::AppState;
use crate::store::OpinionStore;

#[instrument(skip(state, payload), fields(poi_id = payload.poi_id))]
pub async fn create_opinion(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateOpinionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let opinion = OpinionStore::new(&state.db)
        .create(payload.poi_id, SYSTEM_USER_ID, payload.opinion_data)
        .await?;

    Ok((StatusCode::CREATED, Json(OpinionResponse::from(opinion))))
}

/// All opinions, or those of a single POI with `?poi_id=`.
#[instrument(skip(state, query))]
pub async fn list_opinions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<OpinionListQuery>,
) -> Result<Json<Vec<OpinionResponse>>, AppError> {
    let store = OpinionStore::new(&state.db);
    let opinions = match query.poi_id {
        Some(poi_id) => store.list_for_poi(poi_id).await?,
        None => store.list().await?,
    };
    Ok(Json(opinions.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state), fields(id))]
pub async fn delete_opinion(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<DeleteOpinionResponse>, AppError> {
    let deleted = OpinionStore::new(&state.db).delete(id).await?;
    Ok(Json(DeleteOpinionResponse { id, deleted }))
}
