use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::entity::user::SYSTEM_USER_ID;
use crate::error::AppError;
use crate::extractors::json::AppJson;
use crate::extractors::path::AppPath;
use crate::models::opinion::OpinionResponse;
use crate::models::poi::*;
use crate::state::AppState;
use crate::store::{OpinionStore, PoiLifecycle};

#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_poi(
    State(state): State<AppState>,
    AppJson(payload): AppJson<NewPoi>,
) -> Result<impl IntoResponse, AppError> {
    let poi = PoiLifecycle::new(&state.db)
        .with_image_probe(state.image_probe.as_ref())
        .create(SYSTEM_USER_ID, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(poi)))
}

#[instrument(skip(state))]
pub async fn list_pois(State(state): State<AppState>) -> Result<Json<Vec<PoiView>>, AppError> {
    let pois = PoiLifecycle::new(&state.db).list().await?;
    Ok(Json(pois))
}

#[instrument(skip(state), fields(id))]
pub async fn get_poi(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<PoiView>, AppError> {
    let poi = PoiLifecycle::new(&state.db).get(id).await?;
    Ok(Json(poi))
}

/// Serves both `PUT` and `PATCH`; only supplied fields are written.
#[instrument(skip(state, payload), fields(id))]
pub async fn update_poi(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<PoiPatch>,
) -> Result<Json<PoiView>, AppError> {
    let poi = PoiLifecycle::new(&state.db)
        .with_image_probe(state.image_probe.as_ref())
        .update(id, payload)
        .await?;
    Ok(Json(poi))
}

#[instrument(skip(state, payload), fields(id, vip_count = payload.vip_count))]
pub async fn set_vip_count(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<VipCountRequest>,
) -> Result<Json<PoiView>, AppError> {
    let poi = PoiLifecycle::new(&state.db)
        .set_vip_count(id, payload.vip_count)
        .await?;
    Ok(Json(poi))
}

#[instrument(skip(state), fields(id))]
pub async fn delete_poi(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<PoiDeletion>, AppError> {
    let deletion = PoiLifecycle::new(&state.db).delete(id).await?;
    Ok(Json(deletion))
}

#[instrument(skip(state), fields(id))]
pub async fn list_poi_opinions(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<Vec<OpinionResponse>>, AppError> {
    PoiLifecycle::new(&state.db).get(id).await?;

    let opinions = OpinionStore::new(&state.db).list_for_poi(id).await?;
    Ok(Json(opinions.into_iter().map(Into::into).collect()))
}
