use axum::{
    Router,
    routing::{delete, get, patch},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/pois", poi_routes())
        .nest("/opinions", opinion_routes())
}

fn poi_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::poi::list_pois).post(handlers::poi::create_poi),
        )
        .route(
            "/{id}",
            get(handlers::poi::get_poi)
                .put(handlers::poi::update_poi)
                .patch(handlers::poi::update_poi)
                .delete(handlers::poi::delete_poi),
        )
        .route("/{id}/vip-count", patch(handlers::poi::set_vip_count))
        .route("/{id}/opinions", get(handlers::poi::list_poi_opinions))
}

fn opinion_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::opinion::list_opinions).post(handlers::opinion::create_opinion),
        )
        .route("/{id}", delete(handlers::opinion::delete_opinion))
}
