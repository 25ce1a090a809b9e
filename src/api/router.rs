//! Router construction for the SIRET server.

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::siret_routes::{self, AppState};

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(siret_routes::health))
        .route("/siret", post(siret_routes::add_siret))
        .route(
            "/siret/:siret",
            get(siret_routes::get_siret)
                .delete(siret_routes::delete_siret)
                .put(siret_routes::update_siret),
        )
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
