use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};

use utoipa::OpenApi as OpenApiT;

use crate::{AppState, handlers, middleware::require_admin};

pub fn api_router<T: OpenApiT>(state: AppState) -> Router<AppState> {
    let open_api = T::openapi();

    // Admin endpoints share the Basic auth guard
    let admin_router = Router::new()
        .route("/estado", get(handlers::get_admin_status))
        .route("/cache", delete(handlers::clear_cache))
        .route_layer(axum::middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/ipc/ultimos", get(handlers::get_latest_ipc))
        .route("/alquiler/tabla", get(handlers::get_rent_table))
        .nest("/admin", admin_router)
        .route("/docs/openapi.json", get(move || async move { Json(open_api) }))
        .fallback(handler_404)
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
