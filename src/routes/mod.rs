use std::path::Path;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, Uri},
    routing::get,
};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
    storage::UPLOADS_ROUTE,
};

pub mod auth;
pub mod cart;
pub mod doc;
mod form;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod params;
pub mod products;
pub mod users;

// Multipart form fields ride alongside the image itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/notifications", notifications::router())
        .nest("/users", users::router())
}

/// Full application router: API, docs, uploaded files and the 404 fallback.
pub fn create_app(state: AppState, upload_dir: &Path, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .nest_service(UPLOADS_ROUTE, ServeDir::new(upload_dir))
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes + FORM_OVERHEAD_BYTES))
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
