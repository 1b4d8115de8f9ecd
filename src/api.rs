//! Application router for memopad
//!
//! Merges the memo routes with the health probe and wraps everything in
//! CORS and request tracing.
//!
//! | Path                   | Description                         |
//! |------------------------|-------------------------------------|
//! | `/health`              | Liveness probe                      |
//! | `/memos`               | List and create                     |
//! | `/memos/seed`          | Insert sample memos into empty store |
//! | `/memos/:id`           | Detail, partial update, delete      |
//! | `/memos/:id/summary`   | Cached summary, generate summary    |
//! | `/memos/:id/tags`      | Generate keyword tags               |

use crate::memos::{memos_router, MemosState};
use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete HTTP application, ready for `axum::serve`
pub fn build_app(memos_state: MemosState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(memos_router(memos_state))
        .layer(build_cors(cors_origins))
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}
