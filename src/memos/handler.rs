//! HTTP handlers for the Memos API
//!
//! Provides 9 REST endpoints:
//! - GET    /memos               - list memos (category + search filter)
//! - POST   /memos               - create memo
//! - POST   /memos/seed          - insert sample memos if the store is empty
//! - GET    /memos/:id           - memo detail
//! - PATCH  /memos/:id           - partial update
//! - DELETE /memos/:id           - delete memo
//! - GET    /memos/:id/summary   - cached summary (null when absent)
//! - POST   /memos/:id/summary   - generate and cache summary
//! - POST   /memos/:id/tags      - generate and replace tags

use crate::error::Error;
use crate::memos::service::MemoService;
use crate::memos::types::*;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Shared state for memo handlers
#[derive(Clone)]
pub struct MemosState {
    pub service: Arc<MemoService>,
}

/// Create the memos router with all REST endpoints
pub fn memos_router(state: MemosState) -> Router {
    Router::new()
        .route("/memos", get(list_memos).post(create_memo))
        .route("/memos/seed", post(seed_memos))
        .route(
            "/memos/:id",
            get(get_memo).patch(update_memo).delete(delete_memo),
        )
        .route("/memos/:id/summary", get(get_summary).post(create_summary))
        .route("/memos/:id/tags", post(generate_tags))
        .with_state(state)
}

// =============================================================================
// Error mapping
// =============================================================================

/// Map a service error onto a status code and error body.
///
/// Validation → 400, NotFound → 404, everything else → 500. `context` is the
/// message shown for internal failures.
fn failure(err: Error, context: &str) -> Response {
    let (status, message) = match &err {
        Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "Memo not found".to_string()),
        Error::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "API key is not configured".to_string(),
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, context.to_string()),
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "{}", context);
    }
    (status, Json(ApiError::new(err.code(), message))).into_response()
}

fn rejected(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::bad_request(rejection.body_text())),
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /memos
async fn list_memos(
    State(state): State<MemosState>,
    Query(params): Query<ListMemosQuery>,
) -> Response {
    match state.service.list(&params.into()).await {
        Ok(memos) => Json(memos).into_response(),
        Err(err) => failure(err, "Failed to fetch memos"),
    }
}

/// POST /memos
async fn create_memo(
    State(state): State<MemosState>,
    body: Result<Json<CreateMemoRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    match state.service.create(request).await {
        Ok(memo) => (StatusCode::CREATED, Json(memo)).into_response(),
        Err(err) => failure(err, "Failed to create memo"),
    }
}

/// GET /memos/:id
async fn get_memo(State(state): State<MemosState>, Path(id): Path<String>) -> Response {
    match state.service.get(&id).await {
        Ok(memo) => Json(memo).into_response(),
        Err(err) => failure(err, "Failed to fetch memo"),
    }
}

/// PATCH /memos/:id
async fn update_memo(
    State(state): State<MemosState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateMemoRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return rejected(rejection),
    };
    match state.service.update(&id, request).await {
        Ok(memo) => Json(memo).into_response(),
        Err(err) => failure(err, "Failed to update memo"),
    }
}

/// DELETE /memos/:id
async fn delete_memo(State(state): State<MemosState>, Path(id): Path<String>) -> Response {
    match state.service.delete(&id).await {
        Ok(()) => Json(DeleteResponse { success: true }).into_response(),
        Err(err) => failure(err, "Failed to delete memo"),
    }
}

/// GET /memos/:id/summary
async fn get_summary(State(state): State<MemosState>, Path(id): Path<String>) -> Response {
    match state.service.get_summary(&id).await {
        Ok(summary) => Json(SummaryResponse { summary }).into_response(),
        Err(err) => failure(err, "Failed to fetch summary"),
    }
}

/// POST /memos/:id/summary
async fn create_summary(State(state): State<MemosState>, Path(id): Path<String>) -> Response {
    match state.service.summarize(&id).await {
        Ok(summary) => Json(SummaryResponse {
            summary: Some(summary),
        })
        .into_response(),
        Err(err) => failure(err, "Failed to generate summary. Please try again later."),
    }
}

/// POST /memos/:id/tags
async fn generate_tags(State(state): State<MemosState>, Path(id): Path<String>) -> Response {
    match state.service.generate_tags(&id).await {
        Ok(memo) => Json(memo).into_response(),
        Err(err) => failure(err, "Failed to generate tags. Please try again later."),
    }
}

/// POST /memos/seed
async fn seed_memos(State(state): State<MemosState>) -> Response {
    match state.service.seed().await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => failure(err, "Failed to seed data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::ScriptedGenerator;
    use crate::generation::TextGenerator;
    use crate::memos::store::SqliteMemoStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn make_app_with(generator: Arc<dyn TextGenerator>) -> Router {
        let store = Arc::new(SqliteMemoStore::in_memory().unwrap());
        let service = Arc::new(MemoService::new(store, generator));
        memos_router(MemosState { service })
    }

    fn make_app() -> Router {
        make_app_with(Arc::new(ScriptedGenerator::replying("Generated summary.")))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn create(app: &Router, body: serde_json::Value) -> serde_json::Value {
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/memos", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await
    }

    #[tokio::test]
    async fn test_list_memos_empty() {
        let app = make_app();
        let resp = app.oneshot(empty_request("GET", "/memos")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_create_and_get_memo() {
        let app = make_app();
        let created = create(
            &app,
            serde_json::json!({
                "title": "Release checklist",
                "content": "Tag the build and update the changelog",
                "category": "work",
                "tags": ["Release"]
            }),
        )
        .await;

        let id = created["id"].as_str().unwrap();
        assert_eq!(created["category"], "work");
        assert_eq!(created["tags"], serde_json::json!(["release"]));
        assert!(created["createdAt"].is_string());

        let resp = app
            .oneshot(empty_request("GET", &format!("/memos/{}", id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let fetched = body_json(resp).await;
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_missing_fields_is_bad_request() {
        let app = make_app();
        for body in [
            serde_json::json!({"title": "No content"}),
            serde_json::json!({"content": "No title"}),
            serde_json::json!({"title": "", "content": ""}),
        ] {
            let resp = app
                .clone()
                .oneshot(json_request("POST", "/memos", body))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let json = body_json(resp).await;
            assert_eq!(json["error"]["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_create_malformed_body_is_bad_request() {
        let app = make_app();
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/memos")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_memo_not_found() {
        let app = make_app();
        let resp = app
            .oneshot(empty_request("GET", "/memos/nonexistent"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_list_with_category_and_search() {
        let app = make_app();
        create(
            &app,
            serde_json::json!({"title": "Budget review", "content": "Q3 numbers", "category": "work"}),
        )
        .await;
        create(
            &app,
            serde_json::json!({"title": "Birthday", "content": "Buy a budget-friendly gift", "category": "personal"}),
        )
        .await;
        create(
            &app,
            serde_json::json!({"title": "Tagged only", "content": "Nothing here", "category": "work", "tags": ["budget"]}),
        )
        .await;

        let resp = app
            .clone()
            .oneshot(empty_request("GET", "/memos?category=work&search=BUDGET"))
            .await
            .unwrap();
        let json = body_json(resp).await;
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Budget review");

        let resp = app
            .oneshot(empty_request("GET", "/memos?category=all&search=budget"))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_patch_memo_partial() {
        let app = make_app();
        let created = create(
            &app,
            serde_json::json!({"title": "Draft", "content": "First version", "category": "idea"}),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let resp = app
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/memos/{}", id),
                serde_json::json!({"title": "Final"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = body_json(resp).await;
        assert_eq!(updated["title"], "Final");
        assert_eq!(updated["content"], "First version");
        assert_eq!(updated["category"], "idea");
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert_ne!(updated["updatedAt"], created["updatedAt"]);
    }

    #[tokio::test]
    async fn test_patch_missing_memo_is_not_found() {
        let app = make_app();
        let resp = app
            .oneshot(json_request(
                "PATCH",
                "/memos/missing",
                serde_json::json!({"title": "x"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_nonexistent_returns_success() {
        let app = make_app();
        let resp = app
            .oneshot(empty_request("DELETE", "/memos/never-existed"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_summary_lifecycle() {
        let app = make_app();
        let created = create(
            &app,
            serde_json::json!({"title": "Lecture", "content": "Notes on distributed consensus and Raft"}),
        )
        .await;
        let uri = format!("/memos/{}/summary", created["id"].as_str().unwrap());

        let resp = app.clone().oneshot(empty_request("GET", &uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({"summary": null}));

        let resp = app.clone().oneshot(empty_request("POST", &uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["summary"], "Generated summary.");

        let resp = app.oneshot(empty_request("GET", &uri)).await.unwrap();
        assert_eq!(body_json(resp).await["summary"], "Generated summary.");
    }

    #[tokio::test]
    async fn test_summary_too_short_is_bad_request() {
        let app = make_app();
        let created = create(&app, serde_json::json!({"title": "Tiny", "content": "short"})).await;
        let uri = format!("/memos/{}/summary", created["id"].as_str().unwrap());

        let resp = app.oneshot(empty_request("POST", &uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"]["message"].as_str().unwrap().contains("too short"));
    }

    #[tokio::test]
    async fn test_summary_missing_memo_is_not_found() {
        let app = make_app();
        let resp = app
            .oneshot(empty_request("POST", "/memos/missing/summary"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_summary_missing_key_is_internal_config_error() {
        let app = make_app_with(Arc::new(ScriptedGenerator::missing_key()));
        let created = create(
            &app,
            serde_json::json!({"title": "Needs key", "content": "Long enough to be summarized"}),
        )
        .await;
        let uri = format!("/memos/{}/summary", created["id"].as_str().unwrap());

        let resp = app.oneshot(empty_request("POST", &uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "CONFIG_ERROR");
        assert_eq!(json["error"]["message"], "API key is not configured");
    }

    #[tokio::test]
    async fn test_generate_tags_endpoint() {
        let app = make_app_with(Arc::new(ScriptedGenerator::replying("Rust, async, RUST, axum")));
        let created = create(
            &app,
            serde_json::json!({"title": "Server notes", "content": "Building an axum service on tokio"}),
        )
        .await;
        let uri = format!("/memos/{}/tags", created["id"].as_str().unwrap());

        let resp = app.oneshot(empty_request("POST", &uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["tags"], serde_json::json!(["rust", "async", "axum"]));
        assert_eq!(json["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_generate_tags_upstream_failure_is_internal() {
        let app = make_app_with(Arc::new(ScriptedGenerator::failing()));
        let created = create(
            &app,
            serde_json::json!({"title": "Fails", "content": "Upstream will fail for this one"}),
        )
        .await;
        let uri = format!("/memos/{}/tags", created["id"].as_str().unwrap());

        let resp = app.oneshot(empty_request("POST", &uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "GENERATION_FAILED");
    }

    #[tokio::test]
    async fn test_seed_then_skip() {
        let app = make_app();
        let resp = app.clone().oneshot(empty_request("POST", "/memos/seed")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let first = body_json(resp).await;
        assert!(first["count"].as_u64().unwrap() > 0);

        let resp = app.clone().oneshot(empty_request("POST", "/memos/seed")).await.unwrap();
        let second = body_json(resp).await;
        assert_eq!(second["skipped"], true);

        let resp = app.oneshot(empty_request("GET", "/memos")).await.unwrap();
        let list = body_json(resp).await;
        assert_eq!(list.as_array().unwrap().len() as u64, first["count"].as_u64().unwrap());
    }
}
