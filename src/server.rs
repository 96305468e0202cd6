//! HTTP surface.
//!
//! A thin collaborator over the core: it only ever tells the cache "a file
//! was (re)placed" (upload → invalidate) and asks the search engine "return
//! records matching this query under this category".
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/upload` | Multipart file upload; invalidates the cache |
//! | `GET`  | `/api/categories` | Distinct category values of the dataset |
//! | `GET`  | `/api/search` | Ranked similarity search (`keywords`, `category`) |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! All error responses use one JSON shape:
//!
//! ```json
//! { "error": { "code": "no_dataset", "message": "no dataset has been uploaded yet" } }
//! ```
//!
//! Codes: `bad_request` (400), `no_dataset` (400), `schema_error` (400),
//! `config_error` (500), `internal` (500).

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::cache::DataCache;
use crate::error::Error;
use crate::ingest;
use crate::models::SearchResult;
use crate::search;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    cache: Arc<DataCache>,
}

/// Build the application router. Separate from [`run_server`] so tests can
/// drive the API without binding a socket.
pub fn router(cache: Arc<DataCache>) -> Router {
    let state = AppState { cache };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Datasets run well past axum's 2 MB default body limit.
        .route(
            "/api/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(64 * 1024 * 1024)),
        )
        .route("/api/categories", get(handle_categories))
        .route("/api/search", get(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on `bind` and serves until the process exits.
pub async fn run_server(bind: &str, cache: Arc<DataCache>) -> anyhow::Result<()> {
    let app = router(cache);

    tracing::info!("listening on http://{}", bind);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal",
        message: format!("background task failed: {}", e),
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> AppError {
        let (status, code) = match &err {
            Error::NoDataset => (StatusCode::BAD_REQUEST, "no_dataset"),
            Error::MissingColumn(_) | Error::MissingCategoryColumn(_) => {
                (StatusCode::BAD_REQUEST, "schema_error")
            }
            Error::NoSearchColumns => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Csv(_) | Error::Io(_) | Error::Computation(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

// ============ POST /api/upload ============

#[derive(Serialize)]
struct UploadResponse {
    message: String,
}

/// Accepts a multipart upload, stores the raw file, and invalidates the
/// cache so the next read rebuilds from the new dataset.
async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("failed to read upload: {}", e)))?;

        // Keep the disk write off the async executor.
        let dir = state.cache.upload_dir().to_path_buf();
        let path = tokio::task::spawn_blocking(move || ingest::save_upload(&dir, &file_name, &bytes))
            .await
            .map_err(join_error)??;

        // Invalidate only after the file is durably in place.
        state.cache.invalidate();

        return Ok(Json(UploadResponse {
            message: format!("{} uploaded successfully", path.display()),
        }));
    }

    Err(bad_request("multipart field \"file\" is required"))
}

// ============ GET /api/categories ============

async fn handle_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    let cache = state.cache.clone();
    let categories = tokio::task::spawn_blocking(move || search::list_categories(&cache))
        .await
        .map_err(join_error)??;
    Ok(Json(categories))
}

// ============ GET /api/search ============

#[derive(Deserialize)]
struct SearchParams {
    keywords: String,
    category: Option<String>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    // A stale cache means a full parse + TF-IDF fit; run it off the async
    // executor so other requests keep being served meanwhile.
    let cache = state.cache.clone();
    let results = tokio::task::spawn_blocking(move || {
        search::run_search(&cache, &params.keywords, params.category.as_deref())
    })
    .await
    .map_err(join_error)??;
    Ok(Json(results))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
