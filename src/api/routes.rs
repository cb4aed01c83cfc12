use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::auth::{self, api as auth_api, AuthState, Principal};
use crate::books::{Book, BookStore, RawRecord, StoreError};
use crate::middleware::request_logging;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<BookStore>,
}

/// Create the API router.
///
/// `/token` and `/health` are public; every `/books` route sits behind the auth gate.
pub fn create_router(store: Arc<BookStore>, auth_state: AuthState) -> Router {
    let state = AppState { store };

    let token_routes = Router::new()
        .route("/token", get(auth_api::issue_token))
        .with_state(auth_state.clone());

    let protected_routes = Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route_layer(middleware::from_fn_with_state(
            auth_state.codec.clone(),
            auth::auth_gate,
        ))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(token_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        books: state.store.len(),
    })
}

/// List all books, optionally ordered by one field
async fn list_books(
    State(state): State<AppState>,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let Query(params) =
        params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let ascending = match params.ascending.as_deref() {
        None | Some("") => true,
        Some(raw) => parse_bool(raw).ok_or_else(|| {
            ApiError::BadRequest(format!("ascending must be a boolean, got '{}'", raw))
        })?,
    };
    let order = params.order.as_deref().filter(|o| !o.is_empty());

    let books = state.store.list(order, ascending)?;
    Ok(Json(books))
}

/// Add a new book
async fn create_book(
    State(state): State<AppState>,
    Extension(Principal(user)): Extension<Principal>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let record = json_object(payload)?;
    let id = state.store.create(&record)?;

    info!(user = %user, "📗 Book {} created", id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!("Book {} is created", id))),
    ))
}

/// Get a book by its Identifier
async fn get_book(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, ApiError> {
    let id = book_id(id)?;
    Ok(Json(state.store.get(id)?))
}

/// Update some fields of a book
async fn update_book(
    State(state): State<AppState>,
    Extension(Principal(user)): Extension<Principal>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = book_id(id)?;
    let changes = json_object(payload)?;
    state.store.update(id, &changes)?;

    info!(user = %user, "📝 Book {} updated ({} fields)", id, changes.len());

    Ok(Json(MessageResponse::new(format!(
        "Book {} has been successfully updated.",
        id
    ))))
}

/// Delete a book by its Identifier
async fn delete_book(
    State(state): State<AppState>,
    Extension(Principal(user)): Extension<Principal>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = book_id(id)?;
    state.store.delete(id)?;

    info!(user = %user, "🗑️  Book {} removed", id);

    Ok(Json(MessageResponse::new(format!("Book {} is removed.", id))))
}

fn book_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    let Path(id) = id.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    Ok(id)
}

fn json_object(
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<RawRecord, ApiError> {
    let Json(value) =
        payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

/// Boolean query values: true/false, 1/0, yes/no, on/off
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ===== Request/Response Types =====

#[derive(Deserialize)]
struct ListQuery {
    /// Field name to order by
    order: Option<String>,
    /// Sort direction, defaults to ascending
    ascending: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    books: usize,
}

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: String) -> Self {
        Self { message }
    }
}

// ===== Error Handling =====

#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Store(err) => {
                let status = match err {
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::Conflict(_) => StatusCode::CONFLICT,
                    StoreError::MissingKey
                    | StoreError::InvalidField(_)
                    | StoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}
