//! HTTP interface - axum router, handlers, and response shapes.
//!
//! Handlers decode query and body parameters, call into [`crate::core`], and
//! encode the results as JSON (or as a file download for the export
//! endpoints). Validation failures, missing rows, and store failures all
//! surface uniformly as `400 {"error": "<message>"}`; callers should not rely
//! on status-code discrimination between them.

/// Response shapes with string-encoded identifiers
pub mod dto;
/// Event directory endpoints
pub mod events;
/// Ledger endpoints - per-event entries, company expenses/salaries, export
pub mod ledger;
/// Stock endpoints - purchases and export
pub mod stock;

use crate::{config::access, errors::Error};
use axum::{
    Json, Router,
    extract::{FromRequest, Query, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The store connection pool
    pub db: DatabaseConnection,
}

/// Builds the application router over a database connection.
pub fn app(db: DatabaseConnection) -> Router {
    Router::new()
        .route(
            "/events",
            post(events::create_event_handler).get(events::list_upcoming_handler),
        )
        .route("/events/done", get(events::list_done_handler))
        .route(
            "/events/:id",
            axum::routing::patch(events::set_status_handler).delete(events::delete_event_handler),
        )
        .route(
            "/events/:id/ledger",
            get(ledger::list_event_ledger_handler).post(ledger::append_event_ledger_handler),
        )
        .route("/ledger/:id", delete(ledger::delete_entry_handler))
        .route(
            "/expenses",
            post(ledger::create_company_expense_handler).get(ledger::list_expenses_handler),
        )
        .route("/expenses/export", get(ledger::export_expenses_handler))
        .route("/income", get(ledger::list_income_handler))
        .route("/salaries", post(ledger::create_company_salary_handler))
        .route("/summary", get(ledger::company_summary_handler))
        .route(
            "/stock",
            post(stock::create_stock_handler).get(stock::list_stock_handler),
        )
        .route("/stock/export", get(stock::export_stock_handler))
        .route("/auth/check", get(auth_check_handler))
        .with_state(AppState { db })
}

/// Error wrapper turning crate errors into the uniform 400 response.
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Error::Database(err) = &self.0 {
            warn!("Store failure surfaced to client: {err}");
        }
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(Error::validation(rejection.body_text()))
    }
}

/// JSON body extractor whose rejection is the uniform 400 error shape,
/// instead of axum's default 415/422 responses.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Handler result alias.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize, Default)]
pub(crate) struct AuthQuery {
    #[serde(default)]
    email: String,
}

/// Advisory allow-list check consumed by the sign-in UI. Not a security
/// boundary: no endpoint is gated on it.
async fn auth_check_handler(Query(query): Query<AuthQuery>) -> Json<serde_json::Value> {
    Json(json!({ "allowed": access::is_allowed(&query.email) }))
}
