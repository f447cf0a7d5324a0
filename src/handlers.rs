use crate::application_service::MortgageApplicationService;
use crate::errors::{AppError, INVALID_ID};
use crate::models::{ApplicationSubmission, Client};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use uuid::Uuid;

pub const APPLICATION_PATH: &str = "/mortgage/application";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Mortgage application orchestration.
    pub service: MortgageApplicationService,
}

/// Routes plus the serving middleware: body size limit, request tracing, CORS.
pub fn app(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    router(state)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Builds the HTTP routes without middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(APPLICATION_PATH, post(create_application))
        .route("/mortgage/application/:id", get(get_application))
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Accepts only the canonical 36-character hyphenated UUID form.
pub fn parse_application_id(raw: &str) -> Result<Uuid, AppError> {
    if raw.len() != 36 {
        return Err(AppError::BadRequest(INVALID_ID.to_string()));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(INVALID_ID.to_string()))
}

/// POST /mortgage/application
///
/// Creates and decides a mortgage application. The response always reports
/// PROCESSING without a monthly payment; the decision is visible only through
/// GET /mortgage/application/:id.
///
/// # Returns
///
/// * 201 with the record and a `Location` header, 400 on invalid input,
///   409 on a duplicate natural key.
pub async fn create_application(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ApplicationSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(submission) = payload.map_err(|rejection| {
        tracing::debug!("Rejected application body: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    })?;

    tracing::info!("POST {}", APPLICATION_PATH);

    let saved = state.service.submit(submission).await?;
    let location = format!("{}/{}", APPLICATION_PATH, saved.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(saved.submitted_view()),
    ))
}

/// GET /mortgage/application/:id
///
/// Returns the stored record with its real status and, when approved, the
/// monthly payment.
pub async fn get_application(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Client>, AppError> {
    tracing::info!("GET {}/{}", APPLICATION_PATH, id);

    let id = parse_application_id(&id)?;
    let client = state.service.lookup(id).await?.ok_or(AppError::NotFound)?;

    Ok(Json(client))
}
