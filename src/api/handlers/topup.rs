//! Top-up handlers: initiate, confirm, and inspect transactions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::TransactionId;
use crate::error::{ErrorResponse, ReconError};
use crate::ingest::{TopupPayload, validate_topup};

/// `POST /topups` — Initiate a direct top-up.
///
/// Creates a pending transaction with a payment deadline; the balance is
/// credited only when the external confirmation arrives in time.
///
/// # Errors
///
/// Returns [`ReconError::Validation`] with the full field-error list.
#[utoipa::path(
    post,
    path = "/api/v1/topups",
    tag = "Topups",
    summary = "Initiate a top-up",
    description = "Creates a pending transaction with an expiry deadline, awaiting an external payment confirmation.",
    request_body = TopupPayload,
    responses(
        (status = 201, description = "Pending transaction created"),
        (status = 400, description = "Field validation failed", body = ErrorResponse),
    )
)]
pub async fn initiate_topup(
    State(state): State<AppState>,
    Json(payload): Json<TopupPayload>,
) -> Result<impl IntoResponse, ReconError> {
    let draft = validate_topup(&payload).map_err(ReconError::Validation)?;
    let tx = state.settlement_service.initiate_topup(draft).await;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// `POST /topups/{id}/confirm` — Confirm a pending top-up.
///
/// Idempotent: confirming an already-confirmed transaction returns it
/// unchanged and never credits twice.
///
/// # Errors
///
/// Returns [`ReconError::NotFound`] for an unknown id and
/// [`ReconError::Conflict`] if the transaction already expired.
#[utoipa::path(
    post,
    path = "/api/v1/topups/{id}/confirm",
    tag = "Topups",
    summary = "Confirm a top-up",
    description = "Transitions the pending transaction to success and credits the customer balance exactly once.",
    params(
        ("id" = uuid::Uuid, Path, description = "Transaction UUID"),
    ),
    responses(
        (status = 200, description = "Confirmed transaction"),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 409, description = "Transaction expired before confirmation", body = ErrorResponse),
    )
)]
pub async fn confirm_topup(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ReconError> {
    let tx = state
        .settlement_service
        .confirm_topup(TransactionId::from_uuid(id))
        .await?;
    Ok(Json(tx))
}

/// `GET /topups/{id}` — Get one transaction.
///
/// # Errors
///
/// Returns [`ReconError::NotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/topups/{id}",
    tag = "Topups",
    summary = "Get a transaction",
    description = "Returns the current state of a transaction, including its expiry deadline while pending.",
    params(
        ("id" = uuid::Uuid, Path, description = "Transaction UUID"),
    ),
    responses(
        (status = 200, description = "Transaction detail"),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
    )
)]
pub async fn get_topup(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, ReconError> {
    let tx = state
        .settlement_service
        .transaction(TransactionId::from_uuid(id))
        .await?;
    Ok(Json(tx))
}

/// Top-up routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/topups", post(initiate_topup))
        .route("/topups/{id}", get(get_topup))
        .route("/topups/{id}/confirm", post(confirm_topup))
}
