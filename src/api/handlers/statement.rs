//! Bank-statement handlers: single/batch ingestion and listing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    ImportResponse, IngestMode, PaginationParams, StatementFilter, StatementListResponse, paginate,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, FieldError, ReconError};
use crate::ingest::{StatementBatchPayload, StatementPayload};

/// `POST /bank-statements` — Ingest bank statements.
///
/// The `mode` query parameter selects the payload shape: `api` (default)
/// takes a single statement and is all-or-nothing; `file_import` takes a
/// batch and skips invalid rows, reporting them as warnings.
///
/// # Errors
///
/// Returns [`ReconError::Validation`] on field errors (single mode) or
/// batch-level errors (missing bank code, empty statements array).
#[utoipa::path(
    post,
    path = "/api/v1/bank-statements",
    tag = "BankStatements",
    summary = "Ingest bank statements",
    description = "Stores bank-sourced records of money movement. mode=api takes one webhook payload; mode=file_import takes a batch and reports skipped rows as warnings.",
    params(IngestMode),
    request_body = StatementBatchPayload,
    responses(
        (status = 201, description = "Statement(s) accepted", body = ImportResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
    )
)]
pub async fn ingest_statements(
    State(state): State<AppState>,
    Query(mode): Query<IngestMode>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ReconError> {
    match mode.mode.as_deref().unwrap_or("api") {
        "api" => {
            let payload: StatementPayload = parse_body(body)?;
            let statement = state.recon_service.ingest_statement(&payload).await?;
            Ok((StatusCode::CREATED, Json(statement)).into_response())
        }
        "file_import" => {
            let payload: StatementBatchPayload = parse_body(body)?;
            let outcome = state.recon_service.import_statements(&payload).await?;
            let response = ImportResponse {
                imported: outcome.accepted.len(),
                data: outcome.accepted,
                warnings: outcome.warnings,
            };
            Ok((StatusCode::CREATED, Json(response)).into_response())
        }
        other => Err(ReconError::Validation(vec![FieldError::new(
            "mode",
            &format!("unknown ingestion mode: {other}"),
        )])),
    }
}

/// `GET /bank-statements` — List statements with optional filters.
///
/// # Errors
///
/// Returns [`ReconError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/bank-statements",
    tag = "BankStatements",
    summary = "List bank statements",
    description = "Returns a paginated list of bank statements, newest first, optionally filtered by status, source, and bank code.",
    params(StatementFilter, PaginationParams),
    responses(
        (status = 200, description = "Paginated statement list", body = StatementListResponse),
    )
)]
pub async fn list_statements(
    State(state): State<AppState>,
    Query(filter): Query<StatementFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ReconError> {
    let mut all = state.recon_service.list_statements().await;
    if let Some(status) = &filter.status {
        all.retain(|s| s.status.to_string() == *status);
    }
    if let Some(source) = &filter.source {
        all.retain(|s| s.source.to_string() == *source);
    }
    if let Some(bank_code) = &filter.bank_code {
        all.retain(|s| s.bank_code == *bank_code);
    }

    let (data, pagination) = paginate(all, params);
    Ok(Json(StatementListResponse { data, pagination }))
}

/// Statement routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/bank-statements",
        post(ingest_statements).get(list_statements),
    )
}

/// Deserializes the mode-specific payload shape out of the raw body.
fn parse_body<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, ReconError> {
    serde_json::from_value(body).map_err(|e| {
        ReconError::Validation(vec![FieldError::new("body", &format!("malformed payload: {e}"))])
    })
}
