//! Matching handlers: run the engine, verify results, list results.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    MatchFilter, MatchListResponse, MatchingRunResponse, PaginationParams, RunMatchingRequest,
    VerifyMatchRequest, paginate,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, FieldError, ReconError};
use crate::matching::MatchingConfig;
use crate::service::parse_verify_action;

/// `POST /matching/run` — Run the matching engine over pending records.
///
/// # Errors
///
/// Returns [`ReconError`] only on store-level failures; an empty matched
/// set is a successful outcome.
#[utoipa::path(
    post,
    path = "/api/v1/matching/run",
    tag = "Matching",
    summary = "Run a matching pass",
    description = "Scores every pending webreport against the pending statements and materializes the winning candidates. Threshold overrides apply to this run only; send {} to use the server defaults.",
    request_body = RunMatchingRequest,
    responses(
        (status = 200, description = "Run outcome with matched and unmatched records", body = MatchingRunResponse),
    )
)]
pub async fn run_matching(
    State(state): State<AppState>,
    Json(req): Json<RunMatchingRequest>,
) -> Result<impl IntoResponse, ReconError> {
    let defaults = state.recon_service.matching_defaults();
    let config = MatchingConfig {
        date_tolerance_hours: req.date_tolerance_hours.unwrap_or(defaults.date_tolerance_hours),
        auto_match_threshold: req.auto_match_threshold.unwrap_or(defaults.auto_match_threshold),
        manual_review_threshold: req
            .manual_review_threshold
            .unwrap_or(defaults.manual_review_threshold),
    };

    let report = state.recon_service.run_matching(Some(config)).await?;
    Ok(Json(MatchingRunResponse {
        matched: report.matched,
        unmatched_webreports: report.unmatched_webreports,
        unmatched_statements: report.unmatched_statements,
    }))
}

/// `PATCH /matching/verify` — Approve or reject a matching result.
///
/// # Errors
///
/// Returns [`ReconError::NotFound`] for an unknown id and
/// [`ReconError::Conflict`] if the result was already decided, so a UI
/// can show "already processed" instead of a generic failure.
#[utoipa::path(
    patch,
    path = "/api/v1/matching/verify",
    tag = "Matching",
    summary = "Decide a matching result",
    description = "Approve settles the match and credits the customer balance exactly once; reject releases both records back to pending for re-matching.",
    request_body = VerifyMatchRequest,
    responses(
        (status = 200, description = "Updated matching result"),
        (status = 400, description = "Invalid action or missing actor", body = ErrorResponse),
        (status = 404, description = "Matching result not found", body = ErrorResponse),
        (status = 409, description = "Matching result already decided", body = ErrorResponse),
    )
)]
pub async fn verify_match(
    State(state): State<AppState>,
    Json(req): Json<VerifyMatchRequest>,
) -> Result<impl IntoResponse, ReconError> {
    let action = parse_verify_action(&req.action)?;
    let verified_by = match req.verified_by.as_deref().map(str::trim) {
        Some(actor) if !actor.is_empty() => actor.to_string(),
        _ => {
            return Err(ReconError::Validation(vec![FieldError::new(
                "verified_by",
                "is required",
            )]));
        }
    };

    let result = state
        .recon_service
        .verify(req.matching_result_id, action, &verified_by, req.notes)
        .await?;
    Ok(Json(result))
}

/// `GET /matching` — List matching results with an optional status filter.
///
/// # Errors
///
/// Returns [`ReconError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/matching",
    tag = "Matching",
    summary = "List matching results",
    description = "Returns a paginated list of matching results, newest first, optionally filtered by status.",
    params(MatchFilter, PaginationParams),
    responses(
        (status = 200, description = "Paginated matching-result list", body = MatchListResponse),
    )
)]
pub async fn list_matches(
    State(state): State<AppState>,
    Query(filter): Query<MatchFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ReconError> {
    let mut all = state.recon_service.list_matches().await;
    if let Some(status) = &filter.status {
        all.retain(|m| m.status.to_string() == *status);
    }

    let (data, pagination) = paginate(all, params);
    Ok(Json(MatchListResponse { data, pagination }))
}

/// Matching routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/matching", get(list_matches))
        .route("/matching/run", post(run_matching))
        .route("/matching/verify", patch(verify_match))
}
