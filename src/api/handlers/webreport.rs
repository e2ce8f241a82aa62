//! Webreport handlers: submit and list.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    PaginationParams, WebreportFilter, WebreportListResponse, paginate,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ReconError};
use crate::ingest::WebreportPayload;

/// `POST /webreports` — Submit a customer transfer claim.
///
/// # Errors
///
/// Returns [`ReconError::Validation`] with the full field-error list on
/// a missing or invalid field.
#[utoipa::path(
    post,
    path = "/api/v1/webreports",
    tag = "Webreports",
    summary = "Submit a webreport",
    description = "Validates and stores a customer's self-reported transfer claim. All-or-nothing: any invalid field rejects the whole submission with the accumulated error list.",
    request_body = WebreportPayload,
    responses(
        (status = 201, description = "Webreport accepted"),
        (status = 400, description = "Field validation failed", body = ErrorResponse),
    )
)]
pub async fn submit_webreport(
    State(state): State<AppState>,
    Json(payload): Json<WebreportPayload>,
) -> Result<impl IntoResponse, ReconError> {
    let webreport = state.recon_service.submit_webreport(&payload).await?;
    Ok((StatusCode::CREATED, Json(webreport)))
}

/// `GET /webreports` — List webreports with optional filters.
///
/// # Errors
///
/// Returns [`ReconError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/webreports",
    tag = "Webreports",
    summary = "List webreports",
    description = "Returns a paginated list of webreports, newest first, optionally filtered by status and customer.",
    params(WebreportFilter, PaginationParams),
    responses(
        (status = 200, description = "Paginated webreport list", body = WebreportListResponse),
    )
)]
pub async fn list_webreports(
    State(state): State<AppState>,
    Query(filter): Query<WebreportFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ReconError> {
    let mut all = state.recon_service.list_webreports().await;
    if let Some(status) = &filter.status {
        all.retain(|w| w.status.to_string() == *status);
    }
    if let Some(customer_id) = &filter.customer_id {
        all.retain(|w| w.customer_id.as_str() == customer_id);
    }

    let (data, pagination) = paginate(all, params);
    Ok(Json(WebreportListResponse { data, pagination }))
}

/// Webreport routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/webreports", post(submit_webreport).get(list_webreports))
}
