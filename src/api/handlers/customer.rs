//! Customer balance handler.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::BalanceResponse;
use crate::app_state::AppState;
use crate::domain::CustomerId;
use crate::error::{ErrorResponse, ReconError};

/// `GET /customers/{id}/balance` — Current customer balance.
///
/// # Errors
///
/// Returns [`ReconError::NotFound`] if no account has been materialized
/// for the customer yet (no top-up and no settled match).
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}/balance",
    tag = "Customers",
    summary = "Get a customer balance",
    description = "Returns the customer's current balance in minor currency units.",
    params(
        ("id" = String, Path, description = "External customer id"),
    ),
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 404, description = "No account for this customer yet", body = ErrorResponse),
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ReconError> {
    let customer_id = CustomerId::new(id);
    let balance = state.settlement_service.balance(&customer_id).await?;
    Ok(Json(BalanceResponse {
        customer_id: customer_id.to_string(),
        balance,
    }))
}

/// Customer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/customers/{id}/balance", get(get_balance))
}
