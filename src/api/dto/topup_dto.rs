//! Top-up and balance DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Response body for `GET /customers/{id}/balance`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// The queried customer.
    pub customer_id: String,
    /// Current balance in minor currency units.
    pub balance: u64,
}
