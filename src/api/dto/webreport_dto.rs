//! Webreport DTOs for submission and listing.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::Webreport;

/// Filter query parameters for `GET /webreports`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct WebreportFilter {
    /// Keep only records with this status (e.g. `pending`).
    pub status: Option<String>,
    /// Keep only records submitted by this customer.
    pub customer_id: Option<String>,
}

/// Paginated list response for `GET /webreports`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebreportListResponse {
    /// Webreports on this page, newest first.
    pub data: Vec<Webreport>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
