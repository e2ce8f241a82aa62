//! Bank-statement DTOs for ingestion and listing.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::BankStatement;
use crate::ingest::RowWarning;

/// Ingestion mode selector for `POST /bank-statements`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct IngestMode {
    /// `api` (default) for a single webhook payload, `file_import` for
    /// a batch of exported rows.
    pub mode: Option<String>,
}

/// Filter query parameters for `GET /bank-statements`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct StatementFilter {
    /// Keep only records with this status (e.g. `pending`).
    pub status: Option<String>,
    /// Keep only records from this source (`api` or `file_import`).
    pub source: Option<String>,
    /// Keep only records reported by this bank.
    pub bank_code: Option<String>,
}

/// Response body for a batch import (201 Created).
///
/// Batch mode is best-effort: `imported` counts the accepted rows and
/// `warnings` names every skipped one.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    /// Number of rows accepted.
    pub imported: usize,
    /// The accepted statements, in input order.
    pub data: Vec<BankStatement>,
    /// One warning per skipped row.
    pub warnings: Vec<RowWarning>,
}

/// Paginated list response for `GET /bank-statements`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatementListResponse {
    /// Statements on this page, newest first.
    pub data: Vec<BankStatement>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
