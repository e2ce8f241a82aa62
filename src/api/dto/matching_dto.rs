//! Matching-run and verification DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::{BankStatement, MatchId, MatchingResult, Webreport};

/// Request body for `POST /matching/run`. Every field is optional;
/// omitted thresholds fall back to the server defaults for this run.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub struct RunMatchingRequest {
    /// Override of the date-proximity tolerance, in hours.
    pub date_tolerance_hours: Option<f64>,
    /// Override of the `auto_matched` threshold.
    pub auto_match_threshold: Option<u8>,
    /// Override of the materialization threshold.
    pub manual_review_threshold: Option<u8>,
}

/// Response body for `POST /matching/run`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchingRunResponse {
    /// Matching results created by this run.
    pub matched: Vec<MatchingResult>,
    /// Pending webreports no candidate claimed.
    pub unmatched_webreports: Vec<Webreport>,
    /// Pending statements no candidate consumed.
    pub unmatched_statements: Vec<BankStatement>,
}

/// Request body for `PATCH /matching/verify`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyMatchRequest {
    /// The matching result to decide.
    pub matching_result_id: MatchId,
    /// `approve` or `reject`.
    pub action: String,
    /// Operator or system actor making the decision.
    pub verified_by: Option<String>,
    /// Optional decision notes.
    pub notes: Option<String>,
}

/// Filter query parameters for `GET /matching`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct MatchFilter {
    /// Keep only results with this status (e.g. `manual_review`).
    pub status: Option<String>,
}

/// Paginated list response for `GET /matching`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchListResponse {
    /// Matching results on this page, newest first.
    pub data: Vec<MatchingResult>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
