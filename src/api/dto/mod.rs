//! Data Transfer Objects for REST request/response serialization.
//!
//! Request payloads for ingestion live in [`crate::ingest`] next to
//! their validators; this module holds the HTTP-side envelopes: filter
//! parameters, pagination, and list/batch response shapes.

pub mod common_dto;
pub mod matching_dto;
pub mod statement_dto;
pub mod topup_dto;
pub mod webreport_dto;

pub use common_dto::*;
pub use matching_dto::*;
pub use statement_dto::*;
pub use topup_dto::*;
pub use webreport_dto::*;
