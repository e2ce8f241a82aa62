//! Ingestion layer: payload normalization and validation.
//!
//! Validators turn loosely-typed inbound payloads into domain-ready
//! drafts, or return the accumulated list of field errors as data. Two
//! deliberately different modes: one API payload represents one real
//! event and is all-or-nothing, while a batch-exported file is expected
//! to contain occasional malformed rows, which are skipped and reported
//! as warnings.

pub mod validate;

pub use validate::{
    BatchDraft, RowWarning, StatementBatchPayload, StatementDraft, StatementPayload,
    StatementRowPayload, TopupDraft, TopupPayload, WebreportDraft, WebreportPayload,
    validate_statement, validate_statement_batch, validate_topup, validate_webreport,
};
