//! Domain events reflecting reconciliation state mutations.
//!
//! Every state change emits a [`ReconEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers and
//! optionally appended to the PostgreSQL event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{
    CustomerId, MatchId, MatchStatus, StatementId, StatementSource, TransactionId, WebreportId,
};

/// Domain event emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ReconEvent {
    /// A customer submitted a transfer claim.
    WebreportSubmitted {
        /// New webreport id.
        webreport_id: WebreportId,
        /// Submitting customer.
        customer_id: CustomerId,
        /// Claimed amount in minor units.
        amount: u64,
        /// Submission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Bank statements were ingested (single push or batch import).
    StatementsIngested {
        /// Where the statements came from.
        source: StatementSource,
        /// Number of rows accepted.
        accepted: u32,
        /// Number of rows skipped as invalid (batch mode only).
        skipped: u32,
        /// Ingestion timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A matching run produced a candidate pairing.
    MatchCreated {
        /// New matching-result id.
        match_id: MatchId,
        /// The claimed webreport.
        webreport_id: WebreportId,
        /// The claimed statement.
        statement_id: StatementId,
        /// Aggregate score, 0–100.
        score: u8,
        /// Classification (`auto_matched` or `manual_review`).
        status: MatchStatus,
        /// Run timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A match was approved; settlement ran.
    MatchVerified {
        /// The decided match.
        match_id: MatchId,
        /// Actor who approved it.
        verified_by: String,
        /// Decision timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A match was rejected; both records were released.
    MatchRejected {
        /// The decided match.
        match_id: MatchId,
        /// Actor who rejected it.
        verified_by: String,
        /// Decision timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A customer balance was credited (settlement or confirmed top-up).
    BalanceCredited {
        /// The success transaction behind the credit.
        transaction_id: TransactionId,
        /// Credited customer.
        customer_id: CustomerId,
        /// Credited amount in minor units.
        amount: u64,
        /// Balance after the credit.
        new_balance: u64,
        /// Credit timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A direct top-up was initiated and awaits confirmation.
    TopupInitiated {
        /// New pending transaction id.
        transaction_id: TransactionId,
        /// Initiating customer.
        customer_id: CustomerId,
        /// Top-up amount in minor units.
        amount: u64,
        /// Payment deadline.
        expires_at: DateTime<Utc>,
        /// Initiation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A pending transaction passed its deadline and was failed.
    TransactionExpired {
        /// The expired transaction.
        transaction_id: TransactionId,
        /// Affected customer.
        customer_id: CustomerId,
        /// Sweep timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl ReconEvent {
    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::WebreportSubmitted { .. } => "webreport_submitted",
            Self::StatementsIngested { .. } => "statements_ingested",
            Self::MatchCreated { .. } => "match_created",
            Self::MatchVerified { .. } => "match_verified",
            Self::MatchRejected { .. } => "match_rejected",
            Self::BalanceCredited { .. } => "balance_credited",
            Self::TopupInitiated { .. } => "topup_initiated",
            Self::TransactionExpired { .. } => "transaction_expired",
        }
    }
}
