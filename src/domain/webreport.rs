//! Webreport: a customer's self-reported transfer claim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CustomerId, StatementId, WebreportId};
use crate::error::ReconError;

/// Lifecycle states of a [`Webreport`].
///
/// `pending` records are eligible for matching; `matched` records are
/// claimed by exactly one non-rejected matching result; `verified` and
/// `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WebreportStatus {
    /// Awaiting a matching run.
    Pending,
    /// Claimed by a matching result awaiting verification.
    Matched,
    /// Confirmed and settled.
    Verified,
    /// Declined by an operator.
    Rejected,
}

impl std::fmt::Display for WebreportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Matched => "matched",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

/// A customer-asserted transfer claim awaiting confirmation.
///
/// Created by customer submission; thereafter only the status and the
/// bank-statement link mutate. Amounts are minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Webreport {
    /// Unique identifier (immutable after creation).
    pub id: WebreportId,
    /// Customer who submitted the claim.
    pub customer_id: CustomerId,
    /// Virtual account the customer says they transferred to.
    pub virtual_account_number: String,
    /// Claimed amount in minor currency units (> 0).
    pub amount: u64,
    /// When the customer says the transfer happened.
    pub transfer_date: DateTime<Utc>,
    /// Bank the customer transferred from.
    pub bank_sender: String,
    /// Optional free-form note from the customer.
    pub notes: Option<String>,
    /// Current lifecycle state.
    pub status: WebreportStatus,
    /// Bank statement this claim was matched with, while matched/verified.
    pub matched_statement_id: Option<StatementId>,
    /// Submission timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last status mutation.
    pub updated_at: DateTime<Utc>,
}

impl Webreport {
    /// Creates a new pending `Webreport`.
    #[must_use]
    pub fn new(
        customer_id: CustomerId,
        virtual_account_number: String,
        amount: u64,
        transfer_date: DateTime<Utc>,
        bank_sender: String,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: WebreportId::new(),
            customer_id,
            virtual_account_number,
            amount,
            transfer_date,
            bank_sender,
            notes,
            status: WebreportStatus::Pending,
            matched_statement_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Compare-and-set on the status field. The caller must hold the
    /// record's write lock; a stale `expected` is a conflict, not a race.
    fn transition(
        &mut self,
        expected: WebreportStatus,
        next: WebreportStatus,
    ) -> Result<(), ReconError> {
        if self.status != expected {
            return Err(ReconError::Conflict(format!(
                "webreport {} is {}, expected {expected}",
                self.id, self.status
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Claims this webreport for a matching result (`pending` → `matched`).
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if the record is not `pending`.
    pub fn mark_matched(&mut self, statement_id: StatementId) -> Result<(), ReconError> {
        self.transition(WebreportStatus::Pending, WebreportStatus::Matched)?;
        self.matched_statement_id = Some(statement_id);
        Ok(())
    }

    /// Finalizes a verified match (`matched` → `verified`).
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if the record is not `matched`.
    pub fn mark_verified(&mut self) -> Result<(), ReconError> {
        self.transition(WebreportStatus::Matched, WebreportStatus::Verified)
    }

    /// Releases the record after its match was rejected
    /// (`matched` → `pending`), clearing the statement link so it is
    /// eligible for re-matching.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if the record is not `matched`.
    pub fn release(&mut self) -> Result<(), ReconError> {
        self.transition(WebreportStatus::Matched, WebreportStatus::Pending)?;
        self.matched_statement_id = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_webreport() -> Webreport {
        Webreport::new(
            CustomerId::from("CUST-1"),
            "8808-1234-5678".to_string(),
            500_000,
            Utc::now(),
            "BCA".to_string(),
            None,
        )
    }

    #[test]
    fn new_webreport_is_pending() {
        let wr = make_webreport();
        assert_eq!(wr.status, WebreportStatus::Pending);
        assert!(wr.matched_statement_id.is_none());
    }

    #[test]
    fn match_then_verify() {
        let mut wr = make_webreport();
        let stmt = StatementId::new();
        assert!(wr.mark_matched(stmt).is_ok());
        assert_eq!(wr.status, WebreportStatus::Matched);
        assert_eq!(wr.matched_statement_id, Some(stmt));
        assert!(wr.mark_verified().is_ok());
        assert_eq!(wr.status, WebreportStatus::Verified);
    }

    #[test]
    fn double_match_is_conflict() {
        let mut wr = make_webreport();
        assert!(wr.mark_matched(StatementId::new()).is_ok());
        let result = wr.mark_matched(StatementId::new());
        assert!(matches!(result, Err(ReconError::Conflict(_))));
    }

    #[test]
    fn release_returns_to_pending_and_clears_link() {
        let mut wr = make_webreport();
        assert!(wr.mark_matched(StatementId::new()).is_ok());
        assert!(wr.release().is_ok());
        assert_eq!(wr.status, WebreportStatus::Pending);
        assert!(wr.matched_statement_id.is_none());
    }

    #[test]
    fn verify_from_pending_is_conflict() {
        let mut wr = make_webreport();
        assert!(matches!(wr.mark_verified(), Err(ReconError::Conflict(_))));
    }

    #[test]
    fn status_display_is_snake_case() {
        assert_eq!(WebreportStatus::Pending.to_string(), "pending");
        assert_eq!(WebreportStatus::Verified.to_string(), "verified");
    }
}
