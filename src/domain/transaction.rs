//! Transaction: the settled, balance-affecting record.
//!
//! Transactions come from two producers that share one state machine:
//! settlement of a verified match (born `success`) and direct top-ups
//! awaiting an external payment confirmation (born `pending` with a
//! deadline).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CustomerId, MatchId, TransactionId};
use crate::error::ReconError;

/// Lifecycle states of a [`Transaction`]. `success` and `failed` are
/// terminal; once reached they are never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Awaiting an external payment confirmation.
    Pending,
    /// Confirmed; the balance credit has happened.
    Success,
    /// Expired before confirmation arrived.
    Failed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A balance-affecting record keyed to one customer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Unique identifier (immutable after creation).
    pub id: TransactionId,
    /// Customer whose balance this transaction affects.
    pub customer_id: CustomerId,
    /// Amount in minor currency units (> 0).
    pub amount: u64,
    /// Current lifecycle state.
    pub status: TransactionStatus,
    /// Bank code the money moved through.
    pub bank_code: String,
    /// The verified match that produced this transaction, if any.
    pub matching_result_id: Option<MatchId>,
    /// Payment deadline; only meaningful while `pending`.
    pub expires_at: Option<DateTime<Utc>>,
    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last status mutation.
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a `success` transaction from a verified match. The balance
    /// credit is the ledger's responsibility, in the same logical step.
    #[must_use]
    pub fn settled(
        customer_id: CustomerId,
        amount: u64,
        bank_code: String,
        matching_result_id: MatchId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            customer_id,
            amount,
            status: TransactionStatus::Success,
            bank_code,
            matching_result_id: Some(matching_result_id),
            expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a `pending` top-up transaction with a payment deadline.
    #[must_use]
    pub fn topup(
        customer_id: CustomerId,
        amount: u64,
        bank_code: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            customer_id,
            amount,
            status: TransactionStatus::Pending,
            bank_code,
            matching_result_id: None,
            expires_at: Some(expires_at),
            created_at: now,
            updated_at: now,
        }
    }

    /// Compare-and-set on the status field, under the record write lock.
    fn transition(
        &mut self,
        expected: TransactionStatus,
        next: TransactionStatus,
    ) -> Result<(), ReconError> {
        if self.status != expected {
            return Err(ReconError::Conflict(format!(
                "transaction {} is {}, expected {expected}",
                self.id, self.status
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Confirms the payment (`pending` → `success`). The winner of this
    /// CAS — confirmation callback or expiry sweep — decides the record.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if the record is not `pending`.
    pub fn confirm(&mut self) -> Result<(), ReconError> {
        self.transition(TransactionStatus::Pending, TransactionStatus::Success)?;
        self.expires_at = None;
        Ok(())
    }

    /// Fails the transaction (`pending` → `failed`), used by the expiry
    /// sweep when the deadline passed unconfirmed.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if the record is not `pending`.
    pub fn fail(&mut self) -> Result<(), ReconError> {
        self.transition(TransactionStatus::Pending, TransactionStatus::Failed)
    }

    /// Returns `true` if this record is pending past its deadline.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == TransactionStatus::Pending
            && self.expires_at.is_some_and(|deadline| deadline < now)
    }
}
