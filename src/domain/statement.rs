//! Bank statement: an externally-sourced record of money movement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{StatementId, WebreportId};
use crate::error::ReconError;

/// Where a bank statement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatementSource {
    /// Pushed by the bank via webhook/API.
    Api,
    /// Imported from a batch-exported file.
    FileImport,
}

impl std::fmt::Display for StatementSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Api => "api",
            Self::FileImport => "file_import",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle states of a [`BankStatement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatementStatus {
    /// Awaiting a matching run.
    Pending,
    /// Claimed by a matching result awaiting verification.
    Matched,
    /// Consumed by a verified match.
    Processed,
}

impl std::fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Matched => "matched",
            Self::Processed => "processed",
        };
        write!(f, "{s}")
    }
}

/// A bank-sourced record of an actual money movement.
///
/// Created by ingestion (single webhook payload or batch import row);
/// only the status and the webreport link mutate afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BankStatement {
    /// Unique identifier (immutable after creation).
    pub id: StatementId,
    /// How this record arrived.
    pub source: StatementSource,
    /// Code of the reporting bank.
    pub bank_code: String,
    /// Settlement account the money landed in.
    pub account_number: String,
    /// Virtual account that received the transfer.
    pub virtual_account_number: String,
    /// Amount in minor currency units (> 0).
    pub amount: u64,
    /// When the bank recorded the movement.
    pub transaction_date: DateTime<Utc>,
    /// Sender name as reported by the bank.
    pub sender_name: Option<String>,
    /// Bank-side reference string.
    pub reference: Option<String>,
    /// Current lifecycle state.
    pub status: StatementStatus,
    /// Webreport this statement was matched with, while matched/processed.
    pub matched_webreport_id: Option<WebreportId>,
    /// Ingestion timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last status mutation.
    pub updated_at: DateTime<Utc>,
}

impl BankStatement {
    /// Creates a new pending `BankStatement`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: StatementSource,
        bank_code: String,
        account_number: String,
        virtual_account_number: String,
        amount: u64,
        transaction_date: DateTime<Utc>,
        sender_name: Option<String>,
        reference: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: StatementId::new(),
            source,
            bank_code,
            account_number,
            virtual_account_number,
            amount,
            transaction_date,
            sender_name,
            reference,
            status: StatementStatus::Pending,
            matched_webreport_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Compare-and-set on the status field, under the record write lock.
    fn transition(
        &mut self,
        expected: StatementStatus,
        next: StatementStatus,
    ) -> Result<(), ReconError> {
        if self.status != expected {
            return Err(ReconError::Conflict(format!(
                "bank statement {} is {}, expected {expected}",
                self.id, self.status
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Claims this statement for a matching result (`pending` → `matched`).
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if the record is not `pending`.
    pub fn mark_matched(&mut self, webreport_id: WebreportId) -> Result<(), ReconError> {
        self.transition(StatementStatus::Pending, StatementStatus::Matched)?;
        self.matched_webreport_id = Some(webreport_id);
        Ok(())
    }

    /// Finalizes a verified match (`matched` → `processed`).
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if the record is not `matched`.
    pub fn mark_processed(&mut self) -> Result<(), ReconError> {
        self.transition(StatementStatus::Matched, StatementStatus::Processed)
    }

    /// Releases the record after its match was rejected
    /// (`matched` → `pending`), clearing the webreport link.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if the record is not `matched`.
    pub fn release(&mut self) -> Result<(), ReconError> {
        self.transition(StatementStatus::Matched, StatementStatus::Pending)?;
        self.matched_webreport_id = None;
        Ok(())
    }
}
