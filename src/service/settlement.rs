//! Settlement service: the only place customer balances are credited.
//!
//! Two producers feed the same [`Transaction`] state machine — verified
//! matches (born `success`) and direct top-ups (born `pending`, waiting
//! for an external confirmation before a deadline). Both paths converge
//! on a single credit point, so the exactly-once-per-transaction balance
//! invariant has one owner.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    CustomerId, CustomerLedger, EventBus, MatchId, ReconEvent, SettleInsert, Transaction,
    TransactionId, TransactionLedger, TransactionStatus,
};
use crate::error::{EntityKind, ReconError};
use crate::ingest::TopupDraft;

/// Converts verified matches and confirmed top-ups into balance credits.
#[derive(Debug)]
pub struct SettlementService {
    transactions: Arc<TransactionLedger>,
    customers: Arc<CustomerLedger>,
    event_bus: EventBus,
    topup_expiry: Duration,
}

impl SettlementService {
    /// Creates a new `SettlementService`.
    #[must_use]
    pub fn new(
        transactions: Arc<TransactionLedger>,
        customers: Arc<CustomerLedger>,
        event_bus: EventBus,
        topup_expiry: Duration,
    ) -> Self {
        Self {
            transactions,
            customers,
            event_bus,
            topup_expiry,
        }
    }

    /// Settles a verified match: records one `success` transaction linked
    /// to the match and credits the customer balance. Idempotent per
    /// match id — a duplicate call returns the existing transaction and
    /// credits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Internal`] on a corrupted match index.
    pub async fn settle_match(
        &self,
        match_id: MatchId,
        customer_id: &CustomerId,
        amount: u64,
        bank_code: &str,
    ) -> Result<Transaction, ReconError> {
        let tx = Transaction::settled(customer_id.clone(), amount, bank_code.to_string(), match_id);
        match self.transactions.record_settlement(match_id, tx).await? {
            SettleInsert::Created(tx) => {
                let new_balance = self.credit(&tx).await;
                tracing::info!(
                    %match_id,
                    transaction_id = %tx.id,
                    customer_id = %tx.customer_id,
                    amount,
                    new_balance,
                    "match settled"
                );
                Ok(tx)
            }
            SettleInsert::AlreadySettled(tx) => {
                tracing::warn!(%match_id, transaction_id = %tx.id, "duplicate settlement suppressed");
                Ok(tx)
            }
        }
    }

    /// Creates a pending top-up transaction with a payment deadline and
    /// materializes the customer's account.
    pub async fn initiate_topup(&self, draft: TopupDraft) -> Transaction {
        let expires_at = Utc::now() + self.topup_expiry;
        let tx = Transaction::topup(draft.customer_id, draft.amount, draft.bank_code, expires_at);
        let _ = self.customers.get_or_create(&tx.customer_id).await;
        self.transactions.insert(tx.clone()).await;

        let _ = self.event_bus.publish(ReconEvent::TopupInitiated {
            transaction_id: tx.id,
            customer_id: tx.customer_id.clone(),
            amount: tx.amount,
            expires_at,
            timestamp: Utc::now(),
        });

        tracing::info!(
            transaction_id = %tx.id,
            customer_id = %tx.customer_id,
            amount = tx.amount,
            %expires_at,
            "top-up initiated"
        );
        tx
    }

    /// Confirms a pending top-up (`pending` → `success`) and credits the
    /// balance. Idempotent: confirming an already-`success` transaction
    /// returns it unchanged without a second credit.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::NotFound`] for an unknown id and
    /// [`ReconError::Conflict`] if the transaction already expired.
    pub async fn confirm_topup(&self, id: TransactionId) -> Result<Transaction, ReconError> {
        let handle = self.transactions.get(id).await?;
        let mut tx = handle.write().await;
        match tx.status {
            TransactionStatus::Success => Ok(tx.clone()),
            TransactionStatus::Failed => Err(ReconError::Conflict(format!(
                "transaction {id} expired before confirmation"
            ))),
            TransactionStatus::Pending => {
                tx.confirm()?;
                let snapshot = tx.clone();
                drop(tx);

                let new_balance = self.credit(&snapshot).await;
                tracing::info!(
                    transaction_id = %snapshot.id,
                    customer_id = %snapshot.customer_id,
                    new_balance,
                    "top-up confirmed"
                );
                Ok(snapshot)
            }
        }
    }

    /// Fails every pending transaction whose deadline has passed,
    /// returning the expired set. Racing confirmations are resolved by
    /// the per-record CAS: whichever transition wins is final, the loser
    /// is a no-op.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<Transaction> {
        let mut expired = Vec::new();
        for handle in self.transactions.handles().await {
            let mut tx = handle.write().await;
            if tx.is_expired(now) && tx.fail().is_ok() {
                let snapshot = tx.clone();
                drop(tx);

                let _ = self.event_bus.publish(ReconEvent::TransactionExpired {
                    transaction_id: snapshot.id,
                    customer_id: snapshot.customer_id.clone(),
                    timestamp: now,
                });
                tracing::info!(
                    transaction_id = %snapshot.id,
                    customer_id = %snapshot.customer_id,
                    "pending transaction expired"
                );
                expired.push(snapshot);
            }
        }
        expired
    }

    /// Returns a snapshot of one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::NotFound`] for an unknown id.
    pub async fn transaction(&self, id: TransactionId) -> Result<Transaction, ReconError> {
        let handle = self.transactions.get(id).await?;
        let tx = handle.read().await.clone();
        Ok(tx)
    }

    /// Returns the customer's current balance.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::NotFound`] if no account exists for the
    /// customer yet.
    pub async fn balance(&self, customer_id: &CustomerId) -> Result<u64, ReconError> {
        self.customers
            .balance(customer_id)
            .await
            .ok_or_else(|| ReconError::not_found(EntityKind::Customer, customer_id))
    }

    /// Applies the one and only balance credit for a `success`
    /// transaction and emits the credit event.
    async fn credit(&self, tx: &Transaction) -> u64 {
        let new_balance = self.customers.credit(&tx.customer_id, tx.amount).await;
        let _ = self.event_bus.publish(ReconEvent::BalanceCredited {
            transaction_id: tx.id,
            customer_id: tx.customer_id.clone(),
            amount: tx.amount,
            new_balance,
            timestamp: Utc::now(),
        });
        new_balance
    }
}
