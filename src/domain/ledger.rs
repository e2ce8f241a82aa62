//! Transaction and customer-balance ledgers.
//!
//! [`TransactionLedger`] stores transactions with a uniqueness index from
//! match id to transaction id: the check-and-insert happens under one
//! write lock, which is the exactly-once settlement guard. The
//! [`CustomerLedger`] holds balance accounts behind per-customer locks so
//! credits serialize per customer without cross-customer coordination.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{CustomerAccount, CustomerId, MatchId, Transaction, TransactionId};
use crate::error::{EntityKind, ReconError};

/// Outcome of recording a settlement transaction.
#[derive(Debug)]
pub enum SettleInsert {
    /// The transaction was inserted; the caller must apply the credit.
    Created(Transaction),
    /// The match was settled earlier; no credit may happen again.
    AlreadySettled(Transaction),
}

#[derive(Debug, Default)]
struct LedgerIndex {
    by_id: HashMap<TransactionId, Arc<RwLock<Transaction>>>,
    by_match: HashMap<MatchId, TransactionId>,
}

/// Store of all transactions, keyed by id and (for settlements) by the
/// match that produced them.
#[derive(Debug, Default)]
pub struct TransactionLedger {
    inner: RwLock<LedgerIndex>,
}

impl TransactionLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a settlement transaction for `match_id`, unless one
    /// already exists. The match-index check and the insert share one
    /// write lock, so two concurrent settlements of the same match
    /// cannot both observe "not settled yet".
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Internal`] if the index references a
    /// transaction that is missing from the ledger (a bug, not a race).
    pub async fn record_settlement(
        &self,
        match_id: MatchId,
        tx: Transaction,
    ) -> Result<SettleInsert, ReconError> {
        let mut inner = self.inner.write().await;
        if let Some(existing_id) = inner.by_match.get(&match_id).copied() {
            let existing = inner.by_id.get(&existing_id).cloned().ok_or_else(|| {
                ReconError::Internal(format!(
                    "match index points at missing transaction {existing_id}"
                ))
            })?;
            let snapshot = existing.read().await.clone();
            return Ok(SettleInsert::AlreadySettled(snapshot));
        }
        let snapshot = tx.clone();
        inner.by_match.insert(match_id, tx.id);
        inner.by_id.insert(tx.id, Arc::new(RwLock::new(tx)));
        Ok(SettleInsert::Created(snapshot))
    }

    /// Inserts a top-up transaction (no match link).
    pub async fn insert(&self, tx: Transaction) {
        let mut inner = self.inner.write().await;
        inner.by_id.insert(tx.id, Arc::new(RwLock::new(tx)));
    }

    /// Returns a shared handle to the transaction behind its lock.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::NotFound`] if no transaction with the given
    /// id exists.
    pub async fn get(&self, id: TransactionId) -> Result<Arc<RwLock<Transaction>>, ReconError> {
        let inner = self.inner.read().await;
        inner
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| ReconError::not_found(EntityKind::Transaction, id))
    }

    /// Returns handles to every transaction. Used by the expiry sweep,
    /// which re-checks the deadline under each record's write lock.
    pub async fn handles(&self) -> Vec<Arc<RwLock<Transaction>>> {
        let inner = self.inner.read().await;
        inner.by_id.values().cloned().collect()
    }

    /// Returns clones of all transactions matching the predicate.
    pub async fn snapshot_filtered<F>(&self, pred: F) -> Vec<Transaction>
    where
        F: Fn(&Transaction) -> bool,
    {
        let inner = self.inner.read().await;
        let mut out = Vec::new();
        for tx_lock in inner.by_id.values() {
            let tx = tx_lock.read().await;
            if pred(&tx) {
                out.push(tx.clone());
            }
        }
        out
    }

    /// Returns the number of transactions in the ledger.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    /// Returns `true` if the ledger contains no transactions.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }
}

/// Store of customer balance accounts with per-customer locking.
#[derive(Debug, Default)]
pub struct CustomerLedger {
    accounts: RwLock<HashMap<CustomerId, Arc<RwLock<CustomerAccount>>>>,
}

impl CustomerLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the account for `customer_id`, materializing a
    /// zero-balance account on first use.
    pub async fn get_or_create(&self, customer_id: &CustomerId) -> Arc<RwLock<CustomerAccount>> {
        {
            let accounts = self.accounts.read().await;
            if let Some(account) = accounts.get(customer_id) {
                return Arc::clone(account);
            }
        }
        let mut accounts = self.accounts.write().await;
        Arc::clone(
            accounts
                .entry(customer_id.clone())
                .or_insert_with(|| Arc::new(RwLock::new(CustomerAccount::new(customer_id.clone())))),
        )
    }

    /// Credits `amount` to the customer's balance, returning the new
    /// balance. Serialized per customer by the account write lock.
    pub async fn credit(&self, customer_id: &CustomerId, amount: u64) -> u64 {
        let account = self.get_or_create(customer_id).await;
        let mut account = account.write().await;
        account.credit(amount)
    }

    /// Returns the customer's balance, or `None` if no account has been
    /// materialized for them yet.
    pub async fn balance(&self, customer_id: &CustomerId) -> Option<u64> {
        let accounts = self.accounts.read().await;
        let account = accounts.get(customer_id)?;
        let account = Arc::clone(account);
        drop(accounts);
        let balance = account.read().await.balance;
        Some(balance)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn settled_tx(match_id: MatchId) -> Transaction {
        Transaction::settled(CustomerId::from("CUST-1"), 500_000, "BCA".to_string(), match_id)
    }

    #[tokio::test]
    async fn record_settlement_once() {
        let ledger = TransactionLedger::new();
        let match_id = MatchId::new();

        let first = ledger.record_settlement(match_id, settled_tx(match_id)).await;
        assert!(matches!(first, Ok(SettleInsert::Created(_))));
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_settlement_returns_existing() {
        let ledger = TransactionLedger::new();
        let match_id = MatchId::new();

        let Ok(SettleInsert::Created(first)) =
            ledger.record_settlement(match_id, settled_tx(match_id)).await
        else {
            panic!("first settlement should insert");
        };

        let Ok(SettleInsert::AlreadySettled(second)) =
            ledger.record_settlement(match_id, settled_tx(match_id)).await
        else {
            panic!("second settlement should be deduplicated");
        };

        assert_eq!(first.id, second.id);
        assert_eq!(ledger.len().await, 1);
    }

    #[tokio::test]
    async fn insert_and_get_topup() {
        let ledger = TransactionLedger::new();
        let tx = Transaction::topup(
            CustomerId::from("CUST-2"),
            100_000,
            "BNI".to_string(),
            Utc::now() + Duration::hours(24),
        );
        let id = tx.id;
        ledger.insert(tx).await;

        let fetched = ledger.get(id).await;
        assert!(fetched.is_ok());
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let ledger = TransactionLedger::new();
        let result = ledger.get(TransactionId::new()).await;
        assert!(matches!(result, Err(ReconError::NotFound { .. })));
    }

    #[tokio::test]
    async fn snapshot_filters_by_status() {
        let ledger = TransactionLedger::new();
        let pending = Transaction::topup(
            CustomerId::from("CUST-2"),
            100_000,
            "BNI".to_string(),
            Utc::now() + Duration::hours(24),
        );
        ledger.insert(pending).await;
        let match_id = MatchId::new();
        let _ = ledger.record_settlement(match_id, settled_tx(match_id)).await;

        let successes = ledger
            .snapshot_filtered(|t| t.status == crate::domain::TransactionStatus::Success)
            .await;
        assert_eq!(successes.len(), 1);
    }

    #[tokio::test]
    async fn credits_serialize_and_accumulate() {
        let ledger = Arc::new(CustomerLedger::new());
        let customer = CustomerId::from("CUST-3");

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let ledger = Arc::clone(&ledger);
            let customer = customer.clone();
            tasks.push(tokio::spawn(async move {
                ledger.credit(&customer, 1_000).await;
            }));
        }
        for task in tasks {
            let _ = task.await;
        }

        assert_eq!(ledger.balance(&customer).await, Some(10_000));
    }

    #[tokio::test]
    async fn balance_of_unknown_customer_is_none() {
        let ledger = CustomerLedger::new();
        assert_eq!(ledger.balance(&CustomerId::from("nobody")).await, None);
    }
}
