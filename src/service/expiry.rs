//! Background expiry monitor for unconfirmed top-up transactions.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use super::SettlementService;

/// Spawns the periodic expiry sweep.
///
/// The first tick fires immediately, so transactions that expired while
/// the service was down are failed right at startup; after that the
/// sweep runs on the fixed `every` interval until the task is aborted.
pub fn spawn_expiry_monitor(
    settlement: Arc<SettlementService>,
    every: Duration,
) -> JoinHandle<()> {
    // tokio's interval() panics on a zero period.
    let every = every.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let expired = settlement.sweep_expired(Utc::now()).await;
            if !expired.is_empty() {
                tracing::info!(count = expired.len(), "expiry sweep failed unconfirmed transactions");
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{CustomerId, CustomerLedger, EventBus, TransactionLedger, TransactionStatus};
    use crate::ingest::TopupDraft;

    #[tokio::test]
    async fn monitor_sweeps_eagerly_and_periodically() {
        // A negative expiry window makes every new top-up born expired.
        let settlement = Arc::new(SettlementService::new(
            Arc::new(TransactionLedger::new()),
            Arc::new(CustomerLedger::new()),
            EventBus::new(100),
            chrono::Duration::seconds(-1),
        ));

        let tx = settlement
            .initiate_topup(TopupDraft {
                customer_id: CustomerId::from("CUST-1"),
                amount: 100_000,
                bank_code: "BNI".to_string(),
            })
            .await;

        let handle = spawn_expiry_monitor(Arc::clone(&settlement), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        let Ok(after) = settlement.transaction(tx.id).await else {
            panic!("transaction disappeared");
        };
        assert_eq!(after.status, TransactionStatus::Failed);
    }
}
