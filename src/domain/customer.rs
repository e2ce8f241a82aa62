//! Customer balance account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CustomerId;

/// A customer's single-currency balance in minor units.
///
/// Non-negative by construction: the only mutation is [`credit`], applied
/// by the settlement path at the moment a transaction reaches `success`.
///
/// [`credit`]: CustomerAccount::credit
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerAccount {
    /// Externally-assigned customer id.
    pub customer_id: CustomerId,
    /// Current balance in minor currency units.
    pub balance: u64,
    /// When the account record was first materialized here.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last credit.
    pub updated_at: DateTime<Utc>,
}

impl CustomerAccount {
    /// Creates a zero-balance account for the given customer.
    #[must_use]
    pub fn new(customer_id: CustomerId) -> Self {
        let now = Utc::now();
        Self {
            customer_id,
            balance: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds `amount` to the balance, returning the new balance. The
    /// caller must hold this account's write lock so credits serialize
    /// per customer.
    pub fn credit(&mut self, amount: u64) -> u64 {
        self.balance = self.balance.saturating_add(amount);
        self.updated_at = Utc::now();
        self.balance
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_account_starts_at_zero() {
        let account = CustomerAccount::new(CustomerId::from("CUST-1"));
        assert_eq!(account.balance, 0);
    }

    #[test]
    fn credits_accumulate() {
        let mut account = CustomerAccount::new(CustomerId::from("CUST-1"));
        assert_eq!(account.credit(100_000), 100_000);
        assert_eq!(account.credit(250_000), 350_000);
        assert_eq!(account.balance, 350_000);
    }
}
