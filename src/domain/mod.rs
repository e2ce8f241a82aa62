//! Domain layer: entities, record stores, ledgers, and the event system.
//!
//! This module contains the server-side domain model: typed record ids,
//! the four reconciliation entities with their compare-and-set status
//! transitions, concurrent keyed stores, the transaction/customer
//! ledgers, and the event bus for broadcasting state changes.

pub mod customer;
pub mod event;
pub mod event_bus;
pub mod ids;
pub mod ledger;
pub mod matching_result;
pub mod statement;
pub mod store;
pub mod transaction;
pub mod webreport;

pub use customer::CustomerAccount;
pub use event::ReconEvent;
pub use event_bus::EventBus;
pub use ids::{CustomerId, MatchId, StatementId, TransactionId, WebreportId};
pub use ledger::{CustomerLedger, SettleInsert, TransactionLedger};
pub use matching_result::{MatchDetails, MatchStatus, MatchingResult};
pub use statement::{BankStatement, StatementSource, StatementStatus};
pub use store::{EntityStore, MatchStore, StatementStore, WebreportStore};
pub use transaction::{Transaction, TransactionStatus};
pub use webreport::{Webreport, WebreportStatus};
