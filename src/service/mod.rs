//! Service layer: business logic orchestration.
//!
//! [`ReconService`] coordinates ingestion, matching runs, and the
//! verification workflow; [`SettlementService`] owns the transaction
//! state machine and the single balance-credit point; the expiry
//! monitor sweeps unconfirmed top-ups past their deadline.

pub mod expiry;
pub mod recon_service;
pub mod settlement;

pub use expiry::spawn_expiry_monitor;
pub use recon_service::{
    ImportOutcome, MatchingRunReport, ReconService, VerifyAction, parse_verify_action,
};
pub use settlement::SettlementService;
