//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::{ReconService, SettlementService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Reconciliation service: ingestion, matching, verification.
    pub recon_service: Arc<ReconService>,
    /// Settlement service: transactions, top-ups, balances.
    pub settlement_service: Arc<SettlementService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
