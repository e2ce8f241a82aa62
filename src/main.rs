//! recon-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, the
//! background expiry monitor, and (when enabled) the event-log writer.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use recon_gateway::api;
use recon_gateway::app_state::AppState;
use recon_gateway::config::ReconConfig;
use recon_gateway::domain::{
    CustomerLedger, EventBus, MatchStore, StatementStore, TransactionLedger, WebreportStore,
};
use recon_gateway::error::EntityKind;
use recon_gateway::persistence::EventLog;
use recon_gateway::service::{ReconService, SettlementService, spawn_expiry_monitor};
use recon_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ReconConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting recon-gateway");

    // Build domain layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let webreports = Arc::new(WebreportStore::new(EntityKind::Webreport));
    let statements = Arc::new(StatementStore::new(EntityKind::BankStatement));
    let matches = Arc::new(MatchStore::new(EntityKind::MatchingResult));
    let transactions = Arc::new(TransactionLedger::new());
    let customers = Arc::new(CustomerLedger::new());

    // Build service layer
    let topup_expiry =
        chrono::Duration::seconds(i64::try_from(config.topup_expiry_secs).unwrap_or(i64::MAX));
    let settlement_service = Arc::new(SettlementService::new(
        transactions,
        customers,
        event_bus.clone(),
        topup_expiry,
    ));
    let recon_service = Arc::new(ReconService::new(
        webreports,
        statements,
        matches,
        Arc::clone(&settlement_service),
        event_bus.clone(),
        config.matching(),
    ));

    // Background expiry sweep: eager first tick, then fixed interval
    let _expiry_task = spawn_expiry_monitor(
        Arc::clone(&settlement_service),
        std::time::Duration::from_secs(config.expiry_sweep_interval_secs),
    );

    // Optional durable event log
    if config.persistence_enabled {
        let event_log = EventLog::connect(&config).await?;
        if config.event_log_cleanup_after_days > 0 {
            match event_log
                .delete_events_before(config.event_log_cleanup_after_days)
                .await
            {
                Ok(deleted) if deleted > 0 => {
                    tracing::info!(deleted, "pruned old events from the log");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "event log cleanup failed"),
            }
        }
        spawn_event_log_writer(event_log, event_bus.clone());
    }

    // Build application state
    let app_state = AppState {
        recon_service,
        settlement_service,
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Drains the event bus into the PostgreSQL event log.
fn spawn_event_log_writer(event_log: EventLog, event_bus: EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_value(&event) {
                    Ok(payload) => {
                        if let Err(e) = event_log.save_event(event.event_type_str(), &payload).await
                        {
                            tracing::warn!(error = %e, "failed to append event to the log");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event log writer lagged behind the bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
