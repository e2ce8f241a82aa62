//! # recon-gateway
//!
//! REST API and WebSocket gateway for payment reconciliation. The
//! service matches customer-submitted transfer claims ("webreports")
//! against bank-sourced statements, drives a verification workflow over
//! the resulting candidates, and credits each customer balance exactly
//! once per confirmed transfer. Direct top-ups share the same
//! transaction state machine, with a background monitor expiring the
//! ones that miss their payment deadline.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── ReconService (service/)    ── ingestion, matching, verification
//!     ├── SettlementService (service/) ── transactions, balances, expiry
//!     ├── Matching Engine (matching/)
//!     ├── Validators (ingest/)
//!     │
//!     ├── Record Stores + Ledgers (domain/)
//!     ├── EventBus (domain/)
//!     │
//!     └── PostgreSQL Event Log (persistence/, optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod matching;
pub mod persistence;
pub mod service;
pub mod ws;
