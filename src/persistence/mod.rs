//! Persistence layer: PostgreSQL event log.
//!
//! Optional durable audit trail of every domain event. When enabled, a
//! background task drains the event bus into the `recon_events` table.

pub mod models;
pub mod postgres;

pub use postgres::EventLog;
