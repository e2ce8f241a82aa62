//! REST endpoint handlers organized by resource.

pub mod customer;
pub mod matching;
pub mod statement;
pub mod system;
pub mod topup;
pub mod webreport;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(webreport::routes())
        .merge(statement::routes())
        .merge(matching::routes())
        .merge(topup::routes())
        .merge(customer::routes())
}
