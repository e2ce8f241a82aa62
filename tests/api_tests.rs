//! End-to-end REST tests: the full reconciliation flow over a real
//! listener, exercised with a plain HTTP client.

#![allow(clippy::panic)]

use std::sync::Arc;

use serde_json::{Value, json};

use recon_gateway::api;
use recon_gateway::app_state::AppState;
use recon_gateway::domain::{
    CustomerLedger, EventBus, MatchStore, StatementStore, TransactionLedger, WebreportStore,
};
use recon_gateway::error::EntityKind;
use recon_gateway::matching::MatchingConfig;
use recon_gateway::service::{ReconService, SettlementService};

/// Binds the gateway on an ephemeral port and returns its base URL.
async fn spawn_server() -> String {
    let event_bus = EventBus::new(1000);
    let settlement_service = Arc::new(SettlementService::new(
        Arc::new(TransactionLedger::new()),
        Arc::new(CustomerLedger::new()),
        event_bus.clone(),
        chrono::Duration::hours(24),
    ));
    let recon_service = Arc::new(ReconService::new(
        Arc::new(WebreportStore::new(EntityKind::Webreport)),
        Arc::new(StatementStore::new(EntityKind::BankStatement)),
        Arc::new(MatchStore::new(EntityKind::MatchingResult)),
        Arc::clone(&settlement_service),
        event_bus.clone(),
        MatchingConfig::default(),
    ));
    let app_state = AppState {
        recon_service,
        settlement_service,
        event_bus,
    };

    let app = api::build_router().with_state(app_state);
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("failed to read local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// Looks up a JSON field, defaulting to `Null`.
fn field<'a>(value: &'a Value, key: &str) -> &'a Value {
    value.get(key).unwrap_or(&Value::Null)
}

async fn body(response: reqwest::Response) -> Value {
    response.json::<Value>().await.unwrap_or(Value::Null)
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let Ok(response) = client.get(format!("{base}/health")).send().await else {
        panic!("health request failed");
    };
    assert_eq!(response.status(), 200);
    let json = body(response).await;
    assert_eq!(field(&json, "status").as_str(), Some("healthy"));
}

#[tokio::test]
async fn full_reconciliation_flow_credits_once() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    // Customer claims a transfer.
    let Ok(response) = client
        .post(format!("{base}/api/v1/webreports"))
        .json(&json!({
            "customer_id": "CUST-1",
            "virtual_account_number": "8808-1234-5678",
            "amount": 500_000,
            "transfer_date": "2025-03-14T10:00:00Z",
            "bank_sender": "BCA",
        }))
        .send()
        .await
    else {
        panic!("webreport request failed");
    };
    assert_eq!(response.status(), 201);

    // The bank pushes the matching statement.
    let Ok(response) = client
        .post(format!("{base}/api/v1/bank-statements?mode=api"))
        .json(&json!({
            "bank_code": "BCA",
            "account_number": "1234567890",
            "virtual_account_number": "880812345678",
            "amount": 500_000,
            "transaction_date": "2025-03-14T10:30:00Z",
            "sender_name": "PT Maju Jaya",
        }))
        .send()
        .await
    else {
        panic!("statement request failed");
    };
    assert_eq!(response.status(), 201);

    // A matching run pairs them with a perfect-ish score.
    let Ok(response) = client
        .post(format!("{base}/api/v1/matching/run"))
        .json(&json!({}))
        .send()
        .await
    else {
        panic!("matching run failed");
    };
    assert_eq!(response.status(), 200);
    let run = body(response).await;
    let Some(matched) = field(&run, "matched").as_array() else {
        panic!("matched missing");
    };
    assert_eq!(matched.len(), 1);
    let Some(first) = matched.first() else {
        panic!("no match");
    };
    assert_eq!(field(first, "status").as_str(), Some("auto_matched"));
    let match_id = field(first, "id").clone();

    // Approve it.
    let Ok(response) = client
        .patch(format!("{base}/api/v1/matching/verify"))
        .json(&json!({
            "matching_result_id": match_id,
            "action": "approve",
            "verified_by": "admin@ops",
        }))
        .send()
        .await
    else {
        panic!("verify request failed");
    };
    assert_eq!(response.status(), 200);
    let verified = body(response).await;
    assert_eq!(field(&verified, "status").as_str(), Some("verified"));

    // The balance was credited.
    let Ok(response) = client
        .get(format!("{base}/api/v1/customers/CUST-1/balance"))
        .send()
        .await
    else {
        panic!("balance request failed");
    };
    assert_eq!(response.status(), 200);
    let balance = body(response).await;
    assert_eq!(field(&balance, "balance"), 500_000);

    // A duplicate approve is a conflict, not a second credit.
    let Ok(response) = client
        .patch(format!("{base}/api/v1/matching/verify"))
        .json(&json!({
            "matching_result_id": match_id,
            "action": "approve",
            "verified_by": "admin@ops",
        }))
        .send()
        .await
    else {
        panic!("duplicate verify request failed");
    };
    assert_eq!(response.status(), 409);

    let Ok(response) = client
        .get(format!("{base}/api/v1/customers/CUST-1/balance"))
        .send()
        .await
    else {
        panic!("balance request failed");
    };
    let balance = body(response).await;
    assert_eq!(field(&balance, "balance"), 500_000);
}

#[tokio::test]
async fn batch_import_reports_skipped_rows() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let Ok(response) = client
        .post(format!("{base}/api/v1/bank-statements?mode=file_import"))
        .json(&json!({
            "bank_code": "BCA",
            "account_number": "1234567890",
            "statements": [
                {"virtual_account_number": "8808-0001", "amount": 100_000, "transaction_date": "2025-03-14"},
                {"virtual_account_number": "8808-0002", "amount": 200_000, "transaction_date": "2025-03-14"},
                {"virtual_account_number": "8808-0003", "amount": 0, "transaction_date": "2025-03-14"},
                {"virtual_account_number": "8808-0004", "amount": 400_000, "transaction_date": "2025-03-14"},
            ],
        }))
        .send()
        .await
    else {
        panic!("import request failed");
    };
    assert_eq!(response.status(), 201);

    let json = body(response).await;
    assert_eq!(field(&json, "imported"), 3);
    let Some(warnings) = field(&json, "warnings").as_array() else {
        panic!("warnings missing");
    };
    assert_eq!(warnings.len(), 1);
    let Some(warning) = warnings.first() else {
        panic!("warning missing");
    };
    assert_eq!(field(warning, "row"), 3);
}

#[tokio::test]
async fn invalid_webreport_returns_field_errors() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let Ok(response) = client
        .post(format!("{base}/api/v1/webreports"))
        .json(&json!({"customer_id": "CUST-1", "amount": 0}))
        .send()
        .await
    else {
        panic!("webreport request failed");
    };
    assert_eq!(response.status(), 400);

    let json = body(response).await;
    let error = field(&json, "error");
    assert_eq!(field(error, "code"), 1001);
    let Some(details) = field(error, "details").as_array() else {
        panic!("details missing");
    };
    assert!(details.len() >= 3);
}

#[tokio::test]
async fn topup_lifecycle_is_idempotent() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let Ok(response) = client
        .post(format!("{base}/api/v1/topups"))
        .json(&json!({"customer_id": "CUST-9", "amount": 250_000, "bank_code": "BNI"}))
        .send()
        .await
    else {
        panic!("topup request failed");
    };
    assert_eq!(response.status(), 201);
    let tx = body(response).await;
    assert_eq!(field(&tx, "status").as_str(), Some("pending"));
    assert!(!field(&tx, "expires_at").is_null());
    let Some(tx_id) = field(&tx, "id").as_str().map(ToString::to_string) else {
        panic!("transaction id missing");
    };

    // Confirm twice; the second call is a no-op.
    for _ in 0..2 {
        let Ok(response) = client
            .post(format!("{base}/api/v1/topups/{tx_id}/confirm"))
            .send()
            .await
        else {
            panic!("confirm request failed");
        };
        assert_eq!(response.status(), 200);
        let confirmed = body(response).await;
        assert_eq!(field(&confirmed, "status").as_str(), Some("success"));
    }

    let Ok(response) = client
        .get(format!("{base}/api/v1/customers/CUST-9/balance"))
        .send()
        .await
    else {
        panic!("balance request failed");
    };
    let balance = body(response).await;
    assert_eq!(field(&balance, "balance"), 250_000);
}

#[tokio::test]
async fn verify_unknown_match_is_404() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let Ok(response) = client
        .patch(format!("{base}/api/v1/matching/verify"))
        .json(&json!({
            "matching_result_id": uuid::Uuid::new_v4(),
            "action": "reject",
            "verified_by": "admin@ops",
        }))
        .send()
        .await
    else {
        panic!("verify request failed");
    };
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn rejected_match_is_eligible_again() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let Ok(_) = client
        .post(format!("{base}/api/v1/webreports"))
        .json(&json!({
            "customer_id": "CUST-2",
            "virtual_account_number": "8808-7777",
            "amount": 300_000,
            "transfer_date": "2025-03-14T08:00:00Z",
            "bank_sender": "BRI",
        }))
        .send()
        .await
    else {
        panic!("webreport request failed");
    };
    let Ok(_) = client
        .post(format!("{base}/api/v1/bank-statements?mode=api"))
        .json(&json!({
            "bank_code": "BRI",
            "virtual_account_number": "88087777",
            "amount": 300_000,
            "transaction_date": "2025-03-14T09:00:00Z",
        }))
        .send()
        .await
    else {
        panic!("statement request failed");
    };

    let Ok(response) = client
        .post(format!("{base}/api/v1/matching/run"))
        .json(&json!({}))
        .send()
        .await
    else {
        panic!("matching run failed");
    };
    let run = body(response).await;
    let Some(first) = field(&run, "matched").as_array().and_then(|m| m.first()).cloned() else {
        panic!("no match");
    };
    let match_id = field(&first, "id").clone();

    let Ok(response) = client
        .patch(format!("{base}/api/v1/matching/verify"))
        .json(&json!({
            "matching_result_id": match_id,
            "action": "reject",
            "verified_by": "admin@ops",
            "notes": "sender mismatch",
        }))
        .send()
        .await
    else {
        panic!("reject request failed");
    };
    assert_eq!(response.status(), 200);

    // Both records went back to pending, so a second run re-pairs them.
    let Ok(response) = client
        .post(format!("{base}/api/v1/matching/run"))
        .json(&json!({}))
        .send()
        .await
    else {
        panic!("second matching run failed");
    };
    let rerun = body(response).await;
    let Some(matched) = field(&rerun, "matched").as_array() else {
        panic!("matched missing");
    };
    assert_eq!(matched.len(), 1);
}
