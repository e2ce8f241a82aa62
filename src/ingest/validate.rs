//! Field validators for inbound payloads.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::CustomerId;
use crate::error::FieldError;

/// Raw webreport submission payload, before validation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct WebreportPayload {
    /// Submitting customer id.
    pub customer_id: Option<String>,
    /// Virtual account the customer transferred to.
    pub virtual_account_number: Option<String>,
    /// Claimed amount in minor currency units.
    pub amount: Option<i64>,
    /// When the transfer happened (RFC 3339 or `YYYY-MM-DD[ HH:MM:SS]`).
    pub transfer_date: Option<String>,
    /// Bank the customer transferred from.
    pub bank_sender: Option<String>,
    /// Optional free-form note.
    pub notes: Option<String>,
}

/// Raw single bank-statement payload (webhook/API push), before validation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StatementPayload {
    /// Code of the reporting bank.
    pub bank_code: Option<String>,
    /// Settlement account the money landed in.
    pub account_number: Option<String>,
    /// Virtual account that received the transfer.
    pub virtual_account_number: Option<String>,
    /// Amount in minor currency units.
    pub amount: Option<i64>,
    /// When the bank recorded the movement.
    pub transaction_date: Option<String>,
    /// Sender name as reported by the bank.
    pub sender_name: Option<String>,
    /// Bank-side reference string.
    pub reference: Option<String>,
}

/// One row of a batch import payload.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StatementRowPayload {
    /// Virtual account that received the transfer.
    pub virtual_account_number: Option<String>,
    /// Amount in minor currency units.
    pub amount: Option<i64>,
    /// When the bank recorded the movement.
    pub transaction_date: Option<String>,
    /// Sender name as reported by the bank.
    pub sender_name: Option<String>,
    /// Bank-side reference string.
    pub reference: Option<String>,
}

/// Raw batch import payload (bank-exported file), before validation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StatementBatchPayload {
    /// Code of the reporting bank, shared by every row.
    pub bank_code: Option<String>,
    /// Settlement account, shared by every row.
    pub account_number: Option<String>,
    /// The exported rows.
    pub statements: Option<Vec<StatementRowPayload>>,
}

/// Raw top-up request payload, before validation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TopupPayload {
    /// Customer initiating the top-up.
    pub customer_id: Option<String>,
    /// Top-up amount in minor currency units.
    pub amount: Option<i64>,
    /// Bank the payment will move through.
    pub bank_code: Option<String>,
}

/// A validated webreport submission, ready to become a domain record.
#[derive(Debug, Clone)]
pub struct WebreportDraft {
    /// Submitting customer.
    pub customer_id: CustomerId,
    /// Virtual account, trimmed.
    pub virtual_account_number: String,
    /// Positive amount in minor units.
    pub amount: u64,
    /// Parsed transfer date.
    pub transfer_date: DateTime<Utc>,
    /// Sending bank, trimmed.
    pub bank_sender: String,
    /// Optional note, passed through.
    pub notes: Option<String>,
}

/// A validated bank-statement record, ready to become a domain record.
#[derive(Debug, Clone)]
pub struct StatementDraft {
    /// Reporting bank code, trimmed.
    pub bank_code: String,
    /// Settlement account (may be empty; banks do not always export it).
    pub account_number: String,
    /// Virtual account, trimmed.
    pub virtual_account_number: String,
    /// Positive amount in minor units.
    pub amount: u64,
    /// Parsed transaction date.
    pub transaction_date: DateTime<Utc>,
    /// Sender name, passed through.
    pub sender_name: Option<String>,
    /// Reference, passed through.
    pub reference: Option<String>,
}

/// A skipped batch row, reported alongside the accepted rows.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RowWarning {
    /// 1-based index into the submitted statements array.
    pub row: usize,
    /// Why the row was skipped.
    pub message: String,
}

/// Outcome of a best-effort batch validation.
#[derive(Debug, Clone, Default)]
pub struct BatchDraft {
    /// Rows that passed validation, in input order.
    pub accepted: Vec<StatementDraft>,
    /// One warning per skipped row.
    pub warnings: Vec<RowWarning>,
}

/// A validated top-up request.
#[derive(Debug, Clone)]
pub struct TopupDraft {
    /// Initiating customer.
    pub customer_id: CustomerId,
    /// Positive amount in minor units.
    pub amount: u64,
    /// Bank code, trimmed.
    pub bank_code: String,
}

/// Validates a webreport submission. All-or-nothing: any missing or
/// invalid field aborts with the full accumulated error list.
///
/// # Errors
///
/// Returns every [`FieldError`] found, never just the first.
pub fn validate_webreport(payload: &WebreportPayload) -> Result<WebreportDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let customer_id = require_string(&mut errors, "customer_id", payload.customer_id.as_deref());
    let virtual_account_number = require_string(
        &mut errors,
        "virtual_account_number",
        payload.virtual_account_number.as_deref(),
    );
    let amount = require_amount(&mut errors, "amount", payload.amount);
    let transfer_date = require_date(&mut errors, "transfer_date", payload.transfer_date.as_deref());
    let bank_sender = require_string(&mut errors, "bank_sender", payload.bank_sender.as_deref());

    match (
        customer_id,
        virtual_account_number,
        amount,
        transfer_date,
        bank_sender,
    ) {
        (Some(customer_id), Some(virtual_account_number), Some(amount), Some(transfer_date), Some(bank_sender))
            if errors.is_empty() =>
        {
            Ok(WebreportDraft {
                customer_id: CustomerId::new(customer_id),
                virtual_account_number,
                amount,
                transfer_date,
                bank_sender,
                notes: payload.notes.clone(),
            })
        }
        _ => Err(errors),
    }
}

/// Validates a single bank-statement payload. All-or-nothing, like
/// [`validate_webreport`].
///
/// # Errors
///
/// Returns every [`FieldError`] found.
pub fn validate_statement(payload: &StatementPayload) -> Result<StatementDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let bank_code = require_string(&mut errors, "bank_code", payload.bank_code.as_deref());
    let row = StatementRowPayload {
        virtual_account_number: payload.virtual_account_number.clone(),
        amount: payload.amount,
        transaction_date: payload.transaction_date.clone(),
        sender_name: payload.sender_name.clone(),
        reference: payload.reference.clone(),
    };
    let draft = validate_row(&row, bank_code, payload.account_number.as_deref(), &mut errors);

    match draft {
        Some(draft) if errors.is_empty() => Ok(draft),
        _ => Err(errors),
    }
}

/// Validates a batch import. Batch-level required fields (bank code,
/// non-empty statements array) fail the whole batch; individual bad rows
/// are skipped and reported as warnings instead.
///
/// # Errors
///
/// Returns batch-level [`FieldError`]s only; row failures are warnings.
pub fn validate_statement_batch(
    payload: &StatementBatchPayload,
) -> Result<BatchDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let bank_code = require_string(&mut errors, "bank_code", payload.bank_code.as_deref());
    let rows = match payload.statements.as_deref() {
        Some([]) | None => {
            errors.push(FieldError::new("statements", "is required"));
            &[][..]
        }
        Some(rows) => rows,
    };

    let Some(bank_code) = bank_code else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut batch = BatchDraft::default();
    for (index, row) in rows.iter().enumerate() {
        let mut row_errors = Vec::new();
        let draft = validate_row(
            row,
            Some(bank_code.clone()),
            payload.account_number.as_deref(),
            &mut row_errors,
        );
        match draft {
            Some(draft) if row_errors.is_empty() => batch.accepted.push(draft),
            _ => batch.warnings.push(RowWarning {
                row: index + 1,
                message: join_errors(&row_errors),
            }),
        }
    }

    Ok(batch)
}

/// Validates a top-up request. All-or-nothing.
///
/// # Errors
///
/// Returns every [`FieldError`] found.
pub fn validate_topup(payload: &TopupPayload) -> Result<TopupDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let customer_id = require_string(&mut errors, "customer_id", payload.customer_id.as_deref());
    let amount = require_amount(&mut errors, "amount", payload.amount);
    let bank_code = require_string(&mut errors, "bank_code", payload.bank_code.as_deref());

    match (customer_id, amount, bank_code) {
        (Some(customer_id), Some(amount), Some(bank_code)) if errors.is_empty() => Ok(TopupDraft {
            customer_id: CustomerId::new(customer_id),
            amount,
            bank_code,
        }),
        _ => Err(errors),
    }
}

/// Shared row checks for both single and batch statement modes.
fn validate_row(
    row: &StatementRowPayload,
    bank_code: Option<String>,
    account_number: Option<&str>,
    errors: &mut Vec<FieldError>,
) -> Option<StatementDraft> {
    let virtual_account_number = require_string(
        errors,
        "virtual_account_number",
        row.virtual_account_number.as_deref(),
    );
    let amount = require_amount(errors, "amount", row.amount);
    let transaction_date = require_date(errors, "transaction_date", row.transaction_date.as_deref());

    Some(StatementDraft {
        bank_code: bank_code?,
        account_number: account_number.unwrap_or_default().trim().to_string(),
        virtual_account_number: virtual_account_number?,
        amount: amount?,
        transaction_date: transaction_date?,
        sender_name: row.sender_name.clone(),
        reference: row.reference.clone(),
    })
}

/// Requires a non-empty string field, returning the trimmed value.
fn require_string(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
    }
}

/// Requires a strictly positive amount.
fn require_amount(errors: &mut Vec<FieldError>, field: &str, value: Option<i64>) -> Option<u64> {
    match value {
        Some(v) if v > 0 => u64::try_from(v).ok(),
        Some(_) => {
            errors.push(FieldError::new(field, "must be greater than 0"));
            None
        }
        None => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
    }
}

/// Requires a parseable date field.
fn require_date(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
) -> Option<DateTime<Utc>> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        errors.push(FieldError::new(field, "is required"));
        return None;
    };
    match parse_date(raw) {
        Some(parsed) => Some(parsed),
        None => {
            errors.push(FieldError::new(field, "is not a valid date"));
            None
        }
    }
}

/// Parses RFC 3339, `YYYY-MM-DD HH:MM:SS`, or bare `YYYY-MM-DD` (UTC
/// midnight). Bank exports are inconsistent about which they use.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(parsed.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

/// Joins row-level field errors into one warning message.
fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn valid_webreport_payload() -> WebreportPayload {
        WebreportPayload {
            customer_id: Some("CUST-1".to_string()),
            virtual_account_number: Some("8808-1234-5678".to_string()),
            amount: Some(500_000),
            transfer_date: Some("2025-03-14T10:30:00Z".to_string()),
            bank_sender: Some("BCA".to_string()),
            notes: None,
        }
    }

    #[test]
    fn valid_webreport_produces_draft() {
        let result = validate_webreport(&valid_webreport_payload());
        let Ok(draft) = result else {
            panic!("expected a valid draft");
        };
        assert_eq!(draft.amount, 500_000);
        assert_eq!(draft.customer_id.as_str(), "CUST-1");
        assert_eq!(draft.virtual_account_number, "8808-1234-5678");
    }

    #[test]
    fn empty_payload_accumulates_all_errors() {
        let result = validate_webreport(&WebreportPayload::default());
        let Err(errors) = result else {
            panic!("expected errors");
        };
        assert_eq!(errors.len(), 5);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"virtual_account_number"));
        assert!(fields.contains(&"amount"));
        assert!(fields.contains(&"transfer_date"));
        assert!(fields.contains(&"bank_sender"));
        assert!(fields.contains(&"customer_id"));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let payload = WebreportPayload {
            amount: Some(0),
            ..valid_webreport_payload()
        };
        let Err(errors) = validate_webreport(&payload) else {
            panic!("expected errors");
        };
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().any(|e| e.field == "amount"));
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let payload = WebreportPayload {
            transfer_date: Some("next tuesday".to_string()),
            ..valid_webreport_payload()
        };
        let Err(errors) = validate_webreport(&payload) else {
            panic!("expected errors");
        };
        assert!(errors.iter().any(|e| e.field == "transfer_date"));
    }

    #[test]
    fn accepts_common_bank_date_formats() {
        for raw in ["2025-03-14T10:30:00+07:00", "2025-03-14 10:30:00", "2025-03-14"] {
            let payload = WebreportPayload {
                transfer_date: Some(raw.to_string()),
                ..valid_webreport_payload()
            };
            assert!(validate_webreport(&payload).is_ok(), "rejected {raw}");
        }
    }

    #[test]
    fn single_statement_requires_bank_code() {
        let payload = StatementPayload {
            bank_code: None,
            virtual_account_number: Some("8808".to_string()),
            amount: Some(100),
            transaction_date: Some("2025-03-14".to_string()),
            ..StatementPayload::default()
        };
        let Err(errors) = validate_statement(&payload) else {
            panic!("expected errors");
        };
        assert_eq!(errors.len(), 1);
        assert!(errors.iter().any(|e| e.field == "bank_code"));
    }

    fn batch_row(va: &str, amount: i64) -> StatementRowPayload {
        StatementRowPayload {
            virtual_account_number: Some(va.to_string()),
            amount: Some(amount),
            transaction_date: Some("2025-03-14 09:00:00".to_string()),
            sender_name: None,
            reference: None,
        }
    }

    #[test]
    fn batch_skips_invalid_rows_with_warnings() {
        let payload = StatementBatchPayload {
            bank_code: Some("BCA".to_string()),
            account_number: Some("1234567890".to_string()),
            statements: Some(vec![
                batch_row("8808-0001", 100_000),
                batch_row("8808-0002", 200_000),
                batch_row("8808-0003", 0),
                batch_row("8808-0004", 400_000),
            ]),
        };

        let Ok(batch) = validate_statement_batch(&payload) else {
            panic!("batch-level validation should pass");
        };
        assert_eq!(batch.accepted.len(), 3);
        assert_eq!(batch.warnings.len(), 1);
        let Some(warning) = batch.warnings.first() else {
            panic!("expected a warning");
        };
        assert_eq!(warning.row, 3);
        assert!(warning.message.contains("amount"));
    }

    #[test]
    fn batch_without_bank_code_fails_entirely() {
        let payload = StatementBatchPayload {
            bank_code: None,
            account_number: None,
            statements: Some(vec![batch_row("8808-0001", 100_000)]),
        };
        assert!(validate_statement_batch(&payload).is_err());
    }

    #[test]
    fn batch_without_rows_fails_entirely() {
        let payload = StatementBatchPayload {
            bank_code: Some("BCA".to_string()),
            account_number: None,
            statements: Some(vec![]),
        };
        assert!(validate_statement_batch(&payload).is_err());
    }

    #[test]
    fn topup_validation_collects_errors() {
        let Err(errors) = validate_topup(&TopupPayload::default()) else {
            panic!("expected errors");
        };
        assert_eq!(errors.len(), 3);

        let payload = TopupPayload {
            customer_id: Some("CUST-1".to_string()),
            amount: Some(100_000),
            bank_code: Some("BNI".to_string()),
        };
        assert!(validate_topup(&payload).is_ok());
    }
}
