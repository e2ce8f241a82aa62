//! Reconciliation service: ingestion, matching runs, and the
//! verification workflow.
//!
//! Every mutation method follows the same pattern as the rest of the
//! gateway: validate → acquire the record locks → compare-and-set →
//! emit events → return a snapshot.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{
    BankStatement, EventBus, MatchId, MatchStore, MatchingResult, ReconEvent, StatementSource,
    StatementStore, Webreport, WebreportStore,
};
use crate::error::{FieldError, ReconError};
use crate::ingest::{
    RowWarning, StatementBatchPayload, StatementPayload, WebreportPayload, validate_statement,
    validate_statement_batch, validate_webreport,
};
use crate::matching::{MatchCandidate, MatchingConfig, run_matching};

/// Decision taken on a matching result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyAction {
    /// Confirm the pairing and settle it.
    Approve,
    /// Decline the pairing and release both records.
    Reject,
}

/// Outcome of a batch import: accepted records plus per-row warnings.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Statements that were accepted and stored, in input order.
    pub accepted: Vec<BankStatement>,
    /// One warning per skipped row.
    pub warnings: Vec<RowWarning>,
}

/// Outcome of a matching run after materialization.
#[derive(Debug, Clone)]
pub struct MatchingRunReport {
    /// Matching results created by this run.
    pub matched: Vec<MatchingResult>,
    /// Pending webreports no candidate claimed.
    pub unmatched_webreports: Vec<Webreport>,
    /// Pending statements no candidate consumed.
    pub unmatched_statements: Vec<BankStatement>,
}

/// Orchestration layer for ingestion, matching, and verification.
#[derive(Debug)]
pub struct ReconService {
    webreports: Arc<WebreportStore>,
    statements: Arc<StatementStore>,
    matches: Arc<MatchStore>,
    settlement: Arc<super::SettlementService>,
    event_bus: EventBus,
    matching_defaults: MatchingConfig,
}

impl ReconService {
    /// Creates a new `ReconService`.
    #[must_use]
    pub fn new(
        webreports: Arc<WebreportStore>,
        statements: Arc<StatementStore>,
        matches: Arc<MatchStore>,
        settlement: Arc<super::SettlementService>,
        event_bus: EventBus,
        matching_defaults: MatchingConfig,
    ) -> Self {
        Self {
            webreports,
            statements,
            matches,
            settlement,
            event_bus,
            matching_defaults,
        }
    }

    /// Returns the server-default matching thresholds.
    #[must_use]
    pub const fn matching_defaults(&self) -> MatchingConfig {
        self.matching_defaults
    }

    /// Validates and stores a customer-submitted webreport.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Validation`] with the full field-error list
    /// if any required field is missing or invalid.
    pub async fn submit_webreport(
        &self,
        payload: &WebreportPayload,
    ) -> Result<Webreport, ReconError> {
        let draft = validate_webreport(payload).map_err(ReconError::Validation)?;
        let record = Webreport::new(
            draft.customer_id,
            draft.virtual_account_number,
            draft.amount,
            draft.transfer_date,
            draft.bank_sender,
            draft.notes,
        );
        let snapshot = record.clone();
        self.webreports.insert(record.id, record).await?;

        let _ = self.event_bus.publish(ReconEvent::WebreportSubmitted {
            webreport_id: snapshot.id,
            customer_id: snapshot.customer_id.clone(),
            amount: snapshot.amount,
            timestamp: Utc::now(),
        });
        tracing::info!(
            webreport_id = %snapshot.id,
            customer_id = %snapshot.customer_id,
            amount = snapshot.amount,
            "webreport submitted"
        );
        Ok(snapshot)
    }

    /// Validates and stores a single bank statement pushed over the API.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Validation`] with the full field-error list.
    pub async fn ingest_statement(
        &self,
        payload: &StatementPayload,
    ) -> Result<BankStatement, ReconError> {
        let draft = validate_statement(payload).map_err(ReconError::Validation)?;
        let record = BankStatement::new(
            StatementSource::Api,
            draft.bank_code,
            draft.account_number,
            draft.virtual_account_number,
            draft.amount,
            draft.transaction_date,
            draft.sender_name,
            draft.reference,
        );
        let snapshot = record.clone();
        self.statements.insert(record.id, record).await?;

        let _ = self.event_bus.publish(ReconEvent::StatementsIngested {
            source: StatementSource::Api,
            accepted: 1,
            skipped: 0,
            timestamp: Utc::now(),
        });
        tracing::info!(
            statement_id = %snapshot.id,
            bank_code = %snapshot.bank_code,
            amount = snapshot.amount,
            "bank statement received"
        );
        Ok(snapshot)
    }

    /// Validates and stores a batch of bank statements, skipping invalid
    /// rows. The batch succeeds as long as the batch-level fields are
    /// present; per-row failures come back as warnings.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Validation`] only for batch-level failures
    /// (missing bank code, empty statements array).
    pub async fn import_statements(
        &self,
        payload: &StatementBatchPayload,
    ) -> Result<ImportOutcome, ReconError> {
        let batch = validate_statement_batch(payload).map_err(ReconError::Validation)?;

        let mut accepted = Vec::with_capacity(batch.accepted.len());
        for draft in batch.accepted {
            let record = BankStatement::new(
                StatementSource::FileImport,
                draft.bank_code,
                draft.account_number,
                draft.virtual_account_number,
                draft.amount,
                draft.transaction_date,
                draft.sender_name,
                draft.reference,
            );
            let snapshot = record.clone();
            self.statements.insert(record.id, record).await?;
            accepted.push(snapshot);
        }

        #[allow(clippy::cast_possible_truncation)]
        let _ = self.event_bus.publish(ReconEvent::StatementsIngested {
            source: StatementSource::FileImport,
            accepted: accepted.len() as u32,
            skipped: batch.warnings.len() as u32,
            timestamp: Utc::now(),
        });
        tracing::info!(
            accepted = accepted.len(),
            skipped = batch.warnings.len(),
            "bank statement batch imported"
        );
        Ok(ImportOutcome {
            accepted,
            warnings: batch.warnings,
        })
    }

    /// Runs the matching engine over all pending records and materializes
    /// the resulting candidates. `config` overrides the server defaults
    /// for this run only.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError`] only on store-level failures; an empty
    /// matched set is a successful outcome.
    pub async fn run_matching(
        &self,
        config: Option<MatchingConfig>,
    ) -> Result<MatchingRunReport, ReconError> {
        let config = config.unwrap_or(self.matching_defaults);

        // Snapshot pending records in (created_at, id) order so separate
        // runs over the same stores are reproducible.
        let mut pending_webreports = self
            .webreports
            .snapshot_filtered(|w| w.status == crate::domain::WebreportStatus::Pending)
            .await;
        pending_webreports.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut pending_statements = self
            .statements
            .snapshot_filtered(|s| s.status == crate::domain::StatementStatus::Pending)
            .await;
        pending_statements.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let outcome = run_matching(&pending_webreports, &pending_statements, &config);

        let mut matched = Vec::with_capacity(outcome.matched.len());
        for candidate in outcome.matched {
            match self.materialize(candidate).await {
                Ok(result) => matched.push(result),
                // A record changed state between snapshot and claim; it
                // will be reconsidered on the next run.
                Err(err) => tracing::warn!(error = %err, "skipping stale match candidate"),
            }
        }

        tracing::info!(
            matched = matched.len(),
            unmatched_webreports = outcome.unmatched_webreports.len(),
            unmatched_statements = outcome.unmatched_statements.len(),
            "matching run finished"
        );
        Ok(MatchingRunReport {
            matched,
            unmatched_webreports: outcome.unmatched_webreports,
            unmatched_statements: outcome.unmatched_statements,
        })
    }

    /// Claims both records of a candidate and stores the matching result.
    async fn materialize(&self, candidate: MatchCandidate) -> Result<MatchingResult, ReconError> {
        let webreport_lock = self.webreports.get(candidate.webreport_id).await?;
        let statement_lock = self.statements.get(candidate.statement_id).await?;
        let mut webreport = webreport_lock.write().await;
        let mut statement = statement_lock.write().await;

        webreport.mark_matched(candidate.statement_id)?;
        if let Err(err) = statement.mark_matched(candidate.webreport_id) {
            // The statement was claimed since the snapshot; undo the
            // webreport claim and drop the candidate.
            let _ = webreport.release();
            return Err(err);
        }
        drop(webreport);
        drop(statement);

        let result = MatchingResult::new(
            candidate.webreport_id,
            candidate.statement_id,
            candidate.score,
            candidate.details,
            candidate.status,
        );
        let snapshot = result.clone();
        self.matches.insert(result.id, result).await?;

        let _ = self.event_bus.publish(ReconEvent::MatchCreated {
            match_id: snapshot.id,
            webreport_id: snapshot.webreport_id,
            statement_id: snapshot.statement_id,
            score: snapshot.match_score,
            status: snapshot.status,
            timestamp: Utc::now(),
        });
        tracing::info!(
            match_id = %snapshot.id,
            score = snapshot.match_score,
            status = %snapshot.status,
            "match candidate materialized"
        );
        Ok(snapshot)
    }

    /// Decides a matching result: approve settles it, reject releases
    /// both records back to `pending`. On approve, settlement runs
    /// before the match flips to `verified`, all under the match's write
    /// lock, so a verified match without a transaction cannot be
    /// observed.
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::NotFound`] for an unknown id and
    /// [`ReconError::Conflict`] if the result is already terminal.
    pub async fn verify(
        &self,
        match_id: MatchId,
        action: VerifyAction,
        verified_by: &str,
        notes: Option<String>,
    ) -> Result<MatchingResult, ReconError> {
        let match_lock = self.matches.get(match_id).await?;
        let mut result = match_lock.write().await;
        if result.status.is_terminal() {
            return Err(ReconError::Conflict(format!(
                "matching result {match_id} already {}",
                result.status
            )));
        }

        let webreport_lock = self.webreports.get(result.webreport_id).await?;
        let statement_lock = self.statements.get(result.statement_id).await?;

        match action {
            VerifyAction::Approve => {
                let (customer_id, amount) = {
                    let webreport = webreport_lock.read().await;
                    (webreport.customer_id.clone(), webreport.amount)
                };
                let bank_code = statement_lock.read().await.bank_code.clone();

                self.settlement
                    .settle_match(match_id, &customer_id, amount, &bank_code)
                    .await?;
                result.approve(verified_by, notes)?;
                webreport_lock.write().await.mark_verified()?;
                statement_lock.write().await.mark_processed()?;

                let _ = self.event_bus.publish(ReconEvent::MatchVerified {
                    match_id,
                    verified_by: verified_by.to_string(),
                    timestamp: Utc::now(),
                });
                tracing::info!(%match_id, verified_by, "match approved and settled");
            }
            VerifyAction::Reject => {
                result.reject(verified_by, notes)?;
                webreport_lock.write().await.release()?;
                statement_lock.write().await.release()?;

                let _ = self.event_bus.publish(ReconEvent::MatchRejected {
                    match_id,
                    verified_by: verified_by.to_string(),
                    timestamp: Utc::now(),
                });
                tracing::info!(%match_id, verified_by, "match rejected, records released");
            }
        }

        Ok(result.clone())
    }

    /// Returns snapshots of all webreports.
    pub async fn list_webreports(&self) -> Vec<Webreport> {
        let mut all = self.webreports.snapshot().await;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Returns snapshots of all bank statements.
    pub async fn list_statements(&self) -> Vec<BankStatement> {
        let mut all = self.statements.snapshot().await;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    /// Returns snapshots of all matching results.
    pub async fn list_matches(&self) -> Vec<MatchingResult> {
        let mut all = self.matches.snapshot().await;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }
}

/// Maps a raw action string to a [`VerifyAction`].
///
/// # Errors
///
/// Returns a single-field [`ReconError::Validation`] for anything other
/// than `"approve"` or `"reject"`.
pub fn parse_verify_action(raw: &str) -> Result<VerifyAction, ReconError> {
    match raw {
        "approve" => Ok(VerifyAction::Approve),
        "reject" => Ok(VerifyAction::Reject),
        _ => Err(ReconError::Validation(vec![FieldError::new(
            "action",
            "must be \"approve\" or \"reject\"",
        )])),
    }
}
