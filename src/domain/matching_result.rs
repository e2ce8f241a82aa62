//! Matching result: the candidate pairing of a webreport and a statement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{MatchId, StatementId, WebreportId};
use crate::error::ReconError;

/// Lifecycle states of a [`MatchingResult`].
///
/// `auto_matched` and `manual_review` both await a verification decision;
/// the engine never settles on its own. `verified` and `rejected` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// High-confidence pairing, still requires approval.
    AutoMatched,
    /// Plausible pairing flagged for a human decision.
    ManualReview,
    /// Approved; settlement has run.
    Verified,
    /// Declined; both records were released back to pending.
    Rejected,
}

impl MatchStatus {
    /// Returns `true` for the terminal states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Rejected)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AutoMatched => "auto_matched",
            Self::ManualReview => "manual_review",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

/// Per-criterion breakdown behind a match score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchDetails {
    /// Normalized virtual-account numbers are equal.
    pub va_match: bool,
    /// Amounts are exactly equal.
    pub amount_match: bool,
    /// Absolute distance between transfer and transaction dates, in hours.
    pub date_proximity_hours: f64,
}

/// A candidate pairing produced by the matching engine.
///
/// Created only by the matching engine; mutated only by the verification
/// workflow. Each webreport and each statement appears in at most one
/// non-rejected `MatchingResult` at a time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchingResult {
    /// Unique identifier (immutable after creation).
    pub id: MatchId,
    /// The claimed webreport.
    pub webreport_id: WebreportId,
    /// The claimed bank statement.
    pub statement_id: StatementId,
    /// Aggregate score, 0–100.
    pub match_score: u8,
    /// Criterion breakdown behind the score.
    pub match_details: MatchDetails,
    /// Current lifecycle state.
    pub status: MatchStatus,
    /// Operator or system actor that decided the match.
    pub verified_by: Option<String>,
    /// When the decision was made.
    pub verified_at: Option<DateTime<Utc>>,
    /// Optional decision notes.
    pub notes: Option<String>,
    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last status mutation.
    pub updated_at: DateTime<Utc>,
}

impl MatchingResult {
    /// Creates a new `MatchingResult` in the given non-terminal state.
    #[must_use]
    pub fn new(
        webreport_id: WebreportId,
        statement_id: StatementId,
        match_score: u8,
        match_details: MatchDetails,
        status: MatchStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: MatchId::new(),
            webreport_id,
            statement_id,
            match_score,
            match_details,
            status,
            verified_by: None,
            verified_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Guards the terminal-state invariant shared by approve and reject.
    /// A duplicate decision request must surface as a conflict, never as
    /// a second settlement.
    fn decide(
        &mut self,
        next: MatchStatus,
        verified_by: &str,
        notes: Option<String>,
    ) -> Result<(), ReconError> {
        if self.status.is_terminal() {
            return Err(ReconError::Conflict(format!(
                "matching result {} already {}",
                self.id, self.status
            )));
        }
        let now = Utc::now();
        self.status = next;
        self.verified_by = Some(verified_by.to_string());
        self.verified_at = Some(now);
        if notes.is_some() {
            self.notes = notes;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Approves the match (`auto_matched`/`manual_review` → `verified`).
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if the match is already terminal.
    pub fn approve(&mut self, verified_by: &str, notes: Option<String>) -> Result<(), ReconError> {
        self.decide(MatchStatus::Verified, verified_by, notes)
    }

    /// Rejects the match (`auto_matched`/`manual_review` → `rejected`).
    ///
    /// # Errors
    ///
    /// Returns [`ReconError::Conflict`] if the match is already terminal.
    pub fn reject(&mut self, verified_by: &str, notes: Option<String>) -> Result<(), ReconError> {
        self.decide(MatchStatus::Rejected, verified_by, notes)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_result(status: MatchStatus) -> MatchingResult {
        MatchingResult::new(
            WebreportId::new(),
            StatementId::new(),
            95,
            MatchDetails {
                va_match: true,
                amount_match: true,
                date_proximity_hours: 1.5,
            },
            status,
        )
    }

    #[test]
    fn approve_sets_audit_fields() {
        let mut m = make_result(MatchStatus::AutoMatched);
        assert!(m.approve("admin@ops", Some("looks good".to_string())).is_ok());
        assert_eq!(m.status, MatchStatus::Verified);
        assert_eq!(m.verified_by.as_deref(), Some("admin@ops"));
        assert!(m.verified_at.is_some());
        assert_eq!(m.notes.as_deref(), Some("looks good"));
    }

    #[test]
    fn reject_from_manual_review() {
        let mut m = make_result(MatchStatus::ManualReview);
        assert!(m.reject("admin@ops", None).is_ok());
        assert_eq!(m.status, MatchStatus::Rejected);
    }

    #[test]
    fn double_approve_is_conflict() {
        let mut m = make_result(MatchStatus::AutoMatched);
        assert!(m.approve("admin@ops", None).is_ok());
        assert!(matches!(
            m.approve("admin@ops", None),
            Err(ReconError::Conflict(_))
        ));
    }

    #[test]
    fn reject_after_approve_is_conflict() {
        let mut m = make_result(MatchStatus::ManualReview);
        assert!(m.approve("admin@ops", None).is_ok());
        assert!(matches!(
            m.reject("admin@ops", None),
            Err(ReconError::Conflict(_))
        ));
    }

    #[test]
    fn terminal_states() {
        assert!(MatchStatus::Verified.is_terminal());
        assert!(MatchStatus::Rejected.is_terminal());
        assert!(!MatchStatus::AutoMatched.is_terminal());
        assert!(!MatchStatus::ManualReview.is_terminal());
    }
}
