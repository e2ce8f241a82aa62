//! Greedy single-pass matcher.
//!
//! For every pending webreport, in input order, the engine scores all
//! still-unused pending statements and keeps the best one. A statement
//! consumed by one webreport is unavailable for the rest of the run, so
//! no record appears in more than one candidate per run. The pass does
//! not backtrack: a later webreport never reclaims an already-consumed
//! statement even if it would have scored higher.

use std::collections::HashSet;

use crate::domain::{
    BankStatement, MatchDetails, MatchStatus, StatementId, StatementStatus, Webreport, WebreportId,
    WebreportStatus,
};

/// Tunable thresholds for a matching run.
#[derive(Debug, Clone, Copy)]
pub struct MatchingConfig {
    /// Date-proximity window in hours; beyond it the date contributes 0.
    pub date_tolerance_hours: f64,
    /// Minimum score for the `auto_matched` classification.
    pub auto_match_threshold: u8,
    /// Minimum score for a candidate to be materialized at all.
    pub manual_review_threshold: u8,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            date_tolerance_hours: 24.0,
            auto_match_threshold: 90,
            manual_review_threshold: 50,
        }
    }
}

/// A pairing the engine proposes, before it is materialized as a
/// [`crate::domain::MatchingResult`].
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    /// The webreport side of the pairing.
    pub webreport_id: WebreportId,
    /// The statement side of the pairing.
    pub statement_id: StatementId,
    /// Aggregate score, 0–100.
    pub score: u8,
    /// Criterion breakdown behind the score.
    pub details: MatchDetails,
    /// Classification: `auto_matched` or `manual_review`.
    pub status: MatchStatus,
}

/// Everything a matching run produced: candidates plus the residual
/// unmatched records, echoed back still `pending`.
#[derive(Debug, Clone, Default)]
pub struct MatchingRunOutcome {
    /// Proposed pairings, in webreport input order.
    pub matched: Vec<MatchCandidate>,
    /// Pending webreports no candidate claimed.
    pub unmatched_webreports: Vec<Webreport>,
    /// Pending statements no candidate consumed.
    pub unmatched_statements: Vec<BankStatement>,
}

/// Runs one greedy matching pass over the given records.
///
/// Only records whose status is `pending` participate; everything else
/// is ignored. An empty `matched` set with all inputs echoed back as
/// unmatched is a valid, successful outcome — the engine never fails.
#[must_use]
pub fn run_matching(
    webreports: &[Webreport],
    statements: &[BankStatement],
    config: &MatchingConfig,
) -> MatchingRunOutcome {
    let pending_webreports: Vec<&Webreport> = webreports
        .iter()
        .filter(|w| w.status == WebreportStatus::Pending)
        .collect();
    let pending_statements: Vec<&BankStatement> = statements
        .iter()
        .filter(|s| s.status == StatementStatus::Pending)
        .collect();

    let mut matched = Vec::new();
    let mut used_webreports: HashSet<WebreportId> = HashSet::new();
    let mut used_statements: HashSet<StatementId> = HashSet::new();

    for webreport in &pending_webreports {
        let mut best: Option<(&&BankStatement, u8, MatchDetails)> = None;

        for statement in &pending_statements {
            if used_statements.contains(&statement.id) {
                continue;
            }
            let details = compute_details(webreport, statement);
            let score = compute_score(&details, config);

            // Strictly-greater keeps the first-seen statement on ties.
            let replace = match &best {
                None => true,
                Some((_, best_score, _)) => score > *best_score,
            };
            if replace {
                best = Some((statement, score, details));
            }
        }

        if let Some((statement, score, details)) = best
            && score >= config.manual_review_threshold
        {
            matched.push(MatchCandidate {
                webreport_id: webreport.id,
                statement_id: statement.id,
                score,
                details,
                status: classify(score, config),
            });
            used_webreports.insert(webreport.id);
            used_statements.insert(statement.id);
        }
    }

    let unmatched_webreports = pending_webreports
        .into_iter()
        .filter(|w| !used_webreports.contains(&w.id))
        .cloned()
        .collect();
    let unmatched_statements = pending_statements
        .into_iter()
        .filter(|s| !used_statements.contains(&s.id))
        .cloned()
        .collect();

    MatchingRunOutcome {
        matched,
        unmatched_webreports,
        unmatched_statements,
    }
}

/// Computes the per-criterion breakdown for one pair.
fn compute_details(webreport: &Webreport, statement: &BankStatement) -> MatchDetails {
    let va_match = normalize_va(&webreport.virtual_account_number)
        == normalize_va(&statement.virtual_account_number);
    let amount_match = webreport.amount == statement.amount;

    let diff_secs = webreport
        .transfer_date
        .signed_duration_since(statement.transaction_date)
        .num_seconds()
        .abs();
    #[allow(clippy::cast_precision_loss)]
    let date_proximity_hours = diff_secs as f64 / 3600.0;

    MatchDetails {
        va_match,
        amount_match,
        date_proximity_hours,
    }
}

/// Scores a pair: 50 for the VA, 40 for the amount, up to 10 decaying
/// linearly to 0 as the date proximity approaches the tolerance window.
fn compute_score(details: &MatchDetails, config: &MatchingConfig) -> u8 {
    let mut score = 0.0_f64;
    if details.va_match {
        score += 50.0;
    }
    if details.amount_match {
        score += 40.0;
    }
    if config.date_tolerance_hours > 0.0
        && details.date_proximity_hours <= config.date_tolerance_hours
    {
        let date_score = 10.0 * (1.0 - details.date_proximity_hours / config.date_tolerance_hours);
        score += date_score.max(0.0);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        score.round() as u8
    }
}

/// Classifies a materialized candidate by score.
const fn classify(score: u8, config: &MatchingConfig) -> MatchStatus {
    if score >= config.auto_match_threshold {
        MatchStatus::AutoMatched
    } else {
        MatchStatus::ManualReview
    }
}

/// Strips everything but ASCII digits, so `8808-1234` equals `88081234`.
fn normalize_va(va: &str) -> String {
    va.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{CustomerId, StatementSource};
    use chrono::{DateTime, Duration, Utc};

    fn base_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn webreport(va: &str, amount: u64, transfer_date: DateTime<Utc>) -> Webreport {
        Webreport::new(
            CustomerId::from("CUST-1"),
            va.to_string(),
            amount,
            transfer_date,
            "BCA".to_string(),
            None,
        )
    }

    fn statement(va: &str, amount: u64, transaction_date: DateTime<Utc>) -> BankStatement {
        BankStatement::new(
            StatementSource::Api,
            "BCA".to_string(),
            "1234567890".to_string(),
            va.to_string(),
            amount,
            transaction_date,
            None,
            None,
        )
    }

    #[test]
    fn perfect_match_scores_100_and_auto_matches() {
        let t = base_time();
        let webreports = vec![webreport("8808-1234", 500_000, t)];
        let statements = vec![statement("88081234", 500_000, t)];

        let outcome = run_matching(&webreports, &statements, &MatchingConfig::default());

        assert_eq!(outcome.matched.len(), 1);
        let Some(candidate) = outcome.matched.first() else {
            panic!("expected one candidate");
        };
        assert_eq!(candidate.score, 100);
        assert_eq!(candidate.status, MatchStatus::AutoMatched);
        assert!(candidate.details.va_match);
        assert!(candidate.details.amount_match);
        assert!(outcome.unmatched_webreports.is_empty());
        assert!(outcome.unmatched_statements.is_empty());
    }

    #[test]
    fn va_only_beyond_tolerance_scores_50_manual_review() {
        let t = base_time();
        let webreports = vec![webreport("8808", 500_000, t)];
        let statements = vec![statement("8808", 400_000, t - Duration::hours(30))];

        let outcome = run_matching(&webreports, &statements, &MatchingConfig::default());

        assert_eq!(outcome.matched.len(), 1);
        let Some(candidate) = outcome.matched.first() else {
            panic!("expected one candidate");
        };
        assert_eq!(candidate.score, 50);
        assert_eq!(candidate.status, MatchStatus::ManualReview);
        assert!(!candidate.details.amount_match);
    }

    #[test]
    fn exact_tolerance_boundary_contributes_zero_date_points() {
        let t = base_time();
        let webreports = vec![webreport("8808", 500_000, t)];
        let statements = vec![statement("8808", 500_000, t - Duration::hours(24))];

        let outcome = run_matching(&webreports, &statements, &MatchingConfig::default());

        let Some(candidate) = outcome.matched.first() else {
            panic!("expected one candidate");
        };
        assert_eq!(candidate.score, 90);
        assert_eq!(candidate.status, MatchStatus::AutoMatched);
    }

    #[test]
    fn below_review_threshold_is_not_materialized() {
        let t = base_time();
        // Different VA, different amount: only the date can contribute,
        // capped at 10 — below the 50 floor.
        let webreports = vec![webreport("8808", 500_000, t)];
        let statements = vec![statement("9999", 400_000, t)];

        let outcome = run_matching(&webreports, &statements, &MatchingConfig::default());

        assert!(outcome.matched.is_empty());
        assert_eq!(outcome.unmatched_webreports.len(), 1);
        assert_eq!(outcome.unmatched_statements.len(), 1);
    }

    #[test]
    fn statement_is_consumed_at_most_once() {
        let t = base_time();
        let webreports = vec![
            webreport("8808", 500_000, t),
            webreport("8808", 500_000, t),
        ];
        let statements = vec![statement("8808", 500_000, t)];

        let outcome = run_matching(&webreports, &statements, &MatchingConfig::default());

        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.unmatched_webreports.len(), 1);
        let mut seen = HashSet::new();
        for candidate in &outcome.matched {
            assert!(seen.insert(candidate.statement_id));
        }
    }

    #[test]
    fn highest_score_wins_regardless_of_position() {
        let t = base_time();
        let webreports = vec![webreport("8808", 500_000, t)];
        // First statement matches VA only; second matches VA and amount.
        let statements = vec![
            statement("8808", 123_456, t),
            statement("8808", 500_000, t),
        ];

        let outcome = run_matching(&webreports, &statements, &MatchingConfig::default());

        let Some(candidate) = outcome.matched.first() else {
            panic!("expected one candidate");
        };
        let Some(better) = statements.get(1) else {
            panic!("fixture missing");
        };
        assert_eq!(candidate.statement_id, better.id);
        assert_eq!(candidate.score, 100);
    }

    #[test]
    fn first_seen_wins_ties() {
        let t = base_time();
        let webreports = vec![webreport("8808", 500_000, t)];
        let statements = vec![
            statement("8808", 500_000, t),
            statement("8808", 500_000, t),
        ];

        let outcome = run_matching(&webreports, &statements, &MatchingConfig::default());

        let Some(candidate) = outcome.matched.first() else {
            panic!("expected one candidate");
        };
        let Some(first) = statements.first() else {
            panic!("fixture missing");
        };
        assert_eq!(candidate.statement_id, first.id);
    }

    #[test]
    fn non_pending_records_are_ignored() {
        let t = base_time();
        let mut claimed = webreport("8808", 500_000, t);
        let _ = claimed.mark_matched(StatementId::new());
        let webreports = vec![claimed];
        let statements = vec![statement("8808", 500_000, t)];

        let outcome = run_matching(&webreports, &statements, &MatchingConfig::default());

        assert!(outcome.matched.is_empty());
        assert!(outcome.unmatched_webreports.is_empty());
        assert_eq!(outcome.unmatched_statements.len(), 1);
    }

    #[test]
    fn empty_inputs_are_a_valid_outcome() {
        let outcome = run_matching(&[], &[], &MatchingConfig::default());
        assert!(outcome.matched.is_empty());
        assert!(outcome.unmatched_webreports.is_empty());
        assert!(outcome.unmatched_statements.is_empty());
    }

    #[test]
    fn custom_thresholds_shift_classification() {
        let t = base_time();
        let webreports = vec![webreport("8808", 500_000, t)];
        let statements = vec![statement("8808", 400_000, t)];

        let config = MatchingConfig {
            auto_match_threshold: 55,
            ..MatchingConfig::default()
        };
        let outcome = run_matching(&webreports, &statements, &config);

        // 50 (VA) + 10 (same instant) = 60, auto under the lowered bar.
        let Some(candidate) = outcome.matched.first() else {
            panic!("expected one candidate");
        };
        assert_eq!(candidate.score, 60);
        assert_eq!(candidate.status, MatchStatus::AutoMatched);
    }

    #[test]
    fn normalization_ignores_separators() {
        let t = base_time();
        let webreports = vec![webreport(" 8808-1234-5678 ", 500_000, t)];
        let statements = vec![statement("880812345678", 500_000, t)];

        let outcome = run_matching(&webreports, &statements, &MatchingConfig::default());
        assert_eq!(outcome.matched.len(), 1);
    }
}
