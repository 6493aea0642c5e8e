//! Protocol rule evaluation.
//!
//! Applies each threshold configured on a [`ProtocolDefinition`] to a
//! patient's [`ClinicalFacts`] and emits one [`RuleOutcome`] per applicable
//! rule. Rules whose threshold is absent are skipped entirely, not emitted
//! as passes.
//!
//! Evaluation order is fixed: visit recency, then A1c ceiling, then A1c
//! recency. This order determines the order of deny reasons and must stay
//! stable so reviewers see reproducible output.
//!
//! "Today" is an explicit parameter. Nothing here reads the wall clock, so
//! a fixed `(protocol, facts, today)` triple always evaluates identically.

use crate::constants::{A1C_LAB_CODE, AVG_DAYS_PER_MONTH};
use crate::facts::ClinicalFacts;
use crate::protocol::ProtocolDefinition;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The protocol rule kinds, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// The patient must have been seen within a maximum number of months.
    VisitRecency,
    /// The latest A1c value must not exceed a ceiling.
    A1cCeiling,
    /// An A1c result must exist and be recent enough.
    A1cRecency,
}

/// The outcome of one applicable protocol rule.
///
/// The sequence of outcomes is both the input to decision aggregation and
/// the audit breakdown shown to a human reviewer. Both consumers read the
/// same evaluation; neither recomputes rules on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule: RuleKind,
    /// Reviewer-facing caption, e.g. "Last Visit < 12mo".
    pub label: String,
    /// Human-readable observed value, e.g. "13.2 months" or "no result".
    pub observed: String,
    pub passed: bool,
    /// Violation message, present when the rule failed.
    pub explanation: Option<String>,
}

impl RuleOutcome {
    fn pass(rule: RuleKind, label: String, observed: String) -> Self {
        Self {
            rule,
            label,
            observed,
            passed: true,
            explanation: None,
        }
    }

    fn fail(rule: RuleKind, label: String, observed: String, explanation: String) -> Self {
        Self {
            rule,
            label,
            observed,
            passed: false,
            explanation: Some(explanation),
        }
    }
}

/// Elapsed time between two dates in average months (`days / 30.4`).
///
/// Negative when `from` is after `to`; a future-dated anomaly then
/// trivially passes every strict `>` threshold check.
pub fn elapsed_months(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / AVG_DAYS_PER_MONTH
}

/// Evaluates every applicable protocol rule against the facts.
///
/// Returns one outcome per rule whose threshold is configured, in the
/// fixed evaluation order. Comparisons are strict: an elapsed time or lab
/// value exactly equal to its threshold passes.
pub fn evaluate_protocol(
    protocol: &ProtocolDefinition,
    facts: &ClinicalFacts,
    today: NaiveDate,
) -> Vec<RuleOutcome> {
    let mut outcomes = Vec::new();

    if let Some(max_months) = protocol.max_months_since_visit {
        outcomes.push(check_visit_recency(facts, max_months, today));
    }
    if let Some(max_value) = protocol.max_a1c_value {
        outcomes.push(check_a1c_ceiling(facts, max_value));
    }
    if let Some(max_months) = protocol.require_recent_a1c {
        outcomes.push(check_a1c_recency(facts, max_months, today));
    }

    outcomes
}

fn check_visit_recency(facts: &ClinicalFacts, max_months: u32, today: NaiveDate) -> RuleOutcome {
    let label = format!("Last Visit < {max_months}mo");
    // A missing visit date cannot be scored and does not count as a
    // violation. Flagged for product-owner clarification; see DESIGN.md.
    let Some(visit) = facts.last_visit_date else {
        return RuleOutcome::pass(RuleKind::VisitRecency, label, "unknown".to_owned());
    };

    let months = elapsed_months(visit, today);
    if months > f64::from(max_months) {
        RuleOutcome::fail(
            RuleKind::VisitRecency,
            label,
            format!("{months:.1} months"),
            format!(
                "Patient last visit was {months:.1} months ago. \
                 Protocol violation (max {max_months})."
            ),
        )
    } else {
        RuleOutcome::pass(RuleKind::VisitRecency, label, format!("{months:.1} months"))
    }
}

fn check_a1c_ceiling(facts: &ClinicalFacts, max_value: f64) -> RuleOutcome {
    let label = format!("A1c < {max_value}");
    // No A1c value while a ceiling is configured fails closed: a missing
    // lab must never auto-approve a refill. See DESIGN.md.
    let Some(value) = facts.lab(A1C_LAB_CODE).and_then(|lab| lab.value) else {
        return RuleOutcome::fail(
            RuleKind::A1cCeiling,
            label,
            "no result".to_owned(),
            format!("No A1c result on file. Protocol requires A1c at or below {max_value}."),
        );
    };

    if value > max_value {
        RuleOutcome::fail(
            RuleKind::A1cCeiling,
            label,
            format!("{value}"),
            format!("Patient A1c ({value}) exceeds protocol maximum ({max_value})."),
        )
    } else {
        RuleOutcome::pass(RuleKind::A1cCeiling, label, format!("{value}"))
    }
}

fn check_a1c_recency(facts: &ClinicalFacts, max_months: u32, today: NaiveDate) -> RuleOutcome {
    let label = format!("A1c within {max_months}mo");
    let Some(a1c_date) = facts.lab(A1C_LAB_CODE).and_then(|lab| lab.date) else {
        return RuleOutcome::fail(
            RuleKind::A1cRecency,
            label,
            "no A1c date".to_owned(),
            "No A1c lab result found; protocol requires a recent A1c.".to_owned(),
        );
    };

    let months = elapsed_months(a1c_date, today);
    if months > f64::from(max_months) {
        RuleOutcome::fail(
            RuleKind::A1cRecency,
            label,
            format!("{months:.1} months"),
            format!(
                "Patient A1c is {months:.1} months old. \
                 Protocol requires A1c within {max_months} months."
            ),
        )
    } else {
        RuleOutcome::pass(RuleKind::A1cRecency, label, format!("{months:.1} months"))
    }
}
