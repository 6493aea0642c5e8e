//! Decision aggregation.
//!
//! Folds an ordered sequence of rule outcomes into the final decision.
//! The policy is deterministic and strict: any failed rule denies, and
//! zero failed rules (including zero applicable rules) approves.

use refill_types::RefillStatus;
use serde::{Deserialize, Serialize};

use crate::evaluate::RuleOutcome;

/// The automated verdict on a refill request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Approve,
    Deny,
}

impl Verdict {
    /// The queue status the caller files the request under next.
    ///
    /// Every automated verdict is escalated for human sign-off; the
    /// verdict only controls how the review queue sorts and presents the
    /// request, never whether a human sees it.
    pub fn next_status(self) -> RefillStatus {
        RefillStatus::PendingHumanReview
    }
}

/// The aggregated decision for one evaluation.
///
/// `reasons` is empty exactly when the verdict is `Approve`; on a deny it
/// holds one entry per failed rule, in rule-evaluation order, with no
/// deduplication or truncation. Derived per request, persisted by the
/// caller, never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub verdict: Verdict,
    pub reasons: Vec<String>,
}

impl Decision {
    /// An unconditional deny carrying a single reason.
    ///
    /// Used at the fail-closed boundary: missing protocols and internal
    /// faults surface through here so that every deny the reviewer queue
    /// renders has at least one reason attached.
    pub fn deny_with_reason(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Deny,
            reasons: vec![reason.into()],
        }
    }
}

/// Aggregates rule outcomes into a [`Decision`].
pub fn aggregate(outcomes: &[RuleOutcome]) -> Decision {
    let reasons: Vec<String> = outcomes
        .iter()
        .filter(|outcome| !outcome.passed)
        .map(|outcome| match &outcome.explanation {
            Some(explanation) => explanation.clone(),
            None => format!("{}: observed {}", outcome.label, outcome.observed),
        })
        .collect();

    if reasons.is_empty() {
        Decision {
            verdict: Verdict::Approve,
            reasons,
        }
    } else {
        Decision {
            verdict: Verdict::Deny,
            reasons,
        }
    }
}
