//! Automated refill review orchestration.
//!
//! Wires the fact extractor, rule evaluator, and decision aggregator
//! behind the two collaborator seams the surrounding system provides: a
//! protocol store and a clinical data source. Both are explicit
//! dependencies of [`ReviewService`]; there are no process-wide handles.
//!
//! This module is also the fail-closed boundary. A missing protocol or a
//! collaborator fault never escapes as an error and never turns into a
//! silent approve: it comes back as a deny whose reason the reviewer
//! queue can render.

use chrono::NaiveDate;
use refill_types::{MedicationClass, Mrn};

use crate::decision::{aggregate, Decision};
use crate::evaluate::{evaluate_protocol, RuleOutcome};
use crate::facts::{extract_facts, ClinicalFacts, RawClinicalData};
use crate::protocol::{ProtocolDefinition, ProtocolStore};
use crate::{RefillError, RefillResult};

/// Source of raw EMR clinical data, keyed by MRN.
///
/// Implemented outside this crate (real EMR integration in production, a
/// canned provider in demos). Callers must complete any network I/O
/// before the evaluator runs; this trait is synchronous by design.
pub trait ClinicalDataSource {
    /// Fetches the raw clinical document for a patient.
    ///
    /// # Errors
    ///
    /// Returns `RefillError::Source` if the underlying source fails.
    fn fetch(&self, mrn: &Mrn) -> RefillResult<RawClinicalData>;
}

/// The full result of one automated review.
///
/// `checks` is the audit breakdown a human reviewer sees as evidence and
/// `decision` is aggregated from those same outcomes, so what was decided
/// and what is shown can never drift apart.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReviewOutcome {
    pub decision: Decision,
    pub checks: Vec<RuleOutcome>,
}

impl ReviewOutcome {
    fn denied(reason: String) -> Self {
        Self {
            decision: Decision::deny_with_reason(reason),
            checks: Vec::new(),
        }
    }
}

/// Pure evaluation entry point for callers that already hold the inputs.
///
/// Runs the applicable rules and aggregates them into a decision. For a
/// fixed `(protocol, facts, today)` triple the result is always the same.
pub fn evaluate_refill(
    protocol: &ProtocolDefinition,
    facts: &ClinicalFacts,
    today: NaiveDate,
) -> ReviewOutcome {
    let checks = evaluate_protocol(protocol, facts, today);
    let decision = aggregate(&checks);
    ReviewOutcome { decision, checks }
}

/// Automated protocol review with explicit collaborator dependencies.
pub struct ReviewService<S, C> {
    store: S,
    source: C,
}

impl<S, C> ReviewService<S, C>
where
    S: ProtocolStore,
    C: ClinicalDataSource,
{
    pub fn new(store: S, source: C) -> Self {
        Self { store, source }
    }

    /// Reviews one refill request end to end.
    ///
    /// Looks up the protocol for the medication class, fetches and
    /// normalizes the patient's clinical data, evaluates the applicable
    /// rules as of `today`, and aggregates the outcomes.
    ///
    /// Never returns an error: every failure path collapses into a deny
    /// with the fault message as its reason. An unconfigured medication
    /// class denies with `"No protocol found for medication class: {class}"`.
    pub fn review(
        &self,
        mrn: &Mrn,
        medication_class: &MedicationClass,
        today: NaiveDate,
    ) -> ReviewOutcome {
        match self.try_review(mrn, medication_class, today) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("refill review denied on fault (mrn {}): {}", mrn, err);
                ReviewOutcome::denied(err.to_string())
            }
        }
    }

    fn try_review(
        &self,
        mrn: &Mrn,
        medication_class: &MedicationClass,
        today: NaiveDate,
    ) -> RefillResult<ReviewOutcome> {
        let protocol = self
            .store
            .lookup(medication_class)?
            .ok_or_else(|| RefillError::ProtocolNotFound(medication_class.to_string()))?;

        let raw = self.source.fetch(mrn)?;
        let facts = extract_facts(&raw);

        Ok(evaluate_refill(&protocol, &facts, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Verdict;
    use crate::facts::RawLabResult;
    use chrono::Days;
    use std::collections::HashMap;

    struct MapStore(HashMap<String, ProtocolDefinition>);

    impl ProtocolStore for MapStore {
        fn lookup(
            &self,
            medication_class: &MedicationClass,
        ) -> RefillResult<Option<ProtocolDefinition>> {
            Ok(self.0.get(medication_class.as_str()).cloned())
        }
    }

    struct FailingStore;

    impl ProtocolStore for FailingStore {
        fn lookup(&self, _: &MedicationClass) -> RefillResult<Option<ProtocolDefinition>> {
            Err(RefillError::Store("connection reset".to_owned()))
        }
    }

    struct FixedSource(RawClinicalData);

    impl ClinicalDataSource for FixedSource {
        fn fetch(&self, _: &Mrn) -> RefillResult<RawClinicalData> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl ClinicalDataSource for FailingSource {
        fn fetch(&self, _: &Mrn) -> RefillResult<RawClinicalData> {
            Err(RefillError::Source("EMR unreachable".to_owned()))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).expect("valid date")
    }

    fn ymd_days_ago(days: u64) -> String {
        today()
            .checked_sub_days(Days::new(days))
            .expect("valid date")
            .format("%Y-%m-%d")
            .to_string()
    }

    fn diabetes_protocol() -> ProtocolDefinition {
        ProtocolDefinition {
            medication_class: MedicationClass::new("SGLT2 Inhibitor").expect("valid class"),
            max_months_since_visit: Some(12),
            max_a1c_value: Some(8.0),
            require_recent_a1c: Some(6),
        }
    }

    fn store_with(protocol: ProtocolDefinition) -> MapStore {
        let mut map = HashMap::new();
        map.insert(protocol.medication_class.to_string(), protocol);
        MapStore(map)
    }

    fn raw_data(visit_days_ago: u64, a1c_value: f64, a1c_days_ago: u64) -> RawClinicalData {
        let mut raw = RawClinicalData {
            last_visit_date: Some(ymd_days_ago(visit_days_ago)),
            ..RawClinicalData::default()
        };
        raw.labs.insert(
            "A1c".to_owned(),
            RawLabResult {
                value: Some(a1c_value),
                date: Some(ymd_days_ago(a1c_days_ago)),
            },
        );
        raw
    }

    fn mrn() -> Mrn {
        Mrn::new("12345").expect("valid mrn")
    }

    fn class() -> MedicationClass {
        MedicationClass::new("SGLT2 Inhibitor").expect("valid class")
    }

    #[test]
    fn test_stale_visit_denies_with_visit_reason_only() {
        // 575 days is ~18.9 average months; the A1c value and recency pass.
        let service = ReviewService::new(
            store_with(diabetes_protocol()),
            FixedSource(raw_data(575, 7.8, 30)),
        );
        let outcome = service.review(&mrn(), &class(), today());

        assert_eq!(outcome.decision.verdict, Verdict::Deny);
        assert_eq!(outcome.decision.reasons.len(), 1);
        assert!(outcome.decision.reasons[0].contains("18.9 months"));
        assert_eq!(outcome.checks.len(), 3);
        assert!(!outcome.checks[0].passed);
        assert!(outcome.checks[1].passed);
        assert!(outcome.checks[2].passed);
    }

    #[test]
    fn test_recent_visit_and_good_a1c_approves() {
        let service = ReviewService::new(
            store_with(diabetes_protocol()),
            FixedSource(raw_data(60, 6.5, 30)),
        );
        let outcome = service.review(&mrn(), &class(), today());

        assert_eq!(outcome.decision.verdict, Verdict::Approve);
        assert!(outcome.decision.reasons.is_empty());
        assert!(outcome.checks.iter().all(|check| check.passed));
    }

    #[test]
    fn test_multiple_violations_report_in_rule_order() {
        let service = ReviewService::new(
            store_with(diabetes_protocol()),
            FixedSource(raw_data(575, 9.2, 30)),
        );
        let outcome = service.review(&mrn(), &class(), today());

        assert_eq!(outcome.decision.verdict, Verdict::Deny);
        assert_eq!(outcome.decision.reasons.len(), 2);
        assert!(outcome.decision.reasons[0].contains("last visit"));
        assert!(outcome.decision.reasons[1].contains("exceeds protocol maximum"));
    }

    #[test]
    fn test_unconfigured_medication_class_denies_with_class_name() {
        let service = ReviewService::new(
            MapStore(HashMap::new()),
            FixedSource(raw_data(60, 6.5, 30)),
        );
        let unconfigured = MedicationClass::new("GLP-1 Agonist").expect("valid class");
        let outcome = service.review(&mrn(), &unconfigured, today());

        assert_eq!(outcome.decision.verdict, Verdict::Deny);
        assert_eq!(
            outcome.decision.reasons,
            vec!["No protocol found for medication class: GLP-1 Agonist"]
        );
        assert!(outcome.checks.is_empty());
    }

    #[test]
    fn test_store_fault_fails_closed() {
        let service = ReviewService::new(FailingStore, FixedSource(raw_data(60, 6.5, 30)));
        let outcome = service.review(&mrn(), &class(), today());

        assert_eq!(outcome.decision.verdict, Verdict::Deny);
        assert!(outcome.decision.reasons[0].contains("connection reset"));
    }

    #[test]
    fn test_source_fault_fails_closed() {
        let service = ReviewService::new(store_with(diabetes_protocol()), FailingSource);
        let outcome = service.review(&mrn(), &class(), today());

        assert_eq!(outcome.decision.verdict, Verdict::Deny);
        assert!(outcome.decision.reasons[0].contains("EMR unreachable"));
    }

    #[test]
    fn test_protocol_without_thresholds_approves_anything() {
        let protocol = ProtocolDefinition {
            medication_class: class(),
            max_months_since_visit: None,
            max_a1c_value: None,
            require_recent_a1c: None,
        };
        let service = ReviewService::new(
            store_with(protocol),
            FixedSource(RawClinicalData::default()),
        );
        let outcome = service.review(&mrn(), &class(), today());

        assert_eq!(outcome.decision.verdict, Verdict::Approve);
        assert!(outcome.decision.reasons.is_empty());
        assert!(outcome.checks.is_empty());
    }

    #[test]
    fn test_malformed_visit_date_degrades_to_absent() {
        let raw = RawClinicalData {
            last_visit_date: Some("18/03/2025".to_owned()),
            ..RawClinicalData::default()
        };
        let protocol = ProtocolDefinition {
            medication_class: class(),
            max_months_since_visit: Some(12),
            max_a1c_value: None,
            require_recent_a1c: None,
        };
        let service = ReviewService::new(store_with(protocol), FixedSource(raw));
        let outcome = service.review(&mrn(), &class(), today());

        // The unparseable date is treated like a missing visit date, which
        // does not violate the visit recency rule.
        assert_eq!(outcome.decision.verdict, Verdict::Approve);
        assert_eq!(outcome.checks[0].observed, "unknown");
    }

    #[test]
    fn test_determinism_for_fixed_inputs() {
        let protocol = diabetes_protocol();
        let facts = extract_facts(&raw_data(200, 7.1, 100));
        let first = evaluate_refill(&protocol, &facts, today());
        let second = evaluate_refill(&protocol, &facts, today());

        assert_eq!(first.decision.verdict, second.decision.verdict);
        assert_eq!(first.decision.reasons, second.decision.reasons);
        assert_eq!(first.checks.len(), second.checks.len());
    }

    #[test]
    fn test_decision_and_audit_view_share_one_evaluation() {
        let service = ReviewService::new(
            store_with(diabetes_protocol()),
            FixedSource(raw_data(575, 9.2, 300)),
        );
        let outcome = service.review(&mrn(), &class(), today());

        // Every deny reason is the explanation of a failed check from the
        // same outcome sequence the reviewer is shown.
        let failed: Vec<&str> = outcome
            .checks
            .iter()
            .filter(|check| !check.passed)
            .filter_map(|check| check.explanation.as_deref())
            .collect();
        assert_eq!(outcome.decision.reasons, failed);
    }
}
