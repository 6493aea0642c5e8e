//! Clinical fact extraction.
//!
//! Normalizes the raw EMR-shaped clinical document (visit date and lab
//! results carrying `YYYY-MM-DD` date strings) into typed facts the rule
//! evaluator compares against protocol thresholds.
//!
//! A date string the EMR sent but we cannot parse is treated the same as a
//! missing fact: it is logged and dropped, and the evaluation carries on.
//! The EMR is trusted for content but not for formatting, and a formatting
//! anomaly must never abort a refill decision.

use crate::constants::EMR_DATE_FORMAT;
use crate::{RefillError, RefillResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One lab result as supplied by the EMR. Either field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLabResult {
    pub value: Option<f64>,
    pub date: Option<String>,
}

/// The raw clinical document returned by the EMR data source for one
/// patient, keyed by lab code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawClinicalData {
    pub last_visit_date: Option<String>,
    #[serde(default)]
    pub labs: BTreeMap<String, RawLabResult>,
}

impl RawClinicalData {
    /// Parses a raw clinical document from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns `RefillError::Deserialization` if the document is not valid
    /// JSON of the expected shape.
    pub fn from_json(json: &str) -> RefillResult<Self> {
        serde_json::from_str(json).map_err(RefillError::Deserialization)
    }
}

/// A lab observation with its date parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabObservation {
    pub value: Option<f64>,
    pub date: Option<NaiveDate>,
}

/// Typed clinical facts for one patient.
///
/// Constructed fresh per evaluation request and immutable for its
/// duration. Dates are not required to be in the past; elapsed-time
/// computations downstream may come out negative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClinicalFacts {
    pub last_visit_date: Option<NaiveDate>,
    pub labs: BTreeMap<String, LabObservation>,
}

impl ClinicalFacts {
    /// Looks up the observation for a lab code, if any was reported.
    pub fn lab(&self, code: &str) -> Option<&LabObservation> {
        self.labs.get(code)
    }
}

/// Parses an EMR `YYYY-MM-DD` date string.
///
/// # Errors
///
/// Returns `RefillError::MalformedFact` naming the offending field if the
/// string is not a valid calendar date.
fn parse_date(field: &str, value: &str) -> RefillResult<NaiveDate> {
    NaiveDate::parse_from_str(value, EMR_DATE_FORMAT).map_err(|source| {
        RefillError::MalformedFact {
            field: field.to_owned(),
            value: value.to_owned(),
            source,
        }
    })
}

/// Parses an optional date string, degrading malformed input to absent.
fn parse_date_lenient(field: &str, value: Option<&str>) -> Option<NaiveDate> {
    let value = value?;
    match parse_date(field, value) {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!("dropping unparseable EMR date: {}", err);
            None
        }
    }
}

/// Normalizes a raw EMR clinical document into typed [`ClinicalFacts`].
///
/// Pure transformation with no I/O. Malformed date strings are dropped
/// (with a warning) rather than propagated, so this never fails.
pub fn extract_facts(raw: &RawClinicalData) -> ClinicalFacts {
    let last_visit_date =
        parse_date_lenient("last_visit_date", raw.last_visit_date.as_deref());

    let labs = raw
        .labs
        .iter()
        .map(|(code, lab)| {
            let date =
                parse_date_lenient(&format!("labs[{code}].date"), lab.date.as_deref());
            (
                code.clone(),
                LabObservation {
                    value: lab.value,
                    date,
                },
            )
        })
        .collect();

    ClinicalFacts {
        last_visit_date,
        labs,
    }
}
