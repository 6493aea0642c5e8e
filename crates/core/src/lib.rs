//! # Refill Core
//!
//! Protocol evaluation engine for medication refill requests.
//!
//! This crate contains the pure decision logic: given a patient's clinical
//! facts and the protocol configured for a medication class, it produces a
//! deterministic approve/deny decision with itemized reasons, plus the
//! per-rule breakdown a human reviewer sees as evidence.
//!
//! **No API concerns**: HTTP endpoints, database storage, and the
//! language-model explanation layer live outside this crate and reach it
//! through the [`protocol::ProtocolStore`] and [`review::ClinicalDataSource`]
//! traits. The engine never auto-approves on ambiguity — any internal fault
//! or missing protocol comes back as a deny with a reason attached.

pub mod constants;
pub mod decision;
pub mod error;
pub mod evaluate;
pub mod facts;
pub mod protocol;
pub mod review;

pub use decision::{Decision, Verdict};
pub use error::{RefillError, RefillResult};
pub use evaluate::{evaluate_protocol, RuleKind, RuleOutcome};
pub use facts::{extract_facts, ClinicalFacts, LabObservation, RawClinicalData, RawLabResult};
pub use protocol::{ProtocolDefinition, ProtocolStore};
pub use review::{ClinicalDataSource, ReviewOutcome, ReviewService};
