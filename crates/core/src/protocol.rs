//! Refill protocol definitions.
//!
//! A protocol is the set of refill eligibility thresholds an administrator
//! configures for one medication class. The engine only reads protocols;
//! creating and editing them belongs to the excluded storage layer, reached
//! through the [`ProtocolStore`] trait.

use refill_types::MedicationClass;
use serde::{Deserialize, Serialize};

use crate::RefillResult;

/// Refill eligibility thresholds for one medication class.
///
/// Each threshold is optional; `None` means the corresponding rule does not
/// apply to this class. A protocol with all three thresholds absent always
/// evaluates as an approve with zero rule outcomes — the only thing it
/// asserts is that the medication class is configured at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolDefinition {
    /// Unique lookup key, e.g. "SGLT2 Inhibitor".
    pub medication_class: MedicationClass,

    /// Deny when more than this many months have elapsed since the
    /// patient's last visit.
    #[serde(default)]
    pub max_months_since_visit: Option<u32>,

    /// Deny when the latest A1c value exceeds this ceiling.
    #[serde(default)]
    pub max_a1c_value: Option<f64>,

    /// Deny when the latest A1c result is older than this many months, or
    /// when no A1c result exists at all.
    #[serde(default)]
    pub require_recent_a1c: Option<u32>,
}

impl ProtocolDefinition {
    /// True when no threshold is configured, i.e. every rule is skipped.
    pub fn has_no_thresholds(&self) -> bool {
        self.max_months_since_visit.is_none()
            && self.max_a1c_value.is_none()
            && self.require_recent_a1c.is_none()
    }
}

/// Read-only lookup of protocol definitions by medication class.
///
/// Implemented by the storage layer. `Ok(None)` means no protocol is
/// configured for the class — a configuration gap the caller must turn
/// into an unconditional deny, never a silent approve.
pub trait ProtocolStore {
    /// Looks up the protocol configured for a medication class.
    ///
    /// # Errors
    ///
    /// Returns `RefillError::Store` if the underlying store fails.
    fn lookup(&self, medication_class: &MedicationClass)
        -> RefillResult<Option<ProtocolDefinition>>;
}
