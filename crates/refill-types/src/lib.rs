/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A patient's Medical Record Number.
///
/// This type wraps a `String` and guarantees at least one non-whitespace
/// character. The input is trimmed of leading and trailing whitespace
/// during construction. No further structure is imposed: MRN formats vary
/// between EMR systems, and the engine treats them as opaque keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mrn(String);

impl Mrn {
    /// Creates a new `Mrn` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the
    /// trimmed result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Mrn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Mrn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for Mrn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Mrn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Mrn::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A medication class name, e.g. "SGLT2 Inhibitor" or "GLP-1 Agonist".
///
/// Medication classes are the lookup key for refill protocols. Like
/// [`Mrn`], this wraps a trimmed non-empty `String`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MedicationClass(String);

impl MedicationClass {
    /// Creates a new `MedicationClass` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the
    /// trimmed result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MedicationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MedicationClass {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for MedicationClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for MedicationClass {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MedicationClass::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Queue states a refill request moves through.
///
/// New requests start in `PendingAiReview`. The automated evaluation
/// moves them to `PendingHumanReview` regardless of its verdict; only a
/// human reviewer's sign-off produces `Approved` or `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefillStatus {
    PendingAiReview,
    PendingHumanReview,
    Approved,
    Denied,
}
