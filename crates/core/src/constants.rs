//! Fixed constants for the protocol evaluation engine.

/// Average month length used for all elapsed-time arithmetic.
///
/// Protocol thresholds are expressed in months, but EMR dates subtract to
/// days. Elapsed months are always `days / 30.4`, never true calendar-month
/// subtraction; threshold boundary behaviour depends on this exact divisor.
pub const AVG_DAYS_PER_MONTH: f64 = 30.4;

/// Lab code under which HbA1c results are filed in the EMR document.
pub const A1C_LAB_CODE: &str = "A1c";

/// Format of calendar dates supplied by the EMR (`YYYY-MM-DD`).
pub const EMR_DATE_FORMAT: &str = "%Y-%m-%d";
