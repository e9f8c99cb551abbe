// Field data - the single source of truth of a process

//! # Field Data
//!
//! Everything typed into a process form lands in one flat map of
//! field name → JSON value. Tasks, progress and the step pointer are all read
//! back out of it.
//!
//! Two keys are reserved for the state machine and mirror its state so that a
//! stored record carries the step pointer with it: [`CURRENT_SECTION_KEY`] and
//! [`PROCESS_COMPLETED_KEY`].

use serde_json::Value;
use std::collections::BTreeMap;

/// Field name → value map
///
/// A `BTreeMap` keeps iteration order stable, so serialized records and
/// explanations come out the same on every run.
pub type FieldData = BTreeMap<String, Value>;

/// Reserved key holding the current step ordinal
pub const CURRENT_SECTION_KEY: &str = "currentSection";

/// Reserved key set once the last step has been submitted
pub const PROCESS_COMPLETED_KEY: &str = "processCompleted";

/// Keys that only the state machine may write
pub const RESERVED_KEYS: [&str; 2] = [CURRENT_SECTION_KEY, PROCESS_COMPLETED_KEY];

/// Literal affirmative token of status fields
pub const YES: &str = "Yes";

pub fn is_reserved(field: &str) -> bool {
    RESERVED_KEYS.contains(&field)
}

/// Whether a value counts as "filled in"
///
/// Strings must be non-blank, arrays and objects non-empty, numbers non-zero and
/// booleans `true`. `null` is never filled.
///
/// ```rust
/// # use hr_workflow::models::field::is_filled;
/// # use serde_json::json;
/// assert!(is_filled(&json!("Ana")));
/// assert!(!is_filled(&json!("   ")));
/// assert!(is_filled(&json!(["Notebook"])));
/// assert!(!is_filled(&json!([])));
/// assert!(!is_filled(&json!(false)));
/// ```
pub fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |v| v != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// A field is filled when it is present and [`is_filled`]; absent means no
pub fn field_is_filled(data: &FieldData, field: &str) -> bool {
    data.get(field).map_or(false, is_filled)
}

/// Trimmed, non-empty string value of a field
pub fn text<'a>(data: &'a FieldData, field: &str) -> Option<&'a str> {
    data.get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Read the stored step pointer, accepting numbers and numeric strings
pub fn stored_step(data: &FieldData) -> Option<u64> {
    match data.get(CURRENT_SECTION_KEY)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
