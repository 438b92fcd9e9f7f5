pub mod attendance;
pub mod instructor;
pub mod notice;
pub mod student;

use serde_json::{json, Value};

use crate::table::{
    sort_by_options, ColumnDescriptor, FilterDescriptor, Pipeline, Record, SortOption,
};

pub use attendance::{AttendanceRecord, AttendanceSession, StudentRef};
pub use instructor::Instructor;
pub use notice::Notice;
pub use student::Student;

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";

/// Table configuration a record type brings to the generic engine.
pub trait TableModule: Record + Clone + 'static {
    /// Collection name, also used for storage tables and IPC method prefixes.
    const KIND: &'static str;
    const NOTIFIABLE: bool = false;

    fn columns() -> Vec<ColumnDescriptor<Self>>;
    fn filters() -> Vec<FilterDescriptor>;
    fn sort_options() -> Vec<SortOption<Self>>;
    fn search_fields() -> &'static [&'static str];

    /// Presentation row with every missing field defaulted.
    fn display(&self) -> Value;

    fn pipeline() -> Pipeline<Self> {
        Pipeline::new(Self::search_fields()).with_sorter(sort_by_options(Self::sort_options()))
    }

    fn describe_columns() -> Value {
        Value::Array(Self::columns().iter().map(|c| c.describe()).collect())
    }

    fn describe_sort_options() -> Value {
        Value::Array(
            Self::sort_options()
                .iter()
                .map(|o| json!({ "key": o.key, "label": o.label }))
                .collect(),
        )
    }
}

pub(crate) fn opt_json<T: serde::Serialize>(v: &Option<T>) -> Option<Value> {
    v.as_ref().map(|x| json!(x))
}

/// Trimmed text, or `fallback` when missing or blank.
pub fn text_or(v: &Option<String>, fallback: &str) -> String {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Matches `raw` case-insensitively against `choices`, returning the canonical
/// spelling or [`UNKNOWN`].
pub fn canonical_choice(raw: &Option<String>, choices: &[&'static str]) -> &'static str {
    let Some(raw) = raw.as_deref().map(str::trim) else {
        return UNKNOWN;
    };
    choices
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(raw))
        .unwrap_or(UNKNOWN)
}

pub fn clamp_percent(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, 100.0)
}

pub(crate) fn lower(v: &Option<String>) -> String {
    v.as_deref().unwrap_or("").trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_normalization() {
        let choices = ["Active", "Inactive"];
        assert_eq!(canonical_choice(&Some(" active ".into()), &choices), "Active");
        assert_eq!(canonical_choice(&Some("retired".into()), &choices), UNKNOWN);
        assert_eq!(canonical_choice(&None, &choices), UNKNOWN);
    }

    #[test]
    fn percent_clamps() {
        assert_eq!(clamp_percent(104.2), 100.0);
        assert_eq!(clamp_percent(-3.0), 0.0);
        assert_eq!(clamp_percent(f64::NAN), 0.0);
        assert_eq!(clamp_percent(87.5), 87.5);
    }

    #[test]
    fn blank_text_defaults() {
        assert_eq!(text_or(&Some("  ".into()), NOT_AVAILABLE), "N/A");
        assert_eq!(text_or(&None, UNKNOWN), "Unknown");
        assert_eq!(text_or(&Some(" 10-B ".into()), NOT_AVAILABLE), "10-B");
    }
}
