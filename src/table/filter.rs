use std::collections::BTreeMap;
use std::rc::Rc;

use super::record::Record;

/// Selected value per filter key. `"all"` or an empty value means no constraint.
pub type FilterState = BTreeMap<String, String>;

/// Replaces the default search predicate. Receives the trimmed, non-empty term.
pub type SearchFn<R> = Rc<dyn Fn(&R, &str) -> bool>;

/// Replaces the default filter predicate. Receives the full filter state.
pub type FilterFn<R> = Rc<dyn Fn(&R, &FilterState) -> bool>;

pub fn is_active_filter(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && !v.eq_ignore_ascii_case("all")
}

pub fn matches_search<R: Record>(record: &R, term: &str, fields: &[&str]) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|key| {
        record
            .field_text(key)
            .map(|text| text.to_lowercase().contains(&needle))
            .unwrap_or(false)
    })
}

pub fn matches_filters<R: Record>(record: &R, state: &FilterState) -> bool {
    state
        .iter()
        .filter(|(_, value)| is_active_filter(value))
        .all(|(key, value)| {
            record
                .field_text(key)
                .map(|text| text.trim().to_lowercase() == value.trim().to_lowercase())
                .unwrap_or(false)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: &'static str,
        name: Option<&'static str>,
        status: Option<&'static str>,
        score: Option<i64>,
    }

    impl Record for Row {
        fn id(&self) -> &str {
            self.id
        }

        fn field(&self, key: &str) -> Option<Value> {
            match key {
                "id" => Some(json!(self.id)),
                "name" => self.name.map(|v| json!(v)),
                "status" => self.status.map(|v| json!(v)),
                "score" => self.score.map(|v| json!(v)),
                _ => None,
            }
        }
    }

    fn search(items: &[Row], term: &str, fields: &[&str]) -> Vec<Row> {
        items.iter().filter(|r| matches_search(*r, term, fields)).cloned().collect()
    }

    fn apply_filters(items: &[Row], state: &FilterState) -> Vec<Row> {
        items.iter().filter(|r| matches_filters(*r, state)).cloned().collect()
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: "1", name: Some("Alice Johnson"), status: Some("Active"), score: Some(91) },
            Row { id: "2", name: Some("Bob Smith"), status: Some("inactive"), score: Some(78) },
            Row { id: "3", name: None, status: None, score: Some(91) },
            Row { id: "4", name: Some("Carol Alison"), status: Some("ACTIVE"), score: None },
        ]
    }

    #[test]
    fn empty_search_is_identity() {
        let all = rows();
        assert_eq!(search(&all, "", &["name"]), all);
        assert_eq!(search(&all, "   ", &["name"]), all);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let out = search(&rows()[..2], "alice", &["name"]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");

        let out = search(&rows(), "ALI", &["name"]);
        let ids: Vec<_> = out.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn search_coerces_numbers_and_skips_missing_fields() {
        let out = search(&rows(), "91", &["name", "score"]);
        let ids: Vec<_> = out.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn all_sentinel_filters_are_identity() {
        let mut state = FilterState::new();
        state.insert("status".into(), "all".into());
        state.insert("name".into(), "".into());
        assert_eq!(apply_filters(&rows(), &state), rows());
        assert_eq!(apply_filters(&rows(), &FilterState::new()), rows());
    }

    #[test]
    fn filter_matches_case_insensitively_and_excludes_missing() {
        let mut state = FilterState::new();
        state.insert("status".into(), "Active".into());
        let out = apply_filters(&rows(), &state);
        let ids: Vec<_> = out.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn filter_requires_every_active_key() {
        let mut state = FilterState::new();
        state.insert("status".into(), "active".into());
        state.insert("score".into(), "91".into());
        let out = apply_filters(&rows(), &state);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");
    }
}
