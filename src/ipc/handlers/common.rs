use crate::ipc::error::{err, ok};
use crate::ipc::types::Request;
use crate::repo::StoreError;
use crate::table::TableError;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn not_found(what: &str) -> Self {
        Self::new("not_found", format!("{what} not found"))
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        HandlerErr::new(e.code(), e.to_string())
    }
}

impl From<TableError> for HandlerErr {
    fn from(e: TableError) -> Self {
        let code = match &e {
            TableError::RowOutOfRange { .. } => "row_out_of_range",
            TableError::UnknownAction(_) => "bad_params",
        };
        HandlerErr::new(code, e.to_string())
    }
}

pub fn respond(req: &Request, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => {
            tracing::debug!(code = e.code, message = %e.message, "request failed");
            e.response(&req.id)
        }
    }
}

pub fn required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Shallow-merges `patch` into `target`. Nulls clear fields; `id` is never patched.
pub fn merge_patch(target: &mut serde_json::Value, patch: &serde_json::Value) -> Result<(), HandlerErr> {
    let Some(patch) = patch.as_object() else {
        return Err(HandlerErr::bad_params("patch must be an object"));
    };
    let Some(obj) = target.as_object_mut() else {
        return Err(HandlerErr::new("db_query_failed", "stored record is not an object"));
    };
    for (k, v) in patch {
        if k == "id" {
            continue;
        }
        obj.insert(k.clone(), v.clone());
    }
    Ok(())
}

pub fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn now_stamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn csv_quote_escapes_separators() {
        assert_eq!(csv_quote("plain"), "plain");
        assert_eq!(csv_quote("a,b"), "\"a,b\"");
        assert_eq!(csv_quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn patch_skips_id_and_clears_nulls() {
        let mut target = json!({ "id": "s1", "name": "Old", "email": "x@y" });
        merge_patch(&mut target, &json!({ "id": "s9", "name": "New", "email": null }))
            .map_err(|e| e.message)
            .expect("merge");
        assert_eq!(target, json!({ "id": "s1", "name": "New", "email": null }));
    }
}
