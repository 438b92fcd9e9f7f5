use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

/// Reads the display profile the dashboard may attach. Every field is optional
/// and anything malformed is ignored.
fn log_profile(params: &serde_json::Value) {
    let Some(profile) = params.get("profile").filter(|p| p.is_object()) else {
        return;
    };
    let text = |key: &str| {
        profile
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("Guest")
            .to_string()
    };
    tracing::debug!(name = %text("name"), role = %text("role"), "dashboard profile");
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    log_profile(&req.params);
    let schema_version = state
        .db
        .as_ref()
        .and_then(|conn| db::settings_get_json(conn, "schema_version").ok().flatten());
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "store": state.store_name(),
            "schemaVersion": schema_version,
            "openViews": state.views.len(),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match db::open_db(&path) {
        Ok(conn) => {
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            // Open views hold rows from the previous store.
            state.views.clear();
            tracing::info!(path = %path.display(), "workspace selected");
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "workspace open failed");
            err(&req.id, "db_open_failed", format!("{e:#}"), None)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
