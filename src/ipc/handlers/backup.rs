use std::path::PathBuf;

use serde_json::json;

use super::common::{optional_str, required_str, respond, HandlerErr};
use crate::backup;
use crate::db;
use crate::ipc::types::{AppState, Request};

fn workspace_for(state: &AppState, params: &serde_json::Value) -> Result<PathBuf, HandlerErr> {
    optional_str(params, "workspacePath")
        .map(PathBuf::from)
        .or_else(|| state.workspace.clone())
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

fn export_bundle(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let out_path = required_str(&req.params, "outPath")?;
    let workspace_path = workspace_for(state, &req.params)?;

    if let Some(conn) = state.db.as_ref() {
        let _ = conn.execute_batch("PRAGMA wal_checkpoint(FULL)");
    }

    let export = backup::export_workspace_bundle(&workspace_path, &PathBuf::from(&out_path))
        .map_err(|e| {
            HandlerErr::new("io_failed", format!("{e:#}")).with_details(json!({ "path": out_path }))
        })?;
    tracing::info!(path = %out_path, sha256 = %export.db_sha256, "workspace bundle exported");

    Ok(json!({
        "path": out_path,
        "bundleFormat": export.bundle_format,
        "entryCount": export.entry_count,
        "dbSha256": export.db_sha256,
    }))
}

fn import_bundle(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let in_path = required_str(&req.params, "inPath")?;
    let workspace_path = workspace_for(state, &req.params)?;

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return Err(HandlerErr::new("not_found", "bundle file not found")
            .with_details(json!({ "path": in_path })));
    }

    // Drop the open handle before the database file is replaced.
    let reselect = state.workspace.as_deref() == Some(workspace_path.as_path());
    if reselect {
        state.db = None;
    }

    let imported = backup::import_workspace_bundle(&src, &workspace_path);
    let import = match imported {
        Ok(v) => v,
        Err(e) => {
            if reselect {
                state.db = db::open_db(&workspace_path).ok();
            }
            tracing::warn!(path = %in_path, error = %format!("{e:#}"), "bundle import failed");
            return Err(HandlerErr::new("io_failed", format!("{e:#}"))
                .with_details(json!({ "path": in_path })));
        }
    };

    let conn = db::open_db(&workspace_path)
        .map_err(|e| HandlerErr::new("db_open_failed", format!("{e:#}")))?;
    state.workspace = Some(workspace_path.clone());
    state.db = Some(conn);
    state.views.clear();
    tracing::info!(
        path = %in_path,
        format = %import.bundle_format_detected,
        "workspace bundle imported"
    );

    Ok(json!({
        "workspacePath": workspace_path.to_string_lossy(),
        "bundleFormatDetected": import.bundle_format_detected,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "backup.exportWorkspaceBundle" => export_bundle(state, req),
        "backup.importWorkspaceBundle" => import_bundle(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
