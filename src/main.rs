mod analytics;
mod backup;
mod config;
mod db;
mod ipc;
mod logging;
mod records;
mod repo;
mod seed;
mod table;

use std::io::{self, BufRead, Write};

use clap::Parser;

fn main() {
    let config = config::Config::parse();
    logging::init(&config.log_filter);

    let startup_workspace = config.workspace.clone();
    let mut state = ipc::AppState::new(config);
    if let Some(path) = startup_workspace {
        match db::open_db(&path) {
            Ok(conn) => {
                tracing::info!(path = %path.display(), "workspace opened at startup");
                state.workspace = Some(path);
                state.db = Some(conn);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "startup workspace unavailable; using memory store");
            }
        }
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), store = state.store_name(), "sidecar ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to reply to.
                tracing::warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() },
                });
                let _ = writeln!(stdout, "{resp}");
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    tracing::info!("stdin closed, exiting");
}
