use serde_json::json;

use super::common::{now_stamp, required_str, respond, HandlerErr};
use super::records;
use crate::db;
use crate::ipc::types::{AppState, Request};
use crate::records::notice::AUDIENCES;
use crate::records::{canonical_choice, Notice, TableModule};

fn validate(n: &Notice) -> Result<(), HandlerErr> {
    if n.title.as_deref().map(str::trim).unwrap_or("").is_empty() {
        return Err(HandlerErr::bad_params("title must not be empty"));
    }
    Ok(())
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let mut notice: Notice = records::from_params(&req.params)?;
    validate(&notice)?;
    if notice.published_on.is_none() {
        notice.published_on = Some(chrono::Local::now().date_naive().format("%Y-%m-%d").to_string());
    }
    // Only `notify` stamps this.
    notice.notified_at = None;
    records::insert(state, notice)
}

/// Stamps `notified_at` and records the fan-out. The sidecar does not deliver
/// anything itself; the log row is what the dashboard reads back.
pub fn notify(state: &mut AppState, id: &str) -> Result<serde_json::Value, HandlerErr> {
    let mut notice: Notice = records::fetch(state, id)?;
    let sent_at = now_stamp();
    let audience = canonical_choice(&notice.audience, &AUDIENCES);
    notice.notified_at = Some(sent_at.clone());
    let row = notice.display();
    state.repo::<Notice>().update(notice)?;

    let mut deliveries = None;
    if let Some(conn) = state.db.as_ref() {
        db::log_notification(conn, id, audience, &sent_at)
            .map_err(|e| HandlerErr::new("db_query_failed", format!("{e:#}")))?;
        deliveries = db::notification_count(conn, id).ok();
    }
    tracing::info!(notice_id = %id, audience, "notice fan-out");

    Ok(json!({
        "id": id,
        "audience": audience,
        "notifiedAt": sent_at,
        "deliveries": deliveries,
        "record": row,
    }))
}

fn handle_notify(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let id = required_str(&req.params, "id")?;
    notify(state, &id)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "notices.list" => records::list::<Notice>(state, &req.params),
        "notices.get" => records::get::<Notice>(state, &req.params),
        "notices.create" => handle_create(state, req),
        "notices.update" => records::update::<Notice>(state, &req.params, validate),
        "notices.delete" => records::delete::<Notice>(state, &req.params),
        "notices.export" => records::export_csv::<Notice>(state, &req.params),
        "notices.notify" => handle_notify(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
