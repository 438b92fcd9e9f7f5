use std::rc::Rc;

use serde_json::{json, Value};

use super::common::{required_str, respond, HandlerErr};
use super::{notices, records};
use crate::ipc::types::{AppState, Request};
use crate::ipc::views::{
    build_view, snapshot, with_view, ModuleView, OpenView, Outbox, RowIntent, MODULES,
};
use crate::records::{AttendanceRecord, Instructor, Notice, Student};
use crate::repo::Entity;
use crate::table::{FilterState, TableView};

fn page_size_param(params: &Value, key: &str) -> Result<Option<usize>, HandlerErr> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| HandlerErr::bad_params(format!("{key} must be a non-negative integer"))),
    }
}

fn handle_open(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let module = required_str(&req.params, "module")?;
    let page_size = page_size_param(&req.params, "pageSize")?.unwrap_or_else(|| state.page_size());
    let outbox = Outbox::default();
    let view = match module.as_str() {
        "students" => ModuleView::Students(build_view(state.repo::<Student>().list()?, page_size, &outbox)),
        "instructors" => ModuleView::Instructors(build_view(
            state.repo::<Instructor>().list()?,
            page_size,
            &outbox,
        )),
        "attendance" => ModuleView::Attendance(build_view(
            state.repo::<AttendanceRecord>().list()?,
            page_size,
            &outbox,
        )),
        "notices" => ModuleView::Notices(build_view(state.repo::<Notice>().list()?, page_size, &outbox)),
        other => {
            return Err(HandlerErr::bad_params(format!("unknown module: {other}"))
                .with_details(json!({ "modules": MODULES })))
        }
    };
    let view_id = state.views.insert(OpenView { view, outbox });
    tracing::debug!(view_id = %view_id, module = %module, "view opened");
    current_snapshot(state, &view_id)
}

fn current_snapshot(state: &AppState, view_id: &str) -> Result<Value, HandlerErr> {
    let open = state
        .views
        .get(view_id)
        .ok_or_else(|| HandlerErr::not_found("view").with_details(json!({ "viewId": view_id })))?;
    Ok(with_view!(&open.view, v => snapshot(view_id, v)))
}

/// Takes the view out of the registry so the handler can use the rest of the
/// state, then puts it back whatever the outcome.
fn with_open_view(
    state: &mut AppState,
    params: &Value,
    f: impl FnOnce(&mut AppState, &str, &mut OpenView) -> Result<Value, HandlerErr>,
) -> Result<Value, HandlerErr> {
    let view_id = required_str(params, "viewId")?;
    let mut open = state
        .views
        .take(&view_id)
        .ok_or_else(|| HandlerErr::not_found("view").with_details(json!({ "viewId": view_id })))?;
    let result = f(state, &view_id, &mut open);
    state.views.put(view_id, open);
    result
}

fn reload<R: Entity>(state: &mut AppState, view: &mut TableView<R>) -> Result<(), HandlerErr> {
    let rows = state.repo::<R>().list()?;
    view.set_source(Rc::new(rows));
    Ok(())
}

enum Nav {
    Next,
    Prev,
}

/// A fully validated `views.update` request. Nothing touches the view until
/// every parameter has parsed.
#[derive(Default)]
struct ViewUpdate {
    refresh: bool,
    search: Option<String>,
    clear_filters: bool,
    filters: Option<FilterState>,
    filter: Option<(String, String)>,
    sort: Option<Option<String>>,
    page_size: Option<usize>,
    page: Option<usize>,
    nav: Option<Nav>,
}

impl ViewUpdate {
    fn parse(params: &Value) -> Result<Self, HandlerErr> {
        let mut update = ViewUpdate {
            refresh: params.get("refresh").and_then(Value::as_bool) == Some(true),
            clear_filters: params.get("clearFilters").and_then(Value::as_bool) == Some(true),
            ..ViewUpdate::default()
        };
        if let Some(search) = params.get("search") {
            let term = search
                .as_str()
                .ok_or_else(|| HandlerErr::bad_params("search must be a string"))?;
            update.search = Some(term.to_string());
        }
        if let Some(filters) = params.get("filters") {
            let filters: FilterState = serde_json::from_value(filters.clone())
                .map_err(|e| HandlerErr::bad_params(format!("invalid filters: {e}")))?;
            update.filters = Some(filters);
        }
        if let Some(filter) = params.get("filter") {
            let key = required_str(filter, "key")?;
            let value = filter.get("value").and_then(Value::as_str).unwrap_or("all");
            update.filter = Some((key, value.to_string()));
        }
        if let Some(sort) = params.get("sort") {
            update.sort = Some(match sort {
                Value::Null => None,
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => Some(s.clone()),
                _ => return Err(HandlerErr::bad_params("sort must be a string or null")),
            });
        }
        update.page_size = page_size_param(params, "pageSize")?;
        update.page = page_size_param(params, "page")?;
        update.nav = match params.get("nav") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s == "next" => Some(Nav::Next),
            Some(Value::String(s)) if s == "prev" => Some(Nav::Prev),
            Some(other) => return Err(HandlerErr::bad_params(format!("unknown nav: {other}"))),
        };
        Ok(update)
    }
}

/// Applies view changes in a fixed order: refresh, search, filters, sort,
/// page size, page, then relative navigation. A rejected request leaves the
/// view untouched.
fn apply_update<R: Entity>(
    state: &mut AppState,
    view: &mut TableView<R>,
    params: &Value,
) -> Result<(), HandlerErr> {
    let update = ViewUpdate::parse(params)?;
    if update.refresh {
        reload(state, view)?;
    }
    if let Some(term) = update.search {
        view.set_search(term);
    }
    if update.clear_filters {
        view.clear_filters();
    }
    if let Some(filters) = update.filters {
        view.set_filters(filters);
    }
    if let Some((key, value)) = update.filter {
        view.set_filter(key, value);
    }
    if let Some(key) = update.sort {
        view.set_sort(key);
    }
    if let Some(size) = update.page_size {
        view.set_page_size(size);
    }
    if let Some(page) = update.page {
        view.go_to_page(page);
    }
    match update.nav {
        Some(Nav::Next) => view.next_page(),
        Some(Nav::Prev) => view.prev_page(),
        None => {}
    }
    Ok(())
}

fn run_action<R: Entity>(
    state: &mut AppState,
    view: &mut TableView<R>,
    outbox: &Outbox,
    params: &Value,
) -> Result<Value, HandlerErr> {
    let row = params
        .get("row")
        .and_then(Value::as_u64)
        .ok_or_else(|| HandlerErr::bad_params("missing row"))? as usize;
    let action = required_str(params, "action")?;

    let record = view.dispatch(row, &action)?;
    let intents: Vec<RowIntent> = outbox.borrow_mut().drain(..).collect();

    let mut effects = Vec::new();
    let mut changed = false;
    for intent in intents {
        match intent {
            RowIntent::Open(id) => effects.push(json!({ "effect": "open", "id": id })),
            RowIntent::Delete(id) => {
                records::delete_by_id::<R>(state, &id)?;
                changed = true;
                effects.push(json!({ "effect": "deleted", "id": id }));
            }
            RowIntent::Notify(id) => {
                let sent = notices::notify(state, &id)?;
                changed = true;
                effects.push(json!({
                    "effect": "notified",
                    "id": id,
                    "notifiedAt": sent["notifiedAt"],
                }));
            }
        }
    }
    if changed {
        reload(state, view)?;
    }
    tracing::info!(kind = R::KIND, row, action = %action, id = %record.id(), "row action");

    Ok(json!({
        "action": action,
        "row": row,
        "record": record.display(),
        "effects": effects,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "views.open" => handle_open(state, req),
        "views.get" => required_str(&req.params, "viewId").and_then(|id| current_snapshot(state, &id)),
        "views.update" => with_open_view(state, &req.params, |state, view_id, open| {
            with_view!(&mut open.view, v => {
                apply_update(state, v, &req.params)?;
                Ok(snapshot(view_id, v))
            })
        }),
        "views.action" => with_open_view(state, &req.params, |state, view_id, open| {
            let outbox = Rc::clone(&open.outbox);
            with_view!(&mut open.view, v => {
                let mut out = run_action(state, v, &outbox, &req.params)?;
                out["view"] = snapshot(view_id, v);
                Ok(out)
            })
        }),
        "views.close" => required_str(&req.params, "viewId").map(|id| {
            let module = state.views.take(&id).map(|open| open.view.kind());
            json!({ "viewId": id, "closed": module.is_some(), "module": module })
        }),
        _ => return None,
    };
    Some(respond(req, result))
}
