//! Handler bodies shared by every record module. Module files pick the
//! method names and add validation; the list/get/create/update/delete/export
//! mechanics live here once.

use std::io::Write;
use std::path::PathBuf;

use serde_json::json;
use uuid::Uuid;

use super::common::{csv_quote, merge_patch, required_str, HandlerErr};
use crate::ipc::types::AppState;
use crate::repo::{Entity, PageResult};
use crate::table::TableQuery;

pub fn parse_query(params: &serde_json::Value) -> Result<TableQuery, HandlerErr> {
    if params.is_null() {
        return Ok(TableQuery::default());
    }
    serde_json::from_value(params.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid list query: {e}")))
}

pub fn page_json<R: Entity>(page: &PageResult<R>) -> serde_json::Value {
    json!({
        "rows": page.rows.iter().map(|r| r.display()).collect::<Vec<_>>(),
        "total": page.info.total,
        "totalPages": page.info.total_pages,
        "page": page.info.page,
        "pageSize": page.info.page_size,
        "pageNumbers": page.info.page_numbers,
        "columns": R::describe_columns(),
        "filterOptions": R::filters(),
        "sortOptions": R::describe_sort_options(),
    })
}

pub fn list<R: Entity>(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let query = parse_query(params)?;
    let page_size = state.page_size();
    let page = state.repo::<R>().query(&R::pipeline(), &query, page_size)?;
    Ok(page_json(&page))
}

pub fn fetch<R: Entity>(state: &mut AppState, id: &str) -> Result<R, HandlerErr> {
    state
        .repo::<R>()
        .get(id)?
        .ok_or_else(|| HandlerErr::not_found(R::KIND).with_details(json!({ "id": id })))
}

pub fn get<R: Entity>(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = required_str(params, "id")?;
    let record: R = fetch(state, &id)?;
    Ok(json!({ "record": record.display(), "raw": serde_json::to_value(&record).ok() }))
}

/// Builds a record from request params, assigning a fresh id when none is given.
pub fn from_params<R: Entity>(params: &serde_json::Value) -> Result<R, HandlerErr> {
    let mut body = match params {
        serde_json::Value::Object(_) => params.clone(),
        serde_json::Value::Null => json!({}),
        _ => return Err(HandlerErr::bad_params("params must be an object")),
    };
    let blank_id = body
        .get("id")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().is_empty())
        .unwrap_or(true);
    if blank_id {
        body["id"] = json!(Uuid::new_v4().to_string());
    }
    serde_json::from_value(body).map_err(|e| HandlerErr::bad_params(format!("invalid {}: {e}", R::KIND)))
}

pub fn insert<R: Entity>(state: &mut AppState, record: R) -> Result<serde_json::Value, HandlerErr> {
    let id = record.id().to_string();
    let row = record.display();
    state.repo::<R>().insert(record)?;
    tracing::info!(kind = R::KIND, id = %id, store = state.store_name(), "record created");
    Ok(json!({ "id": id, "record": row }))
}

pub fn update<R: Entity>(
    state: &mut AppState,
    params: &serde_json::Value,
    validate: fn(&R) -> Result<(), HandlerErr>,
) -> Result<serde_json::Value, HandlerErr> {
    let id = required_str(params, "id")?;
    let patch = params
        .get("patch")
        .ok_or_else(|| HandlerErr::bad_params("missing patch"))?;
    let current: R = fetch(state, &id)?;
    let mut body = serde_json::to_value(&current)
        .map_err(|e| HandlerErr::new("db_query_failed", e.to_string()))?;
    merge_patch(&mut body, patch)?;
    let next: R = serde_json::from_value(body)
        .map_err(|e| HandlerErr::bad_params(format!("invalid patch: {e}")))?;
    validate(&next)?;
    let row = next.display();
    state.repo::<R>().update(next)?;
    tracing::info!(kind = R::KIND, id = %id, "record updated");
    Ok(json!({ "id": id, "record": row }))
}

pub fn delete<R: Entity>(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let id = required_str(params, "id")?;
    delete_by_id::<R>(state, &id)?;
    Ok(json!({ "id": id, "deleted": true }))
}

pub fn delete_by_id<R: Entity>(state: &mut AppState, id: &str) -> Result<(), HandlerErr> {
    if !state.repo::<R>().delete(id)? {
        return Err(HandlerErr::not_found(R::KIND).with_details(json!({ "id": id })));
    }
    tracing::info!(kind = R::KIND, id = %id, "record deleted");
    Ok(())
}

/// Writes the processed (searched, filtered, sorted) collection as CSV using
/// the module's column labels and renderers. Pagination is ignored.
pub fn export_csv<R: Entity>(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let out_path = PathBuf::from(required_str(params, "outPath")?);
    let query = parse_query(params)?;
    let source = state.repo::<R>().list()?;
    let processed = R::pipeline().process(
        &source,
        &query.search,
        &query.filters,
        query.sort.as_deref(),
    );
    let columns = R::columns();

    let mut text = columns
        .iter()
        .map(|c| csv_quote(c.label))
        .collect::<Vec<_>>()
        .join(",");
    text.push('\n');
    for (i, record) in processed.iter().enumerate() {
        let line = columns
            .iter()
            .map(|c| csv_quote(&c.cell(record, i)))
            .collect::<Vec<_>>()
            .join(",");
        text.push_str(&line);
        text.push('\n');
    }

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| HandlerErr::new("io_failed", e.to_string()))?;
        }
    }
    let mut file = std::fs::File::create(&out_path)
        .map_err(|e| HandlerErr::new("io_failed", e.to_string()))?;
    file.write_all(text.as_bytes())
        .map_err(|e| HandlerErr::new("io_failed", e.to_string()))?;

    tracing::info!(kind = R::KIND, rows = processed.len(), path = %out_path.display(), "exported csv");
    Ok(json!({
        "rowsExported": processed.len(),
        "path": out_path.to_string_lossy(),
    }))
}
