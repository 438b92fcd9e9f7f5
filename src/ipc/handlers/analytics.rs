use serde_json::json;

use super::common::{respond, HandlerErr};
use crate::analytics;
use crate::ipc::types::{AppState, Request};
use crate::records::{AttendanceRecord, Instructor, Notice, Student};

fn to_json<T: serde::Serialize>(v: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(v).map_err(|e| HandlerErr::new("db_query_failed", e.to_string()))
}

fn handle_dashboard(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let students = state.repo::<Student>().list()?;
    let instructors = state.repo::<Instructor>().list()?;
    let attendance = state.repo::<AttendanceRecord>().list()?;
    let notices = state.repo::<Notice>().list()?;
    let summary = analytics::dashboard(&students, &instructors, &attendance, &notices);
    to_json(&summary)
}

fn handle_instructors_by_department(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let instructors = state.repo::<Instructor>().list()?;
    Ok(json!({
        "total": instructors.len(),
        "departments": to_json(&analytics::instructors_by_department(&instructors))?,
        "status": to_json(&analytics::instructor_status(&instructors))?,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "analytics.dashboard" => handle_dashboard(state),
        "analytics.instructorsByDepartment" => handle_instructors_by_department(state),
        _ => return None,
    };
    Some(respond(req, result))
}
