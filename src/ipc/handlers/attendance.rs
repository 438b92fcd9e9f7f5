use serde_json::json;
use uuid::Uuid;

use super::common::{now_stamp, optional_str, required_str, respond, HandlerErr};
use super::records;
use crate::ipc::types::{AppState, Request};
use crate::records::attendance::ATTENDANCE_STATUSES;
use crate::records::{
    canonical_choice, AttendanceRecord, AttendanceSession, Student, StudentRef, TableModule, UNKNOWN,
};

fn parse_status(params: &serde_json::Value) -> Result<&'static str, HandlerErr> {
    let raw = optional_str(params, "status");
    match canonical_choice(&raw, &ATTENDANCE_STATUSES) {
        UNKNOWN => Err(HandlerErr::bad_params(format!(
            "status must be one of {}",
            ATTENDANCE_STATUSES.join(", ")
        ))),
        s => Ok(s),
    }
}

fn parse_date(raw: Option<String>) -> Result<String, HandlerErr> {
    match raw {
        Some(d) => chrono::NaiveDate::parse_from_str(&d, "%Y-%m-%d")
            .map(|v| v.format("%Y-%m-%d").to_string())
            .map_err(|_| HandlerErr::bad_params("date must be YYYY-MM-DD")),
        None => Ok(chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()),
    }
}

fn session_open(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let course = required_str(&req.params, "course")?;
    let date = parse_date(optional_str(&req.params, "date"))?;
    let session = AttendanceSession {
        id: Uuid::new_v4().to_string(),
        course: Some(course),
        date: Some(date),
        instructor_id: optional_str(&req.params, "instructorId"),
        open: true,
        opened_at: Some(now_stamp()),
        closed_at: None,
    };
    let session_id = session.id.clone();
    let row = records::insert(state, session)?;
    Ok(json!({ "sessionId": session_id, "session": row["record"] }))
}

fn session_close(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let session_id = required_str(&req.params, "sessionId")?;
    let mut session: AttendanceSession = records::fetch(state, &session_id)?;
    if !session.open {
        return Ok(json!({ "sessionId": session_id, "alreadyClosed": true }));
    }
    session.open = false;
    session.closed_at = Some(now_stamp());
    state.repo::<AttendanceSession>().update(session)?;

    let marked = state
        .repo::<AttendanceRecord>()
        .list()?
        .iter()
        .filter(|a| a.session_id.as_deref() == Some(session_id.as_str()))
        .count();
    tracing::info!(session_id = %session_id, marked, "attendance session closed");
    Ok(json!({ "sessionId": session_id, "alreadyClosed": false, "marked": marked }))
}

/// Records one student's status in an open session. Marking the same student
/// again replaces the earlier status.
fn mark(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let session_id = required_str(&req.params, "sessionId")?;
    let student_id = required_str(&req.params, "studentId")?;
    let status = parse_status(&req.params)?;
    let remarks = optional_str(&req.params, "remarks");

    let session: AttendanceSession = records::fetch(state, &session_id)?;
    if !session.open {
        return Err(HandlerErr::new("session_closed", "attendance session is closed")
            .with_details(json!({ "sessionId": session_id })));
    }
    let student: Student = records::fetch(state, &student_id)?;

    let existing = state
        .repo::<AttendanceRecord>()
        .list()?
        .into_iter()
        .find(|a| {
            a.session_id.as_deref() == Some(session_id.as_str())
                && a.student_id() == Some(student_id.as_str())
        });

    let (record, updated) = match existing {
        Some(mut prev) => {
            prev.status = Some(status.to_string());
            if remarks.is_some() {
                prev.remarks = remarks;
            }
            (prev, true)
        }
        None => (
            AttendanceRecord {
                id: Uuid::new_v4().to_string(),
                session_id: Some(session_id.clone()),
                student: Some(StudentRef {
                    id: student.id.clone(),
                    name: student.name.clone(),
                }),
                course: session.course.clone(),
                date: session.date.clone(),
                status: Some(status.to_string()),
                remarks,
            },
            false,
        ),
    };

    let attendance_id = record.id.clone();
    let row = record.display();
    if updated {
        state.repo::<AttendanceRecord>().update(record)?;
    } else {
        state.repo::<AttendanceRecord>().insert(record)?;
    }
    tracing::info!(session_id = %session_id, student_id = %student_id, status, updated, "attendance marked");
    Ok(json!({ "attendanceId": attendance_id, "updated": updated, "record": row }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.list" => records::list::<AttendanceRecord>(state, &req.params),
        "attendance.get" => records::get::<AttendanceRecord>(state, &req.params),
        "attendance.delete" => records::delete::<AttendanceRecord>(state, &req.params),
        "attendance.export" => records::export_csv::<AttendanceRecord>(state, &req.params),
        "attendance.mark" => mark(state, req),
        "attendance.sessions.list" => records::list::<AttendanceSession>(state, &req.params),
        "attendance.sessionOpen" => session_open(state, req),
        "attendance.sessionClose" => session_close(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
