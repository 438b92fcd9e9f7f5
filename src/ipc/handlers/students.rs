use super::common::{respond, HandlerErr};
use super::records;
use crate::ipc::types::{AppState, Request};
use crate::records::Student;

fn validate(s: &Student) -> Result<(), HandlerErr> {
    if s.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
        return Err(HandlerErr::bad_params("name must not be empty"));
    }
    if let Some(gpa) = s.gpa {
        if !(0.0..=4.0).contains(&gpa) {
            return Err(HandlerErr::bad_params("gpa must be between 0 and 4"));
        }
    }
    Ok(())
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let student: Student = records::from_params(&req.params)?;
    validate(&student)?;
    records::insert(state, student)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => records::list::<Student>(state, &req.params),
        "students.get" => records::get::<Student>(state, &req.params),
        "students.create" => handle_create(state, req),
        "students.update" => records::update::<Student>(state, &req.params, validate),
        "students.delete" => records::delete::<Student>(state, &req.params),
        "students.export" => records::export_csv::<Student>(state, &req.params),
        _ => return None,
    };
    Some(respond(req, result))
}
