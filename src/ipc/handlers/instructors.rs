use super::common::{respond, HandlerErr};
use super::records;
use crate::ipc::types::{AppState, Request};
use crate::records::Instructor;

fn validate(i: &Instructor) -> Result<(), HandlerErr> {
    if i.name.as_deref().map(str::trim).unwrap_or("").is_empty() {
        return Err(HandlerErr::bad_params("name must not be empty"));
    }
    if let Some(email) = i.email.as_deref() {
        if !email.contains('@') {
            return Err(HandlerErr::bad_params("email must contain @"));
        }
    }
    Ok(())
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let instructor: Instructor = records::from_params(&req.params)?;
    validate(&instructor)?;
    records::insert(state, instructor)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "instructors.list" => records::list::<Instructor>(state, &req.params),
        "instructors.get" => records::get::<Instructor>(state, &req.params),
        "instructors.create" => handle_create(state, req),
        "instructors.update" => records::update::<Instructor>(state, &req.params, validate),
        "instructors.delete" => records::delete::<Instructor>(state, &req.params),
        "instructors.export" => records::export_csv::<Instructor>(state, &req.params),
        _ => return None,
    };
    Some(respond(req, result))
}
