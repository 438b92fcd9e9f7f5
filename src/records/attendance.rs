use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{canonical_choice, lower, opt_json, text_or, TableModule, NOT_AVAILABLE, UNKNOWN};
use crate::table::{
    is_active_filter, matches_filters, sort_by_options, ColumnDescriptor, FilterDescriptor,
    FilterState, Pipeline, Record, SortOption,
};

pub const ATTENDANCE_STATUSES: [&str; 4] = ["Present", "Absent", "Late", "Excused"];
pub const COURSES: [&str; 4] = ["Algebra I", "Biology", "World History", "English Literature"];

type Column = ColumnDescriptor<AttendanceRecord>;
type Sort = SortOption<AttendanceRecord>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentRef {
    pub id: String,
    pub name: Option<String>,
}

/// One student's mark within an attendance session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceRecord {
    pub id: String,
    pub session_id: Option<String>,
    pub student: Option<StudentRef>,
    pub course: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
    pub remarks: Option<String>,
}

impl AttendanceRecord {
    pub fn student_name(&self) -> Option<&str> {
        self.student.as_ref().and_then(|s| s.name.as_deref())
    }

    pub fn student_id(&self) -> Option<&str> {
        self.student.as_ref().map(|s| s.id.as_str())
    }

    /// Present and late both count as attended.
    pub fn attended(&self) -> bool {
        matches!(
            canonical_choice(&self.status, &ATTENDANCE_STATUSES),
            "Present" | "Late"
        )
    }
}

impl Record for AttendanceRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(json!(self.id)),
            "sessionId" => opt_json(&self.session_id),
            "student" => opt_json(&self.student),
            "student.name" => self.student_name().map(|n| json!(n)),
            "student.id" => self.student_id().map(|n| json!(n)),
            "course" => opt_json(&self.course),
            "date" => opt_json(&self.date),
            "status" => opt_json(&self.status),
            "remarks" => opt_json(&self.remarks),
            _ => None,
        }
    }
}

impl TableModule for AttendanceRecord {
    const KIND: &'static str = "attendance";

    fn columns() -> Vec<ColumnDescriptor<Self>> {
        vec![
            Column::new("student.name", "Student")
                .render_with(|a, _| a.student_name().unwrap_or(UNKNOWN).to_string())
                .sortable(),
            Column::new("course", "Course").render_with(|a, _| text_or(&a.course, NOT_AVAILABLE)),
            Column::new("date", "Date")
                .render_with(|a, _| text_or(&a.date, NOT_AVAILABLE))
                .sortable(),
            Column::new("status", "Status")
                .render_with(|a, _| canonical_choice(&a.status, &ATTENDANCE_STATUSES).to_string()),
            Column::new("remarks", "Remarks"),
        ]
    }

    fn filters() -> Vec<FilterDescriptor> {
        vec![
            FilterDescriptor::with_all("status", "Status", &ATTENDANCE_STATUSES),
            FilterDescriptor::with_all("course", "Course", &COURSES),
            FilterDescriptor::with_all("attended", "Attended", &["Yes", "No"]),
        ]
    }

    fn sort_options() -> Vec<SortOption<Self>> {
        vec![
            Sort::new("date_desc", "Newest first", |a, b| lower(&b.date).cmp(&lower(&a.date))),
            Sort::new("date_asc", "Oldest first", |a, b| lower(&a.date).cmp(&lower(&b.date))),
            Sort::new("student_asc", "Student (A-Z)", |a, b| {
                let an = a.student_name().unwrap_or("").to_lowercase();
                let bn = b.student_name().unwrap_or("").to_lowercase();
                an.cmp(&bn)
            }),
        ]
    }

    fn search_fields() -> &'static [&'static str] {
        &["student.name", "course"]
    }

    /// Search matches the nested student name or the course, never ids.
    /// `attended` is derived from the status rather than read from a field.
    fn pipeline() -> Pipeline<Self> {
        Pipeline::new(Self::search_fields())
            .with_search(|a: &AttendanceRecord, term: &str| {
                let needle = term.to_lowercase();
                a.student_name()
                    .map(|n| n.to_lowercase().contains(&needle))
                    .unwrap_or(false)
                    || lower(&a.course).contains(&needle)
            })
            .with_filter(|a: &AttendanceRecord, filters: &FilterState| {
                let mut rest = filters.clone();
                let attended_ok = match rest.remove("attended") {
                    Some(v) if is_active_filter(&v) => {
                        v.trim().eq_ignore_ascii_case("yes") == a.attended()
                    }
                    _ => true,
                };
                attended_ok && matches_filters(a, &rest)
            })
            .with_sorter(sort_by_options(Self::sort_options()))
    }

    fn display(&self) -> Value {
        json!({
            "id": self.id,
            "sessionId": self.session_id,
            "studentId": self.student_id(),
            "studentName": self.student_name().unwrap_or(UNKNOWN),
            "course": text_or(&self.course, NOT_AVAILABLE),
            "date": text_or(&self.date, NOT_AVAILABLE),
            "status": canonical_choice(&self.status, &ATTENDANCE_STATUSES),
            "remarks": text_or(&self.remarks, ""),
        })
    }
}

/// A class meeting students are marked against. Marks are only accepted
/// while the session is open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceSession {
    pub id: String,
    pub course: Option<String>,
    pub date: Option<String>,
    pub instructor_id: Option<String>,
    pub open: bool,
    pub opened_at: Option<String>,
    pub closed_at: Option<String>,
}

impl Record for AttendanceSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(json!(self.id)),
            "course" => opt_json(&self.course),
            "date" => opt_json(&self.date),
            "instructorId" => opt_json(&self.instructor_id),
            "open" => Some(json!(self.open)),
            "state" => Some(json!(if self.open { "Open" } else { "Closed" })),
            _ => None,
        }
    }
}

impl TableModule for AttendanceSession {
    const KIND: &'static str = "attendance_sessions";

    fn columns() -> Vec<ColumnDescriptor<Self>> {
        vec![
            ColumnDescriptor::<Self>::new("course", "Course")
                .render_with(|s, _| text_or(&s.course, NOT_AVAILABLE)),
            ColumnDescriptor::<Self>::new("date", "Date").sortable(),
            ColumnDescriptor::<Self>::new("state", "State"),
        ]
    }

    fn filters() -> Vec<FilterDescriptor> {
        vec![FilterDescriptor::with_all("state", "State", &["Open", "Closed"])]
    }

    fn sort_options() -> Vec<SortOption<Self>> {
        vec![SortOption::<Self>::new("date_desc", "Newest first", |a, b| {
            lower(&b.date).cmp(&lower(&a.date))
        })]
    }

    fn search_fields() -> &'static [&'static str] {
        &["course", "date"]
    }

    fn display(&self) -> Value {
        json!({
            "id": self.id,
            "course": text_or(&self.course, NOT_AVAILABLE),
            "date": text_or(&self.date, NOT_AVAILABLE),
            "instructorId": self.instructor_id,
            "open": self.open,
            "openedAt": self.opened_at,
            "closedAt": self.closed_at,
        })
    }
}
