use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{
    canonical_choice, clamp_percent, lower, opt_json, text_or, TableModule, NOT_AVAILABLE, UNKNOWN,
};
use crate::table::{ColumnDescriptor, FilterDescriptor, Record, SortOption};

pub const STUDENT_STATUSES: [&str; 3] = ["Active", "Inactive", "Graduated"];
pub const GRADES: [&str; 4] = ["9", "10", "11", "12"];

type Column = ColumnDescriptor<Student>;
type Sort = SortOption<Student>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Student {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub grade: Option<String>,
    pub section: Option<String>,
    pub status: Option<String>,
    pub gpa: Option<f64>,
    pub attendance_rate: Option<f64>,
    pub guardian: Option<String>,
    pub enrolled_on: Option<String>,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Student {
    /// `grade-section`, or just the grade when no section is recorded.
    pub fn grade_label(&self) -> String {
        match (non_blank(&self.grade), non_blank(&self.section)) {
            (Some(g), Some(sec)) => format!("{g}-{sec}"),
            (Some(g), None) => g.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        }
    }
}

impl Record for Student {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(json!(self.id)),
            "name" => opt_json(&self.name),
            "email" => opt_json(&self.email),
            "grade" => opt_json(&self.grade),
            "section" => opt_json(&self.section),
            "status" => opt_json(&self.status),
            "gpa" => opt_json(&self.gpa),
            "attendanceRate" => opt_json(&self.attendance_rate),
            "guardian" => opt_json(&self.guardian),
            "enrolledOn" => opt_json(&self.enrolled_on),
            _ => None,
        }
    }
}

fn by_name(a: &Student, b: &Student) -> Ordering {
    lower(&a.name).cmp(&lower(&b.name))
}

impl TableModule for Student {
    const KIND: &'static str = "students";

    fn columns() -> Vec<ColumnDescriptor<Self>> {
        vec![
            Column::new("name", "Student")
                .render_with(|s, _| text_or(&s.name, UNKNOWN))
                .sortable(),
            Column::new("email", "Email"),
            Column::new("grade", "Grade").render_with(|s, _| s.grade_label()),
            Column::new("status", "Status")
                .render_with(|s, _| canonical_choice(&s.status, &STUDENT_STATUSES).to_string()),
            Column::new("gpa", "GPA")
                .render_with(|s, _| format_gpa(s.gpa))
                .sortable(),
            Column::new("attendanceRate", "Attendance")
                .render_with(|s, _| format!("{:.0}%", clamp_percent(s.attendance_rate.unwrap_or(0.0))))
                .sortable(),
        ]
    }

    fn filters() -> Vec<FilterDescriptor> {
        vec![
            FilterDescriptor::with_all("grade", "Grade", &GRADES),
            FilterDescriptor::with_all("status", "Status", &STUDENT_STATUSES),
        ]
    }

    fn sort_options() -> Vec<SortOption<Self>> {
        vec![
            Sort::new("name_asc", "Name (A-Z)", by_name),
            Sort::new("name_desc", "Name (Z-A)", |a, b| by_name(b, a)),
            Sort::new("gpa_desc", "Highest GPA", |a, b| {
                b.gpa.unwrap_or(f64::MIN).total_cmp(&a.gpa.unwrap_or(f64::MIN))
            }),
            Sort::new("attendance_desc", "Best attendance", |a, b| {
                b.attendance_rate
                    .unwrap_or(f64::MIN)
                    .total_cmp(&a.attendance_rate.unwrap_or(f64::MIN))
            }),
        ]
    }

    fn search_fields() -> &'static [&'static str] {
        &["name", "email", "id", "guardian"]
    }

    fn display(&self) -> Value {
        json!({
            "id": self.id,
            "name": text_or(&self.name, UNKNOWN),
            "email": text_or(&self.email, NOT_AVAILABLE),
            "grade": text_or(&self.grade, NOT_AVAILABLE),
            "section": text_or(&self.section, NOT_AVAILABLE),
            "status": canonical_choice(&self.status, &STUDENT_STATUSES),
            "gpa": format_gpa(self.gpa),
            "attendanceRate": clamp_percent(self.attendance_rate.unwrap_or(0.0)),
            "guardian": text_or(&self.guardian, NOT_AVAILABLE),
            "enrolledOn": text_or(&self.enrolled_on, NOT_AVAILABLE),
        })
    }
}

fn format_gpa(gpa: Option<f64>) -> String {
    match gpa {
        Some(v) if v.is_finite() => format!("{:.2}", v.clamp(0.0, 4.0)),
        _ => NOT_AVAILABLE.to_string(),
    }
}
