use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{canonical_choice, lower, opt_json, text_or, TableModule, NOT_AVAILABLE, UNKNOWN};
use crate::table::{ColumnDescriptor, FilterDescriptor, Record, SortOption};

pub const INSTRUCTOR_STATUSES: [&str; 3] = ["Active", "On Leave", "Inactive"];
pub const DEPARTMENTS: [&str; 5] = ["Mathematics", "Science", "English", "History", "Arts"];
pub const UNASSIGNED: &str = "Unassigned";

type Column = ColumnDescriptor<Instructor>;
type Sort = SortOption<Instructor>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Instructor {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub status: Option<String>,
    pub experience_years: Option<u32>,
    pub rating: Option<f64>,
    pub joined_on: Option<String>,
}

impl Instructor {
    pub fn department_or_unassigned(&self) -> String {
        text_or(&self.department, UNASSIGNED)
    }

    /// Case-insensitive grouping key, matching how the department filter compares.
    /// Listed departments take their canonical spelling as the label.
    pub fn department_group(&self) -> (String, String) {
        let label = match canonical_choice(&self.department, &DEPARTMENTS) {
            UNKNOWN => self.department_or_unassigned(),
            listed => listed.to_string(),
        };
        (label.to_lowercase(), label)
    }

    /// Rating on a 0-5 scale, if one is recorded.
    pub fn clamped_rating(&self) -> Option<f64> {
        self.rating
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 5.0))
    }
}

impl Record for Instructor {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(json!(self.id)),
            "name" => opt_json(&self.name),
            "email" => opt_json(&self.email),
            "department" => opt_json(&self.department),
            "subjects" => opt_json(&self.subjects),
            "status" => opt_json(&self.status),
            "experienceYears" => opt_json(&self.experience_years),
            "rating" => opt_json(&self.rating),
            "joinedOn" => opt_json(&self.joined_on),
            _ => None,
        }
    }
}

fn by_name(a: &Instructor, b: &Instructor) -> Ordering {
    lower(&a.name).cmp(&lower(&b.name))
}

impl TableModule for Instructor {
    const KIND: &'static str = "instructors";

    fn columns() -> Vec<ColumnDescriptor<Self>> {
        vec![
            Column::new("name", "Instructor")
                .render_with(|i, _| text_or(&i.name, UNKNOWN))
                .sortable(),
            Column::new("department", "Department").render_with(|i, _| i.department_or_unassigned()),
            Column::new("subjects", "Subjects").render_with(|i, _| {
                match i.subjects.as_deref() {
                    Some(list) if !list.is_empty() => list.join(", "),
                    _ => NOT_AVAILABLE.to_string(),
                }
            }),
            Column::new("status", "Status")
                .render_with(|i, _| canonical_choice(&i.status, &INSTRUCTOR_STATUSES).to_string()),
            Column::new("experienceYears", "Experience")
                .render_with(|i, _| match i.experience_years {
                    Some(1) => "1 year".to_string(),
                    Some(y) => format!("{y} years"),
                    None => NOT_AVAILABLE.to_string(),
                })
                .sortable(),
            Column::new("rating", "Rating")
                .render_with(|i, _| {
                    i.clamped_rating()
                        .map(|r| format!("{r:.1}"))
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
                })
                .sortable(),
        ]
    }

    fn filters() -> Vec<FilterDescriptor> {
        vec![
            FilterDescriptor::with_all("department", "Department", &DEPARTMENTS),
            FilterDescriptor::with_all("status", "Status", &INSTRUCTOR_STATUSES),
        ]
    }

    fn sort_options() -> Vec<SortOption<Self>> {
        vec![
            Sort::new("name_asc", "Name (A-Z)", by_name),
            Sort::new("experience_desc", "Most experienced", |a, b| {
                b.experience_years
                    .unwrap_or(0)
                    .cmp(&a.experience_years.unwrap_or(0))
                    .then_with(|| by_name(a, b))
            }),
            Sort::new("rating_desc", "Top rated", |a, b| {
                b.clamped_rating()
                    .unwrap_or(-1.0)
                    .total_cmp(&a.clamped_rating().unwrap_or(-1.0))
            }),
        ]
    }

    fn search_fields() -> &'static [&'static str] {
        &["name", "email", "department", "subjects"]
    }

    fn display(&self) -> Value {
        json!({
            "id": self.id,
            "name": text_or(&self.name, UNKNOWN),
            "email": text_or(&self.email, NOT_AVAILABLE),
            "department": self.department_or_unassigned(),
            "subjects": self.subjects.clone().unwrap_or_default(),
            "status": canonical_choice(&self.status, &INSTRUCTOR_STATUSES),
            "experienceYears": self.experience_years.unwrap_or(0),
            "rating": self.clamped_rating(),
            "joinedOn": text_or(&self.joined_on, NOT_AVAILABLE),
        })
    }
}
