//! Derived dashboard figures. Everything here is a total function over the
//! record slices: missing fields fall into an "Unknown"/"Unassigned" bucket
//! and percentages are clamped to [0, 100].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::attendance::ATTENDANCE_STATUSES;
use crate::records::instructor::INSTRUCTOR_STATUSES;
use crate::records::notice::PRIORITIES;
use crate::records::student::STUDENT_STATUSES;
use crate::records::{
    canonical_choice, clamp_percent, AttendanceRecord, Instructor, Notice, Student, UNKNOWN,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub department: String,
    pub count: usize,
    pub average_experience: Option<f64>,
    pub average_rating: Option<f64>,
    pub instructors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: usize,
    pub active_students: usize,
    pub student_status: Vec<Bucket>,
    pub average_gpa: Option<f64>,
    pub average_student_attendance: Option<f64>,
    pub total_instructors: usize,
    pub departments: Vec<DepartmentSummary>,
    pub attendance_rate: f64,
    pub attendance_status: Vec<Bucket>,
    pub total_notices: usize,
    pub pinned_notices: usize,
    pub notice_priority: Vec<Bucket>,
}

pub fn average(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Counts per label. `known` labels always appear, in order, even when empty;
/// anything else lands in a trailing "Unknown" bucket.
pub fn distribution<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    known: &[&'static str],
) -> Vec<Bucket> {
    let mut counts: Vec<usize> = vec![0; known.len()];
    let mut unknown = 0usize;
    let mut total = 0usize;
    for label in labels {
        total += 1;
        match known.iter().position(|k| *k == label) {
            Some(i) => counts[i] += 1,
            None => unknown += 1,
        }
    }
    let pct = |c: usize| {
        if total == 0 {
            0.0
        } else {
            round2(clamp_percent(c as f64 * 100.0 / total as f64))
        }
    };
    let mut out: Vec<Bucket> = known
        .iter()
        .zip(counts)
        .map(|(k, c)| Bucket {
            label: k.to_string(),
            count: c,
            percent: pct(c),
        })
        .collect();
    if unknown > 0 {
        out.push(Bucket {
            label: UNKNOWN.to_string(),
            count: unknown,
            percent: pct(unknown),
        });
    }
    out
}

pub fn instructors_by_department(instructors: &[Instructor]) -> Vec<DepartmentSummary> {
    let mut groups: BTreeMap<String, (String, Vec<&Instructor>)> = BTreeMap::new();
    for i in instructors {
        let (key, label) = i.department_group();
        groups.entry(key).or_insert_with(|| (label, Vec::new())).1.push(i);
    }
    groups
        .into_values()
        .map(|(department, members)| DepartmentSummary {
            department,
            count: members.len(),
            average_experience: average(
                members
                    .iter()
                    .filter_map(|i| i.experience_years.map(f64::from)),
            )
            .map(round2),
            average_rating: average(members.iter().filter_map(|i| i.clamped_rating())).map(round2),
            instructors: members
                .iter()
                .map(|i| i.name.clone().unwrap_or_else(|| UNKNOWN.to_string()))
                .collect(),
        })
        .collect()
}

/// Share of marks that count as attended, as a percentage.
pub fn attendance_rate(records: &[AttendanceRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let attended = records.iter().filter(|r| r.attended()).count();
    round2(clamp_percent(attended as f64 * 100.0 / records.len() as f64))
}

pub fn dashboard(
    students: &[Student],
    instructors: &[Instructor],
    attendance: &[AttendanceRecord],
    notices: &[Notice],
) -> DashboardSummary {
    let student_status = distribution(
        students
            .iter()
            .map(|s| canonical_choice(&s.status, &STUDENT_STATUSES)),
        &STUDENT_STATUSES,
    );
    let active_students = student_status
        .iter()
        .find(|b| b.label == "Active")
        .map(|b| b.count)
        .unwrap_or(0);

    DashboardSummary {
        total_students: students.len(),
        active_students,
        student_status,
        average_gpa: average(students.iter().filter_map(|s| s.gpa)).map(round2),
        average_student_attendance: average(
            students
                .iter()
                .filter_map(|s| s.attendance_rate.map(clamp_percent)),
        )
        .map(round2),
        total_instructors: instructors.len(),
        departments: instructors_by_department(instructors),
        attendance_rate: attendance_rate(attendance),
        attendance_status: distribution(
            attendance
                .iter()
                .map(|a| canonical_choice(&a.status, &ATTENDANCE_STATUSES)),
            &ATTENDANCE_STATUSES,
        ),
        total_notices: notices.len(),
        pinned_notices: notices.iter().filter(|n| n.is_pinned()).count(),
        notice_priority: distribution(
            notices
                .iter()
                .map(|n| canonical_choice(&n.priority, &PRIORITIES)),
            &PRIORITIES,
        ),
    }
}

/// Instructor status breakdown, used by the instructors overview card.
pub fn instructor_status(instructors: &[Instructor]) -> Vec<Bucket> {
    distribution(
        instructors
            .iter()
            .map(|i| canonical_choice(&i.status, &INSTRUCTOR_STATUSES)),
        &INSTRUCTOR_STATUSES,
    )
}
