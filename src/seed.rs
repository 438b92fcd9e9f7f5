//! Demo records loaded into the in-memory store when no workspace is selected.

use crate::records::{
    AttendanceRecord, AttendanceSession, Instructor, Notice, Student, StudentRef,
};
use crate::repo::MemoryStore;

fn s(v: &str) -> Option<String> {
    Some(v.to_string())
}

#[allow(clippy::too_many_arguments)]
fn student(
    id: &str,
    name: &str,
    grade: &str,
    section: &str,
    status: &str,
    gpa: f64,
    attendance: f64,
    guardian: Option<&str>,
) -> Student {
    let email = format!(
        "{}@students.school.test",
        name.to_lowercase().replace(' ', ".")
    );
    Student {
        id: id.to_string(),
        name: s(name),
        email: Some(email),
        grade: s(grade),
        section: s(section),
        status: s(status),
        gpa: Some(gpa),
        attendance_rate: Some(attendance),
        guardian: guardian.map(str::to_string),
        enrolled_on: s("2024-09-02"),
    }
}

pub fn demo_students() -> Vec<Student> {
    let mut out = vec![
        student("stu-001", "Alice Johnson", "10", "A", "Active", 3.8, 96.0, Some("Mary Johnson")),
        student("stu-002", "Bob Smith", "10", "B", "Active", 2.9, 88.5, Some("Tom Smith")),
        student("stu-003", "Chloe Martin", "11", "A", "Active", 3.4, 92.0, Some("Anne Martin")),
        student("stu-004", "Daniel Kim", "12", "A", "Graduated", 3.9, 98.0, None),
        student("stu-005", "Ella Rossi", "9", "C", "Active", 3.1, 79.0, Some("Marco Rossi")),
        student("stu-006", "Farid Haddad", "11", "B", "Inactive", 2.2, 61.5, Some("Leila Haddad")),
        student("stu-007", "Grace Okafor", "9", "A", "Active", 3.6, 94.0, Some("Chidi Okafor")),
        student("stu-008", "Hiro Tanaka", "12", "B", "Active", 3.3, 90.0, Some("Yuki Tanaka")),
        student("stu-009", "Isla Novak", "10", "A", "Active", 3.0, 85.0, None),
        student("stu-010", "Jonas Berg", "11", "C", "Active", 2.7, 83.0, Some("Erik Berg")),
        student("stu-011", "Kavya Rao", "9", "B", "Active", 3.95, 99.0, Some("Sunil Rao")),
        student("stu-012", "Liam O'Brien", "12", "C", "Inactive", 2.4, 70.0, None),
    ];
    // Incomplete rows as they arrive from older imports.
    out.push(Student {
        id: "stu-013".to_string(),
        name: s("Mia Alvarez"),
        grade: s("10"),
        attendance_rate: Some(104.0),
        ..Student::default()
    });
    out.push(Student {
        id: "stu-014".to_string(),
        name: None,
        status: s("active"),
        ..Student::default()
    });
    out
}

fn instructor(
    id: &str,
    name: &str,
    department: Option<&str>,
    subjects: &[&str],
    status: &str,
    years: u32,
    rating: f64,
) -> Instructor {
    Instructor {
        id: id.to_string(),
        name: s(name),
        email: Some(format!(
            "{}@staff.school.test",
            name.to_lowercase().replace(' ', ".")
        )),
        department: department.map(str::to_string),
        subjects: Some(subjects.iter().map(|v| v.to_string()).collect()),
        status: s(status),
        experience_years: Some(years),
        rating: Some(rating),
        joined_on: s("2019-08-15"),
    }
}

pub fn demo_instructors() -> Vec<Instructor> {
    vec![
        instructor("ins-001", "Sarah Lee", Some("Mathematics"), &["Algebra I", "Geometry"], "Active", 12, 4.7),
        instructor("ins-002", "David Chen", Some("Science"), &["Biology", "Chemistry"], "Active", 8, 4.4),
        instructor("ins-003", "Priya Patel", Some("English"), &["English Literature"], "Active", 5, 4.8),
        instructor("ins-004", "Marcus Reed", Some("History"), &["World History"], "On Leave", 15, 4.1),
        instructor("ins-005", "Laura Gomez", Some("Mathematics"), &["Calculus"], "Active", 3, 3.9),
        instructor("ins-006", "Owen Walsh", Some("Science"), &["Physics"], "Active", 20, 4.6),
        instructor("ins-007", "Nina Petrova", Some("Arts"), &["Painting", "Design"], "Inactive", 7, 4.0),
        instructor("ins-008", "Sam Taylor", None, &[], "Active", 1, 3.5),
    ]
}

pub fn demo_sessions() -> Vec<AttendanceSession> {
    let session = |id: &str, course: &str, date: &str, instructor: &str, open: bool| AttendanceSession {
        id: id.to_string(),
        course: s(course),
        date: s(date),
        instructor_id: s(instructor),
        open,
        opened_at: Some(format!("{date}T08:30:00Z")),
        closed_at: if open {
            None
        } else {
            Some(format!("{date}T09:30:00Z"))
        },
    };
    vec![
        session("ses-001", "Algebra I", "2026-10-12", "ins-001", false),
        session("ses-002", "Biology", "2026-10-13", "ins-002", false),
        session("ses-003", "World History", "2026-10-14", "ins-004", true),
    ]
}

pub fn demo_attendance() -> Vec<AttendanceRecord> {
    let marks: [(&str, &str, &str, &str); 10] = [
        ("ses-001", "stu-001", "Alice Johnson", "Present"),
        ("ses-001", "stu-002", "Bob Smith", "Late"),
        ("ses-001", "stu-009", "Isla Novak", "Absent"),
        ("ses-001", "stu-013", "Mia Alvarez", "Present"),
        ("ses-002", "stu-003", "Chloe Martin", "Present"),
        ("ses-002", "stu-006", "Farid Haddad", "Absent"),
        ("ses-002", "stu-010", "Jonas Berg", "Excused"),
        ("ses-002", "stu-001", "Alice Johnson", "Present"),
        ("ses-003", "stu-008", "Hiro Tanaka", "Present"),
        ("ses-003", "stu-004", "Daniel Kim", "Late"),
    ];
    let sessions = demo_sessions();
    marks
        .iter()
        .enumerate()
        .map(|(i, (session_id, student_id, name, status))| {
            let session = sessions.iter().find(|x| x.id == *session_id);
            AttendanceRecord {
                id: format!("att-{:03}", i + 1),
                session_id: s(session_id),
                student: Some(StudentRef {
                    id: student_id.to_string(),
                    name: s(name),
                }),
                course: session.and_then(|x| x.course.clone()),
                date: session.and_then(|x| x.date.clone()),
                status: s(status),
                remarks: None,
            }
        })
        .collect()
}

pub fn demo_notices() -> Vec<Notice> {
    let notice = |id: &str, title: &str, audience: &str, priority: &str, date: &str, pinned: bool| Notice {
        id: id.to_string(),
        title: s(title),
        body: Some(format!("{title}. See the front office for details.")),
        audience: s(audience),
        priority: s(priority),
        author: s("Front Office"),
        published_on: s(date),
        pinned: Some(pinned),
        notified_at: None,
    };
    vec![
        notice("not-001", "Parent-teacher conferences", "All", "High", "2026-10-01", true),
        notice("not-002", "Science fair registration open", "Students", "Normal", "2026-10-05", false),
        notice("not-003", "Staff meeting moved to Thursday", "Instructors", "High", "2026-10-09", false),
        notice("not-004", "Library hours extended", "All", "Low", "2026-09-20", false),
        notice("not-005", "Midterm exam timetable", "Students", "High", "2026-10-11", false),
        Notice {
            id: "not-006".to_string(),
            title: s("Cafeteria menu update"),
            ..Notice::default()
        },
    ]
}

pub fn demo_store() -> MemoryStore {
    MemoryStore {
        students: demo_students(),
        instructors: demo_instructors(),
        attendance: demo_attendance(),
        sessions: demo_sessions(),
        notices: demo_notices(),
    }
}
