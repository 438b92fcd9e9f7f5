use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::records::{AttendanceRecord, AttendanceSession, Instructor, Notice, Student, TableModule};

pub const DB_FILE: &str = "schooldesk.sqlite3";
pub const SCHEMA_VERSION: i64 = 2;

const RECORD_TABLES: [&str; 5] = [
    Student::KIND,
    Instructor::KIND,
    AttendanceRecord::KIND,
    AttendanceSession::KIND,
    Notice::KIND,
];

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    for table in RECORD_TABLES {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table}(
                    id TEXT PRIMARY KEY,
                    body TEXT NOT NULL
                )"
            ),
            [],
        )?;
        // v1 workspaces stored bodies without a modification stamp.
        ensure_updated_at(&conn, table)?;
    }

    conn.execute(
        "CREATE TABLE IF NOT EXISTS notification_log(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            notice_id TEXT NOT NULL,
            audience TEXT NOT NULL,
            sent_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_notification_log_notice ON notification_log(notice_id)",
        [],
    )?;

    settings_set_json(
        &conn,
        "schema_version",
        &serde_json::json!(SCHEMA_VERSION),
    )?;

    Ok(conn)
}

fn ensure_updated_at(conn: &Connection, table: &str) -> anyhow::Result<()> {
    if table_has_column(conn, table, "updated_at")? {
        return Ok(());
    }
    conn.execute(&format!("ALTER TABLE {table} ADD COLUMN updated_at TEXT"), [])?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn settings_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row("SELECT value_json FROM settings WHERE key = ?", [key], |r| {
            r.get(0)
        })
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn log_notification(
    conn: &Connection,
    notice_id: &str,
    audience: &str,
    sent_at: &str,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO notification_log(notice_id, audience, sent_at) VALUES(?, ?, ?)",
        (notice_id, audience, sent_at),
    )?;
    Ok(())
}

pub fn notification_count(conn: &Connection, notice_id: &str) -> anyhow::Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM notification_log WHERE notice_id = ?",
        [notice_id],
        |r| r.get(0),
    )?)
}
