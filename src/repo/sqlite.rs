use std::marker::PhantomData;

use rusqlite::{Connection, OptionalExtension};

use super::{Entity, Repository, StoreError};

/// Records stored as JSON bodies in a per-kind table created by `db::open_db`.
pub struct SqliteRepository<'a, R> {
    conn: &'a Connection,
    _kind: PhantomData<R>,
}

impl<'a, R: Entity> SqliteRepository<'a, R> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            _kind: PhantomData,
        }
    }
}

fn now_stamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl<R: Entity> Repository<R> for SqliteRepository<'_, R> {
    fn list(&self) -> Result<Vec<R>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT body FROM {} ORDER BY rowid", R::KIND))?;
        let bodies = stmt
            .query_map([], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        bodies
            .iter()
            .map(|b| serde_json::from_str(b).map_err(StoreError::from))
            .collect()
    }

    fn get(&self, id: &str) -> Result<Option<R>, StoreError> {
        let body: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT body FROM {} WHERE id = ?", R::KIND),
                [id],
                |r| r.get(0),
            )
            .optional()?;
        match body {
            Some(b) => Ok(Some(serde_json::from_str(&b)?)),
            None => Ok(None),
        }
    }

    fn insert(&mut self, record: R) -> Result<(), StoreError> {
        let exists: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?", R::KIND),
                [record.id()],
                |r| r.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(StoreError::DuplicateId(record.id().to_string()));
        }
        let body = serde_json::to_string(&record)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {}(id, body, updated_at) VALUES(?, ?, ?)",
                R::KIND
            ),
            (record.id(), &body, now_stamp()),
        )?;
        Ok(())
    }

    fn update(&mut self, record: R) -> Result<(), StoreError> {
        let body = serde_json::to_string(&record)?;
        let changed = self.conn.execute(
            &format!("UPDATE {} SET body = ?, updated_at = ? WHERE id = ?", R::KIND),
            (&body, now_stamp(), record.id()),
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(record.id().to_string()));
        }
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?", R::KIND), [id])?;
        Ok(changed > 0)
    }
}
