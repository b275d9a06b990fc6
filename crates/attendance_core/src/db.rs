use crate::error::Result;
use crate::profile::{ProfileKey, ProfileStore};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Profile store backed by a single SQLite file.
pub struct SqliteProfileStore {
    conn: Connection,
}

impl SqliteProfileStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        init(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init(&conn)?;
        Ok(Self { conn })
    }
}

fn init(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS profile_entries (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL,
          updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now'))
        );
        "#,
    )?;
    Ok(())
}

impl ProfileStore for SqliteProfileStore {
    fn get(&self, key: ProfileKey) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM profile_entries WHERE key = ?1",
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: ProfileKey, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO profile_entries (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
              value=excluded.value,
              updated_at=strftime('%Y-%m-%dT%H:%M:%fZ','now')
            "#,
            params![key.as_str(), value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: ProfileKey) -> Result<()> {
        self.conn
            .execute("DELETE FROM profile_entries WHERE key = ?1", params![key.as_str()])?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM profile_entries", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn open_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("profile.db");
        let mut store = SqliteProfileStore::open(&path).unwrap();
        store.set(ProfileKey::Session, "{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unusable_profile_dir_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let result = SqliteProfileStore::open(&blocker.join("profile.db"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn upsert_replaces_value() {
        let mut store = SqliteProfileStore::open_in_memory().unwrap();
        store.set(ProfileKey::Meetings, "[1]").unwrap();
        store.set(ProfileKey::Meetings, "[2]").unwrap();
        assert_eq!(store.get(ProfileKey::Meetings).unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn clear_drops_every_key() {
        let mut store = SqliteProfileStore::open_in_memory().unwrap();
        for key in ProfileKey::ALL {
            store.set(key, "[]").unwrap();
        }
        store.clear().unwrap();
        for key in ProfileKey::ALL {
            assert_eq!(store.get(key).unwrap(), None);
        }
    }
}
