use bantay_common::types::Role;
use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Result, StorageError};

mod cctv;
mod contact;
mod iot;
mod location;
mod lookup;
mod post;
mod user;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT
);

CREATE TABLE IF NOT EXISTS locations (
    id TEXT PRIMARY KEY,
    location_name TEXT NOT NULL,
    barangay TEXT NOT NULL,
    landmark TEXT,
    description TEXT,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    archived INTEGER NOT NULL DEFAULT 0,
    archived_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_locations_archived ON locations(archived);

CREATE TABLE IF NOT EXISTS cctv_devices (
    id TEXT PRIMARY KEY,
    device_name TEXT NOT NULL,
    primary_rtsp_url TEXT NOT NULL,
    backup_rtsp_url TEXT,
    location_id TEXT NOT NULL REFERENCES locations(id),
    status TEXT NOT NULL,
    fps INTEGER,
    resolution TEXT,
    description TEXT,
    archived INTEGER NOT NULL DEFAULT 0,
    archived_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cctv_devices_location ON cctv_devices(location_id);
CREATE INDEX IF NOT EXISTS idx_cctv_devices_archived ON cctv_devices(archived);

CREATE TABLE IF NOT EXISTS contacts (
    id TEXT PRIMARY KEY,
    branch_unit_name TEXT NOT NULL,
    responder_type TEXT NOT NULL,
    primary_mobile TEXT NOT NULL,
    backup_mobile TEXT,
    latitude REAL,
    longitude REAL,
    archived INTEGER NOT NULL DEFAULT 0,
    archived_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_contacts_archived ON contacts(archived);

CREATE TABLE IF NOT EXISTS iot_devices (
    id TEXT PRIMARY KEY,
    device_name TEXT NOT NULL,
    status TEXT NOT NULL,
    location_id TEXT REFERENCES locations(id),
    custom_address TEXT,
    custom_latitude REAL,
    custom_longitude REAL,
    cctv_id TEXT REFERENCES cctv_devices(id),
    description TEXT,
    archived INTEGER NOT NULL DEFAULT 0,
    archived_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_iot_devices_archived ON iot_devices(archived);

CREATE TABLE IF NOT EXISTS public_posts (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    category TEXT,
    status TEXT NOT NULL,
    published_at INTEGER,
    image_path TEXT,
    archived INTEGER NOT NULL DEFAULT 0,
    archived_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_public_posts_archived ON public_posts(archived);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    middle_name TEXT,
    last_name TEXT NOT NULL,
    suffix TEXT,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    role_id INTEGER NOT NULL REFERENCES roles(id),
    password_hash TEXT NOT NULL,
    contact_number TEXT,
    street TEXT,
    purok TEXT,
    barangay TEXT,
    city TEXT,
    archived INTEGER NOT NULL DEFAULT 0,
    archived_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_archived ON users(archived);
";

const DEFAULT_ROLES: &[(i64, &str, &str)] = &[
    (1, "Administrator", "Full access to every console module"),
    (2, "Barangay Staff", "Manages devices, contacts and posts"),
    (3, "Purok Leader", "Signs in with a numeric PIN"),
];

/// Owns the console database. All access goes through one connection
/// guarded by a mutex.
pub struct ConsoleStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl ConsoleStore {
    /// Opens (or creates) `bantay.db` under `data_dir`, applies the schema
    /// and seeds the fixed roles.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| {
            StorageError::Other(format!("create data dir {}: {e}", data_dir.display()))
        })?;
        let db_path = data_dir.join("bantay.db");
        let conn = Connection::open(&db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;
        for (id, name, description) in DEFAULT_ROLES {
            conn.execute(
                "INSERT OR IGNORE INTO roles (id, name, description) VALUES (?1, ?2, ?3)",
                params![id, name, description],
            )?;
        }
        tracing::info!(path = %db_path.display(), "Initialized console store");
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half-written,
        // so a poisoned guard is still usable.
        self.conn.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn list_roles(&self) -> Result<Vec<Role>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name, description FROM roles ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Role {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_role(&self, id: i64) -> Result<Option<Role>> {
        let conn = self.conn();
        let role = conn
            .query_row(
                "SELECT id, name, description FROM roles WHERE id = ?1",
                [id],
                |row| {
                    Ok(Role {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(role)
    }

    /// Flips the archive flag of one row. Returns false when no row has
    /// that id.
    fn set_archived(&self, table: &str, id: &str, archived: bool) -> Result<bool> {
        let conn = self.conn();
        let now = Utc::now().timestamp();
        let archived_at = archived.then_some(now);
        let changed = conn.execute(
            &format!(
                "UPDATE {table} SET archived = ?1, archived_at = ?2, updated_at = ?3 WHERE id = ?4"
            ),
            params![archived as i32, archived_at, now, id],
        )?;
        Ok(changed > 0)
    }

    fn exists(&self, table: &str, id: &str) -> Result<bool> {
        let conn = self.conn();
        let found: bool = conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
            [id],
            |row| row.get(0),
        )?;
        Ok(found)
    }
}

/// WHERE clause assembled from optional list filters, numbered `?1..?n`.
pub(crate) struct Conditions {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl Conditions {
    /// Starts with the archive flag of the table aliased `t`.
    pub fn new(archived: bool) -> Self {
        Self {
            clauses: vec!["t.archived = ?1".to_string()],
            params: vec![Box::new(archived as i32)],
        }
    }

    fn next_idx(&self) -> usize {
        self.params.len() + 1
    }

    pub fn eq<V: ToSql + 'static>(&mut self, column: &str, value: Option<V>) {
        if let Some(value) = value {
            let idx = self.next_idx();
            self.clauses.push(format!("{column} = ?{idx}"));
            self.params.push(Box::new(value));
        }
    }

    /// Case-insensitive contains-match over any of `columns`.
    pub fn search(&mut self, columns: &[&str], term: Option<&str>) {
        let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
            return;
        };
        let idx = self.next_idx();
        let any = columns
            .iter()
            .map(|c| format!("{c} LIKE ?{idx} ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.clauses.push(format!("({any})"));
        self.params.push(Box::new(format!("%{}%", escape_like(term))));
    }

    pub fn where_sql(&self) -> String {
        format!(" WHERE {}", self.clauses.join(" AND "))
    }

    /// ` LIMIT ?n OFFSET ?n+1` with the bound values appended. Values past
    /// `i64::MAX` saturate, since SQLite reads a negative OFFSET as zero.
    pub fn page_sql(&mut self, limit: usize, offset: usize) -> String {
        let idx = self.next_idx();
        self.params.push(Box::new(i64::try_from(limit).unwrap_or(i64::MAX)));
        self.params.push(Box::new(i64::try_from(offset).unwrap_or(i64::MAX)));
        format!(" LIMIT ?{idx} OFFSET ?{}", idx + 1)
    }

    pub fn params(&self) -> Vec<&dyn ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

pub(crate) fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

pub(crate) fn ts_opt(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

/// Parses a stored enum column, reporting the column on mismatch.
pub(crate) fn parse_column<T: std::str::FromStr>(
    idx: usize,
    raw: String,
) -> rusqlite::Result<T> {
    raw.parse::<T>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unexpected value {raw:?}").into(),
        )
    })
}
