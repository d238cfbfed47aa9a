use bantay_common::types::{User, UserInput};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{ts, ts_opt, Conditions, ConsoleStore};
use crate::auth::{hash_password, verify_password};
use crate::error::{Result, StorageError};
use crate::filter::UserFilter;

const SELECT: &str = "SELECT t.id, t.first_name, t.middle_name, t.last_name, t.suffix,
    t.email, t.role_id, r.name AS role_name, t.contact_number, t.street, t.purok,
    t.barangay, t.city, t.archived, t.archived_at, t.created_at, t.updated_at
    FROM users t LEFT JOIN roles r ON r.id = t.role_id";

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let archived: i32 = row.get("archived")?;
    Ok(User {
        id: row.get("id")?,
        first_name: row.get("first_name")?,
        middle_name: row.get("middle_name")?,
        last_name: row.get("last_name")?,
        suffix: row.get("suffix")?,
        email: row.get("email")?,
        role_id: row.get("role_id")?,
        role_name: row.get("role_name")?,
        contact_number: row.get("contact_number")?,
        street: row.get("street")?,
        purok: row.get("purok")?,
        barangay: row.get("barangay")?,
        city: row.get("city")?,
        archived: archived != 0,
        archived_at: ts_opt(row.get("archived_at")?),
        created_at: ts(row.get("created_at")?),
        updated_at: ts(row.get("updated_at")?),
    })
}

fn conditions(filter: &UserFilter) -> Conditions {
    let mut cond = Conditions::new(filter.archived);
    cond.eq("t.role_id", filter.role_id);
    cond.search(
        &["t.first_name", "t.middle_name", "t.last_name", "t.email"],
        filter.search.as_deref(),
    );
    cond
}

impl ConsoleStore {
    /// Creates a user, hashing the password or PIN.
    pub fn insert_user(&self, input: &UserInput) -> Result<User> {
        let secret = input
            .password
            .as_deref()
            .ok_or_else(|| StorageError::Other("new user needs a password or PIN".into()))?;
        let password_hash = hash_password(secret)?;
        let id = bantay_common::id::next_id();
        let now = Utc::now().timestamp();
        {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO users (id, first_name, middle_name, last_name, suffix, email,
                    role_id, password_hash, contact_number, street, purok, barangay, city,
                    archived, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, 0, ?14, ?14)",
                params![
                    id,
                    input.first_name,
                    input.middle_name,
                    input.last_name,
                    input.suffix,
                    input.email,
                    input.role_id,
                    password_hash,
                    input.contact_number,
                    input.street,
                    input.purok,
                    input.barangay,
                    input.city,
                    now,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "user"))?;
        }
        self.get_user(&id)?.ok_or(StorageError::NotFound { entity: "user", id })
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(&format!("{SELECT} WHERE t.id = ?1"), [id], row_to_user)
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self, filter: &UserFilter, limit: usize, offset: usize) -> Result<Vec<User>> {
        let mut cond = conditions(filter);
        let page = cond.page_sql(limit, offset);
        let sql = format!(
            "{SELECT}{} ORDER BY t.last_name COLLATE NOCASE, t.first_name COLLATE NOCASE, t.id{page}",
            cond.where_sql()
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(cond.params().as_slice(), row_to_user)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_users(&self, filter: &UserFilter) -> Result<u64> {
        let cond = conditions(filter);
        let sql = format!("SELECT COUNT(*) FROM users t{}", cond.where_sql());
        let conn = self.conn();
        let count: i64 = conn.query_row(&sql, cond.params().as_slice(), |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Full-record replace. Without a new password or PIN the stored hash
    /// is kept.
    pub fn replace_user(&self, id: &str, input: &UserInput) -> Result<Option<User>> {
        let password_hash = input.password.as_deref().map(hash_password).transpose()?;
        let changed = {
            let conn = self.conn();
            conn.execute(
                "UPDATE users SET first_name = ?1, middle_name = ?2, last_name = ?3,
                    suffix = ?4, email = ?5, role_id = ?6,
                    password_hash = COALESCE(?7, password_hash), contact_number = ?8,
                    street = ?9, purok = ?10, barangay = ?11, city = ?12, updated_at = ?13
                 WHERE id = ?14",
                params![
                    input.first_name,
                    input.middle_name,
                    input.last_name,
                    input.suffix,
                    input.email,
                    input.role_id,
                    password_hash,
                    input.contact_number,
                    input.street,
                    input.purok,
                    input.barangay,
                    input.city,
                    Utc::now().timestamp(),
                    id,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "user"))?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.get_user(id)
    }

    pub fn set_user_archived(&self, id: &str, archived: bool) -> Result<Option<User>> {
        if !self.set_archived("users", id, archived)? {
            return Ok(None);
        }
        self.get_user(id)
    }

    /// Checks a password or PIN against the stored hash of `id`. Unknown
    /// users never match.
    pub fn verify_user_credential(&self, id: &str, secret: &str) -> Result<bool> {
        let hash: Option<String> = {
            let conn = self.conn();
            conn.query_row(
                "SELECT password_hash FROM users WHERE id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?
        };
        match hash {
            Some(hash) => verify_password(secret, &hash),
            None => Ok(false),
        }
    }
}
