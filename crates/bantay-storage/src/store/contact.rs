use bantay_common::types::{Contact, ContactInput};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_column, ts, ts_opt, Conditions, ConsoleStore};
use crate::error::{Result, StorageError};
use crate::filter::ContactFilter;

const SELECT: &str = "SELECT t.id, t.branch_unit_name, t.responder_type, t.primary_mobile,
    t.backup_mobile, t.latitude, t.longitude, t.archived, t.archived_at, t.created_at,
    t.updated_at
    FROM contacts t";

fn row_to_contact(row: &Row) -> rusqlite::Result<Contact> {
    let archived: i32 = row.get("archived")?;
    Ok(Contact {
        id: row.get("id")?,
        branch_unit_name: parse_column(1, row.get("branch_unit_name")?)?,
        responder_type: parse_column(2, row.get("responder_type")?)?,
        primary_mobile: row.get("primary_mobile")?,
        backup_mobile: row.get("backup_mobile")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        archived: archived != 0,
        archived_at: ts_opt(row.get("archived_at")?),
        created_at: ts(row.get("created_at")?),
        updated_at: ts(row.get("updated_at")?),
    })
}

fn conditions(filter: &ContactFilter) -> Conditions {
    let mut cond = Conditions::new(filter.archived);
    cond.eq(
        "t.branch_unit_name",
        filter.branch_unit_name.map(|b| b.as_str()),
    );
    cond.eq("t.responder_type", filter.responder_type.map(|r| r.as_str()));
    cond.search(
        &["t.primary_mobile", "t.backup_mobile"],
        filter.search.as_deref(),
    );
    cond
}

impl ConsoleStore {
    pub fn insert_contact(&self, input: &ContactInput) -> Result<Contact> {
        let id = bantay_common::id::next_id();
        let now = Utc::now().timestamp();
        {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO contacts (id, branch_unit_name, responder_type, primary_mobile,
                    backup_mobile, latitude, longitude, archived, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
                params![
                    id,
                    input.branch_unit_name.as_str(),
                    input.responder_type.as_str(),
                    input.primary_mobile,
                    input.backup_mobile,
                    input.latitude,
                    input.longitude,
                    now,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "contact"))?;
        }
        self.get_contact(&id)?.ok_or(StorageError::NotFound {
            entity: "contact",
            id,
        })
    }

    pub fn get_contact(&self, id: &str) -> Result<Option<Contact>> {
        let conn = self.conn();
        let contact = conn
            .query_row(&format!("{SELECT} WHERE t.id = ?1"), [id], row_to_contact)
            .optional()?;
        Ok(contact)
    }

    pub fn list_contacts(
        &self,
        filter: &ContactFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Contact>> {
        let mut cond = conditions(filter);
        let page = cond.page_sql(limit, offset);
        let sql = format!(
            "{SELECT}{} ORDER BY t.branch_unit_name, t.responder_type, t.id{page}",
            cond.where_sql()
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(cond.params().as_slice(), row_to_contact)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_contacts(&self, filter: &ContactFilter) -> Result<u64> {
        let cond = conditions(filter);
        let sql = format!("SELECT COUNT(*) FROM contacts t{}", cond.where_sql());
        let conn = self.conn();
        let count: i64 = conn.query_row(&sql, cond.params().as_slice(), |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn replace_contact(&self, id: &str, input: &ContactInput) -> Result<Option<Contact>> {
        let changed = {
            let conn = self.conn();
            conn.execute(
                "UPDATE contacts SET branch_unit_name = ?1, responder_type = ?2,
                    primary_mobile = ?3, backup_mobile = ?4, latitude = ?5, longitude = ?6,
                    updated_at = ?7
                 WHERE id = ?8",
                params![
                    input.branch_unit_name.as_str(),
                    input.responder_type.as_str(),
                    input.primary_mobile,
                    input.backup_mobile,
                    input.latitude,
                    input.longitude,
                    Utc::now().timestamp(),
                    id,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "contact"))?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.get_contact(id)
    }

    pub fn set_contact_archived(&self, id: &str, archived: bool) -> Result<Option<Contact>> {
        if !self.set_archived("contacts", id, archived)? {
            return Ok(None);
        }
        self.get_contact(id)
    }
}
