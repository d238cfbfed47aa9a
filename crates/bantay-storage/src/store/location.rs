use bantay_common::types::{Location, LocationInput};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{ts, ts_opt, Conditions, ConsoleStore};
use crate::error::{Result, StorageError};
use crate::filter::LocationFilter;

const SELECT: &str = "SELECT t.id, t.location_name, t.barangay, t.landmark, t.description,
    t.latitude, t.longitude, t.archived, t.archived_at, t.created_at, t.updated_at
    FROM locations t";

fn row_to_location(row: &Row) -> rusqlite::Result<Location> {
    let archived: i32 = row.get("archived")?;
    Ok(Location {
        id: row.get("id")?,
        location_name: row.get("location_name")?,
        barangay: row.get("barangay")?,
        landmark: row.get("landmark")?,
        description: row.get("description")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        archived: archived != 0,
        archived_at: ts_opt(row.get("archived_at")?),
        created_at: ts(row.get("created_at")?),
        updated_at: ts(row.get("updated_at")?),
    })
}

fn conditions(filter: &LocationFilter) -> Conditions {
    let mut cond = Conditions::new(filter.archived);
    cond.eq("t.barangay", filter.barangay.clone());
    cond.search(
        &["t.location_name", "t.barangay", "t.landmark"],
        filter.search.as_deref(),
    );
    cond
}

impl ConsoleStore {
    pub fn insert_location(&self, input: &LocationInput) -> Result<Location> {
        let id = bantay_common::id::next_id();
        let now = Utc::now().timestamp();
        {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO locations (id, location_name, barangay, landmark, description,
                    latitude, longitude, archived, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
                params![
                    id,
                    input.location_name,
                    input.barangay,
                    input.landmark,
                    input.description,
                    input.latitude,
                    input.longitude,
                    now,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "location"))?;
        }
        self.get_location(&id)?.ok_or(StorageError::NotFound {
            entity: "location",
            id,
        })
    }

    pub fn get_location(&self, id: &str) -> Result<Option<Location>> {
        let conn = self.conn();
        let location = conn
            .query_row(&format!("{SELECT} WHERE t.id = ?1"), [id], row_to_location)
            .optional()?;
        Ok(location)
    }

    pub fn list_locations(
        &self,
        filter: &LocationFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Location>> {
        let mut cond = conditions(filter);
        let page = cond.page_sql(limit, offset);
        let sql = format!(
            "{SELECT}{} ORDER BY t.location_name COLLATE NOCASE, t.id{page}",
            cond.where_sql()
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(cond.params().as_slice(), row_to_location)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_locations(&self, filter: &LocationFilter) -> Result<u64> {
        let cond = conditions(filter);
        let sql = format!("SELECT COUNT(*) FROM locations t{}", cond.where_sql());
        let conn = self.conn();
        let count: i64 = conn.query_row(&sql, cond.params().as_slice(), |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Full-record replace. Returns `None` when the id is unknown.
    pub fn replace_location(&self, id: &str, input: &LocationInput) -> Result<Option<Location>> {
        let changed = {
            let conn = self.conn();
            conn.execute(
                "UPDATE locations SET location_name = ?1, barangay = ?2, landmark = ?3,
                    description = ?4, latitude = ?5, longitude = ?6, updated_at = ?7
                 WHERE id = ?8",
                params![
                    input.location_name,
                    input.barangay,
                    input.landmark,
                    input.description,
                    input.latitude,
                    input.longitude,
                    Utc::now().timestamp(),
                    id,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "location"))?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.get_location(id)
    }

    /// True when a location with this name already exists in the barangay,
    /// archived or not. Names compare case-insensitively.
    pub fn location_exists_named(&self, location_name: &str, barangay: &str) -> Result<bool> {
        let conn = self.conn();
        let found = conn
            .query_row(
                "SELECT 1 FROM locations
                 WHERE location_name = ?1 COLLATE NOCASE AND barangay = ?2 COLLATE NOCASE
                 LIMIT 1",
                params![location_name, barangay],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn set_location_archived(&self, id: &str, archived: bool) -> Result<Option<Location>> {
        if !self.set_archived("locations", id, archived)? {
            return Ok(None);
        }
        self.get_location(id)
    }
}
