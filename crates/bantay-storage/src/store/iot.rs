use bantay_common::types::{IotDevice, IotDeviceInput};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_column, ts, ts_opt, Conditions, ConsoleStore};
use crate::error::{Result, StorageError};
use crate::filter::IotFilter;

const FROM: &str = "FROM iot_devices t
    LEFT JOIN locations l ON l.id = t.location_id
    LEFT JOIN cctv_devices c ON c.id = t.cctv_id";

fn select() -> String {
    format!(
        "SELECT t.id, t.device_name, t.status, t.location_id, l.location_name,
            t.custom_address, t.custom_latitude, t.custom_longitude, t.cctv_id,
            c.device_name AS cctv_name, t.description, t.archived, t.archived_at,
            t.created_at, t.updated_at
         {FROM}"
    )
}

fn row_to_iot(row: &Row) -> rusqlite::Result<IotDevice> {
    let archived: i32 = row.get("archived")?;
    Ok(IotDevice {
        id: row.get("id")?,
        device_name: row.get("device_name")?,
        status: parse_column(2, row.get("status")?)?,
        location_id: row.get("location_id")?,
        location_name: row.get("location_name")?,
        custom_address: row.get("custom_address")?,
        custom_latitude: row.get("custom_latitude")?,
        custom_longitude: row.get("custom_longitude")?,
        cctv_id: row.get("cctv_id")?,
        cctv_name: row.get("cctv_name")?,
        description: row.get("description")?,
        archived: archived != 0,
        archived_at: ts_opt(row.get("archived_at")?),
        created_at: ts(row.get("created_at")?),
        updated_at: ts(row.get("updated_at")?),
    })
}

fn conditions(filter: &IotFilter) -> Conditions {
    let mut cond = Conditions::new(filter.archived);
    cond.eq("t.status", filter.status.map(|s| s.as_str()));
    cond.search(
        &["t.device_name", "l.location_name", "t.custom_address"],
        filter.search.as_deref(),
    );
    cond
}

impl ConsoleStore {
    pub fn insert_iot_device(&self, input: &IotDeviceInput) -> Result<IotDevice> {
        let id = bantay_common::id::next_id();
        let now = Utc::now().timestamp();
        {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO iot_devices (id, device_name, status, location_id, custom_address,
                    custom_latitude, custom_longitude, cctv_id, description, archived,
                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?10)",
                params![
                    id,
                    input.device_name,
                    input.status.as_str(),
                    input.location_id,
                    input.custom_address,
                    input.custom_latitude,
                    input.custom_longitude,
                    input.cctv_id,
                    input.description,
                    now,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "iot_device"))?;
        }
        self.get_iot_device(&id)?.ok_or(StorageError::NotFound {
            entity: "iot_device",
            id,
        })
    }

    pub fn get_iot_device(&self, id: &str) -> Result<Option<IotDevice>> {
        let conn = self.conn();
        let device = conn
            .query_row(&format!("{} WHERE t.id = ?1", select()), [id], row_to_iot)
            .optional()?;
        Ok(device)
    }

    pub fn list_iot_devices(
        &self,
        filter: &IotFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<IotDevice>> {
        let mut cond = conditions(filter);
        let page = cond.page_sql(limit, offset);
        let sql = format!(
            "{}{} ORDER BY t.created_at DESC, t.id DESC{page}",
            select(),
            cond.where_sql()
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(cond.params().as_slice(), row_to_iot)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_iot_devices(&self, filter: &IotFilter) -> Result<u64> {
        let cond = conditions(filter);
        let sql = format!("SELECT COUNT(*) {FROM}{}", cond.where_sql());
        let conn = self.conn();
        let count: i64 = conn.query_row(&sql, cond.params().as_slice(), |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Full-record replace. Switching between a predefined and a custom
    /// location clears the other source, since the validated input carries
    /// only one of them.
    pub fn replace_iot_device(
        &self,
        id: &str,
        input: &IotDeviceInput,
    ) -> Result<Option<IotDevice>> {
        let changed = {
            let conn = self.conn();
            conn.execute(
                "UPDATE iot_devices SET device_name = ?1, status = ?2, location_id = ?3,
                    custom_address = ?4, custom_latitude = ?5, custom_longitude = ?6,
                    cctv_id = ?7, description = ?8, updated_at = ?9
                 WHERE id = ?10",
                params![
                    input.device_name,
                    input.status.as_str(),
                    input.location_id,
                    input.custom_address,
                    input.custom_latitude,
                    input.custom_longitude,
                    input.cctv_id,
                    input.description,
                    Utc::now().timestamp(),
                    id,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "iot_device"))?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.get_iot_device(id)
    }

    pub fn set_iot_device_archived(&self, id: &str, archived: bool) -> Result<Option<IotDevice>> {
        if !self.set_archived("iot_devices", id, archived)? {
            return Ok(None);
        }
        self.get_iot_device(id)
    }
}
