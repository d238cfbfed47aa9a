use bantay_common::types::{CctvDevice, CctvDeviceInput};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_column, ts, ts_opt, Conditions, ConsoleStore};
use crate::error::{Result, StorageError};
use crate::filter::CctvFilter;

const SELECT: &str = "SELECT t.id, t.device_name, t.primary_rtsp_url, t.backup_rtsp_url,
    t.location_id, l.location_name, t.status, t.fps, t.resolution, t.description,
    t.archived, t.archived_at, t.created_at, t.updated_at
    FROM cctv_devices t LEFT JOIN locations l ON l.id = t.location_id";

fn row_to_cctv(row: &Row) -> rusqlite::Result<CctvDevice> {
    let archived: i32 = row.get("archived")?;
    let fps: Option<i64> = row.get("fps")?;
    let resolution: Option<String> = row.get("resolution")?;
    Ok(CctvDevice {
        id: row.get("id")?,
        device_name: row.get("device_name")?,
        primary_rtsp_url: row.get("primary_rtsp_url")?,
        backup_rtsp_url: row.get("backup_rtsp_url")?,
        location_id: row.get("location_id")?,
        location_name: row.get("location_name")?,
        status: parse_column(6, row.get("status")?)?,
        fps: fps.map(|f| f as u32),
        resolution: resolution.map(|r| parse_column(8, r)).transpose()?,
        description: row.get("description")?,
        archived: archived != 0,
        archived_at: ts_opt(row.get("archived_at")?),
        created_at: ts(row.get("created_at")?),
        updated_at: ts(row.get("updated_at")?),
    })
}

fn conditions(filter: &CctvFilter) -> Conditions {
    let mut cond = Conditions::new(filter.archived);
    cond.eq("t.status", filter.status.map(|s| s.as_str()));
    cond.eq("t.location_id", filter.location_id.clone());
    cond.search(
        &["t.device_name", "l.location_name"],
        filter.search.as_deref(),
    );
    cond
}

impl ConsoleStore {
    pub fn insert_cctv_device(&self, input: &CctvDeviceInput) -> Result<CctvDevice> {
        let id = bantay_common::id::next_id();
        let now = Utc::now().timestamp();
        {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO cctv_devices (id, device_name, primary_rtsp_url, backup_rtsp_url,
                    location_id, status, fps, resolution, description, archived,
                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?10)",
                params![
                    id,
                    input.device_name,
                    input.primary_rtsp_url,
                    input.backup_rtsp_url,
                    input.location_id,
                    input.status.as_str(),
                    input.fps,
                    input.resolution.map(|r| r.as_str()),
                    input.description,
                    now,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "cctv_device"))?;
        }
        self.get_cctv_device(&id)?.ok_or(StorageError::NotFound {
            entity: "cctv_device",
            id,
        })
    }

    pub fn get_cctv_device(&self, id: &str) -> Result<Option<CctvDevice>> {
        let conn = self.conn();
        let device = conn
            .query_row(&format!("{SELECT} WHERE t.id = ?1"), [id], row_to_cctv)
            .optional()?;
        Ok(device)
    }

    pub fn list_cctv_devices(
        &self,
        filter: &CctvFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CctvDevice>> {
        let mut cond = conditions(filter);
        let page = cond.page_sql(limit, offset);
        let sql = format!(
            "{SELECT}{} ORDER BY t.created_at DESC, t.id DESC{page}",
            cond.where_sql()
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(cond.params().as_slice(), row_to_cctv)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_cctv_devices(&self, filter: &CctvFilter) -> Result<u64> {
        let cond = conditions(filter);
        let sql = format!(
            "SELECT COUNT(*) FROM cctv_devices t LEFT JOIN locations l ON l.id = t.location_id{}",
            cond.where_sql()
        );
        let conn = self.conn();
        let count: i64 = conn.query_row(&sql, cond.params().as_slice(), |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn replace_cctv_device(
        &self,
        id: &str,
        input: &CctvDeviceInput,
    ) -> Result<Option<CctvDevice>> {
        let changed = {
            let conn = self.conn();
            conn.execute(
                "UPDATE cctv_devices SET device_name = ?1, primary_rtsp_url = ?2,
                    backup_rtsp_url = ?3, location_id = ?4, status = ?5, fps = ?6,
                    resolution = ?7, description = ?8, updated_at = ?9
                 WHERE id = ?10",
                params![
                    input.device_name,
                    input.primary_rtsp_url,
                    input.backup_rtsp_url,
                    input.location_id,
                    input.status.as_str(),
                    input.fps,
                    input.resolution.map(|r| r.as_str()),
                    input.description,
                    Utc::now().timestamp(),
                    id,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "cctv_device"))?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.get_cctv_device(id)
    }

    pub fn set_cctv_device_archived(&self, id: &str, archived: bool) -> Result<Option<CctvDevice>> {
        if !self.set_archived("cctv_devices", id, archived)? {
            return Ok(None);
        }
        self.get_cctv_device(id)
    }
}
