use bantay_rules::RecordLookup;
use rusqlite::params;

use super::ConsoleStore;
use crate::error::StorageError;

/// Archived rows still count as existing: a device may keep pointing at an
/// archived location.
impl RecordLookup for ConsoleStore {
    type Error = StorageError;

    fn location_exists(&self, id: &str) -> Result<bool, StorageError> {
        self.exists("locations", id)
    }

    fn cctv_exists(&self, id: &str) -> Result<bool, StorageError> {
        self.exists("cctv_devices", id)
    }

    fn role_exists(&self, id: i64) -> Result<bool, StorageError> {
        Ok(self.get_role(id)?.is_some())
    }

    fn email_taken(&self, email: &str, except_id: Option<&str>) -> Result<bool, StorageError> {
        let conn = self.conn();
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 COLLATE NOCASE
                AND (?2 IS NULL OR id != ?2))",
            params![email, except_id],
            |row| row.get(0),
        )?;
        Ok(taken)
    }
}
