use bantay_common::types::{PublicPost, PublicPostInput};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_column, ts, ts_opt, Conditions, ConsoleStore};
use crate::error::{Result, StorageError};
use crate::filter::PostFilter;

const SELECT: &str = "SELECT t.id, t.title, t.content, t.category, t.status, t.published_at,
    t.image_path, t.archived, t.archived_at, t.created_at, t.updated_at
    FROM public_posts t";

fn row_to_post(row: &Row) -> rusqlite::Result<PublicPost> {
    let archived: i32 = row.get("archived")?;
    let category: Option<String> = row.get("category")?;
    Ok(PublicPost {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        category: category.map(|c| parse_column(3, c)).transpose()?,
        status: parse_column(4, row.get("status")?)?,
        published_at: ts_opt(row.get("published_at")?),
        image_path: row.get("image_path")?,
        archived: archived != 0,
        archived_at: ts_opt(row.get("archived_at")?),
        created_at: ts(row.get("created_at")?),
        updated_at: ts(row.get("updated_at")?),
    })
}

fn conditions(filter: &PostFilter) -> Conditions {
    let mut cond = Conditions::new(filter.archived);
    cond.eq("t.status", filter.status.map(|s| s.as_str()));
    cond.eq("t.category", filter.category.map(|c| c.as_str()));
    cond.search(&["t.title", "t.content"], filter.search.as_deref());
    cond
}

impl ConsoleStore {
    pub fn insert_post(&self, input: &PublicPostInput) -> Result<PublicPost> {
        let id = bantay_common::id::next_id();
        let now = Utc::now().timestamp();
        {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO public_posts (id, title, content, category, status, published_at,
                    archived, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)",
                params![
                    id,
                    input.title,
                    input.content,
                    input.category.map(|c| c.as_str()),
                    input.status.as_str(),
                    input.published_at.map(|d| d.timestamp()),
                    now,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "public_post"))?;
        }
        self.get_post(&id)?.ok_or(StorageError::NotFound {
            entity: "public_post",
            id,
        })
    }

    pub fn get_post(&self, id: &str) -> Result<Option<PublicPost>> {
        let conn = self.conn();
        let post = conn
            .query_row(&format!("{SELECT} WHERE t.id = ?1"), [id], row_to_post)
            .optional()?;
        Ok(post)
    }

    pub fn list_posts(
        &self,
        filter: &PostFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PublicPost>> {
        let mut cond = conditions(filter);
        let page = cond.page_sql(limit, offset);
        let sql = format!(
            "{SELECT}{} ORDER BY COALESCE(t.published_at, t.created_at) DESC, t.id DESC{page}",
            cond.where_sql()
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(cond.params().as_slice(), row_to_post)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_posts(&self, filter: &PostFilter) -> Result<u64> {
        let cond = conditions(filter);
        let sql = format!("SELECT COUNT(*) FROM public_posts t{}", cond.where_sql());
        let conn = self.conn();
        let count: i64 = conn.query_row(&sql, cond.params().as_slice(), |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Full-record replace. The image is managed separately and is kept.
    pub fn replace_post(&self, id: &str, input: &PublicPostInput) -> Result<Option<PublicPost>> {
        let changed = {
            let conn = self.conn();
            conn.execute(
                "UPDATE public_posts SET title = ?1, content = ?2, category = ?3, status = ?4,
                    published_at = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    input.title,
                    input.content,
                    input.category.map(|c| c.as_str()),
                    input.status.as_str(),
                    input.published_at.map(|d| d.timestamp()),
                    Utc::now().timestamp(),
                    id,
                ],
            )
            .map_err(|e| StorageError::from_write(e, "public_post"))?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.get_post(id)
    }

    /// Records the stored image path of a post.
    pub fn set_post_image(&self, id: &str, image_path: &str) -> Result<Option<PublicPost>> {
        let changed = {
            let conn = self.conn();
            conn.execute(
                "UPDATE public_posts SET image_path = ?1, updated_at = ?2 WHERE id = ?3",
                params![image_path, Utc::now().timestamp(), id],
            )?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.get_post(id)
    }

    pub fn set_post_archived(&self, id: &str, archived: bool) -> Result<Option<PublicPost>> {
        if !self.set_archived("public_posts", id, archived)? {
            return Ok(None);
        }
        self.get_post(id)
    }
}
