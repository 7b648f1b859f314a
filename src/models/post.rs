use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;

/// Platforms a post can originate from. Widgets and filter rules refer
/// to these by id; anything else is rejected at the form layer.
pub const SUPPORTED_PLATFORMS: &[&str] = &[
    "twitter",
    "instagram",
    "facebook",
    "tiktok",
    "youtube",
    "linkedin",
];

pub fn is_supported_platform(platform: &str) -> bool {
    SUPPORTED_PLATFORMS.contains(&platform)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Post {
    pub id: i64,
    pub platform: String,
    pub author: String,
    pub avatar: Option<String>,
    pub content: String,
    pub media: Vec<String>,
    pub likes: i64,
    pub comments: i64,
    pub posted_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub platform: String,
    pub author: String,
    pub avatar: Option<String>,
    pub content: String,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub comments: i64,
    pub posted_at: Option<String>,
}

impl Post {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let media_json: String = row.get("media_json")?;
        Ok(Post {
            id: row.get("id")?,
            platform: row.get("platform")?,
            author: row.get("author")?,
            avatar: row.get("avatar")?,
            content: row.get("content")?,
            media: serde_json::from_str(&media_json).unwrap_or_default(),
            likes: row.get("likes")?,
            comments: row.get("comments")?,
            posted_at: row.get("posted_at")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row("SELECT * FROM posts WHERE id = ?1", params![id], Self::from_row)
            .ok()
    }

    /// Newest-first listing, optionally restricted to one platform.
    pub fn list(pool: &DbPool, platform: Option<&str>, limit: i64, offset: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match platform {
            Some(p) => (
                "SELECT * FROM posts WHERE platform = ?1 ORDER BY posted_at DESC LIMIT ?2 OFFSET ?3"
                    .to_string(),
                vec![Box::new(p.to_string()), Box::new(limit), Box::new(offset)],
            ),
            None => (
                "SELECT * FROM posts ORDER BY posted_at DESC LIMIT ?1 OFFSET ?2".to_string(),
                vec![Box::new(limit), Box::new(offset)],
            ),
        };

        let mut stmt = match conn.prepare(&sql) {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        stmt.query_map(params_refs.as_slice(), Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn count(pool: &DbPool, platform: Option<&str>) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };

        match platform {
            Some(p) => conn
                .query_row(
                    "SELECT COUNT(*) FROM posts WHERE platform = ?1",
                    params![p],
                    |row| row.get(0),
                )
                .unwrap_or(0),
            None => conn
                .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
                .unwrap_or(0),
        }
    }

    /// Substring search over content and author, newest first.
    pub fn search(pool: &DbPool, query: &str, limit: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        let pattern = format!("%{}%", query);
        let mut stmt = match conn.prepare(
            "SELECT * FROM posts WHERE content LIKE ?1 OR author LIKE ?1
             ORDER BY posted_at DESC LIMIT ?2",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        stmt.query_map(params![pattern, limit], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn create(pool: &DbPool, form: &PostForm) -> Result<i64, String> {
        if !is_supported_platform(&form.platform) {
            return Err(format!("Unsupported platform: {}", form.platform));
        }
        let conn = pool.get().map_err(|e| e.to_string())?;

        let posted_at: Option<NaiveDateTime> = form
            .posted_at
            .as_ref()
            .and_then(|s| parse_timestamp(s));
        let media_json = serde_json::to_string(&form.media).map_err(|e| e.to_string())?;

        conn.execute(
            "INSERT INTO posts (platform, author, avatar, content, media_json, likes, comments, posted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, COALESCE(?8, CURRENT_TIMESTAMP))",
            params![
                form.platform,
                form.author,
                form.avatar,
                form.content,
                media_json,
                form.likes,
                form.comments,
                posted_at,
            ],
        )
        .map_err(|e| e.to_string())?;

        Ok(conn.last_insert_rowid())
    }

    pub fn update(pool: &DbPool, id: i64, form: &PostForm) -> Result<(), String> {
        if !is_supported_platform(&form.platform) {
            return Err(format!("Unsupported platform: {}", form.platform));
        }
        let conn = pool.get().map_err(|e| e.to_string())?;

        let posted_at: Option<NaiveDateTime> = form
            .posted_at
            .as_ref()
            .and_then(|s| parse_timestamp(s));
        let media_json = serde_json::to_string(&form.media).map_err(|e| e.to_string())?;

        conn.execute(
            "UPDATE posts SET platform=?1, author=?2, avatar=?3, content=?4, media_json=?5,
             likes=?6, comments=?7, posted_at=COALESCE(?8, posted_at) WHERE id=?9",
            params![
                form.platform,
                form.author,
                form.avatar,
                form.content,
                media_json,
                form.likes,
                form.comments,
                posted_at,
                id,
            ],
        )
        .map_err(|e| e.to_string())?;

        Ok(())
    }

    pub fn delete(pool: &DbPool, id: i64) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM posts WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Accepts the two timestamp shapes the API and seed data use:
/// RFC 3339 ("2023-12-15T10:30:00Z") and plain "YYYY-MM-DD HH:MM:SS".
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
}
