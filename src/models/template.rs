use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::DbPool;
use crate::models::widget::WidgetConfig;

/// A prebuilt widget configuration users can start a widget from.
#[derive(Debug, Serialize, Clone)]
pub struct WidgetTemplate {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub featured: bool,
    pub config: WidgetConfig,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct TemplateForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub config: WidgetConfig,
}

#[derive(Debug, Serialize, Default)]
pub struct TemplateStats {
    pub total: i64,
    pub by_category: HashMap<String, i64>,
    pub by_layout: HashMap<String, i64>,
    pub by_theme: HashMap<String, i64>,
}

impl WidgetTemplate {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let config_json: String = row.get("config_json")?;
        Ok(WidgetTemplate {
            id: row.get("id")?,
            name: row.get("name")?,
            slug: row.get("slug")?,
            description: row.get("description")?,
            category: row.get("category")?,
            featured: row.get::<_, i64>("featured")? != 0,
            config: serde_json::from_str(&config_json).unwrap_or_default(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM widget_templates WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn find_by_slug(pool: &DbPool, slug: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM widget_templates WHERE slug = ?1",
            params![slug],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(pool: &DbPool) -> Vec<Self> {
        Self::query(pool, "SELECT * FROM widget_templates ORDER BY name ASC", &[])
    }

    pub fn by_category(pool: &DbPool, category: &str) -> Vec<Self> {
        Self::query(
            pool,
            "SELECT * FROM widget_templates WHERE category = ?1 ORDER BY name ASC",
            &[&category.to_string()],
        )
    }

    pub fn featured(pool: &DbPool) -> Vec<Self> {
        Self::query(
            pool,
            "SELECT * FROM widget_templates WHERE featured = 1 ORDER BY name ASC",
            &[],
        )
    }

    /// Substring search over name, description and category.
    pub fn search(pool: &DbPool, query: &str) -> Vec<Self> {
        let pattern = format!("%{}%", query);
        Self::query(
            pool,
            "SELECT * FROM widget_templates
             WHERE name LIKE ?1 OR description LIKE ?1 OR category LIKE ?1
             ORDER BY name ASC",
            &[&pattern],
        )
    }

    pub fn count(pool: &DbPool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM widget_templates", [], |row| row.get(0))
            .unwrap_or(0)
    }

    /// Distinct categories, for the gallery filter bar.
    pub fn categories(pool: &DbPool) -> Vec<String> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn
            .prepare("SELECT DISTINCT category FROM widget_templates ORDER BY category ASC")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map([], |row| row.get::<_, String>(0))
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn create(pool: &DbPool, form: &TemplateForm) -> Result<i64, String> {
        if form.name.trim().is_empty() {
            return Err("Template name cannot be empty".to_string());
        }
        form.config.validate()?;

        let slug = Self::unique_slug(pool, &form.name);
        let config_json = serde_json::to_string(&form.config).map_err(|e| e.to_string())?;

        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO widget_templates (name, slug, description, category, featured, config_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                form.name.trim(),
                slug,
                form.description,
                form.category,
                form.featured as i64,
                config_json,
            ],
        )
        .map_err(|e| e.to_string())?;

        Ok(conn.last_insert_rowid())
    }

    pub fn update(pool: &DbPool, id: i64, form: &TemplateForm) -> Result<(), String> {
        if form.name.trim().is_empty() {
            return Err("Template name cannot be empty".to_string());
        }
        form.config.validate()?;

        let config_json = serde_json::to_string(&form.config).map_err(|e| e.to_string())?;

        let conn = pool.get().map_err(|e| e.to_string())?;
        let changed = conn
            .execute(
                "UPDATE widget_templates SET name=?1, description=?2, category=?3, featured=?4,
                 config_json=?5, updated_at=CURRENT_TIMESTAMP WHERE id=?6",
                params![
                    form.name.trim(),
                    form.description,
                    form.category,
                    form.featured as i64,
                    config_json,
                    id,
                ],
            )
            .map_err(|e| e.to_string())?;

        if changed == 0 {
            return Err("Template not found".to_string());
        }
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: i64) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        let changed = conn
            .execute("DELETE FROM widget_templates WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        if changed == 0 {
            return Err("Template not found".to_string());
        }
        Ok(())
    }

    /// Gallery overview: total plus counts per category/layout/theme.
    pub fn stats(pool: &DbPool) -> TemplateStats {
        let templates = Self::list(pool);
        let mut stats = TemplateStats {
            total: templates.len() as i64,
            ..TemplateStats::default()
        };
        for t in &templates {
            *stats.by_category.entry(t.category.clone()).or_insert(0) += 1;
            *stats
                .by_layout
                .entry(t.config.layout.as_str().to_string())
                .or_insert(0) += 1;
            *stats
                .by_theme
                .entry(t.config.theme.as_str().to_string())
                .or_insert(0) += 1;
        }
        stats
    }

    fn query(pool: &DbPool, sql: &str, args: &[&String]) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(sql) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let params_refs: Vec<&dyn rusqlite::types::ToSql> =
            args.iter().map(|a| *a as &dyn rusqlite::types::ToSql).collect();
        stmt.query_map(params_refs.as_slice(), Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    fn unique_slug(pool: &DbPool, name: &str) -> String {
        let base = {
            let s = slug::slugify(name);
            if s.is_empty() {
                "template".to_string()
            } else {
                s
            }
        };
        if Self::find_by_slug(pool, &base).is_none() {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if Self::find_by_slug(pool, &candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}
