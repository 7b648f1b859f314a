use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;
use crate::models::post::is_supported_platform;

// ── Declarative widget configuration ────────────────────
//
// Stored as a single JSON column (config_json). Every field carries a
// serde default so partially-specified configs — template payloads,
// widgets saved by older builds, minimal API bodies — deserialize
// cleanly. Unknown class tokens (columns, gap, animation, ...) stay
// plain strings; the plan resolver owns their fallbacks.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Grid,
    List,
    Masonry,
    Slider,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Grid => "grid",
            Layout::List => "list",
            Layout::Masonry => "masonry",
            Layout::Slider => "slider",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Minimal,
    Card,
    Compact,
    Magazine,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Minimal => "minimal",
            Theme::Card => "card",
            Theme::Compact => "compact",
            Theme::Magazine => "magazine",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    Popular,
    Engagement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Hashtag,
    Username,
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    Include,
    Exclude,
}

/// One include/exclude predicate, optionally scoped to a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    #[serde(rename = "type")]
    pub kind: FilterKind,
    pub value: String,
    /// "all" or a platform id.
    #[serde(default = "scope_all")]
    pub platform: String,
    #[serde(default)]
    pub mode: FilterMode,
}

fn scope_all() -> String {
    "all".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub columns: String,
    /// None means unset; the plan resolver applies the theme fallback.
    pub gap: Option<String>,
    pub aspect_ratio: String,
    pub hover_effect: String,
    pub animation: String,
    pub equal_height: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings {
            columns: "auto".to_string(),
            gap: None,
            aspect_ratio: "auto".to_string(),
            hover_effect: "lift".to_string(),
            animation: "fadeIn".to_string(),
            equal_height: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListSettings {
    pub spacing: String,
    pub show_dividers: bool,
    pub alternate_layout: bool,
    pub hover_effect: String,
    pub animation: String,
    pub compact_mode: bool,
}

impl Default for ListSettings {
    fn default() -> Self {
        ListSettings {
            spacing: "md".to_string(),
            show_dividers: true,
            alternate_layout: false,
            hover_effect: "scale".to_string(),
            animation: "slideIn".to_string(),
            compact_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasonrySettings {
    pub columns: String,
    pub gap: Option<String>,
    pub animation: String,
    pub break_inside: String,
    pub balance_height: bool,
    /// Pixels; 0 disables the minimum.
    pub min_item_height: i64,
}

impl Default for MasonrySettings {
    fn default() -> Self {
        MasonrySettings {
            columns: "auto".to_string(),
            gap: None,
            animation: "stagger".to_string(),
            break_inside: "avoid".to_string(),
            balance_height: true,
            min_item_height: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderSettings {
    pub autoplay: bool,
    pub autoplay_delay_ms: i64,
    pub speed_ms: i64,
    pub drag_control: bool,
    pub navigation: bool,
    pub pagination: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl Default for SliderSettings {
    fn default() -> Self {
        SliderSettings {
            autoplay: true,
            autoplay_delay_ms: 3000,
            speed_ms: 300,
            drag_control: true,
            navigation: true,
            pagination: true,
            looping: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilitySettings {
    pub show_likes: bool,
    pub show_comments: bool,
    pub show_text: bool,
    pub show_author: bool,
    pub show_timestamp: bool,
    pub show_platform_badge: bool,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        VisibilitySettings {
            show_likes: true,
            show_comments: true,
            show_text: true,
            show_author: true,
            show_timestamp: true,
            show_platform_badge: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Empty means every platform passes.
    pub platforms: Vec<String>,
    pub filters: Vec<FilterRule>,
    pub layout: Layout,
    pub theme: Theme,
    pub max_posts: i64,
    pub sort_by: SortBy,
    pub grid: GridSettings,
    pub list: ListSettings,
    pub masonry: MasonrySettings,
    pub slider: SliderSettings,
    pub visibility: VisibilitySettings,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        WidgetConfig {
            platforms: vec![],
            filters: vec![],
            layout: Layout::default(),
            theme: Theme::default(),
            max_posts: 10,
            sort_by: SortBy::default(),
            grid: GridSettings::default(),
            list: ListSettings::default(),
            masonry: MasonrySettings::default(),
            slider: SliderSettings::default(),
            visibility: VisibilitySettings::default(),
        }
    }
}

impl WidgetConfig {
    /// Structural validation before a save. Token fields (columns, gap,
    /// animations) are not validated here — the plan resolver falls
    /// back on anything it does not recognize.
    pub fn validate(&self) -> Result<(), String> {
        for p in &self.platforms {
            if !is_supported_platform(p) {
                return Err(format!("Unsupported platform: {}", p));
            }
        }
        for rule in &self.filters {
            if rule.value.trim().is_empty() {
                return Err("Filter value cannot be empty".to_string());
            }
            if rule.platform != "all" && !is_supported_platform(&rule.platform) {
                return Err(format!("Unsupported filter platform: {}", rule.platform));
            }
        }
        if !(1..=100).contains(&self.max_posts) {
            return Err("max_posts must be between 1 and 100".to_string());
        }
        Ok(())
    }
}

// ── Widget rows ─────────────────────────────────────────

#[derive(Debug, Serialize, Clone)]
pub struct Widget {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub config: WidgetConfig,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct WidgetForm {
    pub name: String,
    #[serde(default)]
    pub config: WidgetConfig,
}

impl Widget {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let config_json: String = row.get("config_json")?;
        Ok(Widget {
            id: row.get("id")?,
            name: row.get("name")?,
            slug: row.get("slug")?,
            config: serde_json::from_str(&config_json).unwrap_or_default(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: i64) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row("SELECT * FROM widgets WHERE id = ?1", params![id], Self::from_row)
            .ok()
    }

    pub fn find_by_slug(pool: &DbPool, slug: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM widgets WHERE slug = ?1",
            params![slug],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(pool: &DbPool, limit: i64, offset: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        let mut stmt = match conn
            .prepare("SELECT * FROM widgets ORDER BY updated_at DESC LIMIT ?1 OFFSET ?2")
        {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        stmt.query_map(params![limit, offset], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn count(pool: &DbPool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM widgets", [], |row| row.get(0))
            .unwrap_or(0)
    }

    pub fn create(pool: &DbPool, form: &WidgetForm) -> Result<i64, String> {
        if form.name.trim().is_empty() {
            return Err("Widget name cannot be empty".to_string());
        }
        form.config.validate()?;

        let slug = Self::unique_slug(pool, &form.name);
        let config_json = serde_json::to_string(&form.config).map_err(|e| e.to_string())?;

        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO widgets (name, slug, config_json) VALUES (?1, ?2, ?3)",
            params![form.name.trim(), slug, config_json],
        )
        .map_err(|e| e.to_string())?;

        Ok(conn.last_insert_rowid())
    }

    /// Slug is fixed at create time; only name and config change.
    pub fn update(pool: &DbPool, id: i64, form: &WidgetForm) -> Result<(), String> {
        if form.name.trim().is_empty() {
            return Err("Widget name cannot be empty".to_string());
        }
        form.config.validate()?;

        let config_json = serde_json::to_string(&form.config).map_err(|e| e.to_string())?;

        let conn = pool.get().map_err(|e| e.to_string())?;
        let changed = conn
            .execute(
                "UPDATE widgets SET name=?1, config_json=?2, updated_at=CURRENT_TIMESTAMP WHERE id=?3",
                params![form.name.trim(), config_json, id],
            )
            .map_err(|e| e.to_string())?;

        if changed == 0 {
            return Err("Widget not found".to_string());
        }
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: i64) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        let changed = conn
            .execute("DELETE FROM widgets WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        if changed == 0 {
            return Err("Widget not found".to_string());
        }
        Ok(())
    }

    fn unique_slug(pool: &DbPool, name: &str) -> String {
        let base = {
            let s = slug::slugify(name);
            if s.is_empty() {
                "widget".to_string()
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
