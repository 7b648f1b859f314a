use rocket::form::Form;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;
use std::collections::HashMap;

use crate::db::DbPool;
use crate::embed;
use crate::models::post::{Post, SUPPORTED_PLATFORMS};
use crate::models::settings::Setting;
use crate::models::template::WidgetTemplate;
use crate::models::widget::{Widget, WidgetConfig};

// ── Dashboard ──────────────────────────────────────────

#[get("/?<page>")]
pub fn dashboard(pool: &State<DbPool>, page: Option<i64>) -> Template {
    let per_page = 20i64;
    let current_page = page.unwrap_or(1).max(1);
    let offset = (current_page - 1) * per_page;

    let widgets = Widget::list(pool, per_page, offset);
    let total = Widget::count(pool);
    let total_pages = (total as f64 / per_page as f64).ceil() as i64;

    let context = json!({
        "page_title": "Widgets",
        "widgets": widgets,
        "total": total,
        "current_page": current_page,
        "total_pages": total_pages,
        "post_count": Post::count(pool, None),
        "template_count": WidgetTemplate::count(pool),
        "settings": Setting::all(pool),
    });

    Template::render("app/dashboard", &context)
}

// ── Builder ────────────────────────────────────────────

/// New widget, edit an existing one (?widget=<id>), or start from a
/// template (?template=<id>).
#[get("/builder?<widget>&<template>")]
pub fn builder(pool: &State<DbPool>, widget: Option<i64>, template: Option<i64>) -> Template {
    let editing = widget.and_then(|id| Widget::find_by_id(pool, id));

    let (initial_name, initial_config) = match (&editing, template) {
        (Some(w), _) => (w.name.clone(), w.config.clone()),
        (None, Some(tid)) => match WidgetTemplate::find_by_id(pool, tid) {
            Some(t) => (t.name.clone(), t.config.clone()),
            None => (String::new(), WidgetConfig::default()),
        },
        (None, None) => (String::new(), WidgetConfig::default()),
    };

    let context = json!({
        "page_title": if editing.is_some() { "Edit Widget" } else { "Create Widget" },
        "widget": editing,
        "initial_name": initial_name,
        "initial_config": initial_config,
        "platforms": SUPPORTED_PLATFORMS,
        "layout_options": [
            { "value": "grid", "label": "Grid Layout" },
            { "value": "list", "label": "List Layout" },
            { "value": "masonry", "label": "Masonry Layout" },
            { "value": "slider", "label": "Slider Layout" },
        ],
        "theme_options": [
            { "value": "minimal", "label": "Minimal", "description": "Clean, minimal design with lots of whitespace" },
            { "value": "card", "label": "Card", "description": "Modern card-based layout with subtle shadows" },
            { "value": "compact", "label": "Compact", "description": "Dense layout perfect for sidebars" },
            { "value": "magazine", "label": "Magazine", "description": "Rich editorial style with enhanced typography" },
        ],
        "max_posts_options": [5, 10, 15, 20, 30, 50],
        "sort_options": [
            { "value": "newest", "label": "Newest First" },
            { "value": "oldest", "label": "Oldest First" },
            { "value": "popular", "label": "Most Popular" },
            { "value": "engagement", "label": "Most Engagement" },
        ],
        "embed_width_presets": embed::WIDTH_PRESETS,
        "embed_height_presets": embed::HEIGHT_PRESETS,
        "embed_theme_presets": embed::THEME_PRESETS,
        "settings": Setting::all(pool),
    });

    Template::render("app/builder", &context)
}

// ── Template gallery ───────────────────────────────────

#[get("/templates?<category>&<q>")]
pub fn templates_page(pool: &State<DbPool>, category: Option<String>, q: Option<String>) -> Template {
    let templates = if let Some(ref query) = q {
        WidgetTemplate::search(pool, query)
    } else if let Some(ref cat) = category {
        WidgetTemplate::by_category(pool, cat)
    } else {
        WidgetTemplate::list(pool)
    };

    let context = json!({
        "page_title": "Templates",
        "templates": templates,
        "featured": WidgetTemplate::featured(pool),
        "categories": WidgetTemplate::categories(pool),
        "category_filter": category,
        "search_query": q,
        "stats": WidgetTemplate::stats(pool),
        "settings": Setting::all(pool),
    });

    Template::render("app/templates", &context)
}

// ── Settings ───────────────────────────────────────────

const SETTINGS_SECTIONS: &[&str] = &["general", "api", "notifications", "embed"];

#[get("/settings/<section>")]
pub fn settings_page(
    pool: &State<DbPool>,
    section: &str,
    flash: Option<rocket::request::FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    if !SETTINGS_SECTIONS.contains(&section) {
        return Err(Redirect::to("/app/settings/general"));
    }

    let mut context = json!({
        "page_title": format!("Settings — {}", section),
        "section": section,
        "sections": SETTINGS_SECTIONS,
        "platforms": SUPPORTED_PLATFORMS,
        "settings": Setting::all(pool),
    });

    if let Some(ref f) = flash {
        context["flash_kind"] = json!(f.kind());
        context["flash_msg"] = json!(f.message());
    }

    Ok(Template::render("app/settings", &context))
}

#[get("/settings")]
pub fn settings_index() -> Redirect {
    Redirect::to("/app/settings/general")
}

#[post("/settings/<section>", data = "<form>")]
pub fn settings_save(
    pool: &State<DbPool>,
    section: &str,
    form: Form<HashMap<String, String>>,
) -> Result<Flash<Redirect>, Flash<Redirect>> {
    let data = form.into_inner();
    let dest = format!("/app/settings/{}", section);

    match Setting::set_many(pool, &data) {
        Ok(()) => Ok(Flash::success(Redirect::to(dest), "Settings saved")),
        Err(e) => Err(Flash::error(Redirect::to(dest), format!("Save failed: {}", e))),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        dashboard,
        builder,
        templates_page,
        settings_page,
        settings_index,
        settings_save,
    ]
}
