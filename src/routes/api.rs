use log::info;
use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::db::DbPool;
use crate::embed::{self, EmbedOptions};
use crate::filter;
use crate::models::post::{Post, PostForm};
use crate::models::settings::Setting;
use crate::models::template::{TemplateForm, WidgetTemplate};
use crate::models::widget::{Widget, WidgetConfig, WidgetForm};
use crate::plan;
use crate::render;

/// How many posts the filter pipeline reads per request. Keeps a huge
/// posts table from being loaded wholesale.
const FEED_SOURCE_LIMIT: i64 = 500;

fn max_posts_cap(pool: &DbPool) -> i64 {
    let cap = Setting::get_i64(pool, "max_posts_per_widget");
    if cap > 0 {
        cap
    } else {
        50
    }
}

// ── Widgets ────────────────────────────────────────────

#[get("/widgets?<page>")]
pub fn widgets_list(pool: &State<DbPool>, page: Option<i64>) -> Json<Value> {
    let per_page = 20i64;
    let current_page = page.unwrap_or(1).max(1);
    let offset = (current_page - 1) * per_page;

    let widgets = Widget::list(pool, per_page, offset);
    let total = Widget::count(pool);

    Json(json!({
        "widgets": widgets,
        "total": total,
        "page": current_page,
    }))
}

#[get("/widgets/<id>")]
pub fn widget_get(pool: &State<DbPool>, id: i64) -> Option<Json<Widget>> {
    Widget::find_by_id(pool, id).map(Json)
}

#[post("/widgets", format = "json", data = "<form>")]
pub fn widget_create(pool: &State<DbPool>, form: Json<WidgetForm>) -> Json<Value> {
    match Widget::create(pool, &form) {
        Ok(id) => {
            info!("Widget created: {} (#{})", form.name, id);
            Json(json!({
                "success": true,
                "id": id,
                "widget": Widget::find_by_id(pool, id),
            }))
        }
        Err(e) => Json(json!({ "success": false, "error": e })),
    }
}

#[put("/widgets/<id>", format = "json", data = "<form>")]
pub fn widget_update(pool: &State<DbPool>, id: i64, form: Json<WidgetForm>) -> Json<Value> {
    match Widget::update(pool, id, &form) {
        Ok(()) => Json(json!({
            "success": true,
            "widget": Widget::find_by_id(pool, id),
        })),
        Err(e) => Json(json!({ "success": false, "error": e })),
    }
}

#[delete("/widgets/<id>")]
pub fn widget_delete(pool: &State<DbPool>, id: i64) -> Json<Value> {
    match Widget::delete(pool, id) {
        Ok(()) => Json(json!({ "success": true })),
        Err(e) => Json(json!({ "success": false, "error": e })),
    }
}

/// Filtered post set plus the resolved rendering plan — everything an
/// embed client needs to draw the widget.
#[get("/widgets/<id>/feed")]
pub fn widget_feed(pool: &State<DbPool>, id: i64) -> Option<Json<Value>> {
    let widget = Widget::find_by_id(pool, id)?;

    let source = Post::list(pool, None, FEED_SOURCE_LIMIT, 0);
    let feed = filter::assemble_feed(&source, &widget.config, max_posts_cap(pool));
    let plan = plan::resolve(&widget.config);
    let total = feed.len();

    Some(Json(json!({
        "widget_id": widget.id,
        "posts": feed,
        "plan": plan,
        "total": total,
    })))
}

#[get("/widgets/<id>/embed-code?<width>&<height>&<theme>&<show_header>")]
pub fn widget_embed_code(
    pool: &State<DbPool>,
    id: i64,
    width: Option<String>,
    height: Option<String>,
    theme: Option<String>,
    show_header: Option<bool>,
) -> Option<Json<Value>> {
    let widget = Widget::find_by_id(pool, id)?;

    let defaults = EmbedOptions::default();
    let opts = EmbedOptions {
        width: width.unwrap_or(defaults.width),
        height: height.unwrap_or(defaults.height),
        theme: theme.unwrap_or(defaults.theme),
        show_header: show_header.unwrap_or(defaults.show_header),
    };

    let base = Setting::get_or(pool, "embed_base_url", "http://localhost:8000");

    Some(Json(json!({
        "url": embed::embed_url(&base, widget.id, &opts),
        "code": embed::iframe_snippet(&widget, &base, &opts),
        "options": opts,
    })))
}

/// Live preview for an unsaved configuration: the builder posts the
/// config on every change and swaps in the returned fragment.
#[post("/preview", format = "json", data = "<config>")]
pub fn widget_preview(pool: &State<DbPool>, config: Json<WidgetConfig>) -> Json<Value> {
    let config = config.into_inner();
    if let Err(e) = config.validate() {
        return Json(json!({ "success": false, "error": e }));
    }

    let widget = Widget {
        id: 0,
        name: "Preview".to_string(),
        slug: "preview".to_string(),
        config,
        created_at: chrono::Utc::now().naive_utc(),
        updated_at: chrono::Utc::now().naive_utc(),
    };

    let source = Post::list(pool, None, FEED_SOURCE_LIMIT, 0);
    let feed = filter::assemble_feed(&source, &widget.config, max_posts_cap(pool));
    let site_name = Setting::get_or(pool, "site_name", "Feedframe");

    Json(json!({
        "success": true,
        "html": render::render_widget(&widget, &feed, true, &site_name),
        "plan": plan::resolve(&widget.config),
        "post_count": feed.len(),
    }))
}

// ── Posts ──────────────────────────────────────────────

#[get("/posts?<platform>&<page>")]
pub fn posts_list(pool: &State<DbPool>, platform: Option<String>, page: Option<i64>) -> Json<Value> {
    let per_page = 50i64;
    let current_page = page.unwrap_or(1).max(1);
    let offset = (current_page - 1) * per_page;

    let posts = Post::list(pool, platform.as_deref(), per_page, offset);
    let total = Post::count(pool, platform.as_deref());

    Json(json!({
        "posts": posts,
        "total": total,
        "page": current_page,
    }))
}

#[get("/posts/search?<q>")]
pub fn posts_search(pool: &State<DbPool>, q: String) -> Json<Value> {
    let posts = Post::search(pool, &q, 100);
    Json(json!({ "posts": posts, "query": q }))
}

#[get("/posts/<id>")]
pub fn post_get(pool: &State<DbPool>, id: i64) -> Option<Json<Post>> {
    Post::find_by_id(pool, id).map(Json)
}

#[post("/posts", format = "json", data = "<form>")]
pub fn post_create(pool: &State<DbPool>, form: Json<PostForm>) -> Json<Value> {
    match Post::create(pool, &form) {
        Ok(id) => Json(json!({
            "success": true,
            "id": id,
            "post": Post::find_by_id(pool, id),
        })),
        Err(e) => Json(json!({ "success": false, "error": e })),
    }
}

#[put("/posts/<id>", format = "json", data = "<form>")]
pub fn post_update(pool: &State<DbPool>, id: i64, form: Json<PostForm>) -> Json<Value> {
    match Post::update(pool, id, &form) {
        Ok(()) => Json(json!({
            "success": true,
            "post": Post::find_by_id(pool, id),
        })),
        Err(e) => Json(json!({ "success": false, "error": e })),
    }
}

#[delete("/posts/<id>")]
pub fn post_delete(pool: &State<DbPool>, id: i64) -> Json<Value> {
    match Post::delete(pool, id) {
        Ok(()) => Json(json!({ "success": true })),
        Err(e) => Json(json!({ "success": false, "error": e })),
    }
}

// ── Templates ──────────────────────────────────────────

#[get("/templates?<category>&<featured>&<q>")]
pub fn templates_list(
    pool: &State<DbPool>,
    category: Option<String>,
    featured: Option<bool>,
    q: Option<String>,
) -> Json<Value> {
    let templates = if let Some(query) = q {
        WidgetTemplate::search(pool, &query)
    } else if featured.unwrap_or(false) {
        WidgetTemplate::featured(pool)
    } else if let Some(cat) = category {
        WidgetTemplate::by_category(pool, &cat)
    } else {
        WidgetTemplate::list(pool)
    };

    Json(json!({
        "templates": templates,
        "categories": WidgetTemplate::categories(pool),
    }))
}

#[get("/templates/stats")]
pub fn templates_stats(pool: &State<DbPool>) -> Json<Value> {
    Json(serde_json::to_value(WidgetTemplate::stats(pool)).unwrap_or_default())
}

#[get("/templates/<id>")]
pub fn template_get(pool: &State<DbPool>, id: i64) -> Option<Json<WidgetTemplate>> {
    WidgetTemplate::find_by_id(pool, id).map(Json)
}

#[post("/templates", format = "json", data = "<form>")]
pub fn template_create(pool: &State<DbPool>, form: Json<TemplateForm>) -> Json<Value> {
    match WidgetTemplate::create(pool, &form) {
        Ok(id) => Json(json!({
            "success": true,
            "id": id,
            "template": WidgetTemplate::find_by_id(pool, id),
        })),
        Err(e) => Json(json!({ "success": false, "error": e })),
    }
}

#[put("/templates/<id>", format = "json", data = "<form>")]
pub fn template_update(pool: &State<DbPool>, id: i64, form: Json<TemplateForm>) -> Json<Value> {
    match WidgetTemplate::update(pool, id, &form) {
        Ok(()) => Json(json!({
            "success": true,
            "template": WidgetTemplate::find_by_id(pool, id),
        })),
        Err(e) => Json(json!({ "success": false, "error": e })),
    }
}

#[delete("/templates/<id>")]
pub fn template_delete(pool: &State<DbPool>, id: i64) -> Json<Value> {
    match WidgetTemplate::delete(pool, id) {
        Ok(()) => Json(json!({ "success": true })),
        Err(e) => Json(json!({ "success": false, "error": e })),
    }
}

// ── Settings ───────────────────────────────────────────

#[get("/settings")]
pub fn settings_all(pool: &State<DbPool>) -> Json<HashMap<String, String>> {
    Json(Setting::all(pool))
}

#[put("/settings", format = "json", data = "<updates>")]
pub fn settings_update(pool: &State<DbPool>, updates: Json<HashMap<String, String>>) -> Json<Value> {
    match Setting::set_many(pool, &updates) {
        Ok(()) => Json(json!({ "success": true, "settings": Setting::all(pool) })),
        Err(e) => Json(json!({ "success": false, "error": e })),
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        widgets_list,
        widget_get,
        widget_create,
        widget_update,
        widget_delete,
        widget_feed,
        widget_embed_code,
        widget_preview,
        posts_list,
        posts_search,
        post_get,
        post_create,
        post_update,
        post_delete,
        templates_list,
        templates_stats,
        template_get,
        template_create,
        template_update,
        template_delete,
        settings_all,
        settings_update,
    ]
}
