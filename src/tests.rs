#![cfg(test)]

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::collections::HashMap;

use crate::db::{run_migrations, seed_defaults, DbPool};
use crate::embed::{self, EmbedOptions};
use crate::filter;
use crate::models::post::{Post, PostForm};
use crate::models::settings::Setting;
use crate::models::template::{TemplateForm, WidgetTemplate};
use crate::models::widget::{
    FilterKind, FilterMode, FilterRule, Layout, SortBy, Theme, Widget, WidgetConfig, WidgetForm,
};
use crate::render;

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Create a fresh in-memory SQLite pool with migrations + seed defaults
/// applied. Uses a named shared-cache in-memory DB so multiple
/// connections from the pool see the same data.
fn test_pool() -> DbPool {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let uri = format!("file:testdb_{}?mode=memory&cache=shared", id);
    let manager = SqliteConnectionManager::file(uri);
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("Failed to create test pool");
    {
        let conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
    }
    run_migrations(&pool).expect("Failed to run migrations");
    seed_defaults(&pool).expect("Failed to seed defaults");
    pool
}

fn widget_form(name: &str, config: WidgetConfig) -> WidgetForm {
    WidgetForm {
        name: name.to_string(),
        config,
    }
}

// ═══════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════

#[test]
fn settings_set_and_get() {
    let pool = test_pool();
    Setting::set(&pool, "test_key", "hello").unwrap();
    assert_eq!(Setting::get(&pool, "test_key"), Some("hello".to_string()));
}

#[test]
fn settings_get_or_default() {
    let pool = test_pool();
    assert_eq!(Setting::get_or(&pool, "nonexistent", "fallback"), "fallback");
    Setting::set(&pool, "exists", "val").unwrap();
    assert_eq!(Setting::get_or(&pool, "exists", "fallback"), "val");
}

#[test]
fn settings_get_bool_and_i64() {
    let pool = test_pool();
    Setting::set(&pool, "flag_true", "true").unwrap();
    Setting::set(&pool, "flag_one", "1").unwrap();
    Setting::set(&pool, "flag_false", "false").unwrap();
    assert!(Setting::get_bool(&pool, "flag_true"));
    assert!(Setting::get_bool(&pool, "flag_one"));
    assert!(!Setting::get_bool(&pool, "flag_false"));
    assert!(!Setting::get_bool(&pool, "missing_flag"));

    Setting::set(&pool, "num", "42").unwrap();
    assert_eq!(Setting::get_i64(&pool, "num"), 42);
    assert_eq!(Setting::get_i64(&pool, "missing"), 0);
}

#[test]
fn settings_upsert_and_delete() {
    let pool = test_pool();
    Setting::set(&pool, "key", "first").unwrap();
    Setting::set(&pool, "key", "second").unwrap();
    assert_eq!(Setting::get(&pool, "key"), Some("second".to_string()));

    Setting::delete(&pool, "key").unwrap();
    assert_eq!(Setting::get(&pool, "key"), None);
}

#[test]
fn settings_set_many_and_group() {
    let pool = test_pool();
    let mut map = HashMap::new();
    map.insert("notify_email".to_string(), "false".to_string());
    map.insert("notify_weekly_reports".to_string(), "true".to_string());
    Setting::set_many(&pool, &map).unwrap();

    let group = Setting::get_group(&pool, "notify_");
    assert_eq!(group.get("notify_email"), Some(&"false".to_string()));
    assert_eq!(group.get("notify_weekly_reports"), Some(&"true".to_string()));
    // seeded members of the group are still present
    assert!(group.contains_key("notify_system_alerts"));
    assert!(!group.contains_key("site_name"));
}

#[test]
fn settings_seeded_defaults_present() {
    let pool = test_pool();
    assert_eq!(Setting::get_or(&pool, "default_layout", ""), "grid");
    assert_eq!(Setting::get_i64(&pool, "max_posts_per_widget"), 50);
    assert!(Setting::get_bool(&pool, "api_cache_enabled"));
}

// ═══════════════════════════════════════════════════════════
// Posts
// ═══════════════════════════════════════════════════════════

#[test]
fn posts_seeded_sample_feed() {
    let pool = test_pool();
    assert_eq!(Post::count(&pool, None), 10);
    assert_eq!(Post::count(&pool, Some("twitter")), 2);
    assert_eq!(Post::count(&pool, Some("youtube")), 1);

    // newest first
    let posts = Post::list(&pool, None, 3, 0);
    assert_eq!(posts.len(), 3);
    assert!(posts[0].posted_at >= posts[1].posted_at);
    assert!(posts[1].posted_at >= posts[2].posted_at);
}

#[test]
fn posts_seed_is_idempotent() {
    let pool = test_pool();
    seed_defaults(&pool).unwrap();
    assert_eq!(Post::count(&pool, None), 10);
}

#[test]
fn post_create_and_find() {
    let pool = test_pool();
    let form = PostForm {
        platform: "twitter".to_string(),
        author: "NewAuthor".to_string(),
        avatar: None,
        content: "Fresh post #testing".to_string(),
        media: vec!["https://example.com/img.jpg".to_string()],
        likes: 7,
        comments: 1,
        posted_at: Some("2024-01-10T09:00:00Z".to_string()),
    };
    let id = Post::create(&pool, &form).unwrap();
    let post = Post::find_by_id(&pool, id).unwrap();
    assert_eq!(post.author, "NewAuthor");
    assert_eq!(post.media, vec!["https://example.com/img.jpg".to_string()]);
    assert_eq!(post.posted_at.format("%Y-%m-%d %H:%M").to_string(), "2024-01-10 09:00");
}

#[test]
fn post_create_rejects_unknown_platform() {
    let pool = test_pool();
    let form = PostForm {
        platform: "myspace".to_string(),
        author: "x".to_string(),
        avatar: None,
        content: "y".to_string(),
        media: vec![],
        likes: 0,
        comments: 0,
        posted_at: None,
    };
    assert!(Post::create(&pool, &form).is_err());
}

#[test]
fn post_update_and_delete() {
    let pool = test_pool();
    let post = Post::list(&pool, Some("tiktok"), 1, 0).remove(0);

    let form = PostForm {
        platform: post.platform.clone(),
        author: post.author.clone(),
        avatar: post.avatar.clone(),
        content: "edited content".to_string(),
        media: vec![],
        likes: 99,
        comments: 3,
        posted_at: None,
    };
    Post::update(&pool, post.id, &form).unwrap();
    let updated = Post::find_by_id(&pool, post.id).unwrap();
    assert_eq!(updated.content, "edited content");
    assert_eq!(updated.likes, 99);
    // posted_at untouched when the form omits it
    assert_eq!(updated.posted_at, post.posted_at);

    Post::delete(&pool, post.id).unwrap();
    assert!(Post::find_by_id(&pool, post.id).is_none());
}

#[test]
fn post_search_matches_content_and_author() {
    let pool = test_pool();
    let by_content = Post::search(&pool, "fintech", 10);
    assert_eq!(by_content.len(), 1);
    assert_eq!(by_content[0].author, "StartupNews");

    let by_author = Post::search(&pool, "foodie", 10);
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].platform, "instagram");
}

// ═══════════════════════════════════════════════════════════
// Widgets
// ═══════════════════════════════════════════════════════════

#[test]
fn widget_create_assigns_slug() {
    let pool = test_pool();
    let id = Widget::create(&pool, &widget_form("My Launch Feed", WidgetConfig::default())).unwrap();
    let widget = Widget::find_by_id(&pool, id).unwrap();
    assert_eq!(widget.slug, "my-launch-feed");
    assert_eq!(widget.config, WidgetConfig::default());
    assert!(Widget::find_by_slug(&pool, "my-launch-feed").is_some());
}

#[test]
fn widget_duplicate_names_get_suffixed_slugs() {
    let pool = test_pool();
    Widget::create(&pool, &widget_form("Feed", WidgetConfig::default())).unwrap();
    let second = Widget::create(&pool, &widget_form("Feed", WidgetConfig::default())).unwrap();
    let third = Widget::create(&pool, &widget_form("Feed", WidgetConfig::default())).unwrap();
    assert_eq!(Widget::find_by_id(&pool, second).unwrap().slug, "feed-2");
    assert_eq!(Widget::find_by_id(&pool, third).unwrap().slug, "feed-3");
}

#[test]
fn widget_update_replaces_config_keeps_slug() {
    let pool = test_pool();
    let id = Widget::create(&pool, &widget_form("Feed", WidgetConfig::default())).unwrap();

    let config = WidgetConfig {
        layout: Layout::Masonry,
        theme: Theme::Magazine,
        max_posts: 25,
        platforms: vec!["instagram".to_string()],
        ..WidgetConfig::default()
    };
    Widget::update(&pool, id, &widget_form("Renamed Feed", config.clone())).unwrap();

    let widget = Widget::find_by_id(&pool, id).unwrap();
    assert_eq!(widget.name, "Renamed Feed");
    assert_eq!(widget.slug, "feed");
    assert_eq!(widget.config, config);
}

#[test]
fn widget_update_missing_errors() {
    let pool = test_pool();
    assert!(Widget::update(&pool, 999, &widget_form("x", WidgetConfig::default())).is_err());
    assert!(Widget::delete(&pool, 999).is_err());
}

#[test]
fn widget_rejects_invalid_config() {
    let pool = test_pool();

    let bad_platform = WidgetConfig {
        platforms: vec!["myspace".to_string()],
        ..WidgetConfig::default()
    };
    assert!(Widget::create(&pool, &widget_form("w", bad_platform)).is_err());

    let empty_filter = WidgetConfig {
        filters: vec![FilterRule {
            kind: FilterKind::Keyword,
            value: "   ".to_string(),
            platform: "all".to_string(),
            mode: FilterMode::Include,
        }],
        ..WidgetConfig::default()
    };
    assert!(Widget::create(&pool, &widget_form("w", empty_filter)).is_err());

    let bad_max = WidgetConfig {
        max_posts: 0,
        ..WidgetConfig::default()
    };
    assert!(Widget::create(&pool, &widget_form("w", bad_max)).is_err());

    assert!(Widget::create(&pool, &widget_form("   ", WidgetConfig::default())).is_err());
}

#[test]
fn widget_list_and_count() {
    let pool = test_pool();
    assert_eq!(Widget::count(&pool), 0);
    Widget::create(&pool, &widget_form("A", WidgetConfig::default())).unwrap();
    Widget::create(&pool, &widget_form("B", WidgetConfig::default())).unwrap();
    assert_eq!(Widget::count(&pool), 2);
    assert_eq!(Widget::list(&pool, 10, 0).len(), 2);
    assert_eq!(Widget::list(&pool, 1, 1).len(), 1);
}

// ═══════════════════════════════════════════════════════════
// Widget config serde
// ═══════════════════════════════════════════════════════════

#[test]
fn config_empty_json_is_default() {
    let config: WidgetConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, WidgetConfig::default());
    assert_eq!(config.layout, Layout::Grid);
    assert_eq!(config.theme, Theme::Minimal);
    assert_eq!(config.max_posts, 10);
    assert_eq!(config.sort_by, SortBy::Newest);
    assert!(config.visibility.show_likes);
}

#[test]
fn config_partial_json_fills_defaults() {
    let config: WidgetConfig = serde_json::from_str(
        r#"{
            "platforms": ["twitter"],
            "layout": "slider",
            "filters": [{"type": "hashtag", "value": "launch"}],
            "slider": {"loop": false},
            "future_field": true
        }"#,
    )
    .unwrap();

    assert_eq!(config.layout, Layout::Slider);
    assert_eq!(config.filters.len(), 1);
    // omitted rule fields default to all-platforms include
    assert_eq!(config.filters[0].platform, "all");
    assert_eq!(config.filters[0].mode, FilterMode::Include);
    // partial slider object keeps the other defaults
    assert!(!config.slider.looping);
    assert!(config.slider.autoplay);
    assert_eq!(config.slider.autoplay_delay_ms, 3000);
}

#[test]
fn config_roundtrips_through_json() {
    let config = WidgetConfig {
        platforms: vec!["twitter".to_string(), "instagram".to_string()],
        filters: vec![FilterRule {
            kind: FilterKind::Username,
            value: "chen".to_string(),
            platform: "linkedin".to_string(),
            mode: FilterMode::Exclude,
        }],
        layout: Layout::Masonry,
        theme: Theme::Compact,
        sort_by: SortBy::Engagement,
        ..WidgetConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: WidgetConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
    // wire names stay stable
    assert!(json.contains("\"type\":\"username\""));
    assert!(json.contains("\"loop\":true"));
}

// ═══════════════════════════════════════════════════════════
// Templates
// ═══════════════════════════════════════════════════════════

#[test]
fn templates_seeded_gallery() {
    let pool = test_pool();
    assert_eq!(WidgetTemplate::count(&pool), 4);
    assert_eq!(WidgetTemplate::featured(&pool).len(), 2);
    assert_eq!(WidgetTemplate::by_category(&pool, "events").len(), 1);
    assert_eq!(
        WidgetTemplate::categories(&pool),
        vec!["company", "events", "marketing", "social-proof"]
    );
}

#[test]
fn template_seeded_config_parses() {
    let pool = test_pool();
    let t = WidgetTemplate::find_by_slug(&pool, "event-hashtag-slider").unwrap();
    assert_eq!(t.config.layout, Layout::Slider);
    assert_eq!(t.config.theme, Theme::Magazine);
    assert_eq!(t.config.slider.autoplay_delay_ms, 4000);
    assert_eq!(t.config.filters[0].kind, FilterKind::Hashtag);
}

#[test]
fn template_search_and_stats() {
    let pool = test_pool();
    let hits = WidgetTemplate::search(&pool, "masonry");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].slug, "testimonial-masonry");

    let stats = WidgetTemplate::stats(&pool);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.by_layout.get("grid"), Some(&1));
    assert_eq!(stats.by_layout.get("slider"), Some(&1));
    assert_eq!(stats.by_theme.get("compact"), Some(&1));
    assert_eq!(stats.by_category.get("marketing"), Some(&1));
}

#[test]
fn template_crud() {
    let pool = test_pool();
    let form = TemplateForm {
        name: "Press Mentions".to_string(),
        description: "Keyword feed for press coverage".to_string(),
        category: "marketing".to_string(),
        featured: false,
        config: WidgetConfig {
            filters: vec![FilterRule {
                kind: FilterKind::Keyword,
                value: "press".to_string(),
                platform: "all".to_string(),
                mode: FilterMode::Include,
            }],
            ..WidgetConfig::default()
        },
    };
    let id = WidgetTemplate::create(&pool, &form).unwrap();
    assert_eq!(WidgetTemplate::count(&pool), 5);
    assert_eq!(WidgetTemplate::by_category(&pool, "marketing").len(), 2);

    let mut updated = form;
    updated.featured = true;
    WidgetTemplate::update(&pool, id, &updated).unwrap();
    assert!(WidgetTemplate::find_by_id(&pool, id).unwrap().featured);

    WidgetTemplate::delete(&pool, id).unwrap();
    assert!(WidgetTemplate::find_by_id(&pool, id).is_none());
}

// ═══════════════════════════════════════════════════════════
// Feed assembly against the store
// ═══════════════════════════════════════════════════════════

#[test]
fn feed_respects_platforms_and_filters() {
    let pool = test_pool();
    let config = WidgetConfig {
        platforms: vec!["twitter".to_string()],
        filters: vec![
            FilterRule {
                kind: FilterKind::Hashtag,
                value: "startup".to_string(),
                platform: "all".to_string(),
                mode: FilterMode::Include,
            },
            FilterRule {
                kind: FilterKind::Username,
                value: "news".to_string(),
                platform: "all".to_string(),
                mode: FilterMode::Exclude,
            },
        ],
        ..WidgetConfig::default()
    };

    let source = Post::list(&pool, None, 500, 0);
    let feed = filter::assemble_feed(&source, &config, 50);
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].author, "TechStartup");
}

#[test]
fn feed_honors_site_wide_cap() {
    let pool = test_pool();
    Setting::set(&pool, "max_posts_per_widget", "2").unwrap();
    let cap = Setting::get_i64(&pool, "max_posts_per_widget");

    let config = WidgetConfig {
        max_posts: 10,
        ..WidgetConfig::default()
    };
    let source = Post::list(&pool, None, 500, 0);
    let feed = filter::assemble_feed(&source, &config, cap);
    assert_eq!(feed.len(), 2);
}

#[test]
fn feed_sort_popular() {
    let pool = test_pool();
    let config = WidgetConfig {
        sort_by: SortBy::Popular,
        max_posts: 3,
        ..WidgetConfig::default()
    };
    let source = Post::list(&pool, None, 500, 0);
    let feed = filter::assemble_feed(&source, &config, 50);
    // seeded top likes: MakerChannel 8211, CreativeContent 5432, CreativeAgency 2156
    assert_eq!(feed[0].author, "MakerChannel");
    assert_eq!(feed[1].author, "CreativeContent");
    assert_eq!(feed[2].author, "CreativeAgency");
}

// ═══════════════════════════════════════════════════════════
// Embed codes
// ═══════════════════════════════════════════════════════════

fn saved_widget(pool: &DbPool, name: &str) -> Widget {
    let id = Widget::create(pool, &widget_form(name, WidgetConfig::default())).unwrap();
    Widget::find_by_id(pool, id).unwrap()
}

#[test]
fn embed_url_carries_options() {
    let pool = test_pool();
    let widget = saved_widget(&pool, "Feed");
    let opts = EmbedOptions::default();
    let url = embed::embed_url("https://widgets.example.com", widget.id, &opts);
    assert!(url.starts_with("https://widgets.example.com/embed?"));
    assert!(url.contains(&format!("id={}", widget.id)));
    assert!(url.contains("width=100%25"));
    assert!(url.contains("height=400px"));
    assert!(url.contains("theme=light"));
    assert!(url.contains("show_header=true"));
}

#[test]
fn embed_theme_normalizes() {
    let opts = EmbedOptions {
        theme: "sparkly".to_string(),
        ..EmbedOptions::default()
    };
    assert_eq!(opts.normalized_theme(), "light");
    let dark = EmbedOptions {
        theme: "dark".to_string(),
        ..EmbedOptions::default()
    };
    assert_eq!(dark.normalized_theme(), "dark");
}

#[test]
fn embed_snippet_shape() {
    let pool = test_pool();
    let widget = saved_widget(&pool, "Launch <Wall>");
    let opts = EmbedOptions {
        width: "640px".to_string(),
        height: "500px".to_string(),
        theme: "dark".to_string(),
        show_header: false,
    };
    let code = embed::iframe_snippet(&widget, "https://widgets.example.com", &opts);
    assert!(code.starts_with("<iframe"));
    assert!(code.contains("width=\"640px\""));
    assert!(code.contains("height=\"500px\""));
    assert!(code.contains("show_header=false"));
    assert!(code.contains("frameborder=\"0\""));
    // widget name is escaped inside the title attribute
    assert!(code.contains("Launch &lt;Wall&gt; - Social Feed Widget"));
    assert!(code.trim_end().ends_with("</iframe>"));
}

// ═══════════════════════════════════════════════════════════
// Widget rendering
// ═══════════════════════════════════════════════════════════

#[test]
fn render_widget_basic_structure() {
    let pool = test_pool();
    let widget = saved_widget(&pool, "My Feed");
    let posts = Post::list(&pool, None, 5, 0);

    let html = render::render_widget(&widget, &posts, true, "Feedframe");
    assert!(html.contains("widget-header"));
    assert!(html.contains("My Feed"));
    assert!(html.contains("grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-4 gap-6"));
    assert!(html.contains("Powered by Feedframe"));
    assert!(html.contains("grid layout"));
    assert_eq!(html.matches("<article").count(), 5);
}

#[test]
fn render_widget_header_toggle_and_empty_state() {
    let pool = test_pool();
    let widget = saved_widget(&pool, "My Feed");

    let html = render::render_widget(&widget, &[], false, "Feedframe");
    assert!(!html.contains("widget-header"));
    assert!(html.contains("No Posts Found"));
}

#[test]
fn render_widget_visibility_settings() {
    let pool = test_pool();
    let mut config = WidgetConfig::default();
    config.visibility.show_likes = false;
    config.visibility.show_platform_badge = false;
    let id = Widget::create(&pool, &widget_form("Quiet Feed", config)).unwrap();
    let widget = Widget::find_by_id(&pool, id).unwrap();
    let posts = Post::list(&pool, None, 3, 0);

    let html = render::render_widget(&widget, &posts, true, "Feedframe");
    assert!(!html.contains("stat-likes"));
    assert!(!html.contains("post-badge"));
    assert!(html.contains("stat-comments"));
}

#[test]
fn render_compact_theme_drops_footer() {
    let pool = test_pool();
    let config = WidgetConfig {
        theme: Theme::Compact,
        ..WidgetConfig::default()
    };
    let id = Widget::create(&pool, &widget_form("Sidebar", config)).unwrap();
    let widget = Widget::find_by_id(&pool, id).unwrap();

    let html = render::render_widget(&widget, &[], true, "Feedframe");
    assert!(!html.contains("widget-footer"));
}

#[test]
fn render_slider_emits_data_attributes() {
    let pool = test_pool();
    let config = WidgetConfig {
        layout: Layout::Slider,
        ..WidgetConfig::default()
    };
    let id = Widget::create(&pool, &widget_form("Carousel", config)).unwrap();
    let widget = Widget::find_by_id(&pool, id).unwrap();
    let posts = Post::list(&pool, None, 2, 0);

    let html = render::render_widget(&widget, &posts, true, "Feedframe");
    assert!(html.contains("slider-container"));
    assert!(html.contains("data-autoplay=\"true\""));
    assert!(html.contains("data-delay=\"3000\""));
    assert!(html.contains("data-loop=\"true\""));
}

#[test]
fn render_embed_document_is_standalone() {
    let pool = test_pool();
    let widget = saved_widget(&pool, "Embedded Feed");
    let posts = Post::list(&pool, None, 2, 0);

    let doc = render::render_embed_document(&widget, &posts, "dark", true, "Feedframe");
    assert!(doc.starts_with("<!DOCTYPE html>"));
    assert!(doc.contains("theme-dark"));
    assert!(doc.contains("embed.css"));
    assert!(doc.contains("Embedded Feed"));

    let light = render::render_embed_document(&widget, &posts, "nonsense", true, "Feedframe");
    assert!(light.contains("theme-light"));
}
