//! Server-side widget HTML. The builder preview, the public preview
//! page, and the embed document all render through here; class tokens
//! come from the resolved layout plan and are styled by the embed
//! stylesheet.

use chrono::NaiveDateTime;

use crate::models::post::Post;
use crate::models::widget::Widget;
use crate::plan::{self, LayoutPlan};

/// Render the widget box: header, post list in the resolved layout,
/// footer. `show_header` comes from the embed options.
pub fn render_widget(widget: &Widget, posts: &[Post], show_header: bool, site_name: &str) -> String {
    let plan = plan::resolve(&widget.config);
    let now = chrono::Utc::now().naive_utc();

    let mut html = format!(
        "<div class=\"widget rounded-xl overflow-hidden {}\" data-widget=\"{}\">\n",
        plan.wrapper_classes, widget.id
    );

    if show_header {
        html.push_str(&format!(
            "<div class=\"widget-header {}\">\
             <h3>{}</h3>\
             <p>{} platforms &bull; {} posts</p>\
             </div>\n",
            plan.header_classes,
            html_escape(&widget.name),
            widget.config.platforms.len(),
            posts.len(),
        ));
    }

    html.push_str(&format!(
        "<div class=\"widget-content {} {} overflow-y-auto\">\n",
        plan.content_classes, plan.max_height_class
    ));

    if posts.is_empty() {
        html.push_str(
            "<div class=\"widget-empty\">\
             <h4>No Posts Found</h4>\
             <p>Adjust your platform selection or filters to see posts</p>\
             </div>\n",
        );
    } else {
        html.push_str(&render_post_list(widget, posts, &plan, now));
    }

    html.push_str("</div>\n");

    // Compact widgets drop the footer entirely
    if widget.config.theme != crate::models::widget::Theme::Compact {
        html.push_str(&format!(
            "<div class=\"widget-footer\">\
             <span>Powered by {}</span>\
             <span>{} layout</span>\
             </div>\n",
            html_escape(site_name),
            plan.layout.as_str(),
        ));
    }

    html.push_str("</div>");
    html
}

fn render_post_list(widget: &Widget, posts: &[Post], plan: &LayoutPlan, now: NaiveDateTime) -> String {
    let mut html = match &plan.slider {
        // Slider state lives in data attributes; the embed script reads them.
        Some(slider) => format!(
            "<div class=\"{}\" data-autoplay=\"{}\" data-delay=\"{}\" data-speed=\"{}\" \
             data-drag=\"{}\" data-navigation=\"{}\" data-pagination=\"{}\" data-loop=\"{}\">\n",
            plan.container_classes,
            slider.autoplay,
            slider.autoplay_delay_ms,
            slider.speed_ms,
            slider.drag_control,
            slider.navigation,
            slider.pagination,
            slider.looping,
        ),
        None => format!("<div class=\"{}\">\n", plan.container_classes),
    };

    for (index, post) in posts.iter().enumerate() {
        html.push_str(&render_post_card(widget, post, plan, index, now));
    }

    html.push_str("</div>\n");
    html
}

fn render_post_card(
    widget: &Widget,
    post: &Post,
    plan: &LayoutPlan,
    index: usize,
    now: NaiveDateTime,
) -> String {
    let vis = &widget.config.visibility;
    let item_classes = plan.item_classes(index);
    let delay = plan.animation_delay_ms(index);
    let delay_attr = if delay > 0 {
        format!(" style=\"animation-delay:{}ms\"", delay)
    } else {
        String::new()
    };

    let mut html = format!(
        "<article class=\"post-card post-{}{}{}\"{}>\n",
        html_escape(&post.platform),
        if item_classes.is_empty() { String::new() } else { format!(" {}", item_classes) },
        if plan.slider.is_some() { " slide" } else { "" },
        delay_attr,
    );

    if vis.show_author {
        let avatar = post
            .avatar
            .as_deref()
            .map(|a| format!("<img class=\"post-avatar\" src=\"{}\" alt=\"\">", html_escape(a)))
            .unwrap_or_default();
        let timestamp = if vis.show_timestamp {
            format!(
                "<time datetime=\"{}\">{}</time>",
                post.posted_at.format("%Y-%m-%dT%H:%M:%S"),
                relative_time(post.posted_at, now)
            )
        } else {
            String::new()
        };
        html.push_str(&format!(
            "<header class=\"post-meta\">{}<span class=\"post-author\">{}</span>{}</header>\n",
            avatar,
            html_escape(&post.author),
            timestamp,
        ));
    }

    if vis.show_platform_badge {
        html.push_str(&format!(
            "<span class=\"post-badge badge-{p}\">{p}</span>\n",
            p = html_escape(&post.platform)
        ));
    }

    if let Some(media) = post.media.first() {
        html.push_str(&format!(
            "<div class=\"post-media {}\"><img src=\"{}\" alt=\"\" loading=\"lazy\"></div>\n",
            plan.aspect_ratio_class,
            html_escape(media),
        ));
    }

    if vis.show_text {
        html.push_str(&format!(
            "<p class=\"post-text\">{}</p>\n",
            html_escape(&post.content)
        ));
    }

    if vis.show_likes || vis.show_comments {
        html.push_str("<footer class=\"post-stats\">");
        if vis.show_likes {
            html.push_str(&format!(
                "<span class=\"stat-likes\">&hearts; {}</span>",
                format_count(post.likes)
            ));
        }
        if vis.show_comments {
            html.push_str(&format!(
                "<span class=\"stat-comments\">&#9993; {}</span>",
                format_count(post.comments)
            ));
        }
        html.push_str("</footer>\n");
    }

    html.push_str("</article>\n");
    html
}

/// Standalone document served inside the embed iframe.
pub fn render_embed_document(
    widget: &Widget,
    posts: &[Post],
    embed_theme: &str,
    show_header: bool,
    site_name: &str,
) -> String {
    let body = render_widget(widget, posts, show_header, site_name);
    let doc_theme = if embed_theme == "dark" { "dark" } else { "light" };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/css/embed.css\">\n\
         </head>\n<body class=\"embed theme-{}\">\n{}\n\
         <script src=\"/static/js/embed.js\" defer></script>\n\
         </body>\n</html>",
        html_escape(&widget.name),
        doc_theme,
        body,
    )
}

// ── Helpers ─────────────────────────────────────────────

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// 1247 -> "1.2k", 2500000 -> "2.5M"
pub fn format_count(count: i64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}k", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Compact relative timestamp for post cards. Falls back to an absolute
/// date past a week.
pub fn relative_time(t: NaiveDateTime, now: NaiveDateTime) -> String {
    let secs = (now - t).num_seconds();
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3600)
    } else if secs < 7 * 86_400 {
        format!("{}d ago", secs / 86_400)
    } else {
        t.format("%b %d, %Y").to_string()
    }
}
