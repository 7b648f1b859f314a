use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::State;

use crate::db::DbPool;
use crate::filter;
use crate::models::post::Post;
use crate::models::settings::Setting;
use crate::models::widget::Widget;
use crate::render;

const FEED_SOURCE_LIMIT: i64 = 500;

fn assemble(pool: &DbPool, widget: &Widget) -> Vec<Post> {
    let cap = {
        let c = Setting::get_i64(pool, "max_posts_per_widget");
        if c > 0 {
            c
        } else {
            50
        }
    };
    let source = Post::list(pool, None, FEED_SOURCE_LIMIT, 0);
    filter::assemble_feed(&source, &widget.config, cap)
}

#[get("/")]
pub fn index() -> Redirect {
    Redirect::to("/app")
}

/// The document loaded inside the generated iframe. width/height are
/// accepted (they ride along in the generated URL) but sizing is the
/// iframe's job; the document always fills its frame.
#[get("/embed?<id>&<theme>&<show_header>&<width>&<height>")]
#[allow(unused_variables)]
pub fn embed_page(
    pool: &State<DbPool>,
    id: i64,
    theme: Option<String>,
    show_header: Option<bool>,
    width: Option<String>,
    height: Option<String>,
) -> Option<RawHtml<String>> {
    let widget = Widget::find_by_id(pool, id)?;
    let posts = assemble(pool, &widget);
    let site_name = Setting::get_or(pool, "site_name", "Feedframe");

    Some(RawHtml(render::render_embed_document(
        &widget,
        &posts,
        theme.as_deref().unwrap_or("light"),
        show_header.unwrap_or(true),
        &site_name,
    )))
}

/// Shareable preview page for a saved widget.
#[get("/w/<slug>")]
pub fn widget_preview(pool: &State<DbPool>, slug: &str) -> Option<RawHtml<String>> {
    let widget = Widget::find_by_slug(pool, slug)?;
    let posts = assemble(pool, &widget);
    let site_name = Setting::get_or(pool, "site_name", "Feedframe");

    let body = render::render_widget(&widget, &posts, true, &site_name);
    Some(RawHtml(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} — {}</title>\n\
         <link rel=\"stylesheet\" href=\"/static/css/embed.css\">\n\
         </head>\n<body class=\"preview-page\">\n\
         <main class=\"preview-frame\">\n{}\n</main>\n\
         <script src=\"/static/js/embed.js\" defer></script>\n\
         </body>\n</html>",
        render::html_escape(&widget.name),
        render::html_escape(&site_name),
        body,
    )))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![index, embed_page, widget_preview]
}
