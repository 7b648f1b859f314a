//! Embed code generation: the querystring and iframe snippet users
//! paste into their own sites. The iframe points at this app's /embed
//! route (or any host configured via the embed_base_url setting).

use serde::{Deserialize, Serialize};

use crate::models::widget::Widget;
use crate::render::html_escape;

/// Size/theme presets offered by the builder UI.
pub const WIDTH_PRESETS: &[(&str, &str)] = &[
    ("100%", "Responsive (100%)"),
    ("320px", "Mobile (320px)"),
    ("480px", "Small (480px)"),
    ("640px", "Medium (640px)"),
    ("800px", "Large (800px)"),
    ("1024px", "Extra Large (1024px)"),
];

pub const HEIGHT_PRESETS: &[(&str, &str)] = &[
    ("300px", "Compact (300px)"),
    ("400px", "Standard (400px)"),
    ("500px", "Tall (500px)"),
    ("600px", "Extra Tall (600px)"),
];

pub const THEME_PRESETS: &[(&str, &str)] = &[("light", "Light Theme"), ("dark", "Dark Theme")];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedOptions {
    pub width: String,
    pub height: String,
    /// "light" or "dark"; anything else normalizes to light.
    pub theme: String,
    pub show_header: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        EmbedOptions {
            width: "100%".to_string(),
            height: "400px".to_string(),
            theme: "light".to_string(),
            show_header: true,
        }
    }
}

impl EmbedOptions {
    pub fn normalized_theme(&self) -> &'static str {
        if self.theme == "dark" {
            "dark"
        } else {
            "light"
        }
    }
}

/// Absolute URL of the embed document for a widget.
pub fn embed_url(base: &str, widget_id: i64, opts: &EmbedOptions) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("id", &widget_id.to_string())
        .append_pair("width", &opts.width)
        .append_pair("height", &opts.height)
        .append_pair("theme", opts.normalized_theme())
        .append_pair("show_header", if opts.show_header { "true" } else { "false" })
        .finish();
    format!("{}/embed?{}", base.trim_end_matches('/'), query)
}

/// The copy-paste iframe snippet.
pub fn iframe_snippet(widget: &Widget, base: &str, opts: &EmbedOptions) -> String {
    let src = embed_url(base, widget.id, opts);
    format!(
        "<iframe\n  src=\"{src}\"\n  width=\"{width}\"\n  height=\"{height}\"\n  \
         frameborder=\"0\"\n  scrolling=\"no\"\n  \
         style=\"border: none; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.1);\"\n  \
         title=\"{title} - Social Feed Widget\">\n</iframe>",
        src = src,
        width = html_escape(&opts.width),
        height = html_escape(&opts.height),
        title = html_escape(&widget.name),
    )
}
