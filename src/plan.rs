//! Layout plan resolver: maps a widget's layout, theme, and per-layout
//! settings to the concrete display tokens the renderer and the embed
//! stylesheet consume. Resolution is total — unknown tokens fall back
//! to the documented defaults instead of erroring.

use serde::Serialize;

use crate::models::widget::{Layout, SliderSettings, Theme, WidgetConfig};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SliderPlan {
    pub autoplay: bool,
    pub autoplay_delay_ms: i64,
    pub speed_ms: i64,
    pub drag_control: bool,
    pub navigation: bool,
    pub pagination: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl From<&SliderSettings> for SliderPlan {
    fn from(s: &SliderSettings) -> Self {
        SliderPlan {
            autoplay: s.autoplay,
            autoplay_delay_ms: s.autoplay_delay_ms.max(0),
            speed_ms: s.speed_ms.max(0),
            drag_control: s.drag_control,
            navigation: s.navigation,
            pagination: s.pagination,
            looping: s.looping,
        }
    }
}

/// The resolved rendering plan for one widget.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LayoutPlan {
    pub layout: Layout,
    pub theme: Theme,
    /// Classes on the element holding the post items.
    pub container_classes: String,
    /// Theme classes on the outer widget box.
    pub wrapper_classes: String,
    pub header_classes: String,
    pub content_classes: String,
    pub max_height_class: String,
    /// Media aspect class (grid only; empty elsewhere).
    pub aspect_ratio_class: String,
    pub hover_class: String,
    pub animation_class: String,
    /// Static per-item classes (masonry break/min-height).
    pub item_base_classes: String,
    /// Stagger/cascade animations delay each item by index * 100 ms.
    pub staggered: bool,
    /// List layouts may flip every other item.
    pub alternating: bool,
    pub slider: Option<SliderPlan>,
}

impl LayoutPlan {
    pub fn item_classes(&self, index: usize) -> String {
        let mut classes: Vec<&str> = Vec::new();
        if !self.animation_class.is_empty() {
            classes.push(&self.animation_class);
        }
        if !self.item_base_classes.is_empty() {
            classes.push(&self.item_base_classes);
        }
        if !self.hover_class.is_empty() {
            classes.push(&self.hover_class);
        }
        if self.is_alternate(index) {
            classes.push("item-alternate");
        }
        classes.join(" ")
    }

    pub fn animation_delay_ms(&self, index: usize) -> i64 {
        if self.staggered {
            (index as i64) * 100
        } else {
            0
        }
    }

    pub fn is_alternate(&self, index: usize) -> bool {
        self.alternating && index % 2 == 1
    }
}

/// Resolve a widget config into its rendering plan.
pub fn resolve(config: &WidgetConfig) -> LayoutPlan {
    let theme = config.theme;
    let layout = config.layout;

    let (container_classes, animation_token, hover_token, item_base_classes, alternating, slider) =
        match layout {
            Layout::Grid => {
                let g = &config.grid;
                let mut classes = format!(
                    "grid {} {}",
                    grid_columns_class(&g.columns),
                    gap_class(g.gap.as_deref())
                );
                if g.equal_height {
                    classes.push_str(" grid-rows-1");
                }
                // When gap is unset the theme supplies its own gap token,
                // appended after the base so it wins.
                if g.gap.is_none() {
                    classes.push(' ');
                    classes.push_str(theme_gap_fallback(theme));
                }
                (classes, g.animation.as_str(), g.hover_effect.as_str(), String::new(), false, None)
            }
            Layout::List => {
                let l = &config.list;
                let mut classes = if l.compact_mode {
                    "space-y-2".to_string()
                } else {
                    spacing_class(&l.spacing).to_string()
                };
                if l.show_dividers {
                    classes.push_str(" divide-y divide-gray-100");
                }
                (
                    classes,
                    l.animation.as_str(),
                    l.hover_effect.as_str(),
                    String::new(),
                    l.alternate_layout,
                    None,
                )
            }
            Layout::Masonry => {
                let m = &config.masonry;
                let classes = format!(
                    "{} {}",
                    masonry_columns_class(&m.columns),
                    gap_class(m.gap.as_deref())
                );
                let mut item = format!("break-inside-{}", break_inside_token(&m.break_inside));
                if m.min_item_height > 0 {
                    item.push_str(&format!(" min-h-[{}px]", m.min_item_height));
                }
                (classes, m.animation.as_str(), "", item, false, None)
            }
            Layout::Slider => (
                "slider-container".to_string(),
                "",
                "",
                String::new(),
                false,
                Some(SliderPlan::from(&config.slider)),
            ),
        };

    let staggered = matches!(animation_token, "stagger" | "cascade");

    LayoutPlan {
        layout,
        theme,
        container_classes,
        wrapper_classes: wrapper_classes(theme).to_string(),
        header_classes: header_classes(theme).to_string(),
        content_classes: content_classes(theme).to_string(),
        max_height_class: max_height_class(theme).to_string(),
        aspect_ratio_class: if layout == Layout::Grid {
            aspect_ratio_class(&config.grid.aspect_ratio).to_string()
        } else {
            String::new()
        },
        hover_class: hover_class(hover_token).to_string(),
        animation_class: animation_class(animation_token).to_string(),
        item_base_classes,
        staggered,
        alternating,
        slider,
    }
}

// ── Token tables ────────────────────────────────────────

fn gap_class(gap: Option<&str>) -> &'static str {
    match gap {
        Some("xs") => "gap-1",
        Some("sm") => "gap-2",
        Some("md") => "gap-4",
        Some("lg") => "gap-6",
        Some("xl") => "gap-8",
        _ => "gap-4",
    }
}

fn spacing_class(spacing: &str) -> &'static str {
    match spacing {
        "xs" => "space-y-1",
        "sm" => "space-y-2",
        "md" => "space-y-4",
        "lg" => "space-y-6",
        "xl" => "space-y-8",
        _ => "space-y-4",
    }
}

fn grid_columns_class(columns: &str) -> &'static str {
    match columns {
        "1" => "grid-cols-1",
        "2" => "grid-cols-1 md:grid-cols-2",
        "3" => "grid-cols-1 md:grid-cols-2 lg:grid-cols-3",
        "4" => "grid-cols-1 md:grid-cols-2 lg:grid-cols-3 xl:grid-cols-4",
        "5" => "grid-cols-1 md:grid-cols-2 lg:grid-cols-3 xl:grid-cols-4 2xl:grid-cols-5",
        "auto" | "" => "grid-cols-1 md:grid-cols-2 lg:grid-cols-3",
        _ => "grid-cols-1 md:grid-cols-2",
    }
}

fn masonry_columns_class(columns: &str) -> &'static str {
    match columns {
        "2" => "columns-1 md:columns-2",
        "3" => "columns-1 md:columns-2 lg:columns-3",
        "4" => "columns-1 md:columns-2 lg:columns-3 xl:columns-4",
        "5" => "columns-1 md:columns-2 lg:columns-3 xl:columns-4 2xl:columns-5",
        "auto" | "" => "columns-1 md:columns-2 lg:columns-3",
        _ => "columns-1 md:columns-2",
    }
}

/// Gap each theme supplies when a grid widget leaves gap unset.
fn theme_gap_fallback(theme: Theme) -> &'static str {
    match theme {
        Theme::Minimal => "gap-6",
        Theme::Card => "gap-4",
        Theme::Compact => "gap-2",
        Theme::Magazine => "gap-5",
    }
}

fn wrapper_classes(theme: Theme) -> &'static str {
    match theme {
        Theme::Minimal => "bg-white border-0 shadow-none",
        Theme::Card => "bg-white border border-gray-200 shadow-premium",
        Theme::Compact => "bg-gray-50 border border-gray-100 shadow-sm",
        Theme::Magazine => "bg-gradient-to-br from-white to-gray-50 border border-gray-200 shadow-luxury",
    }
}

fn header_classes(theme: Theme) -> &'static str {
    match theme {
        Theme::Minimal => "bg-white border-b border-gray-100 p-6",
        Theme::Card => "bg-gradient-to-r from-primary to-secondary p-4",
        Theme::Compact => "bg-gray-100 p-2",
        Theme::Magazine => "bg-gradient-to-r from-gray-900 to-gray-700 p-6",
    }
}

fn content_classes(theme: Theme) -> &'static str {
    match theme {
        Theme::Minimal => "py-12 px-8",
        Theme::Card => "py-8 px-4",
        Theme::Compact => "p-2",
        Theme::Magazine => "py-10 px-6",
    }
}

fn max_height_class(theme: Theme) -> &'static str {
    match theme {
        Theme::Minimal => "max-h-96",
        Theme::Card => "max-h-80",
        Theme::Compact => "max-h-64",
        Theme::Magazine => "max-h-[32rem]",
    }
}

fn aspect_ratio_class(token: &str) -> &'static str {
    match token {
        "square" => "aspect-square",
        "video" => "aspect-video",
        "portrait" => "aspect-[4/5]",
        _ => "",
    }
}

fn hover_class(token: &str) -> &'static str {
    match token {
        "lift" => "hover-lift",
        "scale" => "hover-scale",
        "glow" => "hover-glow",
        _ => "",
    }
}

fn animation_class(token: &str) -> &'static str {
    match token {
        "fadeIn" => "animate-fade-in",
        "slideUp" => "animate-slide-up",
        "slideIn" => "animate-slide-in",
        // stagger fades each item in with a per-index delay
        "stagger" => "animate-fade-in",
        "cascade" => "animate-cascade",
        "wave" => "animate-wave",
        _ => "",
    }
}

fn break_inside_token(token: &str) -> &'static str {
    match token {
        "auto" => "auto",
        "column" => "column",
        _ => "avoid",
    }
}
