//! Post filter engine: maps (posts, widget config) to the post set a
//! widget actually displays.
//!
//! The pipeline is pure and set-based. Include rules combine with OR,
//! exclude rules with AND-NOT, so rule order never changes the result
//! and applying the pipeline twice equals applying it once.

use crate::models::post::Post;
use crate::models::widget::{FilterKind, FilterMode, FilterRule, SortBy, WidgetConfig};

/// Does a single rule match a post? Matching is case-insensitive
/// substring containment; hashtag rules match `#value` in the content.
/// An empty value matches nothing.
pub fn rule_matches(rule: &FilterRule, post: &Post) -> bool {
    let value = rule.value.trim();
    if value.is_empty() {
        return false;
    }
    if rule.platform != "all" && rule.platform != post.platform {
        return false;
    }

    let needle = value.to_lowercase();
    match rule.kind {
        FilterKind::Hashtag => post
            .content
            .to_lowercase()
            .contains(&format!("#{}", needle)),
        FilterKind::Username => post.author.to_lowercase().contains(&needle),
        FilterKind::Keyword => post.content.to_lowercase().contains(&needle),
    }
}

/// Stages 1-3: platform selection, include (OR), exclude (AND-NOT).
/// Preserves input order; never sorts or truncates.
pub fn filter_posts(posts: &[Post], config: &WidgetConfig) -> Vec<Post> {
    let include: Vec<&FilterRule> = config
        .filters
        .iter()
        .filter(|f| f.mode == FilterMode::Include)
        .collect();
    let exclude: Vec<&FilterRule> = config
        .filters
        .iter()
        .filter(|f| f.mode == FilterMode::Exclude)
        .collect();

    posts
        .iter()
        .filter(|post| {
            config.platforms.is_empty() || config.platforms.iter().any(|p| p == &post.platform)
        })
        .filter(|post| include.is_empty() || include.iter().any(|rule| rule_matches(rule, post)))
        .filter(|post| !exclude.iter().any(|rule| rule_matches(rule, post)))
        .cloned()
        .collect()
}

/// Deterministic ordering; stable sort with the post id as tiebreak so
/// equal keys always render in the same order.
pub fn sort_posts(posts: &mut [Post], sort_by: SortBy) {
    match sort_by {
        SortBy::Newest => posts.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then(b.id.cmp(&a.id))),
        SortBy::Oldest => posts.sort_by(|a, b| a.posted_at.cmp(&b.posted_at).then(a.id.cmp(&b.id))),
        SortBy::Popular => posts.sort_by(|a, b| b.likes.cmp(&a.likes).then(b.id.cmp(&a.id))),
        SortBy::Engagement => posts.sort_by(|a, b| {
            (b.likes + b.comments)
                .cmp(&(a.likes + a.comments))
                .then(b.id.cmp(&a.id))
        }),
    }
}

/// The full pipeline: filter, sort, cap. `max_cap` is the site-wide
/// ceiling (max_posts_per_widget); the widget's own max_posts is
/// clamped into 1..=max_cap.
pub fn assemble_feed(posts: &[Post], config: &WidgetConfig, max_cap: i64) -> Vec<Post> {
    let mut feed = filter_posts(posts, config);
    sort_posts(&mut feed, config.sort_by);

    let cap = config.max_posts.clamp(1, max_cap.max(1)) as usize;
    feed.truncate(cap);
    feed
}
