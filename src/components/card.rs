//! Card components for thread listings.

use maud::{html, Markup, Render};

use crate::components::timeago::format_timestamp;
use crate::db::ThreadView;

/// A tag badge linking to the tag-filtered listing for its category.
#[derive(Debug, Clone)]
pub struct TagBadge<'a> {
    pub name: &'a str,
    /// Category slug the badge links into; `None` renders a plain badge.
    pub category_slug: Option<&'a str>,
}

impl<'a> TagBadge<'a> {
    #[must_use]
    pub const fn new(name: &'a str) -> Self {
        Self {
            name,
            category_slug: None,
        }
    }

    /// Link the badge to the tag filter of a category listing.
    #[must_use]
    pub const fn with_category(mut self, slug: &'a str) -> Self {
        self.category_slug = Some(slug);
        self
    }
}

impl Render for TagBadge<'_> {
    fn render(&self) -> Markup {
        match self.category_slug {
            Some(slug) => html! {
                a class="tag-badge"
                    href=(format!("/forum/{slug}?tags={}", urlencoding::encode(self.name))) {
                    (self.name)
                }
            },
            None => html! {
                span class="tag-badge" { (self.name) }
            },
        }
    }
}

/// A thread summary card for listing pages.
///
/// Engagement buttons render only for signed-in viewers; anonymous visitors
/// see the counts as static text.
#[derive(Debug, Clone)]
pub struct ThreadCard<'a> {
    pub thread: &'a ThreadView,
    pub viewer_signed_in: bool,
    pub liked: bool,
    pub bookmarked: bool,
}

impl<'a> ThreadCard<'a> {
    #[must_use]
    pub const fn new(thread: &'a ThreadView) -> Self {
        Self {
            thread,
            viewer_signed_in: false,
            liked: false,
            bookmarked: false,
        }
    }

    /// Set the viewer's engagement state for this thread.
    #[must_use]
    pub const fn with_viewer(mut self, liked: bool, bookmarked: bool) -> Self {
        self.viewer_signed_in = true;
        self.liked = liked;
        self.bookmarked = bookmarked;
        self
    }
}

impl Render for ThreadCard<'_> {
    fn render(&self) -> Markup {
        let thread = self.thread;
        let category_slug = crate::db::slugify(&thread.category_name);

        html! {
            article class="thread-card" {
                h3 {
                    a href=(format!("/forum/threads/{}", thread.id)) { (thread.title) }
                }
                p class="meta" {
                    span class="author" { "by " (thread.author_name) }
                    " "
                    span class="thread-time" { (format_timestamp(&thread.created_at)) }
                    @if let Some(price) = thread.price {
                        " "
                        span class="price" { (format!("${price:.2}")) }
                    }
                }
                @if !thread.tag_names().is_empty() {
                    p class="tags" {
                        @for tag in thread.tag_names() {
                            (TagBadge::new(tag).with_category(&category_slug))
                            " "
                        }
                    }
                }
                p class="engagement" {
                    (engagement_controls(thread, self.viewer_signed_in, self.liked, self.bookmarked))
                    span class="reply-count" {
                        (thread.reply_count)
                        @if thread.reply_count == 1 { " reply" } @else { " replies" }
                    }
                }
            }
        }
    }
}

/// Like and bookmark controls shared by cards and the thread page.
#[must_use]
pub fn engagement_controls(
    thread: &ThreadView,
    viewer_signed_in: bool,
    liked: bool,
    bookmarked: bool,
) -> Markup {
    if viewer_signed_in {
        html! {
            button class="like-button"
                data-thread-id=(thread.id)
                data-liked=(bool_attr(liked))
                aria-pressed=(bool_attr(liked)) {
                @if liked { "♥ " } @else { "♡ " }
                span class="like-count" { (thread.like_count) }
            }
            " "
            button class="bookmark-button"
                data-thread-id=(thread.id)
                data-bookmarked=(bool_attr(bookmarked))
                aria-pressed=(bool_attr(bookmarked)) {
                @if bookmarked { "★ Saved" } @else { "☆ Save" }
            }
            " "
        }
    } else {
        html! {
            span class="like-count-static" { "♡ " (thread.like_count) }
            " "
        }
    }
}

const fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Placeholder shown when a listing has no content.
#[derive(Debug, Clone)]
pub struct EmptyState<'a> {
    pub message: &'a str,
}

impl<'a> EmptyState<'a> {
    #[must_use]
    pub const fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Render for EmptyState<'_> {
    fn render(&self) -> Markup {
        html! {
            article class="empty-state" {
                p { (self.message) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_thread() -> ThreadView {
        ThreadView {
            id: 7,
            title: "WTB boxed EarthBound".to_string(),
            content: "Looking for a complete copy.".to_string(),
            category_id: 4,
            category_name: "Marketplace".to_string(),
            user_id: 1,
            author_name: "collector".to_string(),
            price: Some(250.0),
            created_at: "2024-03-01 10:00:00".to_string(),
            like_count: 3,
            reply_count: 1,
            tags: Some("snes,cib".to_string()),
        }
    }

    #[test]
    fn test_card_links_to_thread() {
        let thread = sample_thread();
        let html = ThreadCard::new(&thread).render().into_string();
        assert!(html.contains("href=\"/forum/threads/7\""));
        assert!(html.contains("WTB boxed EarthBound"));
        assert!(html.contains("$250.00"));
        assert!(html.contains("1 reply"));
    }

    #[test]
    fn test_anonymous_card_has_no_buttons() {
        let thread = sample_thread();
        let html = ThreadCard::new(&thread).render().into_string();
        assert!(!html.contains("like-button"));
        assert!(html.contains("like-count-static"));
    }

    #[test]
    fn test_signed_in_card_has_toggle_buttons() {
        let thread = sample_thread();
        let html = ThreadCard::new(&thread)
            .with_viewer(true, false)
            .render()
            .into_string();
        assert!(html.contains("like-button"));
        assert!(html.contains("data-liked=\"true\""));
        assert!(html.contains("data-bookmarked=\"false\""));
    }

    #[test]
    fn test_tag_badge_links_into_category_filter() {
        let html = TagBadge::new("snes")
            .with_category("marketplace")
            .render()
            .into_string();
        assert!(html.contains("href=\"/forum/marketplace?tags=snes\""));
    }
}
