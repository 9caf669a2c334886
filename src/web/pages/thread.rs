//! Thread detail and thread creation pages.

use maud::{html, Markup, PreEscaped};

use crate::components::card::engagement_controls;
use crate::components::{
    format_timestamp, Alert, BaseLayout, EmptyState, Form, FormGroup, Input, Label, TagBadge,
    TextArea,
};
use crate::db::{slugify, Category, ReplyView, ThreadView, User};
use crate::web::routes::NewThreadForm;

/// Shows or hides the price field when the selected category changes, and
/// marks which categories expect a price via data attributes on the options.
const PRICE_TOGGLE_SCRIPT: &str = r"(function() {
    var select = document.getElementById('category-select');
    var priceGroup = document.getElementById('price-group');
    if (!select || !priceGroup) return;
    function update() {
        var option = select.options[select.selectedIndex];
        var marketplace = option && option.dataset.marketplace === 'true';
        priceGroup.style.display = marketplace ? '' : 'none';
    }
    select.addEventListener('change', update);
    update();
})();";

/// Parameters for the thread detail page.
#[derive(Debug)]
pub struct ThreadPageParams<'a> {
    pub thread: &'a ThreadView,
    pub replies: &'a [ReplyView],
    pub user: Option<&'a User>,
    pub liked: bool,
    pub bookmarked: bool,
}

/// Render the thread detail page with replies and the reply form.
#[must_use]
pub fn render_thread_page(params: &ThreadPageParams<'_>) -> Markup {
    let thread = params.thread;
    let category_slug = slugify(&thread.category_name);

    let content = html! {
        nav class="breadcrumb" {
            a href="/forum" { "Forum" }
            " / "
            a href=(format!("/forum/{category_slug}")) { (thread.category_name) }
            " / "
            (thread.title)
        }

        article class="thread-detail" {
            h1 { (thread.title) }
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
            div class="thread-content" {
                @for paragraph in thread.content.split("\n\n") {
                    p { (paragraph) }
                }
            }
            p class="engagement" {
                (engagement_controls(thread, params.user.is_some(), params.liked, params.bookmarked))
            }
        }

        section class="replies" {
            h2 {
                (params.replies.len())
                @if params.replies.len() == 1 { " Reply" } @else { " Replies" }
            }
            @if params.replies.is_empty() {
                (EmptyState::new("No replies yet."))
            }
            @for reply in params.replies {
                article class="reply" {
                    p class="meta" {
                        span class="author" { (reply.author_name) }
                        " "
                        span class="reply-time" { (format_timestamp(&reply.created_at)) }
                    }
                    div class="reply-content" {
                        @for paragraph in reply.content.split("\n\n") {
                            p { (paragraph) }
                        }
                    }
                }
            }

            @if params.user.is_some() {
                (reply_form(thread.id))
            } @else {
                p {
                    a href="/login" { "Log in" }
                    " to reply."
                }
            }
        }
    };

    BaseLayout::new(&thread.title, params.user).render(content)
}

fn reply_form(thread_id: i64) -> Markup {
    let action = format!("/forum/threads/{thread_id}/replies");
    let form = Form::post(
        &action,
        html! {
            (TextArea::new("content")
                .placeholder("Write a reply")
                .required()
                .rows(4))
            button type="submit" { "Post Reply" }
        },
    )
    .class("reply-form");
    html! { (form) }
}

/// Parameters for the new-thread form page.
#[derive(Debug)]
pub struct NewThreadPageParams<'a> {
    pub categories: &'a [Category],
    pub selected_category_id: Option<i64>,
    pub user: &'a User,
    /// Validation error from a rejected submission.
    pub error: Option<&'a str>,
    /// Rejected submission to refill the form with.
    pub draft: Option<&'a NewThreadForm>,
}

/// Render the new-thread form.
#[must_use]
pub fn render_new_thread_page(params: &NewThreadPageParams<'_>) -> Markup {
    let draft_title = params.draft.map(|d| d.title.as_str()).unwrap_or("");
    let draft_content = params.draft.map(|d| d.content.as_str()).unwrap_or("");
    let draft_tags = params.draft.map(|d| d.tags.as_str()).unwrap_or("");
    let draft_price = params.draft.map(|d| d.price.as_str()).unwrap_or("");

    let category_options: Markup = html! {
        @for category in params.categories {
            option
                value=(category.id)
                data-marketplace=(if category.is_marketplace() { "true" } else { "false" })
                selected[params.selected_category_id == Some(category.id)] {
                (category.name)
            }
        }
    };

    let form_content = html! {
        (FormGroup::new(
            Label::new("category-select", "Category"),
            html! {
                select name="category_id" id="category-select" required {
                    (category_options)
                }
            },
        ))
        (FormGroup::new(
            Label::new("title-input", "Title"),
            html! { (Input::text("title").value(draft_title).required().id("title-input")) },
        ))
        (FormGroup::new(
            Label::new("content-input", "Content"),
            html! {
                (TextArea::new("content")
                    .value(draft_content)
                    .required()
                    .rows(8)
                    .id("content-input"))
            },
        ))
        (FormGroup::new(
            Label::new("tags-input", "Tags"),
            html! {
                (Input::text("tags")
                    .value(draft_tags)
                    .placeholder("zelda, n64")
                    .id("tags-input")
                    .autocomplete("off"))
            },
        )
        .help("Comma separated. Marketplace posts need at least one tag."))
        div id="price-group" {
            (FormGroup::new(
                Label::new("price-input", "Price (USD)"),
                html! {
                    (Input::number("price")
                        .value(draft_price)
                        .numeric_bounds("0.01", "0.01")
                        .id("price-input"))
                },
            ))
        }
        button type="submit" { "Create Thread" }
    };

    let content = html! {
        h1 { "New Thread" }
        @if let Some(error) = params.error {
            (Alert::error(error))
        }
        (Form::post("/forum/threads", form_content).class("new-thread-form"))
        div id="tag-suggestions" data-endpoint="/api/tags/search" {}
        script { (PreEscaped(PRICE_TOGGLE_SCRIPT)) }
    };

    BaseLayout::new("New Thread", Some(params.user)).render(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "poster".to_string(),
            password_hash: "hash".to_string(),
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    fn sample_thread() -> ThreadView {
        ThreadView {
            id: 3,
            title: "Best CRT for light gun games?".to_string(),
            content: "Duck Hunt needs a real tube.".to_string(),
            category_id: 3,
            category_name: "Technical Help".to_string(),
            user_id: 1,
            author_name: "poster".to_string(),
            price: None,
            created_at: "2024-03-01 10:00:00".to_string(),
            like_count: 2,
            reply_count: 0,
            tags: Some("crt".to_string()),
        }
    }

    #[test]
    fn test_anonymous_thread_page_prompts_login() {
        let thread = sample_thread();
        let params = ThreadPageParams {
            thread: &thread,
            replies: &[],
            user: None,
            liked: false,
            bookmarked: false,
        };
        let html = render_thread_page(&params).into_string();
        assert!(html.contains("Log in"));
        assert!(!html.contains("Post Reply"));
    }

    #[test]
    fn test_signed_in_thread_page_has_reply_form() {
        let thread = sample_thread();
        let user = sample_user();
        let params = ThreadPageParams {
            thread: &thread,
            replies: &[],
            user: Some(&user),
            liked: true,
            bookmarked: false,
        };
        let html = render_thread_page(&params).into_string();
        assert!(html.contains("/forum/threads/3/replies"));
        assert!(html.contains("data-liked=\"true\""));
    }

    #[test]
    fn test_new_thread_form_preserves_draft() {
        let user = sample_user();
        let draft = NewThreadForm {
            title: "WTS Saturn".to_string(),
            content: "Good condition".to_string(),
            category_id: 4,
            price: "120".to_string(),
            tags: "console".to_string(),
        };
        let categories = vec![Category {
            id: 4,
            name: "Marketplace".to_string(),
            description: String::new(),
            display_order: 4,
        }];
        let params = NewThreadPageParams {
            categories: &categories,
            selected_category_id: Some(4),
            user: &user,
            error: Some("Marketplace posts require a price"),
            draft: Some(&draft),
        };
        let html = render_new_thread_page(&params).into_string();
        assert!(html.contains("WTS Saturn"));
        assert!(html.contains("Marketplace posts require a price"));
        assert!(html.contains("data-marketplace=\"true\""));
    }
}
