//! Blog pages backed by the headless CMS.

use maud::{html, Markup};

use crate::cms::BlogPost;
use crate::components::{Alert, BaseLayout, EmptyState, Form, Input};
use crate::db::User;

/// Render the blog index with the optional search query applied.
#[must_use]
pub fn render_blog_index(
    posts: &[BlogPost],
    query: Option<&str>,
    degraded: bool,
    user: Option<&User>,
) -> Markup {
    let content = html! {
        h1 { "Blog" }

        @if degraded {
            (Alert::warning("The blog is temporarily unavailable. Please try again later."))
        }

        (search_form(query))

        @if posts.is_empty() && !degraded {
            @if query.is_some() {
                (EmptyState::new("No posts match your search."))
            } @else {
                (EmptyState::new("No posts yet."))
            }
        }
        div class="blog-list" {
            @for post in posts {
                article class="blog-card" {
                    @if let Some(image) = &post.main_image_url {
                        img src=(image) alt=(post.title) loading="lazy";
                    }
                    h3 {
                        a href=(format!("/blog/{}", post.slug)) { (post.title) }
                    }
                    p class="meta" { (post.publication_date) }
                    p { (post.excerpt) }
                }
            }
        }
    };

    BaseLayout::new("Blog", user).render(content)
}

fn search_form(query: Option<&str>) -> Markup {
    let value = query.unwrap_or("");
    let form = Form::get(
        "/blog",
        html! {
            (Input::text("query").value(value).placeholder("Search posts"))
            button type="submit" { "Search" }
        },
    )
    .class("blog-search");
    html! { (form) }
}

/// Render a single blog post.
#[must_use]
pub fn render_blog_post(post: &BlogPost, user: Option<&User>) -> Markup {
    let content = html! {
        nav class="breadcrumb" {
            a href="/blog" { "Blog" }
            " / "
            (post.title)
        }
        article class="blog-post" {
            h1 { (post.title) }
            p class="meta" { (post.publication_date) }
            @if let Some(image) = &post.main_image_url {
                img src=(image) alt=(post.title);
            }
            div class="blog-content" {
                @for paragraph in post.content.split("\n\n") {
                    p { (paragraph) }
                }
            }
        }
    };

    BaseLayout::new(&post.title, user).render(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> BlogPost {
        BlogPost {
            id: "p1".to_string(),
            title: "Hidden gems of the Saturn library".to_string(),
            slug: "saturn-hidden-gems".to_string(),
            publication_date: "2024-02-20".to_string(),
            excerpt: "Beyond Panzer Dragoon.".to_string(),
            content: "First paragraph.\n\nSecond paragraph.".to_string(),
            main_image_url: Some("https://images.example.net/saturn.jpg".to_string()),
        }
    }

    #[test]
    fn test_index_links_posts() {
        let posts = vec![sample_post()];
        let html = render_blog_index(&posts, None, false, None).into_string();
        assert!(html.contains("href=\"/blog/saturn-hidden-gems\""));
        assert!(html.contains("Hidden gems"));
    }

    #[test]
    fn test_degraded_index_shows_warning() {
        let html = render_blog_index(&[], None, true, None).into_string();
        assert!(html.contains("temporarily unavailable"));
    }

    #[test]
    fn test_post_renders_paragraphs() {
        let html = render_blog_post(&sample_post(), None).into_string();
        assert!(html.contains("<p>First paragraph.</p>"));
        assert!(html.contains("<p>Second paragraph.</p>"));
        assert!(html.contains("src=\"https://images.example.net/saturn.jpg\""));
    }
}
