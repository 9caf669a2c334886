//! Base layout components for the web UI.
//!
//! This module provides the main page layout structure including
//! the HTML skeleton, navigation, and footer.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::db::User;

/// Critical theme initialization script that runs in <head> to prevent flash of wrong theme.
/// Must be inline (not external) to execute before body renders.
const THEME_INIT_SCRIPT: &str = r#"(function() {
    var theme = localStorage.getItem('theme');
    if (theme) {
        document.documentElement.setAttribute('data-theme', theme);
    } else if (window.matchMedia('(prefers-color-scheme: dark)').matches) {
        document.documentElement.setAttribute('data-theme', 'dark');
    }
})();"#;

/// Base page layout builder.
///
/// Provides a fluent interface for constructing the main page layout
/// with required user context for authentication-aware navigation.
///
/// # Example
///
/// ```ignore
/// use maud::html;
/// use crate::components::layout::BaseLayout;
///
/// let content = html! { h1 { "Hello World" } };
/// let page = BaseLayout::new("My Page", user.as_ref())
///     .render(content);
/// ```
#[derive(Debug, Clone)]
pub struct BaseLayout<'a> {
    title: &'a str,
    user: Option<&'a User>,
}

impl<'a> BaseLayout<'a> {
    /// Create a new base layout with the given page title and user.
    ///
    /// The user parameter is required to ensure authentication state is
    /// always explicitly handled. Pass `None` for anonymous visitors or
    /// `Some(&user)` for authenticated users.
    #[must_use]
    pub const fn new(title: &'a str, user: Option<&'a User>) -> Self {
        Self { title, user }
    }

    /// Render the complete HTML page with the given content.
    ///
    /// The content will be placed inside the `<main class="container">` element.
    #[must_use]
    pub fn render(self, content: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" data-theme="light" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="color-scheme" content="light dark";
                    title { (self.title) " - Retro Forum" }

                    link rel="stylesheet" href="/static/css/style.css";
                    link rel="icon" href="data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🕹️</text></svg>";
                    // Inline critical script to prevent theme flicker
                    script { (PreEscaped(THEME_INIT_SCRIPT)) }
                }
                body {
                    (self.render_header())
                    main class="container" {
                        (content)
                    }
                    (Self::render_footer())
                    // External scripts for interactive functionality
                    script src="/static/js/theme.js" {}
                    script src="/static/js/engagement.js" {}
                }
            }
        }
    }

    /// Render the page header with navigation.
    fn render_header(&self) -> Markup {
        html! {
            header class="container" {
                nav {
                    ul {
                        li {
                            a href="/forum" {
                                strong class="site-logo" { "Retro Forum" }
                            }
                        }
                    }
                    ul {
                        li { a href="/forum" { "Forum" } }
                        li { a href="/blog" { "Blog" } }
                        (self.render_auth_nav())
                        li {
                            button
                                id="theme-toggle"
                                class="theme-toggle"
                                title="Toggle dark mode"
                                aria-label="Toggle dark mode" { "🌓" }
                        }
                    }
                }
            }
        }
    }

    /// Render authentication-related navigation items.
    fn render_auth_nav(&self) -> Markup {
        match self.user {
            Some(u) => html! {
                li { a href="/profile" { (u.username) } }
                li {
                    form method="post" action="/logout" class="logout-form" {
                        button type="submit" class="link-button" { "Log out" }
                    }
                }
            },
            None => html! {
                li { a href="/login" { "Login" } }
            },
        }
    }

    /// Render the page footer.
    fn render_footer() -> Markup {
        html! {
            footer class="container" {
                small {
                    "Retro Forum | "
                    a href="/forum" { "Forum" }
                    " | "
                    a href="/blog" { "Blog" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: 1,
            username: "player_one".to_string(),
            password_hash: "hash".to_string(),
            created_at: "2024-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_anonymous_nav_shows_login() {
        let page = BaseLayout::new("Home", None).render(html! { p { "hi" } });
        let rendered = page.into_string();
        assert!(rendered.contains("href=\"/login\""));
        assert!(!rendered.contains("/logout"));
    }

    #[test]
    fn test_authenticated_nav_shows_profile_and_logout() {
        let user = test_user();
        let page = BaseLayout::new("Home", Some(&user)).render(html! { p { "hi" } });
        let rendered = page.into_string();
        assert!(rendered.contains("player_one"));
        assert!(rendered.contains("action=\"/logout\""));
        assert!(!rendered.contains("href=\"/login\""));
    }

    #[test]
    fn test_title_includes_site_name() {
        let page = BaseLayout::new("Marketplace", None).render(html! {});
        assert!(page.into_string().contains("<title>Marketplace - Retro Forum</title>"));
    }
}
