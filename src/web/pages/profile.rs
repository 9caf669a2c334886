//! Profile page: account details and saved threads.

use std::collections::HashSet;

use maud::{html, Markup};

use crate::components::{format_timestamp, BaseLayout, EmptyState, ThreadCard};
use crate::db::{ThreadView, User};

/// Render the signed-in user's profile with their bookmarked threads.
#[must_use]
pub fn render_profile_page(
    user: &User,
    bookmarks: &[ThreadView],
    liked: &HashSet<i64>,
) -> Markup {
    let content = html! {
        h1 { (user.username) }
        p class="meta" {
            "Member since " (format_timestamp(&user.created_at))
        }

        section class="bookmarks" {
            h2 { "Saved Threads" }
            @if bookmarks.is_empty() {
                (EmptyState::new("Nothing saved yet. Bookmark threads to find them here."))
            }
            div class="thread-list" {
                @for thread in bookmarks {
                    (ThreadCard::new(thread).with_viewer(liked.contains(&thread.id), true))
                }
            }
        }
    };

    BaseLayout::new("Profile", Some(user)).render(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile() {
        let user = User {
            id: 1,
            username: "collector".to_string(),
            password_hash: "hash".to_string(),
            created_at: "2024-01-01 00:00:00".to_string(),
        };
        let html = render_profile_page(&user, &[], &HashSet::new()).into_string();
        assert!(html.contains("collector"));
        assert!(html.contains("Nothing saved yet"));
    }
}
