use serde::{Deserialize, Serialize};

/// A forum category. Seeded reference data; identified in URLs by a slug
/// derived from the name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub display_order: i64,
}

impl Category {
    /// URL slug for this category: lower-cased, whitespace joined by hyphens.
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Whether this is the Marketplace category (tag-and-price semantics).
    #[must_use]
    pub fn is_marketplace(&self) -> bool {
        self.name.eq_ignore_ascii_case("marketplace")
    }
}

/// Derive a URL slug from a category name.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

/// A login session row backing the session cookie.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

/// A top-level forum post.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Thread {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: i64,
    pub user_id: i64,
    pub price: Option<f64>,
    pub created_at: String,
}

/// A response attached to a thread.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reply {
    pub id: i64,
    pub thread_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: String,
}

/// A global tag. Names are stored lower-case and deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A row from the `threads_with_details` view: a thread joined with its
/// author, category, engagement counts, and tag names.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ThreadView {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: i64,
    pub category_name: String,
    pub user_id: i64,
    pub author_name: String,
    pub price: Option<f64>,
    pub created_at: String,
    pub like_count: i64,
    pub reply_count: i64,
    /// Comma-joined tag names, NULL when the thread has none.
    pub tags: Option<String>,
}

impl ThreadView {
    /// Tag names for this thread.
    #[must_use]
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|t| t.split(',').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Whether this thread carries every tag in `wanted` (names compared
    /// case-insensitively).
    #[must_use]
    pub fn has_all_tags(&self, wanted: &[String]) -> bool {
        let own: Vec<String> = self.tag_names().iter().map(|t| t.to_lowercase()).collect();
        wanted.iter().all(|w| own.contains(&w.to_lowercase()))
    }
}

/// A row from the `replies_with_author` view.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReplyView {
    pub id: i64,
    pub thread_id: i64,
    pub user_id: i64,
    pub author_name: String,
    pub content: String,
    pub created_at: String,
}

/// Sort option for thread listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadSort {
    /// Most recently created first (the default).
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Descending like count, ties by arrival order.
    MostLiked,
    /// Ascending price, threads without a price last.
    PriceAsc,
    /// Descending price, threads without a price last.
    PriceDesc,
}

impl ThreadSort {
    /// Create from a URL parameter value.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s {
            "oldest" => Self::Oldest,
            "most-liked" => Self::MostLiked,
            "price-asc" => Self::PriceAsc,
            "price-desc" => Self::PriceDesc,
            _ => Self::Newest,
        }
    }

    /// Get the string value for URL parameters.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::MostLiked => "most-liked",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
        }
    }

    /// Get the display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::Oldest => "Oldest",
            Self::MostLiked => "Most Liked",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
        }
    }

    /// ORDER BY clause implementing this sort as a total order.
    /// `price IS NULL` sorts first ascending on false, which places
    /// unpriced threads last under both price directions.
    #[must_use]
    pub const fn order_clause(&self) -> &'static str {
        match self {
            Self::Newest => "ORDER BY created_at DESC, id DESC",
            Self::Oldest => "ORDER BY created_at ASC, id ASC",
            Self::MostLiked => "ORDER BY like_count DESC, id ASC",
            Self::PriceAsc => "ORDER BY price IS NULL, price ASC, id ASC",
            Self::PriceDesc => "ORDER BY price IS NULL, price DESC, id ASC",
        }
    }
}

/// Filters applied conjunctively to a thread listing.
#[derive(Debug, Clone, Default)]
pub struct ThreadFilter {
    /// Threads must carry every one of these tag names.
    pub tags: Vec<String>,
    /// Case-insensitive substring match on the title.
    pub title_search: Option<String>,
    pub sort: ThreadSort,
}

/// Data for inserting a new thread.
#[derive(Debug, Clone)]
pub struct NewThread {
    pub title: String,
    pub content: String,
    pub category_id: i64,
    pub user_id: i64,
    pub price: Option<f64>,
    /// Comma-separated tag names typed by the user; only names that already
    /// exist in the tags table get linked.
    pub tags_csv: Option<String>,
}

/// Result of a like toggle: the state the (thread, user) pair is now in and
/// the authoritative count.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
    pub like_count: i64,
}

/// Result of a bookmark toggle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BookmarkToggle {
    pub bookmarked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("General Discussion"), "general-discussion");
        assert_eq!(slugify("Marketplace"), "marketplace");
        assert_eq!(slugify("  Odd   Spacing "), "odd-spacing");
    }

    #[test]
    fn test_thread_sort_round_trip() {
        for sort in [
            ThreadSort::Newest,
            ThreadSort::Oldest,
            ThreadSort::MostLiked,
            ThreadSort::PriceAsc,
            ThreadSort::PriceDesc,
        ] {
            assert_eq!(ThreadSort::from_str(sort.as_str()), sort);
        }
        assert_eq!(ThreadSort::from_str("garbage"), ThreadSort::Newest);
    }

    #[test]
    fn test_tag_names_empty() {
        let view = sample_view(None);
        assert!(view.tag_names().is_empty());
        assert!(view.has_all_tags(&[]));
    }

    #[test]
    fn test_has_all_tags() {
        let view = sample_view(Some("zelda,n64".to_string()));
        assert!(view.has_all_tags(&["zelda".to_string()]));
        assert!(view.has_all_tags(&["N64".to_string(), "Zelda".to_string()]));
        assert!(!view.has_all_tags(&["snes".to_string()]));
    }

    fn sample_view(tags: Option<String>) -> ThreadView {
        ThreadView {
            id: 1,
            title: "title".to_string(),
            content: "content".to_string(),
            category_id: 1,
            category_name: "Marketplace".to_string(),
            user_id: 1,
            author_name: "user".to_string(),
            price: None,
            created_at: "2024-01-01 00:00:00".to_string(),
            like_count: 0,
            reply_count: 0,
            tags,
        }
    }
}
