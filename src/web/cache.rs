//! In-memory render cache for anonymous forum pages.
//!
//! Rendered HTML for signed-out visitors is identical across requests, so
//! those pages are cached whole and dropped when the data they show changes.
//! Each write path reports what changed as an [`Entity`], and the cache maps
//! that entity to the exact set of pages it can appear on. Per-user pages
//! (profile, personalized listings) never enter the cache.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Entries older than this are refreshed even without an invalidation, as a
/// backstop against a missed dependency.
const MAX_AGE: Duration = Duration::from_secs(300);

/// Hard cap on stored pages. Listing keys include caller-supplied query
/// strings, so the key space is unbounded without one.
const MAX_ENTRIES: usize = 256;

/// A data change that cached pages may depend on.
#[derive(Debug, Clone)]
pub enum Entity {
    /// A thread was created in the category with this slug.
    Thread { category_slug: String },
    /// A reply was added to a thread.
    Reply { thread_id: i64, category_slug: String },
    /// A like toggle changed a thread's like count.
    Like { thread_id: i64, category_slug: String },
}

impl Entity {
    /// Page paths this change invalidates.
    ///
    /// A path covers its exact key and every query-string variant of it
    /// (listing pages are keyed by path plus query string), and nothing
    /// else. `/forum` does not cover `/forum/threads/1`.
    fn dependent_paths(&self) -> Vec<String> {
        match self {
            Self::Thread { category_slug } => vec![
                "/forum".to_string(),
                format!("/forum/{category_slug}"),
            ],
            Self::Reply {
                thread_id,
                category_slug,
            }
            | Self::Like {
                thread_id,
                category_slug,
            } => vec![
                // Listings show reply and like counts.
                format!("/forum/{category_slug}"),
                format!("/forum/threads/{thread_id}"),
            ],
        }
    }
}

#[derive(Debug, Clone)]
struct CachedPage {
    html: String,
    cached_at: Instant,
}

/// Whole-page cache for anonymous GET responses.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: RwLock<HashMap<String, CachedPage>>,
}

impl PageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached page if present and fresh.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let pages = self.pages.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        pages
            .get(key)
            .filter(|page| page.cached_at.elapsed() < MAX_AGE)
            .map(|page| page.html.clone())
    }

    /// Store a rendered page. Expired entries are swept on every store, and
    /// once the cap is reached new keys are skipped until something is
    /// invalidated or expires.
    pub fn put(&self, key: &str, html: String) {
        let mut pages = self
            .pages
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        pages.retain(|_, page| page.cached_at.elapsed() < MAX_AGE);
        if pages.len() >= MAX_ENTRIES && !pages.contains_key(key) {
            return;
        }
        pages.insert(
            key.to_string(),
            CachedPage {
                html,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drop every cached page the changed entity can appear on. A key
    /// matches a dependent path when it is the path itself or the path
    /// plus a query string.
    pub fn invalidate(&self, entity: &Entity) {
        let paths = entity.dependent_paths();
        let mut pages = self
            .pages
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        pages.retain(|key, _| {
            !paths.iter().any(|path| {
                key == path
                    || key
                        .strip_prefix(path.as_str())
                        .is_some_and(|rest| rest.starts_with('?'))
            })
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let cache = PageCache::new();
        cache.put("/forum", "<html>index</html>".to_string());
        assert_eq!(cache.get("/forum").as_deref(), Some("<html>index</html>"));
        assert!(cache.get("/forum/marketplace").is_none());
    }

    #[test]
    fn test_new_thread_invalidates_index_and_category() {
        let cache = PageCache::new();
        cache.put("/forum", "index".to_string());
        cache.put("/forum/marketplace?sort=newest", "listing".to_string());
        cache.put("/forum/threads/1", "thread".to_string());
        cache.put("/forum/game-reviews", "other".to_string());

        cache.invalidate(&Entity::Thread {
            category_slug: "marketplace".to_string(),
        });

        assert!(cache.get("/forum").is_none());
        assert!(cache.get("/forum/marketplace?sort=newest").is_none());
        assert!(cache.get("/forum/threads/1").is_some());
        assert!(cache.get("/forum/game-reviews").is_some());
    }

    #[test]
    fn test_thread_id_sharing_a_digit_prefix_survives() {
        let cache = PageCache::new();
        cache.put("/forum/threads/1", "thread".to_string());
        cache.put("/forum/threads/10", "other thread".to_string());

        cache.invalidate(&Entity::Like {
            thread_id: 1,
            category_slug: "general-discussion".to_string(),
        });

        assert!(cache.get("/forum/threads/1").is_none());
        assert!(cache.get("/forum/threads/10").is_some());
    }

    #[test]
    fn test_entry_cap_holds_under_unbounded_query_keys() {
        let cache = PageCache::new();
        for n in 0..MAX_ENTRIES {
            cache.put(&format!("/forum/marketplace?search={n}"), "page".to_string());
        }
        cache.put("/forum/marketplace?search=overflow", "page".to_string());

        assert!(cache.get("/forum/marketplace?search=overflow").is_none());
        assert!(cache.get("/forum/marketplace?search=0").is_some());
    }

    #[test]
    fn test_expired_entries_are_swept_on_put() {
        let cache = PageCache::new();
        {
            let mut pages = cache.pages.write().unwrap();
            pages.insert(
                "/forum".to_string(),
                CachedPage {
                    html: "stale".to_string(),
                    cached_at: Instant::now().checked_sub(MAX_AGE * 2).unwrap(),
                },
            );
        }

        cache.put("/forum/marketplace", "fresh".to_string());

        let pages = cache.pages.read().unwrap();
        assert!(!pages.contains_key("/forum"));
        assert!(pages.contains_key("/forum/marketplace"));
    }

    #[test]
    fn test_reply_invalidates_thread_and_listing_but_not_other_categories() {
        let cache = PageCache::new();
        cache.put("/forum/threads/1", "thread".to_string());
        cache.put("/forum/general-discussion", "listing".to_string());
        cache.put("/forum/game-reviews", "other".to_string());

        cache.invalidate(&Entity::Reply {
            thread_id: 1,
            category_slug: "general-discussion".to_string(),
        });

        assert!(cache.get("/forum/threads/1").is_none());
        assert!(cache.get("/forum/general-discussion").is_none());
        assert!(cache.get("/forum/game-reviews").is_some());
    }
}
