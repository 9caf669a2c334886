use std::collections::HashSet;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::models::{
    BookmarkToggle, Category, LikeToggle, NewThread, ReplyView, Session, Tag, ThreadFilter,
    ThreadView, User,
};
use crate::error::AppError;

/// Maximum number of results returned by tag autocomplete.
const TAG_SEARCH_LIMIT: i64 = 5;

// ========== Categories ==========

/// List all categories in display order (forum index page).
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>> {
    sqlx::query_as("SELECT * FROM categories ORDER BY display_order ASC, id ASC")
        .fetch_all(pool)
        .await
        .context("Failed to fetch categories")
}

/// Resolve a URL slug to a category.
///
/// The slug is de-hyphenated and matched case-insensitively against the
/// stored name. Zero matches or an ambiguous match both yield `None`.
pub async fn get_category_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Category>> {
    let name = slug.replace('-', " ");

    let matches: Vec<Category> = sqlx::query_as("SELECT * FROM categories WHERE lower(name) = lower(?)")
        .bind(&name)
        .fetch_all(pool)
        .await
        .context("Failed to fetch category by slug")?;

    match matches.len() {
        1 => Ok(matches.into_iter().next()),
        _ => Ok(None),
    }
}

/// Get a category by id.
pub async fn get_category(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch category")
}

// ========== Threads ==========

/// List threads in a category with conjunctive filters and a total-order
/// sort.
///
/// The title filter and the sort run in SQL; the tag-superset filter runs
/// over the comma-joined tag column after the fetch, which keeps the view
/// query simple and the filter semantics explicit.
pub async fn list_threads(
    pool: &SqlitePool,
    category_id: i64,
    filter: &ThreadFilter,
) -> Result<Vec<ThreadView>> {
    let mut sql = String::from("SELECT * FROM threads_with_details WHERE category_id = ?");
    if filter.title_search.is_some() {
        sql.push_str(" AND lower(title) LIKE '%' || lower(?) || '%'");
    }
    sql.push(' ');
    sql.push_str(filter.sort.order_clause());

    let mut query = sqlx::query_as(&sql).bind(category_id);
    if let Some(search) = &filter.title_search {
        query = query.bind(search);
    }

    let threads: Vec<ThreadView> = query
        .fetch_all(pool)
        .await
        .context("Failed to fetch threads")?;

    if filter.tags.is_empty() {
        return Ok(threads);
    }

    Ok(threads
        .into_iter()
        .filter(|t| t.has_all_tags(&filter.tags))
        .collect())
}

/// Get a single thread from the aggregate view.
pub async fn get_thread(pool: &SqlitePool, thread_id: i64) -> Result<Option<ThreadView>> {
    sqlx::query_as("SELECT * FROM threads_with_details WHERE id = ?")
        .bind(thread_id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch thread")
}

/// Create a thread, linking any known tags, in a single transaction.
///
/// Marketplace rules are enforced here before any write: at least one
/// non-blank tag and a positive price. Tag names are trimmed, lower-cased,
/// and deduplicated; names with no existing tag row are silently dropped.
pub async fn create_thread(pool: &SqlitePool, new_thread: &NewThread) -> Result<i64, AppError> {
    if new_thread.title.trim().is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if new_thread.content.trim().is_empty() {
        return Err(AppError::validation("Content is required"));
    }

    let category = get_category(pool, new_thread.category_id)
        .await?
        .ok_or(AppError::NotFound("category"))?;

    let tag_names = parse_tag_names(new_thread.tags_csv.as_deref().unwrap_or(""));

    let price = if category.is_marketplace() {
        if tag_names.is_empty() {
            return Err(AppError::validation(
                "Marketplace posts require at least one tag",
            ));
        }
        match new_thread.price {
            Some(p) if p > 0.0 => Some(p),
            _ => {
                return Err(AppError::validation("Marketplace posts require a price"));
            }
        }
    } else {
        // Price is meaningful only in the Marketplace.
        None
    };

    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin thread transaction")?;

    let result = sqlx::query(
        r"
        INSERT INTO threads (title, content, category_id, user_id, price)
        VALUES (?, ?, ?, ?, ?)
        ",
    )
    .bind(new_thread.title.trim())
    .bind(new_thread.content.trim())
    .bind(new_thread.category_id)
    .bind(new_thread.user_id)
    .bind(price)
    .execute(&mut *tx)
    .await
    .context("Failed to insert thread")?;

    let thread_id = result.last_insert_rowid();

    for name in &tag_names {
        let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to look up tag")?;

        // Unknown tag names are dropped, not created: tag curation is out of
        // band and user typos must not pollute the tag table.
        let Some(tag) = tag else { continue };

        sqlx::query("INSERT OR IGNORE INTO thread_tags (thread_id, tag_id) VALUES (?, ?)")
            .bind(thread_id)
            .bind(tag.id)
            .execute(&mut *tx)
            .await
            .context("Failed to link tag")?;
    }

    tx.commit()
        .await
        .context("Failed to commit thread transaction")?;

    Ok(thread_id)
}

/// Parse a comma-separated tag string into a deduplicated, lower-cased list
/// of candidate names, preserving first-seen order.
#[must_use]
pub fn parse_tag_names(csv: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    csv.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

// ========== Replies ==========

/// List replies for a thread, oldest first.
pub async fn list_replies(pool: &SqlitePool, thread_id: i64) -> Result<Vec<ReplyView>> {
    sqlx::query_as(
        "SELECT * FROM replies_with_author WHERE thread_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(thread_id)
    .fetch_all(pool)
    .await
    .context("Failed to fetch replies")
}

/// Create a reply on a thread.
pub async fn create_reply(
    pool: &SqlitePool,
    thread_id: i64,
    user_id: i64,
    content: &str,
) -> Result<i64, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::validation("Reply content is required"));
    }

    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM threads WHERE id = ?")
        .bind(thread_id)
        .fetch_optional(pool)
        .await
        .context("Failed to check thread")?;

    if exists.is_none() {
        return Err(AppError::NotFound("thread"));
    }

    let result = sqlx::query("INSERT INTO replies (thread_id, user_id, content) VALUES (?, ?, ?)")
        .bind(thread_id)
        .bind(user_id)
        .bind(content.trim())
        .execute(pool)
        .await
        .context("Failed to insert reply")?;

    Ok(result.last_insert_rowid())
}

// ========== Tags ==========

/// List every tag (tag filter and tag input UIs).
pub async fn list_tags(pool: &SqlitePool) -> Result<Vec<Tag>> {
    sqlx::query_as("SELECT * FROM tags ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .context("Failed to fetch tags")
}

/// Case-insensitive substring search over tag names, capped at 5 results.
/// An empty query returns an empty list without touching the database.
/// `%` and `_` in the query match literally, not as LIKE wildcards.
pub async fn search_tags(pool: &SqlitePool, query: &str) -> Result<Vec<Tag>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    sqlx::query_as(
        "SELECT * FROM tags WHERE name LIKE '%' || lower(?) || '%' ESCAPE '\\'
         ORDER BY name ASC LIMIT ?",
    )
    .bind(escaped)
    .bind(TAG_SEARCH_LIMIT)
    .fetch_all(pool)
    .await
    .context("Failed to search tags")
}

// ========== Likes & Bookmarks ==========

/// Toggle a like for (thread, user).
///
/// One atomic delete-if-exists, then one insert-if-absent guarded by the
/// UNIQUE(thread_id, user_id) constraint. No read-before-write, so two
/// near-simultaneous toggles cannot leave more than one row behind.
pub async fn toggle_like(
    pool: &SqlitePool,
    thread_id: i64,
    user_id: i64,
) -> Result<LikeToggle, AppError> {
    let deleted = sqlx::query("DELETE FROM likes WHERE thread_id = ? AND user_id = ?")
        .bind(thread_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to delete like")?
        .rows_affected();

    let liked = if deleted == 0 {
        let inserted =
            sqlx::query("INSERT OR IGNORE INTO likes (thread_id, user_id) VALUES (?, ?)")
                .bind(thread_id)
                .bind(user_id)
                .execute(pool)
                .await
                .context("Failed to insert like")?
                .rows_affected();
        inserted > 0
    } else {
        false
    };

    let like_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE thread_id = ?")
        .bind(thread_id)
        .fetch_one(pool)
        .await
        .context("Failed to count likes")?;

    Ok(LikeToggle {
        liked,
        like_count: like_count.0,
    })
}

/// Toggle a bookmark for (thread, user). Same discipline as `toggle_like`.
pub async fn toggle_bookmark(
    pool: &SqlitePool,
    thread_id: i64,
    user_id: i64,
) -> Result<BookmarkToggle, AppError> {
    let deleted = sqlx::query("DELETE FROM bookmarks WHERE thread_id = ? AND user_id = ?")
        .bind(thread_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to delete bookmark")?
        .rows_affected();

    let bookmarked = if deleted == 0 {
        let inserted =
            sqlx::query("INSERT OR IGNORE INTO bookmarks (thread_id, user_id) VALUES (?, ?)")
                .bind(thread_id)
                .bind(user_id)
                .execute(pool)
                .await
                .context("Failed to insert bookmark")?
                .rows_affected();
        inserted > 0
    } else {
        false
    };

    Ok(BookmarkToggle { bookmarked })
}

/// Thread ids the user has liked, for listing personalization.
pub async fn user_liked_thread_ids(pool: &SqlitePool, user_id: i64) -> Result<HashSet<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT thread_id FROM likes WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch user likes")?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Thread ids the user has bookmarked.
pub async fn user_bookmarked_thread_ids(pool: &SqlitePool, user_id: i64) -> Result<HashSet<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT thread_id FROM bookmarks WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("Failed to fetch user bookmarks")?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Full thread views for a user's bookmarks, most recently bookmarked first
/// (profile page).
pub async fn list_bookmarked_threads(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ThreadView>> {
    sqlx::query_as(
        r"
        SELECT tv.*
        FROM bookmarks b
        JOIN threads_with_details tv ON tv.id = b.thread_id
        WHERE b.user_id = ?
        ORDER BY b.created_at DESC, b.id DESC
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to fetch bookmarked threads")
}

// ========== Users & Sessions ==========

/// Insert a new user, returning its ID.
pub async fn create_user(pool: &SqlitePool, username: &str, password_hash: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
        .bind(username)
        .bind(password_hash)
        .execute(pool)
        .await
        .context("Failed to insert user")?;

    Ok(result.last_insert_rowid())
}

/// Get a user by username (case-insensitive).
pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE lower(username) = lower(?)")
        .bind(username)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user by username")
}

/// Get a user by id.
pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch user")
}

/// Insert a new session row.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    token: &str,
    expires_at: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO sessions (user_id, token, expires_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await
        .context("Failed to insert session")?;

    Ok(result.last_insert_rowid())
}

/// Get a session by its token.
pub async fn get_session_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    sqlx::query_as("SELECT * FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch session")
}

/// Delete a session (logout, or expiry cleanup).
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await
        .context("Failed to delete session")?;

    Ok(())
}
