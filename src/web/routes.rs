use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json};
use serde::Deserialize;

use super::auth;
use super::cache::Entity;
use super::pages;
use super::AppState;
use crate::auth::{MaybeUser, RequireUser};
use crate::db::{self, slugify, NewThread, ThreadFilter, ThreadSort};
use crate::error::AppError;

/// Create the router with all routes.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(home))
        .route("/forum", get(forum_index))
        .route("/forum/new-thread", get(new_thread_page))
        .route("/forum/threads", post(create_thread))
        .route("/forum/threads/:id", get(thread_page))
        .route("/forum/threads/:id/replies", post(create_reply))
        .route("/forum/threads/:id/like", post(toggle_like))
        .route("/forum/threads/:id/bookmark", post(toggle_bookmark))
        .route("/forum/:category_slug", get(category_page))
        .route("/api/tags/search", get(api_tag_search))
        .route("/blog", get(blog_index))
        .route("/blog/:slug", get(blog_post))
        .route("/profile", get(profile))
        .route("/login", get(auth::login_page).post(auth::login_post))
        .route("/logout", post(auth::logout))
        .route("/healthz", get(health))
        .route("/favicon.ico", get(favicon))
}

// ========== Forum ==========

async fn home() -> Redirect {
    Redirect::to("/forum")
}

async fn forum_index(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> Response {
    let cache_key = "/forum";
    if user.is_none() {
        if let Some(html) = state.cache.get(cache_key) {
            return Html(html).into_response();
        }
    }

    let categories = match db::list_categories(state.db.pool()).await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let html = pages::render_forum_index(&categories, user.as_ref()).into_string();
    if user.is_none() {
        state.cache.put(cache_key, html.clone());
    }
    Html(html).into_response()
}

#[derive(Debug, Deserialize)]
struct ListParams {
    /// Comma-separated tag names; threads must carry all of them.
    tags: Option<String>,
    search: Option<String>,
    sort: Option<String>,
}

async fn category_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(category_slug): Path<String>,
    Query(params): Query<ListParams>,
) -> Response {
    let filter = ThreadFilter {
        tags: db::parse_tag_names(params.tags.as_deref().unwrap_or("")),
        title_search: params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        sort: ThreadSort::from_str(params.sort.as_deref().unwrap_or("")),
    };

    // Filtered and sorted variants cache under distinct keys sharing the
    // category prefix.
    let cache_key = format!(
        "/forum/{category_slug}?tags={}&search={}&sort={}",
        filter.tags.join(","),
        filter.title_search.as_deref().unwrap_or(""),
        filter.sort.as_str()
    );
    if user.is_none() {
        if let Some(html) = state.cache.get(&cache_key) {
            return Html(html).into_response();
        }
    }

    let category = match db::get_category_by_slug(state.db.pool(), &category_slug).await {
        Ok(Some(c)) => c,
        Ok(None) => return (StatusCode::NOT_FOUND, "Category not found").into_response(),
        Err(e) => {
            tracing::error!("Failed to resolve category: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let threads = match db::list_threads(state.db.pool(), category.id, &filter).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to fetch threads: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let all_tags = db::list_tags(state.db.pool()).await.unwrap_or_default();

    let (liked, bookmarked) = viewer_engagement(&state, user.as_ref().map(|u| u.id)).await;

    let html = pages::render_category_page(&pages::CategoryPageParams {
        category: &category,
        threads: &threads,
        filter: &filter,
        all_tags: &all_tags,
        user: user.as_ref(),
        liked: &liked,
        bookmarked: &bookmarked,
    })
    .into_string();

    if user.is_none() {
        state.cache.put(&cache_key, html.clone());
    }
    Html(html).into_response()
}

async fn thread_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<i64>,
) -> Response {
    let cache_key = format!("/forum/threads/{id}");
    if user.is_none() {
        if let Some(html) = state.cache.get(&cache_key) {
            return Html(html).into_response();
        }
    }

    let thread = match db::get_thread(state.db.pool(), id).await {
        Ok(Some(t)) => t,
        Ok(None) => return (StatusCode::NOT_FOUND, "Thread not found").into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch thread: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let replies = match db::list_replies(state.db.pool(), id).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch replies: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let (liked, bookmarked) = viewer_engagement(&state, user.as_ref().map(|u| u.id)).await;

    let html = pages::render_thread_page(&pages::ThreadPageParams {
        thread: &thread,
        replies: &replies,
        user: user.as_ref(),
        liked: liked.contains(&id),
        bookmarked: bookmarked.contains(&id),
    })
    .into_string();

    if user.is_none() {
        state.cache.put(&cache_key, html.clone());
    }
    Html(html).into_response()
}

#[derive(Debug, Deserialize)]
struct NewThreadQuery {
    /// Category slug to preselect.
    category: Option<String>,
}

async fn new_thread_page(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<NewThreadQuery>,
) -> Response {
    let categories = match db::list_categories(state.db.pool()).await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let selected_id = params
        .category
        .as_deref()
        .and_then(|slug| categories.iter().find(|c| c.slug() == slug))
        .map(|c| c.id);

    let html = pages::render_new_thread_page(&pages::NewThreadPageParams {
        categories: &categories,
        selected_category_id: selected_id,
        user: &user,
        error: None,
        draft: None,
    });
    Html(html.into_string()).into_response()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewThreadForm {
    pub title: String,
    pub content: String,
    pub category_id: i64,
    /// Raw price text; empty means no price.
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub tags: String,
}

async fn create_thread(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<NewThreadForm>,
) -> Response {
    let price = match parse_price(&form.price) {
        Ok(p) => p,
        Err(e) => return new_thread_error(&state, &user, &form, &e.to_string()).await,
    };

    let new_thread = NewThread {
        title: form.title.clone(),
        content: form.content.clone(),
        category_id: form.category_id,
        user_id: user.id,
        price,
        tags_csv: Some(form.tags.clone()),
    };

    match db::create_thread(state.db.pool(), &new_thread).await {
        Ok(_) => {
            let category = db::get_category(state.db.pool(), form.category_id)
                .await
                .ok()
                .flatten();
            if let Some(category) = &category {
                state.cache.invalidate(&Entity::Thread {
                    category_slug: category.slug(),
                });
            }
            // Back to the listing the new thread appears on.
            let target =
                category.map_or_else(|| "/forum".to_string(), |c| format!("/forum/{}", c.slug()));
            Redirect::to(&target).into_response()
        }
        Err(AppError::Validation(message)) => {
            new_thread_error(&state, &user, &form, &message).await
        }
        Err(e) => e.into_response(),
    }
}

/// Re-render the new-thread form with an error, preserving the draft.
async fn new_thread_error(
    state: &AppState,
    user: &crate::db::User,
    form: &NewThreadForm,
    message: &str,
) -> Response {
    let categories = db::list_categories(state.db.pool()).await.unwrap_or_default();

    let html = pages::render_new_thread_page(&pages::NewThreadPageParams {
        categories: &categories,
        selected_category_id: Some(form.category_id),
        user,
        error: Some(message),
        draft: Some(form),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Html(html.into_string())).into_response()
}

fn parse_price(raw: &str) -> Result<Option<f64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| AppError::validation("Price must be a number"))
}

#[derive(Debug, Deserialize)]
struct ReplyForm {
    content: String,
}

async fn create_reply(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
    Form(form): Form<ReplyForm>,
) -> Response {
    match db::create_reply(state.db.pool(), id, user.id, &form.content).await {
        Ok(_) => {
            if let Ok(Some(thread)) = db::get_thread(state.db.pool(), id).await {
                state.cache.invalidate(&Entity::Reply {
                    thread_id: id,
                    category_slug: slugify(&thread.category_name),
                });
            }
            Redirect::to(&format!("/forum/threads/{id}")).into_response()
        }
        Err(e) => e.into_response(),
    }
}

// ========== Engagement ==========

async fn toggle_like(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Response {
    let thread = match db::get_thread(state.db.pool(), id).await {
        Ok(Some(t)) => t,
        Ok(None) => return AppError::NotFound("thread").into_response(),
        Err(e) => return AppError::from(e).into_response(),
    };

    match db::toggle_like(state.db.pool(), id, user.id).await {
        Ok(toggle) => {
            state.cache.invalidate(&Entity::Like {
                thread_id: id,
                category_slug: slugify(&thread.category_name),
            });
            Json(toggle).into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn toggle_bookmark(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i64>,
) -> Response {
    let exists = match db::get_thread(state.db.pool(), id).await {
        Ok(t) => t.is_some(),
        Err(e) => return AppError::from(e).into_response(),
    };
    if !exists {
        return AppError::NotFound("thread").into_response();
    }

    // Bookmarks are private; no anonymous page shows them, so nothing in the
    // render cache depends on this change.
    match db::toggle_bookmark(state.db.pool(), id, user.id).await {
        Ok(toggle) => Json(toggle).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Engagement sets for the signed-in viewer, empty for anonymous visitors.
async fn viewer_engagement(
    state: &AppState,
    user_id: Option<i64>,
) -> (std::collections::HashSet<i64>, std::collections::HashSet<i64>) {
    let Some(user_id) = user_id else {
        return (Default::default(), Default::default());
    };

    let liked = db::user_liked_thread_ids(state.db.pool(), user_id)
        .await
        .unwrap_or_default();
    let bookmarked = db::user_bookmarked_thread_ids(state.db.pool(), user_id)
        .await
        .unwrap_or_default();
    (liked, bookmarked)
}

// ========== Tags ==========

#[derive(Debug, Deserialize)]
struct TagSearchParams {
    q: Option<String>,
}

async fn api_tag_search(
    State(state): State<AppState>,
    Query(params): Query<TagSearchParams>,
) -> Response {
    match db::search_tags(state.db.pool(), params.q.as_deref().unwrap_or("")).await {
        Ok(tags) => Json(tags).into_response(),
        Err(e) => {
            tracing::error!("Tag search failed: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Search error").into_response()
        }
    }
}

// ========== Blog ==========

#[derive(Debug, Deserialize)]
struct BlogParams {
    query: Option<String>,
}

async fn blog_index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<BlogParams>,
) -> Response {
    let query = params.query.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let (posts, degraded) = match &state.cms {
        Some(cms) => match cms.list_posts(query).await {
            Ok(posts) => (posts, false),
            Err(e) => {
                // The forum must stay usable when the CMS is down.
                tracing::warn!("CMS unavailable, rendering empty blog: {e:#}");
                (Vec::new(), true)
            }
        },
        None => (Vec::new(), false),
    };

    let html = pages::render_blog_index(&posts, query, degraded, user.as_ref());
    Html(html.into_string()).into_response()
}

async fn blog_post(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(slug): Path<String>,
) -> Response {
    let Some(cms) = &state.cms else {
        return (StatusCode::NOT_FOUND, "Post not found").into_response();
    };

    match cms.get_post_by_slug(&slug).await {
        Ok(Some(post)) => {
            Html(pages::render_blog_post(&post, user.as_ref()).into_string()).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "Post not found").into_response(),
        Err(e) => {
            tracing::warn!("CMS unavailable for post {slug}: {e:#}");
            let html = pages::render_blog_index(&[], None, true, user.as_ref());
            Html(html.into_string()).into_response()
        }
    }
}

// ========== Profile ==========

async fn profile(State(state): State<AppState>, RequireUser(user): RequireUser) -> Response {
    let bookmarks = match db::list_bookmarked_threads(state.db.pool(), user.id).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!("Failed to fetch bookmarks: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error").into_response();
        }
    };

    let liked = db::user_liked_thread_ids(state.db.pool(), user.id)
        .await
        .unwrap_or_default();

    let html = pages::render_profile_page(&user, &bookmarks, &liked);
    Html(html.into_string()).into_response()
}

// ========== Misc ==========

async fn health() -> &'static str {
    "OK"
}

async fn favicon() -> Response {
    // Return a simple SVG favicon (joystick emoji)
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><text y=".9em" font-size="90">🕹️</text></svg>"#;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/svg+xml")],
        svg,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("").unwrap(), None);
        assert_eq!(parse_price("  ").unwrap(), None);
        assert_eq!(parse_price("49.99").unwrap(), Some(49.99));
        assert!(parse_price("free").is_err());
    }
}
