use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Response,
};
use sqlx::SqlitePool;

use crate::db as queries;
use crate::db::User;
use crate::error::AppError;

/// Current authenticated user (if any).
/// Use this extractor when authentication is optional.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = SqlitePool::from_ref(state);

        let token = parts
            .headers
            .get("cookie")
            .and_then(|h| h.to_str().ok())
            .and_then(|cookies| {
                cookies
                    .split(';')
                    .find_map(|cookie| cookie.trim().strip_prefix("session="))
            });

        let Some(token) = token else {
            return Ok(Self(None));
        };

        // A bad cookie never blocks the page; the visitor just renders as
        // anonymous.
        let session = match queries::get_session_by_token(&pool, token).await {
            Ok(Some(s)) => s,
            _ => return Ok(Self(None)),
        };

        let now = chrono::Utc::now().to_rfc3339();
        if session.expires_at < now {
            let _ = queries::delete_session(&pool, token).await;
            return Ok(Self(None));
        }

        let user = match queries::get_user_by_id(&pool, session.user_id).await {
            Ok(Some(u)) => u,
            _ => return Ok(Self(None)),
        };

        Ok(Self(Some(user)))
    }
}

/// Current authenticated user (required).
/// Rejects with a redirect to the login page when there is no session.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;

        match user {
            Some(u) => Ok(Self(u)),
            None => Err(axum::response::IntoResponse::into_response(
                AppError::Unauthenticated,
            )),
        }
    }
}
