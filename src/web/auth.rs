use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::{
    generate_session_token, hash_password, session_expiry, validate_password_strength,
    verify_password, MaybeUser, RequireUser,
};
use crate::db as queries;
use crate::web::{pages, AppState};

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    action: String,
    username: Option<String>,
    password: Option<String>,
}

/// GET /login - Show login form.
pub async fn login_page(MaybeUser(user): MaybeUser) -> Response {
    // If already logged in, redirect to the forum
    if user.is_some() {
        return Redirect::to("/forum").into_response();
    }

    Html(pages::render_login_page(None).into_string()).into_response()
}

/// POST /login - Handle login or registration.
pub async fn login_post(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let username = form
        .username
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let password = form.password.unwrap_or_default();

    if username.is_empty() {
        return login_error("Username is required");
    }
    if password.is_empty() {
        return login_error("Password is required");
    }

    match form.action.as_str() {
        "register" => handle_registration(state, &username, &password).await,
        "login" | "" => handle_login(state, &username, &password).await,
        _ => (StatusCode::BAD_REQUEST, "Invalid action").into_response(),
    }
}

fn login_error(message: &str) -> Response {
    Html(pages::render_login_page(Some(message)).into_string()).into_response()
}

/// Handle user registration.
async fn handle_registration(state: AppState, username: &str, password: &str) -> Response {
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
        || username.len() > 32
    {
        return login_error("Username may only contain letters, digits, and underscores");
    }

    if let Err(e) = validate_password_strength(password) {
        return login_error(&e.to_string());
    }

    match queries::get_user_by_username(state.db.pool(), username).await {
        Ok(Some(_)) => return login_error("That username is taken"),
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Database error during registration: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Registration failed").into_response();
        }
    }

    let password_hash = match hash_password(password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to hash password: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Registration failed").into_response();
        }
    };

    let user_id = match queries::create_user(state.db.pool(), username, &password_hash).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to create user: {e:#}");
            return login_error("Registration failed. Please try again.");
        }
    };

    tracing::info!(user_id, username, "New user registered");
    start_session(&state, user_id).await
}

/// Handle user login.
async fn handle_login(state: AppState, username: &str, password: &str) -> Response {
    let user = match queries::get_user_by_username(state.db.pool(), username).await {
        Ok(Some(u)) => u,
        Ok(None) => return login_error("Invalid username or password"),
        Err(e) => {
            tracing::error!("Database error during login: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response();
        }
    };

    let password_valid = match verify_password(password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::error!("Password verification error: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response();
        }
    };

    if !password_valid {
        return login_error("Invalid username or password");
    }

    start_session(&state, user.id).await
}

/// Create a session row and set the cookie.
async fn start_session(state: &AppState, user_id: i64) -> Response {
    let token = generate_session_token();
    let expires_at = session_expiry(state.config.session_ttl.as_secs());

    if let Err(e) = queries::create_session(state.db.pool(), user_id, &token, &expires_at).await {
        tracing::error!("Failed to create session: {e:#}");
        return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response();
    }

    let max_age = state.config.session_ttl.as_secs();
    let cookie = format!("session={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}");

    ([(header::SET_COOKIE, cookie)], Redirect::to("/forum")).into_response()
}

/// POST /logout - Log out user.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    RequireUser(_user): RequireUser,
) -> Response {
    let token = headers
        .get("cookie")
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find_map(|cookie| cookie.trim().strip_prefix("session="))
        });

    if let Some(token) = token {
        let _ = queries::delete_session(state.db.pool(), token).await;
    }

    // Clear session cookie
    let cookie = "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0";

    ([(header::SET_COOKIE, cookie)], Redirect::to("/login")).into_response()
}
