use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Generate a cryptographically secure random session token.
pub fn generate_session_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// RFC 3339 expiry timestamp for a session created now.
#[must_use]
pub fn session_expiry(ttl_secs: u64) -> String {
    let ttl = Duration::from_std(std::time::Duration::from_secs(ttl_secs))
        .unwrap_or_else(|_| Duration::days(365));
    (Utc::now() + ttl).to_rfc3339()
}
