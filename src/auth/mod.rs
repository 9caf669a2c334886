pub mod middleware;
pub mod password;
pub mod session;

pub use middleware::{MaybeUser, RequireUser};
pub use password::{hash_password, validate_password_strength, verify_password};
pub use session::{generate_session_token, session_expiry};
