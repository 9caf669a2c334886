//! Maud-based page templates for the web UI.
//!
//! Each page module exports a render function that produces the complete HTML.

pub mod auth;
pub mod blog;
pub mod forum;
pub mod profile;
pub mod thread;

pub use auth::render_login_page;
pub use blog::{render_blog_index, render_blog_post};
pub use forum::{render_category_page, render_forum_index, CategoryPageParams};
pub use profile::render_profile_page;
pub use thread::{
    render_new_thread_page, render_thread_page, NewThreadPageParams, ThreadPageParams,
};
