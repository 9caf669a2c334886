//! Maud HTML template components for the web UI.
//!
//! Components are organized into submodules by functionality:
//!
//! - `layout`: Base page layout and navigation
//! - `alert`: Alert messages
//! - `card`: Thread cards, tag badges, and empty states
//! - `form`: Form elements and input components
//! - `timeago`: Human-friendly timestamp formatting

pub mod alert;
pub mod card;
pub mod form;
pub mod layout;
pub mod timeago;

pub use alert::{Alert, AlertVariant};
pub use card::{EmptyState, TagBadge, ThreadCard};
pub use form::{Form, FormGroup, Input, Label, Select, SelectOption, TextArea};
pub use layout::BaseLayout;
pub use timeago::format_timestamp;

/// Re-export maud for convenience
pub use maud::{html, Markup, PreEscaped, DOCTYPE};
