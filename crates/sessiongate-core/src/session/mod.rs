//! Session record model and the accessor that reads it.
//!
//! The session record is written by the login flow under a fixed storage key
//! and is only ever read here. `SessionAccessor::read` turns whatever is in
//! storage into `SessionState::Absent` or a validated `SessionRecord`.

pub mod accessor;
pub mod record;

pub use accessor::SessionAccessor;
pub use record::{MalformedRecord, SessionRecord, SessionState, SessionUser, UserId};

/// Storage key the session record lives under
pub const SESSION_KEY: &str = "qm_auth";
