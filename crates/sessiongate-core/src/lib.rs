//! Client-side authorization mediator.
//!
//! Reads the locally persisted session record, attaches its bearer credential
//! to outbound API requests and gates navigation to protected views.
//!
//! - `session`: the session record and its single validated read path
//! - `storage`: persisted key-value storage backends
//! - `api`: request authenticator and the HTTP client it is composed into
//! - `guard`: route requirements, the navigation guard and the router hook
//! - `config`: API and login settings
//!
//! This is a convenience gate for the client, not a security boundary; the
//! backend enforces authorization on its own.

pub mod api;
pub mod config;
pub mod guard;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ApiError, RequestAuthenticator};
pub use config::Config;
pub use guard::{Decision, Navigation, Role, RouteGuard, RouteRequirement, RouteTable, Router};
pub use session::{SessionAccessor, SessionRecord, SessionState, SESSION_KEY};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
