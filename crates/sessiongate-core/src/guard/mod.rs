//! Route authorization.
//!
//! Each view declares a `RouteRequirement`. Before every navigation the
//! `RouteGuard` decides, from one session snapshot, whether to proceed or to
//! redirect to the login view. `Router` resolves concrete paths against a
//! `RouteTable` and runs the guard.

pub mod decision;
pub mod requirement;
pub mod router;
pub mod routes;

pub use decision::{decide, Decision, RouteGuard};
pub use requirement::{Role, RouteRequirement};
pub use router::{Navigation, Router};
pub use routes::{normalize_path, RouteError, RouteMatch, RouteRecord, RouteTable};
