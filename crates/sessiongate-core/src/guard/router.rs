//! Pre-navigation hook tying the route table to the guard.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{Decision, RouteGuard, RouteTable};
use crate::config::Config;
use crate::session::SessionAccessor;

/// Maximum number of static redirects followed for one navigation
const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Render the view at `path` (after any static redirects).
    Proceed {
        path: String,
        view: Option<String>,
        params: BTreeMap<String, String>,
    },
    /// Go to `to` instead; the guard's only negative outcome.
    Redirect { to: String },
}

impl Navigation {
    pub fn target(&self) -> &str {
        match self {
            Navigation::Proceed { path, .. } => path,
            Navigation::Redirect { to } => to,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
    guard: RouteGuard,
}

impl Router {
    pub fn new(table: RouteTable, guard: RouteGuard) -> Self {
        Self { table, guard }
    }

    /// Router over `table` guarded by the session in `session`, redirecting to
    /// the configured login path.
    pub fn with_config(table: RouteTable, session: SessionAccessor, config: &Config) -> Self {
        Self::new(table, RouteGuard::new(session, config.login_path.clone()))
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Run one navigation attempt, including the initial one. Static
    /// redirects are followed first, then the guard decides once against a
    /// single session snapshot.
    pub fn navigate(&self, path: &str) -> Navigation {
        let mut resolved = self.table.resolve(path);
        let mut hops = 0;
        while let Some(to) = resolved.redirect.take() {
            hops += 1;
            if hops > MAX_REDIRECTS {
                warn!(path, "Too many route redirects, sending to login");
                return Navigation::Redirect {
                    to: self.guard.login_path().to_string(),
                };
            }
            debug!(from = %resolved.path, to = %to, "Following route redirect");
            resolved = self.table.resolve(&to);
        }

        match self.guard.check(&resolved.requirement) {
            Decision::Allow => Navigation::Proceed {
                path: resolved.path,
                view: resolved.view,
                params: resolved.params,
            },
            Decision::RedirectTo(to) => Navigation::Redirect { to },
        }
    }
}
