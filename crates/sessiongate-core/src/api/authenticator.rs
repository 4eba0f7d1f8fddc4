//! Attaches the session's bearer credential to outbound requests.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Request;
use tracing::{debug, warn};

use crate::session::{SessionAccessor, SessionState};

/// Build the `Authorization` value for a session, if it carries a usable token.
pub fn authorization_value(session: &SessionState) -> Option<HeaderValue> {
    let token = session.bearer_token()?;
    match HeaderValue::from_str(&format!("Bearer {}", token)) {
        Ok(mut value) => {
            value.set_sensitive(true);
            Some(value)
        }
        Err(_) => {
            warn!("Session token is not a valid header value, sending request without it");
            None
        }
    }
}

/// Set `Authorization: Bearer <token>` on `headers` when the session has a
/// token. Returns whether the header was set; otherwise `headers` is untouched.
pub fn authorize_headers(headers: &mut HeaderMap, session: &SessionState) -> bool {
    match authorization_value(session) {
        Some(value) => {
            headers.insert(AUTHORIZATION, value);
            true
        }
        None => false,
    }
}

/// Best-effort request decorator. Safe to run on every request, including
/// unauthenticated ones such as login and register: it never fails and never
/// blocks a request, it only adds a header when a token is available.
#[derive(Debug, Clone)]
pub struct RequestAuthenticator {
    session: SessionAccessor,
}

impl RequestAuthenticator {
    pub fn new(session: SessionAccessor) -> Self {
        Self { session }
    }

    pub fn augment_headers(&self, headers: &mut HeaderMap) {
        let session = self.session.read();
        if authorize_headers(headers, &session) {
            debug!("Attached bearer credential");
        }
    }

    pub fn augment(&self, mut request: Request) -> Request {
        let session = self.session.read();
        if authorize_headers(request.headers_mut(), &session) {
            debug!(method = %request.method(), url = %request.url(), "Attached bearer credential");
        }
        request
    }
}
