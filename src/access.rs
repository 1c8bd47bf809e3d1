//! Origin allow-list, enforced before any cache or upstream work.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    allowed: Arc<HashSet<String>>,
}

impl AccessGate {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: Arc::new(origins.into_iter().map(Into::into).collect()),
        }
    }

    /// Empty allow-list: every origin passes.
    pub fn is_open(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Requests without an `Origin` are not browser requests and always pass.
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.is_open() || self.allowed.contains(origin),
        }
    }
}

/// Reject disallowed origins with an empty 403 before routing.
pub async fn enforce_origin(State(gate): State<AccessGate>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .map(|v| v.to_str().unwrap_or_default());

    if gate.is_allowed(origin) {
        return next.run(request).await;
    }

    warn!(
        "Rejected {} {} from origin {:?}",
        request.method(),
        request.uri().path(),
        origin.unwrap_or_default()
    );
    StatusCode::FORBIDDEN.into_response()
}

/// CORS headers for allowed origins; disallowed ones never reach this layer.
pub fn cors_layer(gate: &AccessGate) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .max_age(Duration::from_secs(600));

    if gate.is_open() {
        info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        info!("CORS: allowing origins {:?}", gate.allowed);
        let gate = gate.clone();
        cors.allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| gate.is_allowed(Some(origin.to_str().unwrap_or_default())),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_policy() {
        let gate = AccessGate::new(["https://a.example"]);
        assert!(gate.is_allowed(Some("https://a.example")));
        assert!(!gate.is_allowed(Some("https://b.example")));
        assert!(!gate.is_allowed(Some("https://a.example/")));
        assert!(gate.is_allowed(None));
    }

    #[test]
    fn empty_list_is_open() {
        let gate = AccessGate::new(Vec::<String>::new());
        assert!(gate.is_open());
        assert!(gate.is_allowed(Some("https://anything.example")));
        assert!(gate.is_allowed(None));
    }
}
