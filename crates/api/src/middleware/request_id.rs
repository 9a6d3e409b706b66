//! Request ID middleware for request tracing and correlation.
//!
//! Uses the incoming `x-request-id` header when an upstream proxy supplied a
//! sane one, otherwise generates a UUID v4. The ID is recorded in the tracing
//! span, tagged on the Sentry scope, and echoed in the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID accepted as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Pick the request ID for a request.
fn resolve_request_id(incoming: Option<&str>) -> String {
    incoming
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.chars().all(|c| c.is_ascii_graphic())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok()),
    );

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_upstream_id() {
        assert_eq!(resolve_request_id(Some("cf-1234")), "cf-1234");
    }

    #[test]
    fn test_generates_when_missing_or_unusable() {
        let long = "x".repeat(200);
        for incoming in [None, Some(""), Some("has space"), Some(long.as_str())] {
            let id = resolve_request_id(incoming);
            assert!(Uuid::parse_str(&id).is_ok(), "{incoming:?} -> {id}");
        }
    }
}
