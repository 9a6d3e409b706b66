//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span with `request_id` and `user_id` fields)
//! 3. Request ID (fills the span field, echoes the header)
//! 4. Security headers
//! 5. CORS
//! 6. Rate limiting on `/auth/login` and `/auth/register` only (governor)
//!
//! Authentication is not a layer; handlers opt in through the
//! [`RequireAuth`] and [`RequireAdmin`] extractors.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{BearerToken, RequireAdmin, RequireAuth};
pub use rate_limit::{auth_rate_limiter, json_rate_limit_rejection};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
