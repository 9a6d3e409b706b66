//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only login and registration are limited; they are the ones worth brute-forcing.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header::RETRY_AFTER};
use axum::response::{IntoResponse, Response};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::AuthRateLimit;
use crate::error::AppError;

/// Key extractor that prefers proxy headers and falls back to the peer address.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // X-Forwarded-For (first IP in the chain)
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Direct connection (requires into_make_service_with_connect_info)
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the limiter for the credential endpoints.
///
/// Each client IP may send `burst` requests back to back, then earns one more
/// every `period_secs` seconds.
///
/// # Panics
///
/// Panics if `burst` or `period_secs` is zero. `ApiConfig` rejects both.
#[must_use]
pub fn auth_rate_limiter(limit: AuthRateLimit) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(limit.period_secs)
        .burst_size(limit.burst)
        .finish()
        .expect("rate limiter config with non-zero burst and period is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Re-render limiter rejections in the API's JSON error shape.
///
/// Keeps the `Retry-After` header the limiter computed.
pub async fn json_rate_limit_rejection(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let retry_after = response.headers().get(RETRY_AFTER).cloned();
    let mut rejection = AppError::RateLimited.into_response();
    if let Some(value) = retry_after {
        rejection.headers_mut().insert(RETRY_AFTER, value);
    }
    rejection
}
