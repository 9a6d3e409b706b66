//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness
//! GET    /health/ready         - Readiness (database ping)
//!
//! # Auth (register and login are rate limited)
//! POST   /auth/register        - Create account, returns token
//! POST   /auth/login           - Exchange credentials for a token
//! POST   /auth/logout          - Revoke the presented token
//! GET    /auth/me              - Current profile
//!
//! # Catalog
//! GET    /categories           - Categories with product counts
//! GET    /categories/{id}      - One category
//! GET    /products             - Filtered, sorted, paginated listing
//! GET    /products/{id}        - Product detail
//! POST   /products             - Create (admin)
//! PUT    /products/{id}        - Partial update (admin)
//! DELETE /products/{id}        - Delete (admin)
//!
//! # Cart (requires auth)
//! GET    /cart                 - Caller's cart
//! POST   /cart/add             - Add or increment a line
//! PUT    /cart/{id}            - Set a line's quantity
//! DELETE /cart/{id}            - Remove a line
//!
//! # Orders (requires auth)
//! GET    /orders               - Caller's orders, newest first
//! GET    /orders/{id}          - One of the caller's orders
//! POST   /orders/checkout      - Convert the cart into an order
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::config::{ApiConfig, AuthRateLimit};
use crate::middleware::{auth_rate_limiter, json_rate_limit_rejection};
use crate::state::AppState;

/// Create the auth routes router.
///
/// Only the credential routes sit behind the rate limiter.
pub fn auth_routes(limit: AuthRateLimit) -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter(limit))
        .layer(axum::middleware::map_response(json_rate_limit_rejection));

    Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .merge(credentials)
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/{id}", get(categories::show))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/{id}", put(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/checkout", post(orders::checkout))
        .route("/{id}", get(orders::show))
}

/// Create the health routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::live))
        .route("/ready", get(health::ready))
}

/// Create all routes for the API.
pub fn routes(config: &ApiConfig) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes(config.auth_rate_limit))
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
}
