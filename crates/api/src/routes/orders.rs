//! Order route handlers.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use shopdemo_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::CheckoutService;
use crate::state::AppState;

/// The caller's orders, newest first.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiJson<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(ApiJson(orders))
}

/// One of the caller's orders.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<ApiJson<Order>> {
    OrderRepository::new(state.pool())
        .get_for_user(id, user.id)
        .await?
        .map(ApiJson)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// Turn the caller's cart into an order.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, ApiJson<Order>)> {
    let order = CheckoutService::new(state.pool()).checkout(user.id).await?;
    Ok((StatusCode::CREATED, ApiJson(order)))
}
