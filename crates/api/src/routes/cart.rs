//! Cart route handlers.
//!
//! All handlers act on the authenticated caller's cart only. Line IDs owned
//! by someone else behave exactly like IDs that do not exist.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use shopdemo_core::{CartItemId, ProductId, Quantity};

use crate::db::{CartRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::{CartItem, MessageResponse};
use crate::state::AppState;

/// Add-to-cart payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Quantity,
}

/// Quantity update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: Quantity,
}

fn line_not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Cart item not found".to_string()),
        other => other.into(),
    }
}

/// The caller's cart.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiJson<Vec<CartItem>>> {
    let items = CartRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(ApiJson(items))
}

/// Add a product, or increment its existing line.
///
/// 201 with the new line, or 200 with the incremented line.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(req): ApiJson<AddToCartRequest>,
) -> Result<(StatusCode, ApiJson<CartItem>)> {
    let outcome = CartRepository::new(state.pool())
        .add(user.id, req.product_id, req.quantity)
        .await
        .map_err(|e| match e {
            RepositoryError::InvalidReference(_) => {
                AppError::NotFound("Product not found".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(
        cart_item_id = %outcome.item.id,
        quantity = outcome.item.quantity.get(),
        created = outcome.created,
        "Cart line saved"
    );

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, ApiJson(outcome.item)))
}

/// Set the quantity of one of the caller's lines.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<CartItemId>,
    ApiJson(req): ApiJson<UpdateQuantityRequest>,
) -> Result<ApiJson<CartItem>> {
    let item = CartRepository::new(state.pool())
        .update_quantity(id, user.id, req.quantity)
        .await
        .map_err(line_not_found)?;
    Ok(ApiJson(item))
}

/// Remove one of the caller's lines.
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<CartItemId>,
) -> Result<ApiJson<MessageResponse>> {
    CartRepository::new(state.pool())
        .remove(id, user.id)
        .await
        .map_err(line_not_found)?;
    Ok(ApiJson(MessageResponse::new("Item removed from cart")))
}
