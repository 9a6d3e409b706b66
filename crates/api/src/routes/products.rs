//! Product route handlers.

use axum::{extract::State, http::StatusCode};
use tracing::instrument;

use shopdemo_core::ProductId;

use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::{
    MessageResponse, Product, ProductFilter, ProductInput, ProductPage, ProductPatch,
    ProductQueryParams,
};
use crate::state::AppState;

fn not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
        other => other.into(),
    }
}

/// Filtered, sorted, paginated product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProductQueryParams>,
) -> Result<ApiJson<ProductPage>> {
    // Rejects bad input before any query runs
    let filter = ProductFilter::try_from(params)?;
    let page = ProductRepository::new(state.pool()).search(&filter).await?;
    Ok(ApiJson(page))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<ApiJson<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(ApiJson)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Create a product.
#[instrument(skip(state, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, ApiJson<Product>)> {
    input.validate().map_err(AppError::BadRequest)?;

    let product = ProductRepository::new(state.pool()).create(&input).await?;

    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, ApiJson(product)))
}

/// Partially update a product.
#[instrument(skip(state, patch), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<ApiJson<Product>> {
    patch.validate().map_err(AppError::BadRequest)?;

    let product = ProductRepository::new(state.pool())
        .update(id, &patch)
        .await
        .map_err(not_found)?;

    tracing::info!("Product updated");
    Ok(ApiJson(product))
}

/// Delete a product.
#[instrument(skip(state), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<ApiJson<MessageResponse>> {
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(not_found)?;

    tracing::info!("Product deleted");
    Ok(ApiJson(MessageResponse::new("Product deleted successfully")))
}
