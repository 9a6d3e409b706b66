//! Category route handlers.

use axum::extract::State;
use tracing::instrument;

use shopdemo_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::models::CategoryWithCount;
use crate::state::AppState;

/// All categories with product counts.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<ApiJson<Vec<CategoryWithCount>>> {
    let categories = CategoryRepository::new(state.pool()).list_with_counts().await?;
    Ok(ApiJson(categories))
}

/// One category.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CategoryId>,
) -> Result<ApiJson<CategoryWithCount>> {
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .map(ApiJson)
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
}
