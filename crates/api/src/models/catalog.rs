//! Catalog domain types and product listing filters.
//!
//! `GET /products` arrives as loosely typed query strings. They are parsed
//! once into a [`ProductFilter`] here; the repository only ever sees
//! validated values, and sort columns only ever come from [`SortField`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopdemo_core::{CategoryId, Money, ProductId};

/// A product category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// A category together with the number of products filed under it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

/// A catalog product joined with its category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category_id: CategoryId,
    pub image_url: Option<String>,
    pub stock: i32,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: Category,
}

/// Payload for creating a product (admin).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub category_id: CategoryId,
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub featured: bool,
}

/// Payload for a partial product update (admin). Absent fields are unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub category_id: Option<CategoryId>,
    pub image_url: Option<String>,
    pub stock: Option<i32>,
    pub featured: Option<bool>,
}

impl ProductInput {
    /// Check field-level constraints the database would otherwise reject.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_stock(self.stock)
    }
}

impl ProductPatch {
    /// Check the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Product name is required".to_string());
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<(), String> {
    if stock < 0 {
        return Err("Stock cannot be negative".to_string());
    }
    Ok(())
}

// =============================================================================
// Listing Filters
// =============================================================================

/// Default number of products per page.
pub const DEFAULT_LIMIT: u32 = 12;

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Raw `GET /products` query parameters, exactly as the client sent them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQueryParams {
    pub category: Option<String>,
    pub featured: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Rejection reasons for listing parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("{0} must be a positive integer")]
    InvalidInteger(&'static str),
    #[error("limit must be between 1 and 100")]
    LimitOutOfRange,
    #[error("{0} must be a non-negative number")]
    InvalidPrice(&'static str),
    #[error("minPrice cannot exceed maxPrice")]
    InvertedPriceRange,
    #[error("unsupported sortBy value: {0}")]
    UnknownSortField(String),
    #[error("sortOrder must be 'asc' or 'desc'")]
    UnknownSortOrder,
}

/// Columns a product listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
    Price,
    Stock,
}

impl SortField {
    /// Parse the client-facing (camelCase) field name.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnknownSortField` for anything off the allow-list.
    pub fn parse(s: &str) -> Result<Self, FilterError> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "stock" => Ok(Self::Stock),
            other => Err(FilterError::UnknownSortField(other.to_owned())),
        }
    }

    /// The SQL column this field orders by.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "p.created_at",
            Self::UpdatedAt => "p.updated_at",
            Self::Name => "p.name",
            Self::Price => "p.price",
            Self::Stock => "p.stock",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse `asc` / `desc` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnknownSortOrder` for any other value.
    pub fn parse(s: &str) -> Result<Self, FilterError> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(FilterError::UnknownSortOrder),
        }
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Validated product listing filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category name.
    pub category: Option<String>,
    /// Only featured products when `true`.
    pub featured_only: bool,
    /// Case-insensitive substring over name or description.
    pub search: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Money>,
    /// Inclusive upper price bound.
    pub max_price: Option<Money>,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: None,
            featured_only: false,
            search: None,
            min_price: None,
            max_price: None,
            page: 1,
            limit: DEFAULT_LIMIT,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl ProductFilter {
    /// Rows to skip for the requested page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }

    /// The search term as an `ILIKE` pattern with wildcards escaped.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|term| {
            let mut escaped = String::with_capacity(term.len() + 2);
            escaped.push('%');
            for c in term.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    escaped.push('\\');
                }
                escaped.push(c);
            }
            escaped.push('%');
            escaped
        })
    }
}

impl TryFrom<ProductQueryParams> for ProductFilter {
    type Error = FilterError;

    fn try_from(params: ProductQueryParams) -> Result<Self, Self::Error> {
        let page = parse_positive(params.page.as_deref(), "page")?.unwrap_or(1);
        let limit = parse_positive(params.limit.as_deref(), "limit")?.unwrap_or(DEFAULT_LIMIT);
        if limit > MAX_LIMIT {
            return Err(FilterError::LimitOutOfRange);
        }

        let min_price = parse_price(params.min_price.as_deref(), "minPrice")?;
        let max_price = parse_price(params.max_price.as_deref(), "maxPrice")?;
        if let (Some(min), Some(max)) = (min_price, max_price)
            && min > max
        {
            return Err(FilterError::InvertedPriceRange);
        }

        let sort_by = non_empty(params.sort_by)
            .map(|s| SortField::parse(&s))
            .transpose()?
            .unwrap_or_default();
        let sort_order = non_empty(params.sort_order)
            .map(|s| SortOrder::parse(&s))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            category: non_empty(params.category),
            featured_only: params.featured.as_deref() == Some("true"),
            search: non_empty(params.search),
            min_price,
            max_price,
            page,
            limit,
            sort_by,
            sort_order,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn parse_positive(value: Option<&str>, name: &'static str) -> Result<Option<u32>, FilterError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .map(Some)
            .ok_or(FilterError::InvalidInteger(name)),
    }
}

fn parse_price(value: Option<&str>, name: &'static str) -> Result<Option<Money>, FilterError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => Money::parse(raw)
            .map(Some)
            .map_err(|_| FilterError::InvalidPrice(name)),
    }
}

// =============================================================================
// Paging
// =============================================================================

/// Paging metadata returned alongside a product page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub pages: i64,
}

impl Pagination {
    /// Compute paging metadata; `pages` is `ceil(total / limit)`.
    #[must_use]
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let per_page = i64::from(limit.max(1));
        let total = total.max(0);
        Self {
            total,
            page,
            limit,
            pages: (total + per_page - 1) / per_page,
        }
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}
