//! Live catalog tests.
//!
//! Run against a migrated, seeded database and a running API server:
//! `cargo test -p shopdemo-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use shopdemo_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, TestContext, cents};

fn products(page: &Value) -> &Vec<Value> {
    page["products"].as_array().unwrap()
}

async fn category_id(ctx: &TestContext, name: &str) -> i64 {
    let categories: Value = ctx
        .client
        .get(ctx.url("/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    categories
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == name)
        .and_then(|c| c["id"].as_i64())
        .unwrap()
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_default_listing_shape() {
    let ctx = TestContext::new();
    let page = ctx.products("").await;

    assert_eq!(page["pagination"]["page"], 1);
    assert_eq!(page["pagination"]["limit"], 12);
    let total = page["pagination"]["total"].as_i64().unwrap();
    assert!(total >= 10, "seed has ten products, got {total}");

    let first = products(&page).first().unwrap();
    assert!(first["category"]["name"].is_string());
    assert!(first["price"].is_number());
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_pagination_reports_page_count() {
    let ctx = TestContext::new();
    let page = ctx.products("page=2&limit=3").await;

    let pagination = &page["pagination"];
    let total = pagination["total"].as_i64().unwrap();
    assert_eq!(pagination["page"], 2);
    assert_eq!(pagination["limit"], 3);
    assert_eq!(pagination["pages"].as_i64().unwrap(), (total + 2) / 3);
    assert_eq!(products(&page).len(), 3);

    let first_page = ctx.products("page=1&limit=3").await;
    let first_ids: Vec<&Value> = products(&first_page).iter().map(|p| &p["id"]).collect();
    assert!(
        products(&page).iter().all(|p| !first_ids.contains(&&p["id"])),
        "pages must not overlap"
    );
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_page_past_the_end_is_empty() {
    let ctx = TestContext::new();
    let page = ctx.products("page=999&limit=100").await;
    assert!(products(&page).is_empty());
    assert!(page["pagination"]["total"].as_i64().unwrap() > 0);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_sort_by_price_ascending() {
    let ctx = TestContext::new();
    let page = ctx.products("sortBy=price&sortOrder=asc&limit=100").await;

    let prices: Vec<i64> = products(&page).iter().map(|p| cents(&p["price"])).collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]), "{prices:?}");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_sort_by_name_descending() {
    let ctx = TestContext::new();
    let page = ctx.products("sortBy=name&sortOrder=DESC&limit=100").await;

    let names: Vec<String> = products(&page)
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert!(names.len() > 1);
    assert_eq!(names.first().unwrap().as_str(), names.iter().max().unwrap());
}

// ============================================================================
// Filters
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_category_filter() {
    let ctx = TestContext::new();
    let page = ctx.products("category=Clothing&limit=100").await;

    assert!(!products(&page).is_empty());
    assert!(
        products(&page)
            .iter()
            .all(|p| p["category"]["name"] == "Clothing")
    );
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_unknown_category_is_empty_not_error() {
    let ctx = TestContext::new();
    let page = ctx.products("category=Furniture").await;
    assert!(products(&page).is_empty());
    assert_eq!(page["pagination"]["total"], 0);
    assert_eq!(page["pagination"]["pages"], 0);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_featured_filter() {
    let ctx = TestContext::new();
    let page = ctx.products("featured=true&limit=100").await;

    assert!(!products(&page).is_empty());
    assert!(products(&page).iter().all(|p| p["featured"] == true));
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_price_range_is_inclusive() {
    let ctx = TestContext::new();
    let page = ctx.products("minPrice=29.99&maxPrice=129.99&limit=100").await;

    let prices: Vec<i64> = products(&page).iter().map(|p| cents(&p["price"])).collect();
    assert!(prices.contains(&2_999), "lower bound included: {prices:?}");
    assert!(prices.contains(&12_999), "upper bound included: {prices:?}");
    assert!(prices.iter().all(|c| (2_999..=12_999).contains(c)));
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_search_is_case_insensitive() {
    let ctx = TestContext::new();
    let page = ctx.products("search=IPHONE").await;

    assert!(
        products(&page)
            .iter()
            .any(|p| p["name"] == "iPhone 15 Pro")
    );
}

// ============================================================================
// Detail & categories
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_product_detail_and_missing_product() {
    let ctx = TestContext::new();
    let page = ctx.products("limit=1").await;
    let id = products(&page).first().unwrap()["id"].as_i64().unwrap();

    let resp = ctx
        .client
        .get(ctx.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let product: Value = resp.json().await.unwrap();
    assert_eq!(product["id"], id);
    assert!(product["category"]["id"].is_number());

    let resp = ctx
        .client
        .get(ctx.url("/products/987654321"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_categories_with_counts() {
    let ctx = TestContext::new();
    let categories: Value = ctx
        .client
        .get(ctx.url("/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let categories = categories.as_array().unwrap();
    let names: Vec<&str> = categories
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    for seeded in ["Books", "Clothing", "Electronics"] {
        assert!(names.contains(&seeded), "{seeded} missing from {names:?}");
    }
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted, "categories are ordered by name");

    let electronics = categories
        .iter()
        .find(|c| c["name"] == "Electronics")
        .unwrap();
    let listed = ctx.products("category=Electronics&limit=100").await;
    assert_eq!(electronics["productCount"], listed["pagination"]["total"]);

    let resp = ctx
        .client
        .get(ctx.url("/categories/987654321"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Admin product management
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_admin_product_lifecycle() {
    let ctx = TestContext::new();
    let token = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let books = category_id(&ctx, "Books").await;
    let name = format!("Test Volume {}", uuid::Uuid::new_v4());

    let resp = ctx
        .client
        .post(ctx.url("/products"))
        .bearer_auth(&token)
        .json(&json!({
            "name": name,
            "description": "Created by the integration suite",
            "price": 12.5,
            "categoryId": books,
            "stock": 3,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert_eq!(cents(&created["price"]), 1_250);
    assert_eq!(created["featured"], false);
    assert_eq!(created["category"]["name"], "Books");

    let resp = ctx
        .client
        .put(ctx.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "price": 15, "featured": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(cents(&updated["price"]), 1_500);
    assert_eq!(updated["featured"], true);
    assert_eq!(updated["name"], name.as_str(), "unspecified fields are kept");
    assert_eq!(updated["stock"], 3);

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Product deleted successfully");

    let resp = ctx
        .client
        .get(ctx.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/products/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_create_product_with_unknown_category() {
    let ctx = TestContext::new();
    let token = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let resp = ctx
        .client
        .post(ctx.url("/products"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Orphan", "price": 1, "categoryId": 987_654_321 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Category not found");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_shopper_cannot_manage_products() {
    let ctx = TestContext::new();
    let token = ctx.register_shopper().await;

    let resp = ctx
        .client
        .post(ctx.url("/products"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Nope", "price": 1, "categoryId": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Admin access required");

    let resp = ctx
        .client
        .delete(ctx.url("/products/1"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
