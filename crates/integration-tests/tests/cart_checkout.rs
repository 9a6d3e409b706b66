//! Live cart, checkout, and order history tests.
//!
//! Every test registers its own shopper so carts never collide.
//! Run with `cargo test -p shopdemo-integration-tests -- --ignored`.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use shopdemo_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, TestContext, cents};

async fn seeded_product(ctx: &TestContext, search: &str) -> (i64, i64) {
    let page = ctx.products(&format!("search={search}")).await;
    let product = page["products"].as_array().unwrap().first().unwrap().clone();
    (product["id"].as_i64().unwrap(), cents(&product["price"]))
}

async fn add(ctx: &TestContext, token: &str, product_id: i64, quantity: i64) -> (StatusCode, Value) {
    let resp = ctx
        .client
        .post(ctx.url("/cart/add"))
        .bearer_auth(token)
        .json(&json!({ "productId": product_id, "quantity": quantity }))
        .send()
        .await
        .unwrap();
    (resp.status(), resp.json().await.unwrap())
}

async fn cart(ctx: &TestContext, token: &str) -> Vec<Value> {
    let resp = ctx
        .client
        .get(ctx.url("/cart"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json::<Value>().await.unwrap().as_array().unwrap().clone()
}

async fn checkout(ctx: &TestContext, token: &str) -> (StatusCode, Value) {
    let resp = ctx
        .client
        .post(ctx.url("/orders/checkout"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    (resp.status(), resp.json().await.unwrap())
}

async fn fetch_order(ctx: &TestContext, token: &str, order_id: i64) -> Value {
    ctx.client
        .get(ctx.url(&format!("/orders/{order_id}")))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_new_shopper_has_empty_cart() {
    let ctx = TestContext::new();
    let token = ctx.register_shopper().await;
    assert!(cart(&ctx, &token).await.is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_adding_same_product_twice_merges_lines() {
    let ctx = TestContext::new();
    let token = ctx.register_shopper().await;
    let (product_id, _) = seeded_product(&ctx, "Denim").await;

    let (status, first) = add(&ctx, &token, product_id, 2).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["quantity"], 2);
    assert_eq!(first["product"]["id"], product_id);

    let (status, second) = add(&ctx, &token, product_id, 3).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["quantity"], 5);

    let lines = cart(&ctx, &token).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines.first().unwrap()["quantity"], 5);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_add_defaults_to_one_and_validates() {
    let ctx = TestContext::new();
    let token = ctx.register_shopper().await;
    let (product_id, _) = seeded_product(&ctx, "Running").await;

    let resp = ctx
        .client
        .post(ctx.url("/cart/add"))
        .bearer_auth(&token)
        .json(&json!({ "productId": product_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let line: Value = resp.json().await.unwrap();
    assert_eq!(line["quantity"], 1);

    let (status, _) = add(&ctx, &token, product_id, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = add(&ctx, &token, 987_654_321, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_update_and_remove_line() {
    let ctx = TestContext::new();
    let token = ctx.register_shopper().await;
    let (product_id, _) = seeded_product(&ctx, "iPad").await;
    let (_, line) = add(&ctx, &token, product_id, 1).await;
    let line_id = line["id"].as_i64().unwrap();

    let resp = ctx
        .client
        .put(ctx.url(&format!("/cart/{line_id}")))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["quantity"], 4);

    let resp = ctx
        .client
        .put(ctx.url(&format!("/cart/{line_id}")))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/cart/{line_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Item removed from cart");
    assert!(cart(&ctx, &token).await.is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_cannot_touch_another_shoppers_line() {
    let ctx = TestContext::new();
    let owner = ctx.register_shopper().await;
    let intruder = ctx.register_shopper().await;
    let (product_id, _) = seeded_product(&ctx, "Sony").await;
    let (_, line) = add(&ctx, &owner, product_id, 1).await;
    let line_id = line["id"].as_i64().unwrap();

    let resp = ctx
        .client
        .put(ctx.url(&format!("/cart/{line_id}")))
        .bearer_auth(&intruder)
        .json(&json!({ "quantity": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Cart item not found");

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/cart/{line_id}")))
        .bearer_auth(&intruder)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let lines = cart(&ctx, &owner).await;
    assert_eq!(lines.first().unwrap()["quantity"], 1, "owner's line untouched");
}

// ============================================================================
// Checkout & orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_checkout_empty_cart() {
    let ctx = TestContext::new();
    let token = ctx.register_shopper().await;

    let (status, body) = checkout(&ctx, &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cart is empty");

    let resp = ctx
        .client
        .get(ctx.url("/orders"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let orders: Value = resp.json().await.unwrap();
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_checkout_totals_cart_and_clears_it() {
    let ctx = TestContext::new();
    let token = ctx.register_shopper().await;
    let (shirt, shirt_cents) = seeded_product(&ctx, "T-Shirt").await;
    let (jacket, jacket_cents) = seeded_product(&ctx, "Denim").await;
    add(&ctx, &token, shirt, 3).await;
    add(&ctx, &token, jacket, 1).await;

    let (status, order) = checkout(&ctx, &token).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cents(&order["total"]), shirt_cents * 3 + jacket_cents);

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let line_sum: i64 = items
        .iter()
        .map(|i| cents(&i["price"]) * i["quantity"].as_i64().unwrap())
        .sum();
    assert_eq!(line_sum, cents(&order["total"]));

    assert!(cart(&ctx, &token).await.is_empty());

    let (status, _) = checkout(&ctx, &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "second checkout has nothing to buy");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_order_history_is_newest_first_and_private() {
    let ctx = TestContext::new();
    let token = ctx.register_shopper().await;
    let (product_id, _) = seeded_product(&ctx, "Shoes").await;

    add(&ctx, &token, product_id, 1).await;
    let (_, older) = checkout(&ctx, &token).await;
    add(&ctx, &token, product_id, 2).await;
    let (_, newer) = checkout(&ctx, &token).await;

    let resp = ctx
        .client
        .get(ctx.url("/orders"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let orders: Value = resp.json().await.unwrap();
    let ids: Vec<&Value> = orders.as_array().unwrap().iter().map(|o| &o["id"]).collect();
    assert_eq!(ids, vec![&newer["id"], &older["id"]]);

    let order_id = newer["id"].as_i64().unwrap();
    let resp = ctx
        .client
        .get(ctx.url(&format!("/orders/{order_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let stranger = ctx.register_shopper().await;
    let resp = ctx
        .client
        .get(ctx.url(&format!("/orders/{order_id}")))
        .bearer_auth(&stranger)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Order not found");
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_order_keeps_price_paid() {
    let ctx = TestContext::new();
    let admin = ctx.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let shopper = ctx.register_shopper().await;

    let categories: Value = ctx
        .client
        .get(ctx.url("/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let category_id = categories.as_array().unwrap().first().unwrap()["id"].clone();

    let resp = ctx
        .client
        .post(ctx.url("/products"))
        .bearer_auth(&admin)
        .json(&json!({
            "name": format!("Snapshot {}", uuid::Uuid::new_v4()),
            "price": 20,
            "categoryId": category_id,
            "stock": 5,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let product: Value = resp.json().await.unwrap();
    let product_id = product["id"].as_i64().unwrap();

    add(&ctx, &shopper, product_id, 2).await;
    let (_, order) = checkout(&ctx, &shopper).await;
    let order_id = order["id"].as_i64().unwrap();

    let resp = ctx
        .client
        .put(ctx.url(&format!("/products/{product_id}")))
        .bearer_auth(&admin)
        .json(&json!({ "price": 35 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let order = fetch_order(&ctx, &shopper, order_id).await;
    let item = order["items"].as_array().unwrap().first().unwrap().clone();
    assert_eq!(cents(&order["total"]), 4_000);
    assert_eq!(cents(&item["price"]), 2_000);
    assert_eq!(cents(&item["product"]["price"]), 3_500);

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/products/{product_id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let order = fetch_order(&ctx, &shopper, order_id).await;
    let item = order["items"].as_array().unwrap().first().unwrap().clone();
    assert!(item["product"].is_null(), "deleted product detaches from history");
    assert_eq!(item["productName"], product["name"]);
    assert_eq!(cents(&item["price"]), 2_000);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_lines_added_during_checkout_are_never_lost() {
    let ctx = TestContext::new();
    let page = ctx.products("limit=5&sortBy=name&sortOrder=asc").await;
    let ids: Vec<i64> = page["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    let (first, late) = ids.split_first().unwrap();
    assert_eq!(late.len(), 4, "seed has at least five products");

    for round in 0..4 {
        let token = ctx.register_shopper().await;
        add(&ctx, &token, *first, 1).await;

        let (placed, a, b, c, d) = tokio::join!(
            checkout(&ctx, &token),
            add(&ctx, &token, late[0], 1),
            add(&ctx, &token, late[1], 1),
            add(&ctx, &token, late[2], 1),
            add(&ctx, &token, late[3], 1),
        );
        for (status, _) in [&a, &b, &c, &d] {
            assert!(status.is_success(), "round {round}: add returned {status}");
        }
        let (status, order) = placed;
        assert_eq!(status, StatusCode::CREATED, "round {round}");

        let ordered: Vec<i64> = order["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["productId"].as_i64().unwrap())
            .collect();
        let in_cart: Vec<i64> = cart(&ctx, &token)
            .await
            .iter()
            .map(|l| l["product"]["id"].as_i64().unwrap())
            .collect();

        assert!(ordered.contains(first), "round {round}: locked line is ordered");
        for id in &ids {
            let placements = usize::from(ordered.contains(id)) + usize::from(in_cart.contains(id));
            assert_eq!(
                placements, 1,
                "round {round}: product {id} ordered={ordered:?} cart={in_cart:?}"
            );
        }
    }
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_logout_revokes_token() {
    let ctx = TestContext::new();
    let token = ctx.register_shopper().await;

    let resp = ctx
        .client
        .get(ctx.url("/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = resp.json().await.unwrap();
    assert_eq!(me["role"], "USER");
    assert!(me.get("passwordHash").is_none());

    let resp = ctx
        .client
        .post(ctx.url("/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .get(ctx.url("/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and seeded database"]
async fn test_duplicate_registration_conflicts() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .post(ctx.url("/auth/register"))
        .json(&json!({ "email": "User@Test.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}
