//! Seed the database with the demo catalog and accounts.
//!
//! Idempotent: categories are matched by name, products by name within their
//! category, and users by email. Re-running only fills in what is missing.
//!
//! Accounts created:
//! - `admin@ecommerce.com` / `admin123` (admin)
//! - `user@test.com` / `user123`

use std::collections::HashMap;

use shopdemo_api::db::{CategoryRepository, ProductRepository};
use shopdemo_api::models::ProductInput;
use shopdemo_api::services::{AuthError, AuthService, Registration};
use shopdemo_core::{CategoryId, Money, Role};

use super::{CommandError, connect};

struct SeedCategory {
    name: &'static str,
    description: &'static str,
    image_url: &'static str,
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    category: &'static str,
    image_url: &'static str,
    stock: i32,
    featured: bool,
}

struct SeedUser {
    email: &'static str,
    password: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    role: Role,
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        name: "Electronics",
        description: "Electronic devices and gadgets",
        image_url: "https://images.unsplash.com/photo-1498049794561-7780e7231661?w=400",
    },
    SeedCategory {
        name: "Clothing",
        description: "Fashion and apparel",
        image_url: "https://images.unsplash.com/photo-1441986300917-64674bd600d8?w=400",
    },
    SeedCategory {
        name: "Books",
        description: "Books and literature",
        image_url: "https://images.unsplash.com/photo-1481627834876-b7833e8f5570?w=400",
    },
];

const USERS: &[SeedUser] = &[
    SeedUser {
        email: "admin@ecommerce.com",
        password: "admin123",
        first_name: "Admin",
        last_name: "User",
        role: Role::Admin,
    },
    SeedUser {
        email: "user@test.com",
        password: "user123",
        first_name: "Test",
        last_name: "User",
        role: Role::User,
    },
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "MacBook Pro 16\"",
        description: "Apple MacBook Pro 16-inch with M3 Pro chip, 18GB RAM, 512GB SSD",
        price_cents: 249_900,
        category: "Electronics",
        image_url: "https://images.unsplash.com/photo-1517336714731-489689fd1ca8?w=400",
        stock: 15,
        featured: true,
    },
    SeedProduct {
        name: "iPhone 15 Pro",
        description: "Latest iPhone with titanium design and USB-C",
        price_cents: 99_900,
        category: "Electronics",
        image_url: "https://images.unsplash.com/photo-1592750475338-74b7b21085ab?w=400",
        stock: 25,
        featured: true,
    },
    SeedProduct {
        name: "Sony WH-1000XM5",
        description: "Premium noise-canceling wireless headphones",
        price_cents: 39_999,
        category: "Electronics",
        image_url: "https://images.unsplash.com/photo-1583394838336-acd977736f90?w=400",
        stock: 30,
        featured: false,
    },
    SeedProduct {
        name: "iPad Air",
        description: "Powerful, colorful, and versatile iPad Air with M2 chip",
        price_cents: 59_900,
        category: "Electronics",
        image_url: "https://images.unsplash.com/photo-1544244015-0df4b3ffc6b0?w=400",
        stock: 20,
        featured: true,
    },
    SeedProduct {
        name: "Premium Cotton T-Shirt",
        description: "Comfortable, high-quality cotton t-shirt in multiple colors",
        price_cents: 2_999,
        category: "Clothing",
        image_url: "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=400",
        stock: 50,
        featured: false,
    },
    SeedProduct {
        name: "Denim Jacket",
        description: "Classic blue denim jacket, perfect for layering",
        price_cents: 8_999,
        category: "Clothing",
        image_url: "https://images.unsplash.com/photo-1544966503-7cc5ac882d5c?w=400",
        stock: 25,
        featured: true,
    },
    SeedProduct {
        name: "Running Shoes",
        description: "Lightweight running shoes with excellent cushioning",
        price_cents: 12_999,
        category: "Clothing",
        image_url: "https://images.unsplash.com/photo-1542291026-7eec264c27ff?w=400",
        stock: 35,
        featured: false,
    },
    SeedProduct {
        name: "The Art of Clean Code",
        description: "A handbook of agile software craftsmanship",
        price_cents: 3_999,
        category: "Books",
        image_url: "https://images.unsplash.com/photo-1532012197267-da84d127e765?w=400",
        stock: 100,
        featured: true,
    },
    SeedProduct {
        name: "JavaScript: The Good Parts",
        description: "Essential reading for JavaScript developers",
        price_cents: 2_999,
        category: "Books",
        image_url: "https://images.unsplash.com/photo-1544716278-ca5e3f4abd8c?w=400",
        stock: 75,
        featured: false,
    },
    SeedProduct {
        name: "Design Patterns",
        description: "Elements of Reusable Object-Oriented Software",
        price_cents: 4_999,
        category: "Books",
        image_url: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=400",
        stock: 40,
        featured: false,
    },
];

/// Seed categories, users, and products.
///
/// # Errors
///
/// Returns an error if configuration is missing or a database operation fails.
pub async fn run() -> Result<(), CommandError> {
    let (config, pool) = connect().await?;

    let categories = CategoryRepository::new(&pool);
    let mut category_ids: HashMap<&str, CategoryId> = HashMap::new();
    for category in CATEGORIES {
        let id = categories
            .ensure(
                category.name,
                Some(category.description),
                Some(category.image_url),
            )
            .await?;
        category_ids.insert(category.name, id);
    }
    tracing::info!(count = category_ids.len(), "Categories ready");

    let auth = AuthService::new(&pool, config.token_ttl);
    for user in USERS {
        let created = auth
            .create_user(Registration {
                email: user.email,
                password: user.password,
                first_name: user.first_name,
                last_name: user.last_name,
                role: user.role,
            })
            .await;
        match created {
            Ok(u) => tracing::info!(email = %u.email, role = %u.role, "User created"),
            Err(AuthError::UserAlreadyExists) => {
                tracing::info!(email = user.email, "User already exists, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let products = ProductRepository::new(&pool);
    let mut inserted = 0_usize;
    for product in PRODUCTS {
        let Some(&category_id) = category_ids.get(product.category) else {
            tracing::warn!(
                product = product.name,
                category = product.category,
                "Unknown seed category, skipping"
            );
            continue;
        };
        let input = ProductInput {
            name: product.name.to_string(),
            description: product.description.to_string(),
            price: Money::from_cents(product.price_cents),
            category_id,
            image_url: Some(product.image_url.to_string()),
            stock: product.stock,
            featured: product.featured,
        };
        if products.insert_if_missing(&input).await? {
            inserted += 1;
        }
    }
    pool.close().await;

    tracing::info!(
        inserted,
        skipped = PRODUCTS.len() - inserted,
        "Database seeded successfully!"
    );
    tracing::info!("Admin login: admin@ecommerce.com / admin123");
    tracing::info!("Test user login: user@test.com / user123");
    Ok(())
}
