//! Catalog fixtures. The order flow never writes products, so tests put them in place directly.
use deck_common::Rupiah;

use crate::{db_types::CategoryType, SqliteDatabase};

pub async fn insert_product(
    db: &SqliteDatabase,
    name: &str,
    category: CategoryType,
    price: i64,
    is_available: bool,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO products (name, category, description, price, is_available) VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(name)
    .bind(category.as_str())
    .bind(format!("A serving of {name}"))
    .bind(Rupiah::from(price))
    .bind(is_available)
    .fetch_one(db.pool())
    .await
    .expect("Error inserting product")
}

pub async fn set_product_price(db: &SqliteDatabase, id: i64, price: i64) {
    sqlx::query("UPDATE products SET price = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(Rupiah::from(price))
        .bind(id)
        .execute(db.pool())
        .await
        .expect("Error updating product price");
}

pub async fn set_product_availability(db: &SqliteDatabase, id: i64, is_available: bool) {
    sqlx::query("UPDATE products SET is_available = $1 WHERE id = $2")
        .bind(is_available)
        .bind(id)
        .execute(db.pool())
        .await
        .expect("Error updating product availability");
}

/// Counts the rows in `table`. Only for use with fixed table names.
pub async fn count_rows(db: &SqliteDatabase, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db.pool())
        .await
        .expect("Error counting rows")
}

/// The standard menu used by the flow tests: two available dishes and one sold-out dessert.
pub async fn seed_menu(db: &SqliteDatabase) -> (i64, i64, i64) {
    let nasi = insert_product(db, "Nasi Goreng", CategoryType::MainCourse, 50_000, true).await;
    let tea = insert_product(db, "Es Teh", CategoryType::Snacks, 8_000, true).await;
    let cake = insert_product(db, "Lapis Legit", CategoryType::Desserts, 35_000, false).await;
    (nasi, tea, cake)
}
