use log::trace;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{api::catalog_objects::ProductQueryFilter, db_types::Product};

const PRODUCT_COLUMNS: &str = "id, name, category, description, image, price, is_available, created_at, updated_at";

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(conn).await
}

/// Returns the product only if it is currently available for ordering.
pub async fn fetch_available_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND is_available = 1");
    sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(conn).await
}

pub async fn search_products(
    query: ProductQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products "));
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(category) = query.category {
        where_clause.push("category = ");
        where_clause.push_bind_unseparated(category.as_str());
    }
    if let Some(name) = query.name {
        where_clause.push("instr(lower(name), lower(");
        where_clause.push_bind_unseparated(name);
        where_clause.push_unseparated(")) > 0");
    }
    if let Some(available) = query.available {
        where_clause.push("is_available = ");
        where_clause.push_bind_unseparated(available);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    trace!("🗃️ Executing query: {}", builder.sql());
    builder.build_query_as::<Product>().fetch_all(conn).await
}
