use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    api::order_objects::OrderQueryFilter,
    db_types::{Order, OrderLine, OrderNumber, OrderUpdate, DEFAULT_PAYMENT_METHOD},
    order_builder::{DraftLine, OrderDraft},
};

const ORDER_COLUMNS: &str = "id, order_number, buyer_name, phone, notes, sub_total, total_amount, payment_status, \
                             payment_method, gateway_token, gateway_order_id, paid_at, expires_at, created_at, \
                             updated_at";

const LINE_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, price, total_price, notes, created_at";

pub async fn order_number_exists(order_number: &OrderNumber, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_number = $1")
        .bind(order_number)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

/// Derives an order number from `now`. Should two orders land on the same microsecond, the later one is pushed forward
/// until its number is free. Call this inside the transaction that inserts the order.
pub async fn next_order_number(now: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<OrderNumber, sqlx::Error> {
    let mut ts = now;
    loop {
        let candidate = OrderNumber::from_timestamp(ts);
        if !order_number_exists(&candidate, &mut *conn).await? {
            return Ok(candidate);
        }
        trace!("🗃️ Order number {candidate} is taken");
        ts += Duration::microseconds(1);
    }
}

/// Inserts the order header for a priced draft and returns the new order's id. This is not atomic on its own. Call it
/// inside a transaction together with [`insert_lines`].
pub async fn insert_order(
    order_number: &OrderNumber,
    draft: &OrderDraft,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO orders (
                order_number,
                buyer_name,
                phone,
                notes,
                sub_total,
                total_amount,
                payment_status,
                payment_method,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8, $9)
            RETURNING id;
        "#,
    )
    .bind(order_number)
    .bind(draft.buyer_name())
    .bind(draft.phone())
    .bind(draft.notes())
    .bind(draft.sub_total())
    .bind(draft.total_amount())
    .bind(DEFAULT_PAYMENT_METHOD)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub async fn insert_lines(
    order_id: i64,
    lines: &[DraftLine],
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    for line in lines {
        sqlx::query(
            r#"
                INSERT INTO order_lines (
                    order_id,
                    product_id,
                    product_name,
                    quantity,
                    price,
                    total_price,
                    notes,
                    created_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
            "#,
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.quantity)
        .bind(line.price)
        .bind(line.total_price)
        .bind(&line.notes)
        .bind(now)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn fetch_order_by_number(
    order_number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(order_number).fetch_optional(&mut *conn).await?;
    with_lines(order, conn).await
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(id).fetch_optional(&mut *conn).await?;
    with_lines(order, conn).await
}

async fn with_lines(order: Option<Order>, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    match order {
        Some(mut order) => {
            order.lines = fetch_lines_for_order(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

/// Lines are returned in the order they were inserted, which matches the order of the original request.
pub async fn fetch_lines_for_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLine>, sqlx::Error> {
    let sql = format!("SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id = $1 ORDER BY id ASC");
    sqlx::query_as::<_, OrderLine>(&sql).bind(order_id).fetch_all(conn).await
}

/// Fetches orders according to the criteria in the `OrderQueryFilter`, newest first, with their lines.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {ORDER_COLUMNS} FROM orders "));
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(status) = query.payment_status {
        where_clause.push("payment_status = ");
        where_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(name) = query.buyer_name {
        where_clause.push("instr(lower(buyer_name), lower(");
        where_clause.push_bind_unseparated(name);
        where_clause.push_unseparated(")) > 0");
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let mut orders = builder.build_query_as::<Order>().fetch_all(&mut *conn).await?;
    trace!("🗃️ Result of search_orders: {}", orders.len());
    if orders.is_empty() {
        return Ok(orders);
    }

    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {LINE_COLUMNS} FROM order_lines WHERE order_id IN ("));
    let mut ids = builder.separated(", ");
    for order in &orders {
        ids.push_bind(order.id);
    }
    builder.push(") ORDER BY id ASC");
    let lines = builder.build_query_as::<OrderLine>().fetch_all(conn).await?;
    let mut by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for line in lines {
        by_order.entry(line.order_id).or_default().push(line);
    }
    for order in &mut orders {
        order.lines = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
}

/// Applies the set fields of `update` and bumps `updated_at`. Returns the number of rows changed, which is zero when the
/// order does not exist or no longer has the status `update` expects. `paid_at` is only written when it is empty.
pub async fn update_order(
    order_number: &OrderNumber,
    update: OrderUpdate,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE orders SET updated_at = ");
    builder.push_bind(now);
    if let Some(status) = update.payment_status {
        builder.push(", payment_status = ");
        builder.push_bind(status.to_string());
    }
    if let Some(method) = update.payment_method {
        builder.push(", payment_method = ");
        builder.push_bind(method);
    }
    if let Some(token) = update.gateway_token {
        builder.push(", gateway_token = ");
        builder.push_bind(token);
    }
    if let Some(gateway_order_id) = update.gateway_order_id {
        builder.push(", gateway_order_id = ");
        builder.push_bind(gateway_order_id);
    }
    if let Some(paid_at) = update.paid_at {
        builder.push(", paid_at = COALESCE(paid_at, ");
        builder.push_bind(paid_at);
        builder.push(")");
    }
    if let Some(expires_at) = update.expires_at {
        builder.push(", expires_at = ");
        builder.push_bind(expires_at);
    }
    builder.push(" WHERE order_number = ");
    builder.push_bind(order_number.as_str().to_string());
    if let Some(expected) = update.expected_status {
        builder.push(" AND payment_status = ");
        builder.push_bind(expected.to_string());
    }
    trace!("🗃️ Executing query: {}", builder.sql());
    let res = builder.build().execute(conn).await?;
    debug!("🗃️ Order {order_number} updated. {} rows affected", res.rows_affected());
    Ok(res.rows_affected())
}
