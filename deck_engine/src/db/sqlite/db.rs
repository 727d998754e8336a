use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::{migrate, SqlitePool};

use super::{begin_write_transaction, db_url, new_pool, notifications, orders, products};
use crate::{
    api::{
        catalog_objects::ProductQueryFilter,
        errors::{CatalogError, NotificationError, OrderFlowError},
        order_objects::OrderQueryFilter,
    },
    db_types::{NewNotification, NewOrder, Notification, Order, OrderNumber, OrderUpdate, Product},
    order_builder::OrderDraft,
    traits::{CatalogManagement, NotificationManagement, OrderManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from `DECK_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Created new connection pool for {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        order.validate()?;
        let mut tx = begin_write_transaction(&self.pool).await?;
        let mut draft = OrderDraft::new(&order);
        for item in &order.items {
            let product = products::fetch_available_product(item.product_id, &mut tx)
                .await?
                .ok_or(OrderFlowError::ProductUnavailable(item.product_id))?;
            draft.add_line(&product, item)?;
        }
        let now = Utc::now();
        let order_number = orders::next_order_number(now, &mut tx).await?;
        let id = orders::insert_order(&order_number, &draft, now, &mut tx).await?;
        orders::insert_lines(id, draft.lines(), now, &mut tx).await?;
        let order = orders::fetch_order_by_id(id, &mut tx)
            .await?
            .ok_or_else(|| OrderFlowError::DatabaseError(format!("Order {order_number} vanished before commit")))?;
        tx.commit().await?;
        debug!(
            "🗃️ Order {order_number} has been saved in the DB with id {id}. {} lines, total {}",
            order.lines.len(),
            order.total_amount
        );
        Ok(order)
    }

    async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(order_number, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }

    async fn update_order(
        &self,
        order_number: &OrderNumber,
        update: OrderUpdate,
    ) -> Result<Option<Order>, OrderFlowError> {
        let mut tx = begin_write_transaction(&self.pool).await?;
        if update.is_empty() {
            debug!("🗃️ No fields to update for order {order_number}. Update request skipped.");
        } else {
            let expected = update.expected_status;
            if orders::update_order(order_number, update, Utc::now(), &mut tx).await? == 0 {
                return match expected {
                    Some(expected) if orders::order_number_exists(order_number, &mut tx).await? => {
                        debug!("🗃️ Order {order_number} is no longer {expected}. Update refused.");
                        Err(OrderFlowError::StatusChanged { order_number: order_number.clone(), expected })
                    },
                    _ => Ok(None),
                };
            }
        }
        let order = orders::fetch_order_by_number(order_number, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::search_products(query, &mut conn).await?;
        Ok(products)
    }
}

impl NotificationManagement for SqliteDatabase {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let notification = notifications::insert_notification(notification, Utc::now(), &mut conn).await?;
        trace!("🗃️ Notification #{} ({}) saved", notification.id, notification.kind);
        Ok(notification)
    }

    async fn fetch_notifications(&self, recipient: &str) -> Result<Vec<Notification>, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let result = notifications::fetch_notifications(recipient, &mut conn).await?;
        Ok(result)
    }

    async fn count_unread(&self, recipient: &str) -> Result<i64, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let count = notifications::count_unread(recipient, &mut conn).await?;
        Ok(count)
    }

    async fn mark_as_read(&self, id: i64, recipient: &str) -> Result<bool, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let updated = notifications::mark_as_read(id, recipient, Utc::now(), &mut conn).await?;
        Ok(updated > 0)
    }

    async fn mark_all_as_read(&self, recipient: &str) -> Result<u64, NotificationError> {
        let mut conn = self.pool.acquire().await?;
        let updated = notifications::mark_all_as_read(recipient, Utc::now(), &mut conn).await?;
        Ok(updated)
    }
}
