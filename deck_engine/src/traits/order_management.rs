use crate::{
    api::{errors::OrderFlowError, order_objects::OrderQueryFilter},
    db_types::{NewOrder, Order, OrderNumber, OrderUpdate},
};

/// The `OrderManagement` trait defines the behaviour for creating, querying and updating orders in the database
/// backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Prices and stores a new order in a single atomic unit of work.
    ///
    /// Every requested product must exist and be available. Line prices and names are copied from the catalog at this
    /// moment, and the order number is generated here. If any product is missing, nothing is written and
    /// [`OrderFlowError::ProductUnavailable`] is returned.
    ///
    /// The returned order includes its lines, in the same order as the request items.
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    /// Fetches an order, with its lines, by order number.
    async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, OrderFlowError>;

    /// Fetches an order, with its lines, by its internal id.
    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderFlowError>;

    /// Fetches orders matching the filter, newest first. Lines are included.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError>;

    /// Applies the non-empty fields of `update` to the order and returns the updated order.
    /// Returns `None` if the order does not exist.
    async fn update_order(
        &self,
        order_number: &OrderNumber,
        update: OrderUpdate,
    ) -> Result<Option<Order>, OrderFlowError>;
}
