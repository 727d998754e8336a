use deck_engine::{
    api::{
        catalog_objects::ProductQueryFilter,
        order_objects::OrderQueryFilter,
        payment_objects::{PaymentSession, PaymentSessionRequest},
    },
    db_types::{NewNotification, NewOrder, Notification, Order, OrderNumber, OrderUpdate, Product},
    traits::{CatalogManagement, NotificationManagement, OrderManagement, PaymentGateway},
    CatalogError,
    GatewayError,
    NotificationError,
    OrderFlowError,
};
use mockall::mock;

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn create_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;
        async fn fetch_order_by_number(&self, order_number: &OrderNumber) -> Result<Option<Order>, OrderFlowError>;
        async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, OrderFlowError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError>;
        async fn update_order(&self, order_number: &OrderNumber, update: OrderUpdate) -> Result<Option<Order>, OrderFlowError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_session(&self, request: PaymentSessionRequest) -> Result<PaymentSession, GatewayError>;
    }
}

mock! {
    pub Catalog {}
    impl CatalogManagement for Catalog {
        async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogError>;
        async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogError>;
    }
}

mock! {
    pub NotificationStore {}
    impl NotificationManagement for NotificationStore {
        async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, NotificationError>;
        async fn fetch_notifications(&self, recipient: &str) -> Result<Vec<Notification>, NotificationError>;
        async fn count_unread(&self, recipient: &str) -> Result<i64, NotificationError>;
        async fn mark_as_read(&self, id: i64, recipient: &str) -> Result<bool, NotificationError>;
        async fn mark_all_as_read(&self, recipient: &str) -> Result<u64, NotificationError>;
    }
}
