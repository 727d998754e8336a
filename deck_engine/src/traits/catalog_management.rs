use crate::{
    api::{catalog_objects::ProductQueryFilter, errors::CatalogError},
    db_types::Product,
};

/// Read access to the product catalog. Products are maintained elsewhere.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogError>;

    /// Products matching the filter, newest first.
    async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogError>;
}
