use std::fmt::Debug;

use log::*;

use crate::{
    api::{
        catalog_objects::{CategoryInfo, ProductQueryFilter},
        errors::CatalogError,
    },
    db_types::{CategoryType, Product},
    traits::CatalogManagement,
};

/// Read-only access to products and categories.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn categories(&self) -> Vec<CategoryInfo> {
        CategoryType::ALL.into_iter().map(CategoryInfo::from).collect()
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogError> {
        trace!("🗃️ Product search: {query:?}");
        self.db.search_products(query).await
    }

    pub async fn product(&self, id: i64) -> Result<Product, CatalogError> {
        self.db.fetch_product(id).await?.ok_or(CatalogError::ProductNotFound(id))
    }
}
