use serde::{Deserialize, Serialize};

use crate::db_types::CategoryType;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQueryFilter {
    #[serde(default)]
    pub category: Option<CategoryType>,
    /// Case-insensitive substring match on the product name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

impl ProductQueryFilter {
    pub fn with_category(mut self, category: CategoryType) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn only_available(mut self) -> Self {
        self.available = Some(true);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.name.is_none() && self.available.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub value: CategoryType,
    pub name: String,
}

impl From<CategoryType> for CategoryInfo {
    fn from(value: CategoryType) -> Self {
        Self { value, name: value.display_name().to_string() }
    }
}
