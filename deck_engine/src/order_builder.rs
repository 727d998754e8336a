//! Pricing for new orders.
//!
//! An [`OrderDraft`] collects the lines of an order as products are resolved against the catalog, snapshotting each
//! product's name and unit price at that moment. Storage backends drive a draft from inside their own database
//! transaction and persist it once every line has been added; the draft itself does no I/O.
use deck_common::Rupiah;

use crate::{
    api::errors::OrderFlowError,
    db_types::{FieldErrors, NewOrder, NewOrderItem, Product},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price: Rupiah,
    pub total_price: Rupiah,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    buyer_name: String,
    phone: String,
    notes: Option<String>,
    lines: Vec<DraftLine>,
    sub_total: Rupiah,
}

impl OrderDraft {
    pub fn new(order: &NewOrder) -> Self {
        Self {
            buyer_name: order.buyer_name.trim().to_string(),
            phone: order.phone.trim().to_string(),
            notes: non_blank(order.notes.as_deref()),
            lines: Vec::with_capacity(order.items.len()),
            sub_total: Rupiah::default(),
        }
    }

    /// Adds a line for `item`, priced from `product`. The product must be the one the item refers to, and it must be
    /// available.
    pub fn add_line(&mut self, product: &Product, item: &NewOrderItem) -> Result<(), OrderFlowError> {
        if product.id != item.product_id || !product.is_available {
            return Err(OrderFlowError::ProductUnavailable(item.product_id));
        }
        let index = self.lines.len();
        let total_price = product.price.checked_mul(item.quantity).ok_or_else(|| {
            FieldErrors::single(format!("items[{index}].quantity"), "Line total is too large")
        })?;
        let sub_total = self
            .sub_total
            .checked_add(total_price)
            .ok_or_else(|| FieldErrors::single("items", "Order total is too large"))?;
        self.lines.push(DraftLine {
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: item.quantity,
            price: product.price,
            total_price,
            notes: non_blank(item.notes.as_deref()),
        });
        self.sub_total = sub_total;
        Ok(())
    }

    pub fn buyer_name(&self) -> &str {
        &self.buyer_name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn sub_total(&self) -> Rupiah {
        self.sub_total
    }

    pub fn total_amount(&self) -> Rupiah {
        total_amount_for(self.sub_total)
    }
}

/// The amount the buyer is charged for a given subtotal. There are no taxes, fees or discounts, so this is the
/// subtotal itself.
pub fn total_amount_for(sub_total: Rupiah) -> Rupiah {
    sub_total
}

fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}
