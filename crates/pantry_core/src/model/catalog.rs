//! Catalog records: categories, products, receipts and receipt details.
//!
//! # Responsibility
//! - Define the product hierarchy `Category -> Product -> Recept`.
//! - Define `ReceptDetails`, the one-to-one ingredient breakdown of a receipt.
//!
//! # Invariants
//! - A product always belongs to exactly one category.
//! - A receipt always belongs to exactly one product; its price is optional.
//! - A receipt has at most one details row.

use crate::model::validation::{require_text, ValidationError, NAME_MAX_CHARS};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type CategoryId = Uuid;
pub type ProductId = Uuid;
/// Identifier of a receipt ("recept").
pub type ReceptId = Uuid;
pub type ReceptDetailsId = Uuid;

/// Top-level grouping of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub uuid: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("category.name", &self.name, NAME_MAX_CHARS)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Sellable product inside one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub uuid: ProductId,
    pub name: String,
    pub category_uuid: CategoryId,
}

impl Product {
    pub fn new(category_uuid: CategoryId, name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            category_uuid,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("product.name", &self.name, NAME_MAX_CHARS)
    }
}

impl Display for Product {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Receipt linking a purchased product to a price.
///
/// Verbose name in admin listings: `Чек` / `Чеки`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recept {
    pub uuid: ReceptId,
    pub product_uuid: ProductId,
    /// Whole currency units. `None` when the price is unknown.
    pub price: Option<i64>,
}

impl Recept {
    pub fn new(product_uuid: ProductId, price: Option<i64>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            product_uuid,
            price,
        }
    }
}

/// Quantity breakdown of one receipt, optionally tied to an ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceptDetails {
    pub uuid: ReceptDetailsId,
    pub recept_uuid: ReceptId,
    pub ingredient_uuid: Option<Uuid>,
    pub count: i64,
}

impl ReceptDetails {
    pub fn new(recept_uuid: ReceptId, ingredient_uuid: Option<Uuid>, count: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            recept_uuid,
            ingredient_uuid,
            count,
        }
    }
}

/// Admin label of a receipt: `"{product} ({price})"`.
pub fn recept_label(product_name: &str, price: Option<i64>) -> String {
    match price {
        Some(price) => format!("{product_name} ({price})"),
        None => format!("{product_name} (None)"),
    }
}

/// Admin label of receipt details: `"{recept label} - {ingredient}"`.
pub fn recept_details_label(recept_label: &str, ingredient_name: Option<&str>) -> String {
    format!(
        "{recept_label} - {}",
        ingredient_name.unwrap_or("None")
    )
}

#[cfg(test)]
mod tests {
    use super::{recept_details_label, recept_label, Category, Product};
    use crate::model::validation::ValidationError;

    #[test]
    fn recept_label_renders_price_or_placeholder() {
        assert_eq!(recept_label("Latte", Some(250)), "Latte (250)");
        assert_eq!(recept_label("Latte", None), "Latte (None)");
    }

    #[test]
    fn recept_details_label_handles_missing_ingredient() {
        assert_eq!(
            recept_details_label("Latte (250)", Some("Milk")),
            "Latte (250) - Milk"
        );
        assert_eq!(
            recept_details_label("Latte (250)", None),
            "Latte (250) - None"
        );
    }

    #[test]
    fn product_validation_limits_name_length() {
        let category = Category::new("Drinks");
        let product = Product::new(category.uuid, "x".repeat(101));
        assert!(matches!(
            product.validate(),
            Err(ValidationError::TooLong {
                field: "product.name",
                ..
            })
        ));
        assert_eq!(category.to_string(), "Drinks");
    }
}
