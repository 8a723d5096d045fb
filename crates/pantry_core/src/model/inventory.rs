//! Inventory records: ingredients, markers, storage batches and suppliers.
//!
//! # Responsibility
//! - Define stock-side entities and their many-to-many link sets.
//!
//! # Invariants
//! - Link sets (`ingredient_uuids`, `marker_uuids`, `supplier_uuids`) hold
//!   unique ids sorted ascending; they may be empty.
//! - `received_at` never changes after insert; `expired_at` is refreshed on
//!   every update of the storage batch.

use crate::model::validation::{
    require_text, ValidationError, NAME_MAX_CHARS, SUPPLIER_NAME_MAX_CHARS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type IngredientId = Uuid;
pub type MarkerId = Uuid;
pub type StorageId = Uuid;
/// Identifier of a supplier ("suplier").
pub type SupplierId = Uuid;
pub type IngredientSupplierId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub uuid: IngredientId,
    pub name: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("ingredient.name", &self.name, NAME_MAX_CHARS)
    }
}

impl Display for Ingredient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Free-form tag attached to storage batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub uuid: MarkerId,
    pub name: String,
}

impl Marker {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("marker.name", &self.name, NAME_MAX_CHARS)
    }
}

impl Display for Marker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Inventory batch of ingredients with received/expiry timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storage {
    pub uuid: StorageId,
    pub count: i64,
    /// Epoch milliseconds, set once on insert.
    pub received_at: i64,
    /// Epoch milliseconds, refreshed on every update.
    pub expired_at: i64,
    pub ingredient_uuids: Vec<IngredientId>,
    pub marker_uuids: Vec<MarkerId>,
}

/// Input for creating a storage batch together with its link sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStorage {
    pub count: i64,
    pub ingredient_uuids: Vec<IngredientId>,
    pub marker_uuids: Vec<MarkerId>,
}

/// Supplier ("suplier") with legacy and brand names and a contact phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub uuid: SupplierId,
    pub legacy_name: String,
    pub brand_name: String,
    /// Stored as a plain integer, without formatting or country prefix.
    pub phone: i64,
}

impl Supplier {
    pub fn new(legacy_name: impl Into<String>, brand_name: impl Into<String>, phone: i64) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            legacy_name: legacy_name.into(),
            brand_name: brand_name.into(),
            phone,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(
            "supplier.legacy_name",
            &self.legacy_name,
            SUPPLIER_NAME_MAX_CHARS,
        )?;
        require_text(
            "supplier.brand_name",
            &self.brand_name,
            SUPPLIER_NAME_MAX_CHARS,
        )
    }
}

impl Display for Supplier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.legacy_name)
    }
}

/// Many-to-many grouping of ingredients and the suppliers that deliver them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSupplier {
    pub uuid: IngredientSupplierId,
    pub ingredient_uuids: Vec<IngredientId>,
    pub supplier_uuids: Vec<SupplierId>,
}

/// Deduplicates and sorts a link set.
pub fn normalize_id_set(ids: &[Uuid]) -> Vec<Uuid> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Admin label of a storage batch: ingredient names joined by `", "`.
pub fn storage_label<S: AsRef<str>>(ingredient_names: &[S]) -> String {
    join_labels(ingredient_names.iter().map(|name| name.as_ref()))
}

/// Admin label of an ingredient/supplier grouping: ingredient names, then
/// supplier legacy names, joined by `", "`.
pub fn ingredient_supplier_label<S: AsRef<str>>(
    ingredient_names: &[S],
    supplier_legacy_names: &[S],
) -> String {
    join_labels(
        ingredient_names
            .iter()
            .chain(supplier_legacy_names.iter())
            .map(|name| name.as_ref()),
    )
}

fn join_labels<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::{ingredient_supplier_label, normalize_id_set, storage_label, Supplier};
    use uuid::Uuid;

    #[test]
    fn normalize_id_set_sorts_and_deduplicates() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let normalized = normalize_id_set(&[b, a, b]);
        assert_eq!(normalized.len(), 2);
        assert!(normalized[0] < normalized[1]);
    }

    #[test]
    fn labels_join_names_in_order() {
        assert_eq!(storage_label(&["Flour", "Sugar"]), "Flour, Sugar");
        assert_eq!(storage_label::<&str>(&[]), "");
        assert_eq!(
            ingredient_supplier_label(&["Milk"], &["Old Dairy"]),
            "Milk, Old Dairy"
        );
    }

    #[test]
    fn supplier_requires_both_names() {
        let supplier = Supplier::new("Old Dairy", "  ", 5550100);
        assert!(supplier.validate().is_err());
        assert_eq!(Supplier::new("Old Dairy", "Dairy Co", 1).to_string(), "Old Dairy");
    }
}
