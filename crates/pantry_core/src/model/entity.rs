//! Entity metadata used by admin listings and schema checks.

use serde::{Deserialize, Serialize};

/// Every persisted entity kind, in admin display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Category,
    Product,
    Recept,
    OrderRecept,
    Order,
    ReceptDetails,
    Ingredient,
    Marker,
    Storage,
    IngredientSupplier,
    Supplier,
}

impl EntityKind {
    const ALL: [EntityKind; 12] = [
        EntityKind::User,
        EntityKind::Category,
        EntityKind::Product,
        EntityKind::Recept,
        EntityKind::OrderRecept,
        EntityKind::Order,
        EntityKind::ReceptDetails,
        EntityKind::Ingredient,
        EntityKind::Marker,
        EntityKind::Storage,
        EntityKind::IngredientSupplier,
        EntityKind::Supplier,
    ];

    pub fn all() -> &'static [EntityKind] {
        &Self::ALL
    }

    /// Backing table of the entity's own rows (link tables excluded).
    pub fn table_name(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Category => "categories",
            Self::Product => "products",
            Self::Recept => "recepts",
            Self::OrderRecept => "order_recepts",
            Self::Order => "orders",
            Self::ReceptDetails => "recept_details",
            Self::Ingredient => "ingredients",
            Self::Marker => "markers",
            Self::Storage => "storages",
            Self::IngredientSupplier => "ingredient_suppliers",
            Self::Supplier => "suppliers",
        }
    }

    pub fn verbose_name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Category => "category",
            Self::Product => "product",
            Self::Recept => "Чек",
            Self::OrderRecept => "order recept",
            Self::Order => "order",
            Self::ReceptDetails => "recept details",
            Self::Ingredient => "ingredient",
            Self::Marker => "marker",
            Self::Storage => "storage",
            Self::IngredientSupplier => "ingredient supplier",
            Self::Supplier => "supplier",
        }
    }

    pub fn verbose_name_plural(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Category => "categories",
            Self::Product => "products",
            Self::Recept => "Чеки",
            Self::OrderRecept => "order recepts",
            Self::Order => "orders",
            Self::ReceptDetails => "recept details",
            Self::Ingredient => "ingredients",
            Self::Marker => "markers",
            Self::Storage => "storages",
            Self::IngredientSupplier => "ingredient suppliers",
            Self::Supplier => "suppliers",
        }
    }

    /// Parses the snake_case key used on the command line and in JSON.
    pub fn from_key(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == value)
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Category => "category",
            Self::Product => "product",
            Self::Recept => "recept",
            Self::OrderRecept => "order_recept",
            Self::Order => "order",
            Self::ReceptDetails => "recept_details",
            Self::Ingredient => "ingredient",
            Self::Marker => "marker",
            Self::Storage => "storage",
            Self::IngredientSupplier => "ingredient_supplier",
            Self::Supplier => "supplier",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EntityKind;
    use std::collections::HashSet;

    #[test]
    fn table_names_and_keys_are_unique() {
        let tables: HashSet<_> = EntityKind::all().iter().map(|k| k.table_name()).collect();
        let keys: HashSet<_> = EntityKind::all().iter().map(|k| k.key()).collect();
        assert_eq!(tables.len(), EntityKind::all().len());
        assert_eq!(keys.len(), EntityKind::all().len());
    }

    #[test]
    fn key_parsing_matches_serde_names() {
        for kind in EntityKind::all() {
            assert_eq!(EntityKind::from_key(kind.key()), Some(*kind));
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.key());
        }
        assert_eq!(EntityKind::Recept.verbose_name_plural(), "Чеки");
    }
}
