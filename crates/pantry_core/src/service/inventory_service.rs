//! Inventory use-case service.
//!
//! # Responsibility
//! - Manage ingredients, markers and suppliers.
//! - Record storage batches and ingredient/supplier groupings with their
//!   link sets.
//!
//! # Invariants
//! - Every id in a link set refers to an existing row before the write starts.
//! - Link sets may be empty; duplicates collapse to one link.
//! - Deleting an ingredient removes receipt details using it and its link
//!   rows, but keeps storage batches and groupings.

use crate::model::entity::EntityKind;
use crate::model::inventory::{
    Ingredient, IngredientId, IngredientSupplier, IngredientSupplierId, Marker, MarkerId,
    NewStorage, Storage, StorageId, Supplier, SupplierId,
};
use crate::repo::inventory_repo::{
    IngredientSupplierListQuery, InventoryRepository, StorageListQuery,
};
use crate::repo::{ListQuery, RepoError, RepoResult};
use crate::service::normalize_name;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for inventory use-cases.
#[derive(Debug)]
pub enum InventoryServiceError {
    IngredientNotFound(IngredientId),
    MarkerNotFound(MarkerId),
    SupplierNotFound(SupplierId),
    StorageNotFound(StorageId),
    IngredientSupplierNotFound(IngredientSupplierId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for InventoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IngredientNotFound(id) => write!(f, "ingredient not found: {id}"),
            Self::MarkerNotFound(id) => write!(f, "marker not found: {id}"),
            Self::SupplierNotFound(id) => write!(f, "supplier not found: {id}"),
            Self::StorageNotFound(id) => write!(f, "storage not found: {id}"),
            Self::IngredientSupplierNotFound(id) => {
                write!(f, "ingredient supplier not found: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InventoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for InventoryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => match entity {
                EntityKind::Ingredient => Self::IngredientNotFound(id),
                EntityKind::Marker => Self::MarkerNotFound(id),
                EntityKind::Supplier => Self::SupplierNotFound(id),
                EntityKind::Storage => Self::StorageNotFound(id),
                EntityKind::IngredientSupplier => Self::IngredientSupplierNotFound(id),
                _ => Self::Repo(RepoError::NotFound { entity, id }),
            },
            other => Self::Repo(other),
        }
    }
}

/// Inventory service facade over repository implementations.
pub struct InventoryService<R: InventoryRepository> {
    repo: R,
}

impl<R: InventoryRepository> InventoryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_ingredient(&self, name: &str) -> Result<Ingredient, InventoryServiceError> {
        let ingredient = Ingredient::new(normalize_name(name));
        let id = self.repo.create_ingredient(&ingredient)?;
        info!("event=ingredient_create module=inventory status=ok ingredient_uuid={id}");
        Ok(ingredient)
    }

    pub fn get_ingredient(&self, id: IngredientId) -> RepoResult<Option<Ingredient>> {
        self.repo.get_ingredient(id)
    }

    pub fn list_ingredients(&self, query: &ListQuery) -> RepoResult<Vec<Ingredient>> {
        self.repo.list_ingredients(query)
    }

    pub fn rename_ingredient(
        &self,
        id: IngredientId,
        name: &str,
    ) -> Result<Ingredient, InventoryServiceError> {
        let ingredient = Ingredient {
            uuid: id,
            name: normalize_name(name),
        };
        self.repo.update_ingredient(&ingredient)?;
        Ok(ingredient)
    }

    /// Deletes an ingredient with its receipt details and link rows.
    pub fn delete_ingredient(&self, id: IngredientId) -> Result<(), InventoryServiceError> {
        self.repo.delete_ingredient(id)?;
        info!("event=ingredient_delete module=inventory status=ok ingredient_uuid={id}");
        Ok(())
    }

    pub fn create_marker(&self, name: &str) -> Result<Marker, InventoryServiceError> {
        let marker = Marker::new(normalize_name(name));
        let id = self.repo.create_marker(&marker)?;
        info!("event=marker_create module=inventory status=ok marker_uuid={id}");
        Ok(marker)
    }

    pub fn get_marker(&self, id: MarkerId) -> RepoResult<Option<Marker>> {
        self.repo.get_marker(id)
    }

    pub fn list_markers(&self, query: &ListQuery) -> RepoResult<Vec<Marker>> {
        self.repo.list_markers(query)
    }

    pub fn rename_marker(&self, id: MarkerId, name: &str) -> Result<Marker, InventoryServiceError> {
        let marker = Marker {
            uuid: id,
            name: normalize_name(name),
        };
        self.repo.update_marker(&marker)?;
        Ok(marker)
    }

    pub fn delete_marker(&self, id: MarkerId) -> Result<(), InventoryServiceError> {
        self.repo.delete_marker(id)?;
        info!("event=marker_delete module=inventory status=ok marker_uuid={id}");
        Ok(())
    }

    pub fn create_supplier(
        &self,
        legacy_name: &str,
        brand_name: &str,
        phone: i64,
    ) -> Result<Supplier, InventoryServiceError> {
        let supplier = Supplier::new(
            normalize_name(legacy_name),
            normalize_name(brand_name),
            phone,
        );
        let id = self.repo.create_supplier(&supplier)?;
        info!("event=supplier_create module=inventory status=ok supplier_uuid={id}");
        Ok(supplier)
    }

    pub fn get_supplier(&self, id: SupplierId) -> RepoResult<Option<Supplier>> {
        self.repo.get_supplier(id)
    }

    pub fn list_suppliers(&self, query: &ListQuery) -> RepoResult<Vec<Supplier>> {
        self.repo.list_suppliers(query)
    }

    /// Full replacement of supplier fields.
    pub fn update_supplier(&self, supplier: &Supplier) -> Result<Supplier, InventoryServiceError> {
        let supplier = Supplier {
            uuid: supplier.uuid,
            legacy_name: normalize_name(&supplier.legacy_name),
            brand_name: normalize_name(&supplier.brand_name),
            phone: supplier.phone,
        };
        self.repo.update_supplier(&supplier)?;
        Ok(supplier)
    }

    pub fn delete_supplier(&self, id: SupplierId) -> Result<(), InventoryServiceError> {
        self.repo.delete_supplier(id)?;
        info!("event=supplier_delete module=inventory status=ok supplier_uuid={id}");
        Ok(())
    }

    /// Records a storage batch with its ingredient and marker sets.
    pub fn receive_storage(&self, storage: &NewStorage) -> Result<Storage, InventoryServiceError> {
        self.ensure_ingredients(&storage.ingredient_uuids)?;
        self.ensure_markers(&storage.marker_uuids)?;
        let stored = self.repo.create_storage(storage).map_err(|err| {
            warn!("event=storage_create module=inventory status=error error={err}");
            InventoryServiceError::from(err)
        })?;
        info!(
            "event=storage_create module=inventory status=ok storage_uuid={} ingredients={} markers={}",
            stored.uuid,
            stored.ingredient_uuids.len(),
            stored.marker_uuids.len()
        );
        Ok(stored)
    }

    pub fn get_storage(&self, id: StorageId) -> RepoResult<Option<Storage>> {
        self.repo.get_storage(id)
    }

    pub fn list_storages(&self, query: &StorageListQuery) -> RepoResult<Vec<Storage>> {
        self.repo.list_storages(query)
    }

    /// Sets the batch count; the expiry timestamp is refreshed on every call.
    pub fn update_storage_count(
        &self,
        id: StorageId,
        count: i64,
    ) -> Result<Storage, InventoryServiceError> {
        Ok(self.repo.update_storage_count(id, count)?)
    }

    pub fn set_storage_ingredients(
        &self,
        id: StorageId,
        ingredients: &[IngredientId],
    ) -> Result<Storage, InventoryServiceError> {
        self.ensure_ingredients(ingredients)?;
        Ok(self.repo.set_storage_ingredients(id, ingredients)?)
    }

    pub fn set_storage_markers(
        &self,
        id: StorageId,
        markers: &[MarkerId],
    ) -> Result<Storage, InventoryServiceError> {
        self.ensure_markers(markers)?;
        Ok(self.repo.set_storage_markers(id, markers)?)
    }

    pub fn delete_storage(&self, id: StorageId) -> Result<(), InventoryServiceError> {
        self.repo.delete_storage(id)?;
        info!("event=storage_delete module=inventory status=ok storage_uuid={id}");
        Ok(())
    }

    /// Groups ingredients with the suppliers that deliver them.
    pub fn link_suppliers(
        &self,
        ingredients: &[IngredientId],
        suppliers: &[SupplierId],
    ) -> Result<IngredientSupplier, InventoryServiceError> {
        self.ensure_ingredients(ingredients)?;
        self.ensure_suppliers(suppliers)?;
        let group = self.repo.create_ingredient_supplier(ingredients, suppliers)?;
        info!(
            "event=ingredient_supplier_create module=inventory status=ok ingredient_supplier_uuid={} ingredients={} suppliers={}",
            group.uuid,
            group.ingredient_uuids.len(),
            group.supplier_uuids.len()
        );
        Ok(group)
    }

    pub fn get_ingredient_supplier(
        &self,
        id: IngredientSupplierId,
    ) -> RepoResult<Option<IngredientSupplier>> {
        self.repo.get_ingredient_supplier(id)
    }

    pub fn list_ingredient_suppliers(
        &self,
        query: &IngredientSupplierListQuery,
    ) -> RepoResult<Vec<IngredientSupplier>> {
        self.repo.list_ingredient_suppliers(query)
    }

    pub fn set_group_ingredients(
        &self,
        id: IngredientSupplierId,
        ingredients: &[IngredientId],
    ) -> Result<IngredientSupplier, InventoryServiceError> {
        self.ensure_ingredients(ingredients)?;
        Ok(self.repo.set_ingredient_supplier_ingredients(id, ingredients)?)
    }

    pub fn set_group_suppliers(
        &self,
        id: IngredientSupplierId,
        suppliers: &[SupplierId],
    ) -> Result<IngredientSupplier, InventoryServiceError> {
        self.ensure_suppliers(suppliers)?;
        Ok(self.repo.set_ingredient_supplier_suppliers(id, suppliers)?)
    }

    pub fn delete_ingredient_supplier(
        &self,
        id: IngredientSupplierId,
    ) -> Result<(), InventoryServiceError> {
        self.repo.delete_ingredient_supplier(id)?;
        info!(
            "event=ingredient_supplier_delete module=inventory status=ok ingredient_supplier_uuid={id}"
        );
        Ok(())
    }

    fn ensure_ingredients(&self, ids: &[IngredientId]) -> Result<(), InventoryServiceError> {
        for &id in ids {
            if self.repo.get_ingredient(id)?.is_none() {
                return Err(InventoryServiceError::IngredientNotFound(id));
            }
        }
        Ok(())
    }

    fn ensure_markers(&self, ids: &[MarkerId]) -> Result<(), InventoryServiceError> {
        for &id in ids {
            if self.repo.get_marker(id)?.is_none() {
                return Err(InventoryServiceError::MarkerNotFound(id));
            }
        }
        Ok(())
    }

    fn ensure_suppliers(&self, ids: &[SupplierId]) -> Result<(), InventoryServiceError> {
        for &id in ids {
            if self.repo.get_supplier(id)?.is_none() {
                return Err(InventoryServiceError::SupplierNotFound(id));
            }
        }
        Ok(())
    }
}
