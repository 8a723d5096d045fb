//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide category/product/receipt/receipt-details APIs.
//! - Normalize names and resolve parent rows before writes.
//!
//! # Invariants
//! - A product is created only under an existing category.
//! - A receipt is created only for an existing product.
//! - Deleting a category or product relies on SQL cascades; the service does
//!   not walk children.

use crate::model::catalog::{
    Category, CategoryId, Product, ProductId, Recept, ReceptDetails, ReceptDetailsId, ReceptId,
};
use crate::model::entity::EntityKind;
use crate::model::inventory::IngredientId;
use crate::repo::catalog_repo::{CatalogRepository, ProductListQuery, ReceptListQuery};
use crate::repo::{ListQuery, RepoError, RepoResult};
use crate::service::normalize_name;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogServiceError {
    CategoryNotFound(CategoryId),
    ProductNotFound(ProductId),
    ReceptNotFound(ReceptId),
    ReceptDetailsNotFound(ReceptDetailsId),
    /// Receipt details point at an ingredient that does not exist.
    IngredientNotFound(IngredientId),
    /// Receipt already owns a details row.
    DetailsAlreadyExist(ReceptId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::ReceptNotFound(id) => write!(f, "receipt not found: {id}"),
            Self::ReceptDetailsNotFound(id) => write!(f, "receipt details not found: {id}"),
            Self::IngredientNotFound(id) => write!(f, "ingredient not found: {id}"),
            Self::DetailsAlreadyExist(id) => {
                write!(f, "receipt already has details: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent catalog state: {details}")
            }
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: EntityKind::Category,
                id,
            } => Self::CategoryNotFound(id),
            RepoError::NotFound {
                entity: EntityKind::Product,
                id,
            } => Self::ProductNotFound(id),
            RepoError::NotFound {
                entity: EntityKind::Recept,
                id,
            } => Self::ReceptNotFound(id),
            RepoError::NotFound {
                entity: EntityKind::ReceptDetails,
                id,
            } => Self::ReceptDetailsNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Catalog service facade over repository implementations.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_category(&self, name: &str) -> Result<Category, CatalogServiceError> {
        let category = Category::new(normalize_name(name));
        let id = self.repo.create_category(&category)?;
        info!("event=category_create module=catalog status=ok category_uuid={id}");
        self.repo
            .get_category(id)?
            .ok_or(CatalogServiceError::InconsistentState(
                "created category not found in read-back",
            ))
    }

    pub fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        self.repo.get_category(id)
    }

    pub fn list_categories(&self, query: &ListQuery) -> RepoResult<Vec<Category>> {
        self.repo.list_categories(query)
    }

    pub fn rename_category(
        &self,
        id: CategoryId,
        name: &str,
    ) -> Result<Category, CatalogServiceError> {
        let category = Category {
            uuid: id,
            name: normalize_name(name),
        };
        self.repo.update_category(&category)?;
        Ok(category)
    }

    /// Deletes a category together with its products, their receipts and
    /// everything hanging off those receipts.
    pub fn delete_category(&self, id: CategoryId) -> Result<(), CatalogServiceError> {
        self.repo.delete_category(id)?;
        info!("event=category_delete module=catalog status=ok category_uuid={id}");
        Ok(())
    }

    pub fn create_product(
        &self,
        category_uuid: CategoryId,
        name: &str,
    ) -> Result<Product, CatalogServiceError> {
        self.ensure_category(category_uuid)?;
        let product = Product::new(category_uuid, normalize_name(name));
        let id = self.repo.create_product(&product).map_err(|err| match err {
            RepoError::MissingReference(_) => CatalogServiceError::CategoryNotFound(category_uuid),
            other => other.into(),
        })?;
        info!(
            "event=product_create module=catalog status=ok product_uuid={id} category_uuid={category_uuid}"
        );
        self.repo
            .get_product(id)?
            .ok_or(CatalogServiceError::InconsistentState(
                "created product not found in read-back",
            ))
    }

    pub fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.repo.get_product(id)
    }

    pub fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>> {
        self.repo.list_products(query)
    }

    /// Renames a product and optionally moves it to another category.
    pub fn update_product(
        &self,
        id: ProductId,
        name: &str,
        category_uuid: Option<CategoryId>,
    ) -> Result<Product, CatalogServiceError> {
        let current = self
            .repo
            .get_product(id)?
            .ok_or(CatalogServiceError::ProductNotFound(id))?;
        let category_uuid = category_uuid.unwrap_or(current.category_uuid);
        if category_uuid != current.category_uuid {
            self.ensure_category(category_uuid)?;
        }

        let product = Product {
            uuid: id,
            name: normalize_name(name),
            category_uuid,
        };
        self.repo.update_product(&product)?;
        Ok(product)
    }

    pub fn delete_product(&self, id: ProductId) -> Result<(), CatalogServiceError> {
        self.repo.delete_product(id)?;
        info!("event=product_delete module=catalog status=ok product_uuid={id}");
        Ok(())
    }

    pub fn create_recept(
        &self,
        product_uuid: ProductId,
        price: Option<i64>,
    ) -> Result<Recept, CatalogServiceError> {
        self.ensure_product(product_uuid)?;
        let recept = Recept::new(product_uuid, price);
        let id = self.repo.create_recept(&recept).map_err(|err| match err {
            RepoError::MissingReference(_) => CatalogServiceError::ProductNotFound(product_uuid),
            other => other.into(),
        })?;
        info!("event=recept_create module=catalog status=ok recept_uuid={id} product_uuid={product_uuid}");
        self.repo
            .get_recept(id)?
            .ok_or(CatalogServiceError::InconsistentState(
                "created receipt not found in read-back",
            ))
    }

    pub fn get_recept(&self, id: ReceptId) -> RepoResult<Option<Recept>> {
        self.repo.get_recept(id)
    }

    pub fn list_recepts(&self, query: &ReceptListQuery) -> RepoResult<Vec<Recept>> {
        self.repo.list_recepts(query)
    }

    pub fn set_recept_price(
        &self,
        id: ReceptId,
        price: Option<i64>,
    ) -> Result<Recept, CatalogServiceError> {
        let mut recept = self
            .repo
            .get_recept(id)?
            .ok_or(CatalogServiceError::ReceptNotFound(id))?;
        recept.price = price;
        self.repo.update_recept(&recept)?;
        Ok(recept)
    }

    pub fn delete_recept(&self, id: ReceptId) -> Result<(), CatalogServiceError> {
        self.repo.delete_recept(id)?;
        info!("event=recept_delete module=catalog status=ok recept_uuid={id}");
        Ok(())
    }

    /// Attaches the details row to a receipt. A receipt holds at most one.
    pub fn create_recept_details(
        &self,
        recept_uuid: ReceptId,
        ingredient_uuid: Option<IngredientId>,
        count: i64,
    ) -> Result<ReceptDetails, CatalogServiceError> {
        if self.repo.get_recept(recept_uuid)?.is_none() {
            return Err(CatalogServiceError::ReceptNotFound(recept_uuid));
        }
        if self.repo.find_details_for_recept(recept_uuid)?.is_some() {
            return Err(CatalogServiceError::DetailsAlreadyExist(recept_uuid));
        }

        let details = ReceptDetails::new(recept_uuid, ingredient_uuid, count);
        let id = self
            .repo
            .create_recept_details(&details)
            .map_err(|err| details_write_error(err, &details))?;
        info!(
            "event=recept_details_create module=catalog status=ok recept_details_uuid={id} recept_uuid={recept_uuid}"
        );
        self.repo
            .get_recept_details(id)?
            .ok_or(CatalogServiceError::InconsistentState(
                "created receipt details not found in read-back",
            ))
    }

    pub fn get_recept_details(&self, id: ReceptDetailsId) -> RepoResult<Option<ReceptDetails>> {
        self.repo.get_recept_details(id)
    }

    pub fn find_details_for_recept(
        &self,
        recept_uuid: ReceptId,
    ) -> RepoResult<Option<ReceptDetails>> {
        self.repo.find_details_for_recept(recept_uuid)
    }

    /// Replaces ingredient and count of an existing details row.
    pub fn update_recept_details(
        &self,
        id: ReceptDetailsId,
        ingredient_uuid: Option<IngredientId>,
        count: i64,
    ) -> Result<ReceptDetails, CatalogServiceError> {
        let mut details = self
            .repo
            .get_recept_details(id)?
            .ok_or(CatalogServiceError::ReceptDetailsNotFound(id))?;
        details.ingredient_uuid = ingredient_uuid;
        details.count = count;
        self.repo
            .update_recept_details(&details)
            .map_err(|err| details_write_error(err, &details))?;
        Ok(details)
    }

    pub fn delete_recept_details(&self, id: ReceptDetailsId) -> Result<(), CatalogServiceError> {
        self.repo.delete_recept_details(id)?;
        Ok(())
    }

    fn ensure_category(&self, id: CategoryId) -> Result<(), CatalogServiceError> {
        if self.repo.get_category(id)?.is_none() {
            return Err(CatalogServiceError::CategoryNotFound(id));
        }
        Ok(())
    }

    fn ensure_product(&self, id: ProductId) -> Result<(), CatalogServiceError> {
        if self.repo.get_product(id)?.is_none() {
            return Err(CatalogServiceError::ProductNotFound(id));
        }
        Ok(())
    }
}

/// With the receipt already resolved, a failed foreign key on a details
/// write can only be the ingredient.
fn details_write_error(err: RepoError, details: &ReceptDetails) -> CatalogServiceError {
    match (err, details.ingredient_uuid) {
        (RepoError::MissingReference(_), Some(ingredient_uuid)) => {
            CatalogServiceError::IngredientNotFound(ingredient_uuid)
        }
        (RepoError::Conflict { .. }, _) => {
            CatalogServiceError::DetailsAlreadyExist(details.recept_uuid)
        }
        (other, _) => other.into(),
    }
}
