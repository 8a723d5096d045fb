//! Catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `categories`, `products`, `recepts` and
//!   `recept_details`.
//!
//! # Invariants
//! - Deleting a category removes its products, their receipts, and every
//!   row depending on those receipts through `ON DELETE CASCADE`.
//! - A receipt has at most one `recept_details` row (`UNIQUE recept_uuid`).

use crate::model::catalog::{
    Category, CategoryId, Product, ProductId, Recept, ReceptDetails, ReceptDetailsId, ReceptId,
};
use crate::model::entity::EntityKind;
use crate::repo::{
    ensure_changed, ensure_connection_ready, map_write_error, parse_uuid, push_page, ListQuery,
    RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const REQUIRED_TABLES: &[&str] = &["categories", "products", "recepts", "recept_details"];

/// Product listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductListQuery {
    pub category_uuid: Option<CategoryId>,
    pub page: ListQuery,
}

/// Receipt listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceptListQuery {
    pub product_uuid: Option<ProductId>,
    pub page: ListQuery,
}

/// Repository interface for the product catalog.
pub trait CatalogRepository {
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Lists categories ordered by name, then id.
    fn list_categories(&self, query: &ListQuery) -> RepoResult<Vec<Category>>;
    fn update_category(&self, category: &Category) -> RepoResult<()>;
    /// Deletes one category and, by cascade, everything below it.
    fn delete_category(&self, id: CategoryId) -> RepoResult<()>;

    fn create_product(&self, product: &Product) -> RepoResult<ProductId>;
    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>>;
    /// Lists products ordered by name, then id.
    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>>;
    fn update_product(&self, product: &Product) -> RepoResult<()>;
    fn delete_product(&self, id: ProductId) -> RepoResult<()>;

    fn create_recept(&self, recept: &Recept) -> RepoResult<ReceptId>;
    fn get_recept(&self, id: ReceptId) -> RepoResult<Option<Recept>>;
    /// Lists receipts ordered by product name, then id.
    fn list_recepts(&self, query: &ReceptListQuery) -> RepoResult<Vec<Recept>>;
    fn update_recept(&self, recept: &Recept) -> RepoResult<()>;
    fn delete_recept(&self, id: ReceptId) -> RepoResult<()>;

    fn create_recept_details(&self, details: &ReceptDetails) -> RepoResult<ReceptDetailsId>;
    fn get_recept_details(&self, id: ReceptDetailsId) -> RepoResult<Option<ReceptDetails>>;
    /// Loads the details row owned by one receipt, if any.
    fn find_details_for_recept(&self, recept_uuid: ReceptId)
        -> RepoResult<Option<ReceptDetails>>;
    fn update_recept_details(&self, details: &ReceptDetails) -> RepoResult<()>;
    fn delete_recept_details(&self, id: ReceptDetailsId) -> RepoResult<()>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn create_category(&self, category: &Category) -> RepoResult<CategoryId> {
        category.validate()?;
        self.conn
            .execute(
                "INSERT INTO categories (uuid, name) VALUES (?1, ?2);",
                params![category.uuid.to_string(), category.name.as_str()],
            )
            .map_err(|err| map_write_error(err, EntityKind::Category, "duplicate id"))?;
        Ok(category.uuid)
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        self.conn
            .query_row(
                "SELECT uuid, name FROM categories WHERE uuid = ?1;",
                [id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?
            .map(|(uuid, name)| -> RepoResult<Category> {
                Ok(Category {
                    uuid: parse_uuid(&uuid, "categories.uuid")?,
                    name,
                })
            })
            .transpose()
    }

    fn list_categories(&self, query: &ListQuery) -> RepoResult<Vec<Category>> {
        let mut sql =
            String::from("SELECT uuid, name FROM categories ORDER BY name COLLATE UNICODE_NOCASE ASC, uuid ASC");
        let mut bind_values = Vec::new();
        push_page(&mut sql, &mut bind_values, query);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get("uuid")?;
            categories.push(Category {
                uuid: parse_uuid(&uuid, "categories.uuid")?,
                name: row.get("name")?,
            });
        }
        Ok(categories)
    }

    fn update_category(&self, category: &Category) -> RepoResult<()> {
        category.validate()?;
        let changed = self.conn.execute(
            "UPDATE categories SET name = ?2 WHERE uuid = ?1;",
            params![category.uuid.to_string(), category.name.as_str()],
        )?;
        ensure_changed(changed, EntityKind::Category, category.uuid)
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE uuid = ?1;", [id.to_string()])?;
        ensure_changed(changed, EntityKind::Category, id)
    }

    fn create_product(&self, product: &Product) -> RepoResult<ProductId> {
        product.validate()?;
        self.conn
            .execute(
                "INSERT INTO products (uuid, name, category_uuid) VALUES (?1, ?2, ?3);",
                params![
                    product.uuid.to_string(),
                    product.name.as_str(),
                    product.category_uuid.to_string(),
                ],
            )
            .map_err(|err| map_write_error(err, EntityKind::Product, "duplicate id"))?;
        Ok(product.uuid)
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name, category_uuid FROM products WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }
        Ok(None)
    }

    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>> {
        let mut sql = String::from("SELECT uuid, name, category_uuid FROM products WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(category_uuid) = query.category_uuid {
            sql.push_str(" AND category_uuid = ?");
            bind_values.push(Value::Text(category_uuid.to_string()));
        }
        sql.push_str(" ORDER BY name COLLATE UNICODE_NOCASE ASC, uuid ASC");
        push_page(&mut sql, &mut bind_values, &query.page);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn update_product(&self, product: &Product) -> RepoResult<()> {
        product.validate()?;
        let changed = self
            .conn
            .execute(
                "UPDATE products SET name = ?2, category_uuid = ?3 WHERE uuid = ?1;",
                params![
                    product.uuid.to_string(),
                    product.name.as_str(),
                    product.category_uuid.to_string(),
                ],
            )
            .map_err(|err| map_write_error(err, EntityKind::Product, "duplicate id"))?;
        ensure_changed(changed, EntityKind::Product, product.uuid)
    }

    fn delete_product(&self, id: ProductId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE uuid = ?1;", [id.to_string()])?;
        ensure_changed(changed, EntityKind::Product, id)
    }

    fn create_recept(&self, recept: &Recept) -> RepoResult<ReceptId> {
        self.conn
            .execute(
                "INSERT INTO recepts (uuid, product_uuid, price) VALUES (?1, ?2, ?3);",
                params![
                    recept.uuid.to_string(),
                    recept.product_uuid.to_string(),
                    recept.price,
                ],
            )
            .map_err(|err| map_write_error(err, EntityKind::Recept, "duplicate id"))?;
        Ok(recept.uuid)
    }

    fn get_recept(&self, id: ReceptId) -> RepoResult<Option<Recept>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, product_uuid, price FROM recepts WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_recept_row(row)?));
        }
        Ok(None)
    }

    fn list_recepts(&self, query: &ReceptListQuery) -> RepoResult<Vec<Recept>> {
        let mut sql = String::from(
            "SELECT r.uuid AS uuid, r.product_uuid AS product_uuid, r.price AS price
             FROM recepts r
             INNER JOIN products p ON p.uuid = r.product_uuid
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(product_uuid) = query.product_uuid {
            sql.push_str(" AND r.product_uuid = ?");
            bind_values.push(Value::Text(product_uuid.to_string()));
        }
        sql.push_str(" ORDER BY p.name COLLATE UNICODE_NOCASE ASC, r.uuid ASC");
        push_page(&mut sql, &mut bind_values, &query.page);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut recepts = Vec::new();
        while let Some(row) = rows.next()? {
            recepts.push(parse_recept_row(row)?);
        }
        Ok(recepts)
    }

    fn update_recept(&self, recept: &Recept) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE recepts SET product_uuid = ?2, price = ?3 WHERE uuid = ?1;",
                params![
                    recept.uuid.to_string(),
                    recept.product_uuid.to_string(),
                    recept.price,
                ],
            )
            .map_err(|err| map_write_error(err, EntityKind::Recept, "duplicate id"))?;
        ensure_changed(changed, EntityKind::Recept, recept.uuid)
    }

    fn delete_recept(&self, id: ReceptId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM recepts WHERE uuid = ?1;", [id.to_string()])?;
        ensure_changed(changed, EntityKind::Recept, id)
    }

    fn create_recept_details(&self, details: &ReceptDetails) -> RepoResult<ReceptDetailsId> {
        self.conn
            .execute(
                "INSERT INTO recept_details (uuid, recept_uuid, ingredient_uuid, count)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    details.uuid.to_string(),
                    details.recept_uuid.to_string(),
                    details.ingredient_uuid.map(|value| value.to_string()),
                    details.count,
                ],
            )
            .map_err(|err| {
                map_write_error(
                    err,
                    EntityKind::ReceptDetails,
                    "receipt already has details",
                )
            })?;
        Ok(details.uuid)
    }

    fn get_recept_details(&self, id: ReceptDetailsId) -> RepoResult<Option<ReceptDetails>> {
        self.load_details("uuid", &id.to_string())
    }

    fn find_details_for_recept(
        &self,
        recept_uuid: ReceptId,
    ) -> RepoResult<Option<ReceptDetails>> {
        self.load_details("recept_uuid", &recept_uuid.to_string())
    }

    fn update_recept_details(&self, details: &ReceptDetails) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE recept_details
                 SET recept_uuid = ?2, ingredient_uuid = ?3, count = ?4
                 WHERE uuid = ?1;",
                params![
                    details.uuid.to_string(),
                    details.recept_uuid.to_string(),
                    details.ingredient_uuid.map(|value| value.to_string()),
                    details.count,
                ],
            )
            .map_err(|err| {
                map_write_error(
                    err,
                    EntityKind::ReceptDetails,
                    "receipt already has details",
                )
            })?;
        ensure_changed(changed, EntityKind::ReceptDetails, details.uuid)
    }

    fn delete_recept_details(&self, id: ReceptDetailsId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM recept_details WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        ensure_changed(changed, EntityKind::ReceptDetails, id)
    }
}

impl SqliteCatalogRepository<'_> {
    fn load_details(
        &self,
        key_column: &'static str,
        key: &str,
    ) -> RepoResult<Option<ReceptDetails>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, recept_uuid, ingredient_uuid, count
             FROM recept_details
             WHERE {key_column} = ?1;"
        ))?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            let uuid: String = row.get("uuid")?;
            let recept_uuid: String = row.get("recept_uuid")?;
            let ingredient_uuid = row
                .get::<_, Option<String>>("ingredient_uuid")?
                .map(|value| parse_uuid(&value, "recept_details.ingredient_uuid"))
                .transpose()?;
            return Ok(Some(ReceptDetails {
                uuid: parse_uuid(&uuid, "recept_details.uuid")?,
                recept_uuid: parse_uuid(&recept_uuid, "recept_details.recept_uuid")?,
                ingredient_uuid,
                count: row.get("count")?,
            }));
        }
        Ok(None)
    }
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let uuid: String = row.get("uuid")?;
    let category_uuid: String = row.get("category_uuid")?;
    Ok(Product {
        uuid: parse_uuid(&uuid, "products.uuid")?,
        name: row.get("name")?,
        category_uuid: parse_uuid(&category_uuid, "products.category_uuid")?,
    })
}

fn parse_recept_row(row: &Row<'_>) -> RepoResult<Recept> {
    let uuid: String = row.get("uuid")?;
    let product_uuid: String = row.get("product_uuid")?;
    Ok(Recept {
        uuid: parse_uuid(&uuid, "recepts.uuid")?,
        product_uuid: parse_uuid(&product_uuid, "recepts.product_uuid")?,
        price: row.get("price")?,
    })
}
