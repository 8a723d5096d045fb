//! Admin listing repository: row counts and display labels per entity.
//!
//! # Responsibility
//! - Count rows of every entity table.
//! - Resolve the human-readable label of records, joining referenced rows
//!   where a label depends on them.
//!
//! # Invariants
//! - Labels are rendered by the `model` label functions, never ad hoc.
//! - Listing order is `label source ASC, uuid ASC`, except storage batches and
//!   ingredient/supplier groupings, which list by id.

use crate::model::catalog::{recept_details_label, recept_label};
use crate::model::entity::EntityKind;
use crate::model::inventory::{ingredient_supplier_label, storage_label};
use crate::model::order::{order_label, order_recept_label};
use crate::repo::{ensure_connection_ready, parse_uuid, push_page, ListQuery, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::Serialize;
use uuid::Uuid;

/// One admin listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityLabel {
    pub uuid: Uuid,
    pub label: String,
}

/// Row count of one entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityCount {
    pub entity: EntityKind,
    pub count: u64,
}

/// Repository interface for admin listings.
pub trait AdminRepository {
    fn count(&self, entity: EntityKind) -> RepoResult<u64>;
    fn get_label(&self, entity: EntityKind, id: Uuid) -> RepoResult<Option<String>>;
    fn list_labels(&self, entity: EntityKind, query: &ListQuery) -> RepoResult<Vec<EntityLabel>>;
}

/// SQLite-backed admin repository.
pub struct SqliteAdminRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAdminRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let tables: Vec<&'static str> = EntityKind::all()
            .iter()
            .map(|entity| entity.table_name())
            .collect();
        ensure_connection_ready(conn, &tables)?;
        Ok(Self { conn })
    }

    fn render(&self, entity: EntityKind, row: &Row<'_>) -> RepoResult<EntityLabel> {
        let uuid_text: String = row.get("uuid")?;
        let uuid = parse_uuid(&uuid_text, "uuid")?;
        let primary: Option<String> = row.get("primary_name")?;
        let primary = primary.unwrap_or_default();
        let price: Option<i64> = row.get("price")?;
        let secondary: Option<String> = row.get("secondary_name")?;

        let label = match entity {
            EntityKind::Recept => recept_label(&primary, price),
            EntityKind::OrderRecept => order_recept_label(&primary),
            EntityKind::Order => order_label(&primary),
            EntityKind::ReceptDetails => {
                recept_details_label(&recept_label(&primary, price), secondary.as_deref())
            }
            EntityKind::Storage => {
                let names = self.member_names(
                    "SELECT i.name
                     FROM storage_ingredients l
                     INNER JOIN ingredients i ON i.uuid = l.ingredient_uuid
                     WHERE l.storage_uuid = ?1
                     ORDER BY i.name COLLATE UNICODE_NOCASE ASC, i.uuid ASC;",
                    &uuid_text,
                )?;
                storage_label(&names)
            }
            EntityKind::IngredientSupplier => {
                let ingredients = self.member_names(
                    "SELECT i.name
                     FROM ingredient_supplier_ingredients l
                     INNER JOIN ingredients i ON i.uuid = l.ingredient_uuid
                     WHERE l.link_uuid = ?1
                     ORDER BY i.name COLLATE UNICODE_NOCASE ASC, i.uuid ASC;",
                    &uuid_text,
                )?;
                let suppliers = self.member_names(
                    "SELECT s.legacy_name
                     FROM ingredient_supplier_suppliers l
                     INNER JOIN suppliers s ON s.uuid = l.supplier_uuid
                     WHERE l.link_uuid = ?1
                     ORDER BY s.legacy_name COLLATE UNICODE_NOCASE ASC, s.uuid ASC;",
                    &uuid_text,
                )?;
                ingredient_supplier_label(&ingredients, &suppliers)
            }
            EntityKind::User
            | EntityKind::Category
            | EntityKind::Product
            | EntityKind::Ingredient
            | EntityKind::Marker
            | EntityKind::Supplier => primary,
        };

        Ok(EntityLabel { uuid, label })
    }

    fn member_names(&self, sql: &str, owner_uuid: &str) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([owner_uuid])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get(0)?);
        }
        Ok(names)
    }
}

impl AdminRepository for SqliteAdminRepository<'_> {
    fn count(&self, entity: EntityKind) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", entity.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn get_label(&self, entity: EntityKind, id: Uuid) -> RepoResult<Option<String>> {
        let sql = format!("{} WHERE t.uuid = ?1;", label_select_sql(entity));
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.render(entity, row)?.label));
        }
        Ok(None)
    }

    fn list_labels(&self, entity: EntityKind, query: &ListQuery) -> RepoResult<Vec<EntityLabel>> {
        let order_by = match entity {
            EntityKind::Storage | EntityKind::IngredientSupplier => " ORDER BY t.uuid ASC",
            _ => " ORDER BY primary_name COLLATE UNICODE_NOCASE ASC, t.uuid ASC",
        };
        let mut sql = format!("{}{order_by}", label_select_sql(entity));
        let mut bind_values: Vec<Value> = Vec::new();
        push_page(&mut sql, &mut bind_values, query);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut labels = Vec::new();
        while let Some(row) = rows.next()? {
            labels.push(self.render(entity, row)?);
        }
        Ok(labels)
    }
}

/// Uniform projection `(uuid, primary_name, price, secondary_name)` with the
/// entity table aliased as `t`.
fn label_select_sql(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::User => {
            "SELECT t.uuid AS uuid, t.username AS primary_name,
                    NULL AS price, NULL AS secondary_name
             FROM users t"
        }
        EntityKind::Category => {
            "SELECT t.uuid AS uuid, t.name AS primary_name,
                    NULL AS price, NULL AS secondary_name
             FROM categories t"
        }
        EntityKind::Product => {
            "SELECT t.uuid AS uuid, t.name AS primary_name,
                    NULL AS price, NULL AS secondary_name
             FROM products t"
        }
        EntityKind::Ingredient => {
            "SELECT t.uuid AS uuid, t.name AS primary_name,
                    NULL AS price, NULL AS secondary_name
             FROM ingredients t"
        }
        EntityKind::Marker => {
            "SELECT t.uuid AS uuid, t.name AS primary_name,
                    NULL AS price, NULL AS secondary_name
             FROM markers t"
        }
        EntityKind::Supplier => {
            "SELECT t.uuid AS uuid, t.legacy_name AS primary_name,
                    NULL AS price, NULL AS secondary_name
             FROM suppliers t"
        }
        EntityKind::Recept => {
            "SELECT t.uuid AS uuid, p.name AS primary_name,
                    t.price AS price, NULL AS secondary_name
             FROM recepts t
             INNER JOIN products p ON p.uuid = t.product_uuid"
        }
        EntityKind::OrderRecept => {
            "SELECT t.uuid AS uuid, p.name AS primary_name,
                    NULL AS price, NULL AS secondary_name
             FROM order_recepts t
             INNER JOIN recepts r ON r.uuid = t.recept_uuid
             INNER JOIN products p ON p.uuid = r.product_uuid"
        }
        EntityKind::Order => {
            "SELECT t.uuid AS uuid, u.username AS primary_name,
                    NULL AS price, NULL AS secondary_name
             FROM orders t
             INNER JOIN users u ON u.uuid = t.user_uuid"
        }
        EntityKind::ReceptDetails => {
            "SELECT t.uuid AS uuid, p.name AS primary_name,
                    r.price AS price, i.name AS secondary_name
             FROM recept_details t
             INNER JOIN recepts r ON r.uuid = t.recept_uuid
             INNER JOIN products p ON p.uuid = r.product_uuid
             LEFT JOIN ingredients i ON i.uuid = t.ingredient_uuid"
        }
        EntityKind::Storage => {
            "SELECT t.uuid AS uuid, NULL AS primary_name,
                    NULL AS price, NULL AS secondary_name
             FROM storages t"
        }
        EntityKind::IngredientSupplier => {
            "SELECT t.uuid AS uuid, NULL AS primary_name,
                    NULL AS price, NULL AS secondary_name
             FROM ingredient_suppliers t"
        }
    }
}
