//! Inventory repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs for ingredients, markers, suppliers, storage batches
//!   and ingredient/supplier groupings.
//! - Own many-to-many link replacement with atomic semantics.
//!
//! # Invariants
//! - Link sets are replaced as a whole inside one `IMMEDIATE` transaction.
//! - Link sets are returned sorted by member id.
//! - `received_at` is written once by the insert default; `expired_at` is
//!   written on insert and on every count update.
//! - Deleting an ingredient, marker or supplier removes only its link rows;
//!   storages and groupings that referenced it are kept.

use crate::model::entity::EntityKind;
use crate::model::inventory::{
    normalize_id_set, Ingredient, IngredientId, IngredientSupplier, IngredientSupplierId, Marker,
    MarkerId, NewStorage, Storage, StorageId, Supplier, SupplierId,
};
use crate::repo::{
    ensure_changed, ensure_connection_ready, map_write_error, parse_uuid, push_page, ListQuery,
    RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Transaction, TransactionBehavior};
use uuid::Uuid;

const REQUIRED_TABLES: &[&str] = &[
    "ingredients",
    "markers",
    "storages",
    "storage_ingredients",
    "storage_markers",
    "suppliers",
    "ingredient_suppliers",
    "ingredient_supplier_ingredients",
    "ingredient_supplier_suppliers",
];

/// Description of one many-to-many link table.
#[derive(Debug, Clone, Copy)]
struct LinkTable {
    table: &'static str,
    owner_column: &'static str,
    member_column: &'static str,
    owner: EntityKind,
}

const STORAGE_INGREDIENTS: LinkTable = LinkTable {
    table: "storage_ingredients",
    owner_column: "storage_uuid",
    member_column: "ingredient_uuid",
    owner: EntityKind::Storage,
};

const STORAGE_MARKERS: LinkTable = LinkTable {
    table: "storage_markers",
    owner_column: "storage_uuid",
    member_column: "marker_uuid",
    owner: EntityKind::Storage,
};

const GROUP_INGREDIENTS: LinkTable = LinkTable {
    table: "ingredient_supplier_ingredients",
    owner_column: "link_uuid",
    member_column: "ingredient_uuid",
    owner: EntityKind::IngredientSupplier,
};

const GROUP_SUPPLIERS: LinkTable = LinkTable {
    table: "ingredient_supplier_suppliers",
    owner_column: "link_uuid",
    member_column: "supplier_uuid",
    owner: EntityKind::IngredientSupplier,
};

/// Storage listing filter. Both filters combine with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageListQuery {
    pub ingredient_uuid: Option<IngredientId>,
    pub marker_uuid: Option<MarkerId>,
    pub page: ListQuery,
}

/// Ingredient/supplier grouping listing filter. Both filters combine with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngredientSupplierListQuery {
    pub ingredient_uuid: Option<IngredientId>,
    pub supplier_uuid: Option<SupplierId>,
    pub page: ListQuery,
}

/// Repository interface for inventory entities.
pub trait InventoryRepository {
    fn create_ingredient(&self, ingredient: &Ingredient) -> RepoResult<IngredientId>;
    fn get_ingredient(&self, id: IngredientId) -> RepoResult<Option<Ingredient>>;
    fn list_ingredients(&self, query: &ListQuery) -> RepoResult<Vec<Ingredient>>;
    fn update_ingredient(&self, ingredient: &Ingredient) -> RepoResult<()>;
    /// Deletes one ingredient, its link rows and receipt details using it.
    fn delete_ingredient(&self, id: IngredientId) -> RepoResult<()>;

    fn create_marker(&self, marker: &Marker) -> RepoResult<MarkerId>;
    fn get_marker(&self, id: MarkerId) -> RepoResult<Option<Marker>>;
    fn list_markers(&self, query: &ListQuery) -> RepoResult<Vec<Marker>>;
    fn update_marker(&self, marker: &Marker) -> RepoResult<()>;
    fn delete_marker(&self, id: MarkerId) -> RepoResult<()>;

    fn create_supplier(&self, supplier: &Supplier) -> RepoResult<SupplierId>;
    fn get_supplier(&self, id: SupplierId) -> RepoResult<Option<Supplier>>;
    fn list_suppliers(&self, query: &ListQuery) -> RepoResult<Vec<Supplier>>;
    fn update_supplier(&self, supplier: &Supplier) -> RepoResult<()>;
    fn delete_supplier(&self, id: SupplierId) -> RepoResult<()>;

    /// Inserts a storage batch with both link sets in one transaction.
    fn create_storage(&self, storage: &NewStorage) -> RepoResult<Storage>;
    fn get_storage(&self, id: StorageId) -> RepoResult<Option<Storage>>;
    /// Lists storage batches newest first: `received_at DESC, uuid ASC`.
    fn list_storages(&self, query: &StorageListQuery) -> RepoResult<Vec<Storage>>;
    /// Sets count and refreshes `expired_at`.
    fn update_storage_count(&self, id: StorageId, count: i64) -> RepoResult<Storage>;
    fn set_storage_ingredients(&self, id: StorageId, ingredients: &[IngredientId])
        -> RepoResult<Storage>;
    fn set_storage_markers(&self, id: StorageId, markers: &[MarkerId]) -> RepoResult<Storage>;
    fn delete_storage(&self, id: StorageId) -> RepoResult<()>;

    /// Inserts a grouping with both link sets in one transaction.
    fn create_ingredient_supplier(
        &self,
        ingredients: &[IngredientId],
        suppliers: &[SupplierId],
    ) -> RepoResult<IngredientSupplier>;
    fn get_ingredient_supplier(
        &self,
        id: IngredientSupplierId,
    ) -> RepoResult<Option<IngredientSupplier>>;
    /// Lists groupings ordered by id.
    fn list_ingredient_suppliers(
        &self,
        query: &IngredientSupplierListQuery,
    ) -> RepoResult<Vec<IngredientSupplier>>;
    fn set_ingredient_supplier_ingredients(
        &self,
        id: IngredientSupplierId,
        ingredients: &[IngredientId],
    ) -> RepoResult<IngredientSupplier>;
    fn set_ingredient_supplier_suppliers(
        &self,
        id: IngredientSupplierId,
        suppliers: &[SupplierId],
    ) -> RepoResult<IngredientSupplier>;
    fn delete_ingredient_supplier(&self, id: IngredientSupplierId) -> RepoResult<()>;
}

/// SQLite-backed inventory repository.
pub struct SqliteInventoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInventoryRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    fn load_required_storage(&self, id: StorageId) -> RepoResult<Storage> {
        self.get_storage(id)?.ok_or(RepoError::NotFound {
            entity: EntityKind::Storage,
            id,
        })
    }

    fn load_required_group(&self, id: IngredientSupplierId) -> RepoResult<IngredientSupplier> {
        self.get_ingredient_supplier(id)?
            .ok_or(RepoError::NotFound {
                entity: EntityKind::IngredientSupplier,
                id,
            })
    }

    fn replace_one_set(&self, link: LinkTable, owner_id: Uuid, members: &[Uuid]) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !row_exists(&tx, link.owner.table_name(), owner_id)? {
            return Err(RepoError::NotFound {
                entity: link.owner,
                id: owner_id,
            });
        }
        replace_links(&tx, link, owner_id, members)?;
        tx.commit()?;
        Ok(())
    }
}

impl InventoryRepository for SqliteInventoryRepository<'_> {
    fn create_ingredient(&self, ingredient: &Ingredient) -> RepoResult<IngredientId> {
        ingredient.validate()?;
        insert_named(
            self.conn,
            EntityKind::Ingredient,
            ingredient.uuid,
            &ingredient.name,
        )?;
        Ok(ingredient.uuid)
    }

    fn get_ingredient(&self, id: IngredientId) -> RepoResult<Option<Ingredient>> {
        Ok(get_named(self.conn, EntityKind::Ingredient, id)?
            .map(|(uuid, name)| Ingredient { uuid, name }))
    }

    fn list_ingredients(&self, query: &ListQuery) -> RepoResult<Vec<Ingredient>> {
        Ok(list_named(self.conn, EntityKind::Ingredient, query)?
            .into_iter()
            .map(|(uuid, name)| Ingredient { uuid, name })
            .collect())
    }

    fn update_ingredient(&self, ingredient: &Ingredient) -> RepoResult<()> {
        ingredient.validate()?;
        update_named(
            self.conn,
            EntityKind::Ingredient,
            ingredient.uuid,
            &ingredient.name,
        )
    }

    fn delete_ingredient(&self, id: IngredientId) -> RepoResult<()> {
        delete_row(self.conn, EntityKind::Ingredient, id)
    }

    fn create_marker(&self, marker: &Marker) -> RepoResult<MarkerId> {
        marker.validate()?;
        insert_named(self.conn, EntityKind::Marker, marker.uuid, &marker.name)?;
        Ok(marker.uuid)
    }

    fn get_marker(&self, id: MarkerId) -> RepoResult<Option<Marker>> {
        Ok(get_named(self.conn, EntityKind::Marker, id)?.map(|(uuid, name)| Marker { uuid, name }))
    }

    fn list_markers(&self, query: &ListQuery) -> RepoResult<Vec<Marker>> {
        Ok(list_named(self.conn, EntityKind::Marker, query)?
            .into_iter()
            .map(|(uuid, name)| Marker { uuid, name })
            .collect())
    }

    fn update_marker(&self, marker: &Marker) -> RepoResult<()> {
        marker.validate()?;
        update_named(self.conn, EntityKind::Marker, marker.uuid, &marker.name)
    }

    fn delete_marker(&self, id: MarkerId) -> RepoResult<()> {
        delete_row(self.conn, EntityKind::Marker, id)
    }

    fn create_supplier(&self, supplier: &Supplier) -> RepoResult<SupplierId> {
        supplier.validate()?;
        self.conn
            .execute(
                "INSERT INTO suppliers (uuid, legacy_name, brand_name, phone)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    supplier.uuid.to_string(),
                    supplier.legacy_name.as_str(),
                    supplier.brand_name.as_str(),
                    supplier.phone,
                ],
            )
            .map_err(|err| map_write_error(err, EntityKind::Supplier, "duplicate id"))?;
        Ok(supplier.uuid)
    }

    fn get_supplier(&self, id: SupplierId) -> RepoResult<Option<Supplier>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, legacy_name, brand_name, phone FROM suppliers WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_supplier_row(row)?));
        }
        Ok(None)
    }

    fn list_suppliers(&self, query: &ListQuery) -> RepoResult<Vec<Supplier>> {
        let mut sql = String::from(
            "SELECT uuid, legacy_name, brand_name, phone
             FROM suppliers
             ORDER BY legacy_name COLLATE UNICODE_NOCASE ASC, uuid ASC",
        );
        let mut bind_values = Vec::new();
        push_page(&mut sql, &mut bind_values, query);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut suppliers = Vec::new();
        while let Some(row) = rows.next()? {
            suppliers.push(parse_supplier_row(row)?);
        }
        Ok(suppliers)
    }

    fn update_supplier(&self, supplier: &Supplier) -> RepoResult<()> {
        supplier.validate()?;
        let changed = self.conn.execute(
            "UPDATE suppliers
             SET legacy_name = ?2, brand_name = ?3, phone = ?4
             WHERE uuid = ?1;",
            params![
                supplier.uuid.to_string(),
                supplier.legacy_name.as_str(),
                supplier.brand_name.as_str(),
                supplier.phone,
            ],
        )?;
        ensure_changed(changed, EntityKind::Supplier, supplier.uuid)
    }

    fn delete_supplier(&self, id: SupplierId) -> RepoResult<()> {
        delete_row(self.conn, EntityKind::Supplier, id)
    }

    fn create_storage(&self, storage: &NewStorage) -> RepoResult<Storage> {
        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO storages (uuid, count) VALUES (?1, ?2);",
            params![id.to_string(), storage.count],
        )
        .map_err(|err| map_write_error(err, EntityKind::Storage, "duplicate id"))?;
        replace_links(&tx, STORAGE_INGREDIENTS, id, &storage.ingredient_uuids)?;
        replace_links(&tx, STORAGE_MARKERS, id, &storage.marker_uuids)?;
        tx.commit()?;

        self.load_required_storage(id)
    }

    fn get_storage(&self, id: StorageId) -> RepoResult<Option<Storage>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, count, received_at, expired_at FROM storages WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let header = parse_storage_header(row)?;
            return Ok(Some(self.attach_storage_links(header)?));
        }
        Ok(None)
    }

    fn list_storages(&self, query: &StorageListQuery) -> RepoResult<Vec<Storage>> {
        let mut sql = String::from(
            "SELECT uuid, count, received_at, expired_at FROM storages s WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(ingredient_uuid) = query.ingredient_uuid {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1 FROM storage_ingredients si
                    WHERE si.storage_uuid = s.uuid AND si.ingredient_uuid = ?
                )",
            );
            bind_values.push(Value::Text(ingredient_uuid.to_string()));
        }
        if let Some(marker_uuid) = query.marker_uuid {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1 FROM storage_markers sm
                    WHERE sm.storage_uuid = s.uuid AND sm.marker_uuid = ?
                )",
            );
            bind_values.push(Value::Text(marker_uuid.to_string()));
        }
        sql.push_str(" ORDER BY received_at DESC, uuid ASC");
        push_page(&mut sql, &mut bind_values, &query.page);

        let mut headers = Vec::new();
        {
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            while let Some(row) = rows.next()? {
                headers.push(parse_storage_header(row)?);
            }
        }

        headers
            .into_iter()
            .map(|header| self.attach_storage_links(header))
            .collect()
    }

    fn update_storage_count(&self, id: StorageId, count: i64) -> RepoResult<Storage> {
        let changed = self.conn.execute(
            "UPDATE storages
             SET
                count = ?2,
                expired_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE uuid = ?1;",
            params![id.to_string(), count],
        )?;
        ensure_changed(changed, EntityKind::Storage, id)?;
        self.load_required_storage(id)
    }

    fn set_storage_ingredients(
        &self,
        id: StorageId,
        ingredients: &[IngredientId],
    ) -> RepoResult<Storage> {
        self.replace_one_set(STORAGE_INGREDIENTS, id, ingredients)?;
        self.load_required_storage(id)
    }

    fn set_storage_markers(&self, id: StorageId, markers: &[MarkerId]) -> RepoResult<Storage> {
        self.replace_one_set(STORAGE_MARKERS, id, markers)?;
        self.load_required_storage(id)
    }

    fn delete_storage(&self, id: StorageId) -> RepoResult<()> {
        delete_row(self.conn, EntityKind::Storage, id)
    }

    fn create_ingredient_supplier(
        &self,
        ingredients: &[IngredientId],
        suppliers: &[SupplierId],
    ) -> RepoResult<IngredientSupplier> {
        let id = Uuid::new_v4();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO ingredient_suppliers (uuid) VALUES (?1);",
            [id.to_string()],
        )
        .map_err(|err| map_write_error(err, EntityKind::IngredientSupplier, "duplicate id"))?;
        replace_links(&tx, GROUP_INGREDIENTS, id, ingredients)?;
        replace_links(&tx, GROUP_SUPPLIERS, id, suppliers)?;
        tx.commit()?;

        self.load_required_group(id)
    }

    fn get_ingredient_supplier(
        &self,
        id: IngredientSupplierId,
    ) -> RepoResult<Option<IngredientSupplier>> {
        if !row_exists(self.conn, EntityKind::IngredientSupplier.table_name(), id)? {
            return Ok(None);
        }
        Ok(Some(IngredientSupplier {
            uuid: id,
            ingredient_uuids: load_links(self.conn, GROUP_INGREDIENTS, id)?,
            supplier_uuids: load_links(self.conn, GROUP_SUPPLIERS, id)?,
        }))
    }

    fn list_ingredient_suppliers(
        &self,
        query: &IngredientSupplierListQuery,
    ) -> RepoResult<Vec<IngredientSupplier>> {
        let mut sql = String::from("SELECT uuid FROM ingredient_suppliers g WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(ingredient_uuid) = query.ingredient_uuid {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1 FROM ingredient_supplier_ingredients gi
                    WHERE gi.link_uuid = g.uuid AND gi.ingredient_uuid = ?
                )",
            );
            bind_values.push(Value::Text(ingredient_uuid.to_string()));
        }
        if let Some(supplier_uuid) = query.supplier_uuid {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1 FROM ingredient_supplier_suppliers gs
                    WHERE gs.link_uuid = g.uuid AND gs.supplier_uuid = ?
                )",
            );
            bind_values.push(Value::Text(supplier_uuid.to_string()));
        }
        sql.push_str(" ORDER BY uuid ASC");
        push_page(&mut sql, &mut bind_values, &query.page);

        let mut ids = Vec::new();
        {
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            while let Some(row) = rows.next()? {
                let uuid: String = row.get(0)?;
                ids.push(parse_uuid(&uuid, "ingredient_suppliers.uuid")?);
            }
        }

        ids.into_iter()
            .map(|id| -> RepoResult<IngredientSupplier> {
                Ok(IngredientSupplier {
                    uuid: id,
                    ingredient_uuids: load_links(self.conn, GROUP_INGREDIENTS, id)?,
                    supplier_uuids: load_links(self.conn, GROUP_SUPPLIERS, id)?,
                })
            })
            .collect()
    }

    fn set_ingredient_supplier_ingredients(
        &self,
        id: IngredientSupplierId,
        ingredients: &[IngredientId],
    ) -> RepoResult<IngredientSupplier> {
        self.replace_one_set(GROUP_INGREDIENTS, id, ingredients)?;
        self.load_required_group(id)
    }

    fn set_ingredient_supplier_suppliers(
        &self,
        id: IngredientSupplierId,
        suppliers: &[SupplierId],
    ) -> RepoResult<IngredientSupplier> {
        self.replace_one_set(GROUP_SUPPLIERS, id, suppliers)?;
        self.load_required_group(id)
    }

    fn delete_ingredient_supplier(&self, id: IngredientSupplierId) -> RepoResult<()> {
        delete_row(self.conn, EntityKind::IngredientSupplier, id)
    }
}

struct StorageHeader {
    uuid: StorageId,
    count: i64,
    received_at: i64,
    expired_at: i64,
}

impl SqliteInventoryRepository<'_> {
    fn attach_storage_links(&self, header: StorageHeader) -> RepoResult<Storage> {
        Ok(Storage {
            ingredient_uuids: load_links(self.conn, STORAGE_INGREDIENTS, header.uuid)?,
            marker_uuids: load_links(self.conn, STORAGE_MARKERS, header.uuid)?,
            uuid: header.uuid,
            count: header.count,
            received_at: header.received_at,
            expired_at: header.expired_at,
        })
    }
}

fn parse_storage_header(row: &rusqlite::Row<'_>) -> RepoResult<StorageHeader> {
    let uuid: String = row.get("uuid")?;
    Ok(StorageHeader {
        uuid: parse_uuid(&uuid, "storages.uuid")?,
        count: row.get("count")?,
        received_at: row.get("received_at")?,
        expired_at: row.get("expired_at")?,
    })
}

fn parse_supplier_row(row: &rusqlite::Row<'_>) -> RepoResult<Supplier> {
    let uuid: String = row.get("uuid")?;
    Ok(Supplier {
        uuid: parse_uuid(&uuid, "suppliers.uuid")?,
        legacy_name: row.get("legacy_name")?,
        brand_name: row.get("brand_name")?,
        phone: row.get("phone")?,
    })
}

fn insert_named(conn: &Connection, entity: EntityKind, id: Uuid, name: &str) -> RepoResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} (uuid, name) VALUES (?1, ?2);",
            entity.table_name()
        ),
        params![id.to_string(), name],
    )
    .map_err(|err| map_write_error(err, entity, "duplicate id"))?;
    Ok(())
}

fn get_named(conn: &Connection, entity: EntityKind, id: Uuid) -> RepoResult<Option<(Uuid, String)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT uuid, name FROM {} WHERE uuid = ?1;",
        entity.table_name()
    ))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        let uuid: String = row.get("uuid")?;
        return Ok(Some((parse_uuid(&uuid, "uuid")?, row.get("name")?)));
    }
    Ok(None)
}

fn list_named(
    conn: &Connection,
    entity: EntityKind,
    query: &ListQuery,
) -> RepoResult<Vec<(Uuid, String)>> {
    let mut sql = format!(
        "SELECT uuid, name FROM {} ORDER BY name COLLATE UNICODE_NOCASE ASC, uuid ASC",
        entity.table_name()
    );
    let mut bind_values = Vec::new();
    push_page(&mut sql, &mut bind_values, query);

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        let uuid: String = row.get("uuid")?;
        items.push((parse_uuid(&uuid, "uuid")?, row.get("name")?));
    }
    Ok(items)
}

fn update_named(conn: &Connection, entity: EntityKind, id: Uuid, name: &str) -> RepoResult<()> {
    let changed = conn.execute(
        &format!("UPDATE {} SET name = ?2 WHERE uuid = ?1;", entity.table_name()),
        params![id.to_string(), name],
    )?;
    ensure_changed(changed, entity, id)
}

fn delete_row(conn: &Connection, entity: EntityKind, id: Uuid) -> RepoResult<()> {
    let changed = conn.execute(
        &format!("DELETE FROM {} WHERE uuid = ?1;", entity.table_name()),
        [id.to_string()],
    )?;
    ensure_changed(changed, entity, id)
}

fn row_exists(conn: &Connection, table: &str, id: Uuid) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE uuid = ?1);"),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn replace_links(
    conn: &Connection,
    link: LinkTable,
    owner_id: Uuid,
    members: &[Uuid],
) -> RepoResult<()> {
    let owner_text = owner_id.to_string();
    conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1;",
            link.table, link.owner_column
        ),
        [owner_text.as_str()],
    )?;

    let insert_sql = format!(
        "INSERT INTO {} ({}, {}) VALUES (?1, ?2);",
        link.table, link.owner_column, link.member_column
    );
    for member in normalize_id_set(members) {
        conn.execute(&insert_sql, params![owner_text.as_str(), member.to_string()])
            .map_err(|err| map_write_error(err, link.owner, "duplicate link"))?;
    }
    Ok(())
}

fn load_links(conn: &Connection, link: LinkTable, owner_id: Uuid) -> RepoResult<Vec<Uuid>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {member} FROM {table} WHERE {owner} = ?1 ORDER BY {member} ASC;",
        member = link.member_column,
        table = link.table,
        owner = link.owner_column,
    ))?;
    let mut rows = stmt.query([owner_id.to_string()])?;
    let mut members = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        members.push(parse_uuid(&value, link.member_column)?);
    }
    Ok(members)
}
