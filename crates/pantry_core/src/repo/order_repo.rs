//! Order repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for `users`, `orders` and `order_recepts`.
//! - Own auto-managed order timestamps.
//!
//! # Invariants
//! - `created_at` is written once by the insert default.
//! - `shipped_at` is written on insert and on every order update.
//! - `order_recepts.order_uuid` is unique: one receipt link per order.
//! - Orders list newest first: `created_at DESC, uuid ASC`.

use crate::model::catalog::ReceptId;
use crate::model::entity::EntityKind;
use crate::model::order::{
    Order, OrderId, OrderRecept, OrderReceptId, OrderStatus, User, UserId,
};
use crate::repo::{
    ensure_changed, ensure_connection_ready, map_write_error, parse_uuid, push_page, ListQuery,
    RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const REQUIRED_TABLES: &[&str] = &["users", "orders", "order_recepts"];

const ORDER_SELECT_SQL: &str = "SELECT
    uuid,
    user_uuid,
    created_at,
    shipped_at,
    status
FROM orders";

/// Order listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderListQuery {
    pub user_uuid: Option<UserId>,
    pub status: Option<OrderStatus>,
    pub page: ListQuery,
}

/// Repository interface for users, orders and order-receipt links.
pub trait OrderRepository {
    /// Creates one user; usernames are unique.
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Lists users ordered by username, then id.
    fn list_users(&self, query: &ListQuery) -> RepoResult<Vec<User>>;
    /// Deletes one user and, by cascade, all of their orders.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;

    /// Inserts a new order and returns the stored row with timestamps.
    fn create_order(&self, user_uuid: UserId, status: OrderStatus) -> RepoResult<Order>;
    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>>;
    fn list_orders(&self, query: &OrderListQuery) -> RepoResult<Vec<Order>>;
    /// Sets status and refreshes `shipped_at`, returning the stored row.
    fn update_order_status(&self, id: OrderId, status: OrderStatus) -> RepoResult<Order>;
    /// Deletes one order and, by cascade, its receipt link.
    fn delete_order(&self, id: OrderId) -> RepoResult<()>;

    fn create_order_recept(&self, link: &OrderRecept) -> RepoResult<OrderReceptId>;
    fn get_order_recept(&self, id: OrderReceptId) -> RepoResult<Option<OrderRecept>>;
    fn find_order_recept_for_order(&self, order_uuid: OrderId)
        -> RepoResult<Option<OrderRecept>>;
    /// Lists links pointing at one receipt, ordered by id.
    fn list_order_recepts_for_recept(
        &self,
        recept_uuid: ReceptId,
        query: &ListQuery,
    ) -> RepoResult<Vec<OrderRecept>>;
    /// Deletes one link. The order itself is kept.
    fn delete_order_recept(&self, id: OrderReceptId) -> RepoResult<()>;
}

/// SQLite-backed order repository.
pub struct SqliteOrderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrderRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, REQUIRED_TABLES)?;
        Ok(Self { conn })
    }

    fn load_required_order(&self, id: OrderId) -> RepoResult<Order> {
        self.get_order(id)?.ok_or(RepoError::NotFound {
            entity: EntityKind::Order,
            id,
        })
    }

    fn load_user(&self, key_column: &'static str, key: &str) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, username FROM users WHERE {key_column} = ?1;"
        ))?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn load_order_recept(
        &self,
        key_column: &'static str,
        key: &str,
    ) -> RepoResult<Option<OrderRecept>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, recept_uuid, order_uuid FROM order_recepts WHERE {key_column} = ?1;"
        ))?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_order_recept_row(row)?));
        }
        Ok(None)
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;
        self.conn
            .execute(
                "INSERT INTO users (uuid, username) VALUES (?1, ?2);",
                params![user.uuid.to_string(), user.username.as_str()],
            )
            .map_err(|err| map_write_error(err, EntityKind::User, "username already taken"))?;
        Ok(user.uuid)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.load_user("uuid", &id.to_string())
    }

    fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.load_user("username", username)
    }

    fn list_users(&self, query: &ListQuery) -> RepoResult<Vec<User>> {
        let mut sql = String::from(
            "SELECT uuid, username FROM users ORDER BY username COLLATE UNICODE_NOCASE ASC, uuid ASC",
        );
        let mut bind_values = Vec::new();
        push_page(&mut sql, &mut bind_values, query);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE uuid = ?1;", [id.to_string()])?;
        ensure_changed(changed, EntityKind::User, id)
    }

    fn create_order(&self, user_uuid: UserId, status: OrderStatus) -> RepoResult<Order> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO orders (uuid, user_uuid, status) VALUES (?1, ?2, ?3);",
                params![id.to_string(), user_uuid.to_string(), status.code()],
            )
            .map_err(|err| map_write_error(err, EntityKind::Order, "duplicate id"))?;
        self.load_required_order(id)
    }

    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ORDER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_order_row(row)?));
        }
        Ok(None)
    }

    fn list_orders(&self, query: &OrderListQuery) -> RepoResult<Vec<Order>> {
        let mut sql = format!("{ORDER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user_uuid) = query.user_uuid {
            sql.push_str(" AND user_uuid = ?");
            bind_values.push(Value::Text(user_uuid.to_string()));
        }
        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.code().to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC");
        push_page(&mut sql, &mut bind_values, &query.page);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut orders = Vec::new();
        while let Some(row) = rows.next()? {
            orders.push(parse_order_row(row)?);
        }
        Ok(orders)
    }

    fn update_order_status(&self, id: OrderId, status: OrderStatus) -> RepoResult<Order> {
        let changed = self.conn.execute(
            "UPDATE orders
             SET
                status = ?2,
                shipped_at = (CAST(unixepoch('subsec') * 1000 AS INTEGER))
             WHERE uuid = ?1;",
            params![id.to_string(), status.code()],
        )?;
        ensure_changed(changed, EntityKind::Order, id)?;
        self.load_required_order(id)
    }

    fn delete_order(&self, id: OrderId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM orders WHERE uuid = ?1;", [id.to_string()])?;
        ensure_changed(changed, EntityKind::Order, id)
    }

    fn create_order_recept(&self, link: &OrderRecept) -> RepoResult<OrderReceptId> {
        self.conn
            .execute(
                "INSERT INTO order_recepts (uuid, recept_uuid, order_uuid) VALUES (?1, ?2, ?3);",
                params![
                    link.uuid.to_string(),
                    link.recept_uuid.to_string(),
                    link.order_uuid.to_string(),
                ],
            )
            .map_err(|err| {
                map_write_error(err, EntityKind::OrderRecept, "order already has a receipt")
            })?;
        Ok(link.uuid)
    }

    fn get_order_recept(&self, id: OrderReceptId) -> RepoResult<Option<OrderRecept>> {
        self.load_order_recept("uuid", &id.to_string())
    }

    fn find_order_recept_for_order(
        &self,
        order_uuid: OrderId,
    ) -> RepoResult<Option<OrderRecept>> {
        self.load_order_recept("order_uuid", &order_uuid.to_string())
    }

    fn list_order_recepts_for_recept(
        &self,
        recept_uuid: ReceptId,
        query: &ListQuery,
    ) -> RepoResult<Vec<OrderRecept>> {
        let mut sql = String::from(
            "SELECT uuid, recept_uuid, order_uuid
             FROM order_recepts
             WHERE recept_uuid = ?
             ORDER BY uuid ASC",
        );
        let mut bind_values = vec![Value::Text(recept_uuid.to_string())];
        push_page(&mut sql, &mut bind_values, query);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(parse_order_recept_row(row)?);
        }
        Ok(links)
    }

    fn delete_order_recept(&self, id: OrderReceptId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM order_recepts WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        ensure_changed(changed, EntityKind::OrderRecept, id)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid: String = row.get("uuid")?;
    Ok(User {
        uuid: parse_uuid(&uuid, "users.uuid")?,
        username: row.get("username")?,
    })
}

fn parse_order_row(row: &Row<'_>) -> RepoResult<Order> {
    let uuid: String = row.get("uuid")?;
    let user_uuid: String = row.get("user_uuid")?;
    let status_text: String = row.get("status")?;
    let status = OrderStatus::from_code(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid order status `{status_text}` in orders.status"
        ))
    })?;

    Ok(Order {
        uuid: parse_uuid(&uuid, "orders.uuid")?,
        user_uuid: parse_uuid(&user_uuid, "orders.user_uuid")?,
        created_at: row.get("created_at")?,
        shipped_at: row.get("shipped_at")?,
        status,
    })
}

fn parse_order_recept_row(row: &Row<'_>) -> RepoResult<OrderRecept> {
    let uuid: String = row.get("uuid")?;
    let recept_uuid: String = row.get("recept_uuid")?;
    let order_uuid: String = row.get("order_uuid")?;
    Ok(OrderRecept {
        uuid: parse_uuid(&uuid, "order_recepts.uuid")?,
        recept_uuid: parse_uuid(&recept_uuid, "order_recepts.recept_uuid")?,
        order_uuid: parse_uuid(&order_uuid, "order_recepts.order_uuid")?,
    })
}
