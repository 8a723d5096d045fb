//! Order use-case service.
//!
//! # Responsibility
//! - Register users and manage their orders.
//! - Link one receipt to an order.
//!
//! # Invariants
//! - New orders start as `OrderStatus::OnWay` unless a status is given.
//! - An order holds at most one receipt link; a second link is rejected
//!   before reaching SQL.
//! - Removing a receipt link never removes the order.

use crate::model::catalog::ReceptId;
use crate::model::entity::EntityKind;
use crate::model::order::{
    Order, OrderId, OrderRecept, OrderReceptId, OrderStatus, User, UserId,
};
use crate::repo::order_repo::{OrderListQuery, OrderRepository};
use crate::repo::{ListQuery, RepoError, RepoResult};
use crate::service::normalize_name;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for order use-cases.
#[derive(Debug)]
pub enum OrderServiceError {
    UserNotFound(UserId),
    /// Username is already registered.
    UsernameTaken,
    OrderNotFound(OrderId),
    OrderReceptNotFound(OrderReceptId),
    ReceptNotFound(ReceptId),
    /// Order already carries a receipt link.
    OrderAlreadyLinked(OrderId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for OrderServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::UsernameTaken => write!(f, "username already taken"),
            Self::OrderNotFound(id) => write!(f, "order not found: {id}"),
            Self::OrderReceptNotFound(id) => write!(f, "order receipt link not found: {id}"),
            Self::ReceptNotFound(id) => write!(f, "receipt not found: {id}"),
            Self::OrderAlreadyLinked(id) => write!(f, "order already has a receipt: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OrderServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for OrderServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: EntityKind::User,
                id,
            } => Self::UserNotFound(id),
            RepoError::NotFound {
                entity: EntityKind::Order,
                id,
            } => Self::OrderNotFound(id),
            RepoError::NotFound {
                entity: EntityKind::OrderRecept,
                id,
            } => Self::OrderReceptNotFound(id),
            RepoError::Conflict {
                entity: EntityKind::User,
                ..
            } => Self::UsernameTaken,
            other => Self::Repo(other),
        }
    }
}

/// Order service facade over repository implementations.
pub struct OrderService<R: OrderRepository> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn register_user(&self, username: &str) -> Result<User, OrderServiceError> {
        let user = User::new(normalize_name(username));
        let id = self.repo.create_user(&user)?;
        info!("event=user_create module=order status=ok user_uuid={id}");
        Ok(user)
    }

    pub fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.repo.get_user(id)
    }

    pub fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        self.repo.find_user_by_username(&normalize_name(username))
    }

    pub fn list_users(&self, query: &ListQuery) -> RepoResult<Vec<User>> {
        self.repo.list_users(query)
    }

    /// Deletes a user together with all of their orders.
    pub fn delete_user(&self, id: UserId) -> Result<(), OrderServiceError> {
        self.repo.delete_user(id)?;
        info!("event=user_delete module=order status=ok user_uuid={id}");
        Ok(())
    }

    /// Places a new order in the default `OnWay` state.
    pub fn place_order(&self, user_uuid: UserId) -> Result<Order, OrderServiceError> {
        self.create_order(user_uuid, OrderStatus::default())
    }

    pub fn create_order(
        &self,
        user_uuid: UserId,
        status: OrderStatus,
    ) -> Result<Order, OrderServiceError> {
        if self.repo.get_user(user_uuid)?.is_none() {
            return Err(OrderServiceError::UserNotFound(user_uuid));
        }
        let order = self
            .repo
            .create_order(user_uuid, status)
            .map_err(|err| match err {
                RepoError::MissingReference(_) => OrderServiceError::UserNotFound(user_uuid),
                other => other.into(),
            })?;
        info!(
            "event=order_create module=order status=ok order_uuid={} order_status={}",
            order.uuid,
            order.status.code()
        );
        Ok(order)
    }

    pub fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        self.repo.get_order(id)
    }

    pub fn list_orders(&self, query: &OrderListQuery) -> RepoResult<Vec<Order>> {
        self.repo.list_orders(query)
    }

    /// Sets the order status; the shipped timestamp is refreshed on every call.
    pub fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrderServiceError> {
        let order = self.repo.update_order_status(id, status)?;
        info!(
            "event=order_status module=order status=ok order_uuid={id} order_status={}",
            status.code()
        );
        Ok(order)
    }

    pub fn mark_arrived(&self, id: OrderId) -> Result<Order, OrderServiceError> {
        self.set_status(id, OrderStatus::Arrived)
    }

    /// Deletes an order together with its receipt link.
    pub fn delete_order(&self, id: OrderId) -> Result<(), OrderServiceError> {
        self.repo.delete_order(id)?;
        info!("event=order_delete module=order status=ok order_uuid={id}");
        Ok(())
    }

    /// Links a receipt to an order.
    pub fn attach_recept(
        &self,
        order_uuid: OrderId,
        recept_uuid: ReceptId,
    ) -> Result<OrderRecept, OrderServiceError> {
        if self.repo.get_order(order_uuid)?.is_none() {
            return Err(OrderServiceError::OrderNotFound(order_uuid));
        }
        if self.repo.find_order_recept_for_order(order_uuid)?.is_some() {
            return Err(OrderServiceError::OrderAlreadyLinked(order_uuid));
        }

        let link = OrderRecept::new(recept_uuid, order_uuid);
        self.repo
            .create_order_recept(&link)
            .map_err(|err| match err {
                // Order is resolved above; only the receipt can be missing.
                RepoError::MissingReference(_) => OrderServiceError::ReceptNotFound(recept_uuid),
                RepoError::Conflict { .. } => OrderServiceError::OrderAlreadyLinked(order_uuid),
                other => other.into(),
            })?;
        info!(
            "event=order_recept_create module=order status=ok order_recept_uuid={} order_uuid={order_uuid}",
            link.uuid
        );
        Ok(link)
    }

    pub fn get_order_recept(&self, id: OrderReceptId) -> RepoResult<Option<OrderRecept>> {
        self.repo.get_order_recept(id)
    }

    pub fn recept_link_for_order(&self, order_uuid: OrderId) -> RepoResult<Option<OrderRecept>> {
        self.repo.find_order_recept_for_order(order_uuid)
    }

    pub fn orders_for_recept(
        &self,
        recept_uuid: ReceptId,
        query: &ListQuery,
    ) -> RepoResult<Vec<OrderRecept>> {
        self.repo.list_order_recepts_for_recept(recept_uuid, query)
    }

    /// Removes one receipt link. The order stays.
    pub fn detach_recept(&self, id: OrderReceptId) -> Result<(), OrderServiceError> {
        self.repo.delete_order_recept(id)?;
        info!("event=order_recept_delete module=order status=ok order_recept_uuid={id}");
        Ok(())
    }
}
