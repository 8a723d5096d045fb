//! Order records: users, orders and the order-to-receipt link.
//!
//! # Responsibility
//! - Define the external `User` reduced to identity + username.
//! - Define `Order` with its two-state delivery status.
//! - Define `OrderRecept`, the one-to-one link from an order to a receipt.
//!
//! # Invariants
//! - `Order::status` is always one of `OrderStatus` variants; the database
//!   mirrors this with a `CHECK` constraint.
//! - `created_at` never changes after insert; `shipped_at` is refreshed on
//!   every update of the order.
//! - One order has at most one `OrderRecept`.

use crate::model::catalog::ReceptId;
use crate::model::validation::{require_text, ValidationError, USERNAME_MAX_CHARS};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type OrderId = Uuid;
pub type OrderReceptId = Uuid;

/// Account that places orders. Owned by an external identity system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uuid: UserId,
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            username: username.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("user.username", &self.username, USERNAME_MAX_CHARS)
    }
}

/// Delivery status of an order.
///
/// Serialized with the stored short codes (`ONW`, `AR`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// On the way. Default for new orders.
    #[default]
    #[serde(rename = "ONW")]
    OnWay,
    /// Arrived at the destination.
    #[serde(rename = "AR")]
    Arrived,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 2] = [OrderStatus::OnWay, OrderStatus::Arrived];

    /// Short code persisted in `orders.status`.
    pub fn code(self) -> &'static str {
        match self {
            Self::OnWay => "ONW",
            Self::Arrived => "AR",
        }
    }

    /// Parses a persisted short code.
    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "ONW" => Some(Self::OnWay),
            "AR" => Some(Self::Arrived),
            _ => None,
        }
    }

    /// Human-readable label shown in admin choices.
    pub fn label(self) -> &'static str {
        match self {
            Self::OnWay => "В пути",
            Self::Arrived => "Прибыл",
        }
    }
}

/// Persisted order. Timestamps are epoch milliseconds set by storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub uuid: OrderId,
    pub user_uuid: UserId,
    pub created_at: i64,
    pub shipped_at: i64,
    pub status: OrderStatus,
}

/// Link from one order to the receipt it was placed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecept {
    pub uuid: OrderReceptId,
    pub recept_uuid: ReceptId,
    pub order_uuid: OrderId,
}

impl OrderRecept {
    pub fn new(recept_uuid: ReceptId, order_uuid: OrderId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            recept_uuid,
            order_uuid,
        }
    }
}

/// Admin label of an order: `"Order Receipt for {username}"`.
pub fn order_label(username: &str) -> String {
    format!("Order Receipt for {username}")
}

/// Admin label of an order link: `"Order Recept for {product}"`.
pub fn order_recept_label(product_name: &str) -> String {
    format!("Order Recept for {product_name}")
}
