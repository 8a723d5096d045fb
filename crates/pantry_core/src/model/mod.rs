//! Record types for the order/inventory schema.
//!
//! # Responsibility
//! - Define one record per persisted entity, mirroring table columns.
//! - Keep field-level validation next to the data it guards.
//! - Render admin listing labels for every entity.
//!
//! # Invariants
//! - Every record is identified by a stable UUID primary key.
//! - Relationships are expressed as referenced ids, never embedded records.
//! - Deletion is physical; dependents disappear through schema cascades.

pub mod catalog;
pub mod entity;
pub mod inventory;
pub mod order;
pub mod validation;
