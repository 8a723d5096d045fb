//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Normalize free-text names before validation.
//! - Keep the CLI decoupled from storage details.
//!
//! # Invariants
//! - Services log metadata only (`event`, `module`, `status`, ids), never
//!   names or other record contents.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod admin_service;
pub mod catalog_service;
pub mod inventory_service;
pub mod order_service;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Trims a name and collapses inner whitespace runs to one space.
pub fn normalize_name(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}
