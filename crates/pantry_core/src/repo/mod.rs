//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate area.
//! - Isolate SQLite query details from service/business orchestration.
//! - Translate constraint failures into semantic errors.
//!
//! # Invariants
//! - Repository writes call record `validate()` before SQL mutations.
//! - Repository constructors reject connections whose schema is not at the
//!   latest migrated version.
//! - Multi-statement writes run inside one `IMMEDIATE` transaction.
//! - Listing order is deterministic for every query.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::entity::EntityKind;
use crate::model::validation::ValidationError;
use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod admin_repo;
pub mod catalog_repo;
pub mod inventory_repo;
pub mod order_repo;

const LIST_DEFAULT_LIMIT: u32 = 50;
const LIST_LIMIT_MAX: u32 = 500;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all persistence areas.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed field validation before reaching SQL.
    Validation(ValidationError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target row does not exist.
    NotFound { entity: EntityKind, id: Uuid },
    /// A write to `entity` referenced a row that does not exist.
    MissingReference(EntityKind),
    /// A uniqueness rule for `entity` would be violated.
    Conflict {
        entity: EntityKind,
        detail: &'static str,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => {
                write!(f, "{} not found: {id}", entity.verbose_name())
            }
            Self::MissingReference(entity) => write!(
                f,
                "{} references a row that does not exist",
                entity.verbose_name()
            ),
            Self::Conflict { entity, detail } => {
                write!(f, "{} conflict: {detail}", entity.verbose_name())
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination options shared by list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Maximum rows to return. Defaults to 50 and clamps to 500.
    pub limit: Option<u32>,
    /// Number of rows to skip.
    pub offset: u32,
}

/// Normalizes list limit according to the listing contract.
pub fn normalize_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => LIST_DEFAULT_LIMIT,
        Some(value) => value.min(LIST_LIMIT_MAX),
    }
}

pub(crate) fn push_page(sql: &mut String, bind_values: &mut Vec<Value>, query: &ListQuery) {
    sql.push_str(" LIMIT ? OFFSET ?");
    bind_values.push(Value::Integer(i64::from(normalize_limit(query.limit))));
    bind_values.push(Value::Integer(i64::from(query.offset)));
}

/// Maps constraint violations of one write into semantic errors.
///
/// Anything that is not a foreign-key or uniqueness failure is passed
/// through as a database error.
pub(crate) fn map_write_error(
    err: rusqlite::Error,
    entity: EntityKind,
    unique_detail: &'static str,
) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            match failure.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return RepoError::MissingReference(entity);
                }
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return RepoError::Conflict {
                        entity,
                        detail: unique_detail,
                    };
                }
                _ => {}
            }
        }
    }
    err.into()
}

pub(crate) fn ensure_changed(changed: usize, entity: EntityKind, id: Uuid) -> RepoResult<()> {
    if changed == 0 {
        return Err(RepoError::NotFound { entity, id });
    }
    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn ensure_connection_ready(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &table in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::normalize_limit;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 50);
        assert_eq!(normalize_limit(Some(7)), 7);
        assert_eq!(normalize_limit(Some(10_000)), 500);
    }
}
