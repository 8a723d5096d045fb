//! Admin overview service.
//!
//! # Responsibility
//! - Report per-entity row counts in admin display order.
//! - Page through display labels of one entity.

use crate::model::entity::EntityKind;
use crate::repo::admin_repo::{AdminRepository, EntityCount, EntityLabel};
use crate::repo::{normalize_limit, ListQuery, RepoResult};
use uuid::Uuid;

/// Label page envelope used by service callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPage {
    pub entity: EntityKind,
    pub items: Vec<EntityLabel>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Admin service facade over repository implementations.
pub struct AdminService<R: AdminRepository> {
    repo: R,
}

impl<R: AdminRepository> AdminService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Counts rows of every entity, in `EntityKind::all()` order.
    pub fn entity_counts(&self) -> RepoResult<Vec<EntityCount>> {
        EntityKind::all()
            .iter()
            .map(|&entity| {
                Ok(EntityCount {
                    entity,
                    count: self.repo.count(entity)?,
                })
            })
            .collect()
    }

    pub fn label_of(&self, entity: EntityKind, id: Uuid) -> RepoResult<Option<String>> {
        self.repo.get_label(entity, id)
    }

    pub fn list_labels(
        &self,
        entity: EntityKind,
        limit: Option<u32>,
        offset: u32,
    ) -> RepoResult<LabelPage> {
        let applied_limit = normalize_limit(limit);
        let query = ListQuery {
            limit: Some(applied_limit),
            offset,
        };
        let items = self.repo.list_labels(entity, &query)?;
        Ok(LabelPage {
            entity,
            items,
            applied_limit,
        })
    }
}
