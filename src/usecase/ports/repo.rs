use std::collections::BTreeMap;

use crate::domain::entities::entity::{Entity, EntityId, FieldValue};
use crate::domain::entities::schema::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    #[error("{0}")]
    Message(String),
    #[error("{kind} #{id} not found")]
    NotFound { kind: EntityKind, id: EntityId },
    #[error("{kind} #{id} already exists")]
    Duplicate { kind: EntityKind, id: EntityId },
}

impl From<anyhow::Error> for RepoError {
    fn from(err: anyhow::Error) -> Self {
        RepoError::Message(format!("{err:#}"))
    }
}

pub type Fields = BTreeMap<String, FieldValue>;

/// The data service: supplies fully materialized entity collections and
/// accepts create/update/delete requests keyed by id.
pub trait EntityRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    /// Entities of `kind` in insertion order.
    fn list(&self, kind: EntityKind) -> Result<Vec<Entity>, RepoError>;
    fn get(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Entity>, RepoError>;

    fn create(&self, kind: EntityKind, fields: Fields) -> Result<EntityId, RepoError>;
    fn update(&self, kind: EntityKind, id: &EntityId, fields: Fields) -> Result<(), RepoError>;
    fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), RepoError>;
    /// Unknown ids are skipped; returns how many entities were removed.
    fn delete_many(&self, kind: EntityKind, ids: &[EntityId]) -> Result<usize, RepoError>;
}
