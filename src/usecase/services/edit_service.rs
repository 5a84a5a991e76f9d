use std::sync::Arc;

use tracing::info;

use crate::domain::entities::entity::EntityId;
use crate::domain::entities::schema::{EntityKind, FieldError};
use crate::domain::entities::selection::Selection;
use crate::usecase::ports::repo::{EntityRepository, Fields, RepoError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("invalid input: {}", format_field_errors(.0))]
    Invalid(Vec<FieldError>),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct EditService {
    repo: Arc<dyn EntityRepository>,
}

impl EditService {
    pub fn new(repo: Arc<dyn EntityRepository>) -> Self {
        Self { repo }
    }

    pub fn create(&self, kind: EntityKind, fields: Fields) -> Result<EntityId, EditError> {
        let schema = kind.schema();
        schema.validate(&fields).map_err(EditError::Invalid)?;
        let id = self.repo.create(kind, schema.normalize(fields))?;
        info!(kind = kind.slug(), %id, "created entity");
        Ok(id)
    }

    /// `fields` is merged over the stored record; validation runs on the
    /// merged result.
    pub fn update(&self, kind: EntityKind, id: &EntityId, fields: Fields) -> Result<(), EditError> {
        let schema = kind.schema();
        let existing = self.repo.get(kind, id)?.ok_or_else(|| RepoError::NotFound {
            kind,
            id: id.clone(),
        })?;
        let mut merged = existing.into_fields();
        merged.extend(fields.clone());
        schema.validate(&merged).map_err(EditError::Invalid)?;
        self.repo.update(kind, id, schema.normalize(fields))?;
        info!(kind = kind.slug(), %id, "updated entity");
        Ok(())
    }

    pub fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), EditError> {
        self.repo.delete(kind, id)?;
        info!(kind = kind.slug(), %id, "deleted entity");
        Ok(())
    }

    /// Deletes every selected entity and clears the selection.
    pub fn delete_selected(&self, kind: EntityKind, selection: &mut Selection) -> Result<usize, EditError> {
        if selection.is_empty() {
            return Ok(0);
        }
        let removed = self.repo.delete_many(kind, &selection.ids())?;
        info!(kind = kind.slug(), requested = selection.len(), removed, "bulk deleted entities");
        selection.clear();
        Ok(removed)
    }
}
