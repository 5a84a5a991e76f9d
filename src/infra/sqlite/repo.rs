use std::path::PathBuf;

use tracing::debug;

use crate::domain::entities::entity::{Entity, EntityId};
use crate::domain::entities::schema::EntityKind;
use crate::infra::sqlite::queries::{
    delete_entities, get_entity, insert_entity, list_entities, update_entity, InsertOutcome,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{EntityRepository, Fields, RepoError};

/// Local data service backed by a single SQLite file.
pub struct SqliteRepo {
    pub db_path: PathBuf,
}

impl SqliteRepo {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

impl EntityRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path)?;
        debug!(db = %self.db_path.display(), "sqlite schema ready");
        Ok(())
    }

    fn list(&self, kind: EntityKind) -> Result<Vec<Entity>, RepoError> {
        Ok(list_entities(&self.db_path, kind)?)
    }

    fn get(&self, kind: EntityKind, id: &EntityId) -> Result<Option<Entity>, RepoError> {
        Ok(get_entity(&self.db_path, kind, id)?)
    }

    fn create(&self, kind: EntityKind, fields: Fields) -> Result<EntityId, RepoError> {
        match insert_entity(&self.db_path, kind, fields)? {
            InsertOutcome::Inserted(id) => Ok(id),
            InsertOutcome::Duplicate(id) => Err(RepoError::Duplicate { kind, id }),
        }
    }

    fn update(&self, kind: EntityKind, id: &EntityId, fields: Fields) -> Result<(), RepoError> {
        if update_entity(&self.db_path, kind, id, fields)? {
            Ok(())
        } else {
            Err(RepoError::NotFound {
                kind,
                id: id.clone(),
            })
        }
    }

    fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), RepoError> {
        if delete_entities(&self.db_path, kind, std::slice::from_ref(id))? == 0 {
            return Err(RepoError::NotFound {
                kind,
                id: id.clone(),
            });
        }
        Ok(())
    }

    fn delete_many(&self, kind: EntityKind, ids: &[EntityId]) -> Result<usize, RepoError> {
        Ok(delete_entities(&self.db_path, kind, ids)?)
    }
}
