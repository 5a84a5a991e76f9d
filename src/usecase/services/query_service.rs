use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::engine::TableQueryEngine;
use crate::domain::entities::entity::Entity;
use crate::domain::entities::query::{QueryDescriptor, QueryResult};
use crate::domain::entities::schema::EntityKind;
use crate::usecase::ports::repo::{EntityRepository, RepoError};

pub struct QueryService {
    repo: Arc<dyn EntityRepository>,
}

impl QueryService {
    pub fn new(repo: Arc<dyn EntityRepository>) -> Self {
        Self { repo }
    }

    pub fn list(&self, kind: EntityKind) -> Result<Vec<Entity>, RepoError> {
        self.repo.list(kind)
    }

    /// Fetches the whole collection and evaluates `descriptor` over it.
    pub fn query(&self, kind: EntityKind, descriptor: &QueryDescriptor) -> Result<QueryResult, RepoError> {
        let entities = self.repo.list(kind)?;
        debug!(kind = kind.slug(), fetched = entities.len(), "loaded collection");
        Ok(TableQueryEngine::for_schema(kind.schema()).evaluate(&entities, descriptor))
    }

    /// Distinct filter tokens of `field`, for the filter panel.
    pub fn filter_options(&self, kind: EntityKind, field: &str) -> Result<Vec<String>, RepoError> {
        let entities = self.repo.list(kind)?;
        Ok(distinct_tokens(&entities, field))
    }
}

pub fn distinct_tokens(entities: &[Entity], field: &str) -> Vec<String> {
    entities
        .iter()
        .filter_map(|entity| entity.lookup(field))
        .flat_map(|value| value.filter_tokens())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
