use std::collections::{BTreeMap, BTreeSet};

use crate::domain::entities::entity::Entity;

/// Fields AND together, accepted values within a field OR together. An
/// empty accepted set places no restriction on its field.
pub fn apply_filters<'a>(
    entities: Vec<&'a Entity>,
    filters: &BTreeMap<String, BTreeSet<String>>,
) -> Vec<&'a Entity> {
    let active: Vec<(&str, BTreeSet<&str>)> = filters
        .iter()
        .filter(|(_, accepted)| !accepted.is_empty())
        .map(|(field, accepted)| {
            (
                field.as_str(),
                accepted.iter().map(|value| value.trim()).collect(),
            )
        })
        .collect();

    if active.is_empty() {
        return entities;
    }

    entities
        .into_iter()
        .filter(|entity| {
            active
                .iter()
                .all(|(field, accepted)| matches_field(entity, field, accepted))
        })
        .collect()
}

fn matches_field(entity: &Entity, field: &str, accepted: &BTreeSet<&str>) -> bool {
    entity
        .lookup(field)
        .map(|value| {
            value
                .filter_tokens()
                .iter()
                .any(|token| accepted.contains(token.as_str()))
        })
        .unwrap_or(false)
}
