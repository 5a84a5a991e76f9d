use crate::domain::entities::entity::Entity;

/// Keeps entities where any searchable field contains `needle`,
/// case-insensitively. A blank needle keeps everything.
pub fn apply_search<'a>(
    entities: Vec<&'a Entity>,
    search_fields: &[String],
    needle: &str,
) -> Vec<&'a Entity> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return entities;
    }

    entities
        .into_iter()
        .filter(|entity| matches(entity, search_fields, &needle))
        .collect()
}

fn matches(entity: &Entity, search_fields: &[String], needle: &str) -> bool {
    if search_fields.is_empty() {
        return entity
            .fields()
            .values()
            .any(|value| value.display_text().to_lowercase().contains(needle));
    }

    search_fields.iter().any(|field| {
        entity
            .lookup(field)
            .map(|value| value.display_text().to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}
