use std::collections::BTreeSet;

use crate::domain::entities::entity::{Entity, EntityId};

/// Rows ticked for a bulk action, keyed by entity id so the selection
/// survives re-sorting and paging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<EntityId>,
}

impl Selection {
    pub fn toggle(&mut self, id: EntityId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.selected.contains(id)
    }

    pub fn is_all_selected(&self, page: &[Entity]) -> bool {
        let mut ids = page.iter().filter_map(Entity::id).peekable();
        ids.peek().is_some() && ids.all(|id| self.selected.contains(&id))
    }

    /// Selects every row of `page`, or clears them when all are already
    /// selected.
    pub fn toggle_page(&mut self, page: &[Entity]) {
        if self.is_all_selected(page) {
            for id in page.iter().filter_map(Entity::id) {
                self.selected.remove(&id);
            }
        } else {
            self.selected.extend(page.iter().filter_map(Entity::id));
        }
    }

    pub fn retain_existing(&mut self, entities: &[Entity]) {
        let existing: BTreeSet<EntityId> = entities.iter().filter_map(Entity::id).collect();
        self.selected.retain(|id| existing.contains(id));
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.selected.iter().cloned().collect()
    }
}
