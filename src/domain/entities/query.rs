use std::collections::{BTreeMap, BTreeSet};

use crate::domain::entities::entity::Entity;

pub const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(key: &str) -> Self {
        Self {
            key: key.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: &str) -> Self {
        Self {
            key: key.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Header click cycle: none → asc → desc → none. Clicking another column
/// starts over at asc.
pub fn next_sort(current: Option<&SortSpec>, key: &str) -> Option<SortSpec> {
    match current {
        Some(sort) if sort.key == key => match sort.direction {
            SortDirection::Asc => Some(SortSpec::desc(key)),
            SortDirection::Desc => None,
        },
        _ => Some(SortSpec::asc(key)),
    }
}

/// Search, filter, sort and page request for one table view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub search_text: String,
    pub filters: BTreeMap<String, BTreeSet<String>>,
    pub sort: Option<SortSpec>,
    /// 1-based.
    pub page_index: i64,
    pub page_size: i64,
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            page_index: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryDescriptor {
    pub fn with_search(mut self, text: &str) -> Self {
        self.search_text = text.to_string();
        self
    }

    pub fn with_filter<I, S>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .insert(field.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_page(mut self, page_index: i64, page_size: i64) -> Self {
        self.page_index = page_index;
        self.page_size = page_size;
        self
    }

    pub fn effective_page_size(&self) -> usize {
        usize::try_from(self.page_size.max(1)).unwrap_or(usize::MAX)
    }

    pub fn effective_page_index(&self) -> usize {
        usize::try_from(self.page_index.max(1)).unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub page: Vec<Entity>,
    pub total: usize,
    pub full: Vec<Entity>,
    pub page_size: usize,
}

impl QueryResult {
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }
}
