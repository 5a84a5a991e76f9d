//! Client-side table pipeline: column filters, free-text search, stable
//! sort and pagination over a fully fetched entity collection.
//!
//! The engine is pure. It never mutates its input, keeps no state between
//! calls and returns the same result for the same input.

pub mod filter;
pub mod search;
pub mod sort;

use tracing::debug;

use crate::domain::entities::entity::Entity;
use crate::domain::entities::query::{QueryDescriptor, QueryResult};
use crate::domain::entities::schema::EntitySchema;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQueryEngine {
    search_fields: Vec<String>,
}

impl TableQueryEngine {
    /// An empty `search_fields` list searches every top-level field.
    pub fn new<I, S>(search_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            search_fields: search_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn for_schema(schema: &EntitySchema) -> Self {
        Self::new(schema.search_fields.iter().copied())
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn evaluate(&self, entities: &[Entity], descriptor: &QueryDescriptor) -> QueryResult {
        let rows: Vec<&Entity> = entities.iter().collect();
        let rows = filter::apply_filters(rows, &descriptor.filters);
        let rows = search::apply_search(rows, &self.search_fields, &descriptor.search_text);
        let rows = match &descriptor.sort {
            Some(sort) => sort::apply_sort(rows, sort),
            None => rows,
        };

        let page_size = descriptor.effective_page_size();
        let page_index = descriptor.effective_page_index();
        let total = rows.len();
        let start = (page_index - 1).saturating_mul(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);

        debug!(
            input = entities.len(),
            total,
            page_index,
            page_size,
            "evaluated table query"
        );

        QueryResult {
            page: rows[start..end].iter().map(|entity| (*entity).clone()).collect(),
            total,
            full: rows.into_iter().cloned().collect(),
            page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::entities::entity::{FieldValue, ID_FIELD};
    use crate::domain::entities::query::SortSpec;
    use crate::domain::entities::schema::EntityKind;

    fn sample() -> Vec<Entity> {
        vec![
            Entity::new().with("id", 1).with("name", "Alpha").with("status", "Active"),
            Entity::new().with("id", 2).with("name", "Beta").with("status", "Inactive"),
            Entity::new().with("id", 3).with("name", "Gamma").with("status", "Active"),
        ]
    }

    fn engine() -> TableQueryEngine {
        TableQueryEngine::new(["id", "name", "status"])
    }

    fn names(rows: &[Entity]) -> Vec<String> {
        rows.iter()
            .map(|row| row.get("name").map(FieldValue::display_text).unwrap_or_default())
            .collect()
    }

    fn ids(rows: &[Entity]) -> Vec<String> {
        rows.iter()
            .map(|row| row.get(ID_FIELD).map(FieldValue::display_text).unwrap_or_default())
            .collect()
    }

    #[test]
    fn filter_then_sort_returns_matching_page() {
        let descriptor = QueryDescriptor::default()
            .with_filter("status", ["Active"])
            .with_sort(SortSpec::asc("name"))
            .with_page(1, 10);

        let result = engine().evaluate(&sample(), &descriptor);

        assert_eq!(names(&result.page), vec!["Alpha", "Gamma"]);
        assert_eq!(result.total, 2);
    }

    #[test]
    fn search_matches_substring_case_insensitively() {
        let descriptor = QueryDescriptor::default().with_search("AMMA");

        let result = engine().evaluate(&sample(), &descriptor);

        assert_eq!(names(&result.page), vec!["Gamma"]);
        assert_eq!(result.total, 1);
    }

    #[test]
    fn second_page_of_size_one() {
        let descriptor = QueryDescriptor::default()
            .with_sort(SortSpec::asc("name"))
            .with_page(2, 1);

        let result = engine().evaluate(&sample(), &descriptor);

        assert_eq!(names(&result.page), vec!["Beta"]);
        assert_eq!(result.total, 3);
        assert_eq!(result.page_count(), 3);
    }

    #[test]
    fn empty_collection_yields_empty_result() {
        let descriptor = QueryDescriptor::default()
            .with_search("x")
            .with_filter("status", ["Active"])
            .with_sort(SortSpec::desc("name"));

        let result = engine().evaluate(&[], &descriptor);

        assert!(result.page.is_empty());
        assert!(result.full.is_empty());
        assert_eq!(result.total, 0);
        assert_eq!(result.page_count(), 0);
    }

    #[test]
    fn out_of_range_page_is_empty_but_keeps_total() {
        let descriptor = QueryDescriptor::default().with_page(99, 10);

        let result = engine().evaluate(&sample(), &descriptor);

        assert!(result.page.is_empty());
        assert_eq!(result.total, 3);
        assert_eq!(result.full.len(), 3);
    }

    #[test]
    fn non_positive_page_settings_are_clamped() {
        let descriptor = QueryDescriptor::default().with_page(0, 0);

        let result = engine().evaluate(&sample(), &descriptor);

        assert_eq!(ids(&result.page), vec!["1"]);
        assert_eq!(result.page_size, 1);

        let descriptor = QueryDescriptor::default().with_page(-4, -10);
        let result = engine().evaluate(&sample(), &descriptor);
        assert_eq!(ids(&result.page), vec!["1"]);
    }

    #[test]
    fn huge_page_index_does_not_overflow() {
        let descriptor = QueryDescriptor::default().with_page(i64::MAX, i64::MAX);

        let result = engine().evaluate(&sample(), &descriptor);

        assert!(result.page.is_empty());
        assert_eq!(result.total, 3);
    }

    #[test]
    fn comma_joined_values_match_any_element() {
        let rows = vec![
            Entity::new().with("id", 1).with("departmentIds", "3,7,12"),
            Entity::new().with("id", 2).with("departmentIds", "4"),
            Entity::new().with("id", 3).with("departmentIds", " 12 , 5"),
            Entity::new().with("id", 4),
        ];
        let descriptor = QueryDescriptor::default().with_filter("departmentIds", ["12"]);

        let result = engine().evaluate(&rows, &descriptor);

        assert_eq!(ids(&result.full), vec!["1", "3"]);
    }

    #[test]
    fn numeric_and_list_values_match_filters() {
        let rows = vec![
            Entity::new().with("id", 1).with("level", 3),
            Entity::new().with("id", 2).with(
                "level",
                FieldValue::List(vec![FieldValue::Number(1.0), FieldValue::Number(3.0)]),
            ),
            Entity::new().with("id", 3).with("level", 4.5),
        ];
        let descriptor = QueryDescriptor::default().with_filter("level", ["3", "4.5"]);

        let result = engine().evaluate(&rows, &descriptor);

        assert_eq!(ids(&result.full), vec!["1", "2", "3"]);
    }

    #[test]
    fn filter_fields_combine_with_and() {
        let rows = vec![
            Entity::new().with("id", 1).with("status", "Active").with("role", "admin"),
            Entity::new().with("id", 2).with("status", "Active").with("role", "staff"),
            Entity::new().with("id", 3).with("status", "Inactive").with("role", "admin"),
        ];
        let descriptor = QueryDescriptor::default()
            .with_filter("status", ["Active"])
            .with_filter("role", ["admin", "guest"]);

        let result = engine().evaluate(&rows, &descriptor);

        assert_eq!(ids(&result.full), vec!["1"]);
    }

    #[test]
    fn empty_filter_set_is_pass_through_but_unknown_field_excludes() {
        let descriptor = QueryDescriptor::default().with_filter("status", BTreeSet::<String>::new());
        assert_eq!(engine().evaluate(&sample(), &descriptor).total, 3);

        let descriptor = QueryDescriptor::default().with_filter("nope", ["Active"]);
        assert_eq!(engine().evaluate(&sample(), &descriptor).total, 0);
    }

    #[test]
    fn search_runs_within_filtered_rows() {
        let descriptor = QueryDescriptor::default()
            .with_filter("status", ["Inactive"])
            .with_search("a");

        let result = engine().evaluate(&sample(), &descriptor);

        assert_eq!(names(&result.full), vec!["Beta"]);
    }

    #[test]
    fn search_only_looks_at_searchable_fields() {
        let rows = vec![
            Entity::new().with("id", 1).with("name", "Alpha").with("note", "secret"),
            Entity::new().with("id", 22).with("name", "Beta"),
        ];

        let scoped = engine().evaluate(&rows, &QueryDescriptor::default().with_search("secret"));
        assert_eq!(scoped.total, 0);

        let by_id = engine().evaluate(&rows, &QueryDescriptor::default().with_search("22"));
        assert_eq!(names(&by_id.full), vec!["Beta"]);

        let everything = TableQueryEngine::default()
            .evaluate(&rows, &QueryDescriptor::default().with_search("SECRET"));
        assert_eq!(names(&everything.full), vec!["Alpha"]);
    }

    #[test]
    fn blank_search_is_pass_through() {
        let result = engine().evaluate(&sample(), &QueryDescriptor::default().with_search("   "));

        assert_eq!(result.total, 3);
    }

    #[test]
    fn numeric_sort_is_not_lexicographic() {
        let rows = vec![
            Entity::new().with("id", 1).with("price", 100),
            Entity::new().with("id", 2).with("price", 9),
            Entity::new().with("id", 3).with("price", 25.5),
        ];

        let asc = engine().evaluate(&rows, &QueryDescriptor::default().with_sort(SortSpec::asc("price")));
        assert_eq!(ids(&asc.full), vec!["2", "3", "1"]);

        let desc =
            engine().evaluate(&rows, &QueryDescriptor::default().with_sort(SortSpec::desc("price")));
        assert_eq!(ids(&desc.full), vec!["1", "3", "2"]);
    }

    #[test]
    fn numeric_text_sorts_with_numbers() {
        let rows = vec![
            Entity::new().with("id", 1).with("price", 9),
            Entity::new().with("id", 2).with("price", 100),
            Entity::new().with("id", 3).with("price", crate::infra::import::csv::cell_to_value("3.50")),
            Entity::new().with("id", 4).with("price", " 12 "),
        ];
        assert_eq!(rows[2].get("price"), Some(&FieldValue::text("3.50")));

        let asc = engine().evaluate(&rows, &QueryDescriptor::default().with_sort(SortSpec::asc("price")));
        assert_eq!(ids(&asc.full), vec!["3", "1", "4", "2"]);

        let desc =
            engine().evaluate(&rows, &QueryDescriptor::default().with_sort(SortSpec::desc("price")));
        assert_eq!(ids(&desc.full), vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn non_numeric_text_keeps_column_in_text_order() {
        let rows = vec![
            Entity::new().with("id", 1).with("code", 9),
            Entity::new().with("id", 2).with("code", "100"),
            Entity::new().with("id", 3).with("code", "B-2"),
        ];

        let asc = engine().evaluate(&rows, &QueryDescriptor::default().with_sort(SortSpec::asc("code")));
        assert_eq!(ids(&asc.full), vec!["2", "1", "3"]);
    }

    #[test]
    fn date_sort_compares_instants() {
        let schema = EntityKind::Task.schema();
        let rows = schema
            .entities_from_json(&serde_json::json!([
                {"id": 1, "title": "a", "dueDate": "2024-03-01T10:00:00+08:00"},
                {"id": 2, "title": "b", "dueDate": "2024-03-01"},
                {"id": 3, "title": "c", "dueDate": "2023-12-31 23:59:59"},
            ]))
            .expect("array should convert");

        let result = TableQueryEngine::for_schema(schema).evaluate(
            &rows,
            &QueryDescriptor::default().with_sort(SortSpec::asc("dueDate")),
        );

        assert_eq!(ids(&result.full), vec!["3", "2", "1"]);
    }

    #[test]
    fn text_sort_ignores_case() {
        let rows = vec![
            Entity::new().with("id", 1).with("name", "beta"),
            Entity::new().with("id", 2).with("name", "Alpha"),
            Entity::new().with("id", 3).with("name", "alpha2"),
        ];

        let result =
            engine().evaluate(&rows, &QueryDescriptor::default().with_sort(SortSpec::asc("name")));

        assert_eq!(ids(&result.full), vec!["2", "3", "1"]);
    }

    #[test]
    fn missing_values_lead_ascending_and_trail_descending() {
        let rows = vec![
            Entity::new().with("id", 1).with("rank", 2),
            Entity::new().with("id", 2),
            Entity::new().with("id", 3).with("rank", FieldValue::Null),
            Entity::new().with("id", 4).with("rank", -5),
        ];

        let asc = engine().evaluate(&rows, &QueryDescriptor::default().with_sort(SortSpec::asc("rank")));
        assert_eq!(ids(&asc.full), vec!["2", "3", "4", "1"]);

        let desc =
            engine().evaluate(&rows, &QueryDescriptor::default().with_sort(SortSpec::desc("rank")));
        assert_eq!(ids(&desc.full), vec!["1", "4", "2", "3"]);
    }

    #[test]
    fn sort_is_stable_for_ties_in_both_directions() {
        let rows = vec![
            Entity::new().with("id", 1).with("status", "Active"),
            Entity::new().with("id", 2).with("status", "Inactive"),
            Entity::new().with("id", 3).with("status", "active"),
            Entity::new().with("id", 4).with("status", "Inactive"),
        ];

        let asc =
            engine().evaluate(&rows, &QueryDescriptor::default().with_sort(SortSpec::asc("status")));
        assert_eq!(ids(&asc.full), vec!["1", "3", "2", "4"]);

        let desc =
            engine().evaluate(&rows, &QueryDescriptor::default().with_sort(SortSpec::desc("status")));
        assert_eq!(ids(&desc.full), vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn nested_paths_are_searchable_and_sortable() {
        let rows = vec![
            Entity::new().with("id", 1).with(
                "department",
                FieldValue::Object([("name".to_string(), FieldValue::text("Sales"))].into()),
            ),
            Entity::new().with("id", 2).with(
                "department",
                FieldValue::Object([("name".to_string(), FieldValue::text("Finance"))].into()),
            ),
        ];
        let engine = TableQueryEngine::new(["department.name"]);

        let searched = engine.evaluate(&rows, &QueryDescriptor::default().with_search("sal"));
        assert_eq!(ids(&searched.full), vec!["1"]);

        let sorted = engine.evaluate(
            &rows,
            &QueryDescriptor::default().with_sort(SortSpec::asc("department.name")),
        );
        assert_eq!(ids(&sorted.full), vec!["2", "1"]);
    }

    #[test]
    fn input_is_left_untouched() {
        let rows = sample();
        let snapshot = rows.clone();

        let _ = engine().evaluate(
            &rows,
            &QueryDescriptor::default()
                .with_sort(SortSpec::desc("name"))
                .with_filter("status", ["Active"]),
        );

        assert_eq!(rows, snapshot);
    }
}
