use std::collections::BTreeMap;

use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::entity::{Entity, EntityId, FieldValue, ID_FIELD};
use crate::domain::entities::query::QueryDescriptor;
use crate::domain::entities::schema::{EntityKind, EntitySchema, FieldError};
use crate::domain::entities::selection::Selection;
use crate::infra::import::csv::cell_to_value;
use crate::usecase::ports::repo::Fields;

/// Add/edit form contents. `editing` is `None` for a new record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub editing: Option<EntityId>,
    pub inputs: BTreeMap<String, String>,
    pub errors: Vec<FieldError>,
}

impl FormState {
    pub fn for_create(schema: &EntitySchema) -> Self {
        let inputs = editable_fields(schema)
            .map(|field| (field.to_string(), String::new()))
            .collect();
        Self {
            editing: None,
            inputs,
            errors: Vec::new(),
        }
    }

    pub fn for_edit(schema: &EntitySchema, entity: &Entity) -> Self {
        let inputs = editable_fields(schema)
            .map(|field| {
                let text = entity.get(field).map(FieldValue::display_text).unwrap_or_default();
                (field.to_string(), text)
            })
            .collect();
        Self {
            editing: entity.id(),
            inputs,
            errors: Vec::new(),
        }
    }

    /// Blank inputs become `Null`; numeric text becomes a number.
    pub fn to_fields(&self) -> Fields {
        self.inputs
            .iter()
            .map(|(field, text)| (field.clone(), cell_to_value(text)))
            .collect()
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|err| err.field == field)
            .map(|err| err.message.as_str())
    }
}

fn editable_fields(schema: &EntitySchema) -> impl Iterator<Item = &'static str> + '_ {
    schema
        .columns
        .iter()
        .map(|column| column.field)
        .filter(|field| *field != ID_FIELD)
}

pub struct AppState {
    pub kind: Signal<EntityKind>,
    pub entities: Signal<Vec<Entity>>,
    pub search_input: Signal<String>,
    pub query: Signal<QueryDescriptor>,
    pub selection: Signal<Selection>,
    pub form: Signal<Option<FormState>>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new(page_size: i64) -> Self {
        Self {
            kind: use_signal(|| EntityKind::Domain),
            entities: use_signal(Vec::<Entity>::new),
            search_input: use_signal(String::new),
            query: use_signal(move || QueryDescriptor::default().with_page(1, page_size)),
            selection: use_signal(Selection::default),
            form: use_signal(|| None::<FormState>),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
        }
    }
}
