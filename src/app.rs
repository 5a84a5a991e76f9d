use std::collections::BTreeSet;
use std::sync::Arc;

use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::engine::TableQueryEngine;
use crate::domain::entities::entity::{Entity, FieldValue};
use crate::domain::entities::query::{next_sort, QueryDescriptor, SortDirection};
use crate::domain::entities::schema::{EntityKind, EntitySchema};
use crate::domain::entities::selection::Selection;
use crate::infra::sqlite::repo::SqliteRepo;
use crate::platform::desktop::download::{RfdDownloader, RfdNotifier};
use crate::ui::state::app_state::{AppState, FormState};
use crate::usecase::ports::repo::EntityRepository;
use crate::usecase::services::edit_service::{EditError, EditService};
use crate::usecase::services::export_service::{columns_for, default_file_name, export_to_csv};
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::query_service::{distinct_tokens, QueryService};

const PAGE_SIZE_OPTIONS: [i64; 4] = [10, 20, 50, 100];
const ALL_OPTION_VALUE: &str = "";

fn load_entities(
    query_service: &QueryService,
    kind: EntityKind,
    mut entities: Signal<Vec<Entity>>,
    mut selection: Signal<Selection>,
    mut status: Signal<String>,
) {
    match query_service.list(kind) {
        Ok(loaded) => {
            selection.write().retain_existing(&loaded);
            entities.set(loaded);
        }
        Err(err) => {
            warn!(kind = kind.slug(), error = %err, "failed to load entities");
            entities.set(Vec::new());
            status.set(format!("Failed to load {kind}: {err}"));
        }
    }
}

fn field_label(schema: &EntitySchema, field: &str) -> String {
    schema
        .columns
        .iter()
        .find(|column| column.field == field)
        .map(|column| column.header.to_string())
        .unwrap_or_else(|| field.to_string())
}

fn sort_marker(descriptor: &QueryDescriptor, field: &str) -> &'static str {
    match &descriptor.sort {
        Some(sort) if sort.key == field => match sort.direction {
            SortDirection::Asc => " ▲",
            SortDirection::Desc => " ▼",
        },
        _ => "",
    }
}

fn confirm_dialog(title: &str, description: &str) -> bool {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::YesNo)
        .show()
        == MessageDialogResult::Yes
}

#[component]
pub fn App() -> Element {
    let config = match try_use_context::<AppConfig>() {
        Some(config) => config,
        None => match AppConfig::from_env() {
            Ok(config) => config,
            Err(err) => {
                return rsx! {
                    div {
                        p { "Unable to load configuration: {err}" }
                    }
                };
            }
        },
    };

    let AppState {
        mut kind,
        entities,
        mut search_input,
        mut query,
        mut selection,
        mut form,
        mut busy,
        mut status,
    } = AppState::new(config.page_size);

    let repo: Arc<dyn EntityRepository> = Arc::new(SqliteRepo::new(config.db_path.clone()));
    let query_service = Arc::new(QueryService::new(repo.clone()));
    let edit_service = Arc::new(EditService::new(repo.clone()));
    let import_service = Arc::new(ImportService::new(config.db_path.clone()));

    let reload = {
        let query_service = query_service.clone();
        move |target: EntityKind| load_entities(&query_service, target, entities, selection, status)
    };

    let repo_for_init = repo.clone();
    let reload_for_init = reload.clone();
    use_effect(move || {
        let current = kind();
        if let Err(err) = repo_for_init.init() {
            status.set(format!("Failed to open database: {err}"));
            return;
        }
        reload_for_init(current);
    });

    let current_kind = kind();
    let schema = current_kind.schema();
    let descriptor = query();
    let result = TableQueryEngine::for_schema(schema).evaluate(&entities.read(), &descriptor);
    let page_count = result.page_count().max(1);
    let current_page = descriptor.effective_page_index();
    let selected_count = selection.read().len();
    let all_selected = selection.read().is_all_selected(&result.page);

    let mut page_sizes = PAGE_SIZE_OPTIONS.to_vec();
    if !page_sizes.contains(&descriptor.page_size) {
        page_sizes.push(descriptor.page_size);
        page_sizes.sort_unstable();
    }

    let filter_options: Vec<(&'static str, Vec<String>)> = schema
        .filter_fields
        .iter()
        .map(|field| (*field, distinct_tokens(&entities.read(), field)))
        .collect();

    let total = result.total;
    let page_rows = result.page.clone();
    let export_rows = result.full.clone();

    let reload_for_import = reload.clone();
    let reload_for_bulk = reload.clone();
    let reload_for_form = reload.clone();
    let edit_service_for_bulk = edit_service.clone();
    let edit_service_for_form = edit_service.clone();

    rsx! {
        div {
            style: "font-family: sans-serif; padding: 12px; background: #fff; min-height: 100vh;",

            h2 { "Backoffice" }

            div {
                style: "display: flex; gap: 6px; flex-wrap: wrap; margin-bottom: 12px;",
                {EntityKind::ALL.into_iter().map(|tab| {
                    let active = tab == current_kind;
                    let slug = tab.slug();
                    let background = if active { "#eef4ff" } else { "#fff" };
                    rsx!(
                        button {
                            key: "{slug}",
                            style: "border: 1px solid #bbb; background: {background}; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                            disabled: busy(),
                            onclick: move |_| {
                                if kind() == tab {
                                    return;
                                }
                                let page_size = query.read().page_size;
                                query.set(QueryDescriptor::default().with_page(1, page_size));
                                search_input.set(String::new());
                                selection.write().clear();
                                form.set(None);
                                kind.set(tab);
                            },
                            "{tab}"
                        }
                    )
                })}
            }

            div {
                style: "display: flex; gap: 8px; align-items: center; margin-bottom: 12px; flex-wrap: wrap;",
                input {
                    placeholder: "Search",
                    value: search_input(),
                    oninput: move |event| search_input.set(event.value()),
                }
                button {
                    onclick: move |_| {
                        let text = search_input();
                        let mut descriptor = query.write();
                        descriptor.search_text = text;
                        descriptor.page_index = 1;
                    },
                    "Search"
                }
                {filter_options.into_iter().map(|(field, options)| {
                    let label = field_label(schema, field);
                    let current: Option<String> = descriptor
                        .filters
                        .get(field)
                        .and_then(|values| values.iter().next().cloned());
                    rsx!(
                        label {
                            key: "{field}",
                            style: "display: inline-flex; gap: 4px; align-items: center;",
                            span { "{label}" }
                            select {
                                onchange: move |event| {
                                    let value = event.value();
                                    let mut descriptor = query.write();
                                    if value == ALL_OPTION_VALUE {
                                        descriptor.filters.remove(field);
                                    } else {
                                        descriptor
                                            .filters
                                            .insert(field.to_string(), BTreeSet::from([value]));
                                    }
                                    descriptor.page_index = 1;
                                },
                                option { value: ALL_OPTION_VALUE, selected: current.is_none(), "All" }
                                {options.into_iter().map(|token| {
                                    let selected = current.as_deref() == Some(token.as_str());
                                    rsx!(option { value: "{token}", selected: selected, "{token}" })
                                })}
                            }
                        }
                    )
                })}
            }

            div {
                style: "display: flex; gap: 8px; align-items: center; margin-bottom: 12px;",
                button {
                    disabled: busy(),
                    onclick: move |_| form.set(Some(FormState::for_create(schema))),
                    "Add"
                }
                button {
                    disabled: busy() || selected_count == 0,
                    onclick: move |_| {
                        if !confirm_dialog(
                            "Delete selected",
                            &format!("Delete {selected_count} selected record(s)?"),
                        ) {
                            return;
                        }
                        let target = kind();
                        let outcome = edit_service_for_bulk.delete_selected(target, &mut selection.write());
                        match outcome {
                            Ok(removed) => status.set(format!("Deleted {removed} record(s)")),
                            Err(err) => status.set(format!("Delete failed: {err}")),
                        }
                        reload_for_bulk(target);
                    },
                    "Delete selected ({selected_count})"
                }
                button {
                    disabled: busy(),
                    onclick: {
                        let import_service = import_service.clone();
                        move |_| {
                            let Some(file_path) = FileDialog::new()
                                .add_filter("CSV", &["csv"])
                                .add_filter("Excel", &["xlsx"])
                                .pick_file()
                            else {
                                return;
                            };
                            *busy.write() = true;
                            let target = kind();
                            *status.write() = format!("Importing {}", file_path.display());
                            match import_service.import_file(target, &file_path) {
                                Ok(imported) => {
                                    *status.write() =
                                        format!("Imported {} {target} record(s)", imported.row_count());
                                }
                                Err(err) => {
                                    *status.write() = format!("Import failed: {err:#}");
                                }
                            }
                            reload_for_import(target);
                            *busy.write() = false;
                        }
                    },
                    "Import"
                }
                button {
                    disabled: busy(),
                    onclick: move |_| {
                        let target = kind();
                        let exported = export_to_csv(
                            &export_rows,
                            &columns_for(target.schema()),
                            &default_file_name(target),
                            &RfdDownloader,
                            &RfdNotifier,
                        );
                        if exported {
                            status.set(format!("Exported {} record(s)", export_rows.len()));
                        }
                    },
                    "Export CSV"
                }
                span { style: "color: #555;", "{status}" }
            }

            table {
                style: "border-collapse: collapse; width: 100%;",
                thead {
                    tr {
                        th {
                            style: "border-bottom: 1px solid #ccc; padding: 6px;",
                            input {
                                r#type: "checkbox",
                                checked: all_selected,
                                onclick: move |_| selection.write().toggle_page(&page_rows),
                            }
                        }
                        {schema.columns.iter().map(|column| {
                            let field = column.field;
                            let header = column.header;
                            let marker = sort_marker(&descriptor, field);
                            rsx!(
                                th {
                                    key: "{field}",
                                    style: "border-bottom: 1px solid #ccc; padding: 6px; text-align: left; cursor: pointer; user-select: none;",
                                    onclick: move |_| {
                                        let next = next_sort(query.read().sort.as_ref(), field);
                                        let mut descriptor = query.write();
                                        descriptor.sort = next;
                                        descriptor.page_index = 1;
                                    },
                                    "{header}{marker}"
                                }
                            )
                        })}
                        th { style: "border-bottom: 1px solid #ccc; padding: 6px;", "" }
                    }
                }
                tbody {
                    {result.page.iter().enumerate().map(|(idx, entity)| {
                        let id = entity.id();
                        let row_key = id.as_ref().map(|id| id.key()).unwrap_or_else(|| format!("row-{idx}"));
                        let checked = id.as_ref().is_some_and(|id| selection.read().contains(id));
                        let entity_for_edit = entity.clone();
                        rsx!(
                            tr {
                                key: "{row_key}",
                                td {
                                    style: "border-bottom: 1px solid #eee; padding: 6px;",
                                    if let Some(id) = id {
                                        input {
                                            r#type: "checkbox",
                                            checked: checked,
                                            onclick: move |_| selection.write().toggle(id.clone()),
                                        }
                                    }
                                }
                                {schema.columns.iter().map(|column| {
                                    let text = entity
                                        .lookup(column.field)
                                        .map(FieldValue::display_text)
                                        .unwrap_or_default();
                                    rsx!(td { style: "border-bottom: 1px solid #eee; padding: 6px;", "{text}" })
                                })}
                                td {
                                    style: "border-bottom: 1px solid #eee; padding: 6px;",
                                    button {
                                        disabled: busy(),
                                        onclick: move |_| form.set(Some(FormState::for_edit(schema, &entity_for_edit))),
                                        "Edit"
                                    }
                                }
                            }
                        )
                    })}
                }
            }

            if total == 0 {
                p { style: "color: #777;", "No records" }
            }

            div {
                style: "display: flex; gap: 8px; align-items: center; margin-top: 12px;",
                button {
                    disabled: current_page <= 1,
                    onclick: move |_| {
                        let mut descriptor = query.write();
                        descriptor.page_index = descriptor.page_index.saturating_sub(1).max(1);
                    },
                    "Previous"
                }
                span { "Page {current_page} of {page_count} ({total} records)" }
                button {
                    disabled: current_page >= page_count,
                    onclick: move |_| {
                        let next = i64::try_from(current_page.saturating_add(1)).unwrap_or(i64::MAX);
                        query.write().page_index = next;
                    },
                    "Next"
                }
                label { "Page size" }
                select {
                    onchange: move |event| {
                        if let Ok(size) = event.value().parse::<i64>() {
                            let mut descriptor = query.write();
                            descriptor.page_size = size;
                            descriptor.page_index = 1;
                        }
                    },
                    {page_sizes.into_iter().map(|size| {
                        let selected = size == descriptor.page_size;
                        rsx!(option { value: "{size}", selected: selected, "{size}" })
                    })}
                }
            }

            if let Some(current_form) = form() {
                div {
                    style: "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: 1000;",
                    div {
                        style: "background: #fff; border-radius: 8px; padding: 16px; min-width: 360px; max-height: 80vh; overflow-y: auto;",
                        h3 {
                            if let Some(id) = current_form.editing.as_ref() {
                                "Edit {current_kind} #{id}"
                            } else {
                                "New {current_kind}"
                            }
                        }
                        {current_form.inputs.iter().map(|(field, text)| {
                            let label = field_label(schema, field);
                            let required = schema.required_fields.contains(&field.as_str());
                            let error = current_form.error_for(field).map(str::to_string);
                            let field_for_input = field.clone();
                            rsx!(
                                div {
                                    key: "{field}",
                                    style: "display: flex; flex-direction: column; margin-bottom: 8px;",
                                    label {
                                        "{label}"
                                        if required { span { style: "color: #c00;", " *" } }
                                    }
                                    input {
                                        value: "{text}",
                                        oninput: move |event| {
                                            if let Some(state) = form.write().as_mut() {
                                                state.inputs.insert(field_for_input.clone(), event.value());
                                            }
                                        },
                                    }
                                    if let Some(message) = error {
                                        span { style: "color: #c00; font-size: 12px;", "{label} {message}" }
                                    }
                                }
                            )
                        })}
                        div {
                            style: "display: flex; gap: 8px; justify-content: flex-end; margin-top: 12px;",
                            if let Some(id) = current_form.editing.clone() {
                                button {
                                    onclick: {
                                        let edit_service = edit_service.clone();
                                        let reload = reload.clone();
                                        move |_| {
                                            if !confirm_dialog("Delete record", &format!("Delete {id}?")) {
                                                return;
                                            }
                                            let target = kind();
                                            match edit_service.delete(target, &id) {
                                                Ok(()) => {
                                                    form.set(None);
                                                    status.set(format!("Deleted {target} #{id}"));
                                                }
                                                Err(err) => status.set(format!("Delete failed: {err}")),
                                            }
                                            reload(target);
                                        }
                                    },
                                    "Delete"
                                }
                            }
                            button {
                                onclick: move |_| form.set(None),
                                "Cancel"
                            }
                            button {
                                onclick: move |_| {
                                    let Some(current) = form() else {
                                        return;
                                    };
                                    let target = kind();
                                    let fields = current.to_fields();
                                    let outcome = match &current.editing {
                                        Some(id) => edit_service_for_form
                                            .update(target, id, fields)
                                            .map(|()| format!("Updated {target} #{id}")),
                                        None => edit_service_for_form
                                            .create(target, fields)
                                            .map(|id| format!("Created {target} #{id}")),
                                    };
                                    match outcome {
                                        Ok(message) => {
                                            form.set(None);
                                            status.set(message);
                                            reload_for_form(target);
                                        }
                                        Err(EditError::Invalid(errors)) => {
                                            if let Some(state) = form.write().as_mut() {
                                                state.errors = errors;
                                            }
                                        }
                                        Err(err) => status.set(format!("Save failed: {err}")),
                                    }
                                },
                                "Save"
                            }
                        }
                    }
                }
            }
        }
    }
}
