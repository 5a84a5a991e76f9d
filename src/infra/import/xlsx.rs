use std::path::Path;

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use crate::domain::entities::entity::FieldValue;
use crate::infra::import::record_to_fields;
use crate::usecase::ports::repo::Fields;

pub fn cell_to_value(cell: &Data) -> FieldValue {
    match cell {
        Data::String(v) if v.trim().is_empty() => FieldValue::Null,
        Data::String(v) => FieldValue::Text(v.to_string()),
        Data::Float(v) => FieldValue::Number(*v),
        Data::Int(v) => FieldValue::Number(*v as f64),
        Data::Bool(v) => FieldValue::Bool(*v),
        Data::DateTime(v) => FieldValue::Text(v.to_string()),
        Data::DateTimeIso(v) => FieldValue::Text(v.to_string()),
        Data::DurationIso(v) => FieldValue::Text(v.to_string()),
        Data::Error(_) | Data::Empty => FieldValue::Null,
    }
}

fn cell_to_header(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.trim().to_string(),
        Data::Empty => String::new(),
        other => cell_to_value(other).display_text(),
    }
}

/// Reads the first worksheet; its first row names the fields.
pub fn read_xlsx_rows(xlsx_path: &Path) -> Result<Vec<Fields>> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open xlsx: {}", xlsx_path.display()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("workbook has no sheets: {}", xlsx_path.display()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = sheet_rows
        .next()
        .map(|row| row.iter().map(cell_to_header).collect())
        .unwrap_or_default();
    if headers.iter().all(|header| header.is_empty()) {
        anyhow::bail!("sheet {sheet_name} has no header row")
    }

    Ok(sheet_rows
        .filter_map(|row| record_to_fields(&headers, row.iter().map(cell_to_value).collect()))
        .collect())
}
