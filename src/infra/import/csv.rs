use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::entity::{format_number, FieldValue};
use crate::infra::import::record_to_fields;
use crate::usecase::ports::repo::Fields;

/// Numbers are only recognized when they print back to the same text, so
/// values like `0912` or `3.50` stay text.
pub fn cell_to_value(cell: &str) -> FieldValue {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return FieldValue::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() && format_number(number) == trimmed => {
            FieldValue::Number(number)
        }
        _ => FieldValue::Text(cell.to_string()),
    }
}

pub fn read_csv_rows(csv_path: &Path) -> Result<Vec<Fields>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|header| header.trim().is_empty()) {
        anyhow::bail!("csv header is required")
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let values = record.iter().map(cell_to_value).collect();
        if let Some(fields) = record_to_fields(&headers, values) {
            rows.push(fields);
        }
    }

    Ok(rows)
}
