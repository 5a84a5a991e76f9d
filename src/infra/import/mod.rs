pub mod csv;
pub mod xlsx;

use crate::domain::entities::entity::FieldValue;
use crate::usecase::ports::repo::Fields;

/// Pairs a data row with the header row. Blank headers are dropped and a
/// row with no non-null value yields `None`.
pub fn record_to_fields(headers: &[String], values: Vec<FieldValue>) -> Option<Fields> {
    let fields: Fields = headers
        .iter()
        .zip(values.into_iter().chain(std::iter::repeat(FieldValue::Null)))
        .filter(|(header, _)| !header.trim().is_empty())
        .map(|(header, value)| (header.trim().to_string(), value))
        .collect();

    if fields.values().all(FieldValue::is_null) {
        None
    } else {
        Some(fields)
    }
}
