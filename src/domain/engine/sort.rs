use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::domain::entities::entity::{Entity, FieldValue};
use crate::domain::entities::query::{SortDirection, SortSpec};

enum SortKey {
    Number(f64),
    Instant(DateTime<Utc>),
    Text(String),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Instant(a), SortKey::Instant(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // Keys of one run share a mode; fall back to a fixed rank anyway.
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Instant(_) => 1,
            SortKey::Text(_) => 2,
        }
    }
}

#[derive(Clone, Copy)]
enum Mode {
    Numeric,
    Temporal,
    Text,
}

fn present(value: Option<&FieldValue>) -> Option<&FieldValue> {
    value.filter(|value| !value.is_null())
}

/// Numbers, and text such as `"3.50"` that parses as a finite number.
fn as_number(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::Number(v) => Some(*v),
        FieldValue::Text(v) => v.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Numeric when every present value reads as a number, temporal when every
/// present value is a date, text otherwise.
fn detect_mode(values: &[Option<&FieldValue>]) -> Mode {
    let present_values: Vec<&FieldValue> =
        values.iter().filter_map(|value| present(*value)).collect();
    if present_values.is_empty() {
        Mode::Text
    } else if present_values
        .iter()
        .all(|value| as_number(value).is_some())
    {
        Mode::Numeric
    } else if present_values
        .iter()
        .all(|value| matches!(value, FieldValue::Date(_)))
    {
        Mode::Temporal
    } else {
        Mode::Text
    }
}

fn sort_key(value: Option<&FieldValue>, mode: Mode) -> Option<SortKey> {
    let value = present(value)?;
    Some(match (mode, value) {
        (Mode::Temporal, FieldValue::Date(v)) => SortKey::Instant(*v),
        (Mode::Numeric, other) => match as_number(other) {
            Some(v) => SortKey::Number(v),
            None => SortKey::Text(other.display_text().to_lowercase()),
        },
        (_, other) => SortKey::Text(other.display_text().to_lowercase()),
    })
}

/// Stable sort. Missing values order before every present value, so they
/// lead in ascending order and trail in descending order.
pub fn apply_sort<'a>(entities: Vec<&'a Entity>, sort: &SortSpec) -> Vec<&'a Entity> {
    let values: Vec<Option<&FieldValue>> = entities
        .iter()
        .map(|entity| entity.lookup(&sort.key))
        .collect();
    let mode = detect_mode(&values);

    let mut keyed: Vec<(Option<SortKey>, &'a Entity)> = values
        .into_iter()
        .map(|value| sort_key(value, mode))
        .zip(entities.iter().copied())
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let ordering = compare_keys(a.as_ref(), b.as_ref());
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    keyed.into_iter().map(|(_, entity)| entity).collect()
}

fn compare_keys(a: Option<&SortKey>, b: Option<&SortKey>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b),
    }
}
