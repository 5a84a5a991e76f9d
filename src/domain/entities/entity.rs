use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

pub const ID_FIELD: &str = "id";

/// A single field value of an entity record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
    List(Vec<FieldValue>),
    Object(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Text form used by search, text sorting and CSV cells.
    pub fn display_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(v) => v.to_string(),
            FieldValue::Number(v) => format_number(*v),
            FieldValue::Date(v) => v.to_rfc3339_opts(SecondsFormat::Secs, true),
            FieldValue::Text(v) => v.clone(),
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::display_text)
                .collect::<Vec<_>>()
                .join(","),
            FieldValue::Object(_) => self.to_json().to_string(),
        }
    }

    /// Normalized values used for column filter matching. Comma-joined
    /// text such as `"3,7,12"` yields one token per element.
    pub fn filter_tokens(&self) -> Vec<String> {
        match self {
            FieldValue::Null | FieldValue::Object(_) => Vec::new(),
            FieldValue::Text(v) => v
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
            FieldValue::List(items) => items.iter().flat_map(FieldValue::filter_tokens).collect(),
            other => vec![other.display_text()],
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(v) => Value::Bool(*v),
            FieldValue::Number(v) => {
                if is_integral(*v) {
                    Value::Number(Number::from(*v as i64))
                } else {
                    Number::from_f64(*v).map(Value::Number).unwrap_or(Value::Null)
                }
            }
            FieldValue::Date(v) => Value::String(v.to_rfc3339_opts(SecondsFormat::Secs, true)),
            FieldValue::Text(v) => Value::String(v.clone()),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }

    /// Converts untyped JSON. Strings stay text; date parsing is driven by
    /// the entity schema.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(v) => FieldValue::Bool(*v),
            Value::Number(v) => v.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
            Value::String(v) => FieldValue::Text(v.clone()),
            Value::Array(items) => FieldValue::List(items.iter().map(FieldValue::from_json).collect()),
            Value::Object(fields) => FieldValue::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), FieldValue::from_json(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15
}

pub fn format_number(value: f64) -> String {
    if is_integral(value) {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`. Naive values
/// are read as UTC.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Int(i64),
    Text(String),
}

impl EntityId {
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Number(v) if is_integral(*v) => Some(EntityId::Int(*v as i64)),
            FieldValue::Number(v) => Some(EntityId::Text(format_number(*v))),
            FieldValue::Text(v) if !v.trim().is_empty() => {
                let trimmed = v.trim();
                // Only canonical integers like "7" become numeric; "007" stays text.
                Some(match trimmed.parse::<i64>() {
                    Ok(parsed) if parsed.to_string() == trimmed => EntityId::Int(parsed),
                    _ => EntityId::Text(trimmed.to_string()),
                })
            }
            _ => None,
        }
    }

    pub fn to_value(&self) -> FieldValue {
        match self {
            EntityId::Int(v) => FieldValue::Number(*v as f64),
            EntityId::Text(v) => FieldValue::Text(v.clone()),
        }
    }

    /// Storage key; integer and text ids share one key space.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(v) => write!(f, "{v}"),
            EntityId::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Int(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

/// One domain record: an opaque mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    fields: BTreeMap<String, FieldValue>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn id(&self) -> Option<EntityId> {
        self.fields.get(ID_FIELD).and_then(EntityId::from_value)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Resolves a dotted path (`department.name`) through nested objects.
    pub fn lookup(&self, path: &str) -> Option<&FieldValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            match current {
                FieldValue::Object(fields) => current = fields.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn into_fields(self) -> BTreeMap<String, FieldValue> {
        self.fields
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Non-object values become an entity without fields.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self {
                fields: fields
                    .iter()
                    .map(|(name, value)| (name.clone(), FieldValue::from_json(value)))
                    .collect(),
            },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("entity collection must be a JSON array, found {found}")]
pub struct DataShapeError {
    pub found: &'static str,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Builds an entity collection from untyped JSON, parsing `date_fields`
/// into instants.
pub fn entities_from_json(value: &Value, date_fields: &[&str]) -> Result<Vec<Entity>, DataShapeError> {
    let Value::Array(items) = value else {
        return Err(DataShapeError {
            found: json_kind(value),
        });
    };
    Ok(items
        .iter()
        .map(|item| {
            let mut entity = Entity::from_json(item);
            coerce_dates(&mut entity, date_fields);
            entity
        })
        .collect())
}

pub fn coerce_dates(entity: &mut Entity, date_fields: &[&str]) {
    for field in date_fields {
        if let Some(FieldValue::Text(raw)) = entity.fields.get(*field) {
            if let Some(parsed) = parse_date(raw) {
                entity.fields.insert((*field).to_string(), FieldValue::Date(parsed));
            }
        }
    }
}
