//! Record access used by the evaluator.
//!
//! The engine is generic over record shape: it only ever asks a record for
//! the attributes named by active rules and by the caller's search fields.

use crate::filter::FilterParseError;
use crate::filter::parser::{parse_date, parse_number};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// A scalar attribute value read from a record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Bool(bool),
}

impl FieldValue<'_> {
    /// Stringified form used by text comparisons and search
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        }
    }

    pub fn as_number(&self) -> Result<f64, FilterParseError> {
        match self {
            FieldValue::Number(n) if n.is_finite() => Ok(*n),
            FieldValue::Number(n) => Err(FilterParseError::NotANumber(n.to_string())),
            FieldValue::Text(s) => parse_number(s),
            FieldValue::Bool(b) => Err(FilterParseError::NotANumber(b.to_string())),
        }
    }

    pub fn as_date(&self) -> Result<NaiveDateTime, FilterParseError> {
        match self {
            FieldValue::Text(s) => parse_date(s),
            other => Err(FilterParseError::InvalidDate(other.to_text().into_owned())),
        }
    }
}

/// Anything the evaluator can read attributes from.
///
/// Returning `None` means the attribute is missing (or null), which every
/// predicate treats as "no match".
pub trait Record {
    fn field(&self, key: &str) -> Option<FieldValue<'_>>;
}

fn json_field(value: &Value) -> Option<FieldValue<'_>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(FieldValue::Text(Cow::Borrowed(s))),
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::Bool(b) => Some(FieldValue::Bool(*b)),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value)
                .ok()
                .map(|s| FieldValue::Text(Cow::Owned(s)))
        }
    }
}

impl Record for Map<String, Value> {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        self.get(key).and_then(json_field)
    }
}

impl Record for Value {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        self.as_object().and_then(|obj| obj.field(key))
    }
}

impl Record for HashMap<String, String> {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        self.get(key).map(|s| FieldValue::Text(Cow::Borrowed(s.as_str())))
    }
}

impl Record for BTreeMap<String, String> {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        self.get(key).map(|s| FieldValue::Text(Cow::Borrowed(s.as_str())))
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        (**self).field(key)
    }
}
