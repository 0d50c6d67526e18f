//! Serializable descriptions of generators.
//!
//! A [`Schema`] is a finite tree of type tags that can be stored as JSON
//! and turned back into an equivalent generator of `serde_json::Value`s.
//! Descriptions that do not parse are rejected with
//! [`FuzzError::StructuralMismatch`].

use crate::data::Size;
use crate::error::{FuzzError, Result};
use crate::fuzz::{self, Erased, Field, Fuzz};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A generator description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Schema {
    /// Always the given value.
    Return {
        #[serde(default)]
        element: Value,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Float {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Boolean,
    String {
        /// Upper bound on the length.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<u32>,
    },
    Uuid,
    Any,
    Array {
        elements: Box<Schema>,
    },
    Tuple {
        elements: Vec<Schema>,
    },
    OneOf {
        elements: Vec<Schema>,
    },
    /// Shallow merge of object-like elements, later keys winning.
    Spread {
        elements: Vec<Schema>,
    },
    Object {
        elements: BTreeMap<String, Schema>,
    },
    Maybe {
        element: Box<Schema>,
    },
    Nullable {
        element: Box<Schema>,
    },
}

fn mismatch(message: impl Into<String>) -> FuzzError {
    FuzzError::StructuralMismatch {
        message: message.into(),
    }
}

fn float_value(x: f64) -> Value {
    serde_json::Number::from_f64(x)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn integer_fuzz(min: Option<i64>, max: Option<i64>) -> Fuzz<i64> {
    match (min, max) {
        (Some(min), Some(max)) => fuzz::integer_within(min, max),
        (Some(min), None) => fuzz::pos_integer().map(move |x| x.saturating_add(min)),
        (None, Some(max)) => fuzz::neg_integer().map(move |x| x.saturating_add(max)),
        (None, None) => fuzz::integer(),
    }
}

fn float_fuzz(min: Option<f64>, max: Option<f64>) -> Fuzz<f64> {
    match (min, max) {
        (Some(min), Some(max)) => fuzz::float_within(min, max),
        (Some(min), None) => fuzz::pos_float().map(move |x| x + min),
        (None, Some(max)) => fuzz::neg_float().map(move |x| x + max),
        (None, None) => fuzz::float(),
    }
}

fn number_fuzz(min: Option<f64>, max: Option<f64>) -> Fuzz<Erased, f64> {
    match (min, max) {
        (Some(min), Some(max)) => fuzz::number_within(min, max),
        (Some(min), None) => fuzz::pos_number().map(move |x| x + min),
        (None, Some(max)) => fuzz::neg_number().map(move |x| x + max),
        (None, None) => fuzz::number(),
    }
}

fn merge_objects(values: Vec<Value>) -> Value {
    let mut merged = serde_json::Map::new();
    for value in values {
        if let Value::Object(entries) = value {
            merged.extend(entries);
        }
    }
    Value::Object(merged)
}

impl Schema {
    /// Parse a description from JSON.
    pub fn from_json(json: &Value) -> Result<Schema> {
        Schema::deserialize(json).map_err(|error| mismatch(error.to_string()))
    }

    /// Parse a description from JSON text.
    pub fn from_json_str(text: &str) -> Result<Schema> {
        serde_json::from_str(text).map_err(|error| mismatch(error.to_string()))
    }

    pub fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|error| mismatch(error.to_string()))
    }

    /// Whether the values this describes are always JSON objects.
    fn is_object_like(&self) -> bool {
        match self {
            Schema::Object { .. } | Schema::Spread { .. } => true,
            Schema::Return { element } => element.is_object(),
            _ => false,
        }
    }

    /// Build an equivalent generator.
    pub fn to_fuzz(&self) -> Result<Fuzz<Erased, Value>> {
        let fuzz = match self {
            Schema::Return { element } => fuzz::constant(element.clone()).erase(),
            Schema::Number { min, max } => number_fuzz(*min, *max).map(float_value),
            Schema::Integer { min, max } => integer_fuzz(*min, *max).map(Value::from).erase(),
            Schema::Float { min, max } => float_fuzz(*min, *max).map(float_value).erase(),
            Schema::Boolean => fuzz::boolean().map(Value::Bool).erase(),
            Schema::String { max } => {
                let strings = match *max {
                    Some(max) => fuzz::string().scale(move |size| size.at_most(max)),
                    None => fuzz::string(),
                };
                strings.map(Value::String).erase()
            }
            Schema::Uuid => fuzz::uuid().map(Value::String).erase(),
            Schema::Any => any(),
            Schema::Array { elements } => fuzz::array(elements.to_fuzz()?).map(Value::Array).erase(),
            Schema::Tuple { elements } => {
                fuzz::sequence(Schema::all_to_fuzz(elements)?).map(Value::Array).erase()
            }
            Schema::OneOf { elements } => fuzz::one_of(Schema::all_to_fuzz(elements)?)?,
            Schema::Spread { elements } => {
                if let Some(bad) = elements.iter().find(|element| !element.is_object_like()) {
                    return Err(mismatch(format!("spread element is not an object: {bad:?}")));
                }
                fuzz::sequence(Schema::all_to_fuzz(elements)?).map(merge_objects).erase()
            }
            Schema::Object { elements } => {
                let mut fields = Vec::with_capacity(elements.len());
                for (key, element) in elements {
                    fields.push((key.clone(), Field::Generated(element.to_fuzz()?)));
                }
                fuzz::object(fields)
                    .map(|record| Value::Object(record.into_iter().collect()))
                    .erase()
            }
            Schema::Maybe { element } | Schema::Nullable { element } => element
                .to_fuzz()?
                .maybe(4)
                .map(|value| value.unwrap_or(Value::Null))
                .erase(),
        };

        Ok(fuzz)
    }

    fn all_to_fuzz(elements: &[Schema]) -> Result<Vec<Fuzz<Erased, Value>>> {
        elements.iter().map(Schema::to_fuzz).collect()
    }
}

/// Arbitrary JSON values, including nested arrays.
///
/// JSON has a single absence value, so this draws `null` and never a
/// separate "undefined".
pub fn any() -> Fuzz<Erased, Value> {
    fuzz::weighted(vec![
        (1, fuzz::integer().map(Value::from).erase()),
        (1, fuzz::float().map(float_value).erase()),
        (1, fuzz::boolean().map(Value::Bool).erase()),
        (1, fuzz::string().map(Value::String).erase()),
        (1, fuzz::uuid().map(Value::String).erase()),
        (
            1,
            fuzz::array(fuzz::lazy(any).scale(|size| Size::new(size.get() / 2)))
                .map(Value::Array)
                .erase(),
        ),
        (1, fuzz::constant(Value::Null).erase()),
    ])
}
