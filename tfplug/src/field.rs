//! Tri-state attribute values
//!
//! Every attribute a resource carries is either known and set, known and
//! absent, or not yet known (plan time only). `Field<T>` makes that explicit
//! so provider code never confuses "the user cleared it" with "the remote
//! will decide".

use crate::error::{Result, TfplugError};
use crate::fields::is_exact_int;
use crate::types::{Dynamic, DynamicValue};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Set,
    Null,
    Unknown,
}

impl std::fmt::Display for FieldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldState::Set => write!(f, "set"),
            FieldState::Null => write!(f, "null"),
            FieldState::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    Set(T),
    #[default]
    Null,
    Unknown,
}

impl<T> Field<T> {
    pub fn state(&self) -> FieldState {
        match self {
            Field::Set(_) => FieldState::Set,
            Field::Null => FieldState::Null,
            Field::Unknown => FieldState::Unknown,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Field::Set(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Field::Unknown)
    }

    /// Value of a set field. `name` only feeds the error message.
    pub fn value(&self, name: &str) -> Result<&T> {
        match self {
            Field::Set(v) => Ok(v),
            other => Err(TfplugError::InvalidFieldState {
                name: name.to_string(),
                state: other.state().to_string(),
            }),
        }
    }

    pub fn into_value(self, name: &str) -> Result<T> {
        match self {
            Field::Set(v) => Ok(v),
            other => Err(TfplugError::InvalidFieldState {
                name: name.to_string(),
                state: other.state().to_string(),
            }),
        }
    }

    /// Set values only; null and unknown both read as None.
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Field::Set(v) => Some(v),
            _ => None,
        }
    }
}

/// Decoding of a Rust value from its `Dynamic` encoding
pub trait FieldValue: Sized {
    const TYPE_NAME: &'static str;

    fn from_dynamic(value: &Dynamic) -> Option<Self>;
}

impl FieldValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FieldValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldValue for i64 {
    const TYPE_NAME: &'static str = "number";

    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        value
            .as_number()
            .filter(|n| is_exact_int(*n))
            .map(|n| n as i64)
    }
}

impl FieldValue for BTreeSet<String> {
    const TYPE_NAME: &'static str = "set of string";

    fn from_dynamic(value: &Dynamic) -> Option<Self> {
        match value {
            Dynamic::List(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => None,
        }
    }
}

impl<T: FieldValue> Field<T> {
    pub fn from_dynamic(value: &Dynamic) -> Result<Self> {
        match value {
            Dynamic::Null => Ok(Field::Null),
            Dynamic::Unknown => Ok(Field::Unknown),
            other => T::from_dynamic(other)
                .map(Field::Set)
                .ok_or_else(|| TfplugError::TypeMismatch {
                    expected: T::TYPE_NAME.to_string(),
                    actual: other.type_name().to_string(),
                }),
        }
    }
}

impl DynamicValue {
    /// Reads a top-level attribute as a tri-state field. Missing attributes read as null.
    pub fn field<T: FieldValue>(&self, name: &str) -> Result<Field<T>> {
        match self.get(name) {
            Some(value) => Field::from_dynamic(value),
            None => Ok(Field::Null),
        }
    }
}
