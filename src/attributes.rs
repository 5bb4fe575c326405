use std::collections::HashMap;

use derive_more::From;
use serde::{Deserialize, Serialize};

/// Visitor attributes, keyed by attribute key.
///
/// # Examples
/// ```
/// # use optimizely::{UserAttributes, AttributeValue};
/// let attributes = [
///     ("age".to_owned(), 30.into()),
///     ("is_premium_member".to_owned(), true.into()),
///     ("device_type".to_owned(), "iPhone".into()),
/// ].into_iter().collect::<UserAttributes>();
/// ```
pub type UserAttributes = HashMap<String, AttributeValue>;

/// Value of a single visitor attribute.
///
/// Integers are stored as [`AttributeValue::Number`]; audience matchers compare numbers as `f64`.
#[derive(Debug, Serialize, Deserialize, PartialEq, PartialOrd, From, Clone)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A string value.
    String(String),
    /// A numerical value.
    Number(f64),
    /// A boolean value.
    Boolean(bool),
    /// A null value or absence of value.
    #[from(ignore)]
    Null,
}

impl AttributeValue {
    /// Returns the string payload, if this is a string attribute.
    pub fn as_str(&self) -> Option<&str> {
        if let AttributeValue::String(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    /// Name of the value's type, as used in audience evaluation log messages.
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::String(_) => "string",
            AttributeValue::Number(_) => "number",
            AttributeValue::Boolean(_) => "boolean",
            AttributeValue::Null => "null",
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}
