//! Structured JSON values with dot-path access, used for JSON feature variables.
use std::{fmt, sync::Arc};

use derive_more::From;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::{Error, ErrorHandler, LogLevel, Logger};

/// A JSON object. Keys keep their insertion order.
pub type JsonMap = IndexMap<String, JsonValue>;

/// A JSON value.
///
/// Every integer is stored as `i64`, whether it was parsed from a string or built in code.
/// Narrower integers are produced on request with a range check (see [`FromJsonValue`]).
/// Integers beyond `i64` are stored as [`JsonValue::Float`].
#[derive(Debug, Clone, PartialEq, From)]
pub enum JsonValue {
    /// A null value.
    #[from(ignore)]
    Null,
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    String(String),
    /// An array value.
    Array(Vec<JsonValue>),
    /// An object value, in insertion order.
    Object(JsonMap),
}

impl From<i32> for JsonValue {
    fn from(value: i32) -> Self {
        JsonValue::Integer(value.into())
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_owned())
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => JsonValue::Integer(i),
                None => n.as_f64().map_or(JsonValue::Null, JsonValue::Float),
            },
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(key, value)| (key, JsonValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::Bool(b) => serializer.serialize_bool(*b),
            JsonValue::Integer(i) => serializer.serialize_i64(*i),
            JsonValue::Float(f) => serializer.serialize_f64(*f),
            JsonValue::String(s) => serializer.serialize_str(s),
            JsonValue::Array(items) => items.serialize(serializer),
            JsonValue::Object(map) => map.serialize(serializer),
        }
    }
}

impl fmt::Display for JsonValue {
    /// Compact JSON, objects in insertion order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

/// Types a [`JsonValue`] can be read as.
///
/// | Type             | Accepts                                |
/// |------------------|----------------------------------------|
/// | `bool`           | `Bool`                                 |
/// | `i64`            | `Integer`                              |
/// | `i32`            | `Integer` within `i32` range           |
/// | `f64`            | `Float`, `Integer` (promoted)          |
/// | `String`         | `String`                               |
/// | `Vec<JsonValue>` | `Array`                                |
/// | `JsonMap`        | `Object`                               |
/// | `JsonValue`      | anything                               |
pub trait FromJsonValue: Sized {
    /// Name used in type mismatch reports.
    const TYPE_NAME: &'static str;

    /// Returns `None` if `value` cannot be read as `Self`.
    fn from_json_value(value: &JsonValue) -> Option<Self>;
}

impl FromJsonValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_json_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromJsonValue for i64 {
    const TYPE_NAME: &'static str = "i64";

    fn from_json_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromJsonValue for i32 {
    const TYPE_NAME: &'static str = "i32";

    fn from_json_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Integer(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromJsonValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn from_json_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Float(f) => Some(*f),
            JsonValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromJsonValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_json_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromJsonValue for Vec<JsonValue> {
    const TYPE_NAME: &'static str = "array";

    fn from_json_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Array(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl FromJsonValue for JsonMap {
    const TYPE_NAME: &'static str = "object";

    fn from_json_value(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(map) => Some(map.clone()),
            _ => None,
        }
    }
}

impl FromJsonValue for JsonValue {
    const TYPE_NAME: &'static str = "value";

    fn from_json_value(value: &JsonValue) -> Option<Self> {
        Some(value.clone())
    }
}

/// A JSON object with typed dot-path access.
///
/// Construction and lookups never fail. Problems are logged and reported to the error handler,
/// and the caller gets an empty object or `None`.
///
/// ```
/// # use std::sync::Arc;
/// # use optimizely::{NoOpErrorHandler, NoOpLogger, OptimizelyJson};
/// let json = OptimizelyJson::parse(
///     r#"{"field4": {"inner_field2": ["1", "2", 3]}}"#,
///     Arc::new(NoOpLogger),
///     Arc::new(NoOpErrorHandler),
/// );
/// assert_eq!(json.get_value::<i64>("field4.inner_field2.2"), Some(3));
/// ```
#[derive(Clone)]
pub struct OptimizelyJson {
    map: JsonMap,
    logger: Arc<dyn Logger>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl OptimizelyJson {
    /// Wrap an already parsed object.
    pub fn from_map(
        map: JsonMap,
        logger: Arc<dyn Logger>,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> OptimizelyJson {
        OptimizelyJson {
            map,
            logger,
            error_handler,
        }
    }

    /// Parse a JSON object. Anything else yields an empty object and an error report.
    pub fn parse(
        payload: &str,
        logger: Arc<dyn Logger>,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> OptimizelyJson {
        let map = match parse_map(payload) {
            Ok(map) => map,
            Err(reason) => {
                logger.log(
                    LogLevel::Error,
                    "Provided string could not be converted to map.",
                );
                error_handler.handle_error(&Error::InvalidJson(reason));
                JsonMap::new()
            }
        };
        OptimizelyJson::from_map(map, logger, error_handler)
    }

    /// The underlying object.
    pub fn to_map(&self) -> &JsonMap {
        &self.map
    }

    /// Read the value at `path` as `T`.
    ///
    /// `path` is a dot-separated list of object keys and array indices. An empty path addresses
    /// the whole object.
    pub fn get_value<T: FromJsonValue>(&self, path: &str) -> Option<T> {
        if path.is_empty() {
            return self.coerce(path, &JsonValue::Object(self.map.clone()));
        }

        let mut segments = path.split('.');
        let mut current = segments.next().and_then(|key| self.map.get(key));
        for segment in segments {
            current = current.and_then(|value| match value {
                JsonValue::Object(map) => map.get(segment),
                JsonValue::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index)),
                _ => None,
            });
        }

        match current {
            Some(value) => self.coerce(path, value),
            None => {
                self.logger
                    .log(LogLevel::Error, "Value for JSON key not found.");
                self.error_handler.handle_error(&Error::JsonPathNotFound {
                    path: path.to_owned(),
                });
                None
            }
        }
    }

    fn coerce<T: FromJsonValue>(&self, path: &str, value: &JsonValue) -> Option<T> {
        let result = T::from_json_value(value);
        if result.is_none() {
            self.logger.log(
                LogLevel::Error,
                "Value for path could not be assigned to provided type.",
            );
            self.error_handler.handle_error(&Error::JsonTypeMismatch {
                path: path.to_owned(),
                expected: T::TYPE_NAME,
            });
        }
        result
    }
}

/// Parse `payload` as a JSON object.
pub(crate) fn parse_map(payload: &str) -> Result<JsonMap, String> {
    match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(serde_json::Value::Object(map)) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, JsonValue::from(value)))
            .collect()),
        Ok(_) => Err("not a JSON object".to_owned()),
        Err(err) => Err(err.to_string()),
    }
}

impl PartialEq for OptimizelyJson {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl fmt::Debug for OptimizelyJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OptimizelyJson").field(&self.map).finish()
    }
}

impl fmt::Display for OptimizelyJson {
    /// Compact JSON, keys in insertion order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_string(&self.map).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}
