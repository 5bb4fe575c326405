use derive_more::Display;

/// Fatal errors that stop a [`DatafileIndex`](crate::DatafileIndex) from being built.
///
/// No partial index is ever returned alongside one of these.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigParseError {
    /// The datafile payload was absent.
    #[error("Unable to parse null datafile.")]
    NullPayload,

    /// The datafile payload was an empty string.
    #[error("Unable to parse empty datafile.")]
    EmptyPayload,

    /// The payload is not JSON, or does not have the shape of a datafile.
    #[error("Provided datafile is not in a valid JSON format: {0}")]
    MalformedJson(String),

    /// The payload declares a schema version this crate does not understand.
    #[error("This version of the Rust SDK does not support the given datafile version: {0}")]
    UnsupportedVersion(String),
}

/// Kind of datafile entity named in a [`Error::NotFound`] report.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum EntityKind {
    #[display("group")]
    Group,
    #[display("experiment")]
    Experiment,
    #[display("variation")]
    Variation,
    #[display("event")]
    Event,
    #[display("audience")]
    Audience,
    #[display("attribute")]
    Attribute,
    #[display("feature flag")]
    FeatureFlag,
    #[display("rollout")]
    Rollout,
}

/// Recoverable errors. These are never returned from lookups or decisions; they are reported
/// through the injected [`ErrorHandler`](crate::ErrorHandler) while the caller receives a usable
/// default.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A named entity lookup missed.
    #[error("Provided {kind} is not in datafile.")]
    NotFound {
        /// What was looked up.
        kind: EntityKind,
        /// The key or id that missed.
        identifier: String,
    },

    /// A string handed to [`OptimizelyJson`](crate::OptimizelyJson) is not a JSON object.
    #[error("Provided string could not be converted to map: {0}")]
    InvalidJson(String),

    /// A JSON path does not resolve to a value.
    #[error("no value found at JSON path \"{path}\"")]
    JsonPathNotFound {
        /// The requested dot-separated path.
        path: String,
    },

    /// A JSON path resolves, but not to a value of the requested type.
    #[error("value at JSON path \"{path}\" cannot be read as {expected}")]
    JsonTypeMismatch {
        /// The requested dot-separated path.
        path: String,
        /// Name of the requested type.
        expected: &'static str,
    },

    /// A feature variable's string-encoded value does not match its declared type.
    #[error("value \"{value}\" of feature variable \"{variable_key}\" is not a valid {variable_type}")]
    InvalidFeatureVariableValue {
        /// Key of the variable.
        variable_key: String,
        /// Declared type of the variable.
        variable_type: String,
        /// The offending value.
        value: String,
    },

    /// A refreshed datafile could not be built.
    #[error(transparent)]
    ConfigParse(#[from] ConfigParseError),
}
