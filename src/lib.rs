//! The decision core of an Optimizely-style experimentation and feature flagging SDK.
//!
//! # Overview
//!
//! A JSON datafile describes a project's experiments, feature flags, rollouts and audiences. It is
//! indexed into an immutable [`DatafileIndex`], which is published through a [`ConfigStore`] and
//! shared by every decision taken against it.
//!
//! The [`DecisionService`] answers questions about a visitor (a user id plus
//! [`UserAttributes`]) against a snapshot: which variation of an experiment they see, whether a
//! feature is enabled for them, and what value each feature variable takes.
//!
//! Decisions are deterministic: a visitor's bucket is a MurmurHash3 of their bucketing id and the
//! experiment id, so every SDK sharing the datafile makes the same assignment.
//!
//! # Error Handling
//!
//! Lookups and decisions never fail. A miss yields an empty entity (or `None`), and the underlying
//! problem is reported as an [`Error`] to the injected [`ErrorHandler`]. Only building a
//! [`DatafileIndex`] returns an error, [`ConfigParseError`], in which case no snapshot exists.
//!
//! # Logging
//!
//! Decision messages go through the injected [`Logger`]. [`DefaultLogger`] forwards them to the
//! [`log`](https://docs.rs/log/latest/log/) crate under the `optimizely` target. Consider
//! integrating a `log`-compatible logger implementation for better visibility into decisions.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use optimizely::{
//!     ConfigStore, DecisionService, DefaultLogger, NoOpErrorHandler, UserAttributes,
//! };
//!
//! let datafile = std::fs::read_to_string("datafile.json").unwrap();
//! let logger = Arc::new(DefaultLogger);
//! let error_handler = Arc::new(NoOpErrorHandler);
//!
//! let store = ConfigStore::new();
//! store
//!     .update_from_datafile(&datafile, logger.clone(), error_handler.clone())
//!     .unwrap();
//!
//! let service = DecisionService::new(logger, error_handler);
//! let config = store.get_config().unwrap();
//! let enabled = service.is_feature_enabled(&config, "new_checkout", "user-1", &UserAttributes::new());
//! ```

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

mod attributes;
pub mod audience;
pub mod bucketer;
mod config_store;
pub mod datafile;
mod decision;
mod error;
mod error_handler;
mod json;
mod logger;

#[cfg(test)]
mod testing;

pub use attributes::{AttributeValue, UserAttributes};
pub use bucketer::{BucketHasher, Bucketer, Murmur3Hasher};
pub use config_store::ConfigStore;
pub use datafile::DatafileIndex;
pub use decision::{
    DecisionService, DecisionSource, FeatureDecision, FeatureVariableValue,
    BUCKETING_ID_ATTRIBUTE,
};
pub use error::{ConfigParseError, EntityKind, Error};
pub use error_handler::{ErrorHandler, NoOpErrorHandler};
pub use json::{FromJsonValue, JsonMap, JsonValue, OptimizelyJson};
pub use logger::{DefaultLogger, LogLevel, Logger, NoOpLogger};
