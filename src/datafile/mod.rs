//! The datafile: entity model and the indexed snapshot built from it.
mod entities;
mod index;

pub use entities::{
    Attribute, Audience, Event, Experiment, ExperimentStatus, FeatureFlag, FeatureVariable,
    FeatureVariableType, FeatureVariableUsage, Group, Rollout, TrafficAllocation, Variation,
};
pub use index::{DatafileIndex, RESERVED_ATTRIBUTES, RESERVED_ATTRIBUTE_PREFIX, SUPPORTED_VERSIONS};
