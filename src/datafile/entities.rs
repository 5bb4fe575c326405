//! Entities of the datafile.
//!
//! Entities are deserialized straight from the payload. Fields marked `#[serde(skip)]` are derived
//! while the [`DatafileIndex`](super::DatafileIndex) is built and are never mutated afterwards.
//!
//! Every entity has a `Default` value standing for "not found"; lookups return it on a miss and
//! callers check [`is_empty()`](Experiment::is_empty) instead of branching on an error.
use std::{collections::HashMap, sync::Arc};

use serde::Deserialize;

use crate::audience::{ConditionTree, UserCondition};

/// Status of an experiment. Only running experiments take part in experiment decisions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[allow(missing_docs)]
pub enum ExperimentStatus {
    Running,
    Launched,
    Paused,
    #[default]
    #[serde(rename = "Not started")]
    NotStarted,
    Archived,
    #[serde(other)]
    Unknown,
}

/// One entry of a cumulative traffic-allocation table.
///
/// The entry covers bucket values below `end_of_range` that were not claimed by earlier entries.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TrafficAllocation {
    pub entity_id: String,
    pub end_of_range: u32,
}

/// Overrides the default value of a feature variable when the owning variation is served.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[allow(missing_docs)]
pub struct FeatureVariableUsage {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Variation {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub feature_enabled: Option<bool>,
    #[serde(default)]
    pub variables: Vec<FeatureVariableUsage>,
}

impl Variation {
    /// Returns `true` for the "not found" variation.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// A variation without an explicit `featureEnabled` flag does not enable its feature.
    pub fn is_feature_enabled(&self) -> bool {
        self.feature_enabled.unwrap_or(false)
    }

    /// Returns the override for variable `variable_id`, if this variation has one.
    pub fn get_variable_usage(&self, variable_id: &str) -> Option<&FeatureVariableUsage> {
        self.variables.iter().find(|usage| usage.id == variable_id)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Experiment {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub status: ExperimentStatus,
    #[serde(default)]
    pub layer_id: String,
    #[serde(default)]
    pub variations: Vec<Arc<Variation>>,
    #[serde(default)]
    pub traffic_allocation: Vec<TrafficAllocation>,
    #[serde(default)]
    pub audience_ids: Vec<String>,
    /// Raw `audienceConditions`, kept so that the expression can be compiled once.
    #[serde(default)]
    pub(crate) audience_conditions: Option<serde_json::Value>,
    /// Whitelist: user id → variation key.
    #[serde(default)]
    pub forced_variations: HashMap<String, String>,
    /// Set for experiments that belong to a mutually exclusive group.
    #[serde(default)]
    pub group_id: Option<String>,
    /// Compiled audience expression over audience ids. `None` means "no targeting".
    #[serde(skip)]
    pub(crate) audience_expression: Option<ConditionTree<String>>,
    #[serde(skip)]
    pub(crate) variation_key_map: HashMap<String, Arc<Variation>>,
    #[serde(skip)]
    pub(crate) variation_id_map: HashMap<String, Arc<Variation>>,
}

impl Experiment {
    /// Returns `true` for the "not found" experiment.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Only running experiments take part in decisions.
    pub fn is_running(&self) -> bool {
        self.status == ExperimentStatus::Running
    }

    /// Id of the owning group, if the experiment belongs to one.
    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref().filter(|id| !id.is_empty())
    }

    /// The audience expression this experiment is targeted with, if any.
    pub fn audience_expression(&self) -> Option<&ConditionTree<String>> {
        self.audience_expression.as_ref()
    }

    /// Variation of this experiment with key `key`.
    pub fn get_variation_by_key(&self, key: &str) -> Option<&Arc<Variation>> {
        self.variation_key_map.get(key)
    }

    /// Variation of this experiment with id `id`.
    pub fn get_variation_by_id(&self, id: &str) -> Option<&Arc<Variation>> {
        self.variation_id_map.get(id)
    }

    /// Derive lookup tables and the audience expression. Called once while building the index.
    pub(crate) fn compile(&mut self) {
        self.variation_key_map = self
            .variations
            .iter()
            .map(|v| (v.key.clone(), v.clone()))
            .collect();
        self.variation_id_map = self
            .variations
            .iter()
            .map(|v| (v.id.clone(), v.clone()))
            .collect();

        self.audience_expression = match &self.audience_conditions {
            Some(conditions) if is_empty_array(conditions) => None,
            Some(conditions) => Some(ConditionTree::from_json(conditions)),
            None if self.audience_ids.is_empty() => None,
            None => Some(ConditionTree::Or(
                self.audience_ids
                    .iter()
                    .cloned()
                    .map(ConditionTree::Leaf)
                    .collect(),
            )),
        };
    }
}

fn is_empty_array(value: &serde_json::Value) -> bool {
    value.as_array().is_some_and(Vec::is_empty)
}

/// A set of experiments sharing one bucketing space, so that a visitor is in at most one of them.
#[derive(Debug, Default, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct Group {
    pub id: String,
    pub policy: String,
    pub experiments: Vec<Arc<Experiment>>,
    /// Maps bucket ranges of the group space to member experiment ids.
    pub traffic_allocation: Vec<TrafficAllocation>,
}

impl Group {
    /// The only group policy that buckets visitors.
    pub const RANDOM_POLICY: &'static str = "random";

    /// Returns `true` for the "not found" group.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[allow(missing_docs)]
pub struct Audience {
    pub id: String,
    pub name: String,
    /// Raw conditions: a JSON-encoded string for legacy audiences, an inline tree for typed ones.
    pub conditions: serde_json::Value,
    #[serde(skip)]
    pub(crate) condition_tree: Option<ConditionTree<UserCondition>>,
}

impl Audience {
    /// Returns `true` for the "not found" audience.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// The compiled condition tree. `None` if the conditions could not be parsed.
    pub fn condition_tree(&self) -> Option<&ConditionTree<UserCondition>> {
        self.condition_tree.as_ref()
    }

    /// Conditions as they appear in log messages.
    pub(crate) fn conditions_display(&self) -> String {
        match &self.conditions {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub(crate) fn compile(&mut self) {
        let parsed = match &self.conditions {
            serde_json::Value::String(encoded) => serde_json::from_str(encoded),
            inline => Ok(inline.clone()),
        };
        self.condition_tree = parsed
            .map(|conditions| ConditionTree::from_json(&conditions))
            .ok();
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[allow(missing_docs)]
pub struct Attribute {
    pub id: String,
    pub key: String,
}

impl Attribute {
    /// Returns `true` for the "not found" attribute.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Event {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub experiment_ids: Vec<String>,
}

impl Event {
    /// Returns `true` for the "not found" event.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

/// Declared type of a feature variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[allow(missing_docs)]
pub enum FeatureVariableType {
    #[display("boolean")]
    Boolean,
    #[display("integer")]
    Integer,
    #[display("double")]
    Double,
    #[display("string")]
    String,
    #[display("json")]
    Json,
}

/// Declaration of a variable on a feature flag.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct FeatureVariable {
    pub id: String,
    pub key: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub sub_type: Option<String>,
    pub default_value: String,
}

impl FeatureVariable {
    /// Resolve the declared type. A `string` variable with sub-type `json` is a JSON variable.
    ///
    /// Returns `None` for types this crate does not know.
    pub fn variable_type(&self) -> Option<FeatureVariableType> {
        match (self.type_name.as_str(), self.sub_type.as_deref()) {
            ("string", Some("json")) | ("json", _) => Some(FeatureVariableType::Json),
            ("string", _) => Some(FeatureVariableType::String),
            ("boolean", _) => Some(FeatureVariableType::Boolean),
            ("integer", _) => Some(FeatureVariableType::Integer),
            ("double", _) => Some(FeatureVariableType::Double),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct FeatureFlag {
    pub id: String,
    pub key: String,
    /// Empty when the feature has no rollout.
    #[serde(default)]
    pub rollout_id: String,
    /// Experiments testing this feature, in evaluation order.
    #[serde(default)]
    pub experiment_ids: Vec<String>,
    #[serde(default)]
    pub variables: Vec<FeatureVariable>,
}

impl FeatureFlag {
    /// Returns `true` for the "not found" feature flag.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    /// Variable of this feature with key `key`.
    pub fn get_variable(&self, key: &str) -> Option<&FeatureVariable> {
        self.variables.iter().find(|variable| variable.key == key)
    }
}

/// An ordered chain of targeting rules. The last rule is the "Everyone Else" fallback.
#[derive(Debug, Default, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct Rollout {
    pub id: String,
    pub experiments: Vec<Arc<Experiment>>,
}

impl Rollout {
    /// Returns `true` for the "not found" rollout.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}
