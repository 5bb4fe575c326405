use std::{collections::HashMap, sync::Arc};

use serde::Deserialize;

use super::entities::{
    Attribute, Audience, Event, Experiment, FeatureFlag, Group, Rollout, TrafficAllocation,
    Variation,
};
use crate::{
    error::{ConfigParseError, EntityKind},
    Error, ErrorHandler, LogLevel, Logger,
};

/// Datafile schema versions this crate can read.
pub const SUPPORTED_VERSIONS: [&str; 3] = ["2", "3", "4"];

/// Prefix of attribute keys reserved for SDK use.
pub const RESERVED_ATTRIBUTE_PREFIX: &str = "$opt_";

/// Reserved attribute keys. These are sent as-is instead of being mapped to attribute ids.
pub const RESERVED_ATTRIBUTES: [&str; 4] = [
    "$opt_bot_filtering",
    "$opt_user_agent",
    "$opt_bucketing_id",
    "$opt_event_type",
];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatafileWire {
    version: String,
    #[serde(default)]
    account_id: String,
    #[serde(default)]
    project_id: String,
    #[serde(default)]
    revision: String,
    #[serde(default)]
    bot_filtering: Option<bool>,
    #[serde(default, rename = "anonymizeIP")]
    anonymize_ip: bool,
    #[serde(default)]
    sdk_key: Option<String>,
    #[serde(default)]
    environment_key: Option<String>,
    #[serde(default)]
    send_flag_decisions: bool,
    #[serde(default)]
    groups: Vec<GroupWire>,
    #[serde(default)]
    experiments: Vec<Experiment>,
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    attributes: Vec<Attribute>,
    #[serde(default)]
    audiences: Vec<Audience>,
    #[serde(default)]
    typed_audiences: Vec<Audience>,
    #[serde(default)]
    feature_flags: Vec<FeatureFlag>,
    #[serde(default)]
    rollouts: Vec<RolloutWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupWire {
    id: String,
    policy: String,
    #[serde(default)]
    experiments: Vec<Experiment>,
    #[serde(default)]
    traffic_allocation: Vec<TrafficAllocation>,
}

#[derive(Deserialize)]
struct RolloutWire {
    id: String,
    #[serde(default)]
    experiments: Vec<Experiment>,
}

/// An immutable, indexed snapshot of one datafile revision.
///
/// Every entity is reachable by key and by id; both maps share one `Arc` per entity. Lookups
/// never fail: a miss returns an empty entity (check `is_empty()`), logs one ERROR line, and
/// reports [`Error::NotFound`] to the error handler.
///
/// A new datafile revision is a new `DatafileIndex`. Publish it through
/// [`ConfigStore`](crate::ConfigStore).
pub struct DatafileIndex {
    datafile: String,

    version: String,
    account_id: String,
    project_id: String,
    revision: String,
    bot_filtering: Option<bool>,
    anonymize_ip: bool,
    sdk_key: Option<String>,
    environment_key: Option<String>,
    send_flag_decisions: bool,

    group_id_map: HashMap<String, Arc<Group>>,
    experiment_key_map: HashMap<String, Arc<Experiment>>,
    experiment_id_map: HashMap<String, Arc<Experiment>>,
    /// Experiment key → variation key → variation. Includes rollout rules.
    variation_key_map: HashMap<String, HashMap<String, Arc<Variation>>>,
    /// Experiment key → variation id → variation. Includes rollout rules.
    variation_id_map: HashMap<String, HashMap<String, Arc<Variation>>>,
    /// Experiment id → variation id → variation. Includes rollout rules.
    variation_id_map_by_experiment_id: HashMap<String, HashMap<String, Arc<Variation>>>,
    event_key_map: HashMap<String, Arc<Event>>,
    attribute_key_map: HashMap<String, Arc<Attribute>>,
    audience_id_map: HashMap<String, Arc<Audience>>,
    feature_key_map: HashMap<String, Arc<FeatureFlag>>,
    rollout_id_map: HashMap<String, Arc<Rollout>>,
    /// Experiment id → ids of the feature flags it tests.
    experiment_feature_map: HashMap<String, Vec<String>>,

    logger: Arc<dyn Logger>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl DatafileIndex {
    /// Parse and index a datafile.
    ///
    /// `logger` and `error_handler` receive the lookup-miss reports of the built index.
    ///
    /// # Errors
    ///
    /// Fails if the payload is absent or empty, is not a datafile, or declares a version outside
    /// [`SUPPORTED_VERSIONS`].
    pub fn from_datafile<'a>(
        datafile: impl Into<Option<&'a str>>,
        logger: Arc<dyn Logger>,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Result<DatafileIndex, ConfigParseError> {
        let datafile = datafile.into().ok_or(ConfigParseError::NullPayload)?;
        if datafile.is_empty() {
            return Err(ConfigParseError::EmptyPayload);
        }

        let value: serde_json::Value = serde_json::from_str(datafile)
            .map_err(|err| ConfigParseError::MalformedJson(err.to_string()))?;

        // Checked ahead of the full shape, so that a future schema is reported by its version.
        if let Some(serde_json::Value::String(version)) = value.get("version") {
            if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
                return Err(ConfigParseError::UnsupportedVersion(version.clone()));
            }
        }

        let wire: DatafileWire = serde_json::from_value(value)
            .map_err(|err| ConfigParseError::MalformedJson(err.to_string()))?;

        Ok(Self::build(datafile.to_owned(), wire, logger, error_handler))
    }

    fn build(
        datafile: String,
        wire: DatafileWire,
        logger: Arc<dyn Logger>,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> DatafileIndex {
        let mut index = DatafileIndex {
            datafile,
            version: wire.version,
            account_id: wire.account_id,
            project_id: wire.project_id,
            revision: wire.revision,
            bot_filtering: wire.bot_filtering,
            anonymize_ip: wire.anonymize_ip,
            sdk_key: wire.sdk_key,
            environment_key: wire.environment_key,
            send_flag_decisions: wire.send_flag_decisions,
            group_id_map: HashMap::new(),
            experiment_key_map: HashMap::new(),
            experiment_id_map: HashMap::new(),
            variation_key_map: HashMap::new(),
            variation_id_map: HashMap::new(),
            variation_id_map_by_experiment_id: HashMap::new(),
            event_key_map: HashMap::new(),
            attribute_key_map: HashMap::new(),
            audience_id_map: HashMap::new(),
            feature_key_map: HashMap::new(),
            rollout_id_map: HashMap::new(),
            experiment_feature_map: HashMap::new(),
            logger,
            error_handler,
        };

        for group in wire.groups {
            let experiments = group
                .experiments
                .into_iter()
                .map(|mut experiment| {
                    experiment.group_id = Some(group.id.clone());
                    index.add_experiment(experiment)
                })
                .collect();
            index.group_id_map.insert(
                group.id.clone(),
                Arc::new(Group {
                    id: group.id,
                    policy: group.policy,
                    experiments,
                    traffic_allocation: group.traffic_allocation,
                }),
            );
        }

        for experiment in wire.experiments {
            index.add_experiment(experiment);
        }

        for rollout in wire.rollouts {
            let experiments = rollout
                .experiments
                .into_iter()
                .map(|mut rule| {
                    rule.compile();
                    let rule = Arc::new(rule);
                    index.add_variations(&rule);
                    rule
                })
                .collect();
            index.rollout_id_map.insert(
                rollout.id.clone(),
                Arc::new(Rollout {
                    id: rollout.id,
                    experiments,
                }),
            );
        }

        index.event_key_map = wire
            .events
            .into_iter()
            .map(|event| (event.key.clone(), Arc::new(event)))
            .collect();

        index.attribute_key_map = wire
            .attributes
            .into_iter()
            .map(|attribute| (attribute.key.clone(), Arc::new(attribute)))
            .collect();

        // Typed audiences come last so that they replace legacy audiences with the same id.
        for mut audience in wire.audiences.into_iter().chain(wire.typed_audiences) {
            audience.compile();
            index
                .audience_id_map
                .insert(audience.id.clone(), Arc::new(audience));
        }

        for feature in wire.feature_flags {
            for experiment_id in &feature.experiment_ids {
                index
                    .experiment_feature_map
                    .entry(experiment_id.clone())
                    .or_default()
                    .push(feature.id.clone());
            }
            index
                .feature_key_map
                .insert(feature.key.clone(), Arc::new(feature));
        }

        index
    }

    fn add_experiment(&mut self, mut experiment: Experiment) -> Arc<Experiment> {
        experiment.compile();
        let experiment = Arc::new(experiment);
        self.experiment_key_map
            .insert(experiment.key.clone(), experiment.clone());
        self.experiment_id_map
            .insert(experiment.id.clone(), experiment.clone());
        self.add_variations(&experiment);
        experiment
    }

    fn add_variations(&mut self, experiment: &Experiment) {
        self.variation_key_map
            .insert(experiment.key.clone(), experiment.variation_key_map.clone());
        self.variation_id_map
            .insert(experiment.key.clone(), experiment.variation_id_map.clone());
        self.variation_id_map_by_experiment_id
            .insert(experiment.id.clone(), experiment.variation_id_map.clone());
    }

    fn report_miss<T: Default>(
        &self,
        kind: EntityKind,
        identifier: &str,
        message: String,
    ) -> Arc<T> {
        self.logger.log(LogLevel::Error, &message);
        self.error_handler.handle_error(&Error::NotFound {
            kind,
            identifier: identifier.to_owned(),
        });
        Arc::default()
    }

    /// The payload this index was built from, byte for byte.
    pub fn to_datafile(&self) -> &str {
        &self.datafile
    }

    /// Datafile schema version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Account the project belongs to.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Project the datafile describes.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Revision of the datafile. A new revision is a new snapshot.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// `None` when the datafile does not say whether bot filtering is on.
    pub fn bot_filtering(&self) -> Option<bool> {
        self.bot_filtering
    }

    /// Whether visitor IPs should be anonymized in events.
    pub fn anonymize_ip(&self) -> bool {
        self.anonymize_ip
    }

    /// SDK key, when the datafile carries one.
    pub fn sdk_key(&self) -> Option<&str> {
        self.sdk_key.as_deref()
    }

    /// Environment key, when the datafile carries one.
    pub fn environment_key(&self) -> Option<&str> {
        self.environment_key.as_deref()
    }

    /// Whether flag decisions should be sent as events.
    pub fn send_flag_decisions(&self) -> bool {
        self.send_flag_decisions
    }

    /// Look up a mutually exclusive group by id.
    pub fn get_group(&self, group_id: &str) -> Arc<Group> {
        match self.group_id_map.get(group_id) {
            Some(group) => group.clone(),
            None => self.report_miss(
                EntityKind::Group,
                group_id,
                format!("Group ID \"{group_id}\" is not in datafile."),
            ),
        }
    }

    /// Look up an experiment by key.
    pub fn get_experiment_from_key(&self, experiment_key: &str) -> Arc<Experiment> {
        match self.experiment_key_map.get(experiment_key) {
            Some(experiment) => experiment.clone(),
            None => self.report_miss(
                EntityKind::Experiment,
                experiment_key,
                format!("Experiment key \"{experiment_key}\" is not in datafile."),
            ),
        }
    }

    /// Look up an experiment by id.
    pub fn get_experiment_from_id(&self, experiment_id: &str) -> Arc<Experiment> {
        match self.experiment_id_map.get(experiment_id) {
            Some(experiment) => experiment.clone(),
            None => self.report_miss(
                EntityKind::Experiment,
                experiment_id,
                format!("Experiment ID \"{experiment_id}\" is not in datafile."),
            ),
        }
    }

    /// Look up a variation by key within the experiment (or rollout rule) `experiment_key`.
    pub fn get_variation_from_key(&self, experiment_key: &str, variation_key: &str) -> Arc<Variation> {
        match self
            .variation_key_map
            .get(experiment_key)
            .and_then(|variations| variations.get(variation_key))
        {
            Some(variation) => variation.clone(),
            None => self.report_miss(
                EntityKind::Variation,
                variation_key,
                format!(
                    "No variation key \"{variation_key}\" defined in datafile for experiment \"{experiment_key}\"."
                ),
            ),
        }
    }

    /// Look up a variation by id within the experiment (or rollout rule) `experiment_key`.
    pub fn get_variation_from_id(&self, experiment_key: &str, variation_id: &str) -> Arc<Variation> {
        match self
            .variation_id_map
            .get(experiment_key)
            .and_then(|variations| variations.get(variation_id))
        {
            Some(variation) => variation.clone(),
            None => self.report_miss(
                EntityKind::Variation,
                variation_id,
                format!(
                    "No variation ID \"{variation_id}\" defined in datafile for experiment \"{experiment_key}\"."
                ),
            ),
        }
    }

    /// Look up a variation by id within the experiment (or rollout rule) with id `experiment_id`.
    pub fn get_variation_from_id_by_experiment_id(
        &self,
        experiment_id: &str,
        variation_id: &str,
    ) -> Arc<Variation> {
        match self
            .variation_id_map_by_experiment_id
            .get(experiment_id)
            .and_then(|variations| variations.get(variation_id))
        {
            Some(variation) => variation.clone(),
            None => self.report_miss(
                EntityKind::Variation,
                variation_id,
                format!(
                    "No variation ID \"{variation_id}\" defined in datafile for experiment \"{experiment_id}\"."
                ),
            ),
        }
    }

    /// Look up an event by key.
    pub fn get_event(&self, event_key: &str) -> Arc<Event> {
        match self.event_key_map.get(event_key) {
            Some(event) => event.clone(),
            None => self.report_miss(
                EntityKind::Event,
                event_key,
                format!("Event key \"{event_key}\" is not in datafile."),
            ),
        }
    }

    /// Look up an audience by id.
    pub fn get_audience(&self, audience_id: &str) -> Arc<Audience> {
        match self.audience_id_map.get(audience_id) {
            Some(audience) => audience.clone(),
            None => self.report_miss(
                EntityKind::Audience,
                audience_id,
                format!("Audience ID \"{audience_id}\" is not in datafile."),
            ),
        }
    }

    /// Look up an attribute by key.
    pub fn get_attribute(&self, attribute_key: &str) -> Arc<Attribute> {
        match self.attribute_key_map.get(attribute_key) {
            Some(attribute) => attribute.clone(),
            None => self.report_miss(
                EntityKind::Attribute,
                attribute_key,
                format!("Attribute key \"{attribute_key}\" is not in datafile."),
            ),
        }
    }

    /// Look up a feature flag by key.
    pub fn get_feature_flag_from_key(&self, feature_key: &str) -> Arc<FeatureFlag> {
        match self.feature_key_map.get(feature_key) {
            Some(feature) => feature.clone(),
            None => self.report_miss(
                EntityKind::FeatureFlag,
                feature_key,
                format!("Feature key \"{feature_key}\" is not in datafile."),
            ),
        }
    }

    /// Look up a rollout by id.
    pub fn get_rollout_from_id(&self, rollout_id: &str) -> Arc<Rollout> {
        match self.rollout_id_map.get(rollout_id) {
            Some(rollout) => rollout.clone(),
            None => self.report_miss(
                EntityKind::Rollout,
                rollout_id,
                format!("Rollout ID \"{rollout_id}\" is not in datafile."),
            ),
        }
    }

    /// Resolve the id an attribute key is reported under.
    ///
    /// Reserved keys, and unknown keys with the reserved prefix, resolve to themselves. A known
    /// key resolves to its attribute id. Unknown keys resolve to `None` and log an ERROR.
    pub fn get_attribute_id(&self, attribute_key: &str) -> Option<String> {
        if RESERVED_ATTRIBUTES.contains(&attribute_key) {
            return Some(attribute_key.to_owned());
        }

        let has_reserved_prefix = attribute_key.starts_with(RESERVED_ATTRIBUTE_PREFIX);
        match self.attribute_key_map.get(attribute_key) {
            Some(attribute) => {
                if has_reserved_prefix {
                    self.logger.log(
                        LogLevel::Warn,
                        &format!(
                            "Attribute {attribute_key} unexpectedly has reserved prefix {RESERVED_ATTRIBUTE_PREFIX}; using attribute ID instead of reserved attribute name."
                        ),
                    );
                }
                Some(attribute.id.clone())
            }
            None if has_reserved_prefix => Some(attribute_key.to_owned()),
            None => {
                self.logger.log(
                    LogLevel::Error,
                    &format!("Attribute key \"{attribute_key}\" is not in datafile."),
                );
                None
            }
        }
    }

    /// Returns `true` if any feature flag is tested by experiment `experiment_id`.
    pub fn is_feature_experiment(&self, experiment_id: &str) -> bool {
        self.experiment_feature_map.contains_key(experiment_id)
    }

    /// Ids of the feature flags tested by experiment `experiment_id`.
    pub fn get_experiment_feature_list(&self, experiment_id: &str) -> &[String] {
        self.experiment_feature_map
            .get(experiment_id)
            .map_or(&[], Vec::as_slice)
    }
}

impl std::fmt::Debug for DatafileIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatafileIndex")
            .field("version", &self.version)
            .field("account_id", &self.account_id)
            .field("project_id", &self.project_id)
            .field("revision", &self.revision)
            .field("experiments", &self.experiment_id_map.len())
            .field("feature_flags", &self.feature_key_map.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::DatafileIndex;
    use crate::{
        error::{ConfigParseError, EntityKind},
        testing::{datafile_json, edited_datafile, fixture, fixture_from, RecordingLogger},
        Error, LogLevel, NoOpErrorHandler,
    };

    fn build(datafile: Option<&str>) -> Result<DatafileIndex, ConfigParseError> {
        DatafileIndex::from_datafile(
            datafile,
            Arc::new(RecordingLogger::default()),
            Arc::new(NoOpErrorHandler),
        )
    }

    #[test]
    fn null_and_empty_payloads_are_rejected() {
        assert_eq!(build(None).unwrap_err(), ConfigParseError::NullPayload);
        assert_eq!(build(Some("")).unwrap_err(), ConfigParseError::EmptyPayload);
        assert_eq!(
            build(None).unwrap_err().to_string(),
            "Unable to parse null datafile."
        );
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(
            build(Some("{\"version\":")),
            Err(ConfigParseError::MalformedJson(_))
        ));
        assert!(matches!(
            build(Some("[1, 2, 3]")),
            Err(ConfigParseError::MalformedJson(_))
        ));
        assert!(matches!(
            build(Some(r#"{"version": "4", "experiments": {"not": "a list"}}"#)),
            Err(ConfigParseError::MalformedJson(_))
        ));
    }

    #[test]
    fn unsupported_version_is_named_in_error() {
        let datafile = edited_datafile(|v| v["version"] = "5".into());
        let err = build(Some(datafile.as_str())).unwrap_err();
        assert_eq!(err, ConfigParseError::UnsupportedVersion("5".into()));
        assert!(err.to_string().ends_with("datafile version: 5"));

        // Reported by version even when the rest of the document is unreadable.
        let err = build(Some(r#"{"version": "6", "experiments": 42}"#)).unwrap_err();
        assert_eq!(err, ConfigParseError::UnsupportedVersion("6".into()));
    }

    #[test]
    fn supported_versions_are_accepted() {
        for version in ["2", "3", "4"] {
            let datafile = edited_datafile(|v| v["version"] = version.into());
            let config = build(Some(datafile.as_str())).unwrap();
            assert_eq!(config.version(), version);
        }
    }

    #[test]
    fn round_trips_original_payload() {
        let raw = datafile_json();
        let (config, _, _) = fixture_from(&raw);
        assert_eq!(config.to_datafile(), raw);
    }

    #[test]
    fn exposes_metadata() {
        let (config, _, _) = fixture();
        assert_eq!(config.account_id(), "1592310167");
        assert_eq!(config.project_id(), "7720880029");
        assert_eq!(config.revision(), "15");
        assert_eq!(config.bot_filtering(), Some(true));
        assert!(!config.anonymize_ip());
        assert!(config.send_flag_decisions());
        assert_eq!(config.sdk_key(), None);

        let datafile = edited_datafile(|v| {
            v.as_object_mut().unwrap().remove("botFiltering");
        });
        let (config, _, _) = fixture_from(&datafile);
        assert_eq!(config.bot_filtering(), None);
    }

    #[test]
    fn key_and_id_maps_share_entities() {
        let (config, logger, error_handler) = fixture();

        let by_key = config.get_experiment_from_key("test_experiment");
        let by_id = config.get_experiment_from_id("7716830082");
        assert!(Arc::ptr_eq(&by_key, &by_id));
        assert_eq!(by_key.variations.len(), 2);

        let by_key = config.get_variation_from_key("test_experiment", "control");
        let by_id = config.get_variation_from_id("test_experiment", "7722370027");
        let by_experiment_id =
            config.get_variation_from_id_by_experiment_id("7716830082", "7722370027");
        assert!(Arc::ptr_eq(&by_key, &by_id));
        assert!(Arc::ptr_eq(&by_key, &by_experiment_id));

        assert!(logger.messages().is_empty());
        assert!(error_handler.errors().is_empty());
    }

    #[test]
    fn group_experiments_are_indexed_with_their_group() {
        let (config, _, _) = fixture();
        let experiment = config.get_experiment_from_key("group_experiment_1");
        assert_eq!(experiment.group_id(), Some("7722400015"));

        let group = config.get_group("7722400015");
        assert_eq!(group.policy, "random");
        assert_eq!(group.experiments.len(), 2);
        assert!(Arc::ptr_eq(&group.experiments[0], &experiment));
        assert_eq!(group.traffic_allocation[1].end_of_range, 6000);
    }

    #[test]
    fn lookup_misses_return_empty_and_report_every_time() {
        let (config, logger, error_handler) = fixture();

        for _ in 0..2 {
            assert!(config.get_experiment_from_key("missing_experiment").is_empty());
        }
        assert_eq!(
            logger.messages(),
            vec![
                (
                    LogLevel::Error,
                    "Experiment key \"missing_experiment\" is not in datafile.".to_owned()
                );
                2
            ]
        );
        let expected = Error::NotFound {
            kind: EntityKind::Experiment,
            identifier: "missing_experiment".into(),
        };
        assert_eq!(error_handler.errors(), vec![expected.clone(), expected]);
    }

    #[test]
    fn every_lookup_kind_has_its_own_message() {
        let (config, logger, error_handler) = fixture();

        assert!(config.get_group("42").is_empty());
        assert!(config.get_experiment_from_id("42").is_empty());
        assert!(config.get_event("nope").is_empty());
        assert!(config.get_audience("42").is_empty());
        assert!(config.get_attribute("nope").is_empty());
        assert!(config.get_feature_flag_from_key("nope").is_empty());
        assert!(config.get_rollout_from_id("42").is_empty());
        assert!(config
            .get_variation_from_key("test_experiment", "nope")
            .is_empty());
        assert!(config
            .get_variation_from_id("test_experiment", "42")
            .is_empty());

        let messages: Vec<String> = logger.messages().into_iter().map(|(_, m)| m).collect();
        assert_eq!(
            messages,
            vec![
                "Group ID \"42\" is not in datafile.",
                "Experiment ID \"42\" is not in datafile.",
                "Event key \"nope\" is not in datafile.",
                "Audience ID \"42\" is not in datafile.",
                "Attribute key \"nope\" is not in datafile.",
                "Feature key \"nope\" is not in datafile.",
                "Rollout ID \"42\" is not in datafile.",
                "No variation key \"nope\" defined in datafile for experiment \"test_experiment\".",
                "No variation ID \"42\" defined in datafile for experiment \"test_experiment\".",
            ]
        );
        assert_eq!(logger.count(LogLevel::Error), 9);
        assert_eq!(error_handler.errors().len(), 9);
    }

    #[test]
    fn variation_lookup_is_scoped_to_experiment() {
        let (config, _, _) = fixture();
        let control = config.get_variation_from_key("test_experiment", "control");
        let paused_control = config.get_variation_from_key("paused_experiment", "control");
        assert_eq!(control.id, "7722370027");
        assert_eq!(paused_control.id, "7722370427");
    }

    #[test]
    fn rollout_rules_are_indexed_by_rule_key() {
        let (config, logger, _) = fixture();
        let rollout = config.get_rollout_from_id("166660");
        assert_eq!(rollout.experiments.len(), 4);
        let variation = config.get_variation_from_key("177770", "177771");
        assert!(variation.is_feature_enabled());
        assert!(Arc::ptr_eq(&variation, &rollout.experiments[0].variations[0]));

        // Rules are not experiments.
        assert!(config.get_experiment_from_key("177770").is_empty());
        assert_eq!(logger.count(LogLevel::Error), 1);
    }

    #[test]
    fn typed_audiences_override_legacy_audiences() {
        let (config, _, _) = fixture();
        let audience = config.get_audience("100");
        assert!(audience.conditions.is_array());
        assert!(audience.condition_tree().is_some());

        let legacy = config.get_audience("7718080042");
        assert!(legacy.conditions.is_string());
        assert!(legacy.condition_tree().is_some());
    }

    #[test]
    fn attribute_ids() {
        let (config, logger, error_handler) = fixture();

        assert_eq!(
            config.get_attribute_id("device_type").as_deref(),
            Some("7723280020")
        );
        assert_eq!(
            config.get_attribute_id("$opt_bot_filtering").as_deref(),
            Some("$opt_bot_filtering")
        );
        assert_eq!(
            config.get_attribute_id("$opt_user_defined").as_deref(),
            Some("$opt_user_defined")
        );
        assert!(logger.messages().is_empty());

        assert_eq!(config.get_attribute_id("unknown_key"), None);
        assert_eq!(
            logger.messages(),
            vec![(
                LogLevel::Error,
                "Attribute key \"unknown_key\" is not in datafile.".to_owned()
            )]
        );
        assert!(error_handler.errors().is_empty());
    }

    #[test]
    fn attribute_with_reserved_prefix_uses_its_id() {
        let datafile = edited_datafile(|v| {
            v["attributes"]
                .as_array_mut()
                .unwrap()
                .push(serde_json::json!({"id": "111", "key": "$opt_location"}));
        });
        let (config, logger, _) = fixture_from(&datafile);

        assert_eq!(config.get_attribute_id("$opt_location").as_deref(), Some("111"));
        assert_eq!(
            logger.messages(),
            vec![(
                LogLevel::Warn,
                "Attribute $opt_location unexpectedly has reserved prefix $opt_; using attribute ID instead of reserved attribute name."
                    .to_owned()
            )]
        );
    }

    #[test]
    fn feature_experiments() {
        let (config, _, _) = fixture();
        assert!(config.is_feature_experiment("122230"));
        assert!(config.is_feature_experiment("7723330021"));
        assert!(!config.is_feature_experiment("7716830082"));
        assert!(!config.is_feature_experiment("1323241597"));
        assert_eq!(config.get_experiment_feature_list("122230"), ["155559"]);
        assert!(config.get_experiment_feature_list("7716830082").is_empty());
    }

    #[test]
    fn event_lists_its_experiments() {
        let (config, _, _) = fixture();
        let event = config.get_event("purchase");
        assert_eq!(event.id, "7718020063");
        assert_eq!(event.experiment_ids.len(), 4);
    }
}
