//! Variation and feature decisions.
//!
//! [`DecisionService`] runs the precedence pipeline for experiments (forced variation, whitelist,
//! audience, bucketing) and for features (feature experiments first, then the rollout).
mod feature_variables;
mod forced_variations;

use std::sync::Arc;

pub use feature_variables::FeatureVariableValue;

use crate::{
    audience::does_user_meet_audience_conditions,
    bucketer::{BucketHasher, Bucketer, Murmur3Hasher},
    datafile::{Experiment, FeatureFlag, Variation},
    AttributeValue, DatafileIndex, ErrorHandler, LogLevel, Logger, UserAttributes,
};

use self::forced_variations::ForcedVariations;

/// Attribute that overrides the user id as bucketing input.
pub const BUCKETING_ID_ATTRIBUTE: &str = "$opt_bucketing_id";

/// Where a feature decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum DecisionSource {
    /// An experiment testing the feature.
    #[display("feature-test")]
    FeatureTest,
    /// A rule of the feature's rollout.
    #[display("rollout")]
    Rollout,
}

/// Outcome of a feature decision. `variation` is `None` when the visitor got no decision.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDecision {
    /// The experiment or rollout rule that produced the decision.
    pub experiment: Option<Arc<Experiment>>,
    /// The decided variation.
    pub variation: Option<Arc<Variation>>,
    /// Whether the decision came from a feature test or a rollout.
    pub source: DecisionSource,
}

impl FeatureDecision {
    fn new(experiment: Arc<Experiment>, variation: Arc<Variation>, source: DecisionSource) -> Self {
        FeatureDecision {
            experiment: Some(experiment),
            variation: Some(variation),
            source,
        }
    }

    /// The decision for a visitor no experiment or rule applies to.
    pub fn none() -> Self {
        FeatureDecision {
            experiment: None,
            variation: None,
            source: DecisionSource::Rollout,
        }
    }

    /// Returns `true` if the decided variation enables the feature.
    pub fn is_feature_enabled(&self) -> bool {
        self.variation
            .as_ref()
            .is_some_and(|variation| variation.is_feature_enabled())
    }
}

/// Decides variations for visitors.
///
/// The service itself only holds user-level forced variations. Everything else comes from the
/// [`DatafileIndex`] passed to each call, so one service can serve successive snapshots.
pub struct DecisionService<H = Murmur3Hasher> {
    bucketer: Bucketer<H>,
    logger: Arc<dyn Logger>,
    error_handler: Arc<dyn ErrorHandler>,
    forced_variations: ForcedVariations,
}

impl DecisionService {
    /// Create a decision service using the production hasher.
    pub fn new(logger: Arc<dyn Logger>, error_handler: Arc<dyn ErrorHandler>) -> Self {
        DecisionService::with_hasher(Murmur3Hasher, logger, error_handler)
    }
}

impl<H: BucketHasher> DecisionService<H> {
    /// Create a decision service that buckets with `hasher`.
    pub fn with_hasher(
        hasher: H,
        logger: Arc<dyn Logger>,
        error_handler: Arc<dyn ErrorHandler>,
    ) -> Self {
        DecisionService {
            bucketer: Bucketer::with_hasher(hasher, logger.clone()),
            logger,
            error_handler,
            forced_variations: ForcedVariations::default(),
        }
    }

    /// The bucketing id of a visitor: the `$opt_bucketing_id` attribute if it is a string,
    /// otherwise the user id.
    pub fn get_bucketing_id(&self, user_id: &str, attributes: &UserAttributes) -> String {
        match attributes.get(BUCKETING_ID_ATTRIBUTE) {
            None => user_id.to_owned(),
            Some(AttributeValue::String(bucketing_id)) => bucketing_id.clone(),
            Some(_) => {
                self.logger.log(
                    LogLevel::Warn,
                    "BucketingID attribute is not a string. Defaulted to userId",
                );
                user_id.to_owned()
            }
        }
    }

    /// Decide the variation of `experiment` for a visitor. `None` means no decision.
    pub fn get_variation(
        &self,
        config: &DatafileIndex,
        experiment: &Experiment,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> Option<Arc<Variation>> {
        if experiment.is_empty() {
            return None;
        }

        if !experiment.is_running() {
            self.logger.log(
                LogLevel::Info,
                &format!("Experiment \"{}\" is not running.", experiment.key),
            );
            return None;
        }

        if let Some(variation) = self.get_forced_variation(config, &experiment.key, user_id) {
            return Some(variation);
        }

        if let Some(variation) = self.get_whitelisted_variation(experiment, user_id) {
            return Some(variation);
        }

        if !does_user_meet_audience_conditions(
            config,
            experiment,
            attributes,
            "experiment",
            &experiment.key,
            self.logger.as_ref(),
        ) {
            self.logger.log(
                LogLevel::Info,
                &format!(
                    "User \"{user_id}\" does not meet conditions to be in experiment \"{}\".",
                    experiment.key
                ),
            );
            return None;
        }

        let bucketing_id = self.get_bucketing_id(user_id, attributes);
        let variation = self
            .bucketer
            .bucket(config, experiment, &bucketing_id, user_id);
        (!variation.is_empty()).then_some(variation)
    }

    fn get_whitelisted_variation(
        &self,
        experiment: &Experiment,
        user_id: &str,
    ) -> Option<Arc<Variation>> {
        let variation_key = experiment.forced_variations.get(user_id)?;
        match experiment.get_variation_by_key(variation_key) {
            Some(variation) => {
                self.logger.log(
                    LogLevel::Info,
                    &format!("User \"{user_id}\" is forced in variation \"{variation_key}\"."),
                );
                Some(variation.clone())
            }
            None => {
                self.logger.log(
                    LogLevel::Error,
                    &format!(
                        "Variation \"{variation_key}\" is not in the datafile. Not activating user \"{user_id}\"."
                    ),
                );
                None
            }
        }
    }

    /// Try the experiments testing `feature`, in order. The first variation wins.
    pub fn get_variation_for_feature_experiment(
        &self,
        config: &DatafileIndex,
        feature: &FeatureFlag,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> Option<FeatureDecision> {
        if feature.experiment_ids.is_empty() {
            self.logger.log(
                LogLevel::Info,
                &format!(
                    "The feature flag \"{}\" is not used in any experiments.",
                    feature.key
                ),
            );
            return None;
        }

        for experiment_id in &feature.experiment_ids {
            let experiment = config.get_experiment_from_id(experiment_id);
            if experiment.is_empty() {
                continue;
            }
            if let Some(variation) = self.get_variation(config, &experiment, user_id, attributes) {
                self.logger.log(
                    LogLevel::Info,
                    &format!(
                        "The user \"{user_id}\" is bucketed into experiment \"{}\" of feature \"{}\".",
                        experiment.key, feature.key
                    ),
                );
                return Some(FeatureDecision::new(
                    experiment,
                    variation,
                    DecisionSource::FeatureTest,
                ));
            }
        }

        self.logger.log(
            LogLevel::Info,
            &format!(
                "The user \"{user_id}\" is not bucketed into any of the experiments on the feature \"{}\".",
                feature.key
            ),
        );
        None
    }

    /// Walk the rollout of `feature`.
    ///
    /// Targeting rules are tried in order; the first rule that admits the visitor and buckets them
    /// into a variation wins. The last ("Everyone Else") rule is tried when none does.
    pub fn get_variation_for_feature_rollout(
        &self,
        config: &DatafileIndex,
        feature: &FeatureFlag,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> Option<FeatureDecision> {
        if feature.rollout_id.is_empty() {
            self.logger.log(
                LogLevel::Info,
                &format!(
                    "The feature flag \"{}\" is not used in a rollout.",
                    feature.key
                ),
            );
            return None;
        }

        let rollout = config.get_rollout_from_id(&feature.rollout_id);
        let (everyone_else, targeting_rules) = rollout.experiments.split_last()?;
        let bucketing_id = self.get_bucketing_id(user_id, attributes);

        for (index, rule) in targeting_rules.iter().enumerate() {
            let rule_number = (index + 1).to_string();
            if !does_user_meet_audience_conditions(
                config,
                rule,
                attributes,
                "rule",
                &rule_number,
                self.logger.as_ref(),
            ) {
                self.logger.log(
                    LogLevel::Debug,
                    &format!(
                        "User \"{user_id}\" does not meet the conditions for targeting rule \"{rule_number}\"."
                    ),
                );
                continue;
            }

            let variation = self.bucketer.bucket(config, rule, &bucketing_id, user_id);
            if variation.is_empty() {
                continue;
            }
            return Some(FeatureDecision::new(
                rule.clone(),
                variation,
                DecisionSource::Rollout,
            ));
        }

        if !does_user_meet_audience_conditions(
            config,
            everyone_else,
            attributes,
            "rule",
            "Everyone Else",
            self.logger.as_ref(),
        ) {
            self.logger.log(
                LogLevel::Debug,
                &format!(
                    "User \"{user_id}\" does not meet the conditions to be in rollout rule for audience \"Everyone Else\"."
                ),
            );
            return None;
        }

        let variation = self
            .bucketer
            .bucket(config, everyone_else, &bucketing_id, user_id);
        if variation.is_empty() {
            return None;
        }
        self.logger.log(
            LogLevel::Debug,
            &format!("User \"{user_id}\" meets conditions for targeting rule \"Everyone Else\"."),
        );
        Some(FeatureDecision::new(
            everyone_else.clone(),
            variation,
            DecisionSource::Rollout,
        ))
    }

    /// Decide `feature` for a visitor: feature experiments first, then the rollout.
    pub fn get_variation_for_feature(
        &self,
        config: &DatafileIndex,
        feature: &FeatureFlag,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> FeatureDecision {
        if let Some(decision) =
            self.get_variation_for_feature_experiment(config, feature, user_id, attributes)
        {
            return decision;
        }

        if let Some(decision) =
            self.get_variation_for_feature_rollout(config, feature, user_id, attributes)
        {
            self.logger.log(
                LogLevel::Info,
                &format!(
                    "The user \"{user_id}\" is bucketed into a rollout for feature flag \"{}\".",
                    feature.key
                ),
            );
            return decision;
        }

        self.logger.log(
            LogLevel::Info,
            &format!(
                "The user \"{user_id}\" is not being experimented on feature \"{}\".",
                feature.key
            ),
        );
        FeatureDecision::none()
    }

    /// Returns `true` if the feature `feature_key` is enabled for the visitor.
    pub fn is_feature_enabled(
        &self,
        config: &DatafileIndex,
        feature_key: &str,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> bool {
        let feature = config.get_feature_flag_from_key(feature_key);
        if feature.is_empty() {
            return false;
        }

        let enabled = self
            .get_variation_for_feature(config, &feature, user_id, attributes)
            .is_feature_enabled();
        let message = if enabled {
            format!("Feature flag \"{feature_key}\" is enabled for user \"{user_id}\".")
        } else {
            format!("Feature flag \"{feature_key}\" is not enabled for user \"{user_id}\".")
        };
        self.logger.log(LogLevel::Info, &message);
        enabled
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{DecisionService, DecisionSource};
    use crate::{
        testing::{fixture, DeterministicHasher, RecordingErrorHandler, RecordingLogger},
        AttributeValue, LogLevel, UserAttributes,
    };

    fn attrs(pairs: &[(&str, AttributeValue)]) -> UserAttributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn service_with(
        buckets: impl IntoIterator<Item = (&'static str, u32)>,
    ) -> (DecisionService<DeterministicHasher>, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::default());
        let service = DecisionService::with_hasher(
            DeterministicHasher::new(buckets, 0),
            logger.clone(),
            Arc::new(RecordingErrorHandler::default()),
        );
        (service, logger)
    }

    #[test]
    fn bucketing_id_attribute_overrides_user_id() {
        let (service, logger) = service_with([]);
        assert_eq!(
            service.get_bucketing_id("user", &attrs(&[("$opt_bucketing_id", "bucket".into())])),
            "bucket"
        );
        assert_eq!(service.get_bucketing_id("user", &attrs(&[])), "user");
        assert!(logger.messages().is_empty());

        assert_eq!(
            service.get_bucketing_id("user", &attrs(&[("$opt_bucketing_id", 5.into())])),
            "user"
        );
        assert!(logger.contains(
            LogLevel::Warn,
            "BucketingID attribute is not a string. Defaulted to userId"
        ));
    }

    #[test]
    fn paused_experiment_gets_no_decision_even_when_whitelisted() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([]);
        let experiment = config.get_experiment_from_key("paused_experiment");

        assert_eq!(
            service.get_variation(&config, &experiment, "forced_user", &attrs(&[])),
            None
        );
        assert_eq!(
            logger.messages(),
            vec![(
                LogLevel::Info,
                "Experiment \"paused_experiment\" is not running.".to_owned()
            )]
        );
    }

    #[test]
    fn whitelist_bypasses_audience_and_bucketing() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([("forced_user7716830082", 9999)]);
        let experiment = config.get_experiment_from_key("test_experiment");

        let variation = service
            .get_variation(&config, &experiment, "forced_user", &attrs(&[]))
            .unwrap();
        assert_eq!(variation.key, "variation");
        assert!(logger.contains(
            LogLevel::Info,
            "User \"forced_user\" is forced in variation \"variation\"."
        ));
        assert_eq!(logger.count(LogLevel::Info), 1);
        assert!(!logger
            .messages()
            .iter()
            .any(|(_, message)| message.starts_with("Assigned bucket")));
    }

    #[test]
    fn invalid_whitelisted_variation_falls_through_to_bucketing() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([("bad_forced_user7716830082", 100)]);
        let experiment = config.get_experiment_from_key("test_experiment");

        let variation = service
            .get_variation(&config, &experiment, "bad_forced_user", &attrs(&[]))
            .unwrap();
        assert_eq!(variation.key, "control");
        assert!(logger.contains(
            LogLevel::Error,
            "Variation \"invalid_variation_key\" is not in the datafile. Not activating user \"bad_forced_user\"."
        ));
    }

    #[test]
    fn audience_mismatch_gets_no_decision() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([]);
        let experiment = config.get_experiment_from_key("test_experiment_multivariate");

        assert_eq!(
            service.get_variation(
                &config,
                &experiment,
                "user",
                &attrs(&[("device_type", "Android".into())])
            ),
            None
        );
        assert!(logger.contains(
            LogLevel::Info,
            "User \"user\" does not meet conditions to be in experiment \"test_experiment_multivariate\"."
        ));
    }

    #[test]
    fn bucketing_uses_bucketing_id() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([
            ("user122230", 100),
            ("other122230", 8000),
        ]);
        let experiment = config.get_experiment_from_key("test_experiment_multivariate");
        let attributes = attrs(&[
            ("device_type", "iPhone".into()),
            ("location", "San Francisco".into()),
        ]);

        let variation = service
            .get_variation(&config, &experiment, "user", &attributes)
            .unwrap();
        assert_eq!(variation.key, "Fred");

        let mut with_bucketing_id = attributes.clone();
        with_bucketing_id.insert("$opt_bucketing_id".into(), "other".into());
        let variation = service
            .get_variation(&config, &experiment, "user", &with_bucketing_id)
            .unwrap();
        assert_eq!(variation.key, "George");
        assert!(logger.contains(
            LogLevel::Debug,
            "Assigned bucket [8000] to user [user] with bucketing ID [other]."
        ));
    }

    #[test]
    fn real_hasher_assigns_test_experiment_deterministically() {
        let (config, _, _) = fixture();
        let service = DecisionService::new(
            Arc::new(RecordingLogger::default()),
            Arc::new(RecordingErrorHandler::default()),
        );
        let experiment = config.get_experiment_from_key("test_experiment");

        // "ppid1" hashes into bucket 6322 for this experiment.
        let first = service.get_variation(&config, &experiment, "ppid1", &attrs(&[]));
        let second = service.get_variation(&config, &experiment, "ppid1", &attrs(&[]));
        assert_eq!(first, second);
        assert_eq!(first.unwrap().key, "variation");
    }

    #[test]
    fn feature_experiment_decision() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([("user122238", 7000)]);
        let feature = config.get_feature_flag_from_key("double_single_variable_feature");

        let decision = service.get_variation_for_feature(&config, &feature, "user", &attrs(&[]));
        assert_eq!(decision.source, DecisionSource::FeatureTest);
        assert_eq!(decision.experiment.unwrap().key, "test_experiment_double_feature");
        assert_eq!(decision.variation.unwrap().key, "variation");
        assert!(logger.contains(
            LogLevel::Info,
            "The user \"user\" is bucketed into experiment \"test_experiment_double_feature\" of feature \"double_single_variable_feature\"."
        ));
    }

    #[test]
    fn mutex_group_feature_takes_the_member_the_user_is_in() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([
            ("user7722400015", 4000),
            ("user7718750065", 1000),
        ]);
        let feature = config.get_feature_flag_from_key("mutex_group_feature");

        let decision = service.get_variation_for_feature(&config, &feature, "user", &attrs(&[]));
        assert_eq!(decision.experiment.unwrap().key, "group_experiment_2");
        assert_eq!(decision.variation.unwrap().key, "group_exp_2_var_1");
        assert!(logger.contains(
            LogLevel::Info,
            "User [user] is not in experiment [group_experiment_1] of group [7722400015]."
        ));
    }

    #[test]
    fn feature_without_experiments_or_rollout() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([]);
        let feature = config.get_feature_flag_from_key("empty_feature");

        let decision = service.get_variation_for_feature(&config, &feature, "user", &attrs(&[]));
        assert_eq!(decision, super::FeatureDecision::none());
        assert_eq!(
            logger.messages(),
            vec![
                (
                    LogLevel::Info,
                    "The feature flag \"empty_feature\" is not used in any experiments.".to_owned()
                ),
                (
                    LogLevel::Info,
                    "The feature flag \"empty_feature\" is not used in a rollout.".to_owned()
                ),
                (
                    LogLevel::Info,
                    "The user \"user\" is not being experimented on feature \"empty_feature\"."
                        .to_owned()
                ),
            ]
        );
    }

    #[test]
    fn falls_back_to_rollout_when_no_experiment_matches() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([]);
        let feature = config.get_feature_flag_from_key("multi_variate_feature");

        let decision = service.get_variation_for_feature(&config, &feature, "user", &attrs(&[]));
        assert_eq!(decision.source, DecisionSource::Rollout);
        assert_eq!(decision.variation.as_ref().unwrap().key, "188881");
        assert!(decision.is_feature_enabled());
        assert!(logger.contains(
            LogLevel::Info,
            "The user \"user\" is not bucketed into any of the experiments on the feature \"multi_variate_feature\"."
        ));
        assert!(logger.contains(
            LogLevel::Info,
            "The user \"user\" is bucketed into a rollout for feature flag \"multi_variate_feature\"."
        ));
    }

    #[test]
    fn first_matching_rollout_rule_wins() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([]);
        let feature = config.get_feature_flag_from_key("boolean_single_variable_feature");

        let decision = service
            .get_variation_for_feature_rollout(
                &config,
                &feature,
                "user",
                &attrs(&[("browser_type", "chrome".into())]),
            )
            .unwrap();
        assert_eq!(decision.experiment.unwrap().key, "177770");
        assert_eq!(decision.variation.unwrap().key, "177771");
        assert!(logger.contains(
            LogLevel::Info,
            "Audiences for rule \"1\" collectively evaluated to TRUE."
        ));
    }

    #[test]
    fn rule_without_traffic_falls_through_to_next_matching_rule() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([]);
        let feature = config.get_feature_flag_from_key("boolean_single_variable_feature");

        // Matches rule 2, which has no traffic, and rule 3.
        let decision = service
            .get_variation_for_feature_rollout(
                &config,
                &feature,
                "user",
                &attrs(&[
                    ("device_type", "iPhone".into()),
                    ("location", "San Francisco".into()),
                    ("integer_key", 20.into()),
                    ("boolean_key", true.into()),
                ]),
            )
            .unwrap();
        assert_eq!(decision.experiment.unwrap().key, "177774");
        assert_eq!(decision.variation.unwrap().key, "177775");
        assert!(logger.contains(
            LogLevel::Debug,
            "User \"user\" does not meet the conditions for targeting rule \"1\"."
        ));
        assert!(logger.contains(
            LogLevel::Info,
            "Audiences for rule \"2\" collectively evaluated to TRUE."
        ));
        assert!(logger.contains(LogLevel::Info, "User [user] is in no variation."));
        assert!(logger.contains(
            LogLevel::Info,
            "Audiences for rule \"3\" collectively evaluated to TRUE."
        ));
        assert!(!logger
            .messages()
            .iter()
            .any(|(_, message)| message.contains("Everyone Else")));
    }

    #[test]
    fn rule_without_traffic_ends_at_everyone_else_when_nothing_else_matches() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([]);
        let feature = config.get_feature_flag_from_key("boolean_single_variable_feature");

        let decision = service
            .get_variation_for_feature_rollout(
                &config,
                &feature,
                "user",
                &attrs(&[
                    ("device_type", "iPhone".into()),
                    ("location", "San Francisco".into()),
                ]),
            )
            .unwrap();
        assert_eq!(decision.experiment.unwrap().key, "177776");
        assert!(!decision.variation.unwrap().is_feature_enabled());
        assert!(logger.contains(
            LogLevel::Debug,
            "User \"user\" meets conditions for targeting rule \"Everyone Else\"."
        ));
    }

    #[test]
    fn later_targeting_rule_matches() {
        let (config, _, _) = fixture();
        let (service, _) = service_with([]);
        let feature = config.get_feature_flag_from_key("boolean_single_variable_feature");

        let decision = service
            .get_variation_for_feature_rollout(
                &config,
                &feature,
                "user",
                &attrs(&[("integer_key", 20.into()), ("boolean_key", true.into())]),
            )
            .unwrap();
        assert_eq!(decision.variation.unwrap().key, "177775");
    }

    #[test]
    fn everyone_else_rule_outside_its_traffic() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([("user177776", 10000)]);
        let feature = config.get_feature_flag_from_key("boolean_single_variable_feature");

        assert_eq!(
            service.get_variation_for_feature_rollout(&config, &feature, "user", &attrs(&[])),
            None
        );
        assert!(logger.contains(LogLevel::Info, "User [user] is in no variation."));
    }

    #[test]
    fn is_feature_enabled_logs_the_result() {
        let (config, _, _) = fixture();
        let (service, logger) = service_with([]);

        assert!(service.is_feature_enabled(
            &config,
            "boolean_single_variable_feature",
            "user",
            &attrs(&[("browser_type", "chrome".into())])
        ));
        assert!(logger.contains(
            LogLevel::Info,
            "Feature flag \"boolean_single_variable_feature\" is enabled for user \"user\"."
        ));

        assert!(!service.is_feature_enabled(
            &config,
            "boolean_single_variable_feature",
            "user",
            &attrs(&[])
        ));
        assert!(logger.contains(
            LogLevel::Info,
            "Feature flag \"boolean_single_variable_feature\" is not enabled for user \"user\"."
        ));
    }

    #[test]
    fn unknown_feature_is_disabled() {
        let (config, config_logger, error_handler) = fixture();
        let (service, _) = service_with([]);
        assert!(!service.is_feature_enabled(&config, "no_such_feature", "user", &attrs(&[])));
        assert!(config_logger.contains(
            LogLevel::Error,
            "Feature key \"no_such_feature\" is not in datafile."
        ));
        assert_eq!(error_handler.errors().len(), 1);
    }
}
