use super::DecisionService;
use crate::{
    bucketer::BucketHasher,
    datafile::{FeatureVariable, FeatureVariableType},
    json::parse_map,
    DatafileIndex, Error, LogLevel, OptimizelyJson, UserAttributes,
};

/// A feature variable value, typed by the variable's declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureVariableValue {
    /// Value of a `boolean` variable.
    Boolean(bool),
    /// Value of an `integer` variable.
    Integer(i64),
    /// Value of a `double` variable.
    Double(f64),
    /// Value of a `string` variable.
    String(String),
    /// Value of a `json` variable.
    Json(OptimizelyJson),
}

impl<H: BucketHasher> DecisionService<H> {
    /// Resolve the value of variable `variable_key` of feature `feature_key` for a visitor.
    ///
    /// An enabled variation's override wins over the declared default. Returns `None` if the
    /// feature or variable is unknown, the variable is not of `variable_type`, or the value does
    /// not parse as `variable_type`.
    pub fn get_feature_variable_value(
        &self,
        config: &DatafileIndex,
        feature_key: &str,
        variable_key: &str,
        variable_type: FeatureVariableType,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> Option<FeatureVariableValue> {
        let feature = config.get_feature_flag_from_key(feature_key);
        if feature.is_empty() {
            return None;
        }

        let Some(variable) = feature.get_variable(variable_key) else {
            self.logger.log(
                LogLevel::Error,
                &format!(
                    "No feature variable was found for key \"{variable_key}\" in feature flag \"{feature_key}\"."
                ),
            );
            return None;
        };

        let declared_type = variable.variable_type();
        if declared_type != Some(variable_type) {
            self.logger.log(
                LogLevel::Error,
                &format!(
                    "Variable is of type \"{}\", but you requested it as type \"{variable_type}\".",
                    declared_type.map_or_else(|| variable.type_name.clone(), |t| t.to_string())
                ),
            );
            return None;
        }

        let decision = self.get_variation_for_feature(config, &feature, user_id, attributes);
        let value = match &decision.variation {
            Some(variation) if variation.is_feature_enabled() => {
                match variation.get_variable_usage(&variable.id) {
                    Some(usage) => {
                        self.logger.log(
                            LogLevel::Info,
                            &format!(
                                "Got variable value \"{}\" for variable \"{variable_key}\" of feature flag \"{feature_key}\".",
                                usage.value
                            ),
                        );
                        usage.value.as_str()
                    }
                    None => {
                        self.logger.log(
                            LogLevel::Info,
                            &format!(
                                "Variable \"{variable_key}\" is not used in variation \"{}\". Returning default value \"{}\".",
                                variation.key, variable.default_value
                            ),
                        );
                        variable.default_value.as_str()
                    }
                }
            }
            Some(_) => {
                self.logger.log(
                    LogLevel::Info,
                    &format!(
                        "Feature \"{feature_key}\" is not enabled for user \"{user_id}\". Returning the default variable value \"{}\".",
                        variable.default_value
                    ),
                );
                variable.default_value.as_str()
            }
            None => {
                self.logger.log(
                    LogLevel::Info,
                    &format!(
                        "User \"{user_id}\" is not in any variation or rollout rule. Returning default value for variable \"{variable_key}\" of feature flag \"{feature_key}\"."
                    ),
                );
                variable.default_value.as_str()
            }
        };

        self.convert_variable_value(variable, variable_type, value)
    }

    fn convert_variable_value(
        &self,
        variable: &FeatureVariable,
        variable_type: FeatureVariableType,
        value: &str,
    ) -> Option<FeatureVariableValue> {
        let converted = match variable_type {
            FeatureVariableType::Boolean => value.parse().ok().map(FeatureVariableValue::Boolean),
            FeatureVariableType::Integer => value.parse().ok().map(FeatureVariableValue::Integer),
            FeatureVariableType::Double => value.parse().ok().map(FeatureVariableValue::Double),
            FeatureVariableType::String => Some(FeatureVariableValue::String(value.to_owned())),
            FeatureVariableType::Json => parse_map(value).ok().map(|map| {
                FeatureVariableValue::Json(OptimizelyJson::from_map(
                    map,
                    self.logger.clone(),
                    self.error_handler.clone(),
                ))
            }),
        };

        if converted.is_none() {
            self.logger.log(
                LogLevel::Error,
                &format!("Unable to cast variable value \"{value}\" to type \"{variable_type}\"."),
            );
            self.error_handler
                .handle_error(&Error::InvalidFeatureVariableValue {
                    variable_key: variable.key.clone(),
                    variable_type: variable_type.to_string(),
                    value: value.to_owned(),
                });
        }
        converted
    }

    /// Resolve a `boolean` feature variable.
    pub fn get_feature_variable_boolean(
        &self,
        config: &DatafileIndex,
        feature_key: &str,
        variable_key: &str,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> Option<bool> {
        match self.get_feature_variable_value(
            config,
            feature_key,
            variable_key,
            FeatureVariableType::Boolean,
            user_id,
            attributes,
        )? {
            FeatureVariableValue::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// Resolve an `integer` feature variable.
    pub fn get_feature_variable_integer(
        &self,
        config: &DatafileIndex,
        feature_key: &str,
        variable_key: &str,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> Option<i64> {
        match self.get_feature_variable_value(
            config,
            feature_key,
            variable_key,
            FeatureVariableType::Integer,
            user_id,
            attributes,
        )? {
            FeatureVariableValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Resolve a `double` feature variable.
    pub fn get_feature_variable_double(
        &self,
        config: &DatafileIndex,
        feature_key: &str,
        variable_key: &str,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> Option<f64> {
        match self.get_feature_variable_value(
            config,
            feature_key,
            variable_key,
            FeatureVariableType::Double,
            user_id,
            attributes,
        )? {
            FeatureVariableValue::Double(d) => Some(d),
            _ => None,
        }
    }

    /// Resolve a `string` feature variable.
    pub fn get_feature_variable_string(
        &self,
        config: &DatafileIndex,
        feature_key: &str,
        variable_key: &str,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> Option<String> {
        match self.get_feature_variable_value(
            config,
            feature_key,
            variable_key,
            FeatureVariableType::String,
            user_id,
            attributes,
        )? {
            FeatureVariableValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Resolve a `json` feature variable.
    pub fn get_feature_variable_json(
        &self,
        config: &DatafileIndex,
        feature_key: &str,
        variable_key: &str,
        user_id: &str,
        attributes: &UserAttributes,
    ) -> Option<OptimizelyJson> {
        match self.get_feature_variable_value(
            config,
            feature_key,
            variable_key,
            FeatureVariableType::Json,
            user_id,
            attributes,
        )? {
            FeatureVariableValue::Json(json) => Some(json),
            _ => None,
        }
    }
}
