//! Audience targeting: condition trees, attribute matchers, and experiment eligibility.
mod condition_tree;
mod matchers;

pub use condition_tree::ConditionTree;
pub use matchers::UserCondition;

use crate::{datafile::Experiment, DatafileIndex, LogLevel, Logger, UserAttributes};

fn result_label(result: Option<bool>) -> &'static str {
    match result {
        Some(true) => "TRUE",
        Some(false) => "FALSE",
        None => "UNKNOWN",
    }
}

/// Returns `true` if the visitor is eligible for `experiment` (an experiment or rollout rule).
///
/// Only a `TRUE` result admits the visitor. An experiment without targeting admits everyone.
/// `logging_key_type` and `logging_key` name the experiment in log messages, e.g. `"rule"` and
/// `"2"` for the second rollout rule.
pub(crate) fn does_user_meet_audience_conditions(
    config: &DatafileIndex,
    experiment: &Experiment,
    attributes: &UserAttributes,
    logging_key_type: &str,
    logging_key: &str,
    logger: &dyn Logger,
) -> bool {
    let expression = experiment.audience_expression();
    logger.log(
        LogLevel::Debug,
        &format!(
            "Evaluating audiences for {logging_key_type} \"{logging_key}\": {}.",
            expression
                .and_then(|expression| serde_json::to_string(expression).ok())
                .unwrap_or_else(|| "[]".to_owned())
        ),
    );

    let result = match expression {
        None => true,
        Some(expression) => expression
            .evaluate(&mut |audience_id: &String| {
                evaluate_audience(config, audience_id, attributes, logger)
            })
            .unwrap_or(false),
    };

    logger.log(
        LogLevel::Info,
        &format!(
            "Audiences for {logging_key_type} \"{logging_key}\" collectively evaluated to {}.",
            result_label(Some(result))
        ),
    );
    result
}

fn evaluate_audience(
    config: &DatafileIndex,
    audience_id: &str,
    attributes: &UserAttributes,
    logger: &dyn Logger,
) -> Option<bool> {
    let audience = config.get_audience(audience_id);
    if audience.is_empty() {
        return None;
    }

    logger.log(
        LogLevel::Debug,
        &format!(
            "Starting to evaluate audience \"{audience_id}\" with conditions: {}.",
            audience.conditions_display()
        ),
    );
    let result = audience.condition_tree().and_then(|tree| {
        tree.evaluate(&mut |condition: &UserCondition| condition.evaluate(attributes, logger))
    });
    logger.log(
        LogLevel::Info,
        &format!(
            "Audience \"{audience_id}\" evaluated to {}.",
            result_label(result)
        ),
    );
    result
}
