use std::{cmp::Ordering, sync::OnceLock};

use regex::Regex;
use semver::Prerelease;
use serde::{Deserialize, Serialize};

use crate::{AttributeValue, LogLevel, Logger, UserAttributes};

const CUSTOM_ATTRIBUTE: &str = "custom_attribute";

/// Largest magnitude a number may have to take part in a comparison (2^53).
const MAX_NUMBER: f64 = 9_007_199_254_740_992.0;

/// A leaf of an audience condition tree: compares one visitor attribute with a fixed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCondition {
    /// Attribute key.
    pub name: String,
    /// Condition type. Only `custom_attribute` is evaluated.
    #[serde(rename = "type", default)]
    pub condition_type: String,
    /// Match type. Absent means `exact`.
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    /// Value the attribute is compared with. Unused by `exists`.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchType {
    Exact,
    Exists,
    Substring,
    Gt,
    Ge,
    Lt,
    Le,
    SemverEq,
    SemverGt,
    SemverGe,
    SemverLt,
    SemverLe,
}

impl MatchType {
    fn parse(s: Option<&str>) -> Option<MatchType> {
        Some(match s {
            None | Some("exact") => MatchType::Exact,
            Some("exists") => MatchType::Exists,
            Some("substring") => MatchType::Substring,
            Some("gt") => MatchType::Gt,
            Some("ge") => MatchType::Ge,
            Some("lt") => MatchType::Lt,
            Some("le") => MatchType::Le,
            Some("semver_eq") => MatchType::SemverEq,
            Some("semver_gt") => MatchType::SemverGt,
            Some("semver_ge") => MatchType::SemverGe,
            Some("semver_lt") => MatchType::SemverLt,
            Some("semver_le") => MatchType::SemverLe,
            Some(_) => return None,
        })
    }

    /// Whether an ordering of attribute value vs. condition value satisfies this match type.
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            MatchType::Gt | MatchType::SemverGt => ordering == Ordering::Greater,
            MatchType::Ge | MatchType::SemverGe => ordering != Ordering::Less,
            MatchType::Lt | MatchType::SemverLt => ordering == Ordering::Less,
            MatchType::Le | MatchType::SemverLe => ordering != Ordering::Greater,
            _ => ordering == Ordering::Equal,
        }
    }
}

/// Condition value after validation against its match type.
enum Expected<'a> {
    String(&'a str),
    Number(f64),
    Boolean(bool),
    Version(SemanticVersion),
}

impl UserCondition {
    /// Evaluate the condition against `attributes`. `None` means the result is unknown.
    pub(crate) fn evaluate(&self, attributes: &UserAttributes, logger: &dyn Logger) -> Option<bool> {
        if self.condition_type != CUSTOM_ATTRIBUTE {
            logger.log(
                LogLevel::Warn,
                &format!(
                    "Audience condition {} uses an unknown condition type. You may need to upgrade to a newer release of the Optimizely SDK.",
                    self.to_json()
                ),
            );
            return None;
        }

        let Some(match_type) = MatchType::parse(self.match_type.as_deref()) else {
            logger.log(
                LogLevel::Warn,
                &format!(
                    "Audience condition {} uses an unknown match type. You may need to upgrade to a newer release of the Optimizely SDK.",
                    self.to_json()
                ),
            );
            return None;
        };

        let attribute = attributes.get(&self.name);

        if match_type == MatchType::Exists {
            return Some(!matches!(attribute, None | Some(AttributeValue::Null)));
        }

        let Some(expected) = self.expected_value(match_type) else {
            logger.log(
                LogLevel::Warn,
                &format!(
                    "Audience condition {} has an unsupported condition value. You may need to upgrade to a newer release of the Optimizely SDK.",
                    self.to_json()
                ),
            );
            return None;
        };

        let attribute = match attribute {
            None => {
                logger.log(
                    LogLevel::Debug,
                    &format!(
                        "Audience condition {} evaluated to UNKNOWN because no value was passed for user attribute \"{}\".",
                        self.to_json(),
                        self.name
                    ),
                );
                return None;
            }
            Some(AttributeValue::Null) => {
                logger.log(
                    LogLevel::Debug,
                    &format!(
                        "Audience condition {} evaluated to UNKNOWN because a null value was passed for user attribute \"{}\".",
                        self.to_json(),
                        self.name
                    ),
                );
                return None;
            }
            Some(value) => value,
        };

        let result = match (&expected, attribute) {
            (Expected::String(expected), AttributeValue::String(actual)) => {
                if match_type == MatchType::Substring {
                    actual.contains(expected)
                } else {
                    actual == expected
                }
            }
            (Expected::Boolean(expected), AttributeValue::Boolean(actual)) => actual == expected,
            (Expected::Number(expected), AttributeValue::Number(actual)) => {
                if !is_valid_number(*actual) {
                    logger.log(
                        LogLevel::Warn,
                        &format!(
                            "Audience condition {} evaluated to UNKNOWN because the number value for user attribute \"{}\" is not in the range [-2^53, +2^53].",
                            self.to_json(),
                            self.name
                        ),
                    );
                    return None;
                }
                match_type.accepts(actual.partial_cmp(expected)?)
            }
            (Expected::Version(target), AttributeValue::String(actual)) => {
                let Some(version) = SemanticVersion::parse(actual) else {
                    logger.log(
                        LogLevel::Warn,
                        &format!(
                            "Audience condition {} evaluated to UNKNOWN because the value \"{}\" passed for user attribute \"{}\" is not a valid semantic version.",
                            self.to_json(),
                            actual,
                            self.name
                        ),
                    );
                    return None;
                };
                match_type.accepts(version.compare_to_target(target))
            }
            (_, actual) => {
                logger.log(
                    LogLevel::Warn,
                    &format!(
                        "Audience condition {} evaluated to UNKNOWN because a value of type \"{}\" was passed for user attribute \"{}\".",
                        self.to_json(),
                        actual.type_name(),
                        self.name
                    ),
                );
                return None;
            }
        };

        Some(result)
    }

    /// Validate the condition value for `match_type`.
    fn expected_value(&self, match_type: MatchType) -> Option<Expected<'_>> {
        let value = self.value.as_ref()?;
        match match_type {
            MatchType::Exact => match value {
                serde_json::Value::String(s) => Some(Expected::String(s)),
                serde_json::Value::Bool(b) => Some(Expected::Boolean(*b)),
                serde_json::Value::Number(n) => {
                    n.as_f64().filter(|n| is_valid_number(*n)).map(Expected::Number)
                }
                _ => None,
            },
            MatchType::Substring => value.as_str().map(Expected::String),
            MatchType::Gt | MatchType::Ge | MatchType::Lt | MatchType::Le => value
                .as_f64()
                .filter(|n| is_valid_number(*n))
                .map(Expected::Number),
            MatchType::SemverEq
            | MatchType::SemverGt
            | MatchType::SemverGe
            | MatchType::SemverLt
            | MatchType::SemverLe => value
                .as_str()
                .and_then(SemanticVersion::parse)
                .map(Expected::Version),
            MatchType::Exists => None,
        }
    }

    /// Condition as it appears in log messages.
    pub(crate) fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn is_valid_number(n: f64) -> bool {
    n.is_finite() && n.abs() <= MAX_NUMBER
}

/// A version string as compared by the `semver_*` match types.
///
/// The release part may have one to three numeric components. Build metadata is accepted and
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SemanticVersion {
    release: Vec<u64>,
    prerelease: Option<Prerelease>,
}

impl SemanticVersion {
    pub(crate) fn parse(s: &str) -> Option<SemanticVersion> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let pattern = PATTERN.get_or_init(|| {
            Regex::new(r"^\d+(\.\d+){0,2}(-[0-9A-Za-z.-]+)?(\+[0-9A-Za-z.-]+)?$")
                .expect("semantic version pattern should compile")
        });
        if !pattern.is_match(s) {
            return None;
        }

        let without_build = s.split_once('+').map_or(s, |(head, _)| head);
        let (release, prerelease) = match without_build.split_once('-') {
            Some((release, prerelease)) => (release, Some(Prerelease::new(prerelease).ok()?)),
            None => (without_build, None),
        };
        let release = release
            .split('.')
            .map(|part| part.parse().ok())
            .collect::<Option<Vec<u64>>>()?;

        Some(SemanticVersion { release, prerelease })
    }

    /// Compare `self` (the visitor's version) with `target` (the condition's version).
    ///
    /// Only the release components present in `target` are compared, so `2.1.7` equals target
    /// `2.1`. A release orders above any of its prereleases.
    pub(crate) fn compare_to_target(&self, target: &SemanticVersion) -> Ordering {
        for (i, target_part) in target.release.iter().enumerate() {
            let Some(part) = self.release.get(i) else {
                return if target.prerelease.is_some() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
            };
            match part.cmp(target_part) {
                Ordering::Equal => {}
                ordering => return ordering,
            }
        }

        match (&self.prerelease, &target.prerelease) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(ours), Some(theirs)) => ours.cmp(theirs),
        }
    }
}
