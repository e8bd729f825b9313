use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssertionType {
    StatusCode,
    ResponseTime,
    HeaderValue,
    JsonPath,
    SchemaValidation,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssertionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    MatchesRegex,
    Exists,
    NotExists,
    Custom,
}

use AssertionOperator as Op;

const STATUS_CODE_OPERATORS: &[Op] = &[Op::Equals, Op::NotEquals];
const RESPONSE_TIME_OPERATORS: &[Op] = &[Op::LessThan, Op::GreaterThan];
const VALUE_OPERATORS: &[Op] = &[
    Op::Equals,
    Op::NotEquals,
    Op::Contains,
    Op::NotContains,
    Op::MatchesRegex,
    Op::Exists,
    Op::NotExists,
];
const SCHEMA_OPERATORS: &[Op] = &[Op::Equals];
const CUSTOM_OPERATORS: &[Op] = &[Op::Custom];

impl AssertionType {
    pub const ALL: [AssertionType; 6] = [
        AssertionType::StatusCode,
        AssertionType::ResponseTime,
        AssertionType::HeaderValue,
        AssertionType::JsonPath,
        AssertionType::SchemaValidation,
        AssertionType::Custom,
    ];

    /// Operators this assertion type accepts. Anything else is a definition error.
    pub fn allowed_operators(&self) -> &'static [AssertionOperator] {
        match self {
            AssertionType::StatusCode => STATUS_CODE_OPERATORS,
            AssertionType::ResponseTime => RESPONSE_TIME_OPERATORS,
            AssertionType::HeaderValue | AssertionType::JsonPath => VALUE_OPERATORS,
            AssertionType::SchemaValidation => SCHEMA_OPERATORS,
            AssertionType::Custom => CUSTOM_OPERATORS,
        }
    }

    pub fn accepts(&self, operator: AssertionOperator) -> bool {
        self.allowed_operators().contains(&operator)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssertionType::StatusCode => "STATUS_CODE",
            AssertionType::ResponseTime => "RESPONSE_TIME",
            AssertionType::HeaderValue => "HEADER_VALUE",
            AssertionType::JsonPath => "JSON_PATH",
            AssertionType::SchemaValidation => "SCHEMA_VALIDATION",
            AssertionType::Custom => "CUSTOM",
        }
    }
}

impl AssertionOperator {
    pub const ALL: [AssertionOperator; 10] = [
        Op::Equals,
        Op::NotEquals,
        Op::Contains,
        Op::NotContains,
        Op::GreaterThan,
        Op::LessThan,
        Op::MatchesRegex,
        Op::Exists,
        Op::NotExists,
        Op::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Equals => "EQUALS",
            Op::NotEquals => "NOT_EQUALS",
            Op::Contains => "CONTAINS",
            Op::NotContains => "NOT_CONTAINS",
            Op::GreaterThan => "GREATER_THAN",
            Op::LessThan => "LESS_THAN",
            Op::MatchesRegex => "MATCHES_REGEX",
            Op::Exists => "EXISTS",
            Op::NotExists => "NOT_EXISTS",
            Op::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for AssertionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AssertionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    #[serde(default = "super::new_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub assertion_type: AssertionType,
    #[serde(default)]
    pub field: String,
    pub operator: AssertionOperator,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub expected_value: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Assertion {
    pub fn new(
        assertion_type: AssertionType,
        field: impl Into<String>,
        operator: AssertionOperator,
        expected_value: impl Into<String>,
    ) -> Self {
        Self {
            id: super::new_id(),
            assertion_type,
            field: field.into(),
            operator,
            expected_value: expected_value.into(),
            enabled: true,
        }
    }
}

/// Stored and generated assertions carry `expectedValue` as a string, a
/// number or a boolean. All of them compare as text.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
