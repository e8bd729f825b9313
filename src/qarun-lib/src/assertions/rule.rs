use crate::error::AssertionDefinitionError;
use crate::json_path;
use crate::model::{Assertion, AssertionOperator, AssertionType};
use regex::Regex;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityOp {
    Equals,
    NotEquals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundOp {
    LessThan,
    GreaterThan,
}

/// String comparison shared by HEADER_VALUE and JSON_PATH.
#[derive(Debug, Clone)]
pub enum ValueCheck {
    Equals(String),
    NotEquals(String),
    Contains(String),
    NotContains(String),
    MatchesRegex(Regex),
    Exists,
    NotExists,
}

/// An assertion whose type/operator pairing and expected value have been
/// validated. Built before the request is sent.
pub enum AssertionRule {
    StatusCode { op: EqualityOp, expected: u16 },
    ResponseTime { op: BoundOp, limit_ms: f64 },
    HeaderValue { name: String, check: ValueCheck },
    JsonPath { path: String, check: ValueCheck },
    SchemaValidation { schema: Box<jsonschema::JSONSchema> },
    Custom { expression: String },
}

pub struct CompiledAssertion<'a> {
    pub assertion: &'a Assertion,
    pub rule: AssertionRule,
}

/// Compiles enabled assertions, stopping at the first invalid definition.
pub fn compile_all(
    assertions: &[Assertion],
) -> Result<Vec<CompiledAssertion<'_>>, AssertionDefinitionError> {
    assertions
        .iter()
        .filter(|a| a.enabled)
        .map(|assertion| {
            Ok(CompiledAssertion {
                assertion,
                rule: compile(assertion)?,
            })
        })
        .collect()
}

pub fn compile(assertion: &Assertion) -> Result<AssertionRule, AssertionDefinitionError> {
    let id = || assertion.id.clone();
    let expected = assertion.expected_value.trim();

    if !assertion.assertion_type.accepts(assertion.operator) {
        return Err(AssertionDefinitionError::InvalidOperator {
            id: id(),
            assertion_type: assertion.assertion_type.to_string(),
            operator: assertion.operator.to_string(),
        });
    }

    let not_numeric = || AssertionDefinitionError::NotNumeric {
        id: id(),
        value: assertion.expected_value.clone(),
    };
    let field = || {
        let field = assertion.field.trim();
        if field.is_empty() {
            Err(AssertionDefinitionError::MissingField {
                id: id(),
                assertion_type: assertion.assertion_type.to_string(),
            })
        } else {
            Ok(field.to_string())
        }
    };

    Ok(match assertion.assertion_type {
        AssertionType::StatusCode => AssertionRule::StatusCode {
            op: match assertion.operator {
                AssertionOperator::NotEquals => EqualityOp::NotEquals,
                _ => EqualityOp::Equals,
            },
            expected: expected.parse::<u16>().map_err(|_| not_numeric())?,
        },
        AssertionType::ResponseTime => {
            let limit_ms = expected.parse::<f64>().map_err(|_| not_numeric())?;
            if !limit_ms.is_finite() || limit_ms < 0.0 {
                return Err(not_numeric());
            }
            AssertionRule::ResponseTime {
                op: match assertion.operator {
                    AssertionOperator::GreaterThan => BoundOp::GreaterThan,
                    _ => BoundOp::LessThan,
                },
                limit_ms,
            }
        }
        AssertionType::HeaderValue => AssertionRule::HeaderValue {
            name: field()?,
            check: value_check(assertion)?,
        },
        AssertionType::JsonPath => {
            let path = field()?;
            if json_path::parse_path(&path).is_none() {
                tracing::warn!("assertion {}: path '{}' cannot match anything", assertion.id, path);
            }
            AssertionRule::JsonPath {
                path,
                check: value_check(assertion)?,
            }
        }
        AssertionType::SchemaValidation => {
            let invalid = |message: String| AssertionDefinitionError::InvalidSchema {
                id: id(),
                message,
            };
            let schema: Value =
                serde_json::from_str(expected).map_err(|e| invalid(e.to_string()))?;
            let compiled =
                jsonschema::JSONSchema::compile(&schema).map_err(|e| invalid(e.to_string()))?;
            AssertionRule::SchemaValidation {
                schema: Box::new(compiled),
            }
        }
        AssertionType::Custom => {
            if expected.is_empty() {
                return Err(AssertionDefinitionError::EmptyExpression { id: id() });
            }
            AssertionRule::Custom {
                expression: assertion.expected_value.clone(),
            }
        }
    })
}

fn value_check(assertion: &Assertion) -> Result<ValueCheck, AssertionDefinitionError> {
    let expected = assertion.expected_value.clone();
    Ok(match assertion.operator {
        AssertionOperator::Equals => ValueCheck::Equals(expected),
        AssertionOperator::NotEquals => ValueCheck::NotEquals(expected),
        AssertionOperator::Contains => ValueCheck::Contains(expected),
        AssertionOperator::NotContains => ValueCheck::NotContains(expected),
        AssertionOperator::MatchesRegex => {
            ValueCheck::MatchesRegex(Regex::new(&expected).map_err(|e| {
                AssertionDefinitionError::InvalidRegex {
                    id: assertion.id.clone(),
                    pattern: expected.clone(),
                    message: e.to_string(),
                }
            })?)
        }
        AssertionOperator::Exists => ValueCheck::Exists,
        AssertionOperator::NotExists => ValueCheck::NotExists,
        other => {
            return Err(AssertionDefinitionError::InvalidOperator {
                id: assertion.id.clone(),
                assertion_type: assertion.assertion_type.to_string(),
                operator: other.to_string(),
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssertionOperator as Op;

    #[test]
    fn test_every_pair_outside_the_table_is_rejected() {
        for assertion_type in AssertionType::ALL {
            for operator in AssertionOperator::ALL {
                let expected = match assertion_type {
                    AssertionType::StatusCode => "200",
                    AssertionType::ResponseTime => "500",
                    AssertionType::SchemaValidation => r#"{"type":"object"}"#,
                    AssertionType::Custom => "status == 200",
                    _ => "x",
                };
                let assertion = Assertion::new(assertion_type, "data.id", operator, expected);
                let result = compile(&assertion);
                if assertion_type.accepts(operator) {
                    assert!(result.is_ok(), "{assertion_type} {operator} should compile");
                } else {
                    assert!(
                        matches!(result, Err(AssertionDefinitionError::InvalidOperator { .. })),
                        "{assertion_type} {operator} should be rejected"
                    );
                }
            }
        }
    }

    #[test]
    fn test_non_numeric_status_is_rejected() {
        let assertion = Assertion::new(AssertionType::StatusCode, "", Op::Equals, "OK");
        assert!(matches!(
            compile(&assertion),
            Err(AssertionDefinitionError::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_negative_response_time_is_rejected() {
        let assertion = Assertion::new(AssertionType::ResponseTime, "", Op::LessThan, "-5");
        assert!(compile(&assertion).is_err());
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let assertion = Assertion::new(AssertionType::HeaderValue, "x-id", Op::MatchesRegex, "(");
        assert!(matches!(
            compile(&assertion),
            Err(AssertionDefinitionError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_header_assertion_needs_field() {
        let assertion = Assertion::new(AssertionType::HeaderValue, " ", Op::Exists, "");
        assert!(matches!(
            compile(&assertion),
            Err(AssertionDefinitionError::MissingField { .. })
        ));
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let assertion =
            Assertion::new(AssertionType::SchemaValidation, "", Op::Equals, "{not json");
        assert!(matches!(
            compile(&assertion),
            Err(AssertionDefinitionError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_disabled_assertions_are_not_compiled() {
        let mut broken = Assertion::new(AssertionType::StatusCode, "", Op::Contains, "x");
        broken.enabled = false;
        let ok = Assertion::new(AssertionType::StatusCode, "", Op::Equals, "200");
        let assertions = vec![broken, ok];
        let compiled = compile_all(&assertions).unwrap();
        assert_eq!(compiled.len(), 1);
    }
}
