mod rule;

pub use rule::{compile, compile_all, AssertionRule, BoundOp, CompiledAssertion, EqualityOp, ValueCheck};

use crate::config::EngineConfig;
use crate::error::AssertionDefinitionError;
use crate::http::HttpResponse;
use crate::json_path;
use crate::model::{Assertion, AssertionResult, ExecutionStatus};
use crate::script::{self, ResponseContext};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct AssertionReport {
    pub status: ExecutionStatus,
    pub failures: Vec<String>,
    pub results: Vec<AssertionResult>,
}

impl AssertionReport {
    pub fn passed(&self) -> bool {
        self.status == ExecutionStatus::Passed
    }
}

/// Compiles and evaluates in one step. Definition errors surface before any
/// assertion is checked.
pub fn evaluate(
    assertions: &[Assertion],
    response: &HttpResponse,
    config: &EngineConfig,
) -> Result<AssertionReport, AssertionDefinitionError> {
    let compiled = compile_all(assertions)?;
    Ok(evaluate_compiled(&compiled, response, config))
}

pub fn evaluate_compiled(
    compiled: &[CompiledAssertion],
    response: &HttpResponse,
    config: &EngineConfig,
) -> AssertionReport {
    let json: Option<Value> = serde_json::from_str(&response.body).ok();
    let mut failures = Vec::new();
    let mut results = Vec::with_capacity(compiled.len());

    for item in compiled {
        let outcome = check(&item.rule, response, json.as_ref(), config);
        let message = match outcome {
            Ok(()) => None,
            Err(reason) => {
                let message = describe(item.assertion, &reason);
                failures.push(message.clone());
                Some(message)
            }
        };
        results.push(AssertionResult {
            assertion_id: item.assertion.id.clone(),
            assertion_type: item.assertion.assertion_type,
            passed: message.is_none(),
            message,
        });
    }

    let status = if failures.is_empty() {
        ExecutionStatus::Passed
    } else {
        ExecutionStatus::Failed
    };
    AssertionReport {
        status,
        failures,
        results,
    }
}

fn describe(assertion: &Assertion, reason: &str) -> String {
    if assertion.field.trim().is_empty() {
        format!("{}: {}", assertion.assertion_type, reason)
    } else {
        format!("{} {}: {}", assertion.assertion_type, assertion.field.trim(), reason)
    }
}

fn check(
    rule: &AssertionRule,
    response: &HttpResponse,
    json: Option<&Value>,
    config: &EngineConfig,
) -> Result<(), String> {
    match rule {
        AssertionRule::StatusCode { op, expected } => {
            let actual = response.status;
            match op {
                EqualityOp::Equals if actual != *expected => {
                    Err(format!("expected status {expected}, got {actual}"))
                }
                EqualityOp::NotEquals if actual == *expected => {
                    Err(format!("expected status other than {expected}"))
                }
                _ => Ok(()),
            }
        }
        AssertionRule::ResponseTime { op, limit_ms } => {
            let actual = response.elapsed.as_secs_f64() * 1000.0;
            let shown = response.elapsed_ms();
            match op {
                BoundOp::LessThan if actual >= *limit_ms => Err(format!(
                    "expected response time below {limit_ms} ms, took {shown} ms"
                )),
                BoundOp::GreaterThan if actual <= *limit_ms => Err(format!(
                    "expected response time above {limit_ms} ms, took {shown} ms"
                )),
                _ => Ok(()),
            }
        }
        AssertionRule::HeaderValue { name, check } => {
            let actual = response.header(name).map(|v| Actual::Text(v.to_string()));
            check_value(check, actual.as_ref(), "header")
        }
        AssertionRule::JsonPath { path, check } => {
            let Some(root) = json else {
                return Err("response body is not valid JSON".to_string());
            };
            let actual = json_path::resolve(path, root).map(Actual::from_json);
            check_value(check, actual.as_ref(), "path")
        }
        AssertionRule::SchemaValidation { schema } => {
            let Some(instance) = json else {
                return Err("response body is not valid JSON".to_string());
            };
            if let Err(errors) = schema.validate(instance) {
                let messages: Vec<String> = errors
                    .map(|e| {
                        let at = e.instance_path.to_string();
                        if at.is_empty() {
                            e.to_string()
                        } else {
                            format!("{e} at {at}")
                        }
                    })
                    .collect();
                return Err(format!("schema mismatch: {}", messages.join("; ")));
            }
            Ok(())
        }
        AssertionRule::Custom { expression } => {
            let context = ResponseContext {
                status: response.status,
                response_time_ms: response.elapsed_ms(),
                body: &response.body,
                headers: &response.headers,
                json,
            };
            match script::eval_condition(expression, &context, config) {
                Ok(true) => Ok(()),
                Ok(false) => Err(format!("expression returned false: {}", expression.trim())),
                Err(e) => Err(format!("expression failed: {e}")),
            }
        }
    }
}

/// The observed value. Arrays keep their items so CONTAINS can test
/// membership.
enum Actual {
    Text(String),
    List(Vec<String>, String),
}

impl Actual {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => Actual::List(
                items.iter().map(json_path::value_to_string).collect(),
                json_path::value_to_string(value),
            ),
            other => Actual::Text(json_path::value_to_string(other)),
        }
    }

    fn text(&self) -> &str {
        match self {
            Actual::Text(text) | Actual::List(_, text) => text,
        }
    }

    fn contains(&self, needle: &str) -> bool {
        match self {
            Actual::Text(text) => text.contains(needle),
            Actual::List(items, _) => items.iter().any(|item| item == needle),
        }
    }
}

fn check_value(check: &ValueCheck, actual: Option<&Actual>, what: &str) -> Result<(), String> {
    let missing = || Err(format!("{what} not found"));
    match (check, actual) {
        (ValueCheck::Exists, Some(_)) | (ValueCheck::NotExists, None) => Ok(()),
        (ValueCheck::Exists, None) => missing(),
        (ValueCheck::NotExists, Some(actual)) => {
            Err(format!("expected {what} to be absent, found '{}'", actual.text()))
        }
        (ValueCheck::Equals(_) | ValueCheck::Contains(_) | ValueCheck::MatchesRegex(_), None) => {
            missing()
        }
        (ValueCheck::NotEquals(_) | ValueCheck::NotContains(_), None) => Ok(()),
        (ValueCheck::Equals(expected), Some(actual)) => {
            if actual.text() == expected {
                Ok(())
            } else {
                Err(format!("expected '{expected}', got '{}'", actual.text()))
            }
        }
        (ValueCheck::NotEquals(expected), Some(actual)) => {
            if actual.text() != expected {
                Ok(())
            } else {
                Err(format!("expected a value other than '{expected}'"))
            }
        }
        (ValueCheck::Contains(expected), Some(actual)) => {
            if actual.contains(expected) {
                Ok(())
            } else {
                Err(format!("expected '{}' to contain '{expected}'", actual.text()))
            }
        }
        (ValueCheck::NotContains(expected), Some(actual)) => {
            if !actual.contains(expected) {
                Ok(())
            } else {
                Err(format!("expected '{}' not to contain '{expected}'", actual.text()))
            }
        }
        (ValueCheck::MatchesRegex(pattern), Some(actual)) => {
            if pattern.is_match(actual.text()) {
                Ok(())
            } else {
                Err(format!("'{}' does not match /{}/", actual.text(), pattern.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssertionOperator as Op, AssertionType as Type};
    use indexmap::IndexMap;
    use std::time::Duration;

    fn response(status: u16, body: &str, elapsed_ms: u64) -> HttpResponse {
        let mut headers = IndexMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        headers.insert("x-request-id".to_string(), "req-42".to_string());
        HttpResponse {
            status,
            headers,
            body: body.to_string(),
            elapsed: Duration::from_millis(elapsed_ms),
        }
    }

    fn run(assertions: Vec<Assertion>, response: &HttpResponse) -> AssertionReport {
        evaluate(&assertions, response, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_assertions_pass() {
        let report = run(vec![], &response(500, "", 10));
        assert!(report.passed());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_status_code() {
        let r = response(201, "{}", 10);
        assert!(run(vec![Assertion::new(Type::StatusCode, "", Op::Equals, "201")], &r).passed());
        let report = run(vec![Assertion::new(Type::StatusCode, "", Op::Equals, "200")], &r);
        assert_eq!(report.status, ExecutionStatus::Failed);
        assert_eq!(report.failures, vec!["STATUS_CODE: expected status 200, got 201"]);
        assert!(run(vec![Assertion::new(Type::StatusCode, "", Op::NotEquals, "500")], &r).passed());
    }

    #[test]
    fn test_response_time_bounds() {
        let r = response(200, "{}", 120);
        assert!(run(vec![Assertion::new(Type::ResponseTime, "", Op::LessThan, "500")], &r).passed());
        assert!(!run(vec![Assertion::new(Type::ResponseTime, "", Op::LessThan, "100")], &r).passed());
        assert!(run(vec![Assertion::new(Type::ResponseTime, "", Op::GreaterThan, "100")], &r).passed());
    }

    #[test]
    fn test_header_value_checks() {
        let r = response(200, "{}", 10);
        let passing = vec![
            Assertion::new(Type::HeaderValue, "Content-Type", Op::Contains, "json"),
            Assertion::new(Type::HeaderValue, "x-request-id", Op::MatchesRegex, r"^req-\d+$"),
            Assertion::new(Type::HeaderValue, "x-request-id", Op::Exists, ""),
            Assertion::new(Type::HeaderValue, "x-missing", Op::NotExists, ""),
            Assertion::new(Type::HeaderValue, "x-missing", Op::NotEquals, "a"),
        ];
        let report = run(passing, &r);
        assert!(report.passed(), "{:?}", report.failures);

        let report = run(
            vec![Assertion::new(Type::HeaderValue, "x-missing", Op::Equals, "a")],
            &r,
        );
        assert_eq!(report.failures, vec!["HEADER_VALUE x-missing: header not found"]);
    }

    #[test]
    fn test_json_path_checks() {
        let r = response(
            200,
            r#"{"data":{"id":7,"name":"Ada","tags":["admin","ops"],"none":null}}"#,
            10,
        );
        let passing = vec![
            Assertion::new(Type::JsonPath, "data.id", Op::Equals, "7"),
            Assertion::new(Type::JsonPath, "$.data.name", Op::Contains, "Ad"),
            Assertion::new(Type::JsonPath, "data.tags", Op::Contains, "ops"),
            Assertion::new(Type::JsonPath, "data.tags", Op::NotContains, "op"),
            Assertion::new(Type::JsonPath, "data.tags[0]", Op::Equals, "admin"),
            Assertion::new(Type::JsonPath, "data.none", Op::Exists, ""),
            Assertion::new(Type::JsonPath, "data.missing", Op::NotExists, ""),
        ];
        let report = run(passing, &r);
        assert!(report.passed(), "{:?}", report.failures);

        let report = run(vec![Assertion::new(Type::JsonPath, "data.id", Op::Equals, "8")], &r);
        assert_eq!(report.failures, vec!["JSON_PATH data.id: expected '8', got '7'"]);
    }

    #[test]
    fn test_json_path_on_non_json_body_fails() {
        let r = response(200, "<html></html>", 10);
        let report = run(
            vec![Assertion::new(Type::JsonPath, "data", Op::NotExists, "")],
            &r,
        );
        assert_eq!(report.status, ExecutionStatus::Failed);
        assert!(report.failures[0].contains("not valid JSON"));
    }

    #[test]
    fn test_schema_validation() {
        let schema = r#"{"type":"object","required":["id"],"properties":{"id":{"type":"integer"}}}"#;
        let assertion = Assertion::new(Type::SchemaValidation, "", Op::Equals, schema);
        assert!(run(vec![assertion.clone()], &response(200, r#"{"id":1}"#, 1)).passed());
        let report = run(vec![assertion], &response(200, r#"{"id":"x"}"#, 1));
        assert!(!report.passed());
        assert!(report.failures[0].contains("schema mismatch"));
    }

    #[test]
    fn test_custom_expression() {
        let r = response(200, r#"{"items":[1,2]}"#, 10);
        let ok = Assertion::new(Type::Custom, "", Op::Custom, "json.items.len() == 2");
        let bad = Assertion::new(Type::Custom, "", Op::Custom, "status == 404");
        let report = run(vec![ok, bad], &r);
        assert_eq!(report.results.len(), 2);
        assert!(report.results[0].passed);
        assert!(!report.results[1].passed);
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_disabled_assertions_are_ignored() {
        let mut failing = Assertion::new(Type::StatusCode, "", Op::Equals, "404");
        failing.enabled = false;
        let report = run(vec![failing], &response(200, "", 1));
        assert!(report.passed());
        assert!(report.results.is_empty());
    }

    #[test]
    fn test_definition_error_is_reported_before_checks() {
        let assertions = vec![
            Assertion::new(Type::StatusCode, "", Op::Equals, "200"),
            Assertion::new(Type::StatusCode, "", Op::Contains, "20"),
        ];
        let result = evaluate(&assertions, &response(200, "", 1), &EngineConfig::default());
        assert!(matches!(
            result,
            Err(AssertionDefinitionError::InvalidOperator { .. })
        ));
    }
}
