//! Playwright (`@playwright/test`) export of a request and its assertions.

use crate::json_path::{self, PathStep};
use crate::model::{
    Assertion, AssertionOperator, AssertionType, Execution, HttpMethod, Request, RequestBody,
};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt::Write;

/// Body as it appears in the generated request options.
enum BodyOption {
    Data(Value),
    Multipart(Value),
    Form(Value),
}

struct RequestView {
    method: HttpMethod,
    url: String,
    headers: IndexMap<String, String>,
    query: IndexMap<String, String>,
    body: Option<BodyOption>,
}

impl RequestView {
    /// Prefers what was actually sent; the URL then already carries the query.
    fn new(request: &Request, execution: Option<&Execution>) -> Self {
        match execution.and_then(|e| e.sent_request.as_ref()) {
            Some(sent) => RequestView {
                method: sent.method,
                url: sent.url.clone(),
                headers: sent.headers.clone(),
                query: IndexMap::new(),
                body: sent
                    .body
                    .as_deref()
                    .and_then(|text| sent_body(&request.body, text)),
            },
            None => RequestView {
                method: match request.body {
                    RequestBody::GraphQl { .. } => HttpMethod::POST,
                    _ => request.method,
                },
                url: request.url.clone(),
                headers: request.headers.clone(),
                query: request.query_params.clone(),
                body: stored_body(&request.body, request.method),
            },
        }
    }
}

fn parse_or_text(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn sent_body(body: &RequestBody, text: &str) -> Option<BodyOption> {
    Some(match body {
        RequestBody::None => return None,
        RequestBody::FormData(_) => BodyOption::Multipart(parse_or_text(text)),
        RequestBody::FormUrlEncoded(_) => BodyOption::Form(parse_or_text(text)),
        RequestBody::Raw(_) => BodyOption::Data(Value::String(text.to_string())),
        RequestBody::Json(_) | RequestBody::GraphQl { .. } => BodyOption::Data(parse_or_text(text)),
    })
}

fn fields_to_value(fields: &IndexMap<String, String>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

fn stored_body(body: &RequestBody, method: HttpMethod) -> Option<BodyOption> {
    if let RequestBody::GraphQl { query, variables } = body {
        let variables = serde_json::from_str::<Value>(variables)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| Value::Object(Default::default()));
        return Some(BodyOption::Data(serde_json::json!({
            "query": query,
            "variables": variables,
        })));
    }
    if !method.allows_body() {
        return None;
    }
    match body {
        RequestBody::Json(text) if !text.trim().is_empty() => {
            Some(BodyOption::Data(parse_or_text(text)))
        }
        RequestBody::Raw(text) if !text.is_empty() => {
            Some(BodyOption::Data(Value::String(text.clone())))
        }
        RequestBody::FormData(fields) if !fields.is_empty() => {
            Some(BodyOption::Multipart(fields_to_value(fields)))
        }
        RequestBody::FormUrlEncoded(fields) if !fields.is_empty() => {
            Some(BodyOption::Form(fields_to_value(fields)))
        }
        _ => None,
    }
}

fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

/// Pretty JSON, continuation lines indented to sit inside the options object.
fn js_value(value: &Value) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|_| value.to_string())
        .replace('\n', "\n    ")
}

fn map_value(map: &IndexMap<String, String>) -> Value {
    fields_to_value(map)
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// `items[0].id` becomes `data?.items?.[0]?.id`, so a missing intermediate
/// key yields `undefined` instead of a TypeError. Keys that are not
/// identifiers use bracket access.
fn data_accessor(path: &str) -> String {
    let Some(steps) = json_path::parse_path(path) else {
        return format!("data?.{path}");
    };
    let mut accessor = String::from("data");
    for step in steps {
        match step {
            PathStep::Index(i) => {
                let _ = write!(accessor, "?.[{i}]");
            }
            PathStep::Key(key) if is_identifier(&key) => {
                let _ = write!(accessor, "?.{key}");
            }
            PathStep::Key(key) => {
                let _ = write!(accessor, "?.[{}]", js_string(&key));
            }
        }
    }
    accessor
}

/// Numbers, booleans and null compare as themselves; everything else as a string.
fn expected_literal(expected: &str) -> String {
    match serde_json::from_str::<Value>(expected.trim()) {
        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => value.to_string(),
        _ => js_string(expected),
    }
}

fn matcher(operator: AssertionOperator, expected: &str, literal: bool) -> String {
    let value = || {
        if literal {
            expected_literal(expected)
        } else {
            js_string(expected)
        }
    };
    match operator {
        AssertionOperator::Equals => format!("toBe({})", value()),
        AssertionOperator::NotEquals => format!("not.toBe({})", value()),
        AssertionOperator::Contains => format!("toContain({})", js_string(expected)),
        AssertionOperator::NotContains => format!("not.toContain({})", js_string(expected)),
        AssertionOperator::GreaterThan => format!("toBeGreaterThan({})", expected.trim()),
        AssertionOperator::LessThan => format!("toBeLessThan({})", expected.trim()),
        AssertionOperator::MatchesRegex => format!("toMatch(new RegExp({}))", js_string(expected)),
        AssertionOperator::Exists => "toBeDefined()".to_string(),
        AssertionOperator::NotExists => "toBeUndefined()".to_string(),
        AssertionOperator::Custom => "toBeTruthy()".to_string(),
    }
}

fn assertion_line(assertion: &Assertion) -> String {
    let expected = assertion.expected_value.as_str();
    match assertion.assertion_type {
        AssertionType::StatusCode => format!(
            "  expect(response.status()).{};\n",
            matcher(assertion.operator, expected, true)
        ),
        AssertionType::ResponseTime => format!(
            "  expect(responseTime).{};\n",
            matcher(assertion.operator, expected, true)
        ),
        AssertionType::HeaderValue => format!(
            "  expect(response.headers()[{}]).{};\n",
            js_string(&assertion.field.trim().to_ascii_lowercase()),
            matcher(assertion.operator, expected, false)
        ),
        // The engine compares JSON values by their text, so equality does too.
        AssertionType::JsonPath
            if matches!(
                assertion.operator,
                AssertionOperator::Equals | AssertionOperator::NotEquals
            ) =>
        {
            format!(
                "  expect(String({})).{};\n",
                data_accessor(assertion.field.trim()),
                matcher(assertion.operator, expected, false)
            )
        }
        AssertionType::JsonPath => format!(
            "  expect({}).{};\n",
            data_accessor(assertion.field.trim()),
            matcher(assertion.operator, expected, true)
        ),
        AssertionType::SchemaValidation => {
            "  // Schema validation needs a JSON schema validator; not generated\n".to_string()
        }
        AssertionType::Custom => format!(
            "  // Custom check (qarun expression): {}\n",
            expected.trim().replace('\n', " ")
        ),
    }
}

/// Builds a standalone Playwright test. Uses the request as sent when an
/// execution is given, otherwise the stored request with its placeholders.
pub fn generate_code(request: &Request, execution: Option<&Execution>) -> String {
    let view = RequestView::new(request, execution);
    let assertions: Vec<&Assertion> = request.assertions.iter().filter(|a| a.enabled).collect();

    let mut options = Vec::new();
    if view.method == HttpMethod::OPTIONS {
        options.push("    method: \"OPTIONS\"".to_string());
    }
    if !view.headers.is_empty() {
        options.push(format!("    headers: {}", js_value(&map_value(&view.headers))));
    }
    if !view.query.is_empty() {
        options.push(format!("    params: {}", js_value(&map_value(&view.query))));
    }
    match &view.body {
        Some(BodyOption::Data(value)) => options.push(format!("    data: {}", js_value(value))),
        Some(BodyOption::Multipart(value)) => {
            options.push(format!("    multipart: {}", js_value(value)))
        }
        Some(BodyOption::Form(value)) => options.push(format!("    form: {}", js_value(value))),
        None => {}
    }
    let options = if options.is_empty() {
        String::new()
    } else {
        format!(",\n  {{\n{}\n  }}", options.join(",\n"))
    };

    let call = match view.method {
        HttpMethod::OPTIONS => "fetch".to_string(),
        method => method.as_str().to_ascii_lowercase(),
    };
    let title = format!("{} {}", view.method, request_title(request, &view));

    let mut code = String::from("import { test, expect } from '@playwright/test';\n\n");
    let _ = writeln!(code, "test({}, async ({{ request }}) => {{", js_string(&title));

    if let Some(script) = request
        .pre_request_script
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        code.push_str("  // Pre-request script (qarun), applied to the values below:\n");
        for line in script.trim().lines() {
            let _ = writeln!(code, "  // {line}");
        }
        code.push('\n');
    }

    code.push_str("  const startTime = Date.now();\n\n");
    let _ = writeln!(code, "  const response = await request.{call}(");
    let _ = writeln!(code, "  {}{options}", js_string(&view.url));
    code.push_str("  );\n\n");
    code.push_str("  const responseTime = Date.now() - startTime;\n\n");

    code.push_str("  // Assertions\n");
    if !assertions
        .iter()
        .any(|a| a.assertion_type == AssertionType::StatusCode)
    {
        code.push_str("  expect(response.ok()).toBeTruthy();\n");
    }
    if assertions
        .iter()
        .any(|a| a.assertion_type == AssertionType::JsonPath)
    {
        code.push_str("  const data = await response.json();\n");
    }
    for assertion in &assertions {
        code.push_str(&assertion_line(assertion));
    }

    code.push_str("\n  // Log response for debugging\n");
    code.push_str("  console.log('Status:', response.status());\n");
    code.push_str("  console.log('Response Time:', responseTime + 'ms');\n");
    code.push_str("  try {\n");
    code.push_str("    const responseBody = await response.json();\n");
    code.push_str("    console.log('Response Body:', JSON.stringify(responseBody, null, 2));\n");
    code.push_str("  } catch (e) {\n");
    code.push_str("    console.log('Response Body (text):', await response.text());\n");
    code.push_str("  }\n");
    code.push_str("});\n");
    code
}

fn request_title(request: &Request, view: &RequestView) -> String {
    if request.title.trim().is_empty() {
        view.url.clone()
    } else {
        request.title.trim().to_string()
    }
}
