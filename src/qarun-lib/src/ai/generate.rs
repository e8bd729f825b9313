use super::client::{CompletionOptions, CompletionService};
use crate::assertions;
use crate::error::AiError;
use crate::json_path;
use crate::model::{Assertion, AssertionType, HttpMethod, Request, RequestBody};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

const MAX_BODY_CHARS: usize = 5000;

const ASSERTIONS_SYSTEM: &str =
    "You are a QA expert who generates API assertions. Always return valid JSON.";
const REQUEST_SYSTEM: &str =
    "You are a QA expert who generates API requests. Always return valid JSON.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAssertion {
    #[serde(flatten)]
    pub assertion: Assertion,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRequest {
    pub request: Request,
    pub description: String,
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

fn operator_table() -> String {
    AssertionType::ALL
        .iter()
        .map(|t| {
            let operators: Vec<&str> = t.allowed_operators().iter().map(|o| o.as_str()).collect();
            format!("- {}: {}", t.as_str(), operators.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn assertions_prompt(body: &str, status: u16) -> String {
    format!(
        r#"Analyze this API response and suggest meaningful assertions:

Status Code: {status}
Response Body:
{body}

Suggest assertions that validate:
1. Critical fields exist and have correct types
2. Business logic constraints (e.g., email format, age > 0)
3. Response structure matches expected schema

Return ONLY a valid JSON array of assertions with this exact structure:
[
  {{
    "type": "JSON_PATH",
    "field": "data.user.email",
    "operator": "MATCHES_REGEX",
    "expectedValue": "^[^@]+@[^@]+\\.[^@]+$",
    "description": "Email should be valid format"
  }}
]

Allowed operators per type:
{table}
"#,
        body = truncate(body, MAX_BODY_CHARS),
        table = operator_table(),
    )
}

fn request_prompt(description: &str) -> String {
    format!(
        r#"Generate an API request based on this description:

"{description}"

Return ONLY a valid JSON object with this exact structure:
{{
  "title": "Request Title",
  "method": "GET",
  "url": "/users",
  "headers": {{ "Content-Type": "application/json" }},
  "queryParams": {{ "page": "1" }},
  "body": {{ "key": "value" }},
  "description": "Brief description of what this request does"
}}

"method" is one of GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS. "body" is null when there is none.
Important: Return ONLY the JSON object, no markdown formatting."#
    )
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_json(content: &str) -> Result<Value, AiError> {
    serde_json::from_str(strip_code_fences(content)).map_err(|e| AiError::Parse(e.to_string()))
}

fn string_map(value: Option<&Value>, index: usize, field: &str) -> Result<IndexMap<String, String>, AiError> {
    match value {
        None | Some(Value::Null) => Ok(IndexMap::new()),
        Some(Value::Object(entries)) => Ok(entries
            .iter()
            .map(|(k, v)| (k.clone(), json_path::value_to_string(v)))
            .collect()),
        Some(_) => Err(AiError::InvalidItem {
            index,
            message: format!("{field} must be an object"),
        }),
    }
}

/// Turns a reply into typed assertions. One bad item rejects the whole reply.
pub fn parse_assertions(content: &str) -> Result<Vec<GeneratedAssertion>, AiError> {
    let Value::Array(items) = parse_json(content)? else {
        return Err(AiError::Parse("expected a JSON array".to_string()));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, mut item)| {
            let description = item
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if let Some(fields) = item.as_object_mut() {
                fields.remove("description");
                fields.remove("id");
            }
            let assertion: Assertion =
                serde_json::from_value(item).map_err(|e| AiError::InvalidItem {
                    index,
                    message: e.to_string(),
                })?;
            assertions::compile(&assertion).map_err(|e| AiError::InvalidItem {
                index,
                message: e.to_string(),
            })?;
            Ok(GeneratedAssertion {
                assertion,
                description,
            })
        })
        .collect()
}

/// Turns a reply into a request with no collection yet.
pub fn parse_request(content: &str) -> Result<GeneratedRequest, AiError> {
    let value = parse_json(content)?;
    let Value::Object(fields) = value else {
        return Err(AiError::Parse("expected a JSON object".to_string()));
    };
    let invalid = |message: String| AiError::InvalidItem { index: 0, message };
    let text = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };

    let url = text("url");
    if url.is_empty() {
        return Err(invalid("url is missing".to_string()));
    }
    let method_text = text("method");
    let method = if method_text.is_empty() {
        HttpMethod::GET
    } else {
        HttpMethod::parse(&method_text)
            .ok_or_else(|| invalid(format!("unknown method '{method_text}'")))?
    };
    let body = match fields.get("body") {
        None | Some(Value::Null) => RequestBody::None,
        Some(Value::String(raw)) if raw.trim().is_empty() => RequestBody::None,
        Some(Value::String(raw)) => RequestBody::Raw(raw.clone()),
        Some(json) => RequestBody::Json(
            serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string()),
        ),
    };
    let title = match text("title") {
        t if t.is_empty() => format!("{method} {url}"),
        t => t,
    };
    let description = text("description");

    Ok(GeneratedRequest {
        request: Request {
            title,
            description: Some(description.clone()).filter(|d| !d.is_empty()),
            method,
            url,
            headers: string_map(fields.get("headers"), 0, "headers")?,
            query_params: string_map(fields.get("queryParams"), 0, "queryParams")?,
            body,
            ..Default::default()
        },
        description,
    })
}

pub async fn generate_assertions(
    service: &dyn CompletionService,
    body: &str,
    status: u16,
) -> Result<Vec<GeneratedAssertion>, AiError> {
    let prompt = assertions_prompt(body, status);
    let options = CompletionOptions {
        temperature: Some(0.5),
        max_tokens: Some(1500),
    };
    let content = service.complete(ASSERTIONS_SYSTEM, &prompt, options).await?;
    parse_assertions(&content)
}

pub async fn generate_request(
    service: &dyn CompletionService,
    description: &str,
) -> Result<GeneratedRequest, AiError> {
    let prompt = request_prompt(description);
    let options = CompletionOptions {
        temperature: Some(0.7),
        max_tokens: Some(1000),
    };
    let content = service.complete(REQUEST_SYSTEM, &prompt, options).await?;
    parse_request(&content)
}
