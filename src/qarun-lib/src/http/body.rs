use crate::error::BodyError;
use crate::model::{HttpMethod, RequestBody};
use crate::variables::{self, VariableMap};
use indexmap::IndexMap;
use serde_json::Value;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub enum PreparedBody {
    None,
    Json(Value),
    UrlEncoded(IndexMap<String, String>),
    Multipart(IndexMap<String, String>),
    Text(String),
}

impl PreparedBody {
    /// Body as it is reported back on the execution.
    pub fn display_text(&self) -> Option<String> {
        match self {
            PreparedBody::None => None,
            PreparedBody::Json(value) => Some(value.to_string()),
            PreparedBody::UrlEncoded(fields) | PreparedBody::Multipart(fields) => {
                serde_json::to_string(fields).ok()
            }
            PreparedBody::Text(text) => Some(text.clone()),
        }
    }
}

/// Substitutes and encodes the body. Returns the method to use, since GraphQL
/// always goes out as POST.
pub fn prepare(
    body: &RequestBody,
    method: HttpMethod,
    scopes: &[&VariableMap],
) -> Result<(HttpMethod, PreparedBody), BodyError> {
    if let RequestBody::GraphQl { query, variables } = body {
        return Ok((HttpMethod::POST, graphql(query, variables, scopes)?));
    }
    if !method.allows_body() {
        if !matches!(body, RequestBody::None) {
            tracing::debug!("{} request: body ignored", method);
        }
        return Ok((method, PreparedBody::None));
    }

    let prepared = match body {
        RequestBody::None => PreparedBody::None,
        RequestBody::Json(text) => match json(text, scopes)? {
            Some(value) => PreparedBody::Json(value),
            None => PreparedBody::None,
        },
        RequestBody::FormData(fields) => PreparedBody::Multipart(form_fields(fields, scopes)),
        RequestBody::FormUrlEncoded(fields) => {
            PreparedBody::UrlEncoded(form_fields(fields, scopes))
        }
        RequestBody::Raw(text) => PreparedBody::Text(variables::substitute(text, scopes)),
        RequestBody::GraphQl { .. } => PreparedBody::None,
    };
    Ok((method, prepared))
}

/// A template that already parses as JSON gets its string leaves substituted,
/// so values with quotes cannot break the document. Anything else is
/// substituted as text and must parse afterwards.
fn json(text: &str, scopes: &[&VariableMap]) -> Result<Option<Value>, BodyError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    if let Ok(template) = serde_json::from_str::<Value>(text) {
        return Ok(Some(variables::substitute_json(&template, scopes)));
    }
    let substituted = variables::substitute(text, scopes);
    serde_json::from_str(&substituted)
        .map(Some)
        .map_err(|e| BodyError::InvalidJson(e.to_string()))
}

fn form_fields(fields: &IndexMap<String, String>, scopes: &[&VariableMap]) -> IndexMap<String, String> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), variables::substitute(v, scopes)))
        .collect()
}

fn graphql(query: &str, variables: &str, scopes: &[&VariableMap]) -> Result<PreparedBody, BodyError> {
    let query = variables::substitute(query, scopes);
    let variables = match json(variables, scopes) {
        Ok(None) | Ok(Some(Value::Null)) => Value::Object(Default::default()),
        Ok(Some(value @ Value::Object(_))) => value,
        Ok(Some(other)) => return Err(BodyError::InvalidGraphQlVariables(other.to_string())),
        Err(BodyError::InvalidJson(e)) => return Err(BodyError::InvalidGraphQlVariables(e)),
        Err(e) => return Err(e),
    };
    Ok(PreparedBody::Json(serde_json::json!({
        "query": query,
        "variables": variables,
    })))
}
