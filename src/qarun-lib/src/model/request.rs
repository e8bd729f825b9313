use super::{Assertion, ExtractionRule, HttpMethod};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire tag for [`RequestBody`], stored next to the body as `bodyType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType {
    #[default]
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "FORM_DATA")]
    FormData,
    #[serde(rename = "FORM_URLENCODED")]
    FormUrlEncoded,
    #[serde(rename = "RAW")]
    Raw,
    #[serde(rename = "GRAPHQL")]
    GraphQl,
}

impl BodyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::None => "NONE",
            BodyType::Json => "JSON",
            BodyType::FormData => "FORM_DATA",
            BodyType::FormUrlEncoded => "FORM_URLENCODED",
            BodyType::Raw => "RAW",
            BodyType::GraphQl => "GRAPHQL",
        }
    }
}

/// Request payload. Every string inside is a template.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    None,
    /// JSON text; parsed only after substitution.
    Json(String),
    FormData(IndexMap<String, String>),
    FormUrlEncoded(IndexMap<String, String>),
    Raw(String),
    GraphQl { query: String, variables: String },
}

impl RequestBody {
    pub fn body_type(&self) -> BodyType {
        match self {
            RequestBody::None => BodyType::None,
            RequestBody::Json(_) => BodyType::Json,
            RequestBody::FormData(_) => BodyType::FormData,
            RequestBody::FormUrlEncoded(_) => BodyType::FormUrlEncoded,
            RequestBody::Raw(_) => BodyType::Raw,
            RequestBody::GraphQl { .. } => BodyType::GraphQl,
        }
    }

    pub fn from_wire(body_type: BodyType, body: Option<Value>) -> Result<Self, String> {
        let body = body.unwrap_or(Value::Null);
        Ok(match body_type {
            BodyType::None => RequestBody::None,
            BodyType::Json => RequestBody::Json(value_to_text(body)),
            BodyType::Raw => RequestBody::Raw(value_to_text(body)),
            BodyType::FormData => RequestBody::FormData(value_to_fields(body)?),
            BodyType::FormUrlEncoded => RequestBody::FormUrlEncoded(value_to_fields(body)?),
            BodyType::GraphQl => match body {
                Value::Null => RequestBody::GraphQl {
                    query: String::new(),
                    variables: String::new(),
                },
                Value::String(query) => RequestBody::GraphQl {
                    query,
                    variables: String::new(),
                },
                Value::Object(mut map) => RequestBody::GraphQl {
                    query: map.remove("query").map(value_to_text).unwrap_or_default(),
                    variables: map
                        .remove("variables")
                        .map(value_to_text)
                        .unwrap_or_default(),
                },
                other => return Err(format!("GraphQL body must be an object, got {other}")),
            },
        })
    }

    pub fn to_wire(&self) -> Option<Value> {
        match self {
            RequestBody::None => None,
            RequestBody::Json(text) => Some(
                serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone())),
            ),
            RequestBody::Raw(text) => Some(Value::String(text.clone())),
            RequestBody::FormData(fields) | RequestBody::FormUrlEncoded(fields) => Some(
                Value::Object(
                    fields
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect(),
                ),
            ),
            RequestBody::GraphQl { query, variables } => {
                let variables = if variables.trim().is_empty() {
                    Value::Null
                } else {
                    serde_json::from_str(variables)
                        .unwrap_or_else(|_| Value::String(variables.clone()))
                };
                Some(serde_json::json!({ "query": query, "variables": variables }))
            }
        }
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn value_to_fields(value: Value) -> Result<IndexMap<String, String>, String> {
    match value {
        Value::Null => Ok(IndexMap::new()),
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, value_to_text(v)))
            .collect()),
        Value::String(s) if s.trim().is_empty() => Ok(IndexMap::new()),
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            Ok(parsed @ Value::Object(_)) => value_to_fields(parsed),
            _ => Err(format!("form body must be a key/value object, got '{s}'")),
        },
        other => Err(format!("form body must be a key/value object, got {other}")),
    }
}

/// Wire tag for [`Auth`], stored next to the config as `authType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthType {
    #[default]
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "BEARER_TOKEN")]
    BearerToken,
    #[serde(rename = "BASIC_AUTH")]
    BasicAuth,
    #[serde(rename = "API_KEY")]
    ApiKey,
    #[serde(rename = "OAUTH2")]
    OAuth2,
    #[serde(rename = "AWS_SIGNATURE")]
    AwsSignature,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::None => "NONE",
            AuthType::BearerToken => "BEARER_TOKEN",
            AuthType::BasicAuth => "BASIC_AUTH",
            AuthType::ApiKey => "API_KEY",
            AuthType::OAuth2 => "OAUTH2",
            AuthType::AwsSignature => "AWS_SIGNATURE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BearerConfig {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasicConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

pub const DEFAULT_API_KEY_NAME: &str = "X-API-Key";

fn default_api_key_name() -> String {
    DEFAULT_API_KEY_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    #[serde(rename = "keyName", alias = "key", default = "default_api_key_name")]
    pub key: String,
    #[serde(rename = "keyValue", alias = "value", default)]
    pub value: String,
    #[serde(default)]
    pub location: ApiKeyLocation,
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            key: default_api_key_name(),
            value: String::new(),
            location: ApiKeyLocation::Header,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2Config {
    #[serde(default)]
    pub token_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Pre-issued token. When it resolves non-empty, no token request is made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Auth {
    #[default]
    None,
    Bearer(BearerConfig),
    Basic(BasicConfig),
    ApiKey(ApiKeyConfig),
    OAuth2(OAuth2Config),
    /// Kept opaque; signing is not implemented.
    AwsSignature(Value),
}

impl Auth {
    pub fn auth_type(&self) -> AuthType {
        match self {
            Auth::None => AuthType::None,
            Auth::Bearer(_) => AuthType::BearerToken,
            Auth::Basic(_) => AuthType::BasicAuth,
            Auth::ApiKey(_) => AuthType::ApiKey,
            Auth::OAuth2(_) => AuthType::OAuth2,
            Auth::AwsSignature(_) => AuthType::AwsSignature,
        }
    }

    pub fn from_wire(auth_type: AuthType, config: Option<Value>) -> Result<Self, String> {
        let config = match config {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(Value::String(s)) if s.trim().is_empty() => Value::Object(Default::default()),
            Some(Value::String(s)) => serde_json::from_str(&s)
                .map_err(|e| format!("authConfig is not valid JSON: {e}"))?,
            Some(other) => other,
        };
        let invalid = |e: serde_json::Error| format!("invalid {} config: {e}", auth_type.as_str());
        Ok(match auth_type {
            AuthType::None => Auth::None,
            AuthType::BearerToken => Auth::Bearer(serde_json::from_value(config).map_err(invalid)?),
            AuthType::BasicAuth => Auth::Basic(serde_json::from_value(config).map_err(invalid)?),
            AuthType::ApiKey => Auth::ApiKey(serde_json::from_value(config).map_err(invalid)?),
            AuthType::OAuth2 => Auth::OAuth2(serde_json::from_value(config).map_err(invalid)?),
            AuthType::AwsSignature => Auth::AwsSignature(config),
        })
    }

    pub fn to_wire(&self) -> Option<Value> {
        match self {
            Auth::None => None,
            Auth::Bearer(c) => serde_json::to_value(c).ok(),
            Auth::Basic(c) => serde_json::to_value(c).ok(),
            Auth::ApiKey(c) => serde_json::to_value(c).ok(),
            Auth::OAuth2(c) => serde_json::to_value(c).ok(),
            Auth::AwsSignature(v) => Some(v.clone()),
        }
    }
}

/// A stored API request. Headers, query values, body strings and auth config
/// values are templates resolved at execution time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RequestRecord", into = "RequestRecord")]
pub struct Request {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub method: HttpMethod,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub query_params: IndexMap<String, String>,
    pub body: RequestBody,
    pub auth: Auth,
    pub assertions: Vec<Assertion>,
    pub extraction_rules: Vec<ExtractionRule>,
    pub pre_request_script: Option<String>,
    pub collection_id: String,
    pub order: u32,
}

/// Flat storage shape: `bodyType`/`body` and `authType`/`authConfig` side by side.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestRecord {
    #[serde(default = "super::new_id")]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    method: HttpMethod,
    url: String,
    #[serde(default)]
    headers: IndexMap<String, String>,
    #[serde(default)]
    query_params: IndexMap<String, String>,
    #[serde(default)]
    body_type: BodyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
    #[serde(default)]
    auth_type: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_config: Option<Value>,
    #[serde(default)]
    assertions: Vec<Assertion>,
    #[serde(default)]
    extraction_rules: Vec<ExtractionRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pre_request_script: Option<String>,
    #[serde(default)]
    collection_id: String,
    #[serde(default)]
    order: u32,
}

impl TryFrom<RequestRecord> for Request {
    type Error = String;

    fn try_from(record: RequestRecord) -> Result<Self, Self::Error> {
        let body = RequestBody::from_wire(record.body_type, record.body)
            .map_err(|e| format!("request '{}': {e}", record.id))?;
        let auth = Auth::from_wire(record.auth_type, record.auth_config)
            .map_err(|e| format!("request '{}': {e}", record.id))?;
        Ok(Request {
            id: record.id,
            title: record.title,
            description: record.description,
            method: record.method,
            url: record.url,
            headers: record.headers,
            query_params: record.query_params,
            body,
            auth,
            assertions: record.assertions,
            extraction_rules: record.extraction_rules,
            pre_request_script: record.pre_request_script.filter(|s| !s.trim().is_empty()),
            collection_id: record.collection_id,
            order: record.order,
        })
    }
}

impl From<Request> for RequestRecord {
    fn from(request: Request) -> Self {
        RequestRecord {
            body_type: request.body.body_type(),
            body: request.body.to_wire(),
            auth_type: request.auth.auth_type(),
            auth_config: request.auth.to_wire(),
            id: request.id,
            title: request.title,
            description: request.description,
            method: request.method,
            url: request.url,
            headers: request.headers,
            query_params: request.query_params,
            assertions: request.assertions,
            extraction_rules: request.extraction_rules,
            pre_request_script: request.pre_request_script,
            collection_id: request.collection_id,
            order: request.order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_stored_request() {
        let request: Request = serde_json::from_value(json!({
            "id": "r1",
            "title": "Create user",
            "method": "POST",
            "url": "{{baseUrl}}/users",
            "headers": { "X-Trace": "1", "Accept": "application/json" },
            "bodyType": "JSON",
            "body": { "name": "{{name}}" },
            "authType": "API_KEY",
            "authConfig": { "keyName": "X-Key", "keyValue": "{{key}}", "location": "query" },
            "collectionId": "c1",
            "order": 2
        }))
        .unwrap();

        assert_eq!(request.method, HttpMethod::POST);
        assert_eq!(
            request.headers.keys().collect::<Vec<_>>(),
            vec!["X-Trace", "Accept"]
        );
        assert_eq!(request.body, RequestBody::Json(r#"{"name":"{{name}}"}"#.to_string()));
        assert_eq!(
            request.auth,
            Auth::ApiKey(ApiKeyConfig {
                key: "X-Key".to_string(),
                value: "{{key}}".to_string(),
                location: ApiKeyLocation::Query,
            })
        );
        assert_eq!(request.order, 2);
    }

    #[test]
    fn test_json_body_with_unquoted_placeholder_stays_text() {
        let request: Request = serde_json::from_value(json!({
            "id": "r1",
            "url": "http://x",
            "bodyType": "JSON",
            "body": "{\"id\": {{id}}}"
        }))
        .unwrap();
        assert_eq!(request.body, RequestBody::Json("{\"id\": {{id}}}".to_string()));

        let back = serde_json::to_value(&request).unwrap();
        assert_eq!(back["body"], json!("{\"id\": {{id}}}"));
        assert_eq!(back["bodyType"], json!("JSON"));
    }

    #[test]
    fn test_graphql_body_from_object() {
        let body = RequestBody::from_wire(
            BodyType::GraphQl,
            Some(json!({ "query": "{ me { id } }", "variables": { "a": 1 } })),
        )
        .unwrap();
        assert_eq!(
            body,
            RequestBody::GraphQl {
                query: "{ me { id } }".to_string(),
                variables: r#"{"a":1}"#.to_string(),
            }
        );
    }

    #[test]
    fn test_form_body_rejects_array() {
        let result = RequestBody::from_wire(BodyType::FormData, Some(json!(["a"])));
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_defaults_and_aliases() {
        let auth = Auth::from_wire(AuthType::ApiKey, Some(json!({ "value": "v" }))).unwrap();
        assert_eq!(
            auth,
            Auth::ApiKey(ApiKeyConfig {
                key: DEFAULT_API_KEY_NAME.to_string(),
                value: "v".to_string(),
                location: ApiKeyLocation::Header,
            })
        );
    }

    #[test]
    fn test_auth_config_as_json_string() {
        let auth = Auth::from_wire(
            AuthType::BearerToken,
            Some(json!("{\"token\":\"{{token}}\"}")),
        )
        .unwrap();
        assert_eq!(
            auth,
            Auth::Bearer(BearerConfig {
                token: "{{token}}".to_string()
            })
        );
    }

    #[test]
    fn test_missing_auth_config_uses_empty_defaults() {
        let auth = Auth::from_wire(AuthType::OAuth2, None).unwrap();
        assert_eq!(auth, Auth::OAuth2(OAuth2Config::default()));
    }
}
