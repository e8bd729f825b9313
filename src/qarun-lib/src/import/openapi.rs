use super::example::example_from_schema;
use crate::error::ImportError;
use crate::json_path;
use crate::model::{
    ApiKeyConfig, ApiKeyLocation, Auth, BasicConfig, BearerConfig, HttpMethod, OAuth2Config,
    Request, RequestBody, DEFAULT_API_KEY_NAME,
};
use indexmap::IndexMap;
use serde_json::Value;

pub const DEFAULT_FOLDER: &str = "Default";

const METHODS: [&str; 7] = ["get", "post", "put", "patch", "delete", "head", "options"];

/// A request read from the document, plus the tag it is filed under.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRequest {
    pub request: Request,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSpec {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
    pub requests: Vec<ImportedRequest>,
}

fn invalid(message: &str) -> ImportError {
    ImportError::InvalidDocument(message.to_string())
}

/// Checks the top-level shape and returns the parsed document.
pub fn validate_openapi_format(text: &str) -> Result<Value, ImportError> {
    let document: Value = serde_json::from_str(text)?;
    if document.get("openapi").is_none() && document.get("swagger").is_none() {
        return Err(invalid(
            "Not a valid OpenAPI/Swagger specification. Missing \"openapi\" or \"swagger\" field.",
        ));
    }
    let info = document.get("info");
    let has = |field: &str| {
        info.and_then(|i| i.get(field))
            .is_some_and(|v| !v.is_null() && v.as_str() != Some(""))
    };
    if !has("title") || !has("version") {
        return Err(invalid(
            "Missing required \"info\" object with \"title\" and \"version\" fields.",
        ));
    }
    if document
        .get("paths")
        .and_then(Value::as_object)
        .map_or(true, |paths| paths.is_empty())
    {
        return Err(invalid("No paths defined in the specification."));
    }
    Ok(document)
}

pub fn parse_openapi(text: &str) -> Result<ParsedSpec, ImportError> {
    let document = validate_openapi_format(text)?;
    let info = &document["info"];
    let base_url = base_url(&document);

    let mut requests = Vec::new();
    if let Some(paths) = document["paths"].as_object() {
        for (path, item) in paths {
            let shared = item.get("parameters").and_then(Value::as_array);
            for method in METHODS {
                let Some(operation) = item.get(method).filter(|o| o.is_object()) else {
                    continue;
                };
                requests.push(operation_request(
                    &document, &base_url, path, method, operation, shared,
                ));
            }
        }
    }
    tracing::debug!("parsed {} operations from OpenAPI document", requests.len());

    Ok(ParsedSpec {
        title: text_of(&info["title"]),
        version: text_of(&info["version"]),
        description: info
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        requests,
    })
}

fn text_of(value: &Value) -> String {
    json_path::value_to_string(value)
}

/// `servers[0].url` with its variable defaults for OpenAPI 3, or
/// `scheme://host/basePath` for Swagger 2.
fn base_url(document: &Value) -> String {
    if let Some(server) = document
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first())
    {
        let mut url = server
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if let Some(variables) = server.get("variables").and_then(Value::as_object) {
            for (name, variable) in variables {
                if let Some(default) = variable.get("default") {
                    url = url.replace(&format!("{{{name}}}"), &text_of(default));
                }
            }
        }
        return url.trim_end_matches('/').to_string();
    }

    let base_path = document
        .get("basePath")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim_end_matches('/');
    match document.get("host").and_then(Value::as_str) {
        Some(host) => {
            let scheme = document
                .get("schemes")
                .and_then(Value::as_array)
                .and_then(|s| s.first())
                .and_then(Value::as_str)
                .unwrap_or("https");
            format!("{scheme}://{host}{base_path}")
        }
        None => base_path.to_string(),
    }
}

fn resolve<'a>(value: &'a Value, document: &'a Value) -> &'a Value {
    value
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|pointer| document.pointer(pointer))
        .unwrap_or(value)
}

fn parameter_example(parameter: &Value) -> Option<String> {
    parameter
        .get("example")
        .or_else(|| parameter.get("schema").and_then(|s| s.get("example")))
        .or_else(|| parameter.get("default"))
        .or_else(|| parameter.get("schema").and_then(|s| s.get("default")))
        .filter(|v| !v.is_null())
        .map(text_of)
}

fn operation_request(
    document: &Value,
    base_url: &str,
    path: &str,
    method: &str,
    operation: &Value,
    shared_parameters: Option<&Vec<Value>>,
) -> ImportedRequest {
    let str_field = |name: &str| {
        operation
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };
    let upper = method.to_ascii_uppercase();
    let title = str_field("summary")
        .or_else(|| str_field("operationId"))
        .unwrap_or_else(|| format!("{upper} {path}"));

    let mut url = format!("{base_url}{path}");
    let mut headers = IndexMap::new();
    let mut query_params = IndexMap::new();
    let mut form_fields: IndexMap<String, String> = IndexMap::new();
    let mut body = RequestBody::None;

    // Operation parameters override path-level ones with the same name and location.
    let mut parameters: IndexMap<(String, String), &Value> = IndexMap::new();
    for parameter in shared_parameters
        .into_iter()
        .flatten()
        .chain(operation.get("parameters").and_then(Value::as_array).into_iter().flatten())
    {
        let parameter = resolve(parameter, document);
        let name = parameter.get("name").and_then(Value::as_str).unwrap_or_default();
        let location = parameter.get("in").and_then(Value::as_str).unwrap_or_default();
        parameters.insert((name.to_string(), location.to_string()), parameter);
    }

    for ((name, location), parameter) in &parameters {
        if name.is_empty() && location != "body" {
            continue;
        }
        match location.as_str() {
            "query" => {
                query_params.insert(name.clone(), parameter_example(parameter).unwrap_or_default());
            }
            "header" => {
                headers.insert(name.clone(), parameter_example(parameter).unwrap_or_default());
            }
            "path" => {
                if let Some(example) = parameter_example(parameter) {
                    url = url.replace(&format!("{{{name}}}"), &example);
                }
            }
            "body" => {
                let example = example_from_schema(parameter.get("schema"), document);
                body = json_body(&example);
            }
            "formData" => {
                form_fields.insert(name.clone(), parameter_example(parameter).unwrap_or_default());
            }
            _ => {}
        }
    }

    if !form_fields.is_empty() {
        let multipart = operation
            .get("consumes")
            .or_else(|| document.get("consumes"))
            .and_then(Value::as_array)
            .is_some_and(|types| types.iter().any(|t| t.as_str() == Some("multipart/form-data")));
        body = if multipart {
            RequestBody::FormData(form_fields)
        } else {
            RequestBody::FormUrlEncoded(form_fields)
        };
    }

    if let Some(request_body) = operation.get("requestBody") {
        let request_body = resolve(request_body, document);
        if let Some(content) = request_body.get("content").and_then(Value::as_object) {
            let schema_of = |media: &str| content.get(media).and_then(|m| m.get("schema"));
            body = if content.contains_key("application/json") {
                json_body(&example_from_schema(schema_of("application/json"), document))
            } else if content.contains_key("multipart/form-data") {
                RequestBody::FormData(fields_of(&example_from_schema(
                    schema_of("multipart/form-data"),
                    document,
                )))
            } else if content.contains_key("application/x-www-form-urlencoded") {
                RequestBody::FormUrlEncoded(fields_of(&example_from_schema(
                    schema_of("application/x-www-form-urlencoded"),
                    document,
                )))
            } else {
                RequestBody::Raw(String::new())
            };
        }
    }

    let auth = operation
        .get("security")
        .or_else(|| document.get("security"))
        .and_then(Value::as_array)
        .and_then(|requirements| requirements.first())
        .and_then(Value::as_object)
        .and_then(|requirement| requirement.keys().next())
        .and_then(|name| security_scheme(document, name))
        .map(auth_for_scheme)
        .unwrap_or_default();

    let folder = operation
        .get("tags")
        .and_then(Value::as_array)
        .and_then(|tags| tags.first())
        .and_then(Value::as_str)
        .map(str::to_string);

    ImportedRequest {
        request: Request {
            id: String::new(),
            title,
            description: str_field("description"),
            method: HttpMethod::parse(&upper).unwrap_or_default(),
            url,
            headers,
            query_params,
            body,
            auth,
            ..Default::default()
        },
        folder,
    }
}

fn json_body(example: &Value) -> RequestBody {
    RequestBody::Json(serde_json::to_string_pretty(example).unwrap_or_else(|_| example.to_string()))
}

fn fields_of(example: &Value) -> IndexMap<String, String> {
    example
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .map(|(k, v)| (k.clone(), text_of(v)))
                .collect()
        })
        .unwrap_or_default()
}

fn security_scheme<'a>(document: &'a Value, name: &str) -> Option<&'a Value> {
    document
        .get("components")
        .and_then(|c| c.get("securitySchemes"))
        .and_then(|s| s.get(name))
        .or_else(|| document.get("securityDefinitions").and_then(|s| s.get(name)))
        .map(|scheme| resolve(scheme, document))
}

/// Maps a security scheme to auth with blank credentials for the user to fill.
fn auth_for_scheme(scheme: &Value) -> Auth {
    let field = |name: &str| scheme.get(name).and_then(Value::as_str);
    match field("type") {
        Some("http") => match field("scheme").map(str::to_ascii_lowercase).as_deref() {
            Some("bearer") => Auth::Bearer(BearerConfig::default()),
            Some("basic") => Auth::Basic(BasicConfig::default()),
            _ => Auth::None,
        },
        Some("basic") => Auth::Basic(BasicConfig::default()),
        Some("apiKey") => Auth::ApiKey(ApiKeyConfig {
            key: field("name")
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_API_KEY_NAME)
                .to_string(),
            value: String::new(),
            location: match field("in") {
                Some("header") => ApiKeyLocation::Header,
                _ => ApiKeyLocation::Query,
            },
        }),
        Some("oauth2") => Auth::OAuth2(OAuth2Config {
            token_url: scheme
                .pointer("/flows/clientCredentials/tokenUrl")
                .or_else(|| scheme.get("tokenUrl"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            access_token: Some(String::new()),
            ..Default::default()
        }),
        _ => Auth::None,
    }
}

/// Groups by first tag, in first-seen order. Untagged requests go to
/// [`DEFAULT_FOLDER`].
pub fn group_by_folder(requests: Vec<ImportedRequest>) -> IndexMap<String, Vec<Request>> {
    let mut folders: IndexMap<String, Vec<Request>> = IndexMap::new();
    for imported in requests {
        let folder = imported
            .folder
            .unwrap_or_else(|| DEFAULT_FOLDER.to_string());
        folders.entry(folder).or_default().push(imported.request);
    }
    folders
}
