use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("OAuth2 config has no {0}")]
    MissingField(&'static str),
    #[error("OAuth2 token request to {url} failed: {message}")]
    TokenRequest { url: String, message: String },
    #[error("OAuth2 token endpoint {url} returned {status}: {body}")]
    TokenStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[error("OAuth2 token response from {url} has no access_token")]
    MissingAccessToken { url: String },
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script does not compile: {0}")]
    Compile(String),
    #[error("script failed: {0}")]
    Runtime(String),
    #[error("script exceeded its {0} ms time budget")]
    Timeout(u64),
    #[error("script binding '{name}' must be an object map, got {type_name}")]
    InvalidBinding { name: String, type_name: String },
    #[error("expression must evaluate to a boolean, got {0}")]
    NotBoolean(String),
}

#[derive(Debug, Error)]
pub enum BodyError {
    #[error("JSON body is not valid JSON after substitution: {0}")]
    InvalidJson(String),
    #[error("GraphQL variables are not a JSON object: {0}")]
    InvalidGraphQlVariables(String),
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
    #[error("invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("HTTP request failed: {0}")]
    Transport(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum AssertionDefinitionError {
    #[error("assertion {id}: operator {operator} is not valid for {assertion_type}")]
    InvalidOperator {
        id: String,
        assertion_type: String,
        operator: String,
    },
    #[error("assertion {id}: expected value '{value}' is not a number")]
    NotNumeric { id: String, value: String },
    #[error("assertion {id}: {assertion_type} needs a field")]
    MissingField { id: String, assertion_type: String },
    #[error("assertion {id}: invalid regex '{pattern}': {message}")]
    InvalidRegex {
        id: String,
        pattern: String,
        message: String,
    },
    #[error("assertion {id}: invalid JSON schema: {message}")]
    InvalidSchema { id: String, message: String },
    #[error("assertion {id}: custom expression is empty")]
    EmptyExpression { id: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    #[error("Request not found: {0}")]
    RequestNotFound(String),
    #[error("Environment not found: {0}")]
    EnvironmentNotFound(String),
    #[error("A record with id '{0}' already exists")]
    DuplicateId(String),
    #[error("workspace file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workspace file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("workspace lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("No requests in collection {0}")]
    EmptyCollection(String),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidDocument(String),
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI provider is not configured: {0}")]
    NotConfigured(String),
    #[error("AI request failed: {0}")]
    Request(String),
    #[error("AI provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("AI response has no content")]
    EmptyResponse,
    #[error("could not parse generated output: {0}")]
    Parse(String),
    #[error("generated item {index} is invalid: {message}")]
    InvalidItem { index: usize, message: String },
}
