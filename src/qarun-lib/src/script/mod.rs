//! Pre-request scripts and CUSTOM assertion expressions, run in a Rhai sandbox.
//!
//! A pre-request script sees `request_headers` and `request_query` as
//! read-only maps and hands mutations back through top-level `headers` and
//! `queryParams` maps:
//!
//! ```text
//! let ts = timestamp_secs().to_string();
//! let headers = #{ "X-Timestamp": ts, "X-Signature": sha256(ts + "secret") };
//! let queryParams = #{ nonce: uuid() };
//! ```

mod sandbox;

pub use sandbox::build_engine;

use crate::config::EngineConfig;
use crate::error::ScriptError;
use crate::http::OutgoingRequest;
use indexmap::IndexMap;
use rhai::{Dynamic, EvalAltResult, Map, Scope};
use serde_json::Value;

pub const HEADERS_BINDING: &str = "headers";
pub const QUERY_BINDING: &str = "queryParams";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptMutation {
    pub headers: IndexMap<String, String>,
    pub query_params: IndexMap<String, String>,
}

impl ScriptMutation {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.query_params.is_empty()
    }

    /// Additive merge; script values replace existing entries.
    pub fn apply(self, outgoing: &mut OutgoingRequest) {
        for (name, value) in self.headers {
            outgoing.set_header(&name, value);
        }
        for (name, value) in self.query_params {
            outgoing.set_query(&name, value);
        }
    }
}

/// Response view handed to CUSTOM assertion expressions.
pub struct ResponseContext<'a> {
    pub status: u16,
    pub response_time_ms: u64,
    pub body: &'a str,
    pub headers: &'a IndexMap<String, String>,
    pub json: Option<&'a Value>,
}

fn map_eval_error(error: Box<EvalAltResult>, config: &EngineConfig) -> ScriptError {
    match *error {
        EvalAltResult::ErrorTerminated(..) => {
            ScriptError::Timeout(config.script_timeout.as_millis() as u64)
        }
        other => ScriptError::Runtime(other.to_string()),
    }
}

fn binding_to_strings(scope: &Scope, name: &str) -> Result<IndexMap<String, String>, ScriptError> {
    let Some(value) = scope.get(name) else {
        return Ok(IndexMap::new());
    };
    if value.is_unit() {
        return Ok(IndexMap::new());
    }
    let map = value
        .read_lock::<Map>()
        .ok_or_else(|| ScriptError::InvalidBinding {
            name: name.to_string(),
            type_name: value.type_name().to_string(),
        })?;
    Ok(map
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect())
}

pub fn run_pre_request(
    script: &str,
    outgoing: &OutgoingRequest,
    config: &EngineConfig,
) -> Result<ScriptMutation, ScriptError> {
    let engine = build_engine(config);
    let ast = engine
        .compile(script)
        .map_err(|e| ScriptError::Compile(e.to_string()))?;

    let mut scope = Scope::new();
    scope.push_constant("request_headers", sandbox::to_map(&outgoing.headers));
    scope.push_constant("request_query", sandbox::to_map(&outgoing.query));

    engine
        .run_ast_with_scope(&mut scope, &ast)
        .map_err(|e| map_eval_error(e, config))?;

    Ok(ScriptMutation {
        headers: binding_to_strings(&scope, HEADERS_BINDING)?,
        query_params: binding_to_strings(&scope, QUERY_BINDING)?,
    })
}

/// Evaluates a boolean expression over the response.
pub fn eval_condition(
    expression: &str,
    response: &ResponseContext,
    config: &EngineConfig,
) -> Result<bool, ScriptError> {
    let engine = build_engine(config);
    let ast = engine
        .compile(expression)
        .map_err(|e| ScriptError::Compile(e.to_string()))?;

    let json = match response.json {
        Some(value) => rhai::serde::to_dynamic(value).map_err(|e| map_eval_error(e, config))?,
        None => Dynamic::UNIT,
    };

    let mut scope = Scope::new();
    scope.push_constant("status", response.status as i64);
    scope.push_constant("response_time", response.response_time_ms as i64);
    scope.push_constant("body", response.body.to_string());
    scope.push_constant("headers", sandbox::to_map(response.headers));
    scope.push_constant("json", json);

    let result: Dynamic = engine
        .eval_ast_with_scope(&mut scope, &ast)
        .map_err(|e| map_eval_error(e, config))?;
    result
        .as_bool()
        .map_err(|type_name| ScriptError::NotBoolean(type_name.to_string()))
}
