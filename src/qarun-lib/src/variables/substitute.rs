use super::{functions, VariableMap};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;

lazy_static! {
    // `{{ name }}` or `{{ ns.func(args) }}` / `{{ $ns.func(args) }}`.
    static ref PLACEHOLDER: Regex = Regex::new(
        r"\{\{\s*(?:\$?(?P<func>[A-Za-z_][A-Za-z0-9_]*\.[A-Za-z_][A-Za-z0-9_]*)\s*\((?P<args>[^()]*)\)|(?P<var>[A-Za-z_][A-Za-z0-9_.\-]*))\s*\}\}"
    )
    .unwrap();
}

/// First scope that defines `name` wins.
pub fn lookup<'a>(name: &str, scopes: &[&'a VariableMap]) -> Option<&'a str> {
    scopes
        .iter()
        .find_map(|scope| scope.get(name).map(String::as_str))
}

/// Replaces every placeholder in one pass. Unresolved placeholders are kept
/// verbatim and substituted values are never rescanned.
pub fn substitute(template: &str, scopes: &[&VariableMap]) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            if let Some(var) = caps.name("var") {
                return lookup(var.as_str(), scopes)
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string());
            }
            let func = caps.name("func").map(|m| m.as_str()).unwrap_or_default();
            let args = functions::parse_args(caps.name("args").map(|m| m.as_str()).unwrap_or(""));
            match functions::call(func, &args) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("placeholder {} left unresolved: {}", &caps[0], e);
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Substitutes string leaves of a JSON document. Object keys are structural
/// and left alone.
pub fn substitute_json(value: &Value, scopes: &[&VariableMap]) -> Value {
    match value {
        Value::String(s) => Value::String(substitute(s, scopes)),
        Value::Array(items) => Value::Array(items.iter().map(|v| substitute_json(v, scopes)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_json(v, scopes)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Names of plain variable placeholders that no scope defines.
pub fn unresolved_variables(template: &str, scopes: &[&VariableMap]) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.name("var").map(|m| m.as_str().to_string()))
        .filter(|name| lookup(name, scopes).is_none())
        .collect()
}
