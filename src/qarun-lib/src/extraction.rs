use crate::json_path;
use crate::model::ExtractionRule;
use crate::variables::VariableMap;
use serde_json::Value;

/// Harvests variables from a response body for later requests in the run.
///
/// A rule whose path does not resolve, or any rule when the body is not JSON,
/// falls back to its default value or contributes nothing.
pub fn extract(rules: &[ExtractionRule], body: &str) -> VariableMap {
    let mut extracted = VariableMap::new();
    let enabled: Vec<&ExtractionRule> = rules
        .iter()
        .filter(|r| r.enabled && !r.variable_name.trim().is_empty())
        .collect();
    if enabled.is_empty() {
        return extracted;
    }

    let json: Option<Value> = serde_json::from_str(body).ok();
    if json.is_none() {
        tracing::debug!("response body is not JSON, extraction uses defaults");
    }

    for rule in enabled {
        let found = json
            .as_ref()
            .and_then(|root| json_path::resolve(&rule.json_path, root))
            .map(json_path::value_to_string);
        match found.or_else(|| rule.default_value.clone()) {
            Some(value) => {
                tracing::debug!("extracted {} from {}", rule.variable_name, rule.json_path);
                extracted.insert(rule.variable_name.trim().to_string(), value);
            }
            None => tracing::debug!(
                "nothing extracted for {}: {} did not resolve",
                rule.variable_name,
                rule.json_path
            ),
        }
    }
    extracted
}
