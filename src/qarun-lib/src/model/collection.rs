use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(default = "super::new_id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(default = "super::new_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub variables: IndexMap<String, String>,
}

fn default_enabled() -> bool {
    true
}

/// Pulls a value out of a response body into a named variable for later requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRule {
    #[serde(default = "super::new_id")]
    pub id: String,
    pub variable_name: String,
    pub json_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl ExtractionRule {
    pub fn new(variable_name: impl Into<String>, json_path: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            variable_name: variable_name.into(),
            json_path: json_path.into(),
            default_value: None,
            enabled: true,
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }
}
