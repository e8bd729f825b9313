//! Secret values kept out of the stored workspace.
//!
//! `.env` next to the workspace:
//! - `KEY=value` applies to every environment
//! - `ENV__<environment>__KEY=value` applies only when that environment is selected
//!
//! Process environment, which wins over the file:
//! - `QARUN__KEY`
//! - `QARUN__ENV__<environment>__KEY`
//!
//! Prefixes match case-insensitively; variable names keep their case.

use super::VariableMap;
use std::fs;
use std::path::Path;

const FILE_ENV_PREFIX: &str = "env__";
const OS_PREFIX: &str = "qarun__";
const OS_ENV_PREFIX: &str = "qarun__env__";

pub fn load_secrets(dir: &Path, environment_name: Option<&str>) -> std::io::Result<VariableMap> {
    let mut variables = VariableMap::new();

    let env_file = dir.join(".env");
    if env_file.is_file() {
        let content = fs::read_to_string(&env_file)?;
        variables.extend(parse_env_file(&content, environment_name));
        tracing::debug!("loaded secrets from {}", env_file.display());
    }

    variables.extend(parse_os_variables(std::env::vars(), environment_name));
    Ok(variables)
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

/// `<environment>__<name>` for the selected environment.
fn environment_scoped<'a>(rest: &'a str, selected_env: Option<&str>) -> Option<&'a str> {
    let selected = selected_env?;
    let pos = rest.find("__")?;
    let (env_name, var_name) = (&rest[..pos], &rest[pos + 2..]);
    if env_name.is_empty() || var_name.is_empty() || !env_name.eq_ignore_ascii_case(selected) {
        return None;
    }
    Some(var_name)
}

pub fn parse_env_file(content: &str, selected_env: Option<&str>) -> VariableMap {
    let mut general = VariableMap::new();
    let mut env_specific = VariableMap::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some(eq) = trimmed.find('=') else {
            continue;
        };
        let key = trimmed[..eq].trim();
        let value = trimmed[eq + 1..].trim().trim_matches('"').to_string();

        if let Some(rest) = strip_prefix_ignore_case(key, FILE_ENV_PREFIX) {
            if let Some(name) = environment_scoped(rest, selected_env) {
                env_specific.insert(name.to_string(), value);
            }
        } else if !key.is_empty() {
            general.insert(key.to_string(), value);
        }
    }

    general.extend(env_specific);
    general
}

pub fn parse_os_variables(
    vars: impl IntoIterator<Item = (String, String)>,
    selected_env: Option<&str>,
) -> VariableMap {
    let mut general = VariableMap::new();
    let mut env_specific = VariableMap::new();

    for (key, value) in vars {
        if let Some(rest) = strip_prefix_ignore_case(&key, OS_ENV_PREFIX) {
            if let Some(name) = environment_scoped(rest, selected_env) {
                env_specific.insert(name.to_string(), value);
            }
        } else if let Some(name) = strip_prefix_ignore_case(&key, OS_PREFIX) {
            if !name.is_empty() {
                general.insert(name.to_string(), value);
            }
        }
    }

    general.extend(env_specific);
    general
}
