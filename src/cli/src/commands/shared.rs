use crate::commands::validators;
use crate::core::error::QaError;
use crate::core::formatter::OutputFormat;
use clap::Args;
use qarun_lib::ai::{AiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use qarun_lib::variables::secrets;
use qarun_lib::{EngineConfig, JsonStore, RequestExecutor, RunOptions, VariableMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct OutputArgs {
    #[arg(
        short = 'o',
        long = "output",
        help = "Output format: text or json",
        default_value_t = OutputFormat::Text,
        value_enum,
        ignore_case = true
    )]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct WorkspaceArgs {
    #[arg(
        short = 'w',
        long = "workspace",
        default_value = "qarun.json",
        env = "QARUN_WORKSPACE",
        help = "Path to the workspace file holding collections, requests and environments"
    )]
    pub workspace: String,
}

impl WorkspaceArgs {
    pub fn open(&self) -> Result<JsonStore, QaError> {
        Ok(JsonStore::open(&self.workspace)?)
    }

    /// Directory searched for the `.env` secrets file.
    pub fn dir(&self) -> &Path {
        match Path::new(&self.workspace).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

#[derive(Debug, Args)]
pub struct EnvArgs {
    #[arg(
        short = 'e',
        long = "env",
        alias = "environment",
        help = "Environment id or name"
    )]
    pub environment: Option<String>,
}

#[derive(Debug, Args)]
pub struct VariableArgs {
    #[arg(
        short = 'v',
        long = "variable",
        value_name = "NAME=VALUE",
        help = "Override a variable for this run",
        value_parser = validators::validate_variable
    )]
    pub variable: Vec<String>,
}

impl VariableArgs {
    pub fn to_map(&self) -> VariableMap {
        self.variable
            .iter()
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

#[derive(Debug, Args)]
pub struct EngineArgs {
    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        default_value = "30",
        help = "Per-request timeout",
        value_parser = validators::validate_positive
    )]
    pub timeout: u64,

    #[arg(
        long = "script-timeout-ms",
        value_name = "MS",
        default_value = "2000",
        help = "Time budget for pre-request scripts and custom assertions",
        value_parser = validators::validate_positive
    )]
    pub script_timeout_ms: u64,
}

impl EngineArgs {
    pub fn config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_request_timeout(Duration::from_secs(self.timeout))
            .with_script_timeout(Duration::from_millis(self.script_timeout_ms))
    }

    pub fn executor(&self) -> Result<RequestExecutor, QaError> {
        Ok(RequestExecutor::new(self.config())?)
    }
}

#[derive(Debug, Args)]
pub struct AiArgs {
    #[arg(
        long = "ai-endpoint",
        env = "QARUN_AI_ENDPOINT",
        default_value = DEFAULT_ENDPOINT,
        help = "OpenAI-compatible API base URL"
    )]
    pub endpoint: String,

    #[arg(
        long = "ai-model",
        env = "QARUN_AI_MODEL",
        default_value = DEFAULT_MODEL,
        help = "Model name"
    )]
    pub model: String,

    #[arg(
        long = "ai-api-key",
        env = "QARUN_AI_API_KEY",
        hide_env_values = true,
        help = "API key, sent as a Bearer token"
    )]
    pub api_key: Option<String>,
}

impl AiArgs {
    pub fn config(&self) -> AiConfig {
        AiConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone().unwrap_or_default(),
            model: self.model.clone(),
            ..Default::default()
        }
    }
}

/// Secrets for the selected environment, then command-line values on top.
pub fn run_options(
    workspace: &WorkspaceArgs,
    env_args: &EnvArgs,
    variables: &VariableArgs,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<RunOptions, QaError> {
    let mut overrides = secrets::load_secrets(workspace.dir(), env_args.environment.as_deref())?;
    overrides.extend(variables.to_map());
    tracing::debug!("{} override variables", overrides.len());
    Ok(RunOptions {
        environment: env_args.environment.clone(),
        overrides,
        cancel,
    })
}

/// A flag that flips on the first Ctrl-C; the run stops before its next request.
pub fn cancel_on_ctrl_c() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handle = Arc::clone(&flag);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, finishing the current request...");
            handle.store(true, Ordering::SeqCst);
        }
    });
    flag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_args_split_on_first_equals() {
        let args = VariableArgs {
            variable: vec!["q=a=b".to_string(), "empty=".to_string()],
        };
        let map = args.to_map();
        assert_eq!(map.get("q").map(String::as_str), Some("a=b"));
        assert_eq!(map.get("empty").map(String::as_str), Some(""));
    }

    #[test]
    fn test_workspace_dir() {
        let args = WorkspaceArgs {
            workspace: "qarun.json".to_string(),
        };
        assert_eq!(args.dir(), Path::new("."));
        let args = WorkspaceArgs {
            workspace: "suites/api/qarun.json".to_string(),
        };
        assert_eq!(args.dir(), Path::new("suites/api"));
    }

    #[test]
    fn test_engine_args_config() {
        let args = EngineArgs {
            timeout: 5,
            script_timeout_ms: 250,
        };
        let config = args.config();
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.script_timeout, Duration::from_millis(250));
    }
}
