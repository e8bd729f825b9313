use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_SCRIPT_MAX_OPERATIONS: u64 = 100_000;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn default_user_agent() -> String {
    format!("qarun/{}", version())
}

/// Knobs the executor needs. Built by the caller and passed in explicitly.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub request_timeout: Duration,
    pub script_timeout: Duration,
    pub script_max_operations: u64,
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            script_timeout: DEFAULT_SCRIPT_TIMEOUT,
            script_max_operations: DEFAULT_SCRIPT_MAX_OPERATIONS,
            user_agent: default_user_agent(),
        }
    }
}

impl EngineConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent() {
        let config = EngineConfig::default();
        assert!(config.user_agent.starts_with("qarun/"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
