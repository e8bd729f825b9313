use super::{AssertionType, HttpMethod};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Passed,
    Failed,
    Error,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Passed => "PASSED",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResult {
    pub assertion_id: String,
    #[serde(rename = "type")]
    pub assertion_type: AssertionType,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What actually went over the wire after substitution, auth and scripting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    pub id: String,
    pub request_id: String,
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Milliseconds around the network call only.
    pub response_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(default)]
    pub response_headers: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub assertion_results: Vec<AssertionResult>,
    #[serde(default)]
    pub failures: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_request: Option<SentRequest>,
    pub executed_at: DateTime<Utc>,
}

impl Execution {
    /// An execution that never produced a response.
    pub fn error(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: super::new_id(),
            request_id: request_id.into(),
            status: ExecutionStatus::Error,
            status_code: None,
            response_time: 0,
            response_body: None,
            response_headers: IndexMap::new(),
            error_message: Some(message.into()),
            assertion_results: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
            sent_request: None,
            executed_at: Utc::now(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub request_id: String,
    pub title: String,
    pub execution: Execution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Variables this request contributed to the run.
    #[serde(default)]
    pub extracted: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRunSummary {
    pub collection_id: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    /// Percentage of passed requests, 0 to 100.
    pub pass_rate: f64,
    pub cancelled: bool,
    pub duration_ms: u64,
    pub results: Vec<RunResult>,
}

impl CollectionRunSummary {
    pub fn from_results(
        collection_id: impl Into<String>,
        results: Vec<RunResult>,
        cancelled: bool,
        duration_ms: u64,
    ) -> Self {
        let count = |status: ExecutionStatus| {
            results
                .iter()
                .filter(|r| r.execution.status == status)
                .count()
        };
        let passed = count(ExecutionStatus::Passed);
        let failed = count(ExecutionStatus::Failed);
        let errors = count(ExecutionStatus::Error);
        let total = results.len();
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64 * 100.0
        };
        Self {
            collection_id: collection_id.into(),
            total,
            passed,
            failed,
            errors,
            pass_rate,
            cancelled,
            duration_ms,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0 && !self.cancelled
    }
}
