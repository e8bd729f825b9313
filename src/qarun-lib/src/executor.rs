use crate::assertions::{self, CompiledAssertion};
use crate::auth::{self, AuthContext, AuthOutcome};
use crate::config::EngineConfig;
use crate::error::HttpError;
use crate::http::{self, OutgoingRequest};
use crate::model::{Execution, Request};
use crate::script;
use crate::variables::VariableMap;
use chrono::Utc;

/// Runs single requests through the whole pipeline: substitution, auth,
/// pre-request script, HTTP call, assertions. Every failure is contained in
/// the returned [`Execution`].
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: reqwest::Client,
    config: EngineConfig,
}

impl RequestExecutor {
    pub fn new(config: EngineConfig) -> Result<Self, HttpError> {
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn with_client(client: reqwest::Client, config: EngineConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `scopes` are searched in order; put extracted variables before
    /// environment variables.
    pub async fn execute(&self, request: &Request, scopes: &[&VariableMap]) -> Execution {
        tracing::debug!("executing '{}' ({})", request.title, request.id);

        let compiled = match assertions::compile_all(&request.assertions) {
            Ok(compiled) => compiled,
            Err(e) => return Execution::error(&request.id, e.to_string()),
        };

        let mut outgoing = match OutgoingRequest::from_request(request, scopes) {
            Ok(outgoing) => outgoing,
            Err(e) => return Execution::error(&request.id, e.to_string()),
        };

        let mut warnings = Vec::new();
        let context = AuthContext {
            client: &self.client,
            scopes,
        };
        match auth::apply_auth(&request.auth, &mut outgoing, context).await {
            Ok(AuthOutcome::Unsupported(message)) => warnings.push(message),
            Ok(_) => {}
            Err(e) => {
                return Execution::error(&request.id, e.to_string()).with_warnings(warnings)
            }
        }

        if let Some(source) = request
            .pre_request_script
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            match script::run_pre_request(source, &outgoing, &self.config) {
                Ok(mutation) => mutation.apply(&mut outgoing),
                Err(e) => {
                    tracing::warn!("pre-request script for '{}' failed: {e}", request.title);
                    warnings.push(format!("Pre-request script failed: {e}"));
                }
            }
        }

        self.send(request, &outgoing, &compiled, warnings).await
    }

    async fn send(
        &self,
        request: &Request,
        outgoing: &OutgoingRequest,
        compiled: &[CompiledAssertion<'_>],
        warnings: Vec<String>,
    ) -> Execution {
        let (response, sent) =
            match http::execute_request(&self.client, outgoing, &self.config).await {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::debug!("'{}' failed: {e}", request.title);
                    return Execution::error(&request.id, e.to_string()).with_warnings(warnings);
                }
            };

        let report = assertions::evaluate_compiled(compiled, &response, &self.config);
        tracing::debug!(
            "'{}' -> {} ({} assertion failures)",
            request.title,
            report.status.as_str(),
            report.failures.len()
        );

        Execution {
            id: crate::model::new_id(),
            request_id: request.id.clone(),
            status: report.status,
            status_code: Some(response.status),
            response_time: response.elapsed_ms(),
            response_body: Some(response.body),
            response_headers: response.headers,
            error_message: None,
            assertion_results: report.results,
            failures: report.failures,
            warnings,
            sent_request: Some(sent),
            executed_at: Utc::now(),
        }
    }
}
