use crate::core::error::QaError;
use qarun_lib::error::{AiError, ImportError, RunError, StoreError};

/// Process exit codes. Clap exits with 2 on its own usage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// Invalid arguments or input values
    UsageError = 2,
    /// Workspace, environment or AI settings are unusable
    ConfigError = 3,
    /// File not found or IO error
    FileError = 4,
    /// Collection, request or environment not found
    NotFoundError = 5,
    /// Network or HTTP error
    NetworkError = 6,
    /// Authentication error
    AuthError = 7,
    /// The run finished with failed or errored requests
    RunFailed = 10,
}

impl ExitCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

fn store_exit_code(error: &StoreError) -> ExitCode {
    match error {
        StoreError::CollectionNotFound(_)
        | StoreError::RequestNotFound(_)
        | StoreError::EnvironmentNotFound(_) => ExitCode::NotFoundError,
        StoreError::Io(_) => ExitCode::FileError,
        StoreError::Parse(_) => ExitCode::ConfigError,
        StoreError::DuplicateId(_) => ExitCode::UsageError,
        StoreError::Poisoned => ExitCode::GeneralError,
    }
}

/// Execution errors only carry a message; classify it by the wording the
/// engine uses for auth and transport failures.
fn execution_exit_code(message: &str) -> ExitCode {
    if message.starts_with("OAuth2") {
        ExitCode::AuthError
    } else if message.contains("connection failed")
        || message.contains("timed out")
        || message.contains("HTTP request failed")
        || message.contains("failed to read response body")
    {
        ExitCode::NetworkError
    } else {
        ExitCode::RunFailed
    }
}

impl From<&QaError> for ExitCode {
    fn from(error: &QaError) -> Self {
        match error {
            QaError::Io(_) => ExitCode::FileError,
            QaError::Store(err) => store_exit_code(err),
            QaError::Run(RunError::Store(err)) => store_exit_code(err),
            QaError::Run(RunError::EmptyCollection(_)) => ExitCode::GeneralError,
            QaError::Import(ImportError::Fetch { .. }) => ExitCode::NetworkError,
            QaError::Import(ImportError::Store(err)) => store_exit_code(err),
            QaError::Import(_) => ExitCode::UsageError,
            QaError::Ai(AiError::NotConfigured(_)) => ExitCode::ConfigError,
            QaError::Ai(AiError::Request(_)) => ExitCode::NetworkError,
            QaError::Ai(AiError::Status { status, .. }) if *status == 401 || *status == 403 => {
                ExitCode::AuthError
            }
            QaError::Ai(AiError::Status { .. }) => ExitCode::NetworkError,
            QaError::Ai(_) => ExitCode::GeneralError,
            QaError::Http(_) => ExitCode::ConfigError,
            QaError::Validation(_) => ExitCode::UsageError,
            QaError::FileNotFound(_) => ExitCode::FileError,
            QaError::Execution(message) => execution_exit_code(message),
            QaError::RunFailed { .. } => ExitCode::RunFailed,
            QaError::Generic(_) => ExitCode::GeneralError,
        }
    }
}

impl From<&Box<dyn std::error::Error>> for ExitCode {
    fn from(error: &Box<dyn std::error::Error>) -> Self {
        match error.downcast_ref::<QaError>() {
            Some(qa_error) => ExitCode::from(qa_error),
            None => ExitCode::GeneralError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_errors() {
        let error = QaError::Store(StoreError::RequestNotFound("r1".to_string()));
        assert_eq!(ExitCode::from(&error), ExitCode::NotFoundError);
        let error = QaError::Run(RunError::Store(StoreError::EnvironmentNotFound(
            "prod".to_string(),
        )));
        assert_eq!(ExitCode::from(&error).code(), 5);
    }

    #[test]
    fn test_run_failed_code() {
        let error = QaError::RunFailed {
            not_passed: 1,
            total: 3,
        };
        assert_eq!(ExitCode::from(&error).code(), 10);
    }

    #[test]
    fn test_execution_messages() {
        let auth = QaError::Execution(
            "OAuth2 token endpoint http://x/token returned 401: nope".to_string(),
        );
        assert_eq!(ExitCode::from(&auth), ExitCode::AuthError);
        let network = QaError::Execution("connection failed: refused".to_string());
        assert_eq!(ExitCode::from(&network), ExitCode::NetworkError);
    }

    #[test]
    fn test_boxed_error_downcast() {
        let boxed: Box<dyn std::error::Error> = Box::new(QaError::Validation("x".to_string()));
        assert_eq!(ExitCode::from(&boxed), ExitCode::UsageError);
        let other: Box<dyn std::error::Error> = "plain".into();
        assert_eq!(ExitCode::from(&other), ExitCode::GeneralError);
    }
}
