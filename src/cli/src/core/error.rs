use qarun_lib::error::{AiError, HttpError, ImportError, RunError, StoreError};
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum QaError {
    Io(io::Error),
    Store(StoreError),
    Run(RunError),
    Import(ImportError),
    Ai(AiError),
    Http(HttpError),
    Validation(String),
    FileNotFound(String),
    /// A single request ended in ERROR; carries the execution's message.
    Execution(String),
    /// The run completed but not every request passed.
    RunFailed { not_passed: usize, total: usize },
    Generic(String),
}

impl fmt::Display for QaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QaError::Io(err) => write!(f, "IO error: {err}"),
            QaError::Store(err) => write!(f, "{err}"),
            QaError::Run(err) => write!(f, "{err}"),
            QaError::Import(err) => write!(f, "Import failed: {err}"),
            QaError::Ai(err) => write!(f, "{err}"),
            QaError::Http(err) => write!(f, "{err}"),
            QaError::Validation(msg) => write!(f, "Validation error: {msg}"),
            QaError::FileNotFound(path) => write!(f, "File not found: {path}"),
            QaError::Execution(msg) => write!(f, "Request failed: {msg}"),
            QaError::RunFailed { not_passed, total } => {
                write!(f, "{not_passed} of {total} requests did not pass")
            }
            QaError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for QaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QaError::Io(err) => Some(err),
            QaError::Store(err) => Some(err),
            QaError::Run(err) => Some(err),
            QaError::Import(err) => Some(err),
            QaError::Ai(err) => Some(err),
            QaError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for QaError {
    fn from(err: io::Error) -> Self {
        QaError::Io(err)
    }
}

impl From<StoreError> for QaError {
    fn from(err: StoreError) -> Self {
        QaError::Store(err)
    }
}

impl From<RunError> for QaError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Store(store) => QaError::Store(store),
            other => QaError::Run(other),
        }
    }
}

impl From<ImportError> for QaError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Store(store) => QaError::Store(store),
            other => QaError::Import(other),
        }
    }
}

impl From<AiError> for QaError {
    fn from(err: AiError) -> Self {
        QaError::Ai(err)
    }
}

impl From<HttpError> for QaError {
    fn from(err: HttpError) -> Self {
        QaError::Http(err)
    }
}

impl From<String> for QaError {
    fn from(msg: String) -> Self {
        QaError::Generic(msg)
    }
}

impl From<&str> for QaError {
    fn from(msg: &str) -> Self {
        QaError::Generic(msg.to_string())
    }
}
