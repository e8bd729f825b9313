use crate::error::AuthError;
use crate::http::OutgoingRequest;
use crate::model::AuthType;
use crate::variables::VariableMap;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Applied,
    /// Nothing injected because a credential resolved to empty.
    Skipped(String),
    /// Scheme is accepted but not implemented; the request goes out as-is.
    Unsupported(String),
}

pub type AuthFuture<'a> =
    Pin<Box<dyn Future<Output = Result<AuthOutcome, AuthError>> + Send + 'a>>;

#[derive(Clone, Copy)]
pub struct AuthContext<'a> {
    pub client: &'a reqwest::Client,
    pub scopes: &'a [&'a VariableMap],
}

pub trait AuthProvider: Send + Sync {
    fn auth_type(&self) -> AuthType;

    fn apply<'a>(
        &'a self,
        outgoing: &'a mut OutgoingRequest,
        context: AuthContext<'a>,
    ) -> AuthFuture<'a>;
}
