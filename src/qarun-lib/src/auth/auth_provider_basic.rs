use super::{AuthContext, AuthFuture, AuthOutcome, AuthProvider};
use crate::http::OutgoingRequest;
use crate::model::{AuthType, BasicConfig};
use crate::variables;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::AUTHORIZATION;

pub struct BasicAuthProvider<'c> {
    config: &'c BasicConfig,
}

impl<'c> BasicAuthProvider<'c> {
    pub fn new(config: &'c BasicConfig) -> Self {
        Self { config }
    }

    pub fn encode(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
    }
}

impl AuthProvider for BasicAuthProvider<'_> {
    fn auth_type(&self) -> AuthType {
        AuthType::BasicAuth
    }

    fn apply<'a>(
        &'a self,
        outgoing: &'a mut OutgoingRequest,
        context: AuthContext<'a>,
    ) -> AuthFuture<'a> {
        Box::pin(async move {
            let username = variables::substitute(&self.config.username, context.scopes);
            let password = variables::substitute(&self.config.password, context.scopes);
            if username.is_empty() || password.is_empty() {
                return Ok(AuthOutcome::Skipped(
                    "basic auth needs both username and password".to_string(),
                ));
            }
            outgoing.set_header(AUTHORIZATION.as_str(), Self::encode(&username, &password));
            Ok(AuthOutcome::Applied)
        })
    }
}
