use super::{AuthContext, AuthFuture, AuthOutcome, AuthProvider};
use crate::http::OutgoingRequest;
use crate::model::{AuthType, BearerConfig};
use crate::variables;
use reqwest::header::AUTHORIZATION;

pub struct BearerAuthProvider<'c> {
    config: &'c BearerConfig,
}

impl<'c> BearerAuthProvider<'c> {
    pub fn new(config: &'c BearerConfig) -> Self {
        Self { config }
    }

    pub(crate) fn set_bearer(outgoing: &mut OutgoingRequest, token: &str) {
        outgoing.set_header(AUTHORIZATION.as_str(), format!("Bearer {token}"));
    }
}

impl AuthProvider for BearerAuthProvider<'_> {
    fn auth_type(&self) -> AuthType {
        AuthType::BearerToken
    }

    fn apply<'a>(
        &'a self,
        outgoing: &'a mut OutgoingRequest,
        context: AuthContext<'a>,
    ) -> AuthFuture<'a> {
        Box::pin(async move {
            let token = variables::substitute(&self.config.token, context.scopes);
            if token.trim().is_empty() {
                return Ok(AuthOutcome::Skipped("bearer token is empty".to_string()));
            }
            Self::set_bearer(outgoing, token.trim());
            Ok(AuthOutcome::Applied)
        })
    }
}
