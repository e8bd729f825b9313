use super::{AuthContext, AuthFuture, AuthOutcome, AuthProvider};
use crate::http::OutgoingRequest;
use crate::model::{ApiKeyConfig, ApiKeyLocation, AuthType, DEFAULT_API_KEY_NAME};
use crate::variables;

pub struct ApiKeyAuthProvider<'c> {
    config: &'c ApiKeyConfig,
}

impl<'c> ApiKeyAuthProvider<'c> {
    pub fn new(config: &'c ApiKeyConfig) -> Self {
        Self { config }
    }
}

impl AuthProvider for ApiKeyAuthProvider<'_> {
    fn auth_type(&self) -> AuthType {
        AuthType::ApiKey
    }

    fn apply<'a>(
        &'a self,
        outgoing: &'a mut OutgoingRequest,
        context: AuthContext<'a>,
    ) -> AuthFuture<'a> {
        Box::pin(async move {
            let value = variables::substitute(&self.config.value, context.scopes);
            if value.is_empty() {
                return Ok(AuthOutcome::Skipped("API key value is empty".to_string()));
            }
            let key = variables::substitute(&self.config.key, context.scopes);
            let key = match key.trim() {
                "" => DEFAULT_API_KEY_NAME,
                name => name,
            };
            match self.config.location {
                ApiKeyLocation::Header => outgoing.set_header(key, value),
                ApiKeyLocation::Query => outgoing.set_query(key, value),
            }
            Ok(AuthOutcome::Applied)
        })
    }
}
