use super::auth_provider_bearer::BearerAuthProvider;
use super::{AuthContext, AuthFuture, AuthOutcome, AuthProvider};
use crate::error::AuthError;
use crate::http::OutgoingRequest;
use crate::model::{AuthType, OAuth2Config};
use crate::variables;
use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Client-credentials grant. A non-empty `accessToken` short-circuits the
/// token request.
pub struct OAuth2ClientCredentialsProvider<'c> {
    config: &'c OAuth2Config,
}

impl<'c> OAuth2ClientCredentialsProvider<'c> {
    pub fn new(config: &'c OAuth2Config) -> Self {
        Self { config }
    }

    async fn fetch_token(&self, context: AuthContext<'_>) -> Result<String, AuthError> {
        let resolve = |value: &str| variables::substitute(value, context.scopes).trim().to_string();

        let token_url = resolve(&self.config.token_url);
        if token_url.is_empty() {
            return Err(AuthError::MissingField("tokenUrl"));
        }
        let client_id = resolve(&self.config.client_id);
        if client_id.is_empty() {
            return Err(AuthError::MissingField("clientId"));
        }
        let client_secret = resolve(&self.config.client_secret);
        let scope = self.config.scope.as_deref().map(resolve).unwrap_or_default();

        let mut params: IndexMap<&str, String> = IndexMap::new();
        params.insert("grant_type", "client_credentials".to_string());
        params.insert("client_id", client_id);
        if !client_secret.is_empty() {
            params.insert("client_secret", client_secret);
        }
        if !scope.is_empty() {
            params.insert("scope", scope);
        }

        tracing::debug!("requesting OAuth2 token from {token_url}");
        let request_failed = |e: reqwest::Error| AuthError::TokenRequest {
            url: token_url.clone(),
            message: e.to_string(),
        };
        let response = context
            .client
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        let body = response.text().await.map_err(request_failed)?;
        if !status.is_success() {
            return Err(AuthError::TokenStatus {
                url: token_url,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<TokenResponse>(&body)
            .ok()
            .and_then(|token| token.access_token)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingAccessToken { url: token_url })
    }
}

impl AuthProvider for OAuth2ClientCredentialsProvider<'_> {
    fn auth_type(&self) -> AuthType {
        AuthType::OAuth2
    }

    fn apply<'a>(
        &'a self,
        outgoing: &'a mut OutgoingRequest,
        context: AuthContext<'a>,
    ) -> AuthFuture<'a> {
        Box::pin(async move {
            let preissued = self
                .config
                .access_token
                .as_deref()
                .map(|token| variables::substitute(token, context.scopes))
                .filter(|token| !token.trim().is_empty());

            let token = match preissued {
                Some(token) => token,
                None => self.fetch_token(context).await?,
            };
            BearerAuthProvider::set_bearer(outgoing, token.trim());
            Ok(AuthOutcome::Applied)
        })
    }
}
