mod auth_provider;
mod auth_provider_api_key;
mod auth_provider_aws_signature;
mod auth_provider_basic;
mod auth_provider_bearer;
mod auth_provider_oauth2_client_credentials;

pub use auth_provider::{AuthContext, AuthFuture, AuthOutcome, AuthProvider};
pub use auth_provider_api_key::ApiKeyAuthProvider;
pub use auth_provider_aws_signature::AwsSignatureProvider;
pub use auth_provider_basic::BasicAuthProvider;
pub use auth_provider_bearer::BearerAuthProvider;
pub use auth_provider_oauth2_client_credentials::OAuth2ClientCredentialsProvider;

use crate::error::AuthError;
use crate::http::OutgoingRequest;
use crate::model::Auth;

pub fn provider_for(auth: &Auth) -> Option<Box<dyn AuthProvider + '_>> {
    match auth {
        Auth::None => None,
        Auth::Bearer(config) => Some(Box::new(BearerAuthProvider::new(config))),
        Auth::Basic(config) => Some(Box::new(BasicAuthProvider::new(config))),
        Auth::ApiKey(config) => Some(Box::new(ApiKeyAuthProvider::new(config))),
        Auth::OAuth2(config) => Some(Box::new(OAuth2ClientCredentialsProvider::new(config))),
        Auth::AwsSignature(_) => Some(Box::new(AwsSignatureProvider)),
    }
}

/// Injects credentials into the outgoing request. Config values go through
/// the same variable scopes as the rest of the request.
pub async fn apply_auth(
    auth: &Auth,
    outgoing: &mut OutgoingRequest,
    context: AuthContext<'_>,
) -> Result<AuthOutcome, AuthError> {
    let Some(provider) = provider_for(auth) else {
        return Ok(AuthOutcome::Skipped("no auth".to_string()));
    };
    let outcome = provider.apply(outgoing, context).await?;
    match &outcome {
        AuthOutcome::Applied => tracing::debug!("{} auth applied", provider.auth_type().as_str()),
        AuthOutcome::Skipped(reason) => {
            tracing::debug!("{} auth skipped: {reason}", provider.auth_type().as_str())
        }
        AuthOutcome::Unsupported(reason) => tracing::warn!("{reason}"),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BasicConfig, Request};
    use crate::variables::VariableMap;

    #[tokio::test]
    async fn test_auth_never_mutates_stored_request() {
        let request = Request {
            id: "r1".to_string(),
            url: "http://localhost/{{path}}".to_string(),
            auth: Auth::Basic(BasicConfig {
                username: "{{user}}".to_string(),
                password: "secret".to_string(),
            }),
            ..Default::default()
        };
        let snapshot = request.clone();
        let vars: VariableMap = [
            ("user".to_string(), "ada".to_string()),
            ("path".to_string(), "me".to_string()),
        ]
        .into_iter()
        .collect();
        let scopes = [&vars];
        let client = reqwest::Client::new();

        let mut outgoing = OutgoingRequest::from_request(&request, &scopes).unwrap();
        let outcome = apply_auth(
            &request.auth,
            &mut outgoing,
            AuthContext {
                client: &client,
                scopes: &scopes,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome, AuthOutcome::Applied);
        assert_eq!(outgoing.header("authorization"), Some("Basic YWRhOnNlY3JldA=="));
        assert_eq!(request, snapshot);
        assert!(request.headers.is_empty());
    }

    #[tokio::test]
    async fn test_aws_signature_is_reported_unsupported() {
        let client = reqwest::Client::new();
        let mut outgoing = OutgoingRequest::from_request(
            &Request {
                url: "http://localhost/".to_string(),
                ..Default::default()
            },
            &[],
        )
        .unwrap();
        let before = outgoing.clone();
        let outcome = apply_auth(
            &Auth::AwsSignature(serde_json::json!({ "region": "eu-west-1" })),
            &mut outgoing,
            AuthContext {
                client: &client,
                scopes: &[],
            },
        )
        .await
        .unwrap();

        assert!(matches!(outcome, AuthOutcome::Unsupported(_)));
        assert_eq!(outgoing, before);
    }

    #[tokio::test]
    async fn test_no_auth_is_skipped() {
        let client = reqwest::Client::new();
        let mut outgoing = OutgoingRequest::from_request(
            &Request {
                url: "http://localhost/".to_string(),
                ..Default::default()
            },
            &[],
        )
        .unwrap();
        let outcome = apply_auth(
            &Auth::None,
            &mut outgoing,
            AuthContext {
                client: &client,
                scopes: &[],
            },
        )
        .await
        .unwrap();
        assert!(matches!(outcome, AuthOutcome::Skipped(_)));
    }
}
