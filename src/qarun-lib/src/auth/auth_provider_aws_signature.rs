use super::{AuthContext, AuthFuture, AuthOutcome, AuthProvider};
use crate::http::OutgoingRequest;
use crate::model::AuthType;

pub const UNSUPPORTED_MESSAGE: &str =
    "AWS_SIGNATURE auth is not supported yet; request sent without a signature";

/// Reserved scheme. Leaves the request untouched and reports it.
pub struct AwsSignatureProvider;

impl AuthProvider for AwsSignatureProvider {
    fn auth_type(&self) -> AuthType {
        AuthType::AwsSignature
    }

    fn apply<'a>(
        &'a self,
        _outgoing: &'a mut OutgoingRequest,
        _context: AuthContext<'a>,
    ) -> AuthFuture<'a> {
        Box::pin(async move { Ok(AuthOutcome::Unsupported(UNSUPPORTED_MESSAGE.to_string())) })
    }
}
