mod assertion;
mod collection;
mod execution;
mod http_method;
mod request;

pub use assertion::{Assertion, AssertionOperator, AssertionType};
pub use collection::{Collection, Environment, ExtractionRule};
pub use execution::{
    AssertionResult, CollectionRunSummary, Execution, ExecutionStatus, RunResult, SentRequest,
};
pub use http_method::HttpMethod;
pub use request::{
    ApiKeyConfig, ApiKeyLocation, Auth, AuthType, BasicConfig, BearerConfig, BodyType,
    OAuth2Config, Request, RequestBody, DEFAULT_API_KEY_NAME,
};

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
