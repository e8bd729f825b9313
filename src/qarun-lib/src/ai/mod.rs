//! Text-completion boundary used to draft assertions and requests.

mod client;
mod config;
mod generate;

pub use client::{CompletionFuture, CompletionOptions, CompletionService, OpenAiClient};
pub use config::{AiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use generate::{
    generate_assertions, generate_request, parse_assertions, parse_request, strip_code_fences,
    GeneratedAssertion, GeneratedRequest,
};
