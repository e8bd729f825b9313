pub mod body;
mod client;
mod outgoing;

pub use body::PreparedBody;
pub use client::{build_client, execute_request, HttpResponse};
pub use outgoing::OutgoingRequest;
