//! REST adapters for the hosted identity provider and document store.

pub(crate) mod codec;
mod documents;
mod identity;

pub use documents::RestDocumentStore;
pub use identity::RestIdentityProvider;

use reqwest::{Response, StatusCode};
use shared::RemoteFailure;

/// Transport-level failure: nothing usable came back.
pub(crate) fn transport_failure(err: &reqwest::Error) -> RemoteFailure {
    if err.is_decode() {
        RemoteFailure::decode(err.to_string())
    } else {
        RemoteFailure::unavailable(err.to_string())
    }
}

/// Failure for a non-success status, keeping the body text for the logs.
pub(crate) async fn status_failure(response: Response) -> RemoteFailure {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    failure_for_status(status, &body)
}

pub(crate) fn failure_for_status(status: StatusCode, body: &str) -> RemoteFailure {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteFailure::Unauthorized,
        _ => RemoteFailure::unavailable(format!("{status}: {}", body.trim())),
    }
}
