//! HTTP clients for SpaceCapsule's external collaborators.
//!
//! # Architecture
//!
//! - [`token`] - OAuth token client: authorization-code exchange (refresh)
//!   and token revocation against Apple's fixed endpoints, authenticated
//!   with a short-lived ES256 client assertion rather than a static secret.
//! - [`retry`] - shared retry policy with exponential backoff and
//!   `Retry-After` handling, used by every outbound request.
//!
//! Storage and database collaborators are vendor SDKs on the device; this
//! crate only covers the calls the core issues over plain HTTP.

pub mod retry;
pub mod token;

use std::sync::OnceLock;
use std::time::Duration;

use thiserror::Error;

pub use token::{ClientAssertion, TokenClient};

const CONNECT_TIMEOUT_SECS: u64 = 30;
const REQUEST_TIMEOUT_SECS: u64 = 30;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Network failure taxonomy for collaborator calls.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The server answered but the body could not be decoded into the
    /// expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    /// No usable response arrived (transport failure, timeout, retries
    /// exhausted).
    #[error("no response from server: {0}")]
    NoResponse(String),
    /// The client assertion could not be built or signed.
    #[error("client assertion signing failed: {0}")]
    Assertion(String),
}

/// Shared HTTP client for all collaborator calls.
///
/// TLS-only with redirects disabled; token requests carry credentials and
/// must never follow a redirect to another host.
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("failed to build HTTP client: {e}; falling back to minimal client");
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("minimal HTTP client must build")
        })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
}

/// Read an error response body, capped so a hostile or broken server
/// cannot balloon memory.
pub(crate) async fn read_capped_error_body(response: reqwest::Response) -> String {
    match response.bytes().await {
        Ok(body) if body.len() > MAX_ERROR_BODY_BYTES => {
            let text = String::from_utf8_lossy(&body[..MAX_ERROR_BODY_BYTES]);
            format!("{text}...(truncated)")
        }
        Ok(body) => String::from_utf8_lossy(&body).into_owned(),
        Err(e) => format!("(unreadable body: {e})"),
    }
}
