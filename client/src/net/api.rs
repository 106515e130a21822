//! Preference persistence over the server's form endpoint.
//!
//! Client-side (hydrate): real POSTs via `gloo-net` with same-origin
//! credentials so the session cookie rides along.
//! Server-side / native: a stub that always reports a transport failure,
//! since the endpoint is only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every response is classified into a `PersistOutcome`; nothing here
//! returns an error or panics. The coordinator decides what each outcome
//! means for local storage.

#![allow(clippy::unused_async)]

use async_trait::async_trait;
use prefs::{FailureReason, PersistOutcome, PreferenceForm, PreferenceTransport};

/// Server endpoint accepting preference updates.
pub const PREFERENCES_ENDPOINT: &str = "/api/preferences";

#[cfg(any(test, feature = "hydrate"))]
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `PreferenceTransport` posting form-encoded bodies to an endpoint.
#[derive(Clone, Debug)]
pub struct FormTransport {
    endpoint: String,
}

impl FormTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for FormTransport {
    fn default() -> Self {
        Self::new(PREFERENCES_ENDPOINT)
    }
}

#[async_trait(?Send)]
impl PreferenceTransport for FormTransport {
    async fn submit(&self, form: &PreferenceForm) -> PersistOutcome {
        let body = match form.encode() {
            Ok(body) => body,
            Err(e) => return PersistOutcome::Failed(FailureReason::Transport(e.to_string())),
        };
        #[cfg(feature = "hydrate")]
        {
            let request = gloo_net::http::Request::post(&self.endpoint)
                .header("Content-Type", FORM_CONTENT_TYPE)
                .credentials(web_sys::RequestCredentials::SameOrigin)
                .body(body);
            let request = match request {
                Ok(request) => request,
                Err(e) => return PersistOutcome::Failed(FailureReason::Transport(e.to_string())),
            };
            match request.send().await {
                Ok(resp) => PersistOutcome::from_status(resp.status()),
                Err(e) => PersistOutcome::Failed(FailureReason::Transport(e.to_string())),
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = body;
            PersistOutcome::Failed(FailureReason::Transport("not available on server".to_owned()))
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
