//! Outbound webhook delivery for safe-mode status changes.
//!
//! Submission is enqueue-and-return: `dispatch` spawns the POST on the Tokio
//! runtime and returns immediately, so the monitor never blocks its caller
//! on network I/O. Retry/backoff is the dispatcher's problem, not the
//! monitor's.

use std::time::Duration;
use tracing::{error, warn};

/// Abstraction over "send this JSON body somewhere", so the monitor can be
/// tested without a real HTTP endpoint.
pub trait WebhookDispatcher: Send + Sync {
    /// Enqueue `body` (already-serialised JSON, CRLF-terminated) for
    /// delivery to `address`. Must not block on the network; failures are
    /// logged by the dispatcher and never surfaced to the caller.
    fn dispatch(&self, address: String, body: String);
}

/// Default dispatcher: a `reqwest` client submitting a fire-and-forget POST
/// on a spawned task, matching the crate's existing use of
/// `reqwest = { features = ["json"] }` for outbound HTTP elsewhere in the
/// `node` crate.
pub struct ReqwestWebhookDispatcher {
    client: reqwest::Client,
}

impl ReqwestWebhookDispatcher {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

impl WebhookDispatcher for ReqwestWebhookDispatcher {
    fn dispatch(&self, address: String, body: String) {
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client
                .post(&address)
                .header("Content-Type", "application/json")
                .body(body)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    warn!(
                        "safe-mode webhook to {} returned status {}",
                        address,
                        response.status()
                    );
                }
                Err(e) => {
                    error!("safe-mode webhook delivery to {} failed: {}", address, e);
                }
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every dispatch call instead of performing network I/O.
    #[derive(Default, Clone)]
    pub struct RecordingDispatcher {
        pub calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl WebhookDispatcher for RecordingDispatcher {
        fn dispatch(&self, address: String, body: String) {
            self.calls.lock().unwrap().push((address, body));
        }
    }
}
