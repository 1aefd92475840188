//! Webhook fan-out: POST a message body to every configured endpoint.
//!
//! Deliveries for one message are issued in parallel and are fully
//! independent: one endpoint refusing, erroring, or timing out never stops
//! the others from being attempted. Failures are logged at debug level and
//! never retried; responses are not inspected beyond the status code.

use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Upper bound on a single webhook POST. On expiry the delivery counts as
/// failed for that (message, target) pair, same as any other send error.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body sent to each target: `{"text": "<message body>"}`.
#[derive(Debug, Serialize)]
struct Payload<'a> {
    text: &'a str,
}

/// Fan-out sink over an immutable set of webhook URLs. Cheap to clone; the
/// underlying HTTP client is shared.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    targets: Vec<String>,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            client: reqwest::Client::new(),
        }
    }

    /// Number of configured targets.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Deliver `body` to every target, in parallel, and wait for all
    /// attempts to finish. Returns the number of attempts made (one per
    /// target, regardless of outcome). An empty target set makes no HTTP
    /// calls and is not an error.
    pub async fn deliver_all(&self, body: &str) -> usize {
        let posts = self.targets.iter().map(|url| self.deliver_one(url, body));
        futures_util::future::join_all(posts).await.len()
    }

    /// Spawn the fan-out for `body` as its own task so a slow or
    /// unresponsive endpoint never blocks the session-event loop. The
    /// handle can be awaited but usually is not.
    pub fn dispatch(&self, body: String) -> JoinHandle<usize> {
        let sink = self.clone();
        tokio::spawn(async move { sink.deliver_all(&body).await })
    }

    /// One POST to one target. Terminal outcome either way: success is a
    /// 2xx status (response body ignored), anything else is logged and
    /// dropped.
    async fn deliver_one(&self, url: &str, body: &str) {
        let payload = Payload { text: body };
        let res = self
            .client
            .post(url)
            .timeout(DELIVERY_TIMEOUT)
            .json(&payload)
            .send()
            .await;
        match res {
            Ok(res) if res.status().is_success() => {
                log::debug!("delivered to {}", url);
            }
            Ok(res) => {
                log::debug!("webhook {} returned {}", url, res.status());
            }
            Err(e) => {
                log::debug!("webhook {} failed: {}", url, e);
            }
        }
    }
}
