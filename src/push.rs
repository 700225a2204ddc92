//! Push-gateway client for task-assignment notifications.
//!
//! Fire-and-forget: callers spawn `send` and log failures; delivery is never
//! part of the request's success criteria.

use serde_json::json;

#[derive(Clone)]
pub struct PushClient {
    http: reqwest::Client,
    gateway_url: String,
}

impl PushClient {
    pub fn new(gateway_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            gateway_url,
        }
    }

    /// Deliver one notification to a device token via the Expo push gateway.
    pub async fn send(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
    ) -> Result<(), reqwest::Error> {
        self.http
            .post(&self.gateway_url)
            .json(&json!({
                "to": device_token,
                "sound": "default",
                "title": title,
                "body": body,
            }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
