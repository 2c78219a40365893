use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};

/// REST API version the backend currently serves.
const API_VERSION: &str = "0.1.0";

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub async fn health(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Backend is not reachable")?;
        if !response.status().is_success() {
            anyhow::bail!("Health check failed: {}", response.status());
        }
        Ok(())
    }

    /// Creates a notification addressed to `recipient_id`.
    pub async fn create_notification(
        &self,
        session_cookie: &str,
        recipient_id: &str,
        title: &str,
        message: &str,
    ) -> Result<Value> {
        let request = self
            .authorized(self.client.post(self.url("/api/notifications")), session_cookie)
            .json(&json!({
                "user_id": recipient_id,
                "kind": "community",
                "title": title,
                "message": message,
                "link": null,
            }));

        Self::data(request.send().await, "create notification").await
    }

    /// Records an analytics snapshot for the session's own user.
    pub async fn record_snapshot(
        &self,
        session_cookie: &str,
        platform: &str,
        followers: i64,
        views: i64,
    ) -> Result<Value> {
        let request = self
            .authorized(self.client.post(self.url("/api/analytics")), session_cookie)
            .json(&json!({
                "platform": platform,
                "followers": followers,
                "views": views,
                "watch_time_minutes": views / 4,
                "engagement_rate": 0.05,
            }));

        Self::data(request.send().await, "record analytics snapshot").await
    }

    pub async fn unread_count(&self, session_cookie: &str) -> Result<u64> {
        let request = self.authorized(
            self.client.get(self.url("/api/notifications/unread_count")),
            session_cookie,
        );
        let data = Self::data(request.send().await, "read unread count").await?;
        data["unread_count"]
            .as_u64()
            .context("No unread_count in response")
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder, session_cookie: &str) -> RequestBuilder {
        request
            .header("Cookie", format!("id={session_cookie}"))
            .header("x-version", API_VERSION)
    }

    // Unwraps the `{"status_code": .., "data": ..}` envelope.
    async fn data(response: reqwest::Result<Response>, action: &str) -> Result<Value> {
        let response = response.with_context(|| format!("Failed to {action}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Failed to {action}: {status} - Response: {body}");
        }

        let mut api_response: Value = response
            .json()
            .await
            .context("Failed to parse response")?;

        Ok(api_response["data"].take())
    }
}
