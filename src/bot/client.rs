use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Identity of the acting user, as sent to the mediation API.
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub tag: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// Transport-level failure: unreachable, timed out, malformed response.
    #[error("mediation API request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success HTTP status without a parseable error body.
    #[error("mediation API returned {status}")]
    Status { status: StatusCode },
    /// The API answered with `ok: false` and an error code.
    #[error("mediation API rejected the request: {error}")]
    Rejected { error: String },
}

/// HTTP client for the mediation API.
///
/// All calls share one bounded timeout so a hung upstream is treated as
/// failed, not awaited forever.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateTopicResponse {
    ok: bool,
    #[serde(rename = "topicId")]
    topic_id: Option<i64>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoveTopicResponse {
    ok: bool,
    removed: Option<bool>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AckResponse {
    ok: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigResponse {
    allowed_role_id: Option<String>,
}

impl ApiClient {
    /// Create a new client for the given base URL.
    #[must_use]
    pub fn new(base_url: &str, auth_token: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Create a topic, returning its new ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable, answers with a
    /// non-success status, or rejects the request.
    pub async fn create_topic(
        &self,
        title: &str,
        url: &str,
        description: &str,
        image_url: &str,
        actor: &Actor,
    ) -> Result<i64, ApiClientError> {
        debug!(title = %title, url = %url, "Creating topic via mediation API");

        let response = self
            .request(reqwest::Method::POST, "/internal/topic.create")
            .json(&serde_json::json!({
                "title": title,
                "url": url,
                "description": description,
                "image_url": image_url,
                "actor": actor,
            }))
            .send()
            .await?;

        let status = response.status();
        let body: CreateTopicResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(status = %status, "Unparseable topic.create response: {e}");
                return Err(ApiClientError::Status { status });
            }
        };

        if body.ok {
            body.topic_id.ok_or(ApiClientError::Status { status })
        } else {
            Err(rejected(status, body.error, "/internal/topic.create"))
        }
    }

    /// Soft-delete a topic. Returns whether a row was actually removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or rejects the request.
    /// An absent topic is not an error; it reports `false`.
    pub async fn remove_topic(&self, id: i64, actor: &Actor) -> Result<bool, ApiClientError> {
        let response = self
            .request(reqwest::Method::POST, "/internal/topic.remove")
            .json(&serde_json::json!({ "id": id, "actor": actor }))
            .send()
            .await?;

        let status = response.status();
        let body: RemoveTopicResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(status = %status, "Unparseable topic.remove response: {e}");
                return Err(ApiClientError::Status { status });
            }
        };

        if body.ok {
            Ok(body.removed.unwrap_or(false))
        } else {
            Err(rejected(status, body.error, "/internal/topic.remove"))
        }
    }

    /// Persist the allowed role id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or rejects the request.
    pub async fn set_role(&self, role_id: &str, actor: &Actor) -> Result<(), ApiClientError> {
        let response = self
            .request(reqwest::Method::POST, "/internal/config.setRole")
            .json(&serde_json::json!({ "roleId": role_id, "actor": actor }))
            .send()
            .await?;

        let status = response.status();
        let body: AckResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!(status = %status, "Unparseable config.setRole response: {e}");
                return Err(ApiClientError::Status { status });
            }
        };

        if body.ok {
            Ok(())
        } else {
            Err(rejected(status, body.error, "/internal/config.setRole"))
        }
    }

    /// Fetch the currently allowed role id, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or the response is
    /// malformed.
    pub async fn get_role(&self) -> Result<Option<String>, ApiClientError> {
        let response = self
            .request(reqwest::Method::GET, "/internal/config.get")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "config.get failed");
            return Err(ApiClientError::Status { status });
        }

        let body: ConfigResponse = response.json().await?;
        Ok(body.allowed_role_id.filter(|s| !s.is_empty()))
    }

    /// Probe the API's health endpoint.
    pub async fn health(&self) -> bool {
        match self
            .request(reqwest::Method::GET, "/health")
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn rejected(status: StatusCode, error: Option<String>, path: &str) -> ApiClientError {
    let error = error.unwrap_or_else(|| "unknown".to_string());
    warn!(status = %status, path = %path, error = %error, "Mediation API rejected request");
    ApiClientError::Rejected { error }
}
