use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use super::traits::MessageSource;
use super::types::ApiError;
use crate::config::REQUEST_TIMEOUT;
use crate::models::{MessagePage, NotificationBatch, OutgoingMessage, Timestamp};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `MessageSource` backed by the ScarletAgent web server.
///
/// The server authenticates with a session cookie set by `/login`, so the
/// client keeps a cookie jar and must not follow the login redirect.
pub struct HttpMessageSource {
    client: Client,
    base_url: Url,
}

impl HttpMessageSource {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("Bad server URL {}: {}", base_url, e)))?;
        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidRequest(format!("Bad endpoint {}: {}", path, e)))
    }

    fn parse_error_message(status: StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            return parsed.error;
        }
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: Self::parse_error_message(status, &body),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl MessageSource for HttpMessageSource {
    async fn fetch_page(&self, before: Option<Timestamp>) -> Result<MessagePage, ApiError> {
        let mut url = self.endpoint("/api/messages")?;
        if let Some(before) = before {
            url.query_pairs_mut()
                .append_pair("before", &before.to_wire());
        }

        tracing::debug!(%url, "Fetching message page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        response
            .json::<MessagePage>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse page: {}", e)))
    }

    async fn send_message(&self, text: &str) -> Result<(), ApiError> {
        let url = self.endpoint("/api/message")?;
        let response = self
            .client
            .post(url)
            .json(&OutgoingMessage { text })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn fetch_notifications(&self) -> Result<Vec<String>, ApiError> {
        let url = self.endpoint("/api/get-notifications")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let batch: NotificationBatch = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse notifications: {}", e))
        })?;
        Ok(batch.notifications)
    }

    async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let url = self.endpoint("/login")?;
        let username = username.trim().to_lowercase();
        let response = self
            .client
            .post(url)
            .form(&[("username", username.as_str()), ("password", password.trim())])
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_redirection() {
            tracing::info!(user = %username, "Logged in");
            return Ok(());
        }
        if status.is_success() {
            // The login form is re-rendered with an error message.
            return Err(ApiError::Unauthorized);
        }
        Self::check_status(response).await?;
        Err(ApiError::InvalidResponse(format!(
            "Unexpected login response: HTTP {}",
            status.as_u16()
        )))
    }
}
