use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::traits::CareApi;
use super::types::{
    ChatReply, ChatRequest, ConversationPage, LoginRequest, LoginResponse, NewConversationRecord,
    ProfileResponse, UserProfile,
};
use crate::app::ApiConfig;
use crate::utils::CompanionError;

/// HTTP implementation of the companion service boundary
pub struct HttpCareApi {
    client: Client,
    base_url: String,
}

impl HttpCareApi {
    /// Create a new client for the configured service
    pub fn new(config: &ApiConfig) -> Result<Self, CompanionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompanionError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", token))
    }

    /// Reject non-success statuses, keeping the boundary's error text if any
    async fn expect_success(response: Response) -> Result<Response, CompanionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or(body);

        let message = format!("{}: {}", status, detail);
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CompanionError::Unauthorized(message));
        }
        Err(CompanionError::ApiError(message))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, CompanionError> {
        let response = Self::expect_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl CareApi for HttpCareApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, CompanionError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        // The status code is deliberately ignored here
        Ok(response.json::<LoginResponse>().await?)
    }

    async fn profile(&self, token: &str) -> Result<UserProfile, CompanionError> {
        let request = self.authorized(self.client.get(self.url("/auth/profile")), token);
        let response = request.send().await?;
        let profile: ProfileResponse = Self::read_json(response).await?;
        Ok(profile.user)
    }

    async fn chat(&self, message: &str, token: &str) -> Result<ChatReply, CompanionError> {
        let request = self
            .authorized(self.client.post(self.url("/ai/chat")), token)
            .json(&ChatRequest { message });
        let response = request.send().await?;
        Self::read_json(response).await
    }

    async fn conversations(
        &self,
        user_id: u64,
        token: &str,
        limit: usize,
    ) -> Result<ConversationPage, CompanionError> {
        let request = self
            .authorized(
                self.client.get(self.url(&format!("/conversations/{}", user_id))),
                token,
            )
            .query(&[("limit", limit)]);
        let response = request.send().await?;
        Self::read_json(response).await
    }

    async fn record_message(
        &self,
        record: &NewConversationRecord,
        token: &str,
    ) -> Result<(), CompanionError> {
        let request = self
            .authorized(self.client.post(self.url("/conversations")), token)
            .json(record);
        let response = request.send().await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    fn endpoint(&self) -> String {
        self.base_url.clone()
    }
}
