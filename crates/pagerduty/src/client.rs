use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use alertlink_core::config::PagerdutyConfig;

use crate::payload::TriggerPayload;

/// Response body of the Events API v2 enqueue endpoint. Rejections arrive
/// with the same shape and a non-`success` status.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct EventsApiResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub dedup_key: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl EventsApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventsApiError {
    #[error("events api request failed: {0}")]
    Request(String),
    #[error("events api response could not be decoded: {0}")]
    Decode(String),
}

impl EventsApiError {
    /// Stable class name for structured failure logs.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Request(_) => "request",
            Self::Decode(_) => "decode",
        }
    }
}

/// Delivery seam for the notify action; production uses [`EventsClient`],
/// tests script responses without a network.
#[async_trait]
pub trait AlertTransport: Send + Sync {
    async fn send_trigger(&self, payload: &TriggerPayload)
        -> Result<EventsApiResponse, EventsApiError>;
}

/// Events API v2 client over reqwest.
#[derive(Clone, Debug)]
pub struct EventsClient {
    http: reqwest::Client,
    api_url: String,
}

impl EventsClient {
    pub fn new(config: &PagerdutyConfig) -> Result<Self, EventsApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| EventsApiError::Request(error.to_string()))?;

        Ok(Self { http, api_url: config.api_url.clone() })
    }
}

#[async_trait]
impl AlertTransport for EventsClient {
    async fn send_trigger(
        &self,
        payload: &TriggerPayload,
    ) -> Result<EventsApiResponse, EventsApiError> {
        // The API answers rejections as JSON bodies with an error status
        // field, so the body is decoded regardless of the HTTP status code.
        let response = self
            .http
            .post(&self.api_url)
            .json(payload)
            .send()
            .await
            .map_err(|error| EventsApiError::Request(error.to_string()))?;

        response
            .json::<EventsApiResponse>()
            .await
            .map_err(|error| EventsApiError::Decode(error.to_string()))
    }
}
