use std::collections::HashSet;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use alertlink_core::config::{ConfigError, SlackEventsConfig};

use crate::dispatch::{CallbackEvent, EventRegistry};
use crate::envelope::{CallbackEventType, EventEnvelope};
use crate::http::{make_response, LambdaHttpEvent, LambdaHttpResponse};
use crate::signature::{timestamp_in_tolerance, SignatureVerifier};

pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";
pub const RETRY_NUM_HEADER: &str = "X-Slack-Retry-Num";

/// Why an inbound request was rejected. The status stays 200 wherever
/// possible — Slack retries anything else — except the two security
/// rejections and the method rejection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("http method `{0}` is not handled")]
    UnsupportedMethod(String),
    #[error("request body is not valid json: {0}")]
    MalformedBody(String),
    #[error("app id `{0}` is not handled")]
    UnknownAppId(String),
    #[error("rate limited by slack for app `{app_id}` starting minute {minute_rate_limited}")]
    RateLimited { app_id: String, minute_rate_limited: String },
    #[error("event payload is missing a type")]
    MissingEventType,
    #[error("`{0}` not found in the headers")]
    MissingHeader(&'static str),
    #[error("invalid request timestamp")]
    StaleTimestamp,
    #[error("invalid request signature")]
    InvalidSignature,
    #[error("event type `{0}` is not supported")]
    UnsupportedEvent(String),
}

impl AdapterError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedMethod(_) => 404,
            Self::StaleTimestamp | Self::InvalidSignature => 403,
            _ => 200,
        }
    }
}

/// State machine over one inbound request. Stateless across invocations;
/// Slack's own retry mechanism supplies resilience.
pub struct EventsAdapter {
    app_id: String,
    verifier: SignatureVerifier,
    accepted: HashSet<CallbackEventType>,
    registry: EventRegistry,
}

impl EventsAdapter {
    /// Builds the adapter from config. Unknown names in the accepted-type
    /// list are a configuration error and abort construction.
    pub fn from_config(
        config: &SlackEventsConfig,
        registry: EventRegistry,
    ) -> Result<Self, ConfigError> {
        let mut accepted = HashSet::new();
        for raw in &config.accepted_event_types {
            let event_type = CallbackEventType::parse(raw).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "slack.accepted_event_types contains unknown event type `{raw}`"
                ))
            })?;
            accepted.insert(event_type);
        }

        Ok(Self {
            app_id: config.app_id.clone(),
            verifier: SignatureVerifier::new(config.signing_secret.clone()),
            accepted,
            registry,
        })
    }

    pub fn handle(&self, request: &LambdaHttpEvent) -> LambdaHttpResponse {
        self.handle_at(request, Utc::now().timestamp())
    }

    /// Like [`handle`](Self::handle) with an explicit clock, so freshness
    /// checks are deterministic under test.
    pub fn handle_at(&self, request: &LambdaHttpEvent, now: i64) -> LambdaHttpResponse {
        if !request.http_method.eq_ignore_ascii_case("POST") {
            return self.reject(AdapterError::UnsupportedMethod(request.http_method.clone()));
        }

        let envelope = match EventEnvelope::parse(&request.body) {
            Ok(envelope) => envelope,
            Err(parse_error) => {
                return self.reject(AdapterError::MalformedBody(parse_error.to_string()))
            }
        };

        if envelope.api_app_id.as_deref() != Some(self.app_id.as_str()) {
            let presented = envelope
                .api_app_id
                .clone()
                .unwrap_or_else(|| "missing-api_app_id".to_string());
            return self.reject(AdapterError::UnknownAppId(presented));
        }

        if envelope.kind() == Some("app_rate_limited") {
            return self.reject(AdapterError::RateLimited {
                app_id: self.app_id.clone(),
                minute_rate_limited: envelope
                    .minute_rate_limited
                    .map(|minute| minute.to_string())
                    .unwrap_or_else(|| "missing-minute_rate_limited".to_string()),
            });
        }

        if envelope.kind().is_none() {
            return self.reject(AdapterError::MissingEventType);
        }

        let Some(timestamp_raw) = request.first_header(TIMESTAMP_HEADER) else {
            return self.reject(AdapterError::MissingHeader(TIMESTAMP_HEADER));
        };
        let Ok(timestamp) = timestamp_raw.parse::<i64>() else {
            return self.reject(AdapterError::StaleTimestamp);
        };
        if !timestamp_in_tolerance(timestamp, now) {
            return self.reject(AdapterError::StaleTimestamp);
        }

        let Some(signature) = request.first_header(SIGNATURE_HEADER) else {
            return self.reject(AdapterError::MissingHeader(SIGNATURE_HEADER));
        };
        if !self.verifier.verify(timestamp_raw, &request.body, signature) {
            return self.reject(AdapterError::InvalidSignature);
        }

        // Endpoint registration: echo the challenge token back verbatim.
        if envelope.kind() == Some("url_verification") {
            if let Some(challenge) = &envelope.challenge {
                let body = serde_json::json!({ "challenge": challenge }).to_string();
                return make_response(body, 200);
            }
        }

        let event_type_raw = envelope.event_type();
        if let Some(event_type) = event_type_raw.and_then(CallbackEventType::parse) {
            if self.accepted.contains(&event_type) {
                let retry = request
                    .first_header(RETRY_NUM_HEADER)
                    .map(|value| !value.trim().is_empty())
                    .unwrap_or(false);
                let event = CallbackEvent {
                    event_type,
                    payload: envelope.event.clone().unwrap_or(serde_json::Value::Null),
                    retry,
                };

                let notified = self.registry.notify(&event);
                debug!(
                    event_name = "ingress.slack.event_dispatched",
                    event_type = %event_type,
                    retry,
                    notified,
                    "dispatched slack event to listeners"
                );
                return make_response("", 200);
            }
        }

        self.reject(AdapterError::UnsupportedEvent(
            event_type_raw.unwrap_or("missing-type").to_string(),
        ))
    }

    /// Single rejection funnel: notify error listeners, then shape the
    /// response with the variant's status and message.
    fn reject(&self, error: AdapterError) -> LambdaHttpResponse {
        warn!(
            event_name = "ingress.slack.rejected",
            status = error.status_code(),
            error = %error,
            "rejected inbound slack request"
        );
        self.registry.notify_error(&error);
        make_response(error.to_string(), error.status_code())
    }
}
