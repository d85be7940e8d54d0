use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identifies the adapter on every response it produces.
pub const POWERED_BY_HEADER: &str = "X-Slack-Powered-By";

/// Raw inbound HTTP event in the Lambda proxy shape.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LambdaHttpEvent {
    pub http_method: String,
    #[serde(default)]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub body: String,
}

impl LambdaHttpEvent {
    /// First value of a header, matched case-insensitively.
    pub fn first_header(&self, name: &str) -> Option<&str> {
        self.multi_value_headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// Outbound response in the Lambda proxy shape.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LambdaHttpResponse {
    pub status_code: u16,
    pub status_description: String,
    pub is_base64_encoded: bool,
    pub multi_value_headers: HashMap<String, Vec<String>>,
    pub body: String,
}

pub(crate) fn make_response(body: impl Into<String>, status_code: u16) -> LambdaHttpResponse {
    let body = body.into();

    let mut multi_value_headers = HashMap::new();
    multi_value_headers.insert(POWERED_BY_HEADER.to_string(), vec![powered_by()]);
    if is_json(&body) {
        multi_value_headers
            .insert("Content-Type".to_string(), vec!["application/json".to_string()]);
    }

    LambdaHttpResponse {
        status_code,
        status_description: status_description(status_code),
        is_base64_encoded: false,
        multi_value_headers,
        body,
    }
}

fn is_json(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body).is_ok()
}

fn status_description(status_code: u16) -> String {
    match status_code {
        200 => "200 OK".to_string(),
        403 => "403 Forbidden".to_string(),
        404 => "404 Not Found".to_string(),
        other => other.to_string(),
    }
}

fn powered_by() -> String {
    format!(
        "{}/{} ({}/{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
