//! Slack Events API webhook adapter for Lambda-style HTTP events.
//!
//! One inbound request, one shaped response. The adapter authenticates the
//! request (timestamp freshness plus HMAC-SHA256 signature), distinguishes
//! the three payload shapes Slack delivers (URL-verification challenge,
//! rate-limit notice, event callback), and hands accepted callback events to
//! registered listeners.
//!
//! Rejections deliberately answer `200` in most cases — Slack treats any
//! other status as a delivery failure and retries — except the two security
//! rejections (stale timestamp, bad signature), which answer `403`.
//!
//! # Key Types
//!
//! - `EventsAdapter` - the request state machine
//! - `EventRegistry` - event-type → ordered listener mapping
//! - `SignatureVerifier` - request authentication
//! - `LambdaHttpEvent` / `LambdaHttpResponse` - the transport shapes

pub mod adapter;
pub mod dispatch;
pub mod envelope;
pub mod http;
pub mod signature;

pub use adapter::{
    AdapterError, EventsAdapter, RETRY_NUM_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
pub use dispatch::{CallbackEvent, ErrorListener, EventListener, EventRegistry};
pub use envelope::{CallbackEventType, EventEnvelope};
pub use http::{LambdaHttpEvent, LambdaHttpResponse, POWERED_BY_HEADER};
pub use signature::{SignatureVerifier, TIMESTAMP_TOLERANCE_SECS};
