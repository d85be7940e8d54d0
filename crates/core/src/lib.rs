//! Shared configuration and logging bootstrap for the alertlink integrations.
//!
//! The integration crates (`alertlink-pagerduty`, `alertlink-slack`) are
//! embedded by a host process; this crate holds the concerns they share:
//!
//! - **Config** (`config`) - typed `AppConfig` loaded from an optional TOML
//!   file plus `ALERTLINK_*` environment overrides
//! - **Telemetry** (`telemetry`) - `tracing` subscriber installation

pub mod config;
pub mod telemetry;

pub use config::{
    AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, LoggingConfig,
    PagerdutyConfig, SlackEventsConfig,
};
pub use telemetry::init_logging;
