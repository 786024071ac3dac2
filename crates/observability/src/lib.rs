//! # orakel-observability
//!
//! Structured Logging via tracing-subscriber (Text oder JSON).

pub mod logging;

pub use logging::{LogFormat, logging_initialisieren};
