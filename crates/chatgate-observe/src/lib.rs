//! Observability for Chatgate: tracing subscriber setup and OpenTelemetry
//! span export.

pub mod tracing_setup;
