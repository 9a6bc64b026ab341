//! Infrastructure layer for Chatgate.
//!
//! Contains implementations of the ports defined in `chatgate-core`: the
//! MySQL connection pool, conversation repository and schema inspector,
//! OpenAI-compatible chat clients, and the environment configuration loader.

pub mod config;
pub mod llm;
pub mod mysql;
