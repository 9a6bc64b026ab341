//! Shared domain types for Chatgate.
//!
//! This crate contains the core domain types used across the gateway:
//! conversations, chat messages, provider settings, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
