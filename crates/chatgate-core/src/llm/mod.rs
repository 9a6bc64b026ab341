//! Chat provider abstractions for Chatgate.
//!
//! - `ChatClient`: RPITIT trait for concrete provider implementations
//! - `BoxChatClient`: object-safe wrapper for dynamic dispatch
//! - `ProviderRegistry`: name-indexed lookup with default resolution

pub mod box_client;
pub mod client;
pub mod registry;
