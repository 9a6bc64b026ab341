//! Repository trait definitions (ports) for Chatgate.
//!
//! These traits define the storage interface that chatgate-infra implements.
//! All traits use native async fn in traits (RPITIT, Rust 2024 edition).

pub mod conversation;
pub mod schema;
