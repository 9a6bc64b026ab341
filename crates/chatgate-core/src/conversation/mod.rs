//! Conversation lifecycle: create, list, detail, delete.

pub mod input;
pub mod service;
