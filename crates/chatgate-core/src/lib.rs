//! Business logic and repository trait definitions for Chatgate.
//!
//! This crate defines the "ports" (repository, schema and chat client traits)
//! that the infrastructure layer implements. It depends only on
//! `chatgate-types` -- never on `chatgate-infra` or any database/IO crate.

pub mod conversation;
pub mod dispatch;
pub mod llm;
pub mod repository;
pub mod startup;
pub mod validation;
