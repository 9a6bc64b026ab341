//! MySQL storage layer.
//!
//! A gated connection pool plus the repository and schema inspector built
//! on top of it.

pub mod conversation;
pub mod errors;
pub mod pool;
pub mod schema;
