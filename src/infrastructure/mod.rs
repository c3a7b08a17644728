//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The analysis backend gateway (HTTP transport, wire formats, cache)
//! - Tokio runtime bridge for async operations

pub mod gateway;
pub mod runtime;

pub use gateway::{Gateway, ReqwestTransport};
pub use runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
