//! Runtime infrastructure - Tokio runtime bridge for backend calls

mod bridge;
mod worker;

pub use bridge::{RuntimeBridge, RuntimeCommand, RuntimeEvent, TaskKind};
pub use worker::run_async_worker;
