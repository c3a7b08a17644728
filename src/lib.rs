//! Screener: a terminal account-statement viewer for blockchain addresses
//!
//! The TUI talks to an analysis backend over HTTP, keeps fetched results in
//! a short-lived cache and layers local corrections on top of them before
//! exporting statements.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod modules;
pub mod store;
pub mod ui;
