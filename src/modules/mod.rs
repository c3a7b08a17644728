//! Feature modules driven by the app controller
//!
//! - export: account statements written locally or downloaded from the backend

pub mod export;
