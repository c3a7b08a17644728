//! Analysis backend gateway - HTTP transport, wire formats, response cache

mod client;
mod transport;
mod types;

pub use client::{Gateway, DEFAULT_CACHE_TTL};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
pub use types::{statement_filename, ExportKind, ExportRequest, ExportedFile, HealthStatus};
